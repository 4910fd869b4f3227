//! This is the documentation for the **paralens** crate: paraxial (first-order)
//! analysis of sequential optical systems.
//!
//! A lens is modeled as an ordered chain of refracting spherical surfaces separated
//! by known thicknesses and refractive indices. From that prescription the crate
//! derives the classical first-order properties (effective focal length, back focal
//! length, overall length, pupil positions, paraxial image position) by chaining 2x2
//! ray-transfer (ABCD) matrices, and turns externally traced per-ray intercept data
//! into aggregate diagnostics: RMS spot radius, Airy-disc encircled-energy fraction
//! and ray-fan aberration curves.
//!
//! The finite ray tracer itself, figure rendering and glass-catalog lookup are
//! deliberately not part of this crate: traced-ray data enters through the read-only
//! [`analyzers::TracedRays`] boundary, and all results are plain numeric records.
//!
//! # Example
//! ```
//! use paralens::{ApertureMode, Lens, Surface};
//!
//! let mut lens = Lens::new("biconvex singlet", ApertureMode::FixedDiameter { epd: 10.0 })?;
//! lens.add_surface(Surface::new(1, 50.0, 5.0, vec![1.5])?)?;
//! lens.add_surface(Surface::new(2, -50.0, 95.0, vec![1.0])?.with_stop())?;
//! lens.add_surface(Surface::flat(3, 0.0, vec![1.0])?)?;
//! lens.refresh_paraxial(false)?;
//!
//! println!("{lens}");
//! assert!(lens.efl()? > 0.0);
//! # Ok::<(), paralens::ParalensError>(())
//! ```
#![allow(clippy::module_name_repetitions)]

pub mod analyzers;
pub mod error;
pub mod first_order;
pub mod lens;
pub mod ray_transfer;
pub mod surface;
pub mod utils;

pub use error::{ParalensError, PlResult};
pub use lens::{ApertureMode, Lens};
pub use ray_transfer::RayTransferMatrix;
pub use surface::Surface;

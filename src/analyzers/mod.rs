#![warn(missing_docs)]
//! Ray-aggregate analyzers
//!
//! The analyzers in this module turn externally traced per-ray, per-surface intercept
//! data into aggregate diagnostics: spot metrics (RMS spot radius, Airy disc radius
//! and encircled-energy fraction) and ray-fan aberration curves. They never perform
//! any tracing themselves and are purely functional over their inputs; the traced
//! data is consumed read-only (see [`raydata::TracedRays`]).
pub mod raydata;
pub mod rayfan;
pub mod spot;

pub use raydata::{RayIntercepts, TracedRays};
pub use rayfan::{FanAxis, FanScale};
pub use spot::SpotMetrics;

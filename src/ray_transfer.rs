#![warn(missing_docs)]
//! Paraxial ray-transfer (ABCD) matrix engine
//!
//! This module builds the 2x2 ray-transfer matrices of single refractions and free
//! propagations and chains them over an arbitrary surface range of a [`Lens`]. The
//! composite matrix maps an object-side paraxial ray vector `(height, angle)` to the
//! corresponding image-side vector. All lengths are in millimeters; the refractive
//! index used per surface is the one at the reference (middle) wavelength, since the
//! paraxial engine is monochromatic.
use nalgebra::{Matrix2, Vector2};
use num::Zero;
use serde::{Deserialize, Serialize};
use std::ops::Mul;

use crate::{
    error::{ParalensError, PlResult},
    lens::Lens,
};

/// A paraxial 2x2 ray-transfer matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayTransferMatrix(Matrix2<f64>);

impl RayTransferMatrix {
    /// Returns the identity matrix (no-op propagation).
    #[must_use]
    pub fn identity() -> Self {
        Self(Matrix2::identity())
    }
    /// Creates the refraction matrix `[[1, 0], [-c*(n_after - n_before), 1]]` of a
    /// single spherical interface.
    ///
    /// A zero curvature yields the identity matrix (plane surface, no power).
    #[must_use]
    pub fn refraction(curvature: f64, n_before: f64, n_after: f64) -> Self {
        Self(Matrix2::new(
            1.0,
            0.0,
            -curvature * (n_after - n_before),
            1.0,
        ))
    }
    /// Creates the translation matrix `[[1, t/n], [0, 1]]` of a free propagation over
    /// the axial distance `thickness` in a medium of refractive index `n_after`.
    #[must_use]
    pub fn translation(thickness: f64, n_after: f64) -> Self {
        Self(Matrix2::new(1.0, thickness / n_after, 0.0, 1.0))
    }
    /// Returns the `A` element (top left).
    #[must_use]
    pub fn a(&self) -> f64 {
        self.0[(0, 0)]
    }
    /// Returns the `B` element (top right).
    #[must_use]
    pub fn b(&self) -> f64 {
        self.0[(0, 1)]
    }
    /// Returns the `C` element (bottom left). `-C` is the optical power of the chain.
    #[must_use]
    pub fn c(&self) -> f64 {
        self.0[(1, 0)]
    }
    /// Returns the `D` element (bottom right).
    #[must_use]
    pub fn d(&self) -> f64 {
        self.0[(1, 1)]
    }
    /// Returns `true` if the chain has no optical power (`C == 0`).
    ///
    /// Callers deriving focal lengths or conjugate positions must treat an afocal
    /// matrix as a degenerate system instead of dividing by `C`.
    #[must_use]
    pub fn is_afocal(&self) -> bool {
        self.c().is_zero()
    }
    /// Propagates a paraxial ray vector `(height, angle)` through this matrix.
    #[must_use]
    pub fn propagate(&self, ray: Vector2<f64>) -> Vector2<f64> {
        self.0 * ray
    }
}

impl Mul for RayTransferMatrix {
    type Output = Self;
    /// Composes two ray-transfer matrices. `m2 * m1` applies `m1` first.
    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

/// Returns the default surface range of a lens: `(2, surface_count - 1)`.
///
/// This skips the (possibly synthetic) object-space surface 1 and the image surface.
/// Callers needing the full system must pass an explicit range.
#[must_use]
pub fn default_range(lens: &Lens) -> (usize, usize) {
    (2, lens.surfaces().len().saturating_sub(1))
}

/// Chains the ray-transfer matrices over an inclusive, 1-based surface range.
///
/// For every surface in `[start, end]` one refraction matrix is built (using the
/// reference-wavelength index of the preceding surface on the object side and of the
/// surface itself on the image side), interleaved with a translation matrix for every
/// interior gap. No translation follows the final surface of the range. The matrices
/// are composed in reverse encounter order, so the result maps object-side ray
/// vectors to image-side ray vectors. With `range == None` the [`default_range`] is
/// used.
///
/// # Errors
/// This function returns an error if `start < 2` (the object-side index of the first
/// refraction comes from the preceding surface), `start > end` or `end` exceeds the
/// number of surfaces.
pub fn system_matrix(lens: &Lens, range: Option<(usize, usize)>) -> PlResult<RayTransferMatrix> {
    let surfaces = lens.surfaces();
    if surfaces.len() < 2 {
        return Err(ParalensError::InvalidGeometry(
            "matrix chain needs at least 2 surfaces".into(),
        ));
    }
    let (start, end) = range.unwrap_or_else(|| default_range(lens));
    if start < 2 || start > end || end > surfaces.len() {
        return Err(ParalensError::InvalidGeometry(format!(
            "invalid surface range [{start}, {end}] for {} surfaces",
            surfaces.len()
        )));
    }
    let mut system = RayTransferMatrix::identity();
    for number in start..=end {
        let surface = &surfaces[number - 1];
        let n_before = surfaces[number - 2].reference_index();
        let n_after = surface.reference_index();
        system = RayTransferMatrix::refraction(surface.curvature(), n_before, n_after) * system;
        if number != end {
            system = RayTransferMatrix::translation(surface.thickness(), n_after) * system;
        }
    }
    Ok(system)
}

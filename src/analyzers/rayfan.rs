#![warn(missing_docs)]
//! Ray-fan aberration curves
//!
//! A ray fan samples the pupil along one meridian and records where each ray lands on
//! the image plane. Subtracting the intercept of the zero-pupil-coordinate reference
//! ray turns the sampled intercepts into the transverse aberration curve `E` versus
//! normalized pupil coordinate. The tangential (Y) fan spans the full pupil
//! `Py in [-1, 1]` with 25 samples, the sagittal (X) fan only the half pupil
//! `Px in [0, 1]` with 20 samples.
use log::info;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{
    analyzers::raydata::TracedRays,
    error::{ParalensError, PlResult},
};

/// Meridian along which a ray fan is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum FanAxis {
    /// Y fan over the full pupil diameter
    #[strum(serialize = "tangential")]
    Tangential,
    /// X fan over the positive half pupil
    #[strum(serialize = "sagittal")]
    Sagittal,
}

impl FanAxis {
    /// Returns the number of pupil samples of a fan along this axis.
    #[must_use]
    pub const fn sample_count(self) -> usize {
        match self {
            Self::Tangential => 25,
            Self::Sagittal => 20,
        }
    }
    /// Returns the sample index of the zero-pupil-coordinate reference ray.
    ///
    /// The tangential fan spans `[-1, 1]`, so its center sample (index 12 of 25) is
    /// the reference; the sagittal fan spans `[0, 1]`, so its first sample is.
    #[must_use]
    pub const fn reference_index(self) -> usize {
        match self {
            Self::Tangential => 12,
            Self::Sagittal => 0,
        }
    }
    /// Returns the normalized pupil coordinates of the fan samples (the abscissa of
    /// the aberration curve).
    #[must_use]
    pub fn pupil_coordinates(self) -> Vec<f64> {
        let (lower, count) = match self {
            Self::Tangential => (-1.0, self.sample_count()),
            Self::Sagittal => (0.0, self.sample_count()),
        };
        let step = (1.0 - lower) / (count - 1) as f64;
        (0..count).map(|i| lower + step * i as f64).collect()
    }
}

/// Converts fan-sampled intercepts into the aberration curve along one axis.
///
/// Subtracts the reference sample (the zero-pupil-coordinate ray) from every sample,
/// so a perfectly stigmatic fan yields an all-zero curve.
///
/// # Errors
/// This function returns an error if the sample count does not match the expected
/// count of the axis.
pub fn fan_curve(samples: &[f64], axis: FanAxis) -> PlResult<Vec<f64>> {
    if samples.len() != axis.sample_count() {
        return Err(ParalensError::Analysis(format!(
            "{axis} fan expects {} samples, got {}",
            axis.sample_count(),
            samples.len()
        )));
    }
    let reference = samples[axis.reference_index()];
    Ok(samples.iter().map(|s| s - reference).collect())
}

/// Extracts the aberration curve of a traced fan at the image surface.
///
/// For a tangential fan the `y` intercept coordinate is used (`Ey` vs. `Py`), for a
/// sagittal fan the `x` coordinate (`Ex` vs. `Px`).
///
/// # Errors
/// This function returns an error if the (wavelength, field) pair or the surface
/// index is missing from the traced data, or the ray count does not match the axis.
pub fn fan_at_image(
    traced: &TracedRays,
    wavelength_idx: usize,
    field_idx: usize,
    axis: FanAxis,
    surface_index: usize,
) -> PlResult<Vec<f64>> {
    info!("extracting {axis} fan for wavelength {wavelength_idx}, field {field_idx}");
    let intercepts = traced.intercepts_at(wavelength_idx, field_idx, surface_index)?;
    let samples: Vec<f64> = intercepts
        .iter()
        .map(|(x, y)| match axis {
            FanAxis::Tangential => *y,
            FanAxis::Sagittal => *x,
        })
        .collect();
    fan_curve(&samples, axis)
}

/// Running maximum absolute aberration across several fan curves.
///
/// A multi-panel fan report shares one symmetric vertical scale across all
/// (field, wavelength) panels. The caller threads a [`FanScale`] value through the
/// curve extractions and reads the final [`FanScale::limit`] afterwards; there is no
/// hidden global state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FanScale {
    max_e: f64,
}

impl FanScale {
    /// Creates a new [`FanScale`] with a zero limit.
    #[must_use]
    pub const fn new() -> Self {
        Self { max_e: 0.0 }
    }
    /// Folds the absolute maximum of a curve into the running limit.
    pub fn update(&mut self, curve: &[f64]) {
        for value in curve {
            if value.abs() > self.max_e {
                self.max_e = value.abs();
            }
        }
    }
    /// Returns the largest absolute aberration seen so far.
    #[must_use]
    pub const fn limit(&self) -> f64 {
        self.max_e
    }
}

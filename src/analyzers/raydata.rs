#![warn(missing_docs)]
//! Traced-ray intercept data consumed by the analyzers
//!
//! An external sequential ray tracer produces, per (wavelength, field) pair, a list
//! of ray records. Each record maps a 1-based surface index to the transverse `(x, y)`
//! intercept coordinate (in mm) of that ray on the surface. This module only models
//! that boundary: the data is validated on access and never mutated here.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ParalensError, PlResult};

/// Per-surface `(x, y)` intercept coordinates of a single traced ray.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RayIntercepts {
    intercepts: BTreeMap<usize, (f64, f64)>,
}

impl RayIntercepts {
    /// Creates a new, empty [`RayIntercepts`] record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            intercepts: BTreeMap::new(),
        }
    }
    /// Stores the intercept coordinate of this ray on the given (1-based) surface.
    pub fn insert(&mut self, surface_index: usize, intercept: (f64, f64)) {
        self.intercepts.insert(surface_index, intercept);
    }
    /// Returns the intercept coordinate on the given surface, if present.
    #[must_use]
    pub fn at_surface(&self, surface_index: usize) -> Option<(f64, f64)> {
        self.intercepts.get(&surface_index).copied()
    }
    /// Returns the number of surfaces this ray has intercepts for.
    #[must_use]
    pub fn surface_count(&self) -> usize {
        self.intercepts.len()
    }
}

impl FromIterator<(usize, (f64, f64))> for RayIntercepts {
    fn from_iter<T: IntoIterator<Item = (usize, (f64, f64))>>(iter: T) -> Self {
        Self {
            intercepts: iter.into_iter().collect(),
        }
    }
}

/// Traced-ray data for a whole analysis request, keyed by (wavelength index, field
/// index), both 0-based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracedRays {
    rays: BTreeMap<(usize, usize), Vec<RayIntercepts>>,
}

impl TracedRays {
    /// Creates a new, empty [`TracedRays`] container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rays: BTreeMap::new(),
        }
    }
    /// Stores the ray list for a (wavelength index, field index) pair.
    pub fn insert(&mut self, wavelength_idx: usize, field_idx: usize, rays: Vec<RayIntercepts>) {
        self.rays.insert((wavelength_idx, field_idx), rays);
    }
    /// Returns the ray list for a (wavelength index, field index) pair.
    ///
    /// # Errors
    /// This function returns an error if no rays were traced for the given pair.
    pub fn rays(&self, wavelength_idx: usize, field_idx: usize) -> PlResult<&[RayIntercepts]> {
        self.rays
            .get(&(wavelength_idx, field_idx))
            .map(Vec::as_slice)
            .ok_or_else(|| {
                ParalensError::Analysis(format!(
                    "no traced rays for wavelength {wavelength_idx}, field {field_idx}"
                ))
            })
    }
    /// Collects the intercept coordinates of all rays of a (wavelength, field) pair on
    /// one surface, e.g. for a spot diagram at the image plane.
    ///
    /// # Errors
    /// This function returns an error if the (wavelength, field) pair is missing or
    /// any ray record lacks an intercept for the requested surface.
    pub fn intercepts_at(
        &self,
        wavelength_idx: usize,
        field_idx: usize,
        surface_index: usize,
    ) -> PlResult<Vec<(f64, f64)>> {
        self.rays(wavelength_idx, field_idx)?
            .iter()
            .map(|ray| {
                ray.at_surface(surface_index).ok_or_else(|| {
                    ParalensError::Analysis(format!(
                        "traced ray has no intercept on surface {surface_index}"
                    ))
                })
            })
            .collect()
    }
}

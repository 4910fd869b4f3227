#![warn(missing_docs)]
//! Module for handling a single refracting spherical surface
//!
//! A [`Surface`] is the leaf entity of a sequential lens prescription: one spherical
//! interface with a signed radius of curvature, the axial distance to the next surface
//! and the refractive index on its image side, given per system wavelength. A flat
//! surface is encoded by the large but finite [`Surface::FLAT_RADIUS`] sentinel so that
//! the curvature `1/radius` always stays finite.
use serde::{Deserialize, Serialize};

use crate::error::{ParalensError, PlResult};

/// A single refracting spherical surface of a sequential lens system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// 1-based sequential surface number
    number: usize,
    /// signed radius of curvature in millimeters
    radius: f64,
    /// axial distance to the next surface in millimeters
    thickness: f64,
    /// refractive index on the image side of this surface, one entry per system wavelength
    index_list: Vec<f64>,
    /// true if this surface is the aperture stop
    stop: bool,
    /// clear aperture diameter in millimeters (only used by a finite ray tracer)
    diameter: f64,
}

impl Surface {
    /// Radius sentinel encoding a flat (zero-power) surface.
    ///
    /// A literal infinite radius is never stored, so the curvature `1/radius` remains
    /// a finite number.
    pub const FLAT_RADIUS: f64 = 1.0e6;

    /// Creates a new [`Surface`].
    ///
    /// The radius is given in millimeters with the usual sign convention (positive if
    /// the center of curvature lies on the image side). `index_list` holds the
    /// refractive index on the image side of the surface, one entry per system
    /// wavelength in ascending wavelength order.
    ///
    /// # Errors
    /// This function returns an error if
    ///  - the radius is zero or not finite (use [`Surface::FLAT_RADIUS`] for a plane)
    ///  - the thickness is not finite
    ///  - the index list is empty or contains an index < 1.0 or a non-finite index
    pub fn new(
        number: usize,
        radius: f64,
        thickness: f64,
        index_list: Vec<f64>,
    ) -> PlResult<Self> {
        if radius == 0.0 || !radius.is_finite() {
            return Err(ParalensError::InvalidGeometry(
                "surface radius must be finite and nonzero".into(),
            ));
        }
        if !thickness.is_finite() {
            return Err(ParalensError::InvalidGeometry(
                "surface thickness must be finite".into(),
            ));
        }
        if index_list.is_empty() {
            return Err(ParalensError::InvalidGeometry(
                "surface needs at least one refractive index".into(),
            ));
        }
        if index_list.iter().any(|n| !n.is_finite() || *n < 1.0) {
            return Err(ParalensError::InvalidGeometry(
                "refractive indices must be finite and >= 1.0".into(),
            ));
        }
        Ok(Self {
            number,
            radius,
            thickness,
            index_list,
            stop: false,
            diameter: 0.0,
        })
    }
    /// Creates a flat, zero-power surface (e.g. an image plane or a synthetic pupil plane).
    ///
    /// # Errors
    /// This function returns an error if the given thickness is not finite or the
    /// index list is invalid (see [`Surface::new`]).
    pub fn flat(number: usize, thickness: f64, index_list: Vec<f64>) -> PlResult<Self> {
        Self::new(number, Self::FLAT_RADIUS, thickness, index_list)
    }
    /// Marks this surface as the aperture stop (consuming builder style).
    #[must_use]
    pub fn with_stop(mut self) -> Self {
        self.stop = true;
        self
    }
    /// Sets the clear aperture diameter (consuming builder style).
    #[must_use]
    pub fn with_diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }
    /// Returns the sequential number of this [`Surface`].
    #[must_use]
    pub const fn number(&self) -> usize {
        self.number
    }
    /// Returns a copy of this [`Surface`] carrying a new sequential number.
    ///
    /// Used when a synthetic surface is inserted in front of the system and the whole
    /// sequence is rebuilt with shifted numbers.
    #[must_use]
    pub fn renumbered(&self, number: usize) -> Self {
        let mut surface = self.clone();
        surface.number = number;
        surface
    }
    /// Returns the signed radius of curvature in millimeters.
    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }
    /// Returns the curvature `1/radius` in 1/millimeters.
    #[must_use]
    pub fn curvature(&self) -> f64 {
        1.0 / self.radius
    }
    /// Returns `true` if this surface carries the flat-radius sentinel.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.radius >= Self::FLAT_RADIUS
    }
    /// Returns the axial distance to the next surface in millimeters.
    #[must_use]
    pub const fn thickness(&self) -> f64 {
        self.thickness
    }
    /// Sets the axial distance to the next surface in millimeters.
    ///
    /// # Errors
    /// This function will return an error if the given thickness is not finite.
    pub fn set_thickness(&mut self, thickness: f64) -> PlResult<()> {
        if !thickness.is_finite() {
            return Err(ParalensError::InvalidGeometry(
                "surface thickness must be finite".into(),
            ));
        }
        self.thickness = thickness;
        Ok(())
    }
    /// Returns the per-wavelength refractive indices on the image side of this surface.
    #[must_use]
    pub fn index_list(&self) -> &[f64] {
        &self.index_list
    }
    /// Returns the refractive index at the reference (middle) wavelength.
    ///
    /// The paraxial engine is monochromatic and always refers to the middle element of
    /// the index list.
    #[must_use]
    pub fn reference_index(&self) -> f64 {
        self.index_list[self.index_list.len() / 2]
    }
    /// Returns `true` if this surface is the aperture stop.
    #[must_use]
    pub const fn is_stop(&self) -> bool {
        self.stop
    }
    /// Returns the clear aperture diameter in millimeters.
    #[must_use]
    pub const fn diameter(&self) -> f64 {
        self.diameter
    }
}

#![warn(missing_docs)]
//! Module for handling a sequential lens system
//!
//! A [`Lens`] owns the ordered surface list of a sequential optical system together
//! with its field angles, wavelengths, object position and aperture definition. All
//! first-order properties (EFL, BFL, OAL, image position, pupil positions, EPD, F/#)
//! are derived quantities: they are recomputed from the live surface list on every
//! access and never cached.
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uom::si::{f64::Length, length::nanometer};

use crate::{
    error::{ParalensError, PlResult},
    first_order,
    surface::Surface,
};

/// Aperture definition of a lens system.
///
/// Exactly one of entrance pupil diameter and F-number is independently settable; the
/// other one is derived (`FNO = BFL/EPD`, `EPD = BFL/FNO`). Attempting to set the
/// derived quantity fails with [`ParalensError::InvalidMutation`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ApertureMode {
    /// the entrance pupil diameter (in mm) is fixed, the F-number is derived
    FixedDiameter {
        /// entrance pupil diameter in millimeters
        epd: f64,
    },
    /// the F-number is fixed, the entrance pupil diameter is derived
    FixedFNumber {
        /// F-number (focal ratio)
        fno: f64,
    },
}
impl ApertureMode {
    /// Check validity of [`ApertureMode`].
    ///
    /// This function returns true if the stored aperture quantity is positive and finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::FixedDiameter { epd } => epd.is_finite() && *epd > 0.0,
            Self::FixedFNumber { fno } => fno.is_finite() && *fno > 0.0,
        }
    }
}

/// A sequential lens system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lens {
    name: String,
    surfaces: Vec<Surface>,
    field_angles: Vec<f64>,
    wavelengths: Vec<Length>,
    object_position: f64,
    aperture: ApertureMode,
}

impl Lens {
    /// Object-position sentinel for an object at infinity.
    ///
    /// A large negative distance instead of a literal `-inf` keeps the conjugate
    /// formula finite.
    pub const INFINITE_OBJECT: f64 = -1.0e6;

    /// Creates a new, empty [`Lens`] with the given name and aperture mode.
    ///
    /// # Errors
    /// This function returns an error if the aperture quantity of the given mode is
    /// not positive and finite (the same rule the setters enforce).
    pub fn new(name: &str, aperture: ApertureMode) -> PlResult<Self> {
        if !aperture.is_valid() {
            return Err(ParalensError::InvalidGeometry(
                "aperture quantity must be positive and finite".into(),
            ));
        }
        Ok(Self {
            name: name.to_owned(),
            surfaces: Vec::new(),
            field_angles: Vec::new(),
            wavelengths: Vec::new(),
            object_position: 0.0,
            aperture,
        })
    }
    /// Returns the name of this [`Lens`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Returns the ordered surface list of this [`Lens`].
    #[must_use]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }
    /// Appends a surface to the system.
    ///
    /// # Errors
    /// This function returns an error if
    ///  - the surface number does not continue the sequence (`len + 1`)
    ///  - the surface is flagged as stop while another stop already exists
    ///  - the surface's index list length does not match the system wavelength list
    pub fn add_surface(&mut self, surface: Surface) -> PlResult<()> {
        if surface.number() != self.surfaces.len() + 1 {
            return Err(ParalensError::InvalidGeometry(format!(
                "surface number {} does not continue the sequence (expected {})",
                surface.number(),
                self.surfaces.len() + 1
            )));
        }
        if surface.is_stop() && self.stop_index().is_some() {
            return Err(ParalensError::InvalidGeometry(
                "system already has an aperture stop".into(),
            ));
        }
        if !self.wavelengths.is_empty() && surface.index_list().len() != self.wavelengths.len() {
            return Err(ParalensError::InvalidGeometry(format!(
                "surface has {} refractive indices but the system defines {} wavelengths",
                surface.index_list().len(),
                self.wavelengths.len()
            )));
        }
        self.surfaces.push(surface);
        Ok(())
    }
    /// Adds a field angle (in degrees). Field angles must be added in ascending
    /// order; the last entry is the maximum/reference field.
    ///
    /// # Errors
    /// This function returns an error if the angle is not finite or not larger than
    /// the previously added one.
    pub fn add_field_angle(&mut self, angle: f64) -> PlResult<()> {
        if !angle.is_finite() {
            return Err(ParalensError::InvalidGeometry(
                "field angle must be finite".into(),
            ));
        }
        if let Some(last) = self.field_angles.last() {
            if angle <= *last {
                return Err(ParalensError::InvalidGeometry(
                    "field angles must be added in ascending order".into(),
                ));
            }
        }
        self.field_angles.push(angle);
        Ok(())
    }
    /// Returns the field angles (in degrees) of this [`Lens`].
    #[must_use]
    pub fn field_angles(&self) -> &[f64] {
        &self.field_angles
    }
    /// Adds a wavelength. Wavelengths must be added in ascending order; the middle
    /// entry is the paraxial reference wavelength.
    ///
    /// # Errors
    /// This function returns an error if the wavelength is not positive and finite or
    /// not larger than the previously added one.
    pub fn add_wavelength(&mut self, wavelength: Length) -> PlResult<()> {
        if !wavelength.is_finite() || wavelength.value <= 0.0 {
            return Err(ParalensError::InvalidGeometry(
                "wavelength must be positive and finite".into(),
            ));
        }
        if let Some(last) = self.wavelengths.last() {
            if wavelength <= *last {
                return Err(ParalensError::InvalidGeometry(
                    "wavelengths must be added in ascending order".into(),
                ));
            }
        }
        self.wavelengths.push(wavelength);
        Ok(())
    }
    /// Returns the wavelengths of this [`Lens`].
    #[must_use]
    pub fn wavelengths(&self) -> &[Length] {
        &self.wavelengths
    }
    /// Returns the object position: the signed distance (in mm) from the first
    /// surface, negative towards object space.
    #[must_use]
    pub const fn object_position(&self) -> f64 {
        self.object_position
    }
    /// Sets the object position (in mm, negative towards object space).
    pub const fn set_object_position(&mut self, position: f64) {
        self.object_position = position;
    }
    /// Returns the 0-based index of the aperture stop surface, if any.
    #[must_use]
    pub fn stop_index(&self) -> Option<usize> {
        self.surfaces.iter().position(Surface::is_stop)
    }
    /// Returns the entrance pupil diameter (in mm): stored in fixed-diameter mode,
    /// `BFL/FNO` in fixed-F-number mode.
    ///
    /// # Errors
    /// This function returns an error if the derived value cannot be computed (fewer
    /// than 2 surfaces, or a zero F-number).
    pub fn epd(&self) -> PlResult<f64> {
        match self.aperture {
            ApertureMode::FixedDiameter { epd } => Ok(epd),
            ApertureMode::FixedFNumber { fno } => {
                if fno == 0.0 {
                    return Err(ParalensError::DegenerateSystem(
                        "cannot derive EPD from a zero F-number".into(),
                    ));
                }
                Ok(first_order::bfl(self)? / fno)
            }
        }
    }
    /// Returns the F-number: stored in fixed-F-number mode, `BFL/EPD` in
    /// fixed-diameter mode.
    ///
    /// # Errors
    /// This function returns an error if the derived value cannot be computed (fewer
    /// than 2 surfaces, or a zero pupil diameter).
    pub fn fno(&self) -> PlResult<f64> {
        match self.aperture {
            ApertureMode::FixedFNumber { fno } => Ok(fno),
            ApertureMode::FixedDiameter { epd } => {
                if epd == 0.0 {
                    return Err(ParalensError::DegenerateSystem(
                        "cannot derive F-number from a zero pupil diameter".into(),
                    ));
                }
                Ok(first_order::bfl(self)? / epd)
            }
        }
    }
    /// Sets the entrance pupil diameter.
    ///
    /// # Errors
    /// This function returns an error if the system is in fixed-F-number mode (the
    /// diameter is derived there) or the value is not positive and finite.
    pub fn set_epd(&mut self, epd: f64) -> PlResult<()> {
        match self.aperture {
            ApertureMode::FixedDiameter { .. } => {
                if !epd.is_finite() || epd <= 0.0 {
                    return Err(ParalensError::InvalidGeometry(
                        "entrance pupil diameter must be positive and finite".into(),
                    ));
                }
                self.aperture = ApertureMode::FixedDiameter { epd };
                Ok(())
            }
            ApertureMode::FixedFNumber { .. } => Err(ParalensError::InvalidMutation(
                "entrance pupil diameter is derived in fixed-F-number mode".into(),
            )),
        }
    }
    /// Sets the F-number.
    ///
    /// # Errors
    /// This function returns an error if the system is in fixed-diameter mode (the
    /// F-number is derived there) or the value is not positive and finite.
    pub fn set_fno(&mut self, fno: f64) -> PlResult<()> {
        match self.aperture {
            ApertureMode::FixedFNumber { .. } => {
                if !fno.is_finite() || fno <= 0.0 {
                    return Err(ParalensError::InvalidGeometry(
                        "F-number must be positive and finite".into(),
                    ));
                }
                self.aperture = ApertureMode::FixedFNumber { fno };
                Ok(())
            }
            ApertureMode::FixedDiameter { .. } => Err(ParalensError::InvalidMutation(
                "F-number is derived in fixed-diameter mode".into(),
            )),
        }
    }
    /// Returns the effective focal length over the default surface range.
    ///
    /// # Errors
    /// See [`first_order::efl`].
    pub fn efl(&self) -> PlResult<f64> {
        first_order::efl(self, None)
    }
    /// Returns the back focal length.
    ///
    /// # Errors
    /// See [`first_order::bfl`].
    pub fn bfl(&self) -> PlResult<f64> {
        first_order::bfl(self)
    }
    /// Returns the overall length over the default surface range.
    ///
    /// # Errors
    /// See [`first_order::oal`].
    pub fn oal(&self) -> PlResult<f64> {
        first_order::oal(self, None)
    }
    /// Returns the paraxial image position for the current object distance.
    ///
    /// # Errors
    /// See [`first_order::image_position`].
    pub fn image_position(&self) -> PlResult<f64> {
        first_order::image_position(self)
    }
    /// Returns the entrance pupil position.
    ///
    /// # Errors
    /// See [`first_order::entrance_pupil`].
    pub fn entrance_pupil(&self) -> PlResult<f64> {
        first_order::entrance_pupil(self)
    }
    /// Returns the exit pupil position.
    ///
    /// # Errors
    /// See [`first_order::exit_pupil`].
    pub fn exit_pupil(&self) -> PlResult<f64> {
        first_order::exit_pupil(self)
    }
    /// Places the image plane at the paraxial image position.
    ///
    /// This sets the thickness of the second-to-last surface (the last physical gap)
    /// to the image distance computed from the *current* upstream geometry. It is a
    /// single relaxation step, not a converging solve: callers changing upstream
    /// geometry must call it again. Since the default matrix range excludes the last
    /// gap, repeating the call without a geometry change leaves the thickness
    /// unchanged.
    ///
    /// # Errors
    /// This function returns an error if the paraxial image position cannot be
    /// computed; the surface list is left untouched in that case.
    pub fn solve_image_position(&mut self) -> PlResult<()> {
        let t0 = self.image_position()?;
        let last_gap = self.surfaces.len() - 2;
        self.surfaces[last_gap].set_thickness(t0)?;
        Ok(())
    }
    /// Makes the system paraxially self-consistent.
    ///
    /// If the first surface has finite curvature (or `force_surface0` is set), a
    /// synthetic zero-power pupil surface is inserted in front of the system and the
    /// whole sequence is rebuilt with shifted numbers. The object is then placed at
    /// infinity, the image plane is solved via [`Lens::solve_image_position`] and the
    /// first gap is set to `0.1 * OAL`. Repeated calls with unchanged geometry are
    /// idempotent: the inserted surface is flat, so no second insertion happens.
    ///
    /// # Errors
    /// This function returns an error if the system is empty or the image-position
    /// solve fails.
    pub fn refresh_paraxial(&mut self, force_surface0: bool) -> PlResult<()> {
        if self.surfaces.is_empty() {
            return Err(ParalensError::InvalidGeometry(
                "cannot refresh an empty system".into(),
            ));
        }
        if force_surface0 || self.surfaces[0].radius() < Surface::FLAT_RADIUS {
            info!(
                "inserting synthetic pupil surface in front of lens '{}'",
                self.name
            );
            let index_count = self.wavelengths.len().max(1);
            let mut renumbered = Vec::with_capacity(self.surfaces.len() + 1);
            renumbered.push(Surface::flat(1, 0.0, vec![1.0; index_count])?);
            for surface in &self.surfaces {
                renumbered.push(surface.renumbered(surface.number() + 1));
            }
            self.surfaces = renumbered;
        }
        self.object_position = Self::INFINITE_OBJECT;
        self.solve_image_position()?;
        let oal = first_order::oal(self, Some((2, self.surfaces.len())))?;
        self.surfaces[0].set_thickness(0.1 * oal)?;
        Ok(())
    }
}

impl Display for Lens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} paraxial informations:", self.name)?;
        writeln!(f, "---------------------------------------")?;
        let fmt_value = |v: PlResult<f64>| v.map_or_else(|e| format!("<{e}>"), |v| format!("{v:.3}"));
        writeln!(
            f,
            "Effective focal length    EFL: {} mm",
            fmt_value(self.efl())
        )?;
        writeln!(
            f,
            "Entrance pupil diameter   EPD: {} mm",
            fmt_value(self.epd())
        )?;
        writeln!(f, "F-number                  f_#: {}", fmt_value(self.fno()))?;
        writeln!(
            f,
            "Image position             z0: {} mm",
            fmt_value(self.image_position())
        )?;
        write!(
            f,
            "Overall length            OAL: {} mm",
            fmt_value(self.oal())
        )?;
        if !self.wavelengths.is_empty() {
            let wavelengths: Vec<String> = self
                .wavelengths
                .iter()
                .map(|w| format!("{:.1} nm", w.get::<nanometer>()))
                .collect();
            write!(f, "\nWavelengths                  : {}", wavelengths.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nanometer;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    /// The 3-surface reference system: biconvex element followed by a flat image
    /// plane, stop on surface 2, EPD fixed at 10 mm.
    fn reference_system() -> Lens {
        let mut lens = Lens::new("reference", ApertureMode::FixedDiameter { epd: 10.0 }).unwrap();
        lens.add_surface(Surface::new(1, 50.0, 5.0, vec![1.5]).unwrap())
            .unwrap();
        lens.add_surface(Surface::new(2, -50.0, 95.0, vec![1.0]).unwrap().with_stop())
            .unwrap();
        lens.add_surface(Surface::flat(3, 0.0, vec![1.0]).unwrap())
            .unwrap();
        lens
    }
    #[test]
    fn end_to_end_reference_system() {
        let lens = reference_system();
        assert_relative_eq!(lens.bfl().unwrap(), 95.0);
        let efl = lens.efl().unwrap();
        assert!(efl.is_finite() && efl > 0.0);
        assert_relative_eq!(lens.fno().unwrap(), 9.5);
    }
    #[test]
    fn add_surface_checks_sequence_and_stop() {
        let mut lens = Lens::new("test", ApertureMode::FixedDiameter { epd: 10.0 }).unwrap();
        assert_matches!(
            lens.add_surface(Surface::new(2, 50.0, 5.0, vec![1.5]).unwrap()),
            Err(ParalensError::InvalidGeometry(_))
        );
        lens.add_surface(Surface::new(1, 50.0, 5.0, vec![1.5]).unwrap().with_stop())
            .unwrap();
        assert_matches!(
            lens.add_surface(Surface::new(2, -50.0, 5.0, vec![1.0]).unwrap().with_stop()),
            Err(ParalensError::InvalidGeometry(_))
        );
    }
    #[test]
    fn add_surface_checks_index_list_length() {
        let mut lens = Lens::new("test", ApertureMode::FixedDiameter { epd: 10.0 }).unwrap();
        lens.add_wavelength(nanometer!(486.1)).unwrap();
        lens.add_wavelength(nanometer!(587.6)).unwrap();
        lens.add_wavelength(nanometer!(656.3)).unwrap();
        assert_matches!(
            lens.add_surface(Surface::new(1, 50.0, 5.0, vec![1.5]).unwrap()),
            Err(ParalensError::InvalidGeometry(_))
        );
        assert!(lens
            .add_surface(Surface::new(1, 50.0, 5.0, vec![1.52, 1.51, 1.50]).unwrap())
            .is_ok());
    }
    #[test]
    fn field_angles_ascending() {
        let mut lens = Lens::new("test", ApertureMode::FixedDiameter { epd: 10.0 }).unwrap();
        lens.add_field_angle(0.0).unwrap();
        lens.add_field_angle(7.0).unwrap();
        assert!(lens.add_field_angle(5.0).is_err());
        assert!(lens.add_field_angle(f64::NAN).is_err());
    }
    #[test]
    fn wavelengths_ascending() {
        let mut lens = Lens::new("test", ApertureMode::FixedDiameter { epd: 10.0 }).unwrap();
        lens.add_wavelength(nanometer!(486.1)).unwrap();
        assert!(lens.add_wavelength(nanometer!(400.0)).is_err());
        assert!(lens.add_wavelength(nanometer!(-1.0)).is_err());
    }
    #[test]
    fn aperture_mutation_rules() {
        let mut fixed_epd = reference_system();
        assert!(fixed_epd.set_epd(12.0).is_ok());
        assert_matches!(
            fixed_epd.set_fno(8.0),
            Err(ParalensError::InvalidMutation(_))
        );
        let mut fixed_fno = Lens::new("test", ApertureMode::FixedFNumber { fno: 8.0 }).unwrap();
        assert!(fixed_fno.set_fno(4.0).is_ok());
        assert_matches!(
            fixed_fno.set_epd(10.0),
            Err(ParalensError::InvalidMutation(_))
        );
    }
    #[test]
    fn new_rejects_invalid_aperture() {
        assert_matches!(
            Lens::new("test", ApertureMode::FixedDiameter { epd: -1.0 }),
            Err(ParalensError::InvalidGeometry(_))
        );
        assert_matches!(
            Lens::new("test", ApertureMode::FixedDiameter { epd: 0.0 }),
            Err(ParalensError::InvalidGeometry(_))
        );
        assert_matches!(
            Lens::new("test", ApertureMode::FixedFNumber { fno: f64::NAN }),
            Err(ParalensError::InvalidGeometry(_))
        );
        assert_matches!(
            Lens::new("test", ApertureMode::FixedFNumber { fno: f64::INFINITY }),
            Err(ParalensError::InvalidGeometry(_))
        );
    }
    #[test]
    fn derived_aperture_quantities() {
        let mut lens = Lens::new("test", ApertureMode::FixedFNumber { fno: 9.5 }).unwrap();
        lens.add_surface(Surface::new(1, 50.0, 5.0, vec![1.5]).unwrap())
            .unwrap();
        lens.add_surface(Surface::new(2, -50.0, 95.0, vec![1.0]).unwrap())
            .unwrap();
        lens.add_surface(Surface::flat(3, 0.0, vec![1.0]).unwrap())
            .unwrap();
        assert_relative_eq!(lens.epd().unwrap(), 10.0);
    }
    #[test]
    fn solve_image_position_is_idempotent() {
        let mut lens = reference_system();
        lens.set_object_position(Lens::INFINITE_OBJECT);
        lens.solve_image_position().unwrap();
        let first = lens.surfaces()[1].thickness();
        lens.solve_image_position().unwrap();
        assert_relative_eq!(lens.surfaces()[1].thickness(), first);
    }
    #[test]
    fn refresh_paraxial_inserts_synthetic_surface_once() {
        let mut lens = reference_system();
        lens.refresh_paraxial(false).unwrap();
        assert_eq!(lens.surfaces().len(), 4);
        assert!(lens.surfaces()[0].is_flat());
        let numbers: Vec<usize> = lens.surfaces().iter().map(Surface::number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_relative_eq!(lens.object_position(), Lens::INFINITE_OBJECT);
        let first_gap = lens.surfaces()[0].thickness();
        let solved_gap = lens.surfaces()[2].thickness();
        // second refresh: flat leading surface, no second insertion, same geometry
        lens.refresh_paraxial(false).unwrap();
        assert_eq!(lens.surfaces().len(), 4);
        assert_relative_eq!(lens.surfaces()[0].thickness(), first_gap);
        assert_relative_eq!(lens.surfaces()[2].thickness(), solved_gap);
    }
    #[test]
    fn refresh_paraxial_forced_insertion() {
        let mut lens = Lens::new("flat front", ApertureMode::FixedDiameter { epd: 10.0 }).unwrap();
        lens.add_surface(Surface::flat(1, 10.0, vec![1.0]).unwrap())
            .unwrap();
        lens.add_surface(Surface::new(2, 50.0, 5.0, vec![1.5]).unwrap())
            .unwrap();
        lens.add_surface(Surface::new(3, -50.0, 95.0, vec![1.0]).unwrap())
            .unwrap();
        lens.add_surface(Surface::flat(4, 0.0, vec![1.0]).unwrap())
            .unwrap();
        lens.refresh_paraxial(true).unwrap();
        assert_eq!(lens.surfaces().len(), 5);
    }
    #[test]
    fn display() {
        let lens = reference_system();
        let text = format!("{lens}");
        assert!(text.contains("reference paraxial informations:"));
        assert!(text.contains("F-number                  f_#: 9.500"));
    }
}

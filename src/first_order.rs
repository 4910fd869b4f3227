#![warn(missing_docs)]
//! First-order (paraxial) system properties
//!
//! This module derives the classical first-order quantities of a sequential lens
//! system from its chained ray-transfer matrix: effective focal length, back focal
//! length, overall length, paraxial image position and the entrance/exit pupil
//! locations. All results are in millimeters and recomputed from the live surface
//! list on every call, so they can never go stale.
//!
//! Divisions by a zero matrix element are never performed silently: an afocal chain
//! (`C == 0`) or a vanishing pupil denominator is reported as a
//! [`ParalensError::DegenerateSystem`] so that a malformed prescription is caught at
//! the point of first use.
use num::Zero;

use crate::{
    error::{ParalensError, PlResult},
    lens::Lens,
    ray_transfer::{system_matrix, RayTransferMatrix},
};

fn power_terms(matrix: &RayTransferMatrix) -> PlResult<(f64, f64, f64)> {
    if matrix.is_afocal() {
        return Err(ParalensError::DegenerateSystem(
            "afocal chain (C == 0) has no principal planes".into(),
        ));
    }
    let c = matrix.c();
    let phi = -c;
    let p = (matrix.d() - 1.0) / c;
    let p_prime = (1.0 - matrix.a()) / c;
    Ok((phi, p, p_prime))
}

fn checked_recip(value: f64, context: &str) -> PlResult<f64> {
    if value.is_zero() {
        return Err(ParalensError::DegenerateSystem(format!(
            "division by zero while solving {context}"
        )));
    }
    Ok(1.0 / value)
}

/// Returns the effective focal length `-1/C` over the given surface range
/// (`None` = default range).
///
/// # Errors
/// This function returns an error if the range is invalid or the chain is afocal
/// (`C == 0`).
pub fn efl(lens: &Lens, range: Option<(usize, usize)>) -> PlResult<f64> {
    let matrix = system_matrix(lens, range)?;
    if matrix.is_afocal() {
        return Err(ParalensError::DegenerateSystem(
            "afocal system (C == 0) has no finite focal length".into(),
        ));
    }
    Ok(-1.0 / matrix.c())
}

/// Returns the back focal length: the physical gap between the last optical surface
/// and the image plane, i.e. the thickness of the second-to-last surface.
///
/// # Errors
/// This function returns an error if the lens has fewer than 2 surfaces.
pub fn bfl(lens: &Lens) -> PlResult<f64> {
    let surfaces = lens.surfaces();
    if surfaces.len() < 2 {
        return Err(ParalensError::InvalidGeometry(
            "back focal length needs at least 2 surfaces".into(),
        ));
    }
    Ok(surfaces[surfaces.len() - 2].thickness())
}

/// Returns the overall physical length between the boundary surfaces of the given
/// range (`None` = default range): the sum of the thicknesses of the surfaces
/// `start .. end-1`.
///
/// # Errors
/// This function returns an error if the range does not fit the surface list.
pub fn oal(lens: &Lens, range: Option<(usize, usize)>) -> PlResult<f64> {
    let surfaces = lens.surfaces();
    let (start, end) = range.unwrap_or((2, surfaces.len().saturating_sub(1)));
    if start < 1 || end > surfaces.len() || start > end {
        return Err(ParalensError::InvalidGeometry(format!(
            "invalid surface range [{start}, {end}] for {} surfaces",
            surfaces.len()
        )));
    }
    Ok(surfaces[start - 1..end - 1]
        .iter()
        .map(|s| s.thickness())
        .sum())
}

/// Returns the paraxial image position for the current object distance via the
/// conjugate formula `-A/C + 1/(z + D/C)/C^2` over the default range.
///
/// An object at infinity is represented by the large negative
/// [`Lens::INFINITE_OBJECT`] sentinel of the object position.
///
/// # Errors
/// This function returns an error if the chain is afocal or the conjugate
/// denominator `z + D/C` vanishes (object placed in the front focal point).
pub fn image_position(lens: &Lens) -> PlResult<f64> {
    let matrix = system_matrix(lens, None)?;
    if matrix.is_afocal() {
        return Err(ParalensError::DegenerateSystem(
            "afocal system (C == 0) has no paraxial image".into(),
        ));
    }
    let c = matrix.c();
    let z = lens.object_position();
    let conjugate = checked_recip(z + matrix.d() / c, "the paraxial conjugate")?;
    Ok(-matrix.a() / c + conjugate / (c * c))
}

/// Returns the entrance pupil position: the image of the aperture stop as seen from
/// object space, measured from surface 2.
///
/// If the stop is surface 2 itself the entrance pupil coincides with it and the
/// position is 0. Otherwise the chain `[2, stop-1]` is imaged through its principal
/// planes: `phi = -C`, `P = (D-1)/C`, `P' = (1-A)/C`, `l' = t_stop - P'`,
/// `l = 1/(1/l' - phi)`, `EP = l + P`, where `t_stop` is the thickness of the surface
/// immediately preceding the stop.
///
/// # Errors
/// This function returns an error if no surface is flagged as the aperture stop, if
/// the stop sits on the first surface (there is no preceding gap to image through),
/// or if the object-side chain is afocal or produces a vanishing denominator.
pub fn entrance_pupil(lens: &Lens) -> PlResult<f64> {
    let stop_idx = lens.stop_index().ok_or_else(|| {
        ParalensError::MissingStop("no surface is flagged as the aperture stop".into())
    })?;
    let stop_number = stop_idx + 1;
    if stop_number < 2 {
        return Err(ParalensError::InvalidGeometry(
            "aperture stop on the first surface has no preceding gap to image through".into(),
        ));
    }
    if stop_number == 2 {
        return Ok(0.0);
    }
    let t_stop = lens.surfaces()[stop_idx - 1].thickness();
    let matrix = system_matrix(lens, Some((2, stop_number - 1)))?;
    let (phi, p, p_prime) = power_terms(&matrix)?;
    let l_prime = t_stop - p_prime;
    let l = checked_recip(
        checked_recip(l_prime, "the entrance pupil")? - phi,
        "the entrance pupil",
    )?;
    Ok(l + p)
}

/// Returns the exit pupil position: the image of the aperture stop as seen from image
/// space, measured from the last optical surface.
///
/// If the stop is the last-but-one surface the exit pupil coincides with it and the
/// position is 0. Otherwise the construction mirrors [`entrance_pupil`] with the
/// image-side chain `[stop+1, last-1]` and `l = -(t_stop + P)`,
/// `l' = 1/(1/l + phi)`, `EX = l' + P'`, where `t_stop` is the thickness of the stop
/// surface itself.
///
/// # Errors
/// This function returns an error if no surface is flagged as the aperture stop, or
/// if the image-side chain is afocal or produces a vanishing denominator.
pub fn exit_pupil(lens: &Lens) -> PlResult<f64> {
    let stop_idx = lens.stop_index().ok_or_else(|| {
        ParalensError::MissingStop("no surface is flagged as the aperture stop".into())
    })?;
    let surfaces = lens.surfaces();
    let stop_number = stop_idx + 1;
    if stop_number == surfaces.len() - 1 {
        return Ok(0.0);
    }
    let t_stop = surfaces[stop_idx].thickness();
    let matrix = system_matrix(lens, Some((stop_number + 1, surfaces.len() - 1)))?;
    let (phi, p, p_prime) = power_terms(&matrix)?;
    let l = -(t_stop + p);
    let l_prime = checked_recip(
        checked_recip(l, "the exit pupil")? + phi,
        "the exit pupil",
    )?;
    Ok(l_prime + p_prime)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{lens::ApertureMode, surface::Surface};
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    fn lens_with(surfaces: Vec<Surface>) -> Lens {
        let mut lens = Lens::new("test", ApertureMode::FixedDiameter { epd: 10.0 }).unwrap();
        for s in surfaces {
            lens.add_surface(s).unwrap();
        }
        lens
    }
    fn single_refraction() -> Lens {
        // one refracting surface between two flat dummy surfaces
        lens_with(vec![
            Surface::flat(1, 10.0, vec![1.0]).unwrap(),
            Surface::new(2, 50.0, 100.0, vec![1.5]).unwrap(),
            Surface::flat(3, 0.0, vec![1.5]).unwrap(),
        ])
    }
    #[test]
    fn efl_matches_thin_lens_formula() {
        let lens = single_refraction();
        // f = 1/((n-1)*c) for a single refracting surface
        let expected = 1.0 / ((1.5 - 1.0) * (1.0 / 50.0));
        assert_relative_eq!(efl(&lens, None).unwrap(), expected, epsilon = 1e-12);
    }
    #[test]
    fn efl_afocal_fails() {
        let lens = lens_with(vec![
            Surface::flat(1, 10.0, vec![1.0]).unwrap(),
            Surface::flat(2, 10.0, vec![1.0]).unwrap(),
            Surface::flat(3, 0.0, vec![1.0]).unwrap(),
        ]);
        assert_matches!(efl(&lens, None), Err(ParalensError::DegenerateSystem(_)));
    }
    #[test]
    fn bfl_is_second_to_last_thickness() {
        let lens = single_refraction();
        assert_relative_eq!(bfl(&lens).unwrap(), 100.0);
    }
    #[test]
    fn bfl_needs_two_surfaces() {
        let lens = lens_with(vec![Surface::flat(1, 10.0, vec![1.0]).unwrap()]);
        assert_matches!(bfl(&lens), Err(ParalensError::InvalidGeometry(_)));
    }
    #[test]
    fn oal_sums_interior_thicknesses() {
        let lens = lens_with(vec![
            Surface::flat(1, 10.0, vec![1.0]).unwrap(),
            Surface::new(2, 50.0, 5.0, vec![1.5]).unwrap(),
            Surface::new(3, -50.0, 95.0, vec![1.0]).unwrap(),
            Surface::flat(4, 0.0, vec![1.0]).unwrap(),
        ]);
        // explicit full range: thicknesses of surfaces 2 and 3
        assert_relative_eq!(oal(&lens, Some((2, 4))).unwrap(), 100.0);
        // default range (2, 3): thickness of surface 2 only
        assert_relative_eq!(oal(&lens, None).unwrap(), 5.0);
    }
    #[test]
    fn image_position_object_at_infinity() {
        let mut lens = single_refraction();
        lens.set_object_position(Lens::INFINITE_OBJECT);
        // for an object (nearly) at infinity the image sits (nearly) at -A/C = 100
        assert_relative_eq!(image_position(&lens).unwrap(), 100.0, max_relative = 1e-3);
    }
    #[test]
    fn entrance_pupil_at_stop_surface_2() {
        let lens = lens_with(vec![
            Surface::flat(1, 10.0, vec![1.0]).unwrap(),
            Surface::new(2, 50.0, 5.0, vec![1.5]).unwrap().with_stop(),
            Surface::new(3, -50.0, 95.0, vec![1.0]).unwrap(),
            Surface::flat(4, 0.0, vec![1.0]).unwrap(),
        ]);
        assert_relative_eq!(entrance_pupil(&lens).unwrap(), 0.0);
    }
    #[test]
    fn exit_pupil_at_last_but_one_stop() {
        let lens = lens_with(vec![
            Surface::flat(1, 10.0, vec![1.0]).unwrap(),
            Surface::new(2, 50.0, 5.0, vec![1.5]).unwrap(),
            Surface::new(3, -50.0, 95.0, vec![1.0]).unwrap().with_stop(),
            Surface::flat(4, 0.0, vec![1.0]).unwrap(),
        ]);
        assert_relative_eq!(exit_pupil(&lens).unwrap(), 0.0);
    }
    #[test]
    fn entrance_pupil_stop_on_first_surface() {
        let lens = lens_with(vec![
            Surface::new(1, 50.0, 5.0, vec![1.5]).unwrap().with_stop(),
            Surface::new(2, -50.0, 95.0, vec![1.0]).unwrap(),
            Surface::flat(3, 0.0, vec![1.0]).unwrap(),
        ]);
        assert_matches!(entrance_pupil(&lens), Err(ParalensError::InvalidGeometry(_)));
    }
    #[test]
    fn entrance_pupil_behind_a_refracting_surface() {
        let lens = lens_with(vec![
            Surface::flat(1, 10.0, vec![1.0]).unwrap(),
            Surface::new(2, 50.0, 5.0, vec![1.5]).unwrap(),
            Surface::flat(3, 2.0, vec![1.5]).unwrap().with_stop(),
            Surface::new(4, -50.0, 95.0, vec![1.0]).unwrap(),
            Surface::flat(5, 0.0, vec![1.0]).unwrap(),
        ]);
        // chain [2, 2]: phi = (1.5 - 1.0)/50, P = P' = 0, t_stop = 5
        let phi = 0.5 / 50.0;
        let expected = 1.0 / (1.0 / 5.0 - phi);
        assert_relative_eq!(entrance_pupil(&lens).unwrap(), expected, epsilon = 1e-12);
    }
    #[test]
    fn exit_pupil_ahead_of_a_refracting_surface() {
        let lens = lens_with(vec![
            Surface::flat(1, 10.0, vec![1.0]).unwrap(),
            Surface::flat(2, 5.0, vec![1.0]).unwrap().with_stop(),
            Surface::new(3, 50.0, 95.0, vec![1.5]).unwrap(),
            Surface::flat(4, 0.0, vec![1.5]).unwrap(),
        ]);
        // chain [3, 3]: phi = (1.5 - 1.0)/50, P = P' = 0, t_stop = 5 (the stop's own gap)
        let phi = 0.5 / 50.0;
        let expected = 1.0 / (-1.0 / 5.0 + phi);
        assert_relative_eq!(exit_pupil(&lens).unwrap(), expected, epsilon = 1e-12);
    }
    #[test]
    fn missing_stop() {
        let lens = single_refraction();
        assert_matches!(entrance_pupil(&lens), Err(ParalensError::MissingStop(_)));
        assert_matches!(exit_pupil(&lens), Err(ParalensError::MissingStop(_)));
    }
}

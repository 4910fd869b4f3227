#![warn(missing_docs)]
//! Spot-diagram metrics
//!
//! Aggregates the intercept coordinates of a traced ray bundle at one surface
//! (typically the image plane) into the RMS spot radius, the Airy disc radius and the
//! fraction of rays falling inside the Airy disc.
use log::info;
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::millimeter};

use crate::error::{ParalensError, PlResult};

/// Aggregate metrics of one spot diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotMetrics {
    /// RMS spot radius in millimeters (mean radial deviation from the centroid)
    pub rms: f64,
    /// Airy disc radius `1.22 * lambda * F#` in millimeters
    pub airy_radius: f64,
    /// fraction of rays whose centroid-relative radius is within the Airy disc
    pub fraction_inside: f64,
}

/// Returns the RMS spot radius of a set of `(x, y)` intercepts in millimeters.
///
/// Each axis is centered on its own mean first; the result is the *mean* Euclidean
/// distance from the centroid, not the quadratic root mean square. Downstream
/// Airy-fraction comparisons are calibrated against this definition, so it must not
/// be swapped for a true quadratic RMS.
///
/// # Errors
/// This function returns an error if the intercept set is empty.
pub fn rms(points: &[(f64, f64)]) -> PlResult<f64> {
    let centroid = centroid(points)?;
    let count = points.len() as f64;
    Ok(points
        .iter()
        .map(|(x, y)| (x - centroid.0).hypot(y - centroid.1))
        .sum::<f64>()
        / count)
}

/// Returns the Airy disc radius `1.22 * lambda * F#` in millimeters.
#[must_use]
pub fn airy_radius(wavelength: Length, f_number: f64) -> f64 {
    1.22 * wavelength.get::<millimeter>() * f_number
}

/// Computes the [`SpotMetrics`] of a set of `(x, y)` intercepts.
///
/// The encircled fraction counts the rays whose distance from the spot centroid is
/// within the Airy radius.
///
/// # Errors
/// This function returns an error if the intercept set is empty.
pub fn spot_metrics(
    points: &[(f64, f64)],
    wavelength: Length,
    f_number: f64,
) -> PlResult<SpotMetrics> {
    info!("calculating spot metrics over {} rays", points.len());
    let rms = rms(points)?;
    let airy_radius = airy_radius(wavelength, f_number);
    let centroid = centroid(points)?;
    let inside = points
        .iter()
        .filter(|(x, y)| (x - centroid.0).hypot(y - centroid.1) <= airy_radius)
        .count();
    Ok(SpotMetrics {
        rms,
        airy_radius,
        fraction_inside: inside as f64 / points.len() as f64,
    })
}

fn centroid(points: &[(f64, f64)]) -> PlResult<(f64, f64)> {
    if points.is_empty() {
        return Err(ParalensError::Analysis(
            "empty intercept set, cannot compute spot metrics".into(),
        ));
    }
    let count = points.len() as f64;
    let x = points.iter().map(|p| p.0).sum::<f64>() / count;
    let y = points.iter().map(|p| p.1).sum::<f64>() / count;
    Ok((x, y))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nanometer;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    #[test]
    fn rms_of_symmetric_set() {
        let points = vec![(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];
        assert_relative_eq!(rms(&points).unwrap(), 1.0);
    }
    #[test]
    fn rms_is_centroid_relative() {
        // same shape shifted away from the origin
        let points = vec![(11.0, 5.0), (9.0, 5.0), (10.0, 6.0), (10.0, 4.0)];
        assert_relative_eq!(rms(&points).unwrap(), 1.0);
    }
    #[test]
    fn rms_is_mean_radius_not_quadratic() {
        // radii from the centroid (0,0) are 1 and 3: mean 2, quadratic RMS sqrt(5)
        let points = vec![(1.0, 0.0), (-1.0, 0.0), (3.0, 0.0), (-3.0, 0.0)];
        assert_relative_eq!(rms(&points).unwrap(), 2.0);
    }
    #[test]
    fn rms_empty_fails() {
        assert_matches!(rms(&[]), Err(ParalensError::Analysis(_)));
    }
    #[test]
    fn airy() {
        // 1.22 * 500 nm * F/10 = 6.1 um
        assert_relative_eq!(airy_radius(nanometer!(500.0), 10.0), 6.1e-3);
    }
    #[test]
    fn metrics() {
        // two rays on the centroid, two well outside the Airy disc
        let points = vec![(0.0, 0.0), (0.0, 0.0), (0.1, 0.0), (-0.1, 0.0)];
        let metrics = spot_metrics(&points, nanometer!(500.0), 10.0).unwrap();
        assert_relative_eq!(metrics.airy_radius, 6.1e-3);
        assert_relative_eq!(metrics.fraction_inside, 0.5);
        assert_relative_eq!(metrics.rms, 0.05);
    }
    #[test]
    fn metrics_empty_fails() {
        assert_matches!(
            spot_metrics(&[], nanometer!(500.0), 10.0),
            Err(ParalensError::Analysis(_))
        );
    }
}

//! Log-space pressure interpolation between altitude layers.

use atmo_common::{AtmoError, AtmoResult};

use crate::interpolation::lerp;

/// Pressures at or below this fall back to linear interpolation.
pub const PRESSURE_EPSILON: f64 = 1e-6;

/// Bounds applied to `ln(p1 / p2)`.
pub const MIN_LOG_RATIO: f64 = -50.0;
pub const MAX_LOG_RATIO: f64 = 50.0;

/// Interpolate between two altitude-bracketing pressures.
///
/// `by` is the weight of `p2`. Pressure falls off exponentially, so the
/// blend is `p1 · exp(-lerp(0, ln(p1/p2), by))`.
pub fn interpolate_pressure(p1: f64, p2: f64, by: f64) -> AtmoResult<f64> {
    if p1 < 0.0 || p2 < 0.0 {
        return Err(AtmoError::numeric(format!(
            "negative pressure in interpolation ({p1}, {p2})"
        )));
    }
    if p1 <= PRESSURE_EPSILON || p2 <= PRESSURE_EPSILON {
        return Ok(lerp(p1, p2, by));
    }

    let ratio = (p1 / p2).ln();
    if !ratio.is_finite() {
        return Err(AtmoError::numeric(format!(
            "non-finite log pressure ratio for ({p1}, {p2})"
        )));
    }
    let ratio = ratio.clamp(MIN_LOG_RATIO, MAX_LOG_RATIO);
    Ok(p1 * (-lerp(0.0, ratio, by)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_endpoints() {
        assert_eq!(interpolate_pressure(101.325, 50.0, 0.0).unwrap(), 101.325);
        assert_approx_eq!(interpolate_pressure(101.325, 50.0, 1.0).unwrap(), 50.0, 1e-9);
    }

    #[test]
    fn test_geometric_midpoint() {
        // halfway in log space is the geometric mean
        let mid = interpolate_pressure(100.0, 1.0, 0.5).unwrap();
        assert_approx_eq!(mid, 10.0, 1e-9);
    }

    #[test]
    fn test_monotonic_decreasing() {
        let (p1, p2) = (100.0, 3.0);
        let mut last = f64::INFINITY;
        for i in 0..=100 {
            let by = i as f64 / 100.0;
            let p = interpolate_pressure(p1, p2, by).unwrap();
            assert!(p < last, "not decreasing at by={by}: {p} >= {last}");
            last = p;
        }
    }

    #[test]
    fn test_near_zero_falls_back_to_linear() {
        let p = interpolate_pressure(2.0, 0.0, 0.5).unwrap();
        assert_eq!(p, 1.0);
    }

    #[test]
    fn test_negative_is_error() {
        assert!(matches!(
            interpolate_pressure(-1.0, 2.0, 0.5),
            Err(AtmoError::Numeric(_))
        ));
    }

    #[test]
    fn test_non_finite_is_error() {
        assert!(interpolate_pressure(f64::INFINITY, 2.0, 0.5).is_err());
        assert!(interpolate_pressure(f64::NAN, 2.0, 0.5).is_err());
    }

    #[test]
    fn test_ratio_is_clamped() {
        let p = interpolate_pressure(1e30, 1e-5, 1.0).unwrap();
        assert_approx_eq!(p, 1e30 * (-MAX_LOG_RATIO).exp(), 1e10);
    }
}

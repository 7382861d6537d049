//! Flow, offset and multiplier map evaluation.

use atmo_common::{GeoPoint, Vector3};
use atmo_interp::wrap;

use crate::curve::HermiteCurve;
use crate::image_grid::{ImageGrid, PRIME_MERIDIAN_OFFSET};

/// Response curves and scrolling shared by every map kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Modulation {
    /// Gate as a function of altitude in meters.
    pub altitude_curve: HermiteCurve,
    /// Gate as a function of time in seconds.
    pub time_curve: HermiteCurve,
    /// When set, the time curve is evaluated at `time mod time_period`.
    pub time_period: Option<f64>,
    /// Gate as a function of true anomaly in degrees.
    pub true_anomaly_curve: Option<HermiteCurve>,
    /// Seconds for the map to scroll once around the body.
    pub scroll_period: Option<f64>,
}

impl Modulation {
    /// Default curves: full strength at the surface easing to zero at
    /// `max_altitude`, constant in time, no scrolling.
    pub fn new(max_altitude: f64) -> Self {
        Self {
            altitude_curve: HermiteCurve::ease_out(0.0, max_altitude),
            time_curve: HermiteCurve::constant(1.0),
            time_period: None,
            true_anomaly_curve: None,
            scroll_period: None,
        }
    }

    /// Combined strength at `point`. Non-positive means the map is inactive.
    pub fn gate(&self, point: &GeoPoint, true_anomaly: Option<f64>) -> f64 {
        let time = match self.time_period {
            Some(period) if period > 0.0 => wrap(point.time, period),
            _ => point.time,
        };
        let mut gate = self.altitude_curve.evaluate(point.alt) * self.time_curve.evaluate(time);
        if let (Some(curve), Some(anomaly)) = (&self.true_anomaly_curve, true_anomaly) {
            gate *= curve.evaluate(wrap(anomaly, 360.0));
        }
        gate
    }

    /// Longitude of the image's left edge at `time`.
    pub fn longitude_offset(&self, time: f64) -> f64 {
        match self.scroll_period {
            Some(period) if period > 0.0 => {
                PRIME_MERIDIAN_OFFSET + wrap(time / period * 360.0, 360.0)
            }
            _ => PRIME_MERIDIAN_OFFSET,
        }
    }

    /// The gate when it is strictly positive and finite.
    fn active_gate(&self, point: &GeoPoint, true_anomaly: Option<f64>) -> Option<f64> {
        let gate = self.gate(point, true_anomaly);
        (gate.is_finite() && gate > 0.0).then_some(gate)
    }
}

/// Map whose channels are a wind contribution in m/s.
#[derive(Debug, Clone)]
pub struct FlowMap {
    pub image: ImageGrid,
    pub modulation: Modulation,
    pub east_west: f64,
    pub north_south: f64,
    pub vertical: f64,
    /// Read the blue channel as vertical wind.
    pub use_third_channel: bool,
}

impl FlowMap {
    pub fn new(image: ImageGrid, modulation: Modulation) -> Self {
        Self {
            image,
            modulation,
            east_west: 1.0,
            north_south: 1.0,
            vertical: 1.0,
            use_third_channel: false,
        }
    }

    pub fn evaluate(&self, point: &GeoPoint, true_anomaly: Option<f64>) -> Vector3 {
        let Some(gate) = self.modulation.active_gate(point, true_anomaly) else {
            return Vector3::zeros();
        };
        let offset = self.modulation.longitude_offset(point.time);
        let [r, g, b] = self.image.sample(point.lon, point.lat, offset);
        let up = if self.use_third_channel { b * self.vertical } else { 0.0 };
        Vector3::new(r * self.east_west, g * self.north_south, up) * gate
    }
}

/// Parameters of the scalar map kinds.
#[derive(Debug, Clone)]
pub struct ScalarMapParams {
    pub image: ImageGrid,
    pub modulation: Modulation,
    /// Scale applied to the channel mean.
    pub deformity: f64,
    /// Constant added after scaling.
    pub offset: f64,
}

impl ScalarMapParams {
    /// `((mean(R, G, B) · deformity) + offset) · gate`, or 0 when gated off.
    fn contribution(&self, point: &GeoPoint, true_anomaly: Option<f64>) -> f64 {
        let Some(gate) = self.modulation.active_gate(point, true_anomaly) else {
            return 0.0;
        };
        let lon_offset = self.modulation.longitude_offset(point.time);
        let mean = self.image.sample_sum(point.lon, point.lat, lon_offset) / 3.0;
        (mean * self.deformity + self.offset) * gate
    }
}

/// Additive temperature offset map.
#[derive(Debug, Clone)]
pub struct OffsetMap(pub ScalarMapParams);

impl OffsetMap {
    pub fn evaluate(&self, point: &GeoPoint, true_anomaly: Option<f64>) -> f64 {
        self.0.contribution(point, true_anomaly)
    }
}

/// Multiplicative pressure factor centred on 1.0.
#[derive(Debug, Clone)]
pub struct MultiplierMap(pub ScalarMapParams);

impl MultiplierMap {
    pub fn evaluate(&self, point: &GeoPoint, true_anomaly: Option<f64>) -> f64 {
        (self.0.contribution(point, true_anomaly) + 1.0).max(0.0)
    }
}

/// Sum of every flow map, or `None` when there are none.
pub fn accumulate_flow(maps: &[FlowMap], point: &GeoPoint, true_anomaly: Option<f64>) -> Option<Vector3> {
    if maps.is_empty() {
        return None;
    }
    Some(maps.iter().map(|m| m.evaluate(point, true_anomaly)).sum())
}

/// Sum of every offset map, or `None` when there are none.
pub fn accumulate_offsets(maps: &[OffsetMap], point: &GeoPoint, true_anomaly: Option<f64>) -> Option<f64> {
    if maps.is_empty() {
        return None;
    }
    Some(maps.iter().map(|m| m.evaluate(point, true_anomaly)).sum())
}

/// Product of every multiplier map, or `None` when there are none.
pub fn accumulate_multipliers(
    maps: &[MultiplierMap],
    point: &GeoPoint,
    true_anomaly: Option<f64>,
) -> Option<f64> {
    if maps.is_empty() {
        return None;
    }
    Some(maps.iter().map(|m| m.evaluate(point, true_anomaly)).product())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    fn uniform(rgb: [f32; 3]) -> ImageGrid {
        ImageGrid::from_cells(4, 2, vec![rgb; 8]).unwrap()
    }

    fn scalar(rgb: [f32; 3], deformity: f64, offset: f64) -> ScalarMapParams {
        ScalarMapParams {
            image: uniform(rgb),
            modulation: Modulation::new(10_000.0),
            deformity,
            offset,
        }
    }

    #[test]
    fn test_gate_defaults() {
        let m = Modulation::new(10_000.0);
        assert_eq!(m.gate(&GeoPoint::new(0.0, 0.0, 0.0, 0.0), None), 1.0);
        assert_approx_eq!(m.gate(&GeoPoint::new(0.0, 0.0, 5_000.0, 0.0), None), 0.5, 1e-12);
        assert_eq!(m.gate(&GeoPoint::new(0.0, 0.0, 20_000.0, 0.0), None), 0.0);
    }

    #[test]
    fn test_gate_time_period_and_anomaly() {
        let mut m = Modulation::new(10_000.0);
        m.time_curve = HermiteCurve::plateau(0.0, 10.0, 20.0, 30.0);
        m.time_period = Some(100.0);
        let p = GeoPoint::new(0.0, 0.0, 0.0, 315.0);
        assert_eq!(m.gate(&p, None), 1.0);

        m.true_anomaly_curve = Some(HermiteCurve::constant(0.25));
        assert_eq!(m.gate(&p, Some(90.0)), 0.25);
        // no anomaly reported: curve is ignored
        assert_eq!(m.gate(&p, None), 1.0);
    }

    #[test]
    fn test_nan_gate_is_inactive() {
        let mut m = Modulation::new(10_000.0);
        m.true_anomaly_curve = Some(HermiteCurve::constant(0.5));
        let p = GeoPoint::new(0.0, 0.0, 0.0, 0.0);
        assert!(m.active_gate(&p, Some(f64::NAN)).is_none());
        assert!(m.active_gate(&GeoPoint::new(0.0, 0.0, f64::NAN, 0.0), None).is_none());

        let offset = OffsetMap(scalar([1.0, 1.0, 1.0], 3.0, 2.0));
        assert_eq!(offset.evaluate(&GeoPoint::new(0.0, 0.0, f64::NAN, 0.0), None), 0.0);
    }

    #[test]
    fn test_scroll_offset() {
        let mut m = Modulation::new(1.0);
        assert_eq!(m.longitude_offset(123.0), -180.0);
        m.scroll_period = Some(400.0);
        assert_eq!(m.longitude_offset(100.0), -90.0);
        assert_eq!(m.longitude_offset(400.0), -180.0);
    }

    #[test]
    fn test_flow_channels() {
        let mut flow = FlowMap::new(uniform([0.5, -0.25, 1.0]), Modulation::new(10_000.0));
        flow.east_west = 10.0;
        flow.north_south = 4.0;
        flow.vertical = 2.0;

        let p = GeoPoint::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(flow.evaluate(&p, None), Vector3::new(5.0, -1.0, 0.0));

        flow.use_third_channel = true;
        assert_eq!(flow.evaluate(&p, None), Vector3::new(5.0, -1.0, 2.0));

        let high = GeoPoint::new(30.0, 10.0, 50_000.0, 0.0);
        assert_eq!(flow.evaluate(&high, None), Vector3::zeros());
    }

    #[test]
    fn test_offset_formula() {
        let map = OffsetMap(scalar([0.3, 0.6, 0.9], 10.0, 2.0));
        let p = GeoPoint::new(0.0, 0.0, 5_000.0, 0.0);
        // mean 0.6 → (6 + 2) · 0.5
        assert_approx_eq!(map.evaluate(&p, None), 4.0, 1e-6);
    }

    #[test]
    fn test_neutral_multiplier_is_one() {
        let map = MultiplierMap(scalar([0.9, -0.7, 0.2], 0.0, 0.0));
        for (lon, lat, alt) in [(0.0, 0.0, 0.0), (123.0, -45.0, 2_000.0), (-170.0, 89.0, 50_000.0)] {
            assert_eq!(map.evaluate(&GeoPoint::new(lon, lat, alt, 77.0), None), 1.0);
        }
    }

    #[test]
    fn test_multiplier_floors_at_zero() {
        let map = MultiplierMap(scalar([0.0, 0.0, 0.0], 0.0, -5.0));
        assert_eq!(map.evaluate(&GeoPoint::new(0.0, 0.0, 0.0, 0.0), None), 0.0);
    }

    #[test]
    fn test_accumulation_rules() {
        let p = GeoPoint::new(0.0, 0.0, 0.0, 0.0);
        assert!(accumulate_flow(&[], &p, None).is_none());
        assert!(accumulate_offsets(&[], &p, None).is_none());
        assert!(accumulate_multipliers(&[], &p, None).is_none());

        let offsets = vec![
            OffsetMap(scalar([0.0; 3], 0.0, 1.5)),
            OffsetMap(scalar([0.0; 3], 0.0, 2.5)),
        ];
        assert_eq!(accumulate_offsets(&offsets, &p, None), Some(4.0));

        let multipliers = vec![
            MultiplierMap(scalar([0.0; 3], 0.0, 1.0)),
            MultiplierMap(scalar([0.0; 3], 0.0, 0.5)),
        ];
        assert_eq!(accumulate_multipliers(&multipliers, &p, None), Some(3.0));

        let flows = vec![
            FlowMap::new(uniform([0.5, 0.0, 0.0]), Modulation::new(1_000.0)),
            FlowMap::new(uniform([0.25, 0.5, 0.0]), Modulation::new(1_000.0)),
        ];
        assert_eq!(accumulate_flow(&flows, &p, None), Some(Vector3::new(0.75, 0.5, 0.0)));
    }
}

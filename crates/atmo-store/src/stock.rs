//! The host's intrinsic atmosphere model.
//!
//! Gridded data and maps only cover part of a body's atmosphere. Wherever
//! they don't (missing datasets, above a dataset's model top, blended
//! datasets) the facade falls back to a [`StockAtmosphere`].

use std::collections::HashMap;
use std::path::Path;

use atmo_common::{AtmoError, AtmoResult};
use atmo_interp::wrap;
use serde::Deserialize;
use tracing::debug;

/// Atmosphere properties supplied by the host simulation.
///
/// Every method returns `None` for bodies the host knows nothing about.
pub trait StockAtmosphere {
    /// Height of the top of the atmosphere in meters.
    fn atmosphere_depth(&self, body: &str) -> Option<f64>;

    /// Temperature in Kelvin.
    fn temperature(&self, body: &str, lat: f64, alt: f64, time: f64) -> Option<f64>;

    /// Pressure in kPa.
    fn pressure(&self, body: &str, alt: f64) -> Option<f64>;

    /// The body's current true anomaly in degrees.
    fn true_anomaly(&self, _body: &str, _time: f64) -> Option<f64> {
        None
    }
}

impl<S: StockAtmosphere + ?Sized> StockAtmosphere for &S {
    fn atmosphere_depth(&self, body: &str) -> Option<f64> {
        (**self).atmosphere_depth(body)
    }

    fn temperature(&self, body: &str, lat: f64, alt: f64, time: f64) -> Option<f64> {
        (**self).temperature(body, lat, alt, time)
    }

    fn pressure(&self, body: &str, alt: f64) -> Option<f64> {
        (**self).pressure(body, alt)
    }

    fn true_anomaly(&self, body: &str, time: f64) -> Option<f64> {
        (**self).true_anomaly(body, time)
    }
}

/// Parameters of one body in [`ExponentialAtmosphere`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyProfile {
    /// Atmosphere depth in meters
    pub depth: f64,
    /// Equatorial sea-level temperature in Kelvin
    pub surface_temperature: f64,
    /// Kelvin lost per meter of altitude
    pub lapse_rate: f64,
    /// Floor applied after the lapse rate
    pub min_temperature: f64,
    /// Kelvin lost at the poles relative to the equator
    pub polar_drop: f64,
    /// Peak day/night swing in Kelvin
    pub diurnal_amplitude: f64,
    /// Seconds per solar day; 0 disables the diurnal term
    pub day_length: f64,
    /// Sea-level pressure in kPa
    pub surface_pressure: f64,
    /// Pressure e-folding height in meters
    pub scale_height: f64,
    /// Orbital period in seconds; enables a circular-orbit true anomaly
    pub orbital_period: Option<f64>,
    /// True anomaly at time 0, degrees
    pub initial_anomaly: f64,
}

impl Default for BodyProfile {
    fn default() -> Self {
        Self {
            depth: 70_000.0,
            surface_temperature: 288.15,
            lapse_rate: 0.0045,
            min_temperature: 160.0,
            polar_drop: 30.0,
            diurnal_amplitude: 0.0,
            day_length: 0.0,
            surface_pressure: 101.325,
            scale_height: 5_600.0,
            orbital_period: None,
            initial_anomaly: 0.0,
        }
    }
}

impl BodyProfile {
    pub fn temperature(&self, lat: f64, alt: f64, time: f64) -> f64 {
        let alt = alt.clamp(0.0, self.depth);
        let sin_lat = lat.to_radians().sin();
        let mut t = self.surface_temperature - self.polar_drop * sin_lat * sin_lat - self.lapse_rate * alt;
        if self.day_length > 0.0 && self.diurnal_amplitude != 0.0 {
            let phase = wrap(time, self.day_length) / self.day_length;
            t += self.diurnal_amplitude * (phase * std::f64::consts::TAU).sin();
        }
        t.max(self.min_temperature)
    }

    /// Zero at and above the atmosphere depth.
    pub fn pressure(&self, alt: f64) -> f64 {
        if alt >= self.depth {
            return 0.0;
        }
        self.surface_pressure * (-alt.max(0.0) / self.scale_height).exp()
    }

    pub fn true_anomaly(&self, time: f64) -> Option<f64> {
        let period = self.orbital_period.filter(|p| *p > 0.0)?;
        Some(wrap(self.initial_anomaly + wrap(time, period) / period * 360.0, 360.0))
    }
}

#[derive(Debug, Deserialize)]
struct StockFile {
    #[serde(default)]
    bodies: HashMap<String, BodyProfile>,
}

/// A lapse-rate / scale-height atmosphere per body.
#[derive(Debug, Clone, Default)]
pub struct ExponentialAtmosphere {
    bodies: HashMap<String, BodyProfile>,
}

impl ExponentialAtmosphere {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: impl Into<String>, profile: BodyProfile) -> Self {
        self.bodies.insert(body.into(), profile);
        self
    }

    /// Parse a `bodies:` map of profiles.
    pub fn from_yaml_str(yaml: &str) -> AtmoResult<Self> {
        let file: StockFile =
            serde_yaml::from_str(yaml).map_err(|e| AtmoError::config("stock", e.to_string()))?;
        for (body, profile) in &file.bodies {
            if !(profile.depth > 0.0 && profile.scale_height > 0.0) {
                return Err(AtmoError::config(
                    body.as_str(),
                    "depth and scaleHeight must be > 0",
                ));
            }
        }
        Ok(Self { bodies: file.bodies })
    }

    pub fn from_file(path: &Path) -> AtmoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let stock = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), bodies = stock.bodies.len(), "Loaded stock atmosphere");
        Ok(stock)
    }

    pub fn profile(&self, body: &str) -> Option<&BodyProfile> {
        self.bodies.get(body)
    }
}

impl StockAtmosphere for ExponentialAtmosphere {
    fn atmosphere_depth(&self, body: &str) -> Option<f64> {
        self.profile(body).map(|p| p.depth)
    }

    fn temperature(&self, body: &str, lat: f64, alt: f64, time: f64) -> Option<f64> {
        self.profile(body).map(|p| p.temperature(lat, alt, time))
    }

    fn pressure(&self, body: &str, alt: f64) -> Option<f64> {
        self.profile(body).map(|p| p.pressure(alt))
    }

    fn true_anomaly(&self, body: &str, time: f64) -> Option<f64> {
        self.profile(body).and_then(|p| p.true_anomaly(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_default_profile() {
        let p = BodyProfile::default();
        assert_eq!(p.temperature(0.0, 0.0, 0.0), 288.15);
        assert_eq!(p.pressure(0.0), 101.325);
        assert_approx_eq!(p.pressure(5_600.0), 101.325 / std::f64::consts::E, 1e-9);
        assert_eq!(p.pressure(70_000.0), 0.0);
        assert_eq!(p.temperature(0.0, 69_000.0, 0.0), 160.0);
    }

    #[test]
    fn test_poles_are_colder() {
        let p = BodyProfile::default();
        assert_approx_eq!(p.temperature(90.0, 0.0, 0.0), 258.15, 1e-9);
        assert!(p.temperature(45.0, 0.0, 0.0) > p.temperature(80.0, 0.0, 0.0));
    }

    #[test]
    fn test_true_anomaly_circular_orbit() {
        let p = BodyProfile {
            orbital_period: Some(400.0),
            initial_anomaly: 350.0,
            ..Default::default()
        };
        assert_eq!(p.true_anomaly(0.0), Some(350.0));
        assert_eq!(p.true_anomaly(100.0), Some(80.0));
        assert_eq!(BodyProfile::default().true_anomaly(100.0), None);
    }

    #[test]
    fn test_from_yaml() {
        let stock = ExponentialAtmosphere::from_yaml_str(
            "bodies:\n  Duna:\n    depth: 50000\n    surfaceTemperature: 230\n    surfacePressure: 6.75\n",
        )
        .unwrap();
        assert_eq!(stock.atmosphere_depth("Duna"), Some(50_000.0));
        assert_eq!(stock.pressure("Duna", 0.0), Some(6.75));
        assert_eq!(stock.temperature("Duna", 0.0, 0.0, 0.0), Some(230.0));
        assert_eq!(stock.atmosphere_depth("Kerbin"), None);
        assert_eq!(stock.true_anomaly("Duna", 0.0), None);
    }

    #[test]
    fn test_from_yaml_rejects_bad_profile() {
        assert!(ExponentialAtmosphere::from_yaml_str("bodies:\n  Eve:\n    depth: 0\n").is_err());
        assert!(ExponentialAtmosphere::from_yaml_str("bodies: [1, 2]").is_err());
    }
}

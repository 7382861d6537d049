//! Query coordinates.

use serde::{Deserialize, Serialize};

/// A position in space and time on a body.
///
/// Longitude and latitude are degrees, altitude is meters above sea level
/// and time is seconds of universal time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
    pub time: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64, alt: f64, time: f64) -> Self {
        Self { lon, lat, alt, time }
    }
}

//! JSON records printed by the probe.

use atmo_common::{DataInfo, Vector3};
use atmo_store::{DetailedSample, QueryFacade, StockAtmosphere, WindVariability};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PropertyReport<T> {
    pub status: String,
    pub code: i8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<DataInfo>,
}

impl<T> From<DetailedSample<T>> for PropertyReport<T> {
    fn from(sample: DetailedSample<T>) -> Self {
        let status = sample.result.status();
        Self {
            status: status.to_string(),
            code: status.code(),
            value: sample.result.into_value(),
            info: sample.info,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PointReport {
    pub body: String,
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
    pub time: f64,
    /// `[east, north, up]` in m/s
    pub wind: PropertyReport<[f64; 3]>,
    pub temperature: PropertyReport<f64>,
    pub pressure: PropertyReport<f64>,
}

/// Where and when to sample.
#[derive(Debug, Clone, Copy)]
pub struct Probe<'a> {
    pub body: &'a str,
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
    pub time: f64,
}

impl Probe<'_> {
    pub fn at_altitude(&self, alt: f64) -> Self {
        Self { alt, ..*self }
    }
}

/// Sample all three properties at one point, applying gusts to the wind
/// when `gusts` is given.
pub fn sample_point<S: StockAtmosphere>(
    facade: &QueryFacade<S>,
    probe: &Probe<'_>,
    gusts: Option<&mut WindVariability>,
) -> PointReport {
    let Probe { body, lon, lat, alt, time } = *probe;

    let mut wind = facade.sample_wind_detailed(body, lon, lat, alt, time);
    if let Some(gusts) = gusts {
        wind.result = wind.result.map(|w| gusts.apply(w, time));
    }

    PointReport {
        body: body.to_string(),
        lon,
        lat,
        alt,
        time,
        wind: DetailedSample {
            result: wind.result.map(to_array),
            info: wind.info,
        }
        .into(),
        temperature: facade.sample_temperature_detailed(body, lon, lat, alt, time).into(),
        pressure: facade.sample_pressure_detailed(body, lon, lat, alt, time).into(),
    }
}

/// Altitudes from 0 to `top` inclusive, `step` apart. `top` is always
/// included even when it is not a multiple of `step`.
pub fn profile_altitudes(top: f64, step: f64) -> Vec<f64> {
    if !(top.is_finite() && step.is_finite() && step > 0.0) || top < 0.0 {
        return Vec::new();
    }
    let steps = (top / step).floor() as usize;
    let mut altitudes: Vec<f64> = (0..=steps).map(|i| i as f64 * step).collect();
    if altitudes.last().map_or(true, |last| *last < top) {
        altitudes.push(top);
    }
    altitudes
}

fn to_array(v: Vector3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// Count of properties that produced a usable value.
pub fn usable(report: &PointReport) -> usize {
    [
        report.wind.value.is_some(),
        report.temperature.value.is_some(),
        report.pressure.value.is_some(),
    ]
    .into_iter()
    .filter(|ok| *ok)
    .count()
}

//! Combined queries over gridded data, procedural maps and the stock model.
//!
//! For each property the facade samples the body's dataset (if any), folds
//! in its maps (if any) and tags the result:
//!
//! | dataset | maps | result                                                  |
//! |---------|------|---------------------------------------------------------|
//! | ok      | some | wind: sum; temperature: + offsets; pressure: × factors  |
//! | ok      | none | dataset value                                           |
//! | none    | some | wind: maps; temperature/pressure: stock value with maps |
//! | none    | none | `NoData`                                                |
//! | error   | any  | `Error`                                                 |

use atmo_common::{AtmoError, DataInfo, GeoPoint, Sampled, Vector3};
use atmo_interp::{lerp, GridSample};
use procedural_maps::{accumulate_flow, accumulate_multipliers, accumulate_offsets};
use tracing::{debug, warn};

use crate::stock::StockAtmosphere;
use crate::store::{AtmosphereRegistry, BodyAtmosphereStore, ScalarData};

/// Tunables applied to every query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacadeSettings {
    /// Scales the final wind vector.
    pub wind_multiplier: f64,
    /// Shape of the above-top blend toward stock temperature.
    pub temperature_top_exponent: f64,
    /// Shape of the above-top blend toward stock pressure.
    pub pressure_top_exponent: f64,
}

impl Default for FacadeSettings {
    fn default() -> Self {
        Self {
            wind_multiplier: 1.0,
            temperature_top_exponent: 1.0,
            pressure_top_exponent: 2.0,
        }
    }
}

impl FacadeSettings {
    /// Load settings from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(val) = std::env::var("ATMO_WIND_MULTIPLIER") {
            if let Ok(v) = val.parse() {
                settings.wind_multiplier = v;
            }
        }

        if let Ok(val) = std::env::var("ATMO_TEMPERATURE_TOP_EXPONENT") {
            if let Ok(v) = val.parse() {
                settings.temperature_top_exponent = v;
            }
        }

        if let Ok(val) = std::env::var("ATMO_PRESSURE_TOP_EXPONENT") {
            if let Ok(v) = val.parse() {
                settings.pressure_top_exponent = v;
            }
        }

        settings
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.wind_multiplier.is_finite() && self.wind_multiplier >= 0.0) {
            return Err("wind_multiplier must be finite and >= 0".to_string());
        }

        if !(self.temperature_top_exponent.is_finite() && self.temperature_top_exponent > 0.0) {
            return Err("temperature_top_exponent must be > 0".to_string());
        }

        if !(self.pressure_top_exponent.is_finite() && self.pressure_top_exponent > 0.0) {
            return Err("pressure_top_exponent must be > 0".to_string());
        }

        Ok(())
    }
}

/// A query result with the grid brackets that produced it, when a dataset
/// was sampled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailedSample<T> {
    pub result: Sampled<T>,
    pub info: Option<DataInfo>,
}

impl<T> DetailedSample<T> {
    fn no_data() -> Self {
        Self {
            result: Sampled::NoData,
            info: None,
        }
    }

    fn error(info: Option<DataInfo>) -> Self {
        Self {
            result: Sampled::Error,
            info,
        }
    }
}

fn tagged<T>(value: T, above_top: bool, info: Option<DataInfo>) -> DetailedSample<T> {
    let result = if above_top {
        Sampled::AboveTop(value)
    } else {
        Sampled::Within(value)
    };
    DetailedSample { result, info }
}

fn finish_scalar(value: f64, above_top: bool, info: Option<DataInfo>) -> DetailedSample<f64> {
    if value.is_finite() {
        tagged(value, above_top, info)
    } else {
        DetailedSample::error(info)
    }
}

fn finite_point(lon: f64, lat: f64, alt: f64, time: f64) -> Option<GeoPoint> {
    let point = GeoPoint::new(lon, lat, alt, time);
    [lon, lat, alt, time].iter().all(|v| v.is_finite()).then_some(point)
}

/// Read-only query entry point over a loaded registry.
pub struct QueryFacade<S> {
    registry: AtmosphereRegistry,
    stock: S,
    settings: FacadeSettings,
}

impl<S: StockAtmosphere> QueryFacade<S> {
    pub fn new(registry: AtmosphereRegistry, stock: S) -> Self {
        Self {
            registry,
            stock,
            settings: FacadeSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: FacadeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn registry(&self) -> &AtmosphereRegistry {
        &self.registry
    }

    pub fn stock(&self) -> &S {
        &self.stock
    }

    pub fn settings(&self) -> &FacadeSettings {
        &self.settings
    }

    pub fn sample_wind(&self, body: &str, lon: f64, lat: f64, alt: f64, time: f64) -> Sampled<Vector3> {
        self.sample_wind_detailed(body, lon, lat, alt, time).result
    }

    pub fn sample_temperature(&self, body: &str, lon: f64, lat: f64, alt: f64, time: f64) -> Sampled<f64> {
        self.sample_temperature_detailed(body, lon, lat, alt, time).result
    }

    pub fn sample_pressure(&self, body: &str, lon: f64, lat: f64, alt: f64, time: f64) -> Sampled<f64> {
        self.sample_pressure_detailed(body, lon, lat, alt, time).result
    }

    /// Wind in m/s (x east, y north, z up). Above the model top the dataset
    /// saturates to its top layer.
    pub fn sample_wind_detailed(
        &self,
        body: &str,
        lon: f64,
        lat: f64,
        alt: f64,
        time: f64,
    ) -> DetailedSample<Vector3> {
        let Some(store) = self.registry.get(body) else {
            return DetailedSample::no_data();
        };
        let Some(point) = finite_point(lon, lat, alt, time) else {
            return DetailedSample::error(None);
        };

        let grid = match store.wind().map(|w| w.sample(&point)) {
            Some(Ok(sample)) => Some(sample),
            Some(Err(e)) => return self.failed(body, "wind", &e),
            None => None,
        };
        let anomaly = self.true_anomaly(body, !store.flow_maps().is_empty(), time);
        let flow = accumulate_flow(store.flow_maps(), &point, anomaly);

        let (value, above_top, info) = match (grid, flow) {
            (Some(g), Some(f)) => (g.value + f, g.above_top, Some(g.info)),
            (Some(g), None) => (g.value, g.above_top, Some(g.info)),
            (None, Some(f)) => (f, false, None),
            (None, None) => return DetailedSample::no_data(),
        };

        let value = value * self.settings.wind_multiplier;
        if !value.iter().all(|c| c.is_finite()) {
            return DetailedSample::error(info);
        }
        tagged(value, above_top, info)
    }

    /// Temperature in Kelvin.
    pub fn sample_temperature_detailed(
        &self,
        body: &str,
        lon: f64,
        lat: f64,
        alt: f64,
        time: f64,
    ) -> DetailedSample<f64> {
        let Some(store) = self.registry.get(body) else {
            return DetailedSample::no_data();
        };
        let Some(point) = finite_point(lon, lat, alt, time) else {
            return DetailedSample::error(None);
        };
        let stock = || self.stock.temperature(body, lat, alt, time);

        let anomaly = self.true_anomaly(body, !store.offset_maps().is_empty(), time);
        let offsets = accumulate_offsets(store.offset_maps(), &point, anomaly);

        match store.temperature().map(|d| (d, d.sample(&point))) {
            Some((data, Ok(sample))) => {
                let base = self.blend_with_stock(
                    store,
                    data,
                    &sample,
                    alt,
                    stock(),
                    self.settings.temperature_top_exponent,
                );
                finish_scalar(base + offsets.unwrap_or(0.0), sample.above_top, Some(sample.info))
            }
            Some((_, Err(e))) => self.failed(body, "temperature", &e),
            None => match (offsets, stock()) {
                (Some(offset), Some(base)) => finish_scalar(base + offset, false, None),
                _ => DetailedSample::no_data(),
            },
        }
    }

    /// Pressure in kPa.
    pub fn sample_pressure_detailed(
        &self,
        body: &str,
        lon: f64,
        lat: f64,
        alt: f64,
        time: f64,
    ) -> DetailedSample<f64> {
        let Some(store) = self.registry.get(body) else {
            return DetailedSample::no_data();
        };
        let Some(point) = finite_point(lon, lat, alt, time) else {
            return DetailedSample::error(None);
        };
        let stock = || self.stock.pressure(body, alt);

        let anomaly = self.true_anomaly(body, !store.multiplier_maps().is_empty(), time);
        let factor = accumulate_multipliers(store.multiplier_maps(), &point, anomaly);

        match store.pressure().map(|d| (d, d.sample(&point))) {
            Some((data, Ok(sample))) => {
                let base = self.blend_with_stock(
                    store,
                    data,
                    &sample,
                    alt,
                    stock(),
                    self.settings.pressure_top_exponent,
                );
                finish_scalar(base * factor.unwrap_or(1.0), sample.above_top, Some(sample.info))
            }
            Some((_, Err(e))) => self.failed(body, "pressure", &e),
            None => match (factor, stock()) {
                (Some(factor), Some(base)) => finish_scalar(base * factor, false, None),
                _ => DetailedSample::no_data(),
            },
        }
    }

    fn true_anomaly(&self, body: &str, has_maps: bool, time: f64) -> Option<f64> {
        if has_maps {
            self.stock.true_anomaly(body, time)
        } else {
            None
        }
    }

    /// Apply the dataset's stock blend, then fade toward stock above the
    /// model top with weight `((alt - top) / (depth - top))^exponent`.
    fn blend_with_stock(
        &self,
        store: &BodyAtmosphereStore,
        data: &ScalarData,
        sample: &GridSample<f64>,
        alt: f64,
        stock: Option<f64>,
        exponent: f64,
    ) -> f64 {
        let Some(stock) = stock else {
            return sample.value;
        };

        let mut value = sample.value;
        if let Some(factor) = data.blend_factor() {
            value = lerp(value, stock, factor);
        }
        if sample.above_top {
            let top = data.meta().model_top;
            let depth = store
                .atmosphere_depth()
                .or_else(|| self.stock.atmosphere_depth(store.body()));
            let frac = match depth {
                Some(depth) if depth > top => ((alt - top) / (depth - top)).clamp(0.0, 1.0),
                _ => 1.0,
            };
            value = lerp(value, stock, frac.powf(exponent));
        }
        value
    }

    fn failed<T>(&self, body: &str, property: &str, err: &AtmoError) -> DetailedSample<T> {
        if err.is_query_error() {
            debug!(body = %body, property = property, error = %err, "Sample failed");
        } else {
            warn!(body = %body, property = property, error = %err, "Dataset could not be sampled");
        }
        match err {
            AtmoError::NoData(_) => DetailedSample::no_data(),
            _ => DetailedSample::error(None),
        }
    }
}

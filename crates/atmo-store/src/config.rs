//! YAML config nodes for datasets and procedural maps.
//!
//! A config file holds one list per section. Nodes are kept as raw YAML
//! values here and deserialized one at a time by the loader, so a single
//! malformed node does not reject the rest of the file.
//!
//! ```yaml
//! wind:
//!   - body: Kerbin
//!     sizeLon: 72
//!     sizeLat: 36
//!     sizeAlt: 16
//!     timesteps: 4
//!     timestepLength: 21600
//!     path_X: data/kerbin_u.bin
//!     path_Y: data/kerbin_v.bin
//!     path_Z: data/kerbin_w.bin
//! flowMaps:
//!   - body: Kerbin
//!     path: maps/jetstream.png
//!     maxAltitude: 20000
//!     eastWestMultiplier: 15
//! ```

use std::path::{Path, PathBuf};

use atmo_common::{AtmoError, AtmoResult, DatasetMeta, GridShape};
use grid_loader::{ElementWidth, ReadOptions, ReadTag};
use procedural_maps::{HermiteCurve, Modulation};
use serde::Deserialize;

fn one() -> f64 {
    1.0
}

/// Config file sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Wind,
    Temperature,
    Pressure,
    Combined,
    FlowMaps,
    OffsetMaps,
    MultiplierMaps,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 7] = [
        ConfigSection::Wind,
        ConfigSection::Temperature,
        ConfigSection::Pressure,
        ConfigSection::Combined,
        ConfigSection::FlowMaps,
        ConfigSection::OffsetMaps,
        ConfigSection::MultiplierMaps,
    ];

    /// YAML key of the section.
    pub fn key(&self) -> &'static str {
        match self {
            ConfigSection::Wind => "wind",
            ConfigSection::Temperature => "temperature",
            ConfigSection::Pressure => "pressure",
            ConfigSection::Combined => "combined",
            ConfigSection::FlowMaps => "flowMaps",
            ConfigSection::OffsetMaps => "offsetMaps",
            ConfigSection::MultiplierMaps => "multiplierMaps",
        }
    }
}

/// A parsed config file with its nodes still undecoded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigFile {
    pub wind: Vec<serde_yaml::Value>,
    pub temperature: Vec<serde_yaml::Value>,
    pub pressure: Vec<serde_yaml::Value>,
    pub combined: Vec<serde_yaml::Value>,
    pub flow_maps: Vec<serde_yaml::Value>,
    pub offset_maps: Vec<serde_yaml::Value>,
    pub multiplier_maps: Vec<serde_yaml::Value>,
}

impl ConfigFile {
    pub fn from_yaml_str(yaml: &str, source_name: &str) -> AtmoResult<Self> {
        // an empty document is an empty config
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| AtmoError::config(source_name, e.to_string()))
    }

    pub fn nodes(&self, section: ConfigSection) -> &[serde_yaml::Value] {
        match section {
            ConfigSection::Wind => &self.wind,
            ConfigSection::Temperature => &self.temperature,
            ConfigSection::Pressure => &self.pressure,
            ConfigSection::Combined => &self.combined,
            ConfigSection::FlowMaps => &self.flow_maps,
            ConfigSection::OffsetMaps => &self.offset_maps,
            ConfigSection::MultiplierMaps => &self.multiplier_maps,
        }
    }

    pub fn node_count(&self) -> usize {
        ConfigSection::ALL.iter().map(|s| self.nodes(*s).len()).sum()
    }
}

/// A gridded dataset node (wind, temperature, pressure or combined).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetNode {
    pub body: String,
    pub size_lon: usize,
    pub size_lat: usize,
    pub size_alt: usize,
    pub timesteps: usize,
    pub timestep_length: f64,

    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "path_X", default)]
    pub path_x: Option<String>,
    #[serde(rename = "path_Y", default)]
    pub path_y: Option<String>,
    #[serde(rename = "path_Z", default)]
    pub path_z: Option<String>,
    #[serde(default)]
    pub read_order: Vec<String>,

    #[serde(default)]
    pub initial_offset: usize,
    #[serde(default = "one")]
    pub scale_factor: f64,
    #[serde(default)]
    pub invert_altitude: bool,
    #[serde(default)]
    pub double_precision: bool,
    /// Defaults to the body's atmosphere depth.
    #[serde(default)]
    pub model_top: Option<f64>,
    #[serde(default)]
    pub longitude_offset: f64,
    #[serde(default)]
    pub time_offset: f64,
    #[serde(default = "one")]
    pub vertical_wind_multiplier: f64,

    #[serde(default)]
    pub blend_with_stock: bool,
    #[serde(default)]
    pub blend_factor: f64,
}

impl DatasetNode {
    pub fn shape(&self) -> GridShape {
        GridShape::new(self.size_lon, self.size_lat, self.size_alt, self.timesteps)
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            shape: self.shape(),
            initial_offset: self.initial_offset,
            invert_altitude: self.invert_altitude,
            width: ElementWidth::from_double_precision(self.double_precision),
        }
    }

    /// Axis metadata. `modelTop` defaults to and is clamped to `depth`.
    pub fn meta(&self, depth: Option<f64>) -> AtmoResult<DatasetMeta> {
        let model_top = match (self.model_top, depth) {
            (Some(top), Some(depth)) => top.min(depth),
            (Some(top), None) => top,
            (None, Some(depth)) => depth,
            (None, None) => {
                return Err(AtmoError::config(
                    &self.body,
                    "modelTop is required when the atmosphere depth is unknown",
                ))
            }
        };
        let meta = DatasetMeta {
            scale_factor: self.scale_factor,
            time_step_seconds: self.timestep_length,
            model_top,
            longitude_offset: self.longitude_offset,
            time_offset: self.time_offset,
        };
        meta.validate()?;
        Ok(meta)
    }

    /// Stock blend factor, when blending is enabled.
    pub fn stock_blend(&self) -> Option<f64> {
        self.blend_with_stock.then_some(self.blend_factor)
    }

    pub fn read_tags(&self) -> Vec<ReadTag> {
        self.read_order.iter().map(|s| ReadTag::parse(s)).collect()
    }

    /// The single `path`, resolved against `base`.
    pub fn data_path(&self, base: &Path) -> AtmoResult<PathBuf> {
        self.path
            .as_deref()
            .map(|p| resolve_path(base, p))
            .ok_or_else(|| AtmoError::config(&self.body, "missing 'path'"))
    }

    /// The three wind component paths, resolved against `base`.
    pub fn wind_paths(&self, base: &Path) -> AtmoResult<[PathBuf; 3]> {
        match (&self.path_x, &self.path_y, &self.path_z) {
            (Some(x), Some(y), Some(z)) => Ok([
                resolve_path(base, x),
                resolve_path(base, y),
                resolve_path(base, z),
            ]),
            _ => Err(AtmoError::config(
                &self.body,
                "wind needs path_X, path_Y and path_Z",
            )),
        }
    }
}

/// A procedural map node (flow, offset or multiplier).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapNode {
    pub body: String,
    pub path: String,

    /// Top of the default altitude curve; defaults to the atmosphere depth.
    #[serde(default)]
    pub max_altitude: Option<f64>,
    #[serde(default)]
    pub altitude_curve: Option<HermiteCurve>,
    #[serde(default)]
    pub time_curve: Option<HermiteCurve>,
    #[serde(default)]
    pub time_period: Option<f64>,
    #[serde(default)]
    pub true_anomaly_curve: Option<HermiteCurve>,

    #[serde(default)]
    pub scrolling: bool,
    #[serde(default)]
    pub scroll_period: Option<f64>,

    #[serde(default = "one")]
    pub deformity: f64,
    #[serde(default)]
    pub offset: f64,

    #[serde(default = "one")]
    pub east_west_multiplier: f64,
    #[serde(default = "one")]
    pub north_south_multiplier: f64,
    #[serde(default = "one")]
    pub vertical_multiplier: f64,
    #[serde(default)]
    pub use_third_channel: bool,
}

impl MapNode {
    pub fn image_path(&self, base: &Path) -> PathBuf {
        resolve_path(base, &self.path)
    }

    pub fn modulation(&self, depth: Option<f64>) -> AtmoResult<Modulation> {
        let max_altitude = match self.max_altitude.or(depth) {
            Some(alt) if alt > 0.0 => alt,
            Some(alt) => {
                return Err(AtmoError::config(
                    &self.body,
                    format!("maxAltitude must be > 0, got {alt}"),
                ))
            }
            None => {
                return Err(AtmoError::config(
                    &self.body,
                    "maxAltitude is required when the atmosphere depth is unknown",
                ))
            }
        };

        let mut modulation = Modulation::new(max_altitude);
        if let Some(curve) = &self.altitude_curve {
            modulation.altitude_curve = curve.clone();
        }
        if let Some(curve) = &self.time_curve {
            modulation.time_curve = curve.clone();
        }
        modulation.time_period = self.time_period.filter(|p| *p > 0.0);
        modulation.true_anomaly_curve = self.true_anomaly_curve.clone();

        if self.scrolling {
            match self.scroll_period {
                Some(period) if period > 0.0 => modulation.scroll_period = Some(period),
                _ => {
                    return Err(AtmoError::config(
                        &self.body,
                        "scrolling maps need a positive scrollPeriod",
                    ))
                }
            }
        }
        Ok(modulation)
    }
}

/// Relative paths are taken from the config file's directory.
pub fn resolve_path(base: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

/// Expand `${VAR}` and `${VAR:-default}` references in config text.
pub fn expand_env_vars(content: &str, source_name: &str) -> AtmoResult<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' || chars.peek() != Some(&'{') {
            result.push(ch);
            continue;
        }
        chars.next();

        let mut expr = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => expr.push(c),
                None => {
                    return Err(AtmoError::config(
                        source_name,
                        format!("unclosed variable substitution: ${{{expr}"),
                    ))
                }
            }
        }

        let value = match expr.split_once(":-") {
            Some((name, default)) => match std::env::var(name.trim()) {
                Ok(val) if !val.is_empty() => val,
                _ => default.to_string(),
            },
            None => std::env::var(expr.trim()).map_err(|_| {
                AtmoError::config(source_name, format!("environment variable {expr} not set"))
            })?,
        };
        result.push_str(&value);
    }

    Ok(result)
}

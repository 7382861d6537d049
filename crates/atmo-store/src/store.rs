//! Loaded datasets and maps, grouped per body.

use std::collections::BTreeMap;

use atmo_common::{AtmoError, AtmoResult, DatasetMeta, GeoPoint, Grid4, GridShape, Vector3};
use atmo_interp::{sample_pressure, sample_scalar, sample_wind, GridSample};
use procedural_maps::{FlowMap, MultiplierMap, OffsetMap};
use serde::Serialize;
use tracing::info;

/// A wind dataset: one grid per component sharing axes.
#[derive(Debug, Clone)]
pub struct WindData {
    x: Grid4,
    y: Grid4,
    z: Grid4,
    meta: DatasetMeta,
    vertical_multiplier: f64,
}

impl WindData {
    pub fn new(x: Grid4, y: Grid4, z: Grid4, meta: DatasetMeta, vertical_multiplier: f64) -> AtmoResult<Self> {
        if x.shape() != y.shape() || x.shape() != z.shape() {
            return Err(AtmoError::InvalidGrid(format!(
                "wind component shapes differ: {:?} / {:?} / {:?}",
                x.shape(),
                y.shape(),
                z.shape()
            )));
        }
        meta.validate()?;
        Ok(Self {
            x,
            y,
            z,
            meta,
            vertical_multiplier,
        })
    }

    pub fn shape(&self) -> GridShape {
        self.x.shape()
    }

    pub fn meta(&self) -> &DatasetMeta {
        &self.meta
    }

    pub fn sample(&self, point: &GeoPoint) -> AtmoResult<GridSample<Vector3>> {
        sample_wind(&self.x, &self.y, &self.z, &self.meta, self.vertical_multiplier, point)
    }
}

/// Which interpolation a scalar dataset needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Temperature,
    Pressure,
}

/// A temperature or pressure dataset.
#[derive(Debug, Clone)]
pub struct ScalarData {
    kind: ScalarKind,
    grid: Grid4,
    meta: DatasetMeta,
    blend_factor: Option<f64>,
}

impl ScalarData {
    pub fn new(kind: ScalarKind, grid: Grid4, meta: DatasetMeta) -> AtmoResult<Self> {
        meta.validate()?;
        Ok(Self {
            kind,
            grid,
            meta,
            blend_factor: None,
        })
    }

    /// Lerp sampled values toward the stock value by `factor` (clamped to `[0, 1]`).
    pub fn with_stock_blend(mut self, factor: f64) -> Self {
        self.blend_factor = Some(factor.clamp(0.0, 1.0));
        self
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn shape(&self) -> GridShape {
        self.grid.shape()
    }

    pub fn meta(&self) -> &DatasetMeta {
        &self.meta
    }

    pub fn blend_factor(&self) -> Option<f64> {
        self.blend_factor
    }

    pub fn sample(&self, point: &GeoPoint) -> AtmoResult<GridSample<f64>> {
        match self.kind {
            ScalarKind::Temperature => sample_scalar(&self.grid, &self.meta, point),
            ScalarKind::Pressure => sample_pressure(&self.grid, &self.meta, point),
        }
    }
}

/// Shape and axis metadata of one loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub shape: GridShape,
    pub model_top: f64,
    pub time_step_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend_factor: Option<f64>,
}

/// What is loaded for one body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySummary {
    pub body: String,
    pub atmosphere_depth: Option<f64>,
    pub wind: Option<DatasetSummary>,
    pub temperature: Option<DatasetSummary>,
    pub pressure: Option<DatasetSummary>,
    pub flow_maps: usize,
    pub offset_maps: usize,
    pub multiplier_maps: usize,
}

/// Everything loaded for one body.
#[derive(Debug, Clone)]
pub struct BodyAtmosphereStore {
    body: String,
    atmosphere_depth: Option<f64>,
    wind: Option<WindData>,
    temperature: Option<ScalarData>,
    pressure: Option<ScalarData>,
    flow_maps: Vec<FlowMap>,
    offset_maps: Vec<OffsetMap>,
    multiplier_maps: Vec<MultiplierMap>,
}

impl BodyAtmosphereStore {
    pub fn new(body: impl Into<String>, atmosphere_depth: Option<f64>) -> Self {
        Self {
            body: body.into(),
            atmosphere_depth,
            wind: None,
            temperature: None,
            pressure: None,
            flow_maps: Vec::new(),
            offset_maps: Vec::new(),
            multiplier_maps: Vec::new(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn atmosphere_depth(&self) -> Option<f64> {
        self.atmosphere_depth
    }

    /// Install the wind dataset. A body holds at most one; the first wins.
    pub fn set_wind(&mut self, wind: WindData) -> AtmoResult<()> {
        if self.wind.is_some() {
            return Err(AtmoError::config(&self.body, "wind data already loaded"));
        }
        self.wind = Some(wind);
        Ok(())
    }

    /// Install a scalar dataset into the slot matching its kind.
    pub fn set_scalar(&mut self, data: ScalarData) -> AtmoResult<()> {
        let (slot, name) = match data.kind() {
            ScalarKind::Temperature => (&mut self.temperature, "temperature"),
            ScalarKind::Pressure => (&mut self.pressure, "pressure"),
        };
        if slot.is_some() {
            return Err(AtmoError::config(&self.body, format!("{name} data already loaded")));
        }
        *slot = Some(data);
        Ok(())
    }

    pub fn add_flow_map(&mut self, map: FlowMap) {
        self.flow_maps.push(map);
    }

    pub fn add_offset_map(&mut self, map: OffsetMap) {
        self.offset_maps.push(map);
    }

    pub fn add_multiplier_map(&mut self, map: MultiplierMap) {
        self.multiplier_maps.push(map);
    }

    pub fn wind(&self) -> Option<&WindData> {
        self.wind.as_ref()
    }

    pub fn temperature(&self) -> Option<&ScalarData> {
        self.temperature.as_ref()
    }

    pub fn pressure(&self) -> Option<&ScalarData> {
        self.pressure.as_ref()
    }

    pub fn flow_maps(&self) -> &[FlowMap] {
        &self.flow_maps
    }

    pub fn offset_maps(&self) -> &[OffsetMap] {
        &self.offset_maps
    }

    pub fn multiplier_maps(&self) -> &[MultiplierMap] {
        &self.multiplier_maps
    }

    pub fn is_empty(&self) -> bool {
        self.wind.is_none()
            && self.temperature.is_none()
            && self.pressure.is_none()
            && self.flow_maps.is_empty()
            && self.offset_maps.is_empty()
            && self.multiplier_maps.is_empty()
    }

    pub fn summary(&self) -> BodySummary {
        let dataset = |shape: GridShape, meta: &DatasetMeta, blend_factor: Option<f64>| DatasetSummary {
            shape,
            model_top: meta.model_top,
            time_step_seconds: meta.time_step_seconds,
            blend_factor,
        };
        BodySummary {
            body: self.body.clone(),
            atmosphere_depth: self.atmosphere_depth,
            wind: self.wind.as_ref().map(|w| dataset(w.shape(), w.meta(), None)),
            temperature: self
                .temperature
                .as_ref()
                .map(|t| dataset(t.shape(), t.meta(), t.blend_factor())),
            pressure: self
                .pressure
                .as_ref()
                .map(|p| dataset(p.shape(), p.meta(), p.blend_factor())),
            flow_maps: self.flow_maps.len(),
            offset_maps: self.offset_maps.len(),
            multiplier_maps: self.multiplier_maps.len(),
        }
    }
}

/// All bodies with loaded atmosphere data, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct AtmosphereRegistry {
    bodies: BTreeMap<String, BodyAtmosphereStore>,
}

impl AtmosphereRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, body: &str) -> Option<&BodyAtmosphereStore> {
        self.bodies.get(body)
    }

    /// The store for `body`, created with `depth` on first use.
    pub fn entry(&mut self, body: &str, depth: Option<f64>) -> &mut BodyAtmosphereStore {
        self.bodies.entry(body.to_string()).or_insert_with(|| {
            info!(body = %body, depth = ?depth, "Registered body");
            BodyAtmosphereStore::new(body, depth)
        })
    }

    pub fn insert(&mut self, store: BodyAtmosphereStore) -> Option<BodyAtmosphereStore> {
        self.bodies.insert(store.body().to_string(), store)
    }

    /// Body names in sorted order.
    pub fn bodies(&self) -> impl Iterator<Item = &str> {
        self.bodies.keys().map(String::as_str)
    }

    pub fn summaries(&self) -> Vec<BodySummary> {
        self.bodies.values().map(BodyAtmosphereStore::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

//! Populate an [`AtmosphereRegistry`] from config files.
//!
//! Nodes are independent: a node that fails to parse or whose files cannot
//! be read is logged and skipped, and loading continues with the next one.

use std::path::Path;

use atmo_common::{AtmoError, AtmoResult, Grid4};
use grid_loader::{read_combined_file, read_grid_file};
use procedural_maps::{FlowMap, ImageGrid, MultiplierMap, OffsetMap, ScalarMapParams};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{expand_env_vars, ConfigFile, ConfigSection, DatasetNode, MapNode};
use crate::stock::StockAtmosphere;
use crate::store::{AtmosphereRegistry, ScalarData, ScalarKind, WindData};

/// Counts from one or more config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Config files read successfully
    pub files: usize,
    /// Config files that could not be read or parsed at all
    pub failed_files: usize,
    /// Nodes installed into a store
    pub loaded: usize,
    /// Nodes rejected
    pub skipped: usize,
}

impl LoadReport {
    pub fn merge(&mut self, other: &LoadReport) {
        self.files += other.files;
        self.failed_files += other.failed_files;
        self.loaded += other.loaded;
        self.skipped += other.skipped;
    }
}

/// Load every `*.yaml` / `*.yml` file under `dir`, recursively, in path order.
///
/// Files that cannot be parsed are counted in `failed_files` and skipped.
pub fn load_config_dir<S: StockAtmosphere + ?Sized>(
    dir: &Path,
    registry: &mut AtmosphereRegistry,
    stock: &S,
) -> AtmoResult<LoadReport> {
    if !dir.is_dir() {
        return Err(AtmoError::Io(format!("{} is not a directory", dir.display())));
    }

    let mut report = LoadReport::default();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Failed to walk config directory");
                continue;
            }
        };
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        if !entry.file_type().is_file() || !is_yaml {
            continue;
        }

        match load_config_file(path, registry, stock) {
            Ok(file_report) => report.merge(&file_report),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping config file");
                report.failed_files += 1;
            }
        }
    }

    info!(
        dir = %dir.display(),
        files = report.files,
        loaded = report.loaded,
        skipped = report.skipped,
        "Loaded atmosphere configs"
    );
    Ok(report)
}

/// Load one config file. Relative paths inside resolve against its directory.
pub fn load_config_file<S: StockAtmosphere + ?Sized>(
    path: &Path,
    registry: &mut AtmosphereRegistry,
    stock: &S,
) -> AtmoResult<LoadReport> {
    let content = std::fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    load_config_str(&content, base, &path.display().to_string(), registry, stock)
}

/// Load config text. `base` is the directory relative paths resolve against.
pub fn load_config_str<S: StockAtmosphere + ?Sized>(
    content: &str,
    base: &Path,
    source_name: &str,
    registry: &mut AtmosphereRegistry,
    stock: &S,
) -> AtmoResult<LoadReport> {
    let expanded = expand_env_vars(content, source_name)?;
    let file = ConfigFile::from_yaml_str(&expanded, source_name)?;
    debug!(source = source_name, nodes = file.node_count(), "Parsed config file");

    let mut report = LoadReport {
        files: 1,
        ..Default::default()
    };
    for section in ConfigSection::ALL {
        for (index, node) in file.nodes(section).iter().enumerate() {
            match load_node(section, node, base, registry, stock) {
                Ok(()) => report.loaded += 1,
                Err(e) => {
                    warn!(
                        source = source_name,
                        section = section.key(),
                        index = index,
                        error = %e,
                        "Skipping config node"
                    );
                    report.skipped += 1;
                }
            }
        }
    }
    Ok(report)
}

fn parse_node<T: DeserializeOwned>(section: ConfigSection, node: &serde_yaml::Value) -> AtmoResult<T> {
    serde_yaml::from_value(node.clone()).map_err(|e| AtmoError::config(section.key(), e.to_string()))
}

fn load_node<S: StockAtmosphere + ?Sized>(
    section: ConfigSection,
    node: &serde_yaml::Value,
    base: &Path,
    registry: &mut AtmosphereRegistry,
    stock: &S,
) -> AtmoResult<()> {
    match section {
        ConfigSection::Wind => load_wind(parse_node(section, node)?, base, registry, stock),
        ConfigSection::Temperature => {
            load_scalar(ScalarKind::Temperature, parse_node(section, node)?, base, registry, stock)
        }
        ConfigSection::Pressure => {
            load_scalar(ScalarKind::Pressure, parse_node(section, node)?, base, registry, stock)
        }
        ConfigSection::Combined => load_combined(parse_node(section, node)?, base, registry, stock),
        ConfigSection::FlowMaps
        | ConfigSection::OffsetMaps
        | ConfigSection::MultiplierMaps => {
            load_map(section, parse_node(section, node)?, base, registry, stock)
        }
    }
}

fn load_wind<S: StockAtmosphere + ?Sized>(
    node: DatasetNode,
    base: &Path,
    registry: &mut AtmosphereRegistry,
    stock: &S,
) -> AtmoResult<()> {
    let depth = stock.atmosphere_depth(&node.body);
    let meta = node.meta(depth)?;
    let options = node.read_options();
    let [px, py, pz] = node.wind_paths(base)?;

    let wind = WindData::new(
        read_grid_file(&px, &options)?,
        read_grid_file(&py, &options)?,
        read_grid_file(&pz, &options)?,
        meta,
        node.vertical_wind_multiplier,
    )?;
    registry.entry(&node.body, depth).set_wind(wind)?;
    info!(body = %node.body, shape = ?options.shape, "Loaded wind data");
    Ok(())
}

fn scalar_data(
    kind: ScalarKind,
    grid: Grid4,
    node: &DatasetNode,
    depth: Option<f64>,
) -> AtmoResult<ScalarData> {
    let data = ScalarData::new(kind, grid, node.meta(depth)?)?;
    Ok(match node.stock_blend() {
        Some(factor) => data.with_stock_blend(factor),
        None => data,
    })
}

fn load_scalar<S: StockAtmosphere + ?Sized>(
    kind: ScalarKind,
    node: DatasetNode,
    base: &Path,
    registry: &mut AtmosphereRegistry,
    stock: &S,
) -> AtmoResult<()> {
    let depth = stock.atmosphere_depth(&node.body);
    let path = node.data_path(base)?;
    let options = node.read_options();
    let data = scalar_data(kind, read_grid_file(&path, &options)?, &node, depth)?;

    registry.entry(&node.body, depth).set_scalar(data)?;
    info!(body = %node.body, kind = ?kind, shape = ?options.shape, "Loaded scalar data");
    Ok(())
}

/// A combined node counts as loaded when at least one dataset was installed.
fn load_combined<S: StockAtmosphere + ?Sized>(
    node: DatasetNode,
    base: &Path,
    registry: &mut AtmosphereRegistry,
    stock: &S,
) -> AtmoResult<()> {
    let depth = stock.atmosphere_depth(&node.body);
    let path = node.data_path(base)?;
    let options = node.read_options();
    let meta = node.meta(depth)?;
    let mut grids = read_combined_file(&path, &options, &node.read_tags())?;

    let store = registry.entry(&node.body, depth);
    let mut installed = 0;

    if let Some((x, y, z)) = grids.take_wind() {
        let wind = WindData::new(x, y, z, meta, node.vertical_wind_multiplier);
        match wind.and_then(|w| store.set_wind(w)) {
            Ok(()) => installed += 1,
            Err(e) => warn!(body = %node.body, error = %e, "Combined wind not installed"),
        }
    } else if grids.wind_x.is_some() || grids.wind_y.is_some() || grids.wind_z.is_some() {
        warn!(body = %node.body, "Combined file has a partial wind triple; ignoring wind");
    }

    for (kind, grid) in [
        (ScalarKind::Temperature, grids.temperature.take()),
        (ScalarKind::Pressure, grids.pressure.take()),
    ] {
        let Some(grid) = grid else { continue };
        match scalar_data(kind, grid, &node, depth).and_then(|d| store.set_scalar(d)) {
            Ok(()) => installed += 1,
            Err(e) => warn!(body = %node.body, kind = ?kind, error = %e, "Combined data not installed"),
        }
    }

    if installed == 0 {
        return Err(AtmoError::config(&node.body, "combined file installed no datasets"));
    }
    info!(body = %node.body, datasets = installed, "Loaded combined data");
    Ok(())
}

fn load_map<S: StockAtmosphere + ?Sized>(
    section: ConfigSection,
    node: MapNode,
    base: &Path,
    registry: &mut AtmosphereRegistry,
    stock: &S,
) -> AtmoResult<()> {
    let depth = stock.atmosphere_depth(&node.body);
    let modulation = node.modulation(depth)?;
    let image = ImageGrid::open(&node.image_path(base))?;

    let store = registry.entry(&node.body, depth);
    match section {
        ConfigSection::FlowMaps => {
            let mut map = FlowMap::new(image, modulation);
            map.east_west = node.east_west_multiplier;
            map.north_south = node.north_south_multiplier;
            map.vertical = node.vertical_multiplier;
            map.use_third_channel = node.use_third_channel;
            store.add_flow_map(map);
        }
        ConfigSection::OffsetMaps | ConfigSection::MultiplierMaps => {
            let params = ScalarMapParams {
                image,
                modulation,
                deformity: node.deformity,
                offset: node.offset,
            };
            if section == ConfigSection::OffsetMaps {
                store.add_offset_map(OffsetMap(params));
            } else {
                store.add_multiplier_map(MultiplierMap(params));
            }
        }
        _ => return Err(AtmoError::config(section.key(), "not a map section")),
    }
    info!(body = %node.body, section = section.key(), path = %node.path, "Loaded procedural map");
    Ok(())
}

//! Loading YAML configs with their grid files and map images.

use atmo_common::GridShape;
use atmo_store::{
    load_config_dir, load_config_file, AtmosphereRegistry, BodyProfile, ExponentialAtmosphere,
    LoadReport,
};
use test_utils::bodies::{DUNA, KERBIN};
use test_utils::{create_grid_with, encode_f32_le, encode_f64_le, write_rgb_png, ConfigFixture};

fn stock() -> ExponentialAtmosphere {
    ExponentialAtmosphere::new().with_body(KERBIN, BodyProfile::default())
}

/// Writes a 4×2×2×1 grid filled with `value`.
fn write_grid(fixture: &ConfigFixture, name: &str, value: f32) {
    fixture.binary(name, &encode_f32_le(&create_grid_with(4, 2, 2, 1, |_, _, _, _| value)));
}

const SHAPE: &str = "sizeLon: 4\n    sizeLat: 2\n    sizeAlt: 2\n    timesteps: 1\n    timestepLength: 3600";

#[test]
fn test_full_config_loads_every_section() {
    let fixture = ConfigFixture::new();
    write_grid(&fixture, "u.bin", 1.0);
    write_grid(&fixture, "v.bin", 2.0);
    write_grid(&fixture, "w.bin", 3.0);
    write_grid(&fixture, "t.bin", 250.0);
    write_grid(&fixture, "p.bin", 90.0);
    write_rgb_png(&fixture.path().join("flow.png"), 8, 4, |_, _| [200, 128, 0]);
    write_rgb_png(&fixture.path().join("heat.png"), 8, 4, |x, _| [x as u8 * 30, 0, 0]);

    let config = fixture.config(
        "kerbin.yaml",
        &format!(
            r#"
wind:
  - body: Kerbin
    {SHAPE}
    path_X: u.bin
    path_Y: v.bin
    path_Z: w.bin
    verticalWindMultiplier: 0.5
temperature:
  - body: Kerbin
    {SHAPE}
    path: t.bin
    modelTop: 30000
    blendWithStock: true
    blendFactor: 0.2
pressure:
  - body: Kerbin
    {SHAPE}
    path: p.bin
    scaleFactor: 2
flowMaps:
  - body: Kerbin
    path: flow.png
    maxAltitude: 15000
    eastWestMultiplier: 10
    scrolling: true
    scrollPeriod: 21600
offsetMaps:
  - body: Kerbin
    path: heat.png
    deformity: 5
    altitudeCurve: [[0, 1], [10000, 0]]
multiplierMaps:
  - body: Kerbin
    path: heat.png
    deformity: 0.1
"#
        ),
    );

    let mut registry = AtmosphereRegistry::new();
    let report = load_config_file(&config, &mut registry, &stock()).unwrap();
    assert_eq!(
        report,
        LoadReport {
            files: 1,
            failed_files: 0,
            loaded: 6,
            skipped: 0
        }
    );

    let store = registry.get(KERBIN).unwrap();
    assert_eq!(store.atmosphere_depth(), Some(70_000.0));
    assert_eq!(store.flow_maps().len(), 1);
    assert_eq!(store.offset_maps().len(), 1);
    assert_eq!(store.multiplier_maps().len(), 1);
    assert_eq!(store.flow_maps()[0].east_west, 10.0);
    assert_eq!(store.flow_maps()[0].modulation.scroll_period, Some(21_600.0));

    let summary = store.summary();
    let wind = summary.wind.unwrap();
    assert_eq!(wind.shape, GridShape::new(4, 2, 2, 1));
    // modelTop defaults to the atmosphere depth
    assert_eq!(wind.model_top, 70_000.0);
    let temperature = summary.temperature.unwrap();
    assert_eq!(temperature.model_top, 30_000.0);
    assert_eq!(temperature.blend_factor, Some(0.2));
    assert_eq!(store.pressure().unwrap().meta().scale_factor, 2.0);
}

#[test]
fn test_bad_nodes_are_skipped() {
    let fixture = ConfigFixture::new();
    write_grid(&fixture, "t.bin", 250.0);
    fixture.binary("short.bin", &[0u8; 10]);

    let config = fixture.config(
        "mixed.yaml",
        &format!(
            r#"
temperature:
  - body: Kerbin
    {SHAPE}
    path: t.bin
  - body: Kerbin
    {SHAPE}
    path: t.bin
pressure:
  - body: Kerbin
    sizeLon: many
  - body: Kerbin
    {SHAPE}
    path: missing.bin
  - body: Kerbin
    {SHAPE}
    path: short.bin
  - body: Duna
    {SHAPE}
    path: t.bin
flowMaps:
  - body: Kerbin
    path: nowhere.png
"#
        ),
    );

    let mut registry = AtmosphereRegistry::new();
    let report = load_config_file(&config, &mut registry, &stock()).unwrap();
    // duplicate temperature, bad size, missing file, truncated file,
    // Duna without modelTop or stock depth, missing image
    assert_eq!(report.loaded, 1);
    assert_eq!(report.skipped, 6);

    let store = registry.get(KERBIN).unwrap();
    assert!(store.temperature().is_some());
    assert!(store.pressure().is_none());
    assert!(store.flow_maps().is_empty());
    assert!(registry.get(DUNA).is_none());
}

#[test]
fn test_oversized_grids_are_skipped() {
    let fixture = ConfigFixture::new();
    write_grid(&fixture, "t.bin", 250.0);

    let config = fixture.config(
        "huge.yaml",
        r#"
temperature:
  - body: Kerbin
    sizeLon: 4294967296
    sizeLat: 4294967296
    sizeAlt: 2
    timesteps: 1
    timestepLength: 3600
    path: t.bin
pressure:
  - body: Kerbin
    sizeLon: 1048576
    sizeLat: 524288
    sizeAlt: 8
    timesteps: 4
    timestepLength: 3600
    path: t.bin
"#,
    );

    let mut registry = AtmosphereRegistry::new();
    let report = load_config_file(&config, &mut registry, &stock()).unwrap();
    assert_eq!((report.loaded, report.skipped), (0, 2));
    assert!(registry.get(KERBIN).map_or(true, |s| s.is_empty()));
}

#[test]
fn test_directory_scan_is_recursive() {
    let fixture = ConfigFixture::new();
    write_grid(&fixture, "t.bin", 250.0);
    std::fs::create_dir_all(fixture.path().join("duna")).unwrap();
    fixture.binary("duna/p.bin", &encode_f32_le(&create_grid_with(4, 2, 2, 1, |_, _, _, _| 6.0)));

    fixture.config(
        "kerbin.yaml",
        &format!("temperature:\n  - body: Kerbin\n    {SHAPE}\n    path: t.bin\n"),
    );
    // relative to the nested file's own directory
    fixture.config(
        "duna/duna.yml",
        &format!("pressure:\n  - body: Duna\n    {SHAPE}\n    path: p.bin\n    modelTop: 40000\n"),
    );
    fixture.config("broken.yaml", "wind: [unclosed\n");
    fixture.config("notes.txt", "wind: []\n");

    let mut registry = AtmosphereRegistry::new();
    let report = load_config_dir(fixture.path(), &mut registry, &stock()).unwrap();
    assert_eq!(report.files, 2);
    assert_eq!(report.failed_files, 1);
    assert_eq!(report.loaded, 2);
    assert_eq!(registry.bodies().collect::<Vec<_>>(), vec![DUNA, KERBIN]);

    let duna = registry.get(DUNA).unwrap();
    assert_eq!(duna.atmosphere_depth(), None);
    assert_eq!(duna.pressure().unwrap().meta().model_top, 40_000.0);
}

#[test]
fn test_missing_directory_is_error() {
    let fixture = ConfigFixture::new();
    let mut registry = AtmosphereRegistry::new();
    assert!(load_config_dir(&fixture.path().join("absent"), &mut registry, &stock()).is_err());
}

#[test]
fn test_combined_file_routes_tags() {
    let fixture = ConfigFixture::new();
    // per time step: windX, windY, windZ, spacer, temperature; 2 layers each
    let layer = 4 * 2;
    let mut values = Vec::new();
    for value in [1.0, 2.0, 3.0, -99.0, 280.0] {
        values.extend(std::iter::repeat(value).take(layer * 2));
    }
    fixture.binary("combined.bin", &encode_f64_le(&values));

    let config = fixture.config(
        "combined.yaml",
        &format!(
            r#"
combined:
  - body: Kerbin
    {SHAPE}
    path: combined.bin
    doublePrecision: true
    readOrder: [windX, windY, windZ, spacer, temperature]
"#
        ),
    );

    let mut registry = AtmosphereRegistry::new();
    let report = load_config_file(&config, &mut registry, &stock()).unwrap();
    assert_eq!((report.loaded, report.skipped), (1, 0));

    let summary = registry.get(KERBIN).unwrap().summary();
    assert!(summary.wind.is_some());
    assert!(summary.temperature.is_some());
    assert!(summary.pressure.is_none());
}

#[test]
fn test_environment_variables_expand_in_paths() {
    let fixture = ConfigFixture::new();
    write_grid(&fixture, "t.bin", 250.0);
    std::env::set_var("ATMO_LOADING_TEST_DIR", fixture.path());

    let config = fixture.config(
        "env.yaml",
        &format!(
            "temperature:\n  - body: Kerbin\n    {SHAPE}\n    path: ${{ATMO_LOADING_TEST_DIR}}/t.bin\n    modelTop: ${{ATMO_LOADING_TEST_TOP:-20000}}\n"
        ),
    );

    let mut registry = AtmosphereRegistry::new();
    let report = load_config_file(&config, &mut registry, &stock()).unwrap();
    assert_eq!(report.loaded, 1);
    assert_eq!(
        registry.get(KERBIN).unwrap().temperature().unwrap().meta().model_top,
        20_000.0
    );
}

#[test]
fn test_empty_file_loads_nothing() {
    let fixture = ConfigFixture::new();
    let config = fixture.config("empty.yaml", "");
    let mut registry = AtmosphereRegistry::new();
    let report = load_config_file(&config, &mut registry, &stock()).unwrap();
    assert_eq!(report.loaded + report.skipped, 0);
    assert!(registry.is_empty());
}

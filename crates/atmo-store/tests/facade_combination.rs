//! End-to-end queries: config files in, tagged samples out.

use atmo_common::{SampleStatus, Sampled};
use atmo_store::{
    load_config_file, AtmosphereRegistry, BodyProfile, ExponentialAtmosphere, FacadeSettings,
    QueryFacade, StockAtmosphere,
};
use test_utils::bodies::{EVE, KERBIN};
use test_utils::{
    assert_approx_eq, assert_vec3_approx_eq, create_grid_with, create_pressure_grid, encode_f32_le,
    write_rgb_png, ConfigFixture,
};

fn stock() -> ExponentialAtmosphere {
    ExponentialAtmosphere::new().with_body(KERBIN, BodyProfile::default())
}

fn load(fixture: &ConfigFixture, yaml: &str) -> QueryFacade<ExponentialAtmosphere> {
    let config = fixture.config("atmo.yaml", yaml);
    let stock = stock();
    let mut registry = AtmosphereRegistry::new();
    let report = load_config_file(&config, &mut registry, &stock).unwrap();
    assert_eq!(report.skipped, 0, "unexpected skipped nodes");
    QueryFacade::new(registry, stock)
}

#[test]
fn test_two_by_two_wind_scenario() {
    let fixture = ConfigFixture::new();
    let values: Vec<f32> = (1..=8).map(|v| v as f32).collect();
    for name in ["x.bin", "y.bin", "z.bin"] {
        fixture.binary(name, &encode_f32_le(&values));
    }

    let facade = load(
        &fixture,
        r#"
wind:
  - body: Kerbin
    sizeLon: 2
    sizeLat: 2
    sizeAlt: 2
    timesteps: 1
    timestepLength: 3600
    modelTop: 10000
    path_X: x.bin
    path_Y: y.bin
    path_Z: z.bin
"#,
    );

    let detailed = facade.sample_wind_detailed(KERBIN, 180.0, 0.0, 5_000.0, 0.0);
    assert_eq!(detailed.result.status(), SampleStatus::Ok);
    let wind = detailed.result.into_value().unwrap();
    assert_vec3_approx_eq!(wind, (4.5, 4.5, 4.5), 1e-5);

    let info = detailed.info.unwrap();
    assert_eq!((info.lon.frac, info.lat.frac, info.alt.frac), (0.5, 0.5, 0.5));
}

#[test]
fn test_neutral_multiplier_map_leaves_pressure_unchanged() {
    let fixture = ConfigFixture::new();
    fixture.binary("p.bin", &encode_f32_le(&create_pressure_grid(4, 4, 3, 1, 101.325)));
    write_rgb_png(&fixture.path().join("noise.png"), 16, 8, |x, y| {
        [(x * 16) as u8, (y * 30) as u8, 77]
    });

    let with_map = load(
        &fixture,
        r#"
pressure:
  - body: Kerbin
    sizeLon: 4
    sizeLat: 4
    sizeAlt: 3
    timesteps: 1
    timestepLength: 3600
    path: p.bin
multiplierMaps:
  - body: Kerbin
    path: noise.png
    deformity: 0
"#,
    );
    let plain_fixture = ConfigFixture::new();
    plain_fixture.binary("p.bin", &encode_f32_le(&create_pressure_grid(4, 4, 3, 1, 101.325)));
    let plain = load(
        &plain_fixture,
        r#"
pressure:
  - body: Kerbin
    sizeLon: 4
    sizeLat: 4
    sizeAlt: 3
    timesteps: 1
    timestepLength: 3600
    path: p.bin
"#,
    );

    for (lon, lat, alt) in [(0.0, 0.0, 0.0), (123.0, -40.0, 12_000.0), (-77.0, 61.0, 33_000.0)] {
        let a = with_map.sample_pressure(KERBIN, lon, lat, alt, 0.0);
        let b = plain.sample_pressure(KERBIN, lon, lat, alt, 0.0);
        assert_eq!(a, b, "at ({lon}, {lat}, {alt})");
        assert!(b.value().is_some());
    }
}

#[test]
fn test_offset_map_over_stock_temperature() {
    let fixture = ConfigFixture::new();
    // full red: channel mean (1 - 1 - 1) / 3 = -1/3
    write_rgb_png(&fixture.path().join("cold.png"), 8, 4, |_, _| [255, 0, 0]);

    let facade = load(
        &fixture,
        r#"
offsetMaps:
  - body: Kerbin
    path: cold.png
    deformity: 30
    offset: 4
    maxAltitude: 20000
"#,
    );

    let stock_t = facade.stock().temperature(KERBIN, 10.0, 0.0, 0.0).unwrap();
    let t = facade.sample_temperature(KERBIN, 0.0, 10.0, 0.0, 0.0);
    assert_eq!(t.status(), SampleStatus::Ok);
    assert_approx_eq!(t.unwrap_or(f64::NAN), stock_t - 10.0 + 4.0, 1e-6);

    // map gated off above maxAltitude: nothing left but stock, still tagged ok
    let high = facade.sample_temperature(KERBIN, 0.0, 10.0, 25_000.0, 0.0);
    let stock_high = facade.stock().temperature(KERBIN, 10.0, 25_000.0, 0.0).unwrap();
    assert_approx_eq!(high.unwrap_or(f64::NAN), stock_high, 1e-9);

    // no pressure dataset or multiplier map
    assert_eq!(facade.sample_pressure(KERBIN, 0.0, 10.0, 0.0, 0.0), Sampled::NoData);
}

#[test]
fn test_wind_grid_plus_flow_map() {
    let fixture = ConfigFixture::new();
    let east = create_grid_with(4, 2, 2, 1, |_, _, _, _| 5.0);
    let zero = vec![0.0f32; east.len()];
    fixture.binary("u.bin", &encode_f32_le(&east));
    fixture.binary("v.bin", &encode_f32_le(&zero));
    fixture.binary("w.bin", &encode_f32_le(&zero));
    write_rgb_png(&fixture.path().join("north.png"), 8, 4, |_, _| [128, 255, 128]);

    let facade = load(
        &fixture,
        r#"
wind:
  - body: Kerbin
    sizeLon: 4
    sizeLat: 2
    sizeAlt: 2
    timesteps: 1
    timestepLength: 3600
    modelTop: 20000
    path_X: u.bin
    path_Y: v.bin
    path_Z: w.bin
flowMaps:
  - body: Kerbin
    path: north.png
    northSouthMultiplier: 3
    maxAltitude: 40000
"#,
    )
    .with_settings(FacadeSettings {
        wind_multiplier: 2.0,
        ..Default::default()
    });

    let wind = facade.sample_wind(KERBIN, 45.0, 0.0, 0.0, 0.0);
    let v = wind.into_value().unwrap();
    // 128 maps to a tiny positive east-west value
    assert_approx_eq!(v.x, 2.0 * (5.0 + (128.0 / 255.0 * 2.0 - 1.0)), 1e-6);
    assert_approx_eq!(v.y, 6.0, 1e-6);
    assert_approx_eq!(v.z, 0.0, 1e-12);

    let above = facade.sample_wind(KERBIN, 45.0, 0.0, 30_000.0, 0.0);
    assert_eq!(above.status(), SampleStatus::AboveModelTop);
    assert!(above.value().unwrap().y > 0.0);
}

#[test]
fn test_unknown_body_is_no_data() {
    let fixture = ConfigFixture::new();
    let facade = load(&fixture, "wind: []\n");
    for status in [
        facade.sample_wind(EVE, 0.0, 0.0, 0.0, 0.0).status(),
        facade.sample_temperature(EVE, 0.0, 0.0, 0.0, 0.0).status(),
        facade.sample_pressure(EVE, 0.0, 0.0, 0.0, 0.0).status(),
    ] {
        assert_eq!(status.code(), -1);
    }
}

#[test]
fn test_facade_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<QueryFacade<ExponentialAtmosphere>>();
}

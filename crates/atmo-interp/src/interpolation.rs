//! Bilinear and quadrilinear interpolation over `Grid4`.

use atmo_common::{AxisBracket, DataInfo, Grid4};

/// Linear blend that is exact at both `t = 0` and `t = 1`.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Bilinear interpolation across longitude × latitude on one layer.
pub fn bilinear(
    grid: &Grid4,
    time: usize,
    alt: usize,
    lon: &AxisBracket,
    lat: &AxisBracket,
) -> f64 {
    let v00 = grid.get(time, alt, lat.low, lon.low) as f64;
    let v10 = grid.get(time, alt, lat.low, lon.high) as f64;
    let v01 = grid.get(time, alt, lat.high, lon.low) as f64;
    let v11 = grid.get(time, alt, lat.high, lon.high) as f64;

    let south = lerp(v00, v10, lon.frac);
    let north = lerp(v01, v11, lon.frac);
    lerp(south, north, lat.frac)
}

/// Bilinear values at the four (time, altitude) corners, indexed
/// `[time_low/high][alt_low/high]`.
pub fn corners(grid: &Grid4, info: &DataInfo) -> [[f64; 2]; 2] {
    let at = |t: usize, a: usize| bilinear(grid, t, a, &info.lon, &info.lat);
    [
        [at(info.time.low, info.alt.low), at(info.time.low, info.alt.high)],
        [at(info.time.high, info.alt.low), at(info.time.high, info.alt.high)],
    ]
}

/// Full quadrilinear interpolation: bilinear at each corner, then altitude,
/// then time.
pub fn quadrilinear(grid: &Grid4, info: &DataInfo) -> f64 {
    let c = corners(grid, info);
    let early = lerp(c[0][0], c[0][1], info.alt.frac);
    let late = lerp(c[1][0], c[1][1], info.alt.frac);
    lerp(early, late, info.time.frac)
}

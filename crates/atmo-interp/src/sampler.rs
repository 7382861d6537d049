//! Dataset sampling entry points.

use atmo_common::{AtmoError, AtmoResult, DataInfo, DatasetMeta, GeoPoint, Grid4, GridShape, Vector3};

use crate::axis::{altitude_bracket, latitude_bracket, longitude_bracket, time_bracket};
use crate::interpolation::{corners, lerp, quadrilinear};
use crate::pressure::interpolate_pressure;

/// Where a query point falls inside a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub info: DataInfo,
    pub above_top: bool,
}

/// An interpolated value with its diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSample<T> {
    pub value: T,
    pub above_top: bool,
    pub info: DataInfo,
}

/// Bracket every axis of `shape` for `point`.
pub fn locate(shape: GridShape, meta: &DatasetMeta, point: &GeoPoint) -> AtmoResult<Location> {
    if !(point.lon.is_finite() && point.lat.is_finite() && point.alt.is_finite() && point.time.is_finite()) {
        return Err(AtmoError::numeric(format!("non-finite query point {:?}", point)));
    }

    let (alt, above_top) = altitude_bracket(point.alt, meta.model_top, meta.scale_factor, shape.alt);
    let info = DataInfo {
        lon: longitude_bracket(point.lon, meta.longitude_offset, shape.lon),
        lat: latitude_bracket(point.lat, shape.lat),
        alt,
        time: time_bracket(point.time, meta.time_offset, meta.time_step_seconds, shape.time),
    };
    Ok(Location { info, above_top })
}

fn finite(value: f64, what: &str) -> AtmoResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AtmoError::numeric(format!("non-finite {what} result")))
    }
}

/// Sample a scalar dataset (temperature or any linear quantity).
pub fn sample_scalar(grid: &Grid4, meta: &DatasetMeta, point: &GeoPoint) -> AtmoResult<GridSample<f64>> {
    let loc = locate(grid.shape(), meta, point)?;
    let value = finite(quadrilinear(grid, &loc.info), "scalar")?;
    Ok(GridSample {
        value,
        above_top: loc.above_top,
        info: loc.info,
    })
}

/// Sample a pressure dataset, blending across altitude in log space.
pub fn sample_pressure(grid: &Grid4, meta: &DatasetMeta, point: &GeoPoint) -> AtmoResult<GridSample<f64>> {
    let loc = locate(grid.shape(), meta, point)?;
    let c = corners(grid, &loc.info);
    let by = loc.info.alt.frac;

    let early = interpolate_pressure(c[0][0], c[0][1], by)?;
    let late = interpolate_pressure(c[1][0], c[1][1], by)?;
    let value = finite(lerp(early, late, loc.info.time.frac), "pressure")?;
    Ok(GridSample {
        value,
        above_top: loc.above_top,
        info: loc.info,
    })
}

/// Sample the three wind components. The vertical component is scaled by
/// `vertical_multiplier` after interpolation.
pub fn sample_wind(
    x: &Grid4,
    y: &Grid4,
    z: &Grid4,
    meta: &DatasetMeta,
    vertical_multiplier: f64,
    point: &GeoPoint,
) -> AtmoResult<GridSample<Vector3>> {
    let shape = x.shape();
    if y.shape() != shape || z.shape() != shape {
        return Err(AtmoError::InvalidGrid(
            "wind component grids have different shapes".to_string(),
        ));
    }

    let loc = locate(shape, meta, point)?;
    let value = Vector3::new(
        quadrilinear(x, &loc.info),
        quadrilinear(y, &loc.info),
        quadrilinear(z, &loc.info) * vertical_multiplier,
    );
    if !value.iter().all(|c| c.is_finite()) {
        return Err(AtmoError::numeric("non-finite wind result"));
    }
    Ok(GridSample {
        value,
        above_top: loc.above_top,
        info: loc.info,
    })
}

//! Axis normalization and bracketing.
//!
//! Longitude and latitude are cell-centred: with `N` columns, column `i`
//! covers the center of the `i`-th `360/N` degree slice after the dataset's
//! longitude offset. Row 0 sits at the south pole.

use atmo_common::AxisBracket;

/// Wrap `value` into `[0, period)`.
#[inline]
pub fn wrap(value: f64, period: f64) -> f64 {
    let r = value.rem_euclid(period);
    // rem_euclid can round up to `period` for tiny negative inputs
    if r >= period {
        0.0
    } else {
        r
    }
}

/// Bracket a longitude (degrees) on a cyclic axis of `size` columns.
pub fn longitude_bracket(lon: f64, offset: f64, size: usize) -> AxisBracket {
    let n = size as f64;
    let norm = wrap(lon - offset, 360.0) / 360.0;
    let pos = wrap(norm * n - 0.5, n);
    let low = (pos.floor() as usize).min(size - 1);
    AxisBracket::new(low, (low + 1) % size, pos - low as f64)
}

/// Bracket a latitude (degrees) on a clamped axis of `size` rows.
pub fn latitude_bracket(lat: f64, size: usize) -> AxisBracket {
    let n = size as f64;
    let norm = ((lat + 90.0) / 180.0).clamp(0.0, 1.0);
    let pos = (norm * n - 0.5).clamp(0.0, n - 1.0);
    let low = (pos.floor() as usize).min(size - 1);
    AxisBracket::new(low, (low + 1).min(size - 1), pos - low as f64)
}

/// Bracket a time (seconds) on a cyclic axis of `steps` steps.
pub fn time_bracket(time: f64, offset: f64, step_seconds: f64, steps: usize) -> AxisBracket {
    let period = step_seconds * steps as f64;
    let pos = wrap(time - offset, period) / step_seconds;
    let low = (pos.floor() as usize).min(steps - 1);
    let frac = (pos - low as f64).clamp(0.0, 1.0);
    AxisBracket::new(low, (low + 1) % steps, frac)
}

/// Map a normalized altitude onto layer indices `0..=top`.
///
/// With `x_base > 1` the layers are packed towards the surface:
/// position = `(x_base^(-nx·top) - 1) / (x_base^(-top) - 1) · top`.
/// At `nx >= 1` the bracket saturates at `(top, top, 1.0)`.
pub fn scale_altitude(nx: f64, x_base: f64, top: usize) -> AxisBracket {
    if nx >= 1.0 {
        return AxisBracket::new(top, top, 1.0);
    }
    let nx = nx.max(0.0);
    let n = top as f64;
    let pos = if x_base <= 1.0 {
        nx * n
    } else {
        (x_base.powf(-nx * n) - 1.0) / (x_base.powf(-n) - 1.0) * n
    };
    let pos = pos.clamp(0.0, n);
    let low = (pos.floor() as usize).min(top);
    AxisBracket::new(low, (low + 1).min(top), pos - low as f64)
}

/// Bracket an altitude (meters). Returns the bracket and whether the point
/// is at or above the model top.
pub fn altitude_bracket(alt: f64, model_top: f64, x_base: f64, layers: usize) -> (AxisBracket, bool) {
    let nx = alt / model_top;
    (scale_altitude(nx, x_base, layers - 1), nx >= 1.0)
}

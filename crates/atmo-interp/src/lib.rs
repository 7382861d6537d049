//! Grid interpolation for gridded atmosphere datasets.
//!
//! Sampling a dataset at `(lon, lat, alt, time)` happens in three steps:
//!
//! ```text
//! GeoPoint
//!    │
//!    ├─► axis: bracket each axis (lon wraps, lat clamps,
//!    │         alt uses non-uniform spacing, time wraps)
//!    │
//!    ├─► interpolation: bilinear lon×lat at the four (alt, time) corners,
//!    │                  then altitude, then time
//!    │
//!    └─► sampler: validate, scale wind Z, report above-top
//! ```
//!
//! Pressure replaces the altitude step with a log-space blend (see
//! [`pressure::interpolate_pressure`]).

pub mod axis;
pub mod interpolation;
pub mod pressure;
pub mod sampler;

pub use axis::{
    altitude_bracket, latitude_bracket, longitude_bracket, scale_altitude, time_bracket, wrap,
};
pub use interpolation::{bilinear, lerp, quadrilinear};
pub use pressure::interpolate_pressure;
pub use sampler::{locate, sample_pressure, sample_scalar, sample_wind, GridSample, Location};

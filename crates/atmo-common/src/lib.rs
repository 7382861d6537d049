//! Common types shared across the gridded atmosphere crates.

pub mod error;
pub mod grid;
pub mod point;
pub mod status;

pub use error::{AtmoError, AtmoResult};
pub use grid::{DatasetMeta, Grid4, GridShape};
pub use point::GeoPoint;
pub use status::{AxisBracket, DataInfo, Sampled, SampleStatus};

/// Wind and flow vectors: x = east, y = north, z = up.
pub type Vector3 = nalgebra::Vector3<f64>;

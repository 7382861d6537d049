//! Procedural modulation maps.
//!
//! A map is an RGB image wrapped around a body (horizontal middle on the
//! prime meridian, top row at the north pole) plus response curves that gate
//! its strength by altitude, time and orbital phase. Three kinds exist:
//!
//! - [`FlowMap`]: channels become an east/north/up wind contribution
//! - [`OffsetMap`]: channel mean becomes an additive temperature offset
//! - [`MultiplierMap`]: channel mean becomes a pressure factor around 1.0

pub mod curve;
pub mod image_grid;
pub mod map;

pub use curve::{HermiteCurve, Keyframe};
pub use image_grid::ImageGrid;
pub use map::{
    accumulate_flow, accumulate_multipliers, accumulate_offsets, FlowMap, Modulation,
    MultiplierMap, OffsetMap, ScalarMapParams,
};

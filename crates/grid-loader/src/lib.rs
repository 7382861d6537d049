//! Raw binary grid reader.
//!
//! Dataset files carry no header: an optional leading byte offset is skipped,
//! then every time step stores its altitude layers back to back, each layer a
//! latitude-major, longitude-minor block of little-endian floats. Combined
//! files interleave several variables per time step in a caller-supplied
//! order.

pub mod combined;
pub mod reader;

pub use combined::{read_combined_bytes, read_combined_file, CombinedGrids, ReadTag};
pub use reader::{read_grid_bytes, read_grid_file, ElementWidth, ReadOptions};

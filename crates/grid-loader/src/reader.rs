//! Single-variable grid files.

use std::path::Path;

use atmo_common::{AtmoError, AtmoResult, Grid4, GridShape};
use bytes::{Buf, Bytes};
use tracing::debug;

/// Width of each stored element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementWidth {
    /// 4-byte IEEE float
    #[default]
    Single,
    /// 8-byte IEEE double, narrowed to f32 on read
    Double,
}

impl ElementWidth {
    pub fn from_double_precision(double: bool) -> Self {
        if double {
            Self::Double
        } else {
            Self::Single
        }
    }

    pub fn bytes(&self) -> usize {
        match self {
            Self::Single => 4,
            Self::Double => 8,
        }
    }
}

/// How a grid file is laid out.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub shape: GridShape,
    /// Bytes skipped once before the first block.
    pub initial_offset: usize,
    /// Layers are stored top-down instead of surface-first.
    pub invert_altitude: bool,
    pub width: ElementWidth,
}

impl ReadOptions {
    pub fn new(shape: GridShape) -> Self {
        Self {
            shape,
            initial_offset: 0,
            invert_altitude: false,
            width: ElementWidth::Single,
        }
    }

    /// Bytes needed for `blocks` interleaved variables plus the leading
    /// offset, or `None` on overflow.
    pub fn required_bytes(&self, blocks: usize) -> Option<usize> {
        self.shape
            .checked_len()?
            .checked_mul(self.width.bytes())?
            .checked_mul(blocks)?
            .checked_add(self.initial_offset)
    }

    /// Bytes in one latitude × longitude block.
    pub fn layer_bytes(&self) -> usize {
        self.shape.layer_len() * self.width.bytes()
    }

    /// Destination layer for the `stored`-th layer read from a time step.
    pub(crate) fn target_layer(&self, stored: usize) -> usize {
        if self.invert_altitude {
            self.shape.alt - 1 - stored
        } else {
            stored
        }
    }
}

/// Read a single-variable grid file from disk.
pub fn read_grid_file(path: &Path, options: &ReadOptions) -> AtmoResult<Grid4> {
    let data = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = data.len(), "Read grid file");
    read_grid_bytes(Bytes::from(data), options, &path.display().to_string())
}

/// Decode a single-variable grid from an in-memory buffer.
///
/// `source_name` only labels errors and logs.
pub fn read_grid_bytes(
    mut data: Bytes,
    options: &ReadOptions,
    source_name: &str,
) -> AtmoResult<Grid4> {
    options.shape.validate()?;
    ensure_remaining(&data, options, 1, source_name)?;
    skip(&mut data, options.initial_offset, source_name)?;

    let mut grid = Grid4::zeros(options.shape);
    for time in 0..options.shape.time {
        for stored in 0..options.shape.alt {
            let layer = options.target_layer(stored);
            read_block(&mut data, options, source_name, Some(grid.layer_mut(time, layer)))?;
        }
    }

    if data.has_remaining() {
        debug!(
            source = source_name,
            trailing = data.remaining(),
            "Ignoring trailing bytes after last block"
        );
    }
    Ok(grid)
}

/// Fail with `TruncatedFile` before allocating when `data` cannot hold
/// `blocks` full grids.
pub(crate) fn ensure_remaining(
    data: &Bytes,
    options: &ReadOptions,
    blocks: usize,
    source_name: &str,
) -> AtmoResult<()> {
    let needed = options.required_bytes(blocks).ok_or_else(|| {
        AtmoError::InvalidGrid(format!("{source_name}: byte size of {:?} overflows", options.shape))
    })?;
    if data.remaining() < needed {
        return Err(AtmoError::truncated(source_name, needed, data.remaining()));
    }
    Ok(())
}

/// Advance past `count` bytes.
pub(crate) fn skip(data: &mut Bytes, count: usize, source_name: &str) -> AtmoResult<()> {
    if data.remaining() < count {
        return Err(AtmoError::truncated(source_name, count, data.remaining()));
    }
    data.advance(count);
    Ok(())
}

/// Read one layer block into `out`, or skip it when `out` is `None`.
pub(crate) fn read_block(
    data: &mut Bytes,
    options: &ReadOptions,
    source_name: &str,
    out: Option<&mut [f32]>,
) -> AtmoResult<()> {
    let needed = options.layer_bytes();
    if data.remaining() < needed {
        return Err(AtmoError::truncated(source_name, needed, data.remaining()));
    }

    match out {
        None => data.advance(needed),
        Some(out) => match options.width {
            ElementWidth::Single => {
                for value in out.iter_mut() {
                    *value = data.get_f32_le();
                }
            }
            ElementWidth::Double => {
                for value in out.iter_mut() {
                    *value = data.get_f64_le() as f32;
                }
            }
        },
    }
    Ok(())
}

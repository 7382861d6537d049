//! Combined files holding several interleaved variables.

use std::path::Path;

use atmo_common::{AtmoError, AtmoResult, Grid4};
use bytes::{Buf, Bytes};
use tracing::debug;

use crate::reader::{ensure_remaining, read_block, skip, ReadOptions};

/// Variable tag in a combined file's read order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadTag {
    WindX,
    WindY,
    WindZ,
    Temperature,
    Pressure,
    /// Explicit padding block.
    Spacer,
    /// Unrecognized tag; its blocks are skipped like a spacer.
    Unknown(String),
}

impl ReadTag {
    pub fn parse(s: &str) -> Self {
        match s {
            "windX" => Self::WindX,
            "windY" => Self::WindY,
            "windZ" => Self::WindZ,
            "temperature" => Self::Temperature,
            "pressure" => Self::Pressure,
            "spacer" => Self::Spacer,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether blocks for this tag are kept.
    pub fn is_variable(&self) -> bool {
        !matches!(self, Self::Spacer | Self::Unknown(_))
    }
}

/// Grids decoded from a combined file, one per recognized tag.
#[derive(Debug, Default)]
pub struct CombinedGrids {
    pub wind_x: Option<Grid4>,
    pub wind_y: Option<Grid4>,
    pub wind_z: Option<Grid4>,
    pub temperature: Option<Grid4>,
    pub pressure: Option<Grid4>,
}

impl CombinedGrids {
    fn slot(&mut self, tag: &ReadTag) -> Option<&mut Option<Grid4>> {
        match tag {
            ReadTag::WindX => Some(&mut self.wind_x),
            ReadTag::WindY => Some(&mut self.wind_y),
            ReadTag::WindZ => Some(&mut self.wind_z),
            ReadTag::Temperature => Some(&mut self.temperature),
            ReadTag::Pressure => Some(&mut self.pressure),
            ReadTag::Spacer | ReadTag::Unknown(_) => None,
        }
    }

    /// All three wind components, when every one was present.
    pub fn take_wind(&mut self) -> Option<(Grid4, Grid4, Grid4)> {
        match (self.wind_x.take(), self.wind_y.take(), self.wind_z.take()) {
            (Some(x), Some(y), Some(z)) => Some((x, y, z)),
            (x, y, z) => {
                self.wind_x = x;
                self.wind_y = y;
                self.wind_z = z;
                None
            }
        }
    }
}

/// Read a combined file from disk.
pub fn read_combined_file(
    path: &Path,
    options: &ReadOptions,
    order: &[ReadTag],
) -> AtmoResult<CombinedGrids> {
    let data = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = data.len(), tags = order.len(), "Read combined file");
    read_combined_bytes(Bytes::from(data), options, order, &path.display().to_string())
}

/// Decode a combined buffer. For each time step, every tag in `order`
/// contributes all of its altitude layers before the next tag starts.
pub fn read_combined_bytes(
    mut data: Bytes,
    options: &ReadOptions,
    order: &[ReadTag],
    source_name: &str,
) -> AtmoResult<CombinedGrids> {
    options.shape.validate()?;
    if order.is_empty() {
        return Err(AtmoError::config(source_name, "readOrder is empty"));
    }

    let mut grids = CombinedGrids::default();
    for (i, tag) in order.iter().enumerate() {
        if let ReadTag::Unknown(name) = tag {
            debug!(source = source_name, tag = %name, "Treating unrecognized tag as padding");
        }
        if tag.is_variable() && order[..i].contains(tag) {
            return Err(AtmoError::config(
                source_name,
                format!("tag {:?} appears more than once in readOrder", tag),
            ));
        }
    }

    ensure_remaining(&data, options, order.len(), source_name)?;
    for tag in order {
        if let Some(slot) = grids.slot(tag) {
            *slot = Some(Grid4::zeros(options.shape));
        }
    }
    skip(&mut data, options.initial_offset, source_name)?;

    for time in 0..options.shape.time {
        for tag in order {
            for stored in 0..options.shape.alt {
                let layer = options.target_layer(stored);
                let out = grids
                    .slot(tag)
                    .and_then(|slot| slot.as_mut())
                    .map(|grid| grid.layer_mut(time, layer));
                read_block(&mut data, options, source_name, out)?;
            }
        }
    }

    if data.has_remaining() {
        debug!(
            source = source_name,
            trailing = data.remaining(),
            "Ignoring trailing bytes after last block"
        );
    }
    Ok(grids)
}

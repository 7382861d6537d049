//! Decoded map images held as signed RGB cells.

use std::path::Path;

use atmo_common::{AtmoError, AtmoResult, AxisBracket};
use atmo_interp::{latitude_bracket, lerp, longitude_bracket};
use image::RgbImage;
use tracing::debug;

/// Longitude offset that puts the middle column on the prime meridian.
pub const PRIME_MERIDIAN_OFFSET: f64 = -180.0;

/// An RGB grid with channels scaled to `[-1, 1]`.
///
/// Row 0 is the north edge; columns wrap around the body.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGrid {
    width: usize,
    height: usize,
    cells: Vec<[f32; 3]>,
}

/// Map an 8-bit channel onto `[-1, 1]`.
#[inline]
pub fn scale_channel(c: u8) -> f32 {
    c as f32 / 255.0 * 2.0 - 1.0
}

impl ImageGrid {
    /// Build from already-scaled cells in row-major order.
    pub fn from_cells(width: usize, height: usize, cells: Vec<[f32; 3]>) -> AtmoResult<Self> {
        if width == 0 || height == 0 {
            return Err(AtmoError::Image("map image is empty".to_string()));
        }
        if cells.len() != width * height {
            return Err(AtmoError::Image(format!(
                "expected {} cells for {}x{}, got {}",
                width * height,
                width,
                height,
                cells.len()
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn from_rgb(img: &RgbImage) -> AtmoResult<Self> {
        let cells = img
            .pixels()
            .map(|p| [scale_channel(p[0]), scale_channel(p[1]), scale_channel(p[2])])
            .collect();
        Self::from_cells(img.width() as usize, img.height() as usize, cells)
    }

    /// Decode an image file once; any format the `image` crate reads works.
    pub fn open(path: &Path) -> AtmoResult<Self> {
        let img = image::open(path)
            .map_err(|e| AtmoError::Image(format!("{}: {}", path.display(), e)))?
            .to_rgb8();
        debug!(path = %path.display(), width = img.width(), height = img.height(), "Decoded map image");
        Self::from_rgb(&img)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn cell(&self, row: usize, col: usize) -> [f32; 3] {
        self.cells[row * self.width + col]
    }

    fn brackets(&self, lon: f64, lat: f64, lon_offset: f64) -> (AxisBracket, AxisBracket) {
        // rows run north to south, so bracket the mirrored latitude
        (
            longitude_bracket(lon, lon_offset, self.width),
            latitude_bracket(-lat, self.height),
        )
    }

    /// Bilinear RGB sample. `lon_offset` is the longitude of the left edge.
    pub fn sample(&self, lon: f64, lat: f64, lon_offset: f64) -> [f64; 3] {
        let (lon_b, lat_b) = self.brackets(lon, lat, lon_offset);
        let c00 = self.cell(lat_b.low, lon_b.low);
        let c10 = self.cell(lat_b.low, lon_b.high);
        let c01 = self.cell(lat_b.high, lon_b.low);
        let c11 = self.cell(lat_b.high, lon_b.high);

        let mut out = [0.0; 3];
        for (ch, value) in out.iter_mut().enumerate() {
            let top = lerp(c00[ch] as f64, c10[ch] as f64, lon_b.frac);
            let bottom = lerp(c01[ch] as f64, c11[ch] as f64, lon_b.frac);
            *value = lerp(top, bottom, lat_b.frac);
        }
        out
    }

    /// Bilinear sample of the channel sum.
    pub fn sample_sum(&self, lon: f64, lat: f64, lon_offset: f64) -> f64 {
        self.sample(lon, lat, lon_offset).iter().sum()
    }
}

//! 4D grid storage for gridded atmosphere datasets.

use crate::error::{AtmoError, AtmoResult};
use serde::{Deserialize, Serialize};

/// Dimensions of a 4D dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    /// Longitude columns (cyclic axis)
    pub lon: usize,
    /// Latitude rows, row 0 at the south pole
    pub lat: usize,
    /// Altitude layers, layer 0 at the surface
    pub alt: usize,
    /// Time steps (cyclic axis)
    pub time: usize,
}

impl GridShape {
    pub fn new(lon: usize, lat: usize, alt: usize, time: usize) -> Self {
        Self { lon, lat, alt, time }
    }

    /// Check the minimum sizes needed for interpolation.
    pub fn validate(&self) -> AtmoResult<()> {
        if self.lon < 2 || self.lat < 2 || self.alt < 2 {
            return Err(AtmoError::InvalidGrid(format!(
                "lon/lat/alt sizes must be >= 2, got {}x{}x{}",
                self.lon, self.lat, self.alt
            )));
        }
        if self.time < 1 {
            return Err(AtmoError::InvalidGrid("at least one time step required".into()));
        }
        if self.checked_len().is_none() {
            return Err(AtmoError::InvalidGrid(format!(
                "{}x{}x{}x{} values overflow the address space",
                self.lon, self.lat, self.alt, self.time
            )));
        }
        Ok(())
    }

    /// Total number of values, or `None` if it does not fit in `usize`.
    pub fn checked_len(&self) -> Option<usize> {
        self.lon
            .checked_mul(self.lat)?
            .checked_mul(self.alt)?
            .checked_mul(self.time)
    }

    /// Number of values in one latitude × longitude layer.
    pub fn layer_len(&self) -> usize {
        self.lon * self.lat
    }

    /// Number of values in one time step.
    pub fn step_len(&self) -> usize {
        self.layer_len() * self.alt
    }

    /// Total number of values.
    pub fn len(&self) -> usize {
        self.step_len() * self.time
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of `[time][alt][lat][lon]`.
    #[inline]
    pub fn index(&self, time: usize, alt: usize, lat: usize, lon: usize) -> usize {
        ((time * self.alt + alt) * self.lat + lat) * self.lon + lon
    }

    /// Index of the topmost altitude layer.
    pub fn top_layer(&self) -> usize {
        self.alt.saturating_sub(1)
    }
}

/// A dense `[time][alt][lat][lon]` array of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid4 {
    shape: GridShape,
    data: Vec<f32>,
}

impl Grid4 {
    /// Wrap existing values, checking the length against the shape.
    pub fn from_vec(shape: GridShape, data: Vec<f32>) -> AtmoResult<Self> {
        if data.len() != shape.len() {
            return Err(AtmoError::InvalidGrid(format!(
                "expected {} values for shape {:?}, got {}",
                shape.len(),
                shape,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// A grid filled with zeros.
    pub fn zeros(shape: GridShape) -> Self {
        Self {
            shape,
            data: vec![0.0; shape.len()],
        }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn values(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn get(&self, time: usize, alt: usize, lat: usize, lon: usize) -> f32 {
        self.data[self.shape.index(time, alt, lat, lon)]
    }

    /// Mutable view of one latitude × longitude layer.
    pub fn layer_mut(&mut self, time: usize, alt: usize) -> &mut [f32] {
        let start = self.shape.index(time, alt, 0, 0);
        let len = self.shape.layer_len();
        &mut self.data[start..start + len]
    }
}

/// Axis metadata shared by every dataset kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    /// Non-uniform altitude spacing base (1.0 = uniform)
    pub scale_factor: f64,
    /// Seconds between time steps
    pub time_step_seconds: f64,
    /// Altitude of the top layer in meters
    pub model_top: f64,
    /// Degrees subtracted from query longitudes before sampling
    pub longitude_offset: f64,
    /// Seconds subtracted from query times before sampling
    pub time_offset: f64,
}

impl DatasetMeta {
    pub fn new(model_top: f64, time_step_seconds: f64) -> Self {
        Self {
            scale_factor: 1.0,
            time_step_seconds,
            model_top,
            longitude_offset: 0.0,
            time_offset: 0.0,
        }
    }

    pub fn validate(&self) -> AtmoResult<()> {
        if !(self.time_step_seconds > 0.0) {
            return Err(AtmoError::InvalidGrid("time step length must be > 0".into()));
        }
        if !(self.model_top > 0.0) {
            return Err(AtmoError::InvalidGrid("model top must be > 0".into()));
        }
        if !(self.scale_factor >= 1.0) {
            return Err(AtmoError::InvalidGrid("scale factor must be >= 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_longitude_fastest() {
        let shape = GridShape::new(4, 3, 2, 2);
        assert_eq!(shape.index(0, 0, 0, 1), 1);
        assert_eq!(shape.index(0, 0, 1, 0), 4);
        assert_eq!(shape.index(0, 1, 0, 0), 12);
        assert_eq!(shape.index(1, 0, 0, 0), 24);
        assert_eq!(shape.len(), 48);
    }

    #[test]
    fn test_shape_validation() {
        assert!(GridShape::new(2, 2, 2, 1).validate().is_ok());
        assert!(GridShape::new(1, 2, 2, 1).validate().is_err());
        assert!(GridShape::new(2, 2, 2, 0).validate().is_err());
    }

    #[test]
    fn test_oversized_shape_is_invalid() {
        let huge = GridShape::new(1 << 32, 1 << 32, 2, 1);
        assert_eq!(huge.checked_len(), None);
        assert!(matches!(huge.validate(), Err(AtmoError::InvalidGrid(_))));
        assert_eq!(GridShape::new(4, 3, 2, 2).checked_len(), Some(48));
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        let shape = GridShape::new(2, 2, 2, 1);
        assert!(Grid4::from_vec(shape, vec![0.0; 7]).is_err());
        let grid = Grid4::from_vec(shape, (0..8).map(|v| v as f32).collect()).unwrap();
        assert_eq!(grid.get(0, 1, 1, 0), 6.0);
    }

    #[test]
    fn test_layer_mut() {
        let mut grid = Grid4::zeros(GridShape::new(2, 2, 2, 1));
        grid.layer_mut(0, 1).copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(grid.get(0, 1, 0, 1), 2.0);
        assert_eq!(grid.get(0, 0, 0, 1), 0.0);
    }

    #[test]
    fn test_meta_validation() {
        let mut meta = DatasetMeta::new(70_000.0, 3600.0);
        assert!(meta.validate().is_ok());
        meta.scale_factor = 0.5;
        assert!(meta.validate().is_err());
        meta = DatasetMeta::new(70_000.0, 0.0);
        assert!(meta.validate().is_err());
    }
}

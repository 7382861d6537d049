//! Synthetic data generators for grid, file and image tests.
//!
//! Grids are produced in the on-disk order `[time][alt][lat][lon]` with
//! longitude fastest, which is also the in-memory order of `Grid4`.

use std::path::{Path, PathBuf};

/// Creates grid values where each cell encodes its own indices.
///
/// value = `time * 1000 + alt * 100 + lat * 10 + lon`
///
/// # Example
///
/// ```
/// use test_utils::create_indexed_grid;
///
/// let grid = create_indexed_grid(3, 2, 2, 1);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[1], 1.0);   // lon=1
/// assert_eq!(grid[3], 10.0);  // lat=1, lon=0
/// assert_eq!(grid[6], 100.0); // alt=1
/// ```
pub fn create_indexed_grid(lon: usize, lat: usize, alt: usize, time: usize) -> Vec<f32> {
    create_grid_with(lon, lat, alt, time, |t, a, la, lo| {
        (t * 1000 + a * 100 + la * 10 + lo) as f32
    })
}

/// Creates grid values from a function of `(time, alt, lat, lon)`.
pub fn create_grid_with(
    lon: usize,
    lat: usize,
    alt: usize,
    time: usize,
    f: impl Fn(usize, usize, usize, usize) -> f32,
) -> Vec<f32> {
    let mut data = Vec::with_capacity(lon * lat * alt * time);
    for t in 0..time {
        for a in 0..alt {
            for la in 0..lat {
                for lo in 0..lon {
                    data.push(f(t, a, la, lo));
                }
            }
        }
    }
    data
}

/// Creates pressure-like values decaying exponentially with altitude layer.
pub fn create_pressure_grid(
    lon: usize,
    lat: usize,
    alt: usize,
    time: usize,
    surface: f32,
) -> Vec<f32> {
    create_grid_with(lon, lat, alt, time, |_, a, _, _| surface * (-(a as f32)).exp())
}

/// Encodes values as little-endian f32 bytes.
pub fn encode_f32_le(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Encodes values as little-endian f64 bytes.
pub fn encode_f64_le(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Writes `bytes` to `dir/name`, returning the full path.
pub fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("failed to write test file");
    path
}

/// Writes an RGB PNG whose pixels come from `f(x, y)`.
pub fn write_rgb_png(
    path: &Path,
    width: u32,
    height: u32,
    f: impl Fn(u32, u32) -> [u8; 3],
) {
    let img = image::RgbImage::from_fn(width, height, |x, y| image::Rgb(f(x, y)));
    img.save(path).expect("failed to write test PNG");
}

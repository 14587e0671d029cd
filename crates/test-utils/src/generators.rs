//! Test data generators for synthetic temperature grids.
//!
//! These generators create predictable, verifiable sample patterns and
//! encode them the way grid files store them on disk.

/// Creates a grid where each sample encodes its own position.
///
/// Each cell value is `row * width + col`, truncated to `i16`, so a sample
/// read back at `(col, row)` tells you exactly which cell was sampled as long
/// as `width * height` fits in an `i16`.
///
/// # Example
///
/// ```
/// use test_utils::create_index_grid;
///
/// let grid = create_index_grid(4, 3);
/// assert_eq!(grid.len(), 12);
/// assert_eq!(grid[5], 5); // col=1, row=1
/// ```
pub fn create_index_grid(width: usize, height: usize) -> Vec<i16> {
    (0..width * height).map(|i| i as i16).collect()
}

/// Creates a sea-surface-temperature-like grid in whole degrees.
///
/// Values run from `min` at the top row to `max` at the bottom row.
pub fn create_temperature_grid(width: usize, height: usize, min: i16, max: i16) -> Vec<i16> {
    let mut data = Vec::with_capacity(width * height);
    let span = (max - min) as f32;
    for row in 0..height {
        let t = if height > 1 {
            row as f32 / (height - 1) as f32
        } else {
            0.0
        };
        let value = min + (span * t).round() as i16;
        for _ in 0..width {
            data.push(value);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: i16) -> Vec<i16> {
    vec![value; width * height]
}

/// Replace every `every`-th sample with `sentinel` (starting at index 0).
pub fn sprinkle_sentinel(data: &mut [i16], every: usize, sentinel: i16) {
    for v in data.iter_mut().step_by(every.max(1)) {
        *v = sentinel;
    }
}

/// Encode samples as one unsigned byte each (values are truncated).
pub fn encode_u8(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&v| v as u8).collect()
}

/// Encode samples as one signed byte each (values are truncated).
pub fn encode_i8(samples: &[i16]) -> Vec<u8> {
    samples.iter().map(|&v| v as i8 as u8).collect()
}

/// Encode samples as little-endian `i16`.
pub fn encode_i16_le(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Encode samples as big-endian `i16`.
pub fn encode_i16_be(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Prefix `payload` with a header of `len` bytes of `0xAB`.
pub fn with_header(len: usize, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xAB; len];
    out.extend_from_slice(payload);
    out
}

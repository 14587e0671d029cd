//! Compositing a sample grid onto a base map.
//!
//! Each output pixel is mapped back to one grid cell and one base-map pixel
//! by nearest-neighbor scaling. The two mappings are computed independently,
//! since the grid and the base image rarely share a native resolution:
//!
//! ```text
//! grid_x = floor(x * grid_width / out_width)
//! base_x = floor(x * base_width / out_width)
//! ```
//!
//! (and likewise for rows). Integer arithmetic keeps the last column/row
//! strictly inside both sources.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::error::{RenderError, RenderResult};
use crate::gradient::{ColorMapper, ColorPolicy};
use crate::grid::{SampleGrid, TemperatureRange};

/// Which base pixels receive a temperature color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Every pixel is recolored
    #[default]
    Full,
    /// Only pixels whose base color looks like water
    WaterMasked,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(RenderMode::Full),
            "water_masked" | "water" | "masked" => Ok(RenderMode::WaterMasked),
            other => Err(format!("unknown render mode: {}", other)),
        }
    }
}

/// Per-render compositing settings.
#[derive(Debug, Clone, Default)]
pub struct CompositeOptions {
    pub policy: ColorPolicy,
    pub mode: RenderMode,
    pub sentinel: Option<i16>,
}

/// Counters collected during one compositing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeStats {
    /// Pixels that received a temperature color
    pub painted: u64,
    /// Pixels left alone because the base pixel is not water
    pub masked: u64,
    /// Pixels left alone because the resampled index missed the grid
    pub out_of_bounds: u64,
}

/// Heuristic water test: blue strictly dominates red and green.
#[inline(always)]
pub fn is_water(rgba: [u8; 4]) -> bool {
    rgba[2] > rgba[0] && rgba[2] > rgba[1]
}

/// Nearest-neighbor source index for output index `i`: `floor(i * native / out)`.
#[inline(always)]
pub fn scale_index(i: usize, native: usize, out: usize) -> usize {
    ((i as u64 * native as u64) / out as u64) as usize
}

/// Source index for every output index along one axis.
fn axis_lookup(native: usize, out: usize) -> Vec<usize> {
    (0..out).map(|i| scale_index(i, native, out)).collect()
}

/// Paint `grid` onto `base` at `out_width x out_height`.
///
/// `base` is consumed. When it already has the output size it is recolored in
/// place; otherwise it is resampled into a fresh buffer. In both cases the
/// water test for a pixel reads the base color before that pixel is written.
pub fn composite(
    grid: &SampleGrid,
    range: TemperatureRange,
    base: PixelBuffer,
    out_width: usize,
    out_height: usize,
    options: &CompositeOptions,
) -> RenderResult<(PixelBuffer, CompositeStats)> {
    if out_width == 0 || out_height == 0 {
        return Err(RenderError::InvalidOutputSize {
            width: out_width,
            height: out_height,
        });
    }
    if base.is_empty() {
        return Err(RenderError::InvalidBuffer("base image is empty".to_string()));
    }

    let mapper = ColorMapper::new(&options.policy, range, options.sentinel);
    let masked_mode = options.mode == RenderMode::WaterMasked;

    if range.is_degenerate() && options.policy.uses_range() {
        debug!(min = range.min, max = range.max, "Degenerate range, using neutral color");
    }

    let grid_cols = axis_lookup(grid.width(), out_width);
    let base_cols = axis_lookup(base.width(), out_width);

    let in_place = base.width() == out_width && base.height() == out_height;
    let base_height = base.height();
    let (mut output, source) = if in_place {
        (base, None)
    } else {
        (PixelBuffer::new(out_width, out_height), Some(base))
    };

    let mut stats = CompositeStats::default();

    for y in 0..out_height {
        let grid_y = scale_index(y, grid.height(), out_height);
        let base_y = scale_index(y, base_height, out_height);

        for x in 0..out_width {
            let base_px = match &source {
                Some(src) => {
                    let px = src.get(base_cols[x], base_y).unwrap_or_default();
                    output.put(x, y, px);
                    px
                }
                None => output.get(x, y).unwrap_or_default(),
            };

            let Some(sample) = grid.get(grid_cols[x], grid_y) else {
                stats.out_of_bounds += 1;
                continue;
            };

            if masked_mode && !is_water(base_px) {
                stats.masked += 1;
                continue;
            }

            output.put(x, y, mapper.map(f32::from(sample)).to_rgba());
            stats.painted += 1;
        }
    }

    debug!(
        width = out_width,
        height = out_height,
        in_place = in_place,
        painted = stats.painted,
        masked = stats.masked,
        out_of_bounds = stats.out_of_bounds,
        "Composited grid onto base map"
    );

    Ok((output, stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_index_identity() {
        for i in 0..10 {
            assert_eq!(scale_index(i, 10, 10), i);
        }
    }

    #[test]
    fn test_scale_index_non_exact_ratio() {
        // 3 source cells spread over 7 output pixels
        let lookup = axis_lookup(3, 7);
        assert_eq!(lookup, vec![0, 0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_scale_index_large_values_do_not_overflow() {
        assert_eq!(scale_index(35_999, 36_000, 36_000), 35_999);
        assert_eq!(scale_index(71_999, 36_000, 72_000), 35_999);
    }

    #[test]
    fn test_is_water() {
        assert!(is_water([10, 20, 200, 255]));
        assert!(!is_water([200, 180, 50, 255]));
        // ties are not water
        assert!(!is_water([100, 100, 100, 255]));
        assert!(!is_water([0, 150, 150, 255]));
    }

    #[test]
    fn test_render_mode_from_str() {
        assert_eq!("water_masked".parse::<RenderMode>(), Ok(RenderMode::WaterMasked));
        assert_eq!("FULL".parse::<RenderMode>(), Ok(RenderMode::Full));
        assert!("partial".parse::<RenderMode>().is_err());
    }
}

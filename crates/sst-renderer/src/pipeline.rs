//! End-to-end render: decode, range, composite.
//!
//! Each stage needs the previous one fully materialized, so the pipeline is
//! a straight sequence with no suspension points. Encoding is left to the
//! caller, which decides whether the PNG goes to memory, a file or a socket.

use std::time::Instant;
use tracing::info;

use crate::buffer::PixelBuffer;
use crate::composite::{composite, CompositeOptions, CompositeStats, RenderMode};
use crate::error::RenderResult;
use crate::gradient::ColorPolicy;
use crate::grid::{decode_grid, GridLayout, RangeMode, TemperatureRange};
use crate::style::StyleConfig;

/// Everything needed to turn a grid and a base map into a heatmap.
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    pub layout: GridLayout,
    pub range_mode: RangeMode,
    pub policy: ColorPolicy,
    pub mode: RenderMode,
    /// Output size; `None` renders at the grid's native resolution
    pub output_size: Option<(usize, usize)>,
}

impl RenderConfig {
    /// Apply policy, mode and range settings from a style file.
    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.policy = style.policy;
        self.mode = style.mode;
        self.range_mode = style.range_mode;
        self
    }

    pub fn output_dimensions(&self) -> (usize, usize) {
        self.output_size
            .unwrap_or((self.layout.width, self.layout.height))
    }
}

/// Result of a successful render.
#[derive(Debug)]
pub struct RenderOutput {
    pub image: PixelBuffer,
    pub range: TemperatureRange,
    pub stats: CompositeStats,
}

/// Decode `grid_bytes` and paint it onto `base`.
pub fn render_heatmap(
    grid_bytes: &[u8],
    base: PixelBuffer,
    config: &RenderConfig,
) -> RenderResult<RenderOutput> {
    let start = Instant::now();

    let grid = decode_grid(grid_bytes, &config.layout)?;
    let range = grid.temperature_range(config.layout.sentinel, config.range_mode);

    let (out_width, out_height) = config.output_dimensions();
    let options = CompositeOptions {
        policy: config.policy.clone(),
        mode: config.mode,
        sentinel: config.layout.sentinel,
    };

    let base_size = (base.width(), base.height());
    let (image, stats) = composite(&grid, range, base, out_width, out_height, &options)?;

    info!(
        grid_width = grid.width(),
        grid_height = grid.height(),
        base_width = base_size.0,
        base_height = base_size.1,
        out_width = out_width,
        out_height = out_height,
        min = range.min,
        max = range.max,
        painted = stats.painted,
        duration_ms = start.elapsed().as_millis() as u64,
        "Rendered heatmap"
    );

    Ok(RenderOutput {
        image,
        range,
        stats,
    })
}

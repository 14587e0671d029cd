//! Blocking render job shared by the HTTP handler and the CLI.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use sst_renderer::{encode_png, render_heatmap, PixelBuffer, RenderOutput};

use crate::archive::extract_grid_file;
use crate::config::ServiceConfig;
use crate::error::{ApiError, ApiResult};

/// Input files for one render.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub map_path: PathBuf,
    pub zip_path: PathBuf,
}

/// Decode the base map (any format `image` recognizes) into RGBA.
pub fn load_base_image(path: &Path) -> ApiResult<PixelBuffer> {
    let image = image::io::Reader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8();

    let (width, height) = (image.width() as usize, image.height() as usize);
    PixelBuffer::from_rgba(width, height, image.into_raw())
        .map_err(|e| ApiError::InvalidImage(e.to_string()))
}

impl RenderJob {
    /// Extract the grid, decode the base map and composite them.
    ///
    /// The archive is checked first so a missing grid is reported without
    /// paying for the image decode.
    pub fn run(&self, config: &ServiceConfig) -> ApiResult<RenderOutput> {
        let start = Instant::now();

        let grid = extract_grid_file(&self.zip_path, config.render.layout.expected_len())?;
        let base = load_base_image(&self.map_path)?;
        let decoded_ms = start.elapsed().as_millis() as u64;

        let output = render_heatmap(&grid.bytes, base, &config.render)?;

        info!(
            grid_entry = %grid.name,
            decode_ms = decoded_ms,
            total_ms = start.elapsed().as_millis() as u64,
            "Render job complete"
        );
        Ok(output)
    }

    /// Render and stream the PNG to `out`.
    pub fn render_to_file(&self, config: &ServiceConfig, out: &Path) -> ApiResult<RenderOutput> {
        let output = self.run(config)?;

        let file = File::create(out)?;
        let mut writer = encode_png(&output.image, BufWriter::new(file), config.compression)?;
        writer.flush()?;

        info!(path = %out.display(), "Wrote heatmap");
        Ok(output)
    }
}

//! Service configuration.
//!
//! Everything is read from `SST_*` environment variables. Unset variables
//! fall back to the defaults of the original upload backend: a 36000x17999
//! u8 grid rendered at native resolution with threshold bands.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use sst_renderer::style::StyleConfig;
use sst_renderer::{GridLayout, PngCompression, RenderConfig};

/// Default upper bound on a whole multipart request (2 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// Runtime configuration for the upload service and the CLI.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Grid layout, color policy and compositing settings
    pub render: RenderConfig,
    /// Directory under which per-request workspaces are created
    pub work_dir: PathBuf,
    /// Request body limit for `/upload`
    pub max_upload_bytes: usize,
    /// zlib level for the PNG output
    pub compression: PngCompression,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            work_dir: env::temp_dir(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            compression: PngCompression::default(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GridLayout::default();
        let layout = GridLayout {
            width: parse_var(&lookup, "SST_GRID_WIDTH")?.unwrap_or(defaults.width),
            height: parse_var(&lookup, "SST_GRID_HEIGHT")?.unwrap_or(defaults.height),
            format: parse_var(&lookup, "SST_GRID_FORMAT")?.unwrap_or(defaults.format),
            header_bytes: parse_var(&lookup, "SST_GRID_HEADER_BYTES")?
                .unwrap_or(defaults.header_bytes),
            sentinel: match lookup("SST_GRID_SENTINEL") {
                Some(v) if v.trim().eq_ignore_ascii_case("none") => None,
                Some(v) => Some(
                    v.trim()
                        .parse::<i16>()
                        .with_context(|| format!("invalid SST_GRID_SENTINEL: {}", v))?,
                ),
                None => defaults.sentinel,
            },
        };

        let output_size = match (
            parse_var::<usize, _>(&lookup, "SST_OUTPUT_WIDTH")?,
            parse_var::<usize, _>(&lookup, "SST_OUTPUT_HEIGHT")?,
        ) {
            (Some(w), Some(h)) => Some((w, h)),
            (None, None) => None,
            _ => {
                return Err(anyhow!(
                    "SST_OUTPUT_WIDTH and SST_OUTPUT_HEIGHT must be set together"
                ))
            }
        };

        let mut render = RenderConfig {
            layout,
            range_mode: parse_var(&lookup, "SST_RANGE_MODE")?.unwrap_or_default(),
            policy: parse_var(&lookup, "SST_COLOR_POLICY")?.unwrap_or_default(),
            mode: parse_var(&lookup, "SST_RENDER_MODE")?.unwrap_or_default(),
            output_size,
        };

        if let Some(path) = lookup("SST_STYLE_FILE") {
            let style = StyleConfig::from_file(&path)
                .map_err(|e| anyhow!("failed to load style file {}: {}", path, e))?;
            render = render.with_style(style);
        }

        Ok(Self {
            render,
            work_dir: lookup("SST_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            max_upload_bytes: parse_var(&lookup, "SST_MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            compression: parse_var(&lookup, "SST_PNG_COMPRESSION")?.unwrap_or_default(),
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("invalid {}={:?}: {}", key, raw, e)),
        None => Ok(None),
    }
}

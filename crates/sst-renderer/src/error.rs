//! Error types for the rendering pipeline.

use thiserror::Error;

/// Result type alias using RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised while decoding a sample grid.
///
/// All variants are fatal for the render; nothing is partially decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid dimensions must be non-zero (got {width}x{height})")]
    ZeroDimensions { width: usize, height: usize },

    #[error("Grid entry of {size} bytes exceeds the {limit} byte layout")]
    Oversized { size: u64, limit: usize },

    #[error("Grid buffer of {len} bytes is shorter than the {header} byte header")]
    TruncatedHeader { len: usize, header: usize },

    #[error("Grid payload of {payload} bytes is not a multiple of the {stride} byte sample stride")]
    StrideMismatch { payload: usize, stride: usize },

    #[error("Grid holds {actual} samples, expected {expected} ({width}x{height})")]
    SampleCountMismatch {
        actual: usize,
        expected: usize,
        width: usize,
        height: usize,
    },
}

/// Primary error type for rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Malformed grid: {0}")]
    MalformedGrid(#[from] GridError),

    #[error("Invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    #[error("Invalid output size {width}x{height}")]
    InvalidOutputSize { width: usize, height: usize },

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] std::io::Error),
}

//! Sea-surface-temperature heatmap rendering.
//!
//! The pipeline has four stages, each in its own module:
//! - [`grid`]: decode a packed binary sample grid and compute its range
//! - [`gradient`]: map a sample to a color under a [`ColorPolicy`]
//! - [`composite`]: resample the grid onto a base map, optionally only over water
//! - [`png`]: stream the result out as a lossless RGBA PNG
//!
//! [`pipeline::render_heatmap`] runs the first three in order.

pub mod buffer;
pub mod composite;
pub mod error;
pub mod gradient;
pub mod grid;
pub mod pipeline;
pub mod png;
pub mod style;

pub use buffer::PixelBuffer;
pub use composite::{composite, CompositeOptions, CompositeStats, RenderMode};
pub use error::{GridError, RenderError, RenderResult};
pub use gradient::{Color, ColorPolicy};
pub use grid::{decode_grid, GridLayout, RangeMode, SampleFormat, SampleGrid, TemperatureRange};
pub use pipeline::{render_heatmap, RenderConfig, RenderOutput};
pub use png::{create_png, encode_png, PngCompression, PngStreamEncoder};

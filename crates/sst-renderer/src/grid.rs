//! Packed binary temperature grids.
//!
//! A grid file is an optional fixed-size header followed by `width * height`
//! samples in row-major order (row 0 first). Each sample is 1 or 2 bytes
//! depending on the [`SampleFormat`]. Any sample may be the sentinel value,
//! meaning "no data" for that cell.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::error::GridError;

/// Grid width of the supported global SST product (0.01° resolution).
pub const DEFAULT_GRID_WIDTH: usize = 36000;

/// Grid height of the supported global SST product.
pub const DEFAULT_GRID_HEIGHT: usize = 17999;

/// Marker value for cells without a reading.
pub const DEFAULT_SENTINEL: i16 = -999;

/// On-disk encoding of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// Unsigned byte per sample
    U8,
    /// Signed byte per sample
    I8,
    /// Signed 16-bit little-endian
    I16Le,
    /// Signed 16-bit big-endian
    I16Be,
}

impl SampleFormat {
    /// Bytes per sample.
    pub fn stride(self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::I8 => 1,
            SampleFormat::I16Le | SampleFormat::I16Be => 2,
        }
    }

    #[inline(always)]
    fn read(self, bytes: &[u8]) -> i16 {
        match self {
            SampleFormat::U8 => bytes[0] as i16,
            SampleFormat::I8 => bytes[0] as i8 as i16,
            SampleFormat::I16Le => i16::from_le_bytes([bytes[0], bytes[1]]),
            SampleFormat::I16Be => i16::from_be_bytes([bytes[0], bytes[1]]),
        }
    }
}

impl FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "u8" | "uint8" => Ok(SampleFormat::U8),
            "i8" | "int8" => Ok(SampleFormat::I8),
            "i16" | "i16le" | "int16" => Ok(SampleFormat::I16Le),
            "i16be" => Ok(SampleFormat::I16Be),
            other => Err(format!("unknown sample format: {}", other)),
        }
    }
}

/// Whether the sentinel takes part in the min/max scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMode {
    /// Skip sentinel cells when computing the range
    #[default]
    ExcludeSentinel,
    /// Treat the sentinel as an ordinary sample
    IncludeAll,
}

impl FromStr for RangeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclude_sentinel" | "exclude" => Ok(RangeMode::ExcludeSentinel),
            "include_all" | "include" => Ok(RangeMode::IncludeAll),
            other => Err(format!("unknown range mode: {}", other)),
        }
    }
}

/// Expected shape and encoding of an incoming grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub width: usize,
    pub height: usize,
    pub format: SampleFormat,
    /// Bytes to skip before the first sample
    #[serde(default)]
    pub header_bytes: usize,
    /// "No data" marker, if the product defines one
    #[serde(default)]
    pub sentinel: Option<i16>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            format: SampleFormat::U8,
            header_bytes: 0,
            sentinel: Some(DEFAULT_SENTINEL),
        }
    }
}

impl GridLayout {
    pub fn sample_count(&self) -> usize {
        self.width * self.height
    }

    /// Total file size this layout expects, header included.
    pub fn expected_len(&self) -> usize {
        self.header_bytes + self.sample_count() * self.format.stride()
    }
}

/// Inclusive sample-space range of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    pub min: f32,
    pub max: f32,
}

impl TemperatureRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(a: f32, b: f32) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// True when every sample shares one value and normalization is undefined.
    pub fn is_degenerate(&self) -> bool {
        self.span() <= 0.0
    }
}

/// Row-major array of decoded temperature samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGrid {
    width: usize,
    height: usize,
    samples: Vec<i16>,
}

impl SampleGrid {
    /// Wrap already-decoded samples, checking `samples.len() == width * height`.
    pub fn new(width: usize, height: usize, samples: Vec<i16>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimensions { width, height });
        }
        let expected = width * height;
        if samples.len() != expected {
            return Err(GridError::SampleCountMismatch {
                actual: samples.len(),
                expected,
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample at column `x`, row `y`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<i16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.samples.get(y * self.width + x).copied()
    }

    /// Single linear min/max pass over the grid.
    ///
    /// With [`RangeMode::ExcludeSentinel`] a grid made only of sentinels
    /// yields the degenerate range `{0, 0}`.
    pub fn temperature_range(&self, sentinel: Option<i16>, mode: RangeMode) -> TemperatureRange {
        let skip = match mode {
            RangeMode::ExcludeSentinel => sentinel,
            RangeMode::IncludeAll => None,
        };

        let (min, max) = self
            .samples
            .iter()
            .copied()
            .filter(|&v| Some(v) != skip)
            .fold((i16::MAX, i16::MIN), |(min, max), v| (min.min(v), max.max(v)));

        if min > max {
            return TemperatureRange { min: 0.0, max: 0.0 };
        }
        TemperatureRange {
            min: min as f32,
            max: max as f32,
        }
    }
}

/// Decode a raw grid buffer according to `layout`.
///
/// Fails without producing a grid when the header is missing, the payload is
/// not a whole number of samples, or the sample count differs from
/// `layout.width * layout.height`.
pub fn decode_grid(bytes: &[u8], layout: &GridLayout) -> Result<SampleGrid, GridError> {
    if layout.width == 0 || layout.height == 0 {
        return Err(GridError::ZeroDimensions {
            width: layout.width,
            height: layout.height,
        });
    }

    let payload = bytes
        .get(layout.header_bytes..)
        .ok_or(GridError::TruncatedHeader {
            len: bytes.len(),
            header: layout.header_bytes,
        })?;

    let stride = layout.format.stride();
    if payload.len() % stride != 0 {
        return Err(GridError::StrideMismatch {
            payload: payload.len(),
            stride,
        });
    }

    let count = payload.len() / stride;
    let expected = layout.sample_count();
    if count != expected {
        return Err(GridError::SampleCountMismatch {
            actual: count,
            expected,
            width: layout.width,
            height: layout.height,
        });
    }

    let format = layout.format;
    let samples: Vec<i16> = payload.chunks_exact(stride).map(|c| format.read(c)).collect();

    debug!(
        width = layout.width,
        height = layout.height,
        format = ?format,
        header_bytes = layout.header_bytes,
        "Decoded sample grid"
    );

    SampleGrid::new(layout.width, layout.height, samples)
}

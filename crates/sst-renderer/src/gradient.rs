//! Temperature to color mapping.
//!
//! Every policy implements the same contract: a sample plus the grid's
//! [`TemperatureRange`] in, an opaque RGB color out. Mapping is pure and
//! deterministic, so identical inputs always give identical pixels.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::grid::TemperatureRange;

/// Color used for sentinel and non-finite samples.
pub const NO_DATA_COLOR: Color = Color::new(0, 0, 0);

pub const COLD: Color = Color::new(0, 0, 255);
pub const WARM: Color = Color::new(0, 255, 0);
pub const HOT: Color = Color::new(255, 0, 0);

/// Lower edge of the warm band, in raw sample units.
pub const DEFAULT_WARM_FROM: f32 = 32.0;

/// Lower edge of the hot band, in raw sample units.
pub const DEFAULT_HOT_FROM: f32 = 60.0;

/// Color value in RGB format. Alpha is always opaque when written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// RGBA bytes with full opacity.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// Linear color interpolation, `t` clamped into `[0, 1]`.
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    let channel = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round().clamp(0.0, 255.0) as u8;

    Color::new(
        channel(color1.r, color2.r),
        channel(color1.g, color2.g),
        channel(color1.b, color2.b),
    )
}

/// How valid samples are turned into colors.
///
/// Selected by configuration, e.g. `{"type": "gradient"}` or
/// `{"type": "threshold", "warm_from": 32, "hot_from": 60}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Three fixed bands: `[-inf, warm_from)`, `[warm_from, hot_from)`, `[hot_from, inf)`.
    Threshold {
        #[serde(default = "default_warm_from")]
        warm_from: f32,
        #[serde(default = "default_hot_from")]
        hot_from: f32,
        #[serde(default = "default_cold")]
        cold: Color,
        #[serde(default = "default_warm")]
        warm: Color,
        #[serde(default = "default_hot")]
        hot: Color,
    },
    /// Blue at the range minimum, green at the midpoint, red at the maximum.
    Gradient,
    /// Straight ramp between two colors across the range.
    Linear {
        #[serde(default = "default_cold")]
        low: Color,
        #[serde(default = "default_hot")]
        high: Color,
    },
}

fn default_warm_from() -> f32 {
    DEFAULT_WARM_FROM
}

fn default_hot_from() -> f32 {
    DEFAULT_HOT_FROM
}

fn default_cold() -> Color {
    COLD
}

fn default_warm() -> Color {
    WARM
}

fn default_hot() -> Color {
    HOT
}

impl Default for ColorPolicy {
    fn default() -> Self {
        ColorPolicy::threshold()
    }
}

impl ColorPolicy {
    /// Threshold policy with the standard 32/60 breakpoints.
    pub fn threshold() -> Self {
        ColorPolicy::Threshold {
            warm_from: DEFAULT_WARM_FROM,
            hot_from: DEFAULT_HOT_FROM,
            cold: COLD,
            warm: WARM,
            hot: HOT,
        }
    }

    /// Blue to red linear ramp.
    pub fn linear() -> Self {
        ColorPolicy::Linear { low: COLD, high: HOT }
    }

    /// Whether this policy normalizes by the grid range.
    pub fn uses_range(&self) -> bool {
        !matches!(self, ColorPolicy::Threshold { .. })
    }

    /// Color for a valid (finite, non-sentinel) sample.
    pub fn color_for(&self, value: f32, range: &TemperatureRange) -> Color {
        match self {
            ColorPolicy::Threshold {
                warm_from,
                hot_from,
                cold,
                warm,
                hot,
            } => {
                if value < *warm_from {
                    *cold
                } else if value < *hot_from {
                    *warm
                } else {
                    *hot
                }
            }
            ColorPolicy::Gradient => match normalized(value, range) {
                None => WARM,
                Some(ratio) if ratio <= 0.5 => interpolate_color(COLD, WARM, ratio * 2.0),
                Some(ratio) => interpolate_color(WARM, HOT, (ratio - 0.5) * 2.0),
            },
            ColorPolicy::Linear { low, high } => {
                let ratio = normalized(value, range).unwrap_or(0.5);
                interpolate_color(*low, *high, ratio)
            }
        }
    }
}

impl FromStr for ColorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "threshold" | "bands" => Ok(ColorPolicy::threshold()),
            "gradient" => Ok(ColorPolicy::Gradient),
            "linear" => Ok(ColorPolicy::linear()),
            other => Err(format!("unknown color policy: {}", other)),
        }
    }
}

/// `(value - min) / (max - min)` clamped to `[0, 1]`, or `None` for a
/// degenerate range.
fn normalized(value: f32, range: &TemperatureRange) -> Option<f32> {
    if range.is_degenerate() {
        return None;
    }
    Some(((value - range.min) / range.span()).clamp(0.0, 1.0))
}

/// A policy bound to one grid's range and sentinel.
#[derive(Debug, Clone)]
pub struct ColorMapper<'a> {
    policy: &'a ColorPolicy,
    range: TemperatureRange,
    sentinel: Option<f32>,
}

impl<'a> ColorMapper<'a> {
    pub fn new(policy: &'a ColorPolicy, range: TemperatureRange, sentinel: Option<i16>) -> Self {
        Self {
            policy,
            range,
            sentinel: sentinel.map(f32::from),
        }
    }

    pub fn range(&self) -> TemperatureRange {
        self.range
    }

    /// Map one sample. Sentinel and non-finite values get [`NO_DATA_COLOR`].
    #[inline]
    pub fn map(&self, sample: f32) -> Color {
        if !sample.is_finite() || Some(sample) == self.sentinel {
            return NO_DATA_COLOR;
        }
        self.policy.color_for(sample, &self.range)
    }
}

//! Style configuration for heatmap rendering.
//!
//! A style file is a small JSON document selecting the color policy, the
//! compositing mode and how the range is computed:
//!
//! ```json
//! {
//!   "name": "sst-gradient",
//!   "policy": { "type": "gradient" },
//!   "mode": "water_masked",
//!   "range_mode": "exclude_sentinel"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::composite::RenderMode;
use crate::gradient::{Color, ColorPolicy};
use crate::grid::RangeMode;

/// Style configuration loaded from JSON
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub policy: ColorPolicy,
    #[serde(default)]
    pub mode: RenderMode,
    #[serde(default)]
    pub range_mode: RangeMode,
}

impl StyleConfig {
    /// Load style configuration from JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Load style configuration from file
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        hex_to_rgb(&value)
            .map(|(r, g, b)| Color::new(r, g, b))
            .ok_or_else(|| format!("invalid hex color: {}", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FF8000"), Some((255, 128, 0)));
        assert_eq!(hex_to_rgb("00ff00"), Some((0, 255, 0)));
        assert_eq!(hex_to_rgb("#fff"), None);
        assert_eq!(hex_to_rgb("#gg0000"), None);
    }

    #[test]
    fn test_color_hex_roundtrip() {
        let color = Color::new(18, 52, 86);
        let hex: String = color.into();
        assert_eq!(hex, "#123456");
        assert_eq!(Color::try_from(hex), Ok(color));
    }

    #[test]
    fn test_empty_style_uses_defaults() {
        let style = StyleConfig::from_json("{}").unwrap();
        assert_eq!(style.policy, ColorPolicy::threshold());
        assert_eq!(style.mode, RenderMode::Full);
        assert_eq!(style.range_mode, RangeMode::ExcludeSentinel);
    }

    #[test]
    fn test_threshold_style_overrides() {
        let json = r##"{
            "name": "custom",
            "policy": { "type": "threshold", "warm_from": 10, "hot": "#800000" },
            "mode": "water_masked"
        }"##;
        let style = StyleConfig::from_json(json).unwrap();
        assert_eq!(style.mode, RenderMode::WaterMasked);
        match style.policy {
            ColorPolicy::Threshold {
                warm_from, hot_from, hot, ..
            } => {
                assert_eq!(warm_from, 10.0);
                assert_eq!(hot_from, 60.0);
                assert_eq!(hot, Color::new(128, 0, 0));
            }
            other => panic!("expected threshold policy, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_color_rejected() {
        let json = r#"{"policy": {"type": "linear", "low": "blue"}}"#;
        assert!(StyleConfig::from_json(json).is_err());
    }
}

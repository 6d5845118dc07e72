//! Style configuration for heatmap rendering.
//!
//! Styles are loaded from JSON documents of the form:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "styles": {
//!     "pgv": {
//!       "name": "Peak ground velocity",
//!       "units": "cm/s",
//!       "percentage_values": false,
//!       "stops": [
//!         { "value": 0.0, "color": "#003F7F" },
//!         { "value": 60.0, "color": "#FF7F3F" }
//!       ]
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use seismic_common::{SeismicError, SeismicResult};

use crate::gradient::{Color, ColorRamp, ColorStop, HeatmapStyle};

/// Style configuration loaded from JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    pub version: String,
    pub styles: HashMap<String, StyleDefinition>,
}

/// A single style definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleDefinition {
    pub name: String,
    pub description: Option<String>,
    pub units: Option<String>,
    pub stops: Vec<StopDefinition>,
    #[serde(default = "default_true")]
    pub percentage_values: bool,
    pub interpolate_intensity: Option<bool>,
    pub show_wireframe: Option<bool>,
}

/// Color stop as written in style files
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StopDefinition {
    pub value: f64,
    pub color: String,
    pub label: Option<String>,
}

fn default_true() -> bool {
    true
}

impl StyleConfig {
    /// Load style configuration from JSON string
    pub fn from_json(json_str: &str) -> SeismicResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load style configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> SeismicResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SeismicError::config(format!("cannot read style file {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Get a specific style definition
    pub fn get_style(&self, name: &str) -> Option<&StyleDefinition> {
        self.styles.get(name)
    }
}

impl StyleDefinition {
    /// Build the color ramp described by this style.
    pub fn to_ramp(&self) -> SeismicResult<ColorRamp> {
        build_ramp(&self.stops, self.percentage_values)
    }

    /// Apply this style on top of `base`, keeping base toggles the style
    /// leaves unset.
    pub fn to_heatmap_style(&self, base: &HeatmapStyle) -> SeismicResult<HeatmapStyle> {
        Ok(HeatmapStyle {
            interpolate_intensity: self
                .interpolate_intensity
                .unwrap_or(base.interpolate_intensity),
            show_wireframe: self.show_wireframe.unwrap_or(base.show_wireframe),
            palette_steps: self.to_ramp()?,
        })
    }
}

/// Build a ramp from hex-colored stop definitions.
pub fn build_ramp(stops: &[StopDefinition], percentage_values: bool) -> SeismicResult<ColorRamp> {
    let stops = stops
        .iter()
        .map(|s| {
            Color::from_hex(&s.color)
                .map(|color| ColorStop::new(s.value, color))
                .ok_or_else(|| SeismicError::config(format!("invalid stop color '{}'", s.color)))
        })
        .collect::<SeismicResult<Vec<_>>>()?;
    ColorRamp::new(stops, percentage_values)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#FF0000"), Some((255, 0, 0)));
        assert_eq!(hex_to_rgb("#00FF00"), Some((0, 255, 0)));
        assert_eq!(hex_to_rgb("#0000FF"), Some((0, 0, 255)));
        assert_eq!(hex_to_rgb("FF0000"), Some((255, 0, 0)));
        assert_eq!(hex_to_rgb("#GGGGGG"), None);
        assert_eq!(hex_to_rgb("#ÿÿÿ"), None);
    }

    #[test]
    fn test_build_ramp_bad_color() {
        let stops = vec![StopDefinition {
            value: 0.0,
            color: "blue".to_string(),
            label: None,
        }];
        let err = build_ramp(&stops, true).unwrap_err();
        assert_eq!(err.kind(), seismic_common::ErrorKind::Config);
    }

    #[test]
    fn test_build_ramp_non_ascii_color() {
        for color in ["#aaaaa\u{e9}a", "#\u{e9}\u{e9}\u{e9}\u{e9}"] {
            let stops = vec![StopDefinition {
                value: 0.0,
                color: color.to_string(),
                label: None,
            }];
            let err = build_ramp(&stops, true).unwrap_err();
            assert_eq!(err.kind(), seismic_common::ErrorKind::Config);
        }
        assert_eq!(Color::from_hex("aaaaa\u{e9}a"), None);
    }
}

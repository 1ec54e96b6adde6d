use crate::constants::{BACKGROUND_COLOR, HIGHLIGHT_CONTRAST_RATIO, SELECTION_COLOR};
use chartspec_common::error::{Result, ResultWithContext};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// Scheme called `name`, falling back to light for unknown names
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => ColorScheme::Light,
            "dark" => ColorScheme::Dark,
            other => {
                warn!("Unknown color scheme '{other}', using light");
                ColorScheme::Light
            }
        }
    }

    /// Blend mode for overlapping symbols: darker overlaps in light mode, lighter in dark mode
    pub fn blend_mode(&self) -> &'static str {
        match self {
            ColorScheme::Light => "multiply",
            ColorScheme::Dark => "screen",
        }
    }
}

/// One palette slot, either a single color or a list of shades used by dual facets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaletteEntry {
    Color(String),
    Shades(Vec<String>),
}

impl PaletteEntry {
    pub fn primary(&self) -> Option<&str> {
        match self {
            PaletteEntry::Color(c) => Some(c.as_str()),
            PaletteEntry::Shades(shades) => shades.first().map(|s| s.as_str()),
        }
    }

    pub fn shades(&self) -> Vec<String> {
        match self {
            PaletteEntry::Color(c) => vec![c.clone()],
            PaletteEntry::Shades(shades) => shades.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub color_scheme: ColorScheme,
    pub colors: Vec<PaletteEntry>,
    pub line_types: Vec<String>,
    pub opacities: Vec<f64>,
    pub line_widths: Vec<f64>,
    pub symbol_sizes: Vec<f64>,
    pub symbol_shapes: Vec<String>,
    pub highlight_contrast_ratio: f64,
    pub selection_color: String,
    pub background_color: String,
    pub chart_id: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Light,
            colors: default_colors(),
            line_types: ["solid", "dashed", "dotted", "dotDash", "longDash", "twoDash"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            opacities: vec![1.0],
            line_widths: vec![1.5],
            symbol_sizes: vec![36.0, 256.0],
            symbol_shapes: ["rounded-square", "circle", "square", "triangle", "diamond"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            highlight_contrast_ratio: HIGHLIGHT_CONTRAST_RATIO,
            selection_color: SELECTION_COLOR.to_string(),
            background_color: BACKGROUND_COLOR.to_string(),
            chart_id: "chart".to_string(),
        }
    }
}

fn default_colors() -> Vec<PaletteEntry> {
    [
        "#0fb5ae", "#4046ca", "#f68511", "#de3d82", "#7e84fa", "#72e06a", "#147af3", "#7326d3",
        "#e8c600", "#cb5d00", "#008f5d", "#bce931",
    ]
    .iter()
    .map(|c| PaletteEntry::Color(c.to_string()))
    .collect()
}

impl BuilderConfig {
    pub fn from_json(config: &str) -> Result<Self> {
        serde_json::from_str(config).with_context(|| "Failed to parse builder config")
    }

    /// First palette color, used when a mark has a static color
    pub fn first_color(&self) -> String {
        self.colors
            .first()
            .and_then(|c| c.primary())
            .unwrap_or("#0fb5ae")
            .to_string()
    }

    /// Range of the `color` scale
    pub fn color_range(&self) -> Vec<Value> {
        self.colors
            .iter()
            .filter_map(|c| c.primary())
            .map(|c| json!(c))
            .collect()
    }

    /// Range of the `colors` scale, one list of shades per palette slot
    pub fn colors_range(&self) -> Vec<Value> {
        self.colors.iter().map(|c| json!(c.shades())).collect()
    }

    /// Range of the `lineType` scale as stroke dash arrays
    pub fn line_type_range(&self) -> Vec<Value> {
        self.line_types
            .iter()
            .map(|t| json!(stroke_dash(t)))
            .collect()
    }
}

/// Stroke dash array for a named line type. Unknown names render solid.
pub fn stroke_dash(line_type: &str) -> Vec<f64> {
    match line_type {
        "dashed" => vec![7.0, 4.0],
        "dotted" => vec![2.0, 3.0],
        "dotDash" => vec![2.0, 3.0, 7.0, 4.0],
        "shortDash" => vec![3.0, 4.0],
        "longDash" => vec![11.0, 4.0],
        "twoDash" => vec![5.0, 2.0, 11.0, 2.0],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{BuilderConfig, ColorScheme, PaletteEntry};

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = BuilderConfig::from_json(
            r##"{"color_scheme": "dark", "colors": ["#000000", ["#111111", "#222222"]]}"##,
        )
        .unwrap();
        assert_eq!(config.color_scheme, ColorScheme::Dark);
        assert_eq!(config.color_scheme.blend_mode(), "screen");
        assert_eq!(
            config.colors[1],
            PaletteEntry::Shades(vec!["#111111".to_string(), "#222222".to_string()])
        );
        assert_eq!(config.highlight_contrast_ratio, 0.2);
        assert_eq!(config.first_color(), "#000000");
    }

    #[test]
    fn test_unknown_scheme_falls_back_to_light() {
        assert_eq!(ColorScheme::from_name("dark"), ColorScheme::Dark);
        assert_eq!(ColorScheme::from_name("sepia"), ColorScheme::Light);
    }
}

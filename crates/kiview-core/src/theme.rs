//! Color themes.
//!
//! A theme maps normalized layer names to colors. Lookups never fail: a
//! missing entry falls back to an opaque red so incomplete theme data shows
//! up visually instead of crashing the paint pass.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::shapes::Color;

/// Fallback for layer names the theme does not cover.
pub const MISSING_COLOR: Color = Color::new(1.0, 0.0, 0.0, 1.0);

/// A named color theme for a document kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub background: Color,
    pub grid: Color,
    pub grid_axes: Color,
    pub highlight: Color,
    /// Per-layer colors, keyed by normalized layer name.
    pub layers: HashMap<String, Color>,
}

/// Normalizes a layer name into a theme key: lowercase, with `.`, `:` and
/// spaces collapsed to underscores. `"F.Cu"` and `":Zones:F.Cu"` become
/// `"f_cu"` and `"zones_f_cu"`.
pub fn normalize_layer_name(name: &str) -> String {
    name.trim_matches(':')
        .to_ascii_lowercase()
        .replace([':', '.', ' '], "_")
}

impl Theme {
    /// Looks up the color for a layer, falling back to [`MISSING_COLOR`].
    pub fn color_for(&self, layer_name: &str) -> Color {
        let key = normalize_layer_name(layer_name);
        match self.layers.get(&key) {
            Some(color) => *color,
            None => {
                debug!(layer = layer_name, "no theme color, using fallback");
                MISSING_COLOR
            }
        }
    }

    pub fn set_color(&mut self, layer_name: &str, color: Color) {
        self.layers.insert(normalize_layer_name(layer_name), color);
    }

    /// Parses a theme from JSON.
    pub fn from_json(json: &str) -> Result<Theme> {
        serde_json::from_str(json).map_err(|e| Error::InvalidTheme(e.to_string()))
    }

    /// Loads a theme from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Theme> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidTheme(format!("{}: {e}", path.display())))?;
        Theme::from_json(&json)
    }

    /// The default board theme, modeled on the KiCAD classic palette.
    pub fn board_default() -> Theme {
        let mut layers = HashMap::new();
        let mut set = |name: &str, hex: &str| {
            layers.insert(
                normalize_layer_name(name),
                Color::from_hex(hex).unwrap_or(MISSING_COLOR),
            );
        };
        set("F.Cu", "#c83434");
        set("B.Cu", "#4d7fc4");
        for i in 1..=30 {
            // Inner copper alternates between two muted tones.
            let hex = if i % 2 == 1 { "#c2c200" } else { "#c200c2" };
            set(&format!("In{i}.Cu"), hex);
        }
        set("F.SilkS", "#f2eda1");
        set("B.SilkS", "#e8b2a7");
        set("F.Mask", "#d75fd7");
        set("B.Mask", "#02ffee");
        set("F.Paste", "#a4a4a4");
        set("B.Paste", "#00b3b3");
        set("F.Fab", "#afafaf");
        set("B.Fab", "#585d84");
        set("F.CrtYd", "#ff26e2");
        set("B.CrtYd", "#26e9ff");
        set("Edge.Cuts", "#d0d2cd");
        set("Margin", "#ff26e2");
        set("Dwgs.User", "#c2c2c2");
        set("Cmts.User", "#7f7fff");
        set(":Via:Holes", "#ececec");
        set(":Via:Through", "#ececec");
        set(":Via:MicroVia", "#51e0a6");
        set(":Pad:Holes", "#1a1a1a");
        set(":Pad:HoleWalls", "#ececec");
        set(":Anchors", "#ff8c00");
        Theme {
            name: "kicad-classic".to_string(),
            background: Color::from_hex("#001023").unwrap_or(Color::BLACK),
            grid: Color::from_hex("#848484").unwrap_or(Color::WHITE),
            grid_axes: Color::from_hex("#848484").unwrap_or(Color::WHITE),
            highlight: Color::from_hex("#ffffff80").unwrap_or(Color::WHITE),
            layers,
        }
    }

    /// The default schematic theme.
    pub fn schematic_default() -> Theme {
        let mut layers = HashMap::new();
        let mut set = |name: &str, hex: &str| {
            layers.insert(
                normalize_layer_name(name),
                Color::from_hex(hex).unwrap_or(MISSING_COLOR),
            );
        };
        set(":Interconnect", "#008000");
        set(":Symbol:Background", "#fff2c9");
        set(":Symbol:Foreground", "#840000");
        set(":Symbol:Field", "#787878");
        set(":Symbol:Pin", "#840000");
        set(":Label", "#000000");
        set(":Label:Global", "#840000");
        set(":Label:Hierarchical", "#a16b00");
        set(":Notes", "#0000c8");
        set(":Junction", "#008000");
        set(":Marks", "#0000c8");
        Theme {
            name: "kicad-classic".to_string(),
            background: Color::from_hex("#f5f4ef").unwrap_or(Color::WHITE),
            grid: Color::from_hex("#909090").unwrap_or(Color::BLACK),
            grid_axes: Color::from_hex("#909090").unwrap_or(Color::BLACK),
            highlight: Color::from_hex("#ff00ff80").unwrap_or(Color::BLACK),
            layers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_layer_name("F.Cu"), "f_cu");
        assert_eq!(normalize_layer_name(":Via:Holes"), "via_holes");
        assert_eq!(normalize_layer_name(":Zones:F.Cu"), "zones_f_cu");
    }

    #[test]
    fn test_missing_color_fallback() {
        let theme = Theme::board_default();
        assert_eq!(theme.color_for("No.Such.Layer"), MISSING_COLOR);
    }

    #[test]
    fn test_known_color() {
        let theme = Theme::board_default();
        assert_ne!(theme.color_for("F.Cu"), MISSING_COLOR);
        // Lookup is normalization-insensitive.
        assert_eq!(theme.color_for("F.Cu"), theme.color_for("f_cu"));
    }

    #[test]
    fn test_json_round_trip() {
        let theme = Theme::schematic_default();
        let json = serde_json::to_string(&theme).unwrap();
        let back = Theme::from_json(&json).unwrap();
        assert_eq!(back.color_for(":Label"), theme.color_for(":Label"));
        assert_eq!(back.name, theme.name);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Theme::from_json("not json").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        let theme = Theme::board_default();
        std::fs::write(&path, serde_json::to_string(&theme).unwrap()).unwrap();
        let back = Theme::from_file(&path).unwrap();
        assert_eq!(back.color_for("Edge.Cuts"), theme.color_for("Edge.Cuts"));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(Theme::from_file(std::path::Path::new("/no/such/theme.json")).is_err());
    }
}

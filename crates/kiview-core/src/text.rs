//! Text styling shared between the document model and the text shaper.

use serde::{Deserialize, Serialize};

/// Horizontal text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl HAlign {
    /// Rotating text by 180 degrees swaps left and right anchoring.
    pub fn flipped(&self) -> HAlign {
        match self {
            HAlign::Left => HAlign::Right,
            HAlign::Center => HAlign::Center,
            HAlign::Right => HAlign::Left,
        }
    }
}

/// Vertical text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

impl VAlign {
    pub fn flipped(&self) -> VAlign {
        match self {
            VAlign::Top => VAlign::Bottom,
            VAlign::Center => VAlign::Center,
            VAlign::Bottom => VAlign::Top,
        }
    }
}

/// Style inputs to the text shaper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Glyph height in document units.
    pub size: f64,
    /// Stroke width of the glyph strokes.
    pub thickness: f64,
    pub halign: HAlign,
    pub valign: VAlign,
    /// Render mirrored (text on the back side of a board).
    pub mirrored: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 1.27,
            thickness: 0.15,
            halign: HAlign::default(),
            valign: VAlign::default(),
            mirrored: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip() {
        assert_eq!(HAlign::Left.flipped(), HAlign::Right);
        assert_eq!(HAlign::Center.flipped(), HAlign::Center);
        assert_eq!(VAlign::Top.flipped(), VAlign::Bottom);
    }
}

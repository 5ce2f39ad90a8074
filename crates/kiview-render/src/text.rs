//! The text shaper contract.
//!
//! Stroke-font glyph shaping is an external service: given a string and a
//! style it returns stroke polylines and a bounding box, deterministically
//! for identical inputs. The painters only consume this contract.
//!
//! [`BoxShaper`] is the built-in stand-in: it lays out glyph cells with a
//! fixed advance ratio and emits each line's outline box as its strokes.
//! Layout, alignment and rotation behave like a real shaper, so bounding
//! boxes and hit-testing are meaningful even without font data.

use kiview_core::math::{Angle, BBox, Matrix3, Vec2};
use kiview_core::shapes::{Color, Polyline};
use kiview_core::text::{HAlign, TextStyle, VAlign};

/// Shaped text: world-positioned stroke polylines plus their bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedParagraph {
    pub bbox: BBox,
    strokes: Vec<Vec<Vec2>>,
}

impl ShapedParagraph {
    pub fn new(bbox: BBox, strokes: Vec<Vec<Vec2>>) -> Self {
        Self { bbox, strokes }
    }

    pub fn strokes(&self) -> &[Vec<Vec2>] {
        &self.strokes
    }

    /// Converts the strokes into renderable polylines.
    pub fn to_polylines(&self, width: f64, color: Color) -> Vec<Polyline> {
        self.strokes
            .iter()
            .map(|points| Polyline::new(points.clone(), width, color))
            .collect()
    }
}

/// The shaping service contract. Implementations must be pure functions
/// of their inputs once their font resources are loaded.
pub trait TextShaper {
    fn paragraph(
        &self,
        text: &str,
        at: Vec2,
        rotation: Angle,
        style: &TextStyle,
    ) -> ShapedParagraph;
}

/// Glyph-cell approximation of a stroke font.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxShaper;

/// Horizontal advance per glyph, as a fraction of the glyph height.
const CHAR_ADVANCE_RATIO: f64 = 0.8;
/// Baseline-to-baseline distance, as a fraction of the glyph height.
const INTERLINE_RATIO: f64 = 1.61;

impl TextShaper for BoxShaper {
    fn paragraph(
        &self,
        text: &str,
        at: Vec2,
        rotation: Angle,
        style: &TextStyle,
    ) -> ShapedParagraph {
        let lines: Vec<&str> = text.split('\n').collect();
        let line_count = lines.len().max(1);
        let advance = style.size * CHAR_ADVANCE_RATIO;
        let interline = style.size * INTERLINE_RATIO;
        let block_height = style.size + (line_count - 1) as f64 * interline;

        let block_top = match style.valign {
            VAlign::Top => 0.0,
            VAlign::Center => -block_height / 2.0,
            VAlign::Bottom => -block_height,
        };

        let mut transform = Matrix3::at(at, rotation);
        if style.mirrored {
            transform = transform * Matrix3::mirror_x();
        }

        let mut strokes = Vec::with_capacity(line_count);
        let mut corners = Vec::with_capacity(line_count * 4);
        for (i, line) in lines.iter().enumerate() {
            let line_width = line.chars().count() as f64 * advance;
            let x0 = match style.halign {
                HAlign::Left => 0.0,
                HAlign::Center => -line_width / 2.0,
                HAlign::Right => -line_width,
            };
            let y0 = block_top + i as f64 * interline;
            let cell = [
                Vec2::new(x0, y0),
                Vec2::new(x0 + line_width, y0),
                Vec2::new(x0 + line_width, y0 + style.size),
                Vec2::new(x0, y0 + style.size),
                Vec2::new(x0, y0),
            ];
            let placed: Vec<Vec2> = cell.iter().map(|&p| transform.transform(p)).collect();
            corners.extend(placed.iter().copied());
            if !line.is_empty() {
                strokes.push(placed);
            }
        }

        ShapedParagraph::new(BBox::from_points(corners), strokes)
    }
}

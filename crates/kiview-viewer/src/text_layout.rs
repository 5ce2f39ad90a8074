//! Placement rules for labels, pin text and fields.
//!
//! Rotations are quantized to the four cardinal orientations and every
//! placement decision goes through one shared offset table: at 0 and 180
//! degrees the base offset is applied vertically, at 90 and 270 it is
//! applied horizontally. Label outline shapes are generated as closed
//! point lists in local unrotated space; rotation and translation onto
//! the anchor happen as the final step.

use kiview_core::math::{Angle, Vec2};
use kiview_core::text::{HAlign, VAlign};
use kiview_document::LabelShape;

/// Outline margin around label text, as a fraction of the text height.
pub const LABEL_MARGIN_RATIO: f64 = 0.375;

/// Maps a base `(horz, vert)` offset pair into document space for a
/// cardinal orientation. The same table serves net labels, global and
/// hierarchical labels, and pin name/number placement; callers differ
/// only in the base offsets they feed in.
pub fn orient_offset(rotation: Angle, horz: f64, vert: f64) -> Vec2 {
    match rotation.quantized_quadrant() {
        0 => Vec2::new(horz, vert),
        90 => Vec2::new(vert, -horz),
        180 => Vec2::new(-horz, -vert),
        270 => Vec2::new(-vert, horz),
        _ => unreachable!("quantized_quadrant returns a cardinal angle"),
    }
}

/// Effective drawing rotation and alignment for text at a cardinal
/// orientation. Text is never drawn upside down: 180 and 270 reduce to 0
/// and 90 with flipped alignment.
pub fn orient_alignment(
    rotation: Angle,
    halign: HAlign,
    valign: VAlign,
) -> (Angle, HAlign, VAlign) {
    match rotation.quantized_quadrant() {
        0 => (Angle::ZERO, halign, valign),
        90 => (Angle::from_degrees(90.0), halign, valign),
        180 => (Angle::ZERO, halign.flipped(), valign.flipped()),
        270 => (Angle::from_degrees(90.0), halign.flipped(), valign.flipped()),
        _ => unreachable!("quantized_quadrant returns a cardinal angle"),
    }
}

fn points_toward_anchor(shape: LabelShape) -> bool {
    matches!(
        shape,
        LabelShape::Input | LabelShape::Bidirectional | LabelShape::TriState
    )
}

fn points_away_from_anchor(shape: LabelShape) -> bool {
    matches!(
        shape,
        LabelShape::Output | LabelShape::Bidirectional | LabelShape::TriState
    )
}

/// Base text offset inside a global label outline, before orientation.
///
/// `horz` moves the text away from the anchor along the label axis; when
/// the outline has a point on the anchor side the text clears it by half
/// the text height. `vert` nudges the baseline an eighth of the text
/// height toward the outline center.
pub fn global_label_text_offset(text_height: f64, margin: f64, shape: LabelShape) -> (f64, f64) {
    let horz = if points_toward_anchor(shape) {
        margin + text_height / 2.0
    } else {
        margin
    };
    let vert = -text_height / 8.0;
    (horz, vert)
}

/// Global label outline in local space: the anchor is the origin and the
/// body extends along +x. Pointed ends are 45-degree chamfers of the
/// outline half-height. Returns a closed point list (first point is not
/// repeated).
pub fn global_label_outline(shape: LabelShape, text_width: f64, text_height: f64) -> Vec<Vec2> {
    let margin = text_height * LABEL_MARGIN_RATIO;
    let half = text_height / 2.0 + margin;
    let near = points_toward_anchor(shape);
    let far = points_away_from_anchor(shape);
    let len = text_width
        + 2.0 * margin
        + if near { half } else { 0.0 }
        + if far { half } else { 0.0 };
    let x0 = if near { half } else { 0.0 };
    let x1 = len - if far { half } else { 0.0 };

    let mut points = Vec::with_capacity(6);
    if near {
        points.push(Vec2::ZERO);
    }
    points.push(Vec2::new(x0, -half));
    points.push(Vec2::new(x1, -half));
    if far {
        points.push(Vec2::new(len, 0.0));
    }
    points.push(Vec2::new(x1, half));
    points.push(Vec2::new(x0, half));
    points
}

/// Hierarchical label connection glyph in local space, one square of side
/// `size` anchored at the origin on its connection edge.
pub fn hierarchical_label_outline(shape: LabelShape, size: f64) -> Vec<Vec2> {
    let h = size / 2.0;
    match shape {
        LabelShape::Input => vec![
            Vec2::ZERO,
            Vec2::new(h, -h),
            Vec2::new(size, -h),
            Vec2::new(size, h),
            Vec2::new(h, h),
        ],
        LabelShape::Output => vec![
            Vec2::new(0.0, -h),
            Vec2::new(h, -h),
            Vec2::new(size, 0.0),
            Vec2::new(h, h),
            Vec2::new(0.0, h),
        ],
        LabelShape::Bidirectional | LabelShape::TriState => vec![
            Vec2::ZERO,
            Vec2::new(h, -h),
            Vec2::new(size, 0.0),
            Vec2::new(h, h),
        ],
        LabelShape::Passive => vec![
            Vec2::new(0.0, -h),
            Vec2::new(size, -h),
            Vec2::new(size, h),
            Vec2::new(0.0, h),
        ],
    }
}

/// Final placement step: scales local points to document units, rotates
/// them onto the label's orientation and translates onto the anchor.
pub fn place_points(points: &[Vec2], rotation: Angle, anchor: Vec2, scale: f64) -> Vec<Vec2> {
    let quantized = Angle::from_degrees(f64::from(rotation.quantized_quadrant()));
    points
        .iter()
        .map(|p| anchor + (*p * scale).rotate(quantized))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a.x - b.x).abs() < 1e-6, "{a:?} != {b:?}");
        assert!((a.y - b.y).abs() < 1e-6, "{a:?} != {b:?}");
    }

    #[test]
    fn test_orient_offset_quadrants() {
        assert_close(orient_offset(Angle::ZERO, 2.0, 1.0), Vec2::new(2.0, 1.0));
        assert_close(
            orient_offset(Angle::from_degrees(90.0), 2.0, 1.0),
            Vec2::new(1.0, -2.0),
        );
        assert_close(
            orient_offset(Angle::from_degrees(180.0), 2.0, 1.0),
            Vec2::new(-2.0, -1.0),
        );
        assert_close(
            orient_offset(Angle::from_degrees(270.0), 2.0, 1.0),
            Vec2::new(-1.0, 2.0),
        );
    }

    #[test]
    fn test_global_label_offset_input_at_90() {
        // text_height 1.27 with margin 0.476: the pointed input outline
        // pushes the text out by margin + height/2 and drops the baseline
        // by height/8; at 90 degrees that pair lands as (vert, -horz).
        let (horz, vert) = global_label_text_offset(1.27, 0.476, LabelShape::Input);
        assert!((horz - 1.111).abs() < 1e-6);
        assert!((vert - (-0.158_75)).abs() < 1e-6);
        let offset = orient_offset(Angle::from_degrees(90.0), horz, vert);
        assert_close(offset, Vec2::new(-0.158_75, -1.111));
    }

    #[test]
    fn test_plain_shape_offset_is_margin_only() {
        let (horz, _) = global_label_text_offset(1.27, 0.476, LabelShape::Passive);
        assert!((horz - 0.476).abs() < 1e-6);
        let (horz, _) = global_label_text_offset(1.27, 0.476, LabelShape::Output);
        assert!((horz - 0.476).abs() < 1e-6);
    }

    #[test]
    fn test_alignment_flips_at_180() {
        let (rot, h, v) = orient_alignment(Angle::from_degrees(180.0), HAlign::Left, VAlign::Top);
        assert_eq!(rot, Angle::ZERO);
        assert_eq!(h, HAlign::Right);
        assert_eq!(v, VAlign::Bottom);
        let (rot, h, _) = orient_alignment(Angle::from_degrees(90.0), HAlign::Left, VAlign::Top);
        assert_eq!(rot, Angle::from_degrees(90.0));
        assert_eq!(h, HAlign::Left);
    }

    #[test]
    fn test_input_outline_points_at_anchor() {
        let outline = global_label_outline(LabelShape::Input, 5.0, 1.27);
        assert_eq!(outline[0], Vec2::ZERO);
        assert_eq!(outline.len(), 5);
        // The body must clear the text plus margins on both sides.
        let max_x = outline.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        assert!(max_x > 5.0 + 2.0 * 1.27 * LABEL_MARGIN_RATIO);
    }

    #[test]
    fn test_bidirectional_outline_points_both_ways() {
        let outline = global_label_outline(LabelShape::Bidirectional, 5.0, 1.27);
        assert_eq!(outline.len(), 6);
        assert_eq!(outline[0], Vec2::ZERO);
        let len = outline.iter().map(|p| p.x).fold(f64::MIN, f64::max);
        assert!(outline.contains(&Vec2::new(len, 0.0)));
    }

    #[test]
    fn test_place_points_scale_then_rotate_then_translate() {
        let local = [Vec2::new(1.0, 0.0)];
        let placed = place_points(&local, Angle::from_degrees(90.0), Vec2::new(10.0, 10.0), 2.0);
        // y grows downward, so +x rotated 90 degrees lands on +y.
        assert_close(placed[0], Vec2::new(10.0, 12.0));
    }
}

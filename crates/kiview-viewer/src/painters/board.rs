//! Board item painters.
//!
//! One flat dispatch table for every `BoardItem` variant. Leaf painters
//! draw in the already-established local frame; only the footprint case
//! descends, and the framework owns that transform scope.

use smallvec::smallvec;
use uuid::Uuid;

use kiview_core::error::{PaintError, Result};
use kiview_core::math::{Angle, Arc, Matrix3, Vec2};
use kiview_core::shapes::{ArcShape, Circle, Polygon, Polyline};
use kiview_document::{
    BoardDocument, BoardItem, BoardText, Dimension, Footprint, Graphic, GraphicKind, Pad,
    PadShape, Side, TrackArc, TrackSegment, Via, ViaKind, Zone,
};
use kiview_render::{Renderer, TextShaper};

use crate::board_layers::{
    bb_via_hole_walls_layer, bb_via_holes_layer, zones_layer, ANCHORS, PAD_HOLES, PAD_HOLE_WALLS,
    VIA_HOLES, VIA_MICRO, VIA_THROUGH,
};
use crate::painters::{LayerHandle, LayerNames, PainterTable};

/// Ring thickness drawn around pad drill holes, as a fraction of the
/// drill diameter.
const PAD_HOLE_WALL_RATIO: f64 = 0.25;
/// Arm length of the footprint anchor cross, in millimeters.
const ANCHOR_ARM: f64 = 0.4;

/// Painter dispatch for board documents. Carries the copper stack so via
/// fan-out can resolve blind/buried spans; `layers_for` stays a pure
/// function of the item given a fixed stack.
pub struct BoardTable {
    copper_stack: Vec<String>,
}

impl BoardTable {
    pub fn new(board: &BoardDocument) -> Self {
        Self {
            copper_stack: board.copper_layers().to_vec(),
        }
    }

    fn copper_index(&self, name: &str) -> Option<usize> {
        self.copper_stack.iter().position(|l| l == name)
    }

    fn via_layers(&self, via: &Via) -> LayerNames {
        match (via.kind, &via.layers) {
            (ViaKind::Through, _) | (_, None) => {
                smallvec![VIA_HOLES.to_string(), VIA_THROUGH.to_string()]
            }
            (ViaKind::Micro, _) => smallvec![VIA_HOLES.to_string(), VIA_MICRO.to_string()],
            (ViaKind::BlindBuried, Some((a, b))) => {
                let (Some(ia), Some(ib)) = (self.copper_index(a), self.copper_index(b)) else {
                    // Span names not in the stack; degrade to through.
                    return smallvec![VIA_HOLES.to_string(), VIA_THROUGH.to_string()];
                };
                let (lo, hi) = if ia <= ib { (ia, ib) } else { (ib, ia) };
                let mut names = LayerNames::new();
                for copper in &self.copper_stack[lo..=hi] {
                    names.push(bb_via_holes_layer(copper));
                    names.push(bb_via_hole_walls_layer(copper));
                }
                names
            }
        }
    }

    fn pad_layers(&self, pad: &Pad) -> LayerNames {
        let mut names = LayerNames::new();
        for layer in &pad.layers {
            if layer == "*.Cu" {
                for copper in &self.copper_stack {
                    names.push(copper.clone());
                }
            } else {
                names.push(layer.clone());
            }
        }
        if pad.drill.is_some() {
            names.push(PAD_HOLE_WALLS.to_string());
            names.push(PAD_HOLES.to_string());
        }
        names
    }
}

fn paint_segment(gfx: &mut dyn Renderer, layer: &LayerHandle<'_>, seg: &TrackSegment) -> Result<()> {
    gfx.line(&Polyline::new(
        vec![seg.start, seg.end],
        seg.width,
        layer.color,
    ))
}

fn paint_track_arc(gfx: &mut dyn Renderer, layer: &LayerHandle<'_>, arc: &TrackArc) -> Result<()> {
    let geom = Arc::from_three_points(arc.start, arc.mid, arc.end, arc.width).ok_or(
        PaintError::Unsupported {
            what: "track arc",
            value: "collinear control points".to_string(),
        },
    )?;
    gfx.arc(&ArcShape::new(geom, layer.color))
}

fn paint_via(gfx: &mut dyn Renderer, layer: &LayerHandle<'_>, via: &Via) -> Result<()> {
    let is_hole = layer.name == VIA_HOLES || layer.name.starts_with(":BBViaHoles:");
    let radius = if is_hole { via.drill / 2.0 } else { via.size / 2.0 };
    gfx.circle(&Circle::filled(via.at, radius, layer.color))
}

fn paint_zone(gfx: &mut dyn Renderer, layer: &LayerHandle<'_>, zone: &Zone) -> Result<()> {
    for (copper, points) in &zone.filled_polygons {
        if zones_layer(copper) != layer.name || points.len() < 3 {
            continue;
        }
        gfx.polygon(&Polygon::new(points.clone(), layer.color))?;
    }
    Ok(())
}

/// Closed outline of a rectangular-ish pad in the pad's local frame.
fn pad_outline(pad: &Pad) -> Result<Vec<Vec2>> {
    let hw = pad.size.x / 2.0;
    let hh = pad.size.y / 2.0;
    let points = match &pad.shape {
        PadShape::Rect => vec![
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ],
        PadShape::Trapezoid { delta } => {
            let (dx, dy) = (delta.0 / 2.0, delta.1 / 2.0);
            vec![
                Vec2::new(-hw - dx, -hh + dy),
                Vec2::new(hw + dx, -hh - dy),
                Vec2::new(hw - dx, hh + dy),
                Vec2::new(-hw + dx, hh - dy),
            ]
        }
        PadShape::RoundRect { ratio } => {
            let r = (hw.min(hh) * 2.0 * ratio).min(hw).min(hh);
            rounded_rect(hw, hh, r)
        }
        other => {
            return Err(PaintError::Unsupported {
                what: "pad shape",
                value: format!("{other:?}"),
            }
            .into())
        }
    };
    Ok(points)
}

/// Rounded-rectangle outline with tessellated quarter-circle corners.
fn rounded_rect(hw: f64, hh: f64, r: f64) -> Vec<Vec2> {
    const CORNER_SEGMENTS: usize = 6;
    let corners = [
        (Vec2::new(hw - r, hh - r), 0.0),
        (Vec2::new(-hw + r, hh - r), 90.0),
        (Vec2::new(-hw + r, -hh + r), 180.0),
        (Vec2::new(hw - r, -hh + r), 270.0),
    ];
    let mut points = Vec::with_capacity(corners.len() * (CORNER_SEGMENTS + 1));
    for (center, start_deg) in corners {
        for i in 0..=CORNER_SEGMENTS {
            let a = Angle::from_degrees(start_deg + 90.0 * i as f64 / CORNER_SEGMENTS as f64);
            points.push(center + Vec2::new(a.cos(), a.sin()) * r);
        }
    }
    points
}

fn paint_pad(gfx: &mut dyn Renderer, layer: &LayerHandle<'_>, pad: &Pad) -> Result<()> {
    if layer.name == PAD_HOLES || layer.name == PAD_HOLE_WALLS {
        let Some(drill) = pad.drill else {
            return Ok(());
        };
        let radius = if layer.name == PAD_HOLES {
            drill / 2.0
        } else {
            drill / 2.0 * (1.0 + PAD_HOLE_WALL_RATIO)
        };
        return gfx.circle(&Circle::filled(pad.at, radius, layer.color));
    }

    let local = Matrix3::at(pad.at, pad.rotation);
    match &pad.shape {
        PadShape::Circle => gfx.circle(&Circle::filled(pad.at, pad.size.x / 2.0, layer.color)),
        PadShape::Oval => {
            // A stadium: a thick round-capped stroke along the long axis.
            let (len, width) = if pad.size.x >= pad.size.y {
                (pad.size.x - pad.size.y, pad.size.y)
            } else {
                (pad.size.y - pad.size.x, pad.size.x)
            };
            let half = len / 2.0;
            let axis = if pad.size.x >= pad.size.y {
                Vec2::new(half, 0.0)
            } else {
                Vec2::new(0.0, half)
            };
            gfx.line(&Polyline::new(
                vec![local.transform(-axis), local.transform(axis)],
                width,
                layer.color,
            ))
        }
        _ => {
            let points = pad_outline(pad)?
                .into_iter()
                .map(|p| local.transform(p))
                .collect();
            gfx.polygon(&Polygon::new(points, layer.color))
        }
    }
}

fn paint_graphic(gfx: &mut dyn Renderer, layer: &LayerHandle<'_>, g: &Graphic) -> Result<()> {
    match &g.kind {
        GraphicKind::Line { start, end } => {
            gfx.line(&Polyline::new(vec![*start, *end], g.width, layer.color))
        }
        GraphicKind::Rect { start, end, fill } => {
            let corners = vec![
                *start,
                Vec2::new(end.x, start.y),
                *end,
                Vec2::new(start.x, end.y),
            ];
            if *fill {
                gfx.polygon(&Polygon::new(corners, layer.color))
            } else {
                let mut closed = corners;
                closed.push(closed[0]);
                gfx.line(&Polyline::new(closed, g.width, layer.color))
            }
        }
        GraphicKind::Circle { center, radius, fill } => {
            let circle = if *fill {
                Circle::filled(*center, *radius, layer.color)
            } else {
                Circle::outline(*center, *radius, g.width, layer.color)
            };
            gfx.circle(&circle)
        }
        GraphicKind::Arc { start, mid, end } => {
            let geom = Arc::from_three_points(*start, *mid, *end, g.width).ok_or(
                PaintError::Unsupported {
                    what: "graphic arc",
                    value: "collinear control points".to_string(),
                },
            )?;
            gfx.arc(&ArcShape::new(geom, layer.color))
        }
        GraphicKind::Poly { points, fill } => {
            if points.len() < 2 {
                return Ok(());
            }
            if *fill {
                gfx.polygon(&Polygon::new(points.clone(), layer.color))
            } else {
                let mut closed = points.clone();
                closed.push(closed[0]);
                gfx.line(&Polyline::new(closed, g.width, layer.color))
            }
        }
    }
}

fn paint_text(
    gfx: &mut dyn Renderer,
    shaper: &dyn TextShaper,
    layer: &LayerHandle<'_>,
    text: &BoardText,
) -> Result<()> {
    let shaped = shaper.paragraph(&text.text, text.at, text.rotation, &text.style);
    for line in shaped.to_polylines(text.style.thickness, layer.color) {
        gfx.line(&line)?;
    }
    Ok(())
}

fn paint_dimension(
    gfx: &mut dyn Renderer,
    shaper: &dyn TextShaper,
    layer: &LayerHandle<'_>,
    dim: &Dimension,
) -> Result<()> {
    let dir = (dim.end - dim.start).normalized();
    let normal = dir.perpendicular() * dim.height;
    let a = dim.start + normal;
    let b = dim.end + normal;
    let width = 0.15;

    // Extension lines, measurement line, then the value text above it.
    gfx.line(&Polyline::new(vec![dim.start, a], width, layer.color))?;
    gfx.line(&Polyline::new(vec![dim.end, b], width, layer.color))?;
    gfx.line(&Polyline::new(vec![a, b], width, layer.color))?;

    let mid = (a + b) * 0.5 - dir.perpendicular() * 0.6;
    let rotation = dir.angle();
    let style = kiview_core::text::TextStyle::default();
    let shaped = shaper.paragraph(&dim.text, mid, rotation, &style);
    for line in shaped.to_polylines(style.thickness, layer.color) {
        gfx.line(&line)?;
    }
    Ok(())
}

fn paint_footprint_anchor(
    gfx: &mut dyn Renderer,
    layer: &LayerHandle<'_>,
    fp: &Footprint,
) -> Result<()> {
    let arm = Vec2::new(ANCHOR_ARM, 0.0);
    let arm_v = Vec2::new(0.0, ANCHOR_ARM);
    gfx.line(&Polyline::new(
        vec![fp.at - arm, fp.at + arm],
        0.1,
        layer.color,
    ))?;
    gfx.line(&Polyline::new(
        vec![fp.at - arm_v, fp.at + arm_v],
        0.1,
        layer.color,
    ))
}

impl PainterTable for BoardTable {
    type Item = BoardItem;

    fn layers_for(&self, item: &BoardItem) -> LayerNames {
        match item {
            BoardItem::Segment(x) => smallvec![x.layer.clone()],
            BoardItem::Arc(x) => smallvec![x.layer.clone()],
            BoardItem::Via(x) => self.via_layers(x),
            BoardItem::Zone(x) => x.layers().iter().map(|l| zones_layer(l)).collect(),
            BoardItem::Pad(x) => self.pad_layers(x),
            BoardItem::Graphic(x) => smallvec![x.layer.clone()],
            BoardItem::Text(x) => smallvec![x.layer.clone()],
            BoardItem::Dimension(x) => {
                if x.hidden {
                    LayerNames::new()
                } else {
                    smallvec![x.layer.clone()]
                }
            }
            BoardItem::Footprint(fp) => {
                let mut names = LayerNames::new();
                for child in &fp.children {
                    for name in self.layers_for(child) {
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                }
                names.push(ANCHORS.to_string());
                names
            }
        }
    }

    fn paint(
        &self,
        gfx: &mut dyn Renderer,
        shaper: &dyn TextShaper,
        layer: &LayerHandle<'_>,
        item: &BoardItem,
    ) -> Result<()> {
        match item {
            BoardItem::Segment(x) => paint_segment(gfx, layer, x),
            BoardItem::Arc(x) => paint_track_arc(gfx, layer, x),
            BoardItem::Via(x) => paint_via(gfx, layer, x),
            BoardItem::Zone(x) => paint_zone(gfx, layer, x),
            BoardItem::Pad(x) => paint_pad(gfx, layer, x),
            BoardItem::Graphic(x) => paint_graphic(gfx, layer, x),
            BoardItem::Text(x) => paint_text(gfx, shaper, layer, x),
            BoardItem::Dimension(x) => paint_dimension(gfx, shaper, layer, x),
            BoardItem::Footprint(fp) => {
                if layer.name == ANCHORS {
                    paint_footprint_anchor(gfx, layer, fp)
                } else {
                    // Children were painted by the framework's recursion.
                    Ok(())
                }
            }
        }
    }

    fn children<'a>(&self, item: &'a BoardItem) -> Option<(Matrix3, &'a [BoardItem])> {
        match item {
            BoardItem::Footprint(fp) => {
                let mut local = Matrix3::at(fp.at, fp.rotation);
                // Back-side footprints are flipped left to right.
                if fp.side == Side::Back {
                    local = local * Matrix3::mirror_x();
                }
                Some((local, &fp.children))
            }
            _ => None,
        }
    }

    fn uuid(&self, item: &BoardItem) -> Uuid {
        item.uuid()
    }

    fn variant_name(&self, item: &BoardItem) -> &'static str {
        item.variant_name()
    }

    fn net<'a>(&self, item: &'a BoardItem) -> Option<&'a str> {
        item.net()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiview_core::text::TextStyle;

    fn table_for(coppers: &[&str]) -> BoardTable {
        BoardTable {
            copper_stack: coppers.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn via(kind: ViaKind, layers: Option<(&str, &str)>) -> BoardItem {
        BoardItem::Via(Via {
            uuid: Uuid::new_v4(),
            at: Vec2::ZERO,
            size: 0.8,
            drill: 0.4,
            kind,
            layers: layers.map(|(a, b)| (a.to_string(), b.to_string())),
            net: None,
        })
    }

    #[test]
    fn test_through_via_fan_out() {
        let table = table_for(&["F.Cu", "B.Cu"]);
        let names = table.layers_for(&via(ViaKind::Through, None));
        assert_eq!(names.as_slice(), [VIA_HOLES, VIA_THROUGH]);
    }

    #[test]
    fn test_micro_via_fan_out() {
        let table = table_for(&["F.Cu", "B.Cu"]);
        let names = table.layers_for(&via(ViaKind::Micro, Some(("F.Cu", "In1.Cu"))));
        assert_eq!(names.as_slice(), [VIA_HOLES, VIA_MICRO]);
    }

    #[test]
    fn test_blind_via_fan_out_inclusive_span() {
        let table = table_for(&["F.Cu", "In1.Cu", "In2.Cu", "In3.Cu", "In4.Cu", "B.Cu"]);
        // Copper indices 1..=4 of the six-layer stack.
        let names = table.layers_for(&via(ViaKind::BlindBuried, Some(("In1.Cu", "In4.Cu"))));
        let expected: Vec<String> = ["In1.Cu", "In2.Cu", "In3.Cu", "In4.Cu"]
            .iter()
            .flat_map(|c| [bb_via_holes_layer(c), bb_via_hole_walls_layer(c)])
            .collect();
        assert_eq!(names.to_vec(), expected);
    }

    #[test]
    fn test_blind_via_span_order_insensitive() {
        let table = table_for(&["F.Cu", "In1.Cu", "In2.Cu", "B.Cu"]);
        let forward = table.layers_for(&via(ViaKind::BlindBuried, Some(("In1.Cu", "In2.Cu"))));
        let reverse = table.layers_for(&via(ViaKind::BlindBuried, Some(("In2.Cu", "In1.Cu"))));
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_pad_wildcard_copper_expansion() {
        let table = table_for(&["F.Cu", "In1.Cu", "B.Cu"]);
        let pad = BoardItem::Pad(Pad {
            uuid: Uuid::new_v4(),
            number: "1".into(),
            at: Vec2::ZERO,
            size: Vec2::new(1.6, 1.6),
            rotation: Angle::ZERO,
            shape: PadShape::Circle,
            drill: Some(0.8),
            layers: vec!["*.Cu".into(), "F.Mask".into()],
            net: None,
        });
        let names = table.layers_for(&pad);
        assert_eq!(
            names.as_slice(),
            ["F.Cu", "In1.Cu", "B.Cu", "F.Mask", PAD_HOLE_WALLS, PAD_HOLES]
        );
    }

    #[test]
    fn test_hidden_dimension_suppressed() {
        let table = table_for(&["F.Cu", "B.Cu"]);
        let dim = BoardItem::Dimension(Dimension {
            uuid: Uuid::new_v4(),
            start: Vec2::ZERO,
            end: Vec2::new(10.0, 0.0),
            layer: "Dwgs.User".into(),
            text: "10 mm".into(),
            height: 2.0,
            hidden: true,
        });
        assert!(table.layers_for(&dim).is_empty());
    }

    #[test]
    fn test_layers_for_idempotent() {
        let table = table_for(&["F.Cu", "In1.Cu", "In2.Cu", "B.Cu"]);
        let item = via(ViaKind::BlindBuried, Some(("F.Cu", "In2.Cu")));
        assert_eq!(table.layers_for(&item), table.layers_for(&item));
    }

    #[test]
    fn test_unknown_pad_shape_is_unsupported() {
        let pad = Pad {
            uuid: Uuid::new_v4(),
            number: "1".into(),
            at: Vec2::ZERO,
            size: Vec2::new(1.0, 1.0),
            rotation: Angle::ZERO,
            shape: PadShape::Unknown("chamfrect".into()),
            drill: None,
            layers: vec!["F.Cu".into()],
            net: None,
        };
        assert!(pad_outline(&pad).is_err());
    }

    #[test]
    fn test_rounded_rect_stays_inside_pad() {
        let points = rounded_rect(1.0, 0.5, 0.25);
        for p in &points {
            assert!(p.x.abs() <= 1.0 + 1e-9);
            assert!(p.y.abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn test_footprint_fans_out_to_children_layers() {
        let table = table_for(&["F.Cu", "B.Cu"]);
        let fp = BoardItem::Footprint(Footprint {
            uuid: Uuid::new_v4(),
            reference: "R1".into(),
            at: Vec2::ZERO,
            rotation: Angle::ZERO,
            side: Side::Front,
            children: vec![
                BoardItem::Text(BoardText {
                    uuid: Uuid::new_v4(),
                    text: "R1".into(),
                    at: Vec2::ZERO,
                    rotation: Angle::ZERO,
                    layer: "F.SilkS".into(),
                    style: TextStyle::default(),
                }),
                via(ViaKind::Through, None),
            ],
        });
        let names = table.layers_for(&fp);
        assert_eq!(
            names.as_slice(),
            ["F.SilkS", VIA_HOLES, VIA_THROUGH, ANCHORS]
        );
    }
}

//! Schematic item painters.

use smallvec::smallvec;
use uuid::Uuid;

use kiview_core::error::{PaintError, Result};
use kiview_core::math::{Angle, Arc, Matrix3, Vec2};
use kiview_core::shapes::{ArcShape, Circle, Polygon, Polyline};
use kiview_core::text::TextStyle;
use kiview_document::{
    BodyGraphic, GraphicKind, Junction, Label, LabelKind, Mirror, NoConnect, Pin, Property,
    SchematicItem, SymbolInstance, Wire, WireKind,
};
use kiview_render::{Renderer, TextShaper};

use crate::painters::{LayerHandle, LayerNames, PainterTable};
use crate::schematic_layers::{
    INTERCONNECT, JUNCTION, LABEL, LABEL_GLOBAL, LABEL_HIERARCHICAL, MARKS, NOTES,
    SYMBOL_BACKGROUND, SYMBOL_FIELD, SYMBOL_FOREGROUND, SYMBOL_PIN,
};
use crate::text_layout::{
    global_label_outline, global_label_text_offset, hierarchical_label_outline, orient_alignment,
    orient_offset, place_points, LABEL_MARGIN_RATIO,
};

/// Default wire stroke, 6 mil in millimeters.
const WIRE_WIDTH: f64 = 0.1524;
/// Default bus stroke, twice the wire width.
const BUS_WIDTH: f64 = 0.3048;
/// Half-size of the no-connect cross.
const NO_CONNECT_HALF: f64 = 0.635;
/// Clearance between a pin's end and its name text.
const PIN_NAME_OFFSET: f64 = 0.508;

/// Painter dispatch for schematic documents. Stateless; every layer
/// decision is a pure function of the item.
#[derive(Debug, Default)]
pub struct SchematicTable;

fn label_layer(label: &Label) -> &'static str {
    match label.kind {
        LabelKind::Local => LABEL,
        LabelKind::Global => LABEL_GLOBAL,
        LabelKind::Hierarchical => LABEL_HIERARCHICAL,
    }
}

fn paint_wire(gfx: &mut dyn Renderer, layer: &LayerHandle<'_>, wire: &Wire) -> Result<()> {
    let width = match wire.kind {
        WireKind::Wire => WIRE_WIDTH,
        WireKind::Bus => BUS_WIDTH,
    };
    gfx.line(&Polyline::new(vec![wire.start, wire.end], width, layer.color))
}

fn paint_junction(gfx: &mut dyn Renderer, layer: &LayerHandle<'_>, j: &Junction) -> Result<()> {
    gfx.circle(&Circle::filled(j.at, j.diameter / 2.0, layer.color))
}

fn paint_no_connect(gfx: &mut dyn Renderer, layer: &LayerHandle<'_>, nc: &NoConnect) -> Result<()> {
    let d = Vec2::new(NO_CONNECT_HALF, NO_CONNECT_HALF);
    let d2 = Vec2::new(NO_CONNECT_HALF, -NO_CONNECT_HALF);
    gfx.line(&Polyline::new(
        vec![nc.at - d, nc.at + d],
        WIRE_WIDTH,
        layer.color,
    ))?;
    gfx.line(&Polyline::new(
        vec![nc.at - d2, nc.at + d2],
        WIRE_WIDTH,
        layer.color,
    ))
}

fn shape_text(
    gfx: &mut dyn Renderer,
    shaper: &dyn TextShaper,
    layer: &LayerHandle<'_>,
    text: &str,
    at: Vec2,
    rotation: Angle,
    style: &TextStyle,
) -> Result<()> {
    let (rotation, halign, valign) = orient_alignment(rotation, style.halign, style.valign);
    let style = TextStyle {
        halign,
        valign,
        ..*style
    };
    let shaped = shaper.paragraph(text, at, rotation, &style);
    for line in shaped.to_polylines(style.thickness, layer.color) {
        gfx.line(&line)?;
    }
    Ok(())
}

/// Width of `text` as the shaper will lay it out, measured unrotated.
fn text_width(shaper: &dyn TextShaper, text: &str, style: &TextStyle) -> f64 {
    shaper
        .paragraph(text, Vec2::ZERO, Angle::ZERO, style)
        .bbox
        .w
}

fn paint_label(
    gfx: &mut dyn Renderer,
    shaper: &dyn TextShaper,
    layer: &LayerHandle<'_>,
    label: &Label,
) -> Result<()> {
    let height = label.style.size;
    let margin = height * LABEL_MARGIN_RATIO;
    match label.kind {
        LabelKind::Local => {
            // Text rides just above the wire it names.
            let vert = -(height / 8.0 + label.style.thickness);
            let offset = orient_offset(label.rotation, 0.0, vert);
            shape_text(
                gfx,
                shaper,
                layer,
                &label.text,
                label.at + offset,
                label.rotation,
                &label.style,
            )
        }
        LabelKind::Global => {
            let width = text_width(shaper, &label.text, &label.style);
            let outline = global_label_outline(label.shape, width, height);
            let mut placed = place_points(&outline, label.rotation, label.at, 1.0);
            placed.push(placed[0]);
            gfx.line(&Polyline::new(placed, label.style.thickness, layer.color))?;

            let (horz, vert) = global_label_text_offset(height, margin, label.shape);
            let offset = orient_offset(label.rotation, horz, vert);
            shape_text(
                gfx,
                shaper,
                layer,
                &label.text,
                label.at + offset,
                label.rotation,
                &label.style,
            )
        }
        LabelKind::Hierarchical => {
            let glyph = hierarchical_label_outline(label.shape, height);
            let mut placed = place_points(&glyph, label.rotation, label.at, 1.0);
            placed.push(placed[0]);
            gfx.line(&Polyline::new(placed, label.style.thickness, layer.color))?;

            let offset = orient_offset(label.rotation, height + margin, -height / 8.0);
            shape_text(
                gfx,
                shaper,
                layer,
                &label.text,
                label.at + offset,
                label.rotation,
                &label.style,
            )
        }
    }
}

fn paint_pin(
    gfx: &mut dyn Renderer,
    shaper: &dyn TextShaper,
    layer: &LayerHandle<'_>,
    pin: &Pin,
) -> Result<()> {
    let dir = Vec2::new(pin.rotation.cos(), pin.rotation.sin());
    let end = pin.at + dir * pin.length;
    gfx.line(&Polyline::new(vec![pin.at, end], WIRE_WIDTH, layer.color))?;

    let style = TextStyle::default();
    if !pin.hide_name && !pin.name.is_empty() && pin.name != "~" {
        let offset = orient_offset(pin.rotation, pin.length + PIN_NAME_OFFSET, 0.0);
        shape_text(
            gfx,
            shaper,
            layer,
            &pin.name,
            pin.at + offset,
            pin.rotation,
            &style,
        )?;
    }
    if !pin.hide_number && !pin.number.is_empty() {
        let offset = orient_offset(pin.rotation, pin.length / 2.0, -style.size / 2.0);
        shape_text(
            gfx,
            shaper,
            layer,
            &pin.number,
            pin.at + offset,
            pin.rotation,
            &style,
        )?;
    }
    Ok(())
}

fn paint_property(
    gfx: &mut dyn Renderer,
    shaper: &dyn TextShaper,
    layer: &LayerHandle<'_>,
    prop: &Property,
) -> Result<()> {
    shape_text(
        gfx,
        shaper,
        layer,
        &prop.value,
        prop.at,
        prop.rotation,
        &prop.style,
    )
}

fn paint_body_graphic(
    gfx: &mut dyn Renderer,
    layer: &LayerHandle<'_>,
    g: &BodyGraphic,
) -> Result<()> {
    // Background fill and foreground stroke are separate layers so fills
    // of overlapping symbols never cover a neighbor's outline.
    let fill_pass = layer.name == SYMBOL_BACKGROUND;
    match &g.kind {
        GraphicKind::Line { start, end } => {
            if fill_pass {
                return Ok(());
            }
            gfx.line(&Polyline::new(vec![*start, *end], g.width, layer.color))
        }
        GraphicKind::Rect { start, end, .. } => {
            let corners = vec![
                *start,
                Vec2::new(end.x, start.y),
                *end,
                Vec2::new(start.x, end.y),
            ];
            if fill_pass {
                gfx.polygon(&Polygon::new(corners, layer.color))
            } else {
                let mut closed = corners;
                closed.push(closed[0]);
                gfx.line(&Polyline::new(closed, g.width, layer.color))
            }
        }
        GraphicKind::Circle { center, radius, .. } => {
            let circle = if fill_pass {
                Circle::filled(*center, *radius, layer.color)
            } else {
                Circle::outline(*center, *radius, g.width, layer.color)
            };
            gfx.circle(&circle)
        }
        GraphicKind::Arc { start, mid, end } => {
            if fill_pass {
                return Ok(());
            }
            let geom = Arc::from_three_points(*start, *mid, *end, g.width).ok_or(
                PaintError::Unsupported {
                    what: "symbol arc",
                    value: "collinear control points".to_string(),
                },
            )?;
            gfx.arc(&ArcShape::new(geom, layer.color))
        }
        GraphicKind::Poly { points, .. } => {
            if points.len() < 2 {
                return Ok(());
            }
            if fill_pass {
                gfx.polygon(&Polygon::new(points.clone(), layer.color))
            } else {
                let mut closed = points.clone();
                closed.push(closed[0]);
                gfx.line(&Polyline::new(closed, g.width, layer.color))
            }
        }
    }
}

fn symbol_transform(sym: &SymbolInstance) -> Matrix3 {
    let mut local = Matrix3::at(sym.at, sym.rotation);
    match sym.mirror {
        // Document mirror names the axis flipped across, so X negates Y.
        Some(Mirror::X) => local = local * Matrix3::mirror_y(),
        Some(Mirror::Y) => local = local * Matrix3::mirror_x(),
        None => {}
    }
    local
}

impl PainterTable for SchematicTable {
    type Item = SchematicItem;

    fn layers_for(&self, item: &SchematicItem) -> LayerNames {
        match item {
            SchematicItem::Wire(_) => smallvec![INTERCONNECT.to_string()],
            SchematicItem::Junction(_) => smallvec![JUNCTION.to_string()],
            SchematicItem::NoConnect(_) => smallvec![MARKS.to_string()],
            SchematicItem::Label(l) => smallvec![label_layer(l).to_string()],
            SchematicItem::Text(_) => smallvec![NOTES.to_string()],
            SchematicItem::Pin(_) => smallvec![SYMBOL_PIN.to_string()],
            SchematicItem::Property(p) => {
                if p.hidden {
                    LayerNames::new()
                } else {
                    smallvec![SYMBOL_FIELD.to_string()]
                }
            }
            SchematicItem::Graphic(g) => {
                if g.fill_background {
                    smallvec![
                        SYMBOL_BACKGROUND.to_string(),
                        SYMBOL_FOREGROUND.to_string()
                    ]
                } else {
                    smallvec![SYMBOL_FOREGROUND.to_string()]
                }
            }
            SchematicItem::Symbol(sym) => {
                let mut names = LayerNames::new();
                for child in &sym.children {
                    for name in self.layers_for(child) {
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                }
                names
            }
        }
    }

    fn paint(
        &self,
        gfx: &mut dyn Renderer,
        shaper: &dyn TextShaper,
        layer: &LayerHandle<'_>,
        item: &SchematicItem,
    ) -> Result<()> {
        match item {
            SchematicItem::Wire(x) => paint_wire(gfx, layer, x),
            SchematicItem::Junction(x) => paint_junction(gfx, layer, x),
            SchematicItem::NoConnect(x) => paint_no_connect(gfx, layer, x),
            SchematicItem::Label(x) => paint_label(gfx, shaper, layer, x),
            SchematicItem::Text(x) => shape_text(
                gfx,
                shaper,
                layer,
                &x.text,
                x.at,
                x.rotation,
                &x.style,
            ),
            SchematicItem::Pin(x) => paint_pin(gfx, shaper, layer, x),
            SchematicItem::Property(x) => paint_property(gfx, shaper, layer, x),
            SchematicItem::Graphic(x) => paint_body_graphic(gfx, layer, x),
            // Children are painted by the framework's recursion.
            SchematicItem::Symbol(_) => Ok(()),
        }
    }

    fn children<'a>(&self, item: &'a SchematicItem) -> Option<(Matrix3, &'a [SchematicItem])> {
        match item {
            SchematicItem::Symbol(sym) => Some((symbol_transform(sym), &sym.children)),
            _ => None,
        }
    }

    fn uuid(&self, item: &SchematicItem) -> Uuid {
        item.uuid()
    }

    fn variant_name(&self, item: &SchematicItem) -> &'static str {
        item.variant_name()
    }

    fn net<'a>(&self, item: &'a SchematicItem) -> Option<&'a str> {
        item.net()
    }
}

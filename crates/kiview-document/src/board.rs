//! Board (`.kicad_pcb`) document model.
//!
//! Coordinates are millimeters with Y growing downward, matching the file
//! format. Rotations are counter-clockwise degrees.

use kiview_core::math::{Angle, Vec2};
use kiview_core::text::TextStyle;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which side of the board a footprint is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Front,
    Back,
}

/// A straight copper track segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    pub uuid: Uuid,
    pub start: Vec2,
    pub end: Vec2,
    pub width: f64,
    pub layer: String,
    pub net: Option<String>,
}

/// A curved copper track stored as start/mid/end points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackArc {
    pub uuid: Uuid,
    pub start: Vec2,
    pub mid: Vec2,
    pub end: Vec2,
    pub width: f64,
    pub layer: String,
    pub net: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViaKind {
    #[default]
    Through,
    BlindBuried,
    Micro,
}

/// A via. `layers` is `None` for a through via (spans the whole stack) or
/// the copper layer pair a blind/buried/micro via connects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub uuid: Uuid,
    pub at: Vec2,
    pub size: f64,
    pub drill: f64,
    pub kind: ViaKind,
    pub layers: Option<(String, String)>,
    pub net: Option<String>,
}

/// A zone with its fills already computed: one filled polygon list per
/// copper layer the zone covers. Fill computation is the file writer's
/// concern, not the viewer's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub filled_polygons: Vec<(String, Vec<Vec2>)>,
    pub net: Option<String>,
}

impl Zone {
    /// The copper layers this zone has fills on, deduplicated in first-seen
    /// order.
    pub fn layers(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for (layer, _) in &self.filled_polygons {
            if !seen.contains(&layer.as_str()) {
                seen.push(layer);
            }
        }
        seen
    }
}

/// Pad geometry variants. Unknown shape strings survive parsing so the
/// painter can warn and skip instead of the parser rejecting the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadShape {
    Circle,
    Oval,
    Rect,
    RoundRect {
        /// Corner radius as a fraction of the smaller pad dimension.
        ratio: f64,
    },
    Trapezoid {
        /// Difference between the parallel edge lengths, per axis.
        delta: (f64, f64),
    },
    Unknown(String),
}

/// A footprint pad. Position and rotation are in the footprint's local
/// frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub uuid: Uuid,
    pub number: String,
    pub at: Vec2,
    pub size: Vec2,
    pub rotation: Angle,
    pub shape: PadShape,
    /// Drill diameter for through-hole pads.
    pub drill: Option<f64>,
    pub layers: Vec<String>,
    pub net: Option<String>,
}

/// Non-copper graphic primitives (`gr_line`, `gr_rect`, ...), also used
/// for footprint graphics (`fp_line`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphicKind {
    Line { start: Vec2, end: Vec2 },
    Rect { start: Vec2, end: Vec2, fill: bool },
    Circle { center: Vec2, radius: f64, fill: bool },
    Arc { start: Vec2, mid: Vec2, end: Vec2 },
    Poly { points: Vec<Vec2>, fill: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graphic {
    pub uuid: Uuid,
    pub layer: String,
    pub width: f64,
    pub kind: GraphicKind,
}

/// Free text on a board layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardText {
    pub uuid: Uuid,
    pub text: String,
    pub at: Vec2,
    pub rotation: Angle,
    pub layer: String,
    pub style: TextStyle,
}

/// A linear dimension annotation. Hidden dimensions are kept in the
/// document but contribute to no layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub uuid: Uuid,
    pub start: Vec2,
    pub end: Vec2,
    pub layer: String,
    pub text: String,
    pub height: f64,
    pub hidden: bool,
}

/// A placed footprint owning pads, graphics and texts in its local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub uuid: Uuid,
    pub reference: String,
    pub at: Vec2,
    pub rotation: Angle,
    pub side: Side,
    pub children: Vec<BoardItem>,
}

/// Tagged union of everything that can appear on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardItem {
    Segment(TrackSegment),
    Arc(TrackArc),
    Via(Via),
    Zone(Zone),
    Pad(Pad),
    Graphic(Graphic),
    Text(BoardText),
    Dimension(Dimension),
    Footprint(Footprint),
}

impl BoardItem {
    pub fn uuid(&self) -> Uuid {
        match self {
            BoardItem::Segment(x) => x.uuid,
            BoardItem::Arc(x) => x.uuid,
            BoardItem::Via(x) => x.uuid,
            BoardItem::Zone(x) => x.uuid,
            BoardItem::Pad(x) => x.uuid,
            BoardItem::Graphic(x) => x.uuid,
            BoardItem::Text(x) => x.uuid,
            BoardItem::Dimension(x) => x.uuid,
            BoardItem::Footprint(x) => x.uuid,
        }
    }

    /// Stable variant tag, used for dispatch diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            BoardItem::Segment(_) => "segment",
            BoardItem::Arc(_) => "arc",
            BoardItem::Via(_) => "via",
            BoardItem::Zone(_) => "zone",
            BoardItem::Pad(_) => "pad",
            BoardItem::Graphic(_) => "graphic",
            BoardItem::Text(_) => "text",
            BoardItem::Dimension(_) => "dimension",
            BoardItem::Footprint(_) => "footprint",
        }
    }

    /// Net name for net highlighting, if the item belongs to one.
    pub fn net(&self) -> Option<&str> {
        match self {
            BoardItem::Segment(x) => x.net.as_deref(),
            BoardItem::Arc(x) => x.net.as_deref(),
            BoardItem::Via(x) => x.net.as_deref(),
            BoardItem::Zone(x) => x.net.as_deref(),
            BoardItem::Pad(x) => x.net.as_deref(),
            _ => None,
        }
    }
}

/// A parsed board document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDocument {
    pub title: String,
    /// The physical copper stack, front to back (e.g. `F.Cu`, `In1.Cu`,
    /// ..., `B.Cu`). Drives conditional enablement of inner layers.
    pub copper_layers: Vec<String>,
    pub items: Vec<BoardItem>,
}

impl BoardDocument {
    pub fn new(title: impl Into<String>, copper_layers: Vec<String>) -> Self {
        Self {
            title: title.into(),
            copper_layers,
            items: Vec::new(),
        }
    }

    /// A standard two-layer stack.
    pub fn two_layer(title: impl Into<String>) -> Self {
        Self::new(title, vec!["F.Cu".to_string(), "B.Cu".to_string()])
    }

    pub fn copper_layers(&self) -> &[String] {
        &self.copper_layers
    }

    /// Index of a copper layer in the stack, front = 0.
    pub fn copper_index(&self, name: &str) -> Option<usize> {
        self.copper_layers.iter().position(|l| l == name)
    }

    /// Full traversal of every item, including footprint children.
    pub fn items(&self) -> impl Iterator<Item = &BoardItem> {
        self.items.iter().flat_map(|item| {
            let children: &[BoardItem] = match item {
                BoardItem::Footprint(fp) => &fp.children,
                _ => &[],
            };
            std::iter::once(item).chain(children.iter())
        })
    }

    /// Looks up an item anywhere in the tree by identity.
    pub fn find(&self, uuid: Uuid) -> Option<&BoardItem> {
        self.items().find(|item| item.uuid() == uuid)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn via(kind: ViaKind) -> BoardItem {
        BoardItem::Via(Via {
            uuid: Uuid::new_v4(),
            at: Vec2::ZERO,
            size: 0.8,
            drill: 0.4,
            kind,
            layers: None,
            net: None,
        })
    }

    fn footprint_with_pad() -> BoardItem {
        BoardItem::Footprint(Footprint {
            uuid: Uuid::new_v4(),
            reference: "R1".to_string(),
            at: Vec2::new(10.0, 10.0),
            rotation: Angle::ZERO,
            side: Side::Front,
            children: vec![BoardItem::Pad(Pad {
                uuid: Uuid::new_v4(),
                number: "1".to_string(),
                at: Vec2::ZERO,
                size: Vec2::new(1.0, 1.0),
                rotation: Angle::ZERO,
                shape: PadShape::Circle,
                drill: None,
                layers: vec!["F.Cu".to_string()],
                net: None,
            })],
        })
    }

    #[test]
    fn test_traversal_includes_children() {
        let mut doc = BoardDocument::two_layer("test");
        doc.items.push(via(ViaKind::Through));
        doc.items.push(footprint_with_pad());
        let variants: Vec<_> = doc.items().map(|i| i.variant_name()).collect();
        assert_eq!(variants, vec!["via", "footprint", "pad"]);
    }

    #[test]
    fn test_find_nested() {
        let mut doc = BoardDocument::two_layer("test");
        doc.items.push(footprint_with_pad());
        let pad_uuid = match &doc.items[0] {
            BoardItem::Footprint(fp) => fp.children[0].uuid(),
            _ => unreachable!(),
        };
        assert_eq!(doc.find(pad_uuid).unwrap().variant_name(), "pad");
        assert!(doc.find(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_copper_index() {
        let doc = BoardDocument::new(
            "six",
            vec![
                "F.Cu".into(),
                "In1.Cu".into(),
                "In2.Cu".into(),
                "In3.Cu".into(),
                "In4.Cu".into(),
                "B.Cu".into(),
            ],
        );
        assert_eq!(doc.copper_index("F.Cu"), Some(0));
        assert_eq!(doc.copper_index("B.Cu"), Some(5));
        assert_eq!(doc.copper_index("In9.Cu"), None);
    }

    #[test]
    fn test_zone_layers_dedup() {
        let zone = Zone {
            uuid: Uuid::new_v4(),
            name: None,
            filled_polygons: vec![
                ("F.Cu".to_string(), vec![]),
                ("F.Cu".to_string(), vec![]),
                ("B.Cu".to_string(), vec![]),
            ],
            net: None,
        };
        assert_eq!(zone.layers(), vec!["F.Cu", "B.Cu"]);
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = BoardDocument::two_layer("rt");
        doc.items.push(via(ViaKind::Micro));
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(BoardDocument::from_json(&json).unwrap(), doc);
    }
}

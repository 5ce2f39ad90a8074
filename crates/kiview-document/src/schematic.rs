//! Schematic (`.kicad_sch`) document model.
//!
//! Coordinates are millimeters with Y growing downward. Label and pin
//! rotations are quantized to the four cardinal orientations by the layout
//! code; the raw angle from the file is preserved here.

use kiview_core::math::{Angle, Vec2};
use kiview_core::text::TextStyle;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wires and buses share geometry and differ only in stroke treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireKind {
    #[default]
    Wire,
    Bus,
}

/// A wire or bus segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub uuid: Uuid,
    pub kind: WireKind,
    pub start: Vec2,
    pub end: Vec2,
    pub net: Option<String>,
}

/// A junction dot where wires meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub uuid: Uuid,
    pub at: Vec2,
    pub diameter: f64,
    pub net: Option<String>,
}

/// A no-connect cross marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoConnect {
    pub uuid: Uuid,
    pub at: Vec2,
}

/// The electrical direction encoded by a global or hierarchical label's
/// outline shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelShape {
    Input,
    Output,
    Bidirectional,
    TriState,
    #[default]
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Local,
    Global,
    Hierarchical,
}

/// A net label of any kind. Local labels have no outline shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub uuid: Uuid,
    pub kind: LabelKind,
    pub text: String,
    pub at: Vec2,
    pub rotation: Angle,
    pub shape: LabelShape,
    pub style: TextStyle,
}

/// Free text notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchematicText {
    pub uuid: Uuid,
    pub text: String,
    pub at: Vec2,
    pub rotation: Angle,
    pub style: TextStyle,
}

/// A symbol pin in the symbol's local frame. `rotation` points along the
/// pin from its connection point toward the symbol body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub uuid: Uuid,
    pub number: String,
    pub name: String,
    pub at: Vec2,
    pub length: f64,
    pub rotation: Angle,
    pub hide_name: bool,
    pub hide_number: bool,
    pub net: Option<String>,
}

/// A symbol field (reference, value, footprint, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub uuid: Uuid,
    pub key: String,
    pub value: String,
    pub at: Vec2,
    pub rotation: Angle,
    pub style: TextStyle,
    pub hidden: bool,
}

/// Mirror applied to a placed symbol instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mirror {
    /// Flip across the X axis (negate Y).
    X,
    /// Flip across the Y axis (negate X).
    Y,
}

/// A placed symbol instance owning pins, properties and body graphics in
/// its local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInstance {
    pub uuid: Uuid,
    pub reference: String,
    pub at: Vec2,
    pub rotation: Angle,
    pub mirror: Option<Mirror>,
    pub children: Vec<SchematicItem>,
}

/// Symbol body graphics reuse the board graphic kinds; the layer they land
/// on is decided by the painter, not stored per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyGraphic {
    pub uuid: Uuid,
    pub width: f64,
    pub fill_background: bool,
    pub kind: crate::board::GraphicKind,
}

/// Tagged union of everything that can appear in a schematic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchematicItem {
    Wire(Wire),
    Junction(Junction),
    NoConnect(NoConnect),
    Label(Label),
    Text(SchematicText),
    Symbol(SymbolInstance),
    Pin(Pin),
    Property(Property),
    Graphic(BodyGraphic),
}

impl SchematicItem {
    pub fn uuid(&self) -> Uuid {
        match self {
            SchematicItem::Wire(x) => x.uuid,
            SchematicItem::Junction(x) => x.uuid,
            SchematicItem::NoConnect(x) => x.uuid,
            SchematicItem::Label(x) => x.uuid,
            SchematicItem::Text(x) => x.uuid,
            SchematicItem::Symbol(x) => x.uuid,
            SchematicItem::Pin(x) => x.uuid,
            SchematicItem::Property(x) => x.uuid,
            SchematicItem::Graphic(x) => x.uuid,
        }
    }

    /// Stable variant tag, used for dispatch diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            SchematicItem::Wire(w) => match w.kind {
                WireKind::Wire => "wire",
                WireKind::Bus => "bus",
            },
            SchematicItem::Junction(_) => "junction",
            SchematicItem::NoConnect(_) => "no_connect",
            SchematicItem::Label(l) => match l.kind {
                LabelKind::Local => "label",
                LabelKind::Global => "global_label",
                LabelKind::Hierarchical => "hierarchical_label",
            },
            SchematicItem::Text(_) => "text",
            SchematicItem::Symbol(_) => "symbol",
            SchematicItem::Pin(_) => "pin",
            SchematicItem::Property(_) => "property",
            SchematicItem::Graphic(_) => "graphic",
        }
    }

    /// Net name for net highlighting. Labels name the net they attach to.
    pub fn net(&self) -> Option<&str> {
        match self {
            SchematicItem::Wire(x) => x.net.as_deref(),
            SchematicItem::Junction(x) => x.net.as_deref(),
            SchematicItem::Pin(x) => x.net.as_deref(),
            SchematicItem::Label(x) => Some(&x.text),
            _ => None,
        }
    }
}

/// A parsed schematic document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchematicDocument {
    pub title: String,
    pub items: Vec<SchematicItem>,
}

impl SchematicDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    /// Full traversal of every item, including symbol children.
    pub fn items(&self) -> impl Iterator<Item = &SchematicItem> {
        self.items.iter().flat_map(|item| {
            let children: &[SchematicItem] = match item {
                SchematicItem::Symbol(sym) => &sym.children,
                _ => &[],
            };
            std::iter::once(item).chain(children.iter())
        })
    }

    /// Looks up an item anywhere in the tree by identity.
    pub fn find(&self, uuid: Uuid) -> Option<&SchematicItem> {
        self.items().find(|item| item.uuid() == uuid)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol() -> SchematicItem {
        SchematicItem::Symbol(SymbolInstance {
            uuid: Uuid::new_v4(),
            reference: "U1".to_string(),
            at: Vec2::new(50.0, 50.0),
            rotation: Angle::from_degrees(90.0),
            mirror: None,
            children: vec![SchematicItem::Pin(Pin {
                uuid: Uuid::new_v4(),
                number: "1".to_string(),
                name: "VCC".to_string(),
                at: Vec2::new(-5.0, 0.0),
                length: 2.54,
                rotation: Angle::ZERO,
                hide_name: false,
                hide_number: false,
                net: Some("VCC".to_string()),
            })],
        })
    }

    #[test]
    fn test_traversal_includes_pins() {
        let mut doc = SchematicDocument::new("test");
        doc.items.push(symbol());
        let variants: Vec<_> = doc.items().map(|i| i.variant_name()).collect();
        assert_eq!(variants, vec!["symbol", "pin"]);
    }

    #[test]
    fn test_label_net_is_its_text() {
        let label = SchematicItem::Label(Label {
            uuid: Uuid::new_v4(),
            kind: LabelKind::Global,
            text: "CLK".to_string(),
            at: Vec2::ZERO,
            rotation: Angle::ZERO,
            shape: LabelShape::Input,
            style: TextStyle::default(),
        });
        assert_eq!(label.net(), Some("CLK"));
        assert_eq!(label.variant_name(), "global_label");
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = SchematicDocument::new("rt");
        doc.items.push(symbol());
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(SchematicDocument::from_json(&json).unwrap(), doc);
    }
}

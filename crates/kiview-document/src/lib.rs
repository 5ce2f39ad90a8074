//! # KiView Document
//!
//! The typed item trees a KiCAD file parser produces: one model for boards
//! (`.kicad_pcb`) and one for schematics (`.kicad_sch`).
//!
//! The s-expression parser itself lives outside this workspace; documents
//! here are constructed programmatically or deserialized from JSON (which
//! is also how test fixtures are written). Items are owned exclusively by
//! their document; painters hold only transient references during a paint
//! pass.
//!
//! Every item carries a `Uuid` identity used by selection and the per-layer
//! hit-test index, and a stable variant tag (`variant_name`) used for
//! painter dispatch diagnostics.

pub mod board;
pub mod schematic;

pub use board::{
    BoardDocument, BoardItem, BoardText, Dimension, Footprint, Graphic, GraphicKind, Pad,
    PadShape, Side, TrackArc, TrackSegment, Via, ViaKind, Zone,
};
pub use schematic::{
    BodyGraphic, Junction, Label, LabelKind, LabelShape, Mirror, NoConnect, Pin, Property,
    SchematicDocument, SchematicItem, SchematicText, SymbolInstance, Wire, WireKind,
};

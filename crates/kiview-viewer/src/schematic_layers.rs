//! The schematic layer catalog.
//!
//! Schematics have no physical layer stack; every layer here is virtual,
//! existing only to control draw order: symbol bodies under wires, pins
//! and fields over bodies, labels and junctions on top.

use kiview_core::theme::Theme;
use kiview_document::SchematicDocument;

use crate::layers::{LayerDef, LayerSet};

pub use crate::layers::{GRID, OVERLAY};

pub const INTERCONNECT: &str = ":Interconnect";
pub const SYMBOL_BACKGROUND: &str = ":Symbol:Background";
pub const SYMBOL_FOREGROUND: &str = ":Symbol:Foreground";
pub const SYMBOL_FIELD: &str = ":Symbol:Field";
pub const SYMBOL_PIN: &str = ":Symbol:Pin";
pub const LABEL: &str = ":Label";
pub const LABEL_GLOBAL: &str = ":Label:Global";
pub const LABEL_HIERARCHICAL: &str = ":Label:Hierarchical";
pub const NOTES: &str = ":Notes";
pub const JUNCTION: &str = ":Junction";
pub const MARKS: &str = ":Marks";

/// Builds the layer set for a schematic, colored from `theme`.
pub fn schematic_layer_set(_schematic: &SchematicDocument, theme: &Theme) -> LayerSet {
    // Display order, back to front.
    let names = [
        SYMBOL_BACKGROUND,
        NOTES,
        SYMBOL_FOREGROUND,
        INTERCONNECT,
        SYMBOL_PIN,
        SYMBOL_FIELD,
        LABEL,
        LABEL_GLOBAL,
        LABEL_HIERARCHICAL,
        JUNCTION,
        MARKS,
        GRID,
        OVERLAY,
    ];
    let defs = names
        .iter()
        .enumerate()
        .map(|(rank, name)| {
            let mut def = LayerDef::new(*name);
            // Everything except grid and overlay shows up in the UI list,
            // in a different order than display (labels first).
            if *name != GRID && *name != OVERLAY {
                def = def.ui_rank(names.len() - rank);
            }
            def
        })
        .collect();

    let mut set = LayerSet::new(defs, |name| theme.color_for(name));
    if let Some(overlay) = set.by_name_mut(OVERLAY) {
        overlay.color = theme.highlight;
    }
    if let Some(grid) = set.by_name_mut(GRID) {
        grid.color = theme.grid;
    }
    set
}

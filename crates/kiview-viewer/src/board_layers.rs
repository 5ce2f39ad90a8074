//! The board layer catalog.
//!
//! Builds the full display-order table for a board document: physical
//! layers from the file plus the virtual layers that exist only for
//! rendering (via and pad holes, per-copper zone fills, blind/buried via
//! fan-out, the highlight overlay and the grid).
//!
//! Inner copper layers `In1.Cu`..`In30.Cu` are always defined so ordinals
//! are stable across boards, but only the ones present in the document's
//! stack are enabled. Zone and blind-via virtual layers are created only
//! for copper layers that exist.

use kiview_core::theme::Theme;
use kiview_document::BoardDocument;

use crate::layers::{LayerDef, LayerSet, Visibility, VisibilityRule};

pub use crate::layers::{GRID, OVERLAY};

/// Footprint anchor markers.
pub const ANCHORS: &str = ":Anchors";
pub const VIA_HOLES: &str = ":Via:Holes";
pub const VIA_THROUGH: &str = ":Via:Through";
pub const VIA_MICRO: &str = ":Via:MicroVia";
pub const PAD_HOLES: &str = ":Pad:Holes";
pub const PAD_HOLE_WALLS: &str = ":Pad:HoleWalls";

/// Zone fill layer for a copper layer.
pub fn zones_layer(copper: &str) -> String {
    format!(":Zones:{copper}")
}

/// Blind/buried via hole layer for a copper layer.
pub fn bb_via_holes_layer(copper: &str) -> String {
    format!(":BBViaHoles:{copper}")
}

/// Blind/buried via hole-wall layer for a copper layer.
pub fn bb_via_hole_walls_layer(copper: &str) -> String {
    format!(":BBViaHoleWalls:{copper}")
}

/// The maximum number of inner copper layers the format allows.
const MAX_INNER_COPPER: usize = 30;

fn copper_rule(copper: &str) -> Visibility {
    Visibility::Rule(VisibilityRule::LayerVisible(copper.to_string()))
}

fn any_copper() -> Visibility {
    Visibility::Rule(VisibilityRule::AnyCopperVisible)
}

/// Builds the layer set for a board, colored from `theme`.
pub fn board_layer_set(board: &BoardDocument, theme: &Theme) -> LayerSet {
    let stack = board.copper_layers();
    let has = |name: &str| stack.iter().any(|l| l == name);

    // Copper back to front: B.Cu, In30..In1, F.Cu. Each copper layer is
    // preceded by its zone fills so fills composite under tracks.
    let mut defs: Vec<LayerDef> = Vec::with_capacity(128);

    for name in ["B.CrtYd", "B.Fab", "B.Paste", "B.Mask", "B.SilkS"] {
        defs.push(LayerDef::new(name));
    }

    let push_copper = |defs: &mut Vec<LayerDef>, name: &str, enabled: bool| {
        if enabled {
            defs.push(LayerDef::new(zones_layer(name)).visibility(copper_rule(name)));
        }
        defs.push(LayerDef::new(name).copper().enabled(enabled));
    };

    push_copper(&mut defs, "B.Cu", true);
    for i in (1..=MAX_INNER_COPPER).rev() {
        let name = format!("In{i}.Cu");
        let enabled = has(&name);
        push_copper(&mut defs, &name, enabled);
    }
    push_copper(&mut defs, "F.Cu", true);

    // Blind/buried via fan-out layers, one pair per copper layer present.
    for name in stack {
        defs.push(LayerDef::new(bb_via_hole_walls_layer(name)).visibility(any_copper()));
        defs.push(LayerDef::new(bb_via_holes_layer(name)).visibility(any_copper()));
    }

    for name in [VIA_THROUGH, VIA_MICRO, VIA_HOLES, PAD_HOLE_WALLS, PAD_HOLES] {
        defs.push(LayerDef::new(name).visibility(any_copper()));
    }

    for name in [
        "F.SilkS",
        "F.Paste",
        "F.Mask",
        "F.Fab",
        "F.CrtYd",
        "Edge.Cuts",
        "Margin",
        "Dwgs.User",
        "Cmts.User",
    ] {
        defs.push(LayerDef::new(name));
    }

    defs.push(LayerDef::new(ANCHORS));
    defs.push(LayerDef::new(GRID));
    defs.push(LayerDef::new(OVERLAY));

    // UI order: copper front-to-back first, then the non-copper physical
    // layers in the layer-manager listing order. Virtual layers stay out.
    let mut ranked_names: Vec<String> = Vec::new();
    ranked_names.push("F.Cu".to_string());
    for i in 1..=MAX_INNER_COPPER {
        let name = format!("In{i}.Cu");
        if has(&name) {
            ranked_names.push(name);
        }
    }
    ranked_names.push("B.Cu".to_string());
    for name in [
        "F.SilkS", "B.SilkS", "F.Mask", "B.Mask", "F.Paste", "B.Paste", "F.Fab", "B.Fab",
        "F.CrtYd", "B.CrtYd", "Edge.Cuts", "Margin", "Dwgs.User", "Cmts.User",
    ] {
        ranked_names.push(name.to_string());
    }
    for def in &mut defs {
        def.ui_rank = ranked_names.iter().position(|n| *n == def.name);
    }

    // Derived per-copper layers are created by this catalog, not by the
    // theme, so they inherit their copper layer's color instead of
    // hitting the missing-entry fallback.
    let mut set = LayerSet::new(defs, |name| {
        if let Some(copper) = name.strip_prefix(":Zones:") {
            return theme.color_for(copper);
        }
        if let Some(copper) = name.strip_prefix(":BBViaHoleWalls:") {
            return theme.color_for(copper);
        }
        if name.strip_prefix(":BBViaHoles:").is_some() {
            return theme.color_for(VIA_HOLES);
        }
        theme.color_for(name)
    });
    if let Some(overlay) = set.by_name_mut(OVERLAY) {
        overlay.color = theme.highlight;
    }
    if let Some(grid) = set.by_name_mut(GRID) {
        grid.color = theme.grid;
    }
    set
}

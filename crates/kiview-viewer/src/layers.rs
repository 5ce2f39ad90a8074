//! Named, ordered drawing layers.
//!
//! A [`LayerSet`] owns every [`ViewLayer`] for one open document, in the
//! fixed display order used for painting and compositing. The UI-facing
//! order for layer toggle lists is separate and unrelated.
//!
//! Visibility is either a static flag or a rule evaluated on demand
//! against the owning set, so toggling one copper layer immediately
//! affects derived layers like via holes without any cache invalidation.

use std::collections::HashMap;

use tracing::warn;
use uuid::Uuid;

use kiview_core::math::BBox;
use kiview_core::shapes::Color;
use kiview_render::CommittedLayer;

/// Highlight overlay layer, repainted independently of the scene. Both
/// document kinds place it frontmost.
pub const OVERLAY: &str = ":Overlay";
/// Grid dot layer, owned by the grid helper.
pub const GRID: &str = ":Grid";

/// How a layer decides whether it is visible.
#[derive(Debug, Clone, PartialEq)]
pub enum Visibility {
    Static(bool),
    Rule(VisibilityRule),
}

/// Derived-visibility rules for virtual layers.
///
/// Rules reference other layers by name and are evaluated every time
/// visibility is read; they are never cached because the referenced
/// layers' flags can change between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum VisibilityRule {
    /// Visible iff any copper layer in the set is visible.
    AnyCopperVisible,
    /// Visible iff the named layer is visible.
    LayerVisible(String),
}

/// Definition of one layer, passed to the [`LayerSet`] constructor by the
/// board/schematic catalog builders.
#[derive(Debug, Clone)]
pub struct LayerDef {
    pub name: String,
    pub visibility: Visibility,
    /// Whether the layer exists in the document's data at all. Disabled
    /// layers stay in the set (so ordinals are stable) but never paint.
    pub enabled: bool,
    /// Position in the UI toggle list; `None` keeps the layer out of the
    /// UI entirely (virtual layers).
    pub ui_rank: Option<usize>,
    /// Copper layers feed the `AnyCopperVisible` rule.
    pub is_copper: bool,
}

impl LayerDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Static(true),
            enabled: true,
            ui_rank: None,
            is_copper: false,
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn ui_rank(mut self, rank: usize) -> Self {
        self.ui_rank = Some(rank);
        self
    }

    pub fn copper(mut self) -> Self {
        self.is_copper = true;
        self
    }
}

/// One named drawing layer.
#[derive(Debug)]
pub struct ViewLayer {
    pub name: String,
    /// Position in display order, assigned by the set.
    pub ordinal: usize,
    pub enabled: bool,
    pub visibility: Visibility,
    pub color: Color,
    pub opacity: f32,
    pub is_copper: bool,
    /// Items assigned to this layer by the classification pass.
    pub items: Vec<Uuid>,
    /// Per-item world-space bounds on this layer, rebuilt on every paint.
    pub bboxes: HashMap<Uuid, BBox>,
    /// The committed geometry batch, replaced wholesale on repaint.
    pub batch: Option<CommittedLayer>,
}

impl ViewLayer {
    /// World-space bounds of everything painted on this layer.
    pub fn bbox(&self) -> BBox {
        self.batch.as_ref().map(CommittedLayer::bbox).unwrap_or_default()
    }
}

/// An ordered collection of layers, keyed by name.
#[derive(Debug)]
pub struct LayerSet {
    layers: Vec<ViewLayer>,
    by_name: HashMap<String, usize>,
    ui_order: Vec<usize>,
    copper: Vec<usize>,
}

impl LayerSet {
    /// Builds a set from catalog definitions. `color_for` resolves theme
    /// colors; display order is the definition order.
    pub fn new(defs: Vec<LayerDef>, color_for: impl Fn(&str) -> Color) -> Self {
        let mut layers = Vec::with_capacity(defs.len());
        let mut by_name = HashMap::with_capacity(defs.len());
        let mut copper = Vec::new();
        let mut ranked: Vec<(usize, usize)> = Vec::new();

        for (ordinal, def) in defs.into_iter().enumerate() {
            if by_name.insert(def.name.clone(), ordinal).is_some() {
                warn!(layer = def.name.as_str(), "duplicate layer definition");
            }
            if def.is_copper {
                copper.push(ordinal);
            }
            if let Some(rank) = def.ui_rank {
                ranked.push((rank, ordinal));
            }
            layers.push(ViewLayer {
                color: color_for(&def.name),
                name: def.name,
                ordinal,
                enabled: def.enabled,
                visibility: def.visibility,
                opacity: 1.0,
                is_copper: def.is_copper,
                items: Vec::new(),
                bboxes: HashMap::new(),
                batch: None,
            });
        }
        ranked.sort_by_key(|&(rank, _)| rank);
        let ui_order = ranked.into_iter().map(|(_, ordinal)| ordinal).collect();

        Self {
            layers,
            by_name,
            ui_order,
            copper,
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Looks a layer up by name. Unknown names are not an error here;
    /// painters that require a layer decide how to treat a miss.
    pub fn by_name(&self, name: &str) -> Option<&ViewLayer> {
        self.index_of(name).map(|i| &self.layers[i])
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut ViewLayer> {
        self.index_of(name).map(move |i| &mut self.layers[i])
    }

    pub fn at(&self, ordinal: usize) -> &ViewLayer {
        &self.layers[ordinal]
    }

    pub fn at_mut(&mut self, ordinal: usize) -> &mut ViewLayer {
        &mut self.layers[ordinal]
    }

    /// Layers in the fixed display order (back to front). Each call
    /// returns a fresh iterator; paint and composite both re-enumerate.
    pub fn in_display_order(&self) -> impl DoubleEndedIterator<Item = &ViewLayer> {
        self.layers.iter()
    }

    /// Layers in the UI-facing toggle-list order. Unrelated to display
    /// order; virtual layers are excluded.
    pub fn in_ui_order(&self) -> impl Iterator<Item = &ViewLayer> {
        self.ui_order.iter().map(|&i| &self.layers[i])
    }

    /// Evaluates a layer's effective visibility, rules included. Unknown
    /// names are invisible.
    pub fn is_visible(&self, name: &str) -> bool {
        match self.by_name(name) {
            Some(layer) => self.layer_visible(layer),
            None => false,
        }
    }

    fn layer_visible(&self, layer: &ViewLayer) -> bool {
        if !layer.enabled {
            return false;
        }
        match &layer.visibility {
            Visibility::Static(flag) => *flag,
            Visibility::Rule(VisibilityRule::AnyCopperVisible) => {
                self.is_any_copper_layer_visible()
            }
            Visibility::Rule(VisibilityRule::LayerVisible(other)) => self.is_visible(other),
        }
    }

    /// Composite visibility over the copper group, computed on demand.
    pub fn is_any_copper_layer_visible(&self) -> bool {
        self.copper
            .iter()
            .map(|&i| &self.layers[i])
            .any(|layer| matches!(layer.visibility, Visibility::Static(true)) && layer.enabled)
    }

    /// Sets a layer's visibility to a static flag, replacing any rule.
    pub fn set_visible(&mut self, name: &str, visible: bool) {
        if let Some(layer) = self.by_name_mut(name) {
            layer.visibility = Visibility::Static(visible);
        } else {
            warn!(layer = name, "set_visible on unknown layer");
        }
    }

    /// Clears item lists, bbox indexes and committed batches ahead of a
    /// full repaint. Stale hit-test entries must never survive a repaint.
    pub fn clear_items(&mut self) {
        for layer in &mut self.layers {
            layer.items.clear();
            layer.bboxes.clear();
            layer.batch = None;
        }
    }

    /// Union of all committed batches' bounds.
    pub fn bbox(&self) -> BBox {
        BBox::combine(self.layers.iter().map(ViewLayer::bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_set() -> LayerSet {
        LayerSet::new(
            vec![
                LayerDef::new("B.Cu").copper().ui_rank(2),
                LayerDef::new("F.Cu").copper().ui_rank(1),
                LayerDef::new(":Via:Holes")
                    .visibility(Visibility::Rule(VisibilityRule::AnyCopperVisible)),
                LayerDef::new(":Zones:F.Cu")
                    .visibility(Visibility::Rule(VisibilityRule::LayerVisible("F.Cu".into()))),
                LayerDef::new("In1.Cu").copper().enabled(false),
            ],
            |_| Color::WHITE,
        )
    }

    #[test]
    fn test_display_vs_ui_order() {
        let set = test_set();
        let display: Vec<_> = set.in_display_order().map(|l| l.name.as_str()).collect();
        assert_eq!(
            display,
            vec!["B.Cu", "F.Cu", ":Via:Holes", ":Zones:F.Cu", "In1.Cu"]
        );
        let ui: Vec<_> = set.in_ui_order().map(|l| l.name.as_str()).collect();
        assert_eq!(ui, vec!["F.Cu", "B.Cu"]);
    }

    #[test]
    fn test_unknown_name_is_none_not_panic() {
        let set = test_set();
        assert!(set.by_name("No.Such").is_none());
        assert!(!set.is_visible("No.Such"));
    }

    #[test]
    fn test_rule_visibility_tracks_copper() {
        let mut set = test_set();
        assert!(set.is_visible(":Via:Holes"));
        set.set_visible("F.Cu", false);
        assert!(set.is_visible(":Via:Holes"), "B.Cu still visible");
        set.set_visible("B.Cu", false);
        assert!(!set.is_visible(":Via:Holes"));
        assert!(!set.is_any_copper_layer_visible());
    }

    #[test]
    fn test_disabled_copper_does_not_count() {
        let mut set = test_set();
        set.set_visible("F.Cu", false);
        set.set_visible("B.Cu", false);
        // In1.Cu is visible by flag but disabled, so it must not satisfy
        // the copper rule.
        set.set_visible("In1.Cu", true);
        assert!(!set.is_any_copper_layer_visible());
    }

    #[test]
    fn test_layer_rule_follows_named_layer() {
        let mut set = test_set();
        assert!(set.is_visible(":Zones:F.Cu"));
        set.set_visible("F.Cu", false);
        assert!(!set.is_visible(":Zones:F.Cu"));
    }

    #[test]
    fn test_clear_items_resets_indexes() {
        let mut set = test_set();
        let uuid = Uuid::new_v4();
        set.by_name_mut("F.Cu").unwrap().items.push(uuid);
        set.by_name_mut("F.Cu")
            .unwrap()
            .bboxes
            .insert(uuid, BBox::new(0.0, 0.0, 1.0, 1.0));
        set.clear_items();
        let layer = set.by_name("F.Cu").unwrap();
        assert!(layer.items.is_empty());
        assert!(layer.bboxes.is_empty());
        assert!(layer.batch.is_none());
    }
}

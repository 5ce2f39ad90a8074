//! Item-to-layer classification and per-item painting.
//!
//! Dispatch is a flat match on the item's variant tag inside a
//! [`PainterTable`] implementation, one per document kind — no inheritance
//! chains; adding an item kind is one more match arm in `layers_for` and
//! `paint`. The generic [`DocumentPainter`] owns everything the tables
//! share: the classify pass, per-layer batching in display order, depth
//! assignment, bbox indexing, container recursion under a scoped
//! transform, and the highlight overlay path.

pub mod board;
pub mod schematic;

use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::{debug, warn};
use uuid::Uuid;

use kiview_core::error::{PaintError, Result};
use kiview_core::math::Matrix3;
use kiview_core::shapes::Color;
use kiview_render::{with_transform, Renderer, TextShaper};

use crate::layers::LayerSet;

/// Layer fan-out result; nearly every item hits one or two layers.
pub type LayerNames = SmallVec<[String; 4]>;

/// The layer a painter is currently emitting into.
#[derive(Debug, Clone, Copy)]
pub struct LayerHandle<'a> {
    pub name: &'a str,
    pub color: Color,
}

/// Per-document-kind painter dispatch.
///
/// `layers_for` must be pure: it runs once to build layer item lists and
/// may run again during container recursion and hit-testing, and must
/// return the same names for the same item state every time.
pub trait PainterTable {
    type Item;

    /// Which layers the item contributes to. Empty only for items that
    /// are intentionally suppressed (hidden fields, hidden dimensions).
    fn layers_for(&self, item: &Self::Item) -> LayerNames;

    /// Emits primitives for `item` on `layer`, in the current local
    /// frame. Must only draw geometry relevant to that layer.
    fn paint(
        &self,
        gfx: &mut dyn Renderer,
        shaper: &dyn TextShaper,
        layer: &LayerHandle<'_>,
        item: &Self::Item,
    ) -> Result<()>;

    /// Container items return their local transform and children; the
    /// framework recurses so leaf painters never touch the transform
    /// stack themselves.
    fn children<'a>(&self, item: &'a Self::Item) -> Option<(Matrix3, &'a [Self::Item])>;

    fn uuid(&self, item: &Self::Item) -> Uuid;

    fn variant_name(&self, item: &Self::Item) -> &'static str;

    /// Net membership, for net highlighting.
    fn net<'a>(&self, item: &'a Self::Item) -> Option<&'a str>;
}

/// Walks a document's items, classifies them onto layers and paints one
/// immutable batch per layer in display order.
pub struct DocumentPainter<T: PainterTable> {
    table: T,
}

impl<T: PainterTable> DocumentPainter<T> {
    pub fn new(table: T) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Full repaint: classify every top-level item, then paint all items
    /// layer by layer in the set's display order. All of layer N commits
    /// before any of layer N+1 starts, regardless of document order.
    pub fn paint(
        &self,
        gfx: &mut dyn Renderer,
        layers: &mut LayerSet,
        shaper: &dyn TextShaper,
        items: &[T::Item],
    ) -> Result<()> {
        layers.clear_items();

        let mut by_uuid: HashMap<Uuid, &T::Item> = HashMap::with_capacity(items.len());
        for item in items {
            by_uuid.insert(self.table.uuid(item), item);
            for name in self.table.layers_for(item) {
                match layers.index_of(&name) {
                    Some(idx) => layers.at_mut(idx).items.push(self.table.uuid(item)),
                    None => {
                        let err = PaintError::LayerNotFound {
                            name: name.to_string(),
                        };
                        warn!(
                            variant = self.table.variant_name(item),
                            %err,
                            "skipping layer assignment"
                        );
                    }
                }
            }
        }

        // Depth runs from the back of the display order toward the
        // camera; smaller is nearer. Assigned here, never by painters.
        let count = layers.len();
        for ordinal in 0..count {
            let (name, color, assigned) = {
                let layer = layers.at(ordinal);
                if !layer.enabled || layer.items.is_empty() {
                    continue;
                }
                (layer.name.clone(), layer.color, layer.items.clone())
            };
            debug!(layer = name.as_str(), items = assigned.len(), "painting layer");

            let handle = LayerHandle {
                name: &name,
                color,
            };
            gfx.start_layer(&name)?;
            for uuid in assigned {
                let Some(item) = by_uuid.get(&uuid) else {
                    continue;
                };
                let mark = gfx.mark();
                if let Err(err) = self.paint_item(gfx, shaper, &handle, item) {
                    warn!(
                        layer = name.as_str(),
                        variant = self.table.variant_name(item),
                        %err,
                        "skipping item that failed to paint"
                    );
                }
                let bbox = gfx.bbox_since(mark);
                if bbox.valid() {
                    layers.at_mut(ordinal).bboxes.insert(uuid, bbox);
                }
            }
            let mut batch = gfx.end_layer()?;
            batch.depth = 1.0 - (ordinal + 1) as f64 / (count + 1) as f64;
            layers.at_mut(ordinal).batch = Some(batch);
        }
        Ok(())
    }

    /// Paints one item on one layer, recursing into containers inside a
    /// scoped transform so the stack is balanced even when a child fails.
    fn paint_item(
        &self,
        gfx: &mut dyn Renderer,
        shaper: &dyn TextShaper,
        layer: &LayerHandle<'_>,
        item: &T::Item,
    ) -> Result<()> {
        if let Some((local, children)) = self.table.children(item) {
            with_transform(gfx, local, |gfx| {
                for child in children {
                    if !self.table.layers_for(child).iter().any(|n| n == layer.name) {
                        continue;
                    }
                    if let Err(err) = self.paint_item(gfx, shaper, layer, child) {
                        warn!(
                            layer = layer.name,
                            variant = self.table.variant_name(child),
                            %err,
                            "skipping child item that failed to paint"
                        );
                    }
                }
                Ok(())
            })?;
        }
        self.table.paint(gfx, shaper, layer, item)
    }

    /// Repaints only the overlay layer for the given items, leaving every
    /// other committed batch untouched. Used for selection and net
    /// highlight; the overlay composites with its own color and opacity.
    pub fn paint_overlay<'a>(
        &self,
        gfx: &mut dyn Renderer,
        layers: &mut LayerSet,
        shaper: &dyn TextShaper,
        overlay_name: &str,
        items: impl IntoIterator<Item = &'a T::Item>,
    ) -> Result<()>
    where
        T::Item: 'a,
    {
        let Some(overlay_idx) = layers.index_of(overlay_name) else {
            warn!(layer = overlay_name, "overlay layer missing from set");
            return Ok(());
        };
        let color = layers.at(overlay_idx).color;

        gfx.start_layer(overlay_name)?;
        for item in items {
            for name in self.table.layers_for(item) {
                let handle = LayerHandle {
                    name: &name,
                    color,
                };
                if let Err(err) = self.paint_item(gfx, shaper, &handle, item) {
                    warn!(
                        variant = self.table.variant_name(item),
                        %err,
                        "skipping item in overlay paint"
                    );
                }
            }
        }
        let mut batch = gfx.end_layer()?;
        batch.depth = 0.0;
        layers.at_mut(overlay_idx).batch = Some(batch);
        Ok(())
    }

    /// All top-level items belonging to `net`, for highlight painting.
    /// A container counts when any of its children is on the net, since
    /// overlay painting re-runs the container's transform scope.
    pub fn items_on_net<'a>(&self, items: &'a [T::Item], net: &str) -> Vec<&'a T::Item> {
        items
            .iter()
            .filter(|item| {
                if self.table.net(item) == Some(net) {
                    return true;
                }
                match self.table.children(item) {
                    Some((_, children)) => children
                        .iter()
                        .any(|child| self.table.net(child) == Some(net)),
                    None => false,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiview_core::math::Vec2;
    use kiview_core::theme::Theme;
    use kiview_document::{BoardDocument, BoardItem, Graphic, GraphicKind};
    use kiview_render::{BatchRenderer, BoxShaper};

    use crate::board_layers::board_layer_set;
    use crate::painters::board::BoardTable;

    #[test]
    fn test_unknown_layer_assignment_is_skipped() {
        let mut board = BoardDocument::two_layer("t");
        board.items.push(BoardItem::Graphic(Graphic {
            uuid: Uuid::new_v4(),
            layer: "Not.A.Layer".into(),
            width: 0.1,
            kind: GraphicKind::Line {
                start: Vec2::ZERO,
                end: Vec2::new(1.0, 0.0),
            },
        }));
        let mut layers = board_layer_set(&board, &Theme::board_default());
        let painter = DocumentPainter::new(BoardTable::new(&board));
        let mut gfx = BatchRenderer::new();
        // The stray assignment is dropped with a warning; the pass itself
        // must still succeed and no layer may claim the item.
        painter
            .paint(&mut gfx, &mut layers, &BoxShaper, &board.items)
            .unwrap();
        assert!(layers.in_display_order().all(|l| l.items.is_empty()));
    }
}

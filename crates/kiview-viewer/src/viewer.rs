//! Document viewer orchestration.
//!
//! Ties parsed documents to the layer catalogs and painter tables, owns
//! the camera and the grid, coalesces redraw requests, and manages
//! selection and net highlighting through the overlay layer.
//!
//! Loading is gated by a per-load readiness barrier: every `load` call
//! allocates a fresh oneshot channel and drops the previous sender, so
//! awaiters of a superseded load observe cancellation instead of a ready
//! signal meant for a different document.

use tokio::sync::oneshot;
use tracing::{debug, info};
use uuid::Uuid;

use kiview_core::error::{Error, Result};
use kiview_core::math::{BBox, Vec2};
use kiview_core::theme::Theme;
use kiview_document::{BoardDocument, SchematicDocument};
use kiview_render::{BatchRenderer, Blend, CanvasCompositor, TextShaper};

use crate::board_layers::board_layer_set;
use crate::camera::Camera2;
use crate::grid::{Grid, GridLod, GridUpdate};
use crate::layers::{LayerSet, GRID, OVERLAY};
use crate::painters::board::BoardTable;
use crate::painters::schematic::SchematicTable;
use crate::painters::{DocumentPainter, PainterTable};
use crate::schematic_layers::schematic_layer_set;

/// Margin fraction around the page on zoom-to-page.
const PAGE_MARGIN: f64 = 0.05;
/// Margin fraction around the selection bbox on zoom-to-selection.
const SELECTION_MARGIN: f64 = 0.5;

/// What the overlay layer currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
enum Highlight {
    #[default]
    None,
    Item(Uuid),
    Net(String),
}

struct LoadedDocument<T: PainterTable> {
    painter: DocumentPainter<T>,
    layers: LayerSet,
    items: Vec<T::Item>,
}

/// A 2D document viewer generic over the painter table. Use the
/// [`BoardViewer`] and [`SchematicViewer`] aliases with their `load`
/// methods.
pub struct Viewer<T: PainterTable> {
    theme: Theme,
    camera: Camera2,
    gfx: BatchRenderer,
    shaper: Box<dyn TextShaper>,
    grid: Grid,
    doc: Option<LoadedDocument<T>>,
    highlight: Highlight,
    draw_requested: bool,
    needs_full_paint: bool,
    loaded_tx: Option<oneshot::Sender<()>>,
}

pub type BoardViewer = Viewer<BoardTable>;
pub type SchematicViewer = Viewer<SchematicTable>;

fn default_grid_lods() -> Vec<GridLod> {
    vec![
        GridLod {
            min_zoom: 0.5,
            spacing: 10.0,
        },
        GridLod {
            min_zoom: 4.0,
            spacing: 1.0,
        },
        GridLod {
            min_zoom: 40.0,
            spacing: 0.1,
        },
    ]
}

impl<T: PainterTable> Viewer<T> {
    pub fn new(
        theme: Theme,
        shaper: Box<dyn TextShaper>,
        viewport_width: f64,
        viewport_height: f64,
    ) -> Self {
        Self {
            theme,
            camera: Camera2::new(viewport_width, viewport_height),
            gfx: BatchRenderer::new(),
            shaper,
            grid: Grid::new(default_grid_lods(), Vec2::ZERO),
            doc: None,
            highlight: Highlight::None,
            draw_requested: false,
            needs_full_paint: false,
            loaded_tx: None,
        }
    }

    pub fn camera(&self) -> &Camera2 {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2 {
        &mut self.camera
    }

    pub fn layers(&self) -> Option<&LayerSet> {
        self.doc.as_ref().map(|d| &d.layers)
    }

    pub fn layers_mut(&mut self) -> Option<&mut LayerSet> {
        self.doc.as_mut().map(|d| &mut d.layers)
    }

    /// Installs a freshly built document. The returned receiver resolves
    /// after the first successful paint of this load; receivers from
    /// earlier loads are cancelled.
    fn load_parts(
        &mut self,
        table: T,
        layers: LayerSet,
        items: Vec<T::Item>,
    ) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.loaded_tx = Some(tx);
        self.doc = Some(LoadedDocument {
            painter: DocumentPainter::new(table),
            layers,
            items,
        });
        self.highlight = Highlight::None;
        self.needs_full_paint = true;
        self.request_draw();
        rx
    }

    /// Marks the viewer dirty. Cheap and idempotent; any number of
    /// requests collapse into the next [`Viewer::draw_if_needed`].
    pub fn request_draw(&mut self) {
        self.draw_requested = true;
    }

    /// Runs the pending paint work, if any. Returns whether anything was
    /// done. The paint observes the camera and document state at the time
    /// it runs, not at the time the draw was requested.
    pub fn draw_if_needed(&mut self) -> Result<bool> {
        if !self.draw_requested {
            return Ok(false);
        }
        self.draw_requested = false;
        if self.doc.is_none() {
            return Ok(false);
        }

        if self.needs_full_paint {
            self.paint()?;
            self.needs_full_paint = false;
            if let Some(tx) = self.loaded_tx.take() {
                let _ = tx.send(());
            }
        }
        self.update_grid()?;
        self.paint_highlight()?;
        Ok(true)
    }

    /// Full repaint of every layer from the document's items.
    fn paint(&mut self) -> Result<()> {
        let Some(doc) = self.doc.as_mut() else {
            return Ok(());
        };
        info!(items = doc.items.len(), "painting document");
        doc.painter
            .paint(&mut self.gfx, &mut doc.layers, self.shaper.as_ref(), &doc.items)
    }

    fn update_grid(&mut self) -> Result<()> {
        let Some(doc) = self.doc.as_mut() else {
            return Ok(());
        };
        let Some(idx) = doc.layers.index_of(GRID) else {
            return Ok(());
        };
        let color = doc.layers.at(idx).color;
        let count = doc.layers.len();
        let update = self.grid.update(
            &mut self.gfx,
            GRID,
            color,
            self.camera.visible_bbox(),
            self.camera.zoom(),
        )?;
        match update {
            GridUpdate::Unchanged => {}
            GridUpdate::Regenerated(mut batch) => {
                batch.depth = 1.0 - (idx + 1) as f64 / (count + 1) as f64;
                doc.layers.at_mut(idx).batch = Some(batch);
            }
            GridUpdate::Cleared => doc.layers.at_mut(idx).batch = None,
        }
        Ok(())
    }

    /// Rebuilds the overlay batch for the current highlight. Only the
    /// overlay layer is touched; committed scene batches stay as they are.
    fn paint_highlight(&mut self) -> Result<()> {
        let Some(doc) = self.doc.as_mut() else {
            return Ok(());
        };
        match self.highlight.clone() {
            Highlight::None => {
                if let Some(overlay) = doc.layers.by_name_mut(OVERLAY) {
                    overlay.batch = None;
                }
                Ok(())
            }
            Highlight::Item(uuid) => {
                let table = doc.painter.table();
                let selected: Vec<&T::Item> = doc
                    .items
                    .iter()
                    .filter(|item| contains_uuid(table, item, uuid))
                    .collect();
                doc.painter.paint_overlay(
                    &mut self.gfx,
                    &mut doc.layers,
                    self.shaper.as_ref(),
                    OVERLAY,
                    selected,
                )
            }
            Highlight::Net(net) => {
                let on_net = doc.painter.items_on_net(&doc.items, &net);
                doc.painter.paint_overlay(
                    &mut self.gfx,
                    &mut doc.layers,
                    self.shaper.as_ref(),
                    OVERLAY,
                    on_net,
                )
            }
        }
    }

    /// Selects an item by identity, or clears the selection with `None`.
    /// A uuid with no match is treated as a deselect, not an error.
    pub fn select(&mut self, target: Option<Uuid>) {
        self.highlight = match target {
            Some(uuid) if self.find_item(uuid).is_some() => Highlight::Item(uuid),
            Some(uuid) => {
                debug!(%uuid, "selection target not found, deselecting");
                Highlight::None
            }
            None => Highlight::None,
        };
        self.request_draw();
    }

    /// Picks the topmost item whose painted bbox contains `world_point`
    /// and selects it. Layers are probed front to back; within one layer
    /// the smallest bbox wins so small items stay selectable on top of
    /// large ones.
    pub fn select_at(&mut self, world_point: Vec2) -> Option<Uuid> {
        let doc = self.doc.as_ref()?;
        let mut hit = None;
        for layer in doc.layers.in_display_order().rev() {
            if layer.name == GRID || layer.name == OVERLAY {
                continue;
            }
            if !doc.layers.is_visible(&layer.name) {
                continue;
            }
            let mut best: Option<(Uuid, f64)> = None;
            for (&uuid, bbox) in &layer.bboxes {
                if bbox.contains_point(world_point) {
                    let area = bbox.w * bbox.h;
                    if best.is_none_or(|(_, a)| area < a) {
                        best = Some((uuid, area));
                    }
                }
            }
            if let Some((uuid, _)) = best {
                hit = Some(uuid);
                break;
            }
        }
        self.select(hit);
        hit
    }

    pub fn selected(&self) -> Option<Uuid> {
        match self.highlight {
            Highlight::Item(uuid) => Some(uuid),
            _ => None,
        }
    }

    /// Highlights every item on `net`, or clears with `None`.
    pub fn highlight_net(&mut self, net: Option<&str>) {
        self.highlight = match net {
            Some(net) => Highlight::Net(net.to_string()),
            None => Highlight::None,
        };
        self.request_draw();
    }

    pub fn zoom_to_page(&mut self) {
        let Some(doc) = self.doc.as_ref() else {
            return;
        };
        let bbox = doc.layers.bbox();
        self.camera.zoom_to_bbox(&bbox, PAGE_MARGIN);
        self.request_draw();
    }

    pub fn zoom_to_selection(&mut self) {
        let Highlight::Item(uuid) = self.highlight else {
            return;
        };
        let Some(doc) = self.doc.as_ref() else {
            return;
        };
        let mut bbox = selection_bbox(&doc.layers, uuid);
        if !bbox.valid() {
            // The bbox index is keyed by top-level items, so a selected
            // footprint/symbol child resolves to its container's bounds.
            let table = doc.painter.table();
            if let Some(owner) = doc
                .items
                .iter()
                .find(|item| contains_uuid(table, item, uuid))
                .map(|item| table.uuid(item))
            {
                bbox = selection_bbox(&doc.layers, owner);
            }
        }
        if bbox.valid() {
            self.camera.zoom_to_bbox(&bbox, SELECTION_MARGIN);
            self.request_draw();
        }
    }

    fn set_opacity_where(&mut self, predicate: impl Fn(&str) -> bool, opacity: f32) {
        let Some(doc) = self.doc.as_mut() else {
            return;
        };
        let count = doc.layers.len();
        for ordinal in 0..count {
            let layer = doc.layers.at_mut(ordinal);
            if predicate(&layer.name) {
                layer.opacity = opacity.clamp(0.0, 1.0);
            }
        }
    }

    /// Copper layer opacity (tracks and fills drawn on copper).
    pub fn set_track_opacity(&mut self, opacity: f32) {
        let copper: Vec<String> = self
            .doc
            .as_ref()
            .map(|d| {
                d.layers
                    .in_display_order()
                    .filter(|l| l.is_copper)
                    .map(|l| l.name.clone())
                    .collect()
            })
            .unwrap_or_default();
        self.set_opacity_where(|name| copper.iter().any(|c| c == name), opacity);
    }

    pub fn set_via_opacity(&mut self, opacity: f32) {
        self.set_opacity_where(
            |name| name.starts_with(":Via:") || name.starts_with(":BBVia"),
            opacity,
        );
    }

    pub fn set_zone_opacity(&mut self, opacity: f32) {
        self.set_opacity_where(|name| name.starts_with(":Zones:"), opacity);
    }

    pub fn set_pad_opacity(&mut self, opacity: f32) {
        self.set_opacity_where(|name| name.starts_with(":Pad:"), opacity);
    }

    pub fn set_grid_opacity(&mut self, opacity: f32) {
        self.set_opacity_where(|name| name == GRID, opacity);
    }

    /// Composites every visible committed batch back-to-front into the
    /// canvas under the current camera.
    pub fn composite(&self, canvas: &mut CanvasCompositor) {
        canvas.clear(self.theme.background);
        let Some(doc) = self.doc.as_ref() else {
            return;
        };
        let matrix = self.camera.matrix();
        for layer in doc.layers.in_display_order() {
            if !doc.layers.is_visible(&layer.name) {
                continue;
            }
            if let Some(batch) = &layer.batch {
                // The overlay composites additively so highlights read
                // through the geometry they cover.
                let blend = if layer.name == OVERLAY {
                    Blend::Additive
                } else {
                    Blend::Alpha
                };
                canvas.draw_layer_blended(batch, &matrix, layer.opacity, blend);
            }
        }
    }

    fn find_item(&self, uuid: Uuid) -> Option<&T::Item> {
        let doc = self.doc.as_ref()?;
        let table = doc.painter.table();
        doc.items
            .iter()
            .find(|item| contains_uuid(table, item, uuid))
    }
}

/// Awaits a load barrier returned by `load`. Resolves once the first
/// paint of that load commits; fails with [`Error::LoadSuperseded`] when
/// a newer `load` replaced the document before that paint ran.
pub async fn wait_loaded(barrier: oneshot::Receiver<()>) -> Result<()> {
    barrier.await.map_err(|_| Error::LoadSuperseded)
}

/// Union of an item's per-layer painted bounds.
fn selection_bbox(layers: &LayerSet, uuid: Uuid) -> BBox {
    BBox::combine(
        layers
            .in_display_order()
            .filter_map(|layer| layer.bboxes.get(&uuid).copied()),
    )
}

/// Whether `item` is, or contains in its subtree, the item with `uuid`.
fn contains_uuid<T: PainterTable>(table: &T, item: &T::Item, uuid: Uuid) -> bool {
    if table.uuid(item) == uuid {
        return true;
    }
    match table.children(item) {
        Some((_, children)) => children
            .iter()
            .any(|child| contains_uuid(table, child, uuid)),
        None => false,
    }
}

impl Viewer<BoardTable> {
    /// Loads a board, replacing any previous document.
    pub fn load(&mut self, board: BoardDocument) -> oneshot::Receiver<()> {
        let layers = board_layer_set(&board, &self.theme);
        let table = BoardTable::new(&board);
        self.load_parts(table, layers, board.items)
    }
}

impl Viewer<SchematicTable> {
    /// Loads a schematic, replacing any previous document.
    pub fn load(&mut self, schematic: SchematicDocument) -> oneshot::Receiver<()> {
        let layers = schematic_layer_set(&schematic, &self.theme);
        self.load_parts(SchematicTable, layers, schematic.items)
    }
}

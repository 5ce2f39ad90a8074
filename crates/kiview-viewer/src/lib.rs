//! # KiView Viewer
//!
//! The layered painting pipeline and viewer orchestration.
//!
//! A parsed document flows through this crate in three stages:
//!
//! ```text
//! Document (kiview-document)
//!   ├── LayerSet (board_layers / schematic_layers catalogs)
//!   ├── DocumentPainter + PainterTable (classify, then paint per layer)
//!   └── Viewer (camera, grid, selection, overlay, compositing)
//! ```
//!
//! Items are classified onto named layers first, then painted layer by
//! layer in a fixed display order so stacking never depends on file
//! order. Each layer commits one immutable geometry batch; the viewer
//! composites visible batches back-to-front with per-layer opacity.

pub mod board_layers;
pub mod camera;
pub mod grid;
pub mod layers;
pub mod painters;
pub mod schematic_layers;
pub mod text_layout;
pub mod viewer;

pub use camera::Camera2;
pub use grid::{Grid, GridLod, GridUpdate};
pub use layers::{LayerDef, LayerSet, ViewLayer, Visibility, VisibilityRule};
pub use painters::board::BoardTable;
pub use painters::schematic::SchematicTable;
pub use painters::{DocumentPainter, LayerHandle, PainterTable};
pub use viewer::{wait_loaded, BoardViewer, SchematicViewer, Viewer};

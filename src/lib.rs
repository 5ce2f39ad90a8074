//! # KiView
//!
//! A layered 2D rendering core for viewing KiCAD schematics and boards.
//!
//! ## Architecture
//!
//! KiView is organized as a workspace with multiple crates:
//!
//! 1. **kiview-core** - Geometry and shape primitives, themes, errors
//! 2. **kiview-document** - Typed board and schematic item trees
//! 3. **kiview-render** - Renderer contract, batching, canvas compositor
//! 4. **kiview-viewer** - Layer catalogs, painters, grid, viewer
//! 5. **kiview** - Facade crate with a demo binary
//!
//! ## Pipeline
//!
//! A parsed document is classified onto named layers, painted layer by
//! layer in a fixed display order into immutable geometry batches, and
//! composited back-to-front under a camera transform with per-layer
//! opacity. Virtual layers (via holes, zone fills, the highlight
//! overlay) exist only in the rendering pipeline, not in the document.

pub use kiview_core::{Error, Result};
pub use kiview_document as document;
pub use kiview_render as render;
pub use kiview_viewer as viewer;

pub use kiview_core::math::{Angle, Arc, BBox, Matrix3, Vec2};
pub use kiview_core::shapes::{ArcShape, Circle, Color, Polygon, Polyline};
pub use kiview_core::theme::Theme;
pub use kiview_document::{BoardDocument, SchematicDocument};
pub use kiview_render::{BatchRenderer, BoxShaper, CanvasCompositor, CommittedLayer};
pub use kiview_viewer::{wait_loaded, BoardViewer, Camera2, LayerSet, SchematicViewer, Viewer};

/// Initializes the global tracing subscriber from `RUST_LOG`, defaulting
/// to `info`.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;
    Ok(())
}

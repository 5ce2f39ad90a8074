//! # KiView Render
//!
//! The renderer seam between painters and pixels.
//!
//! Painters submit primitives between `start_layer`/`end_layer` calls on a
//! [`Renderer`]; the renderer records them in world space under the current
//! transform and returns an immutable [`CommittedLayer`] batch per layer.
//! A compositor (the tiny-skia [`canvas`] backend here, a GPU backend
//! elsewhere) later draws committed batches back-to-front with per-layer
//! opacity.

pub mod canvas;
pub mod renderer;
pub mod text;
pub mod transform;

pub use canvas::{Blend, CanvasCompositor};
pub use renderer::{BatchRenderer, CommittedLayer, Primitive, Renderer};
pub use text::{BoxShaper, ShapedParagraph, TextShaper};
pub use transform::{with_transform, RenderState};

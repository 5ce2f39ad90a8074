//! # KiView Core
//!
//! Geometry primitives, drawable shape records, theme handling and the
//! shared error taxonomy for the KiView rendering pipeline.
//!
//! Everything in this crate is a small value type: painters and renderers
//! in the higher-level crates produce and consume these without owning any
//! document or GPU state.

pub mod error;
pub mod math;
pub mod shapes;
pub mod text;
pub mod theme;
pub mod units;

pub use error::{Error, PaintError, RenderError, Result};
pub use math::{Angle, Arc, BBox, Matrix3, Vec2};
pub use shapes::{ArcShape, Circle, Color, Polygon, Polyline};
pub use text::{HAlign, TextStyle, VAlign};
pub use theme::Theme;

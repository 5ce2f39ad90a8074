//! 2D math primitives for the rendering pipeline.
//!
//! Small copyable value types: vectors, angles, affine matrices, bounding
//! boxes and arcs. All coordinates are `f64` in document units unless a
//! function says otherwise.

mod angle;
mod arc;
mod bbox;
mod matrix3;
mod vec2;

pub use angle::Angle;
pub use arc::Arc;
pub use bbox::BBox;
pub use matrix3::Matrix3;
pub use vec2::Vec2;

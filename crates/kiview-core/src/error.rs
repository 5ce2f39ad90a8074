//! Error handling for KiView
//!
//! Provides error types for all layers of the rendering pipeline:
//! - Render errors (layer batching / transform stack misuse)
//! - Paint errors (classification and per-item painting)
//! - Load errors (document lifecycle)
//!
//! All error types use `thiserror` for ergonomic error handling.
//! Per-item paint failures are downgraded to log entries at the painter
//! boundary; the variants here surface only when the surrounding
//! orchestration itself is misused.

use thiserror::Error;

/// Renderer contract violations.
///
/// These indicate programmer error in the begin/end-layer protocol or the
/// transform stack, not bad document data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A second `start_layer` was issued before `end_layer`.
    #[error("layer {previous:?} is still active, cannot start layer {requested:?}")]
    LayerAlreadyActive {
        /// The layer that is still open.
        previous: String,
        /// The layer that was requested.
        requested: String,
    },

    /// `end_layer` or a primitive call was issued with no active layer.
    #[error("no active layer")]
    NoActiveLayer,

    /// The transform stack was popped below its base frame.
    #[error("transform stack underflow")]
    TransformUnderflow,

    /// The backend could not allocate its drawing surface.
    #[error("failed to create a {width}x{height} drawing surface")]
    SurfaceCreation {
        /// Requested surface width in pixels.
        width: u32,
        /// Requested surface height in pixels.
        height: u32,
    },
}

/// Classification and painting errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaintError {
    /// A painter asked for a layer the layer set does not define.
    #[error("required layer {name:?} not found in layer set")]
    LayerNotFound {
        /// The missing layer name.
        name: String,
    },

    /// An item sub-variant the painter does not understand.
    ///
    /// Callers downgrade this to a warning and skip the item so one
    /// malformed item cannot take down the whole paint pass.
    #[error("unsupported {what}: {value:?}")]
    Unsupported {
        /// What kind of field was unsupported (e.g. "pad shape").
        what: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Umbrella error type for the rendering core.
#[derive(Error, Debug)]
pub enum Error {
    /// Renderer contract violation.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Classification/painting failure.
    #[error(transparent)]
    Paint(#[from] PaintError),

    /// A pending document load was superseded by a newer one.
    #[error("document load superseded")]
    LoadSuperseded,

    /// Theme data could not be parsed.
    #[error("invalid theme: {0}")]
    InvalidTheme(String),
}

/// Result alias used throughout the KiView crates.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::LayerAlreadyActive {
            previous: "F.Cu".to_string(),
            requested: ":Via:Holes".to_string(),
        };
        assert!(err.to_string().contains("F.Cu"));
        assert!(err.to_string().contains(":Via:Holes"));
    }

    #[test]
    fn test_paint_error_conversion() {
        let err: Error = PaintError::LayerNotFound {
            name: "In99.Cu".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Paint(_)));
    }
}

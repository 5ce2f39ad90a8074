//! The transform stack shared by all renderer backends.
//!
//! Container painters (footprints, symbol instances) are the only code
//! that pushes local frames, and they do so through [`with_transform`] so
//! the pop runs on every exit path, including when a child painter fails.

use kiview_core::error::{RenderError, Result};
use kiview_core::math::Matrix3;

use crate::renderer::Renderer;

/// A stack of composed affine transforms. The base frame is always
/// present; popping it is a programmer error.
#[derive(Debug, Clone)]
pub struct RenderState {
    stack: Vec<Matrix3>,
}

impl RenderState {
    pub fn new() -> Self {
        Self {
            stack: vec![Matrix3::IDENTITY],
        }
    }

    /// The current composed transform.
    pub fn matrix(&self) -> Matrix3 {
        // The base frame is never popped, so the stack is never empty.
        *self.stack.last().unwrap()
    }

    /// Pushes `local` composed onto the current transform.
    pub fn push(&mut self, local: Matrix3) {
        let composed = self.matrix() * local;
        self.stack.push(composed);
    }

    /// Pops the top frame.
    pub fn pop(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(RenderError::TransformUnderflow.into());
        }
        self.stack.pop();
        Ok(())
    }

    /// Multiplies the current top frame in place.
    pub fn multiply(&mut self, m: Matrix3) {
        let composed = self.matrix() * m;
        *self.stack.last_mut().unwrap() = composed;
    }

    /// Current stack depth, including the base frame.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `f` with `local` pushed onto the renderer's transform stack,
/// popping again no matter how `f` exits.
pub fn with_transform<R>(
    gfx: &mut dyn Renderer,
    local: Matrix3,
    f: impl FnOnce(&mut dyn Renderer) -> Result<R>,
) -> Result<R> {
    gfx.state().push(local);
    let result = f(gfx);
    gfx.state().pop()?;
    result
}

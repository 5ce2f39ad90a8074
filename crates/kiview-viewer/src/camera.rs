//! World-to-screen camera for a 2D viewport.

use kiview_core::math::{BBox, Matrix3, Vec2};

const MIN_ZOOM: f64 = 0.05;
const MAX_ZOOM: f64 = 2000.0;

/// Pan/zoom camera. `zoom` is screen pixels per document millimeter;
/// `center` is the world point at the middle of the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2 {
    viewport: Vec2,
    center: Vec2,
    zoom: f64,
}

impl Camera2 {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            viewport: Vec2::new(viewport_width, viewport_height),
            center: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Moves the camera by a screen-space delta.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.center = self.center - screen_delta * (1.0 / self.zoom);
    }

    /// Zooms by `factor`, keeping the world point under `screen_point`
    /// stationary.
    pub fn zoom_at(&mut self, screen_point: Vec2, factor: f64) {
        let anchor = self.screen_to_world(screen_point);
        self.set_zoom(self.zoom * factor);
        let moved = self.screen_to_world(screen_point);
        self.center = self.center + (anchor - moved);
    }

    /// World-to-screen transform.
    pub fn matrix(&self) -> Matrix3 {
        Matrix3::translation(self.viewport.x / 2.0, self.viewport.y / 2.0)
            * Matrix3::scaling(self.zoom, self.zoom)
            * Matrix3::translation(-self.center.x, -self.center.y)
    }

    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        // The camera matrix is always invertible: zoom is clamped > 0.
        match self.matrix().try_inverse() {
            Some(inv) => inv.transform(p),
            None => p,
        }
    }

    /// The world-space rectangle the viewport shows.
    pub fn visible_bbox(&self) -> BBox {
        let half = self.viewport * (0.5 / self.zoom);
        BBox::from_corners(self.center - half, self.center + half)
    }

    /// Fits `bbox` into the viewport with a fractional margin.
    pub fn zoom_to_bbox(&mut self, bbox: &BBox, margin: f64) {
        if !bbox.valid() || self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            return;
        }
        let padded = bbox.grow_by_fraction(margin);
        self.center = padded.center();
        let fit = (self.viewport.x / padded.w).min(self.viewport.y / padded.h);
        self.set_zoom(fit);
    }
}

//! Incremental grid-dot generation.
//!
//! Grid geometry is the one thing that would otherwise be rebuilt every
//! frame during pan and zoom, so regeneration is keyed on a small state
//! machine: empty, or valid for a LOD and a covered bbox. As long as the
//! selected LOD is unchanged and the covered bbox still contains the
//! viewport, `update` is a no-op. On regeneration the viewport is grown
//! by a margin so small pans keep hitting the covered case.

use tracing::{debug, warn};

use kiview_core::error::Result;
use kiview_core::math::{BBox, Vec2};
use kiview_core::shapes::{Circle, Color, Polyline};
use kiview_render::{CommittedLayer, Renderer};

/// Fractional margin added around the viewport on regeneration.
const GROW_FRACTION: f64 = 0.2;
/// Grid dot radius as a fraction of the dot spacing.
const DOT_RADIUS_RATIO: f64 = 0.015;
/// Radius of the origin marker circle, in grid spacings.
const ORIGIN_MARKER_SPACINGS: f64 = 0.5;

/// One grid density tier. Selected when the camera zoom is at least
/// `min_zoom`; ties at the exact threshold select the tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLod {
    pub min_zoom: f64,
    pub spacing: f64,
}

#[derive(Debug, Clone, PartialEq)]
enum GridState {
    Empty,
    Valid { lod: usize, bbox: BBox },
}

/// Outcome of one [`Grid::update`] call.
#[derive(Debug)]
pub enum GridUpdate {
    /// Existing geometry still covers the viewport at the right LOD.
    Unchanged,
    /// Geometry was rebuilt; the batch replaces the grid layer's.
    Regenerated(CommittedLayer),
    /// Zoomed out past the coarsest tier; the grid layer goes empty.
    Cleared,
}

/// LOD-aware grid dot generator.
#[derive(Debug)]
pub struct Grid {
    lods: Vec<GridLod>,
    origin: Vec2,
    state: GridState,
}

impl Grid {
    /// `lods` ordered coarse to fine; the finest tier whose threshold the
    /// zoom meets wins.
    pub fn new(lods: Vec<GridLod>, origin: Vec2) -> Self {
        Self {
            lods,
            origin,
            state: GridState::Empty,
        }
    }

    pub fn set_origin(&mut self, origin: Vec2) {
        if origin != self.origin {
            self.origin = origin;
            self.state = GridState::Empty;
        }
    }

    fn select_lod(&self, zoom: f64) -> Option<usize> {
        self.lods
            .iter()
            .enumerate()
            .filter(|(_, lod)| zoom >= lod.min_zoom)
            .min_by(|(_, a), (_, b)| a.spacing.total_cmp(&b.spacing))
            .map(|(i, _)| i)
    }

    /// Brings the grid geometry up to date for the current camera.
    pub fn update(
        &mut self,
        gfx: &mut dyn Renderer,
        layer_name: &str,
        color: Color,
        viewport: BBox,
        zoom: f64,
    ) -> Result<GridUpdate> {
        let Some(selected) = self.select_lod(zoom) else {
            let was_valid = matches!(self.state, GridState::Valid { .. });
            self.state = GridState::Empty;
            return Ok(if was_valid {
                GridUpdate::Cleared
            } else {
                GridUpdate::Unchanged
            });
        };

        if let GridState::Valid { lod, bbox } = &self.state {
            if *lod == selected && bbox.contains(&viewport) {
                return Ok(GridUpdate::Unchanged);
            }
        }

        let spacing = self.lods[selected].spacing;
        if spacing <= 0.0 {
            warn!(spacing, "grid tier with non-positive spacing, skipping");
            return Ok(GridUpdate::Unchanged);
        }
        if !viewport.valid() {
            return Ok(GridUpdate::Unchanged);
        }

        let grown = viewport.grow_by_fraction(GROW_FRACTION);
        let batch = self.generate(gfx, layer_name, color, &grown, spacing)?;
        debug!(
            layer = layer_name,
            lod = selected,
            dots = batch.len(),
            "regenerated grid"
        );
        self.state = GridState::Valid {
            lod: selected,
            bbox: grown,
        };
        Ok(GridUpdate::Regenerated(batch))
    }

    fn generate(
        &self,
        gfx: &mut dyn Renderer,
        layer_name: &str,
        color: Color,
        bbox: &BBox,
        spacing: f64,
    ) -> Result<CommittedLayer> {
        let min = bbox.min();
        let max = bbox.max();
        let mut x0 = ((min.x - self.origin.x) / spacing).round() as i64;
        let mut x1 = ((max.x - self.origin.x) / spacing).round() as i64;
        let mut y0 = ((min.y - self.origin.y) / spacing).round() as i64;
        let mut y1 = ((max.y - self.origin.y) / spacing).round() as i64;
        // Rounding near the origin can invert the ranges.
        if x0 > x1 {
            std::mem::swap(&mut x0, &mut x1);
        }
        if y0 > y1 {
            std::mem::swap(&mut y0, &mut y1);
        }

        let radius = spacing * DOT_RADIUS_RATIO;
        gfx.start_layer(layer_name)?;
        for ix in x0..=x1 {
            for iy in y0..=y1 {
                let at = self.origin + Vec2::new(ix as f64 * spacing, iy as f64 * spacing);
                gfx.circle(&Circle::filled(at, radius, color))?;
            }
        }
        if self.origin != Vec2::ZERO {
            self.origin_marker(gfx, color, spacing)?;
        }
        gfx.end_layer()
    }

    /// Circle plus cross at a non-default grid origin.
    fn origin_marker(&self, gfx: &mut dyn Renderer, color: Color, spacing: f64) -> Result<()> {
        let r = spacing * ORIGIN_MARKER_SPACINGS;
        let width = spacing * DOT_RADIUS_RATIO;
        gfx.circle(&Circle::outline(self.origin, r, width, color))?;
        gfx.line(&Polyline::new(
            vec![
                self.origin - Vec2::new(r * 1.5, 0.0),
                self.origin + Vec2::new(r * 1.5, 0.0),
            ],
            width,
            color,
        ))?;
        gfx.line(&Polyline::new(
            vec![
                self.origin - Vec2::new(0.0, r * 1.5),
                self.origin + Vec2::new(0.0, r * 1.5),
            ],
            width,
            color,
        ))
    }
}

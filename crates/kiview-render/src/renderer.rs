//! The renderer contract and the batching recorder every backend shares.
//!
//! Primitives submitted between `start_layer` and `end_layer` are
//! transformed into world space immediately and recorded; `end_layer`
//! returns the batch as an immutable [`CommittedLayer`]. Only one layer
//! can be active at a time; that is a slot, not a stack, and starting a
//! second layer before ending the first is a usage error.

use kiview_core::error::{RenderError, Result};
use kiview_core::math::{Arc, BBox, Matrix3};
use kiview_core::shapes::{ArcShape, Circle, Color, Polygon, Polyline};

use crate::transform::RenderState;

/// A recorded world-space primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line(Polyline),
    Circle(Circle),
    Arc(ArcShape),
    Polygon(Polygon),
}

impl Primitive {
    pub fn bbox(&self) -> BBox {
        match self {
            Primitive::Line(p) => p.bbox(),
            Primitive::Circle(c) => c.bbox(),
            Primitive::Arc(a) => a.bbox(),
            Primitive::Polygon(p) => p.bbox(),
        }
    }
}

/// The immutable output of one `start_layer`/`end_layer` pairing.
///
/// A committed layer is replaced wholesale on the next paint pass, never
/// mutated item by item. `depth` is assigned by the document painter from
/// display order; the compositor and depth-buffer backends consume it.
#[derive(Debug, Clone)]
pub struct CommittedLayer {
    pub name: String,
    pub depth: f64,
    primitives: Vec<Primitive>,
    bbox: BBox,
}

impl CommittedLayer {
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// World-space bounds of everything in the batch.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }
}

/// The painter-facing renderer contract.
///
/// Backends differ in how committed batches reach the screen; recording,
/// transform handling and the active-layer slot behave identically
/// everywhere, which is why [`BatchRenderer`] is the canonical
/// implementation and backends wrap its output.
pub trait Renderer {
    /// The mutable transform stack.
    fn state(&mut self) -> &mut RenderState;

    /// Opens a layer batch. Fails if another layer is still open.
    fn start_layer(&mut self, name: &str) -> Result<()>;

    /// Commits and returns the active layer's batch.
    fn end_layer(&mut self) -> Result<CommittedLayer>;

    /// Submits a stroked polyline in the current local frame.
    fn line(&mut self, line: &Polyline) -> Result<()>;

    /// Submits a circle in the current local frame.
    fn circle(&mut self, circle: &Circle) -> Result<()>;

    /// Submits a stroked arc in the current local frame.
    fn arc(&mut self, arc: &ArcShape) -> Result<()>;

    /// Submits a filled polygon in the current local frame.
    fn polygon(&mut self, polygon: &Polygon) -> Result<()>;

    /// A cursor into the active batch, for pairing with
    /// [`Renderer::bbox_since`].
    fn mark(&self) -> usize;

    /// World-space bounds of primitives recorded since `mark`. The
    /// document painter uses this to index each item's bbox per layer
    /// without a second geometry pass.
    fn bbox_since(&self, mark: usize) -> BBox;
}

/// Records primitives into per-layer batches in world space.
#[derive(Debug, Default)]
pub struct BatchRenderer {
    state: RenderState,
    active: Option<ActiveLayer>,
    /// Total `start_layer` calls, exposed for regeneration tests.
    layers_started: usize,
}

#[derive(Debug)]
struct ActiveLayer {
    name: String,
    primitives: Vec<Primitive>,
}

impl BatchRenderer {
    pub fn new() -> Self {
        Self {
            state: RenderState::new(),
            active: None,
            layers_started: 0,
        }
    }

    /// How many layer batches have been started over this renderer's
    /// lifetime.
    pub fn layers_started(&self) -> usize {
        self.layers_started
    }

    fn active_mut(&mut self) -> Result<&mut ActiveLayer> {
        self.active
            .as_mut()
            .ok_or_else(|| RenderError::NoActiveLayer.into())
    }

    fn record(&mut self, primitive: Primitive) -> Result<()> {
        self.active_mut()?.primitives.push(primitive);
        Ok(())
    }

    /// Transforms an arc by tessellating when the current transform is
    /// not a pure translation (rotation or mirroring would distort the
    /// angular sweep otherwise).
    fn transform_arc(&self, arc: &Arc) -> Primitive {
        let m = {
            let e = &self.state_matrix().elements;
            [e[0], e[1], e[3], e[4]]
        };
        let is_translation =
            (m[0] - 1.0).abs() < 1e-12 && m[1].abs() < 1e-12 && m[2].abs() < 1e-12
                && (m[3] - 1.0).abs() < 1e-12;
        if is_translation {
            let mut moved = *arc;
            moved.center = self.state_matrix().transform(arc.center);
            Primitive::Arc(ArcShape::new(moved, Color::TRANSPARENT))
        } else {
            let points = self
                .state_matrix()
                .transform_all(arc.to_polyline_points(0.005).into_iter())
                .collect();
            Primitive::Line(Polyline::new(points, arc.width, Color::TRANSPARENT))
        }
    }

    fn state_matrix(&self) -> Matrix3 {
        self.state.matrix()
    }
}

impl Renderer for BatchRenderer {
    fn state(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn start_layer(&mut self, name: &str) -> Result<()> {
        if let Some(active) = &self.active {
            return Err(RenderError::LayerAlreadyActive {
                previous: active.name.clone(),
                requested: name.to_string(),
            }
            .into());
        }
        self.layers_started += 1;
        self.active = Some(ActiveLayer {
            name: name.to_string(),
            primitives: Vec::new(),
        });
        Ok(())
    }

    fn end_layer(&mut self) -> Result<CommittedLayer> {
        let active = self.active.take().ok_or(RenderError::NoActiveLayer)?;
        let bbox = BBox::combine(active.primitives.iter().map(Primitive::bbox));
        Ok(CommittedLayer {
            name: active.name,
            depth: 0.0,
            primitives: active.primitives,
            bbox,
        })
    }

    fn line(&mut self, line: &Polyline) -> Result<()> {
        let matrix = self.state_matrix();
        let points = matrix.transform_all(line.points.iter().copied()).collect();
        self.record(Primitive::Line(Polyline::new(
            points,
            line.width,
            line.stroke,
        )))
    }

    fn circle(&mut self, circle: &Circle) -> Result<()> {
        let matrix = self.state_matrix();
        let mut moved = circle.clone();
        moved.center = matrix.transform(circle.center);
        // Uniform scale only; the transforms this pipeline pushes are
        // rigid (rotation/mirror/translation), which preserve radii.
        self.record(Primitive::Circle(moved))
    }

    fn arc(&mut self, arc: &ArcShape) -> Result<()> {
        let mut prim = self.transform_arc(&arc.arc);
        match &mut prim {
            Primitive::Arc(shape) => shape.stroke = arc.stroke,
            Primitive::Line(line) => line.stroke = arc.stroke,
            _ => {}
        }
        self.record(prim)
    }

    fn polygon(&mut self, polygon: &Polygon) -> Result<()> {
        let matrix = self.state_matrix();
        let points = matrix
            .transform_all(polygon.points.iter().copied())
            .collect();
        self.record(Primitive::Polygon(Polygon::new(points, polygon.fill)))
    }

    fn mark(&self) -> usize {
        self.active.as_ref().map_or(0, |a| a.primitives.len())
    }

    fn bbox_since(&self, mark: usize) -> BBox {
        match &self.active {
            Some(active) => BBox::combine(
                active.primitives[mark.min(active.primitives.len())..]
                    .iter()
                    .map(Primitive::bbox),
            ),
            None => BBox::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiview_core::math::{Angle, Vec2};
    use kiview_core::Error;

    fn polyline(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(
            points.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
            0.2,
            Color::BLACK,
        )
    }

    #[test]
    fn test_single_active_layer_slot() {
        let mut gfx = BatchRenderer::new();
        gfx.start_layer("F.Cu").unwrap();
        let err = gfx.start_layer("B.Cu").unwrap_err();
        assert!(matches!(
            err,
            Error::Render(RenderError::LayerAlreadyActive { .. })
        ));
        gfx.end_layer().unwrap();
        assert!(matches!(
            gfx.end_layer().unwrap_err(),
            Error::Render(RenderError::NoActiveLayer)
        ));
    }

    #[test]
    fn test_primitives_require_active_layer() {
        let mut gfx = BatchRenderer::new();
        assert!(gfx.line(&polyline(&[(0.0, 0.0), (1.0, 0.0)])).is_err());
    }

    #[test]
    fn test_recording_applies_transform() {
        let mut gfx = BatchRenderer::new();
        gfx.start_layer("F.Cu").unwrap();
        gfx.state().push(Matrix3::translation(10.0, 20.0));
        gfx.line(&polyline(&[(0.0, 0.0), (1.0, 0.0)])).unwrap();
        gfx.state().pop().unwrap();
        let batch = gfx.end_layer().unwrap();
        match &batch.primitives()[0] {
            Primitive::Line(line) => {
                assert_eq!(line.points[0], Vec2::new(10.0, 20.0));
                assert_eq!(line.points[1], Vec2::new(11.0, 20.0));
            }
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn test_rotated_arc_is_tessellated() {
        let mut gfx = BatchRenderer::new();
        gfx.start_layer("F.SilkS").unwrap();
        gfx.state().push(Matrix3::rotation(Angle::from_degrees(45.0)));
        let arc = Arc::new(Vec2::ZERO, 1.0, Angle::ZERO, Angle::from_degrees(90.0), 0.1);
        gfx.arc(&ArcShape::new(arc, Color::BLACK)).unwrap();
        gfx.state().pop().unwrap();
        let batch = gfx.end_layer().unwrap();
        assert!(matches!(batch.primitives()[0], Primitive::Line(_)));
    }

    #[test]
    fn test_mark_and_bbox_since() {
        let mut gfx = BatchRenderer::new();
        gfx.start_layer("F.Cu").unwrap();
        gfx.line(&polyline(&[(100.0, 100.0), (101.0, 100.0)])).unwrap();
        let mark = gfx.mark();
        gfx.line(&polyline(&[(0.0, 0.0), (2.0, 2.0)])).unwrap();
        let bbox = gfx.bbox_since(mark);
        // Only the second line counts, stroke adds 0.1 on each side.
        assert!((bbox.x - -0.1).abs() < 1e-9);
        assert!((bbox.w - 2.2).abs() < 1e-9);
        gfx.end_layer().unwrap();
    }

    #[test]
    fn test_committed_bbox() {
        let mut gfx = BatchRenderer::new();
        gfx.start_layer("Edge.Cuts").unwrap();
        gfx.circle(&Circle::filled(Vec2::new(5.0, 5.0), 1.0, Color::WHITE))
            .unwrap();
        let batch = gfx.end_layer().unwrap();
        assert_eq!(batch.bbox(), BBox::new(4.0, 4.0, 2.0, 2.0));
        assert_eq!(batch.len(), 1);
    }
}

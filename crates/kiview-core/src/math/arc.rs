use serde::{Deserialize, Serialize};

use super::{Angle, BBox, Vec2};

/// A circular arc described by center, radius and start/end angles.
///
/// Angles follow the document convention: measured from the positive X
/// axis, counter-clockwise positive. The arc sweeps from `start_angle` to
/// `end_angle` counter-clockwise; a clockwise source arc is normalized by
/// swapping endpoints at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Vec2,
    pub radius: f64,
    pub start_angle: Angle,
    pub end_angle: Angle,
    pub width: f64,
}

impl Arc {
    pub fn new(center: Vec2, radius: f64, start_angle: Angle, end_angle: Angle, width: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            end_angle,
            width,
        }
    }

    /// Builds an arc passing through three points, as stored for board
    /// track arcs (start, midpoint, end).
    ///
    /// Returns `None` for collinear points (no finite circumcircle).
    pub fn from_three_points(start: Vec2, mid: Vec2, end: Vec2, width: f64) -> Option<Self> {
        let d = 2.0 * (start.x * (mid.y - end.y) + mid.x * (end.y - start.y)
            + end.x * (start.y - mid.y));
        if d.abs() < 1e-12 {
            return None;
        }
        let sq = |v: Vec2| v.x * v.x + v.y * v.y;
        let ux = (sq(start) * (mid.y - end.y) + sq(mid) * (end.y - start.y)
            + sq(end) * (start.y - mid.y))
            / d;
        let uy = (sq(start) * (end.x - mid.x) + sq(mid) * (start.x - end.x)
            + sq(end) * (mid.x - start.x))
            / d;
        let center = Vec2::new(ux, uy);
        let radius = center.distance_to(start);

        let a0 = (start - center).angle();
        let a_mid = (mid - center).angle();
        let a1 = (end - center).angle();

        // Ensure the sweep from start to end passes through the midpoint.
        let sweep = |from: Angle, to: Angle| (to - from).normalized().degrees();
        let (start_angle, end_angle) = if sweep(a0, a_mid) <= sweep(a0, a1) {
            (a0, a1)
        } else {
            (a1, a0)
        };

        Some(Self::new(center, radius, start_angle, end_angle, width))
    }

    /// The counter-clockwise sweep, in `[0, 360)` degrees.
    pub fn arc_angle(&self) -> Angle {
        (self.end_angle - self.start_angle).normalized()
    }

    pub fn start_point(&self) -> Vec2 {
        self.point_at(self.start_angle)
    }

    pub fn end_point(&self) -> Vec2 {
        self.point_at(self.end_angle)
    }

    pub fn point_at(&self, angle: Angle) -> Vec2 {
        self.center + Vec2::new(angle.cos(), angle.sin()) * self.radius
    }

    /// Tessellates into a polyline whose chord error stays below
    /// `max_error` document units.
    pub fn to_polyline_points(&self, max_error: f64) -> Vec<Vec2> {
        let sweep = self.arc_angle().radians().abs();
        let sweep = if sweep < 1e-9 {
            std::f64::consts::TAU
        } else {
            sweep
        };

        // Chord error e = r * (1 - cos(step/2)); solve for step.
        let max_error = max_error.max(1e-6).min(self.radius.max(1e-6));
        let step = 2.0 * (1.0 - max_error / self.radius.max(1e-9)).clamp(-1.0, 1.0).acos();
        let segments = ((sweep / step.max(1e-3)).ceil() as usize).clamp(4, 256);

        let mut points = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            let t = i as f64 / segments as f64;
            let angle = Angle::from_radians(self.start_angle.radians() + sweep * t);
            points.push(self.point_at(angle));
        }
        points
    }

    /// Bounding box of the tessellated arc, including stroke width.
    pub fn bbox(&self) -> BBox {
        BBox::from_points(self.to_polyline_points(0.01)).grow(self.width / 2.0)
    }
}

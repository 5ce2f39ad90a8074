use std::ops::Mul;

use serde::{Deserialize, Serialize};

use super::{Angle, Vec2};

/// A 3x3 matrix representing a 2D affine transform, row-major.
///
/// The bottom row is always `[0, 0, 1]` for the transforms this crate
/// constructs, but `multiply` and `inverse` work on the full matrix so
/// composed transforms stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix3 {
    pub elements: [f64; 9],
}

impl Matrix3 {
    pub const IDENTITY: Matrix3 = Matrix3 {
        elements: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    pub fn new(elements: [f64; 9]) -> Self {
        Self { elements }
    }

    pub fn translation(x: f64, y: f64) -> Self {
        Self::new([1.0, 0.0, x, 0.0, 1.0, y, 0.0, 0.0, 1.0])
    }

    pub fn rotation(angle: Angle) -> Self {
        let (s, c) = angle.radians().sin_cos();
        Self::new([c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0])
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self::new([sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0])
    }

    /// Mirror across the Y axis (flips X coordinates).
    pub fn mirror_x() -> Self {
        Self::scaling(-1.0, 1.0)
    }

    /// Mirror across the X axis (flips Y coordinates).
    pub fn mirror_y() -> Self {
        Self::scaling(1.0, -1.0)
    }

    /// Builds position + rotation (+ optional mirror) in the order used
    /// when descending into footprint and symbol instances.
    pub fn at(position: Vec2, rotation: Angle) -> Self {
        Self::translation(position.x, position.y) * Self::rotation(rotation)
    }

    /// Matrix product `self * other` (apply `other` first).
    pub fn multiply(&self, other: &Matrix3) -> Matrix3 {
        let a = &self.elements;
        let b = &other.elements;
        let mut m = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                m[row * 3 + col] = a[row * 3] * b[col]
                    + a[row * 3 + 1] * b[3 + col]
                    + a[row * 3 + 2] * b[6 + col];
            }
        }
        Matrix3::new(m)
    }

    /// Transforms a point (w = 1).
    pub fn transform(&self, p: Vec2) -> Vec2 {
        let e = &self.elements;
        Vec2::new(
            e[0] * p.x + e[1] * p.y + e[2],
            e[3] * p.x + e[4] * p.y + e[5],
        )
    }

    /// Transforms a direction vector (w = 0, ignores translation).
    pub fn transform_vector(&self, v: Vec2) -> Vec2 {
        let e = &self.elements;
        Vec2::new(e[0] * v.x + e[1] * v.y, e[3] * v.x + e[4] * v.y)
    }

    pub fn transform_all<'a>(
        &'a self,
        points: impl Iterator<Item = Vec2> + 'a,
    ) -> impl Iterator<Item = Vec2> + 'a {
        points.map(move |p| self.transform(p))
    }

    pub fn determinant(&self) -> f64 {
        let e = &self.elements;
        e[0] * (e[4] * e[8] - e[5] * e[7]) - e[1] * (e[3] * e[8] - e[5] * e[6])
            + e[2] * (e[3] * e[7] - e[4] * e[6])
    }

    /// Inverse matrix, or `None` if singular.
    pub fn try_inverse(&self) -> Option<Matrix3> {
        let det = self.determinant();
        if det.abs() < 1e-12 {
            return None;
        }
        let e = &self.elements;
        let inv_det = 1.0 / det;
        Some(Matrix3::new([
            (e[4] * e[8] - e[5] * e[7]) * inv_det,
            (e[2] * e[7] - e[1] * e[8]) * inv_det,
            (e[1] * e[5] - e[2] * e[4]) * inv_det,
            (e[5] * e[6] - e[3] * e[8]) * inv_det,
            (e[0] * e[8] - e[2] * e[6]) * inv_det,
            (e[2] * e[3] - e[0] * e[5]) * inv_det,
            (e[3] * e[7] - e[4] * e[6]) * inv_det,
            (e[1] * e[6] - e[0] * e[7]) * inv_det,
            (e[0] * e[4] - e[1] * e[3]) * inv_det,
        ]))
    }

    /// The translation component.
    pub fn translation_part(&self) -> Vec2 {
        Vec2::new(self.elements[2], self.elements[5])
    }
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;
    fn mul(self, rhs: Matrix3) -> Matrix3 {
        self.multiply(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a.x - b.x).abs() < 1e-9, "{a:?} != {b:?}");
        assert!((a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_translate_then_rotate() {
        // at() rotates in the local frame, then places at the position.
        let m = Matrix3::at(Vec2::new(10.0, 0.0), Angle::from_degrees(90.0));
        assert_close(m.transform(Vec2::new(1.0, 0.0)), Vec2::new(10.0, 1.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = Matrix3::at(Vec2::new(3.0, -7.0), Angle::from_degrees(33.0))
            * Matrix3::scaling(2.0, 2.0);
        let inv = m.try_inverse().unwrap();
        let p = Vec2::new(5.5, 1.25);
        assert_close(inv.transform(m.transform(p)), p);
    }

    #[test]
    fn test_mirror_x() {
        let m = Matrix3::mirror_x();
        assert_close(m.transform(Vec2::new(2.0, 3.0)), Vec2::new(-2.0, 3.0));
        assert!(m.determinant() < 0.0);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Matrix3::scaling(0.0, 1.0).try_inverse().is_none());
    }
}

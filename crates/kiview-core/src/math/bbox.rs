use serde::{Deserialize, Serialize};

use super::{Matrix3, Vec2};

/// An axis-aligned bounding box.
///
/// A box with non-positive width or height is "invalid" and acts as the
/// identity for `union`, which lets accumulation loops start from
/// `BBox::default()` without special-casing the first item.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, a.x.max(b.x) - x, a.y.max(b.y) - y)
    }

    /// Smallest box containing every point, or an invalid box for an
    /// empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut any = false;
        for p in points {
            any = true;
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if !any {
            return BBox::default();
        }
        BBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn valid(&self) -> bool {
        self.w > 0.0 && self.h > 0.0
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    /// Union of two boxes. Invalid boxes act as the identity.
    pub fn union(&self, other: &BBox) -> BBox {
        match (self.valid(), other.valid()) {
            (false, false) => BBox::default(),
            (true, false) => *self,
            (false, true) => *other,
            (true, true) => {
                let min_x = self.x.min(other.x);
                let min_y = self.y.min(other.y);
                let max_x = (self.x + self.w).max(other.x + other.w);
                let max_y = (self.y + self.h).max(other.y + other.h);
                BBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
            }
        }
    }

    /// Union of any number of boxes.
    pub fn combine(boxes: impl IntoIterator<Item = BBox>) -> BBox {
        boxes
            .into_iter()
            .fold(BBox::default(), |acc, b| acc.union(&b))
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        self.valid()
            && p.x >= self.x
            && p.x <= self.x + self.w
            && p.y >= self.y
            && p.y <= self.y + self.h
    }

    pub fn contains(&self, other: &BBox) -> bool {
        self.contains_point(other.min()) && self.contains_point(other.max())
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.valid()
            && other.valid()
            && self.x <= other.x + other.w
            && self.x + self.w >= other.x
            && self.y <= other.y + other.h
            && self.y + self.h >= other.y
    }

    /// Grows outward by `amount` on every side.
    pub fn grow(&self, amount: f64) -> BBox {
        BBox::new(
            self.x - amount,
            self.y - amount,
            self.w + amount * 2.0,
            self.h + amount * 2.0,
        )
    }

    /// Grows outward by a fraction of the larger dimension, used to
    /// amortize regeneration when a viewport pans slightly.
    pub fn grow_by_fraction(&self, fraction: f64) -> BBox {
        self.grow(self.w.max(self.h) * fraction)
    }

    /// Bounding box of the four transformed corners.
    pub fn transform(&self, matrix: &Matrix3) -> BBox {
        if !self.valid() {
            return *self;
        }
        BBox::from_points(
            [
                Vec2::new(self.x, self.y),
                Vec2::new(self.x + self.w, self.y),
                Vec2::new(self.x, self.y + self.h),
                Vec2::new(self.x + self.w, self.y + self.h),
            ]
            .into_iter()
            .map(|p| matrix.transform(p)),
        )
    }
}

//! Drawable shape records produced by painters and consumed by renderer
//! backends.
//!
//! These are dumb data carriers: a painter decides geometry and color, a
//! backend decides rasterization. The only behavior they have is bounding
//! box computation, which the painter uses to build the hit-test index.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::math::{Arc, BBox, Vec2};

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#')?;
        let byte = |h: &str| u8::from_str_radix(h, 16).ok();
        match s.len() {
            3 => {
                let r = byte(&s[0..1])?;
                let g = byte(&s[1..2])?;
                let b = byte(&s[2..3])?;
                Some(Self::from_rgba8(r * 17, g * 17, b * 17, 255))
            }
            6 => Some(Self::from_rgba8(
                byte(&s[0..2])?,
                byte(&s[2..4])?,
                byte(&s[4..6])?,
                255,
            )),
            8 => Some(Self::from_rgba8(
                byte(&s[0..2])?,
                byte(&s[2..4])?,
                byte(&s[4..6])?,
                byte(&s[6..8])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                c(self.r),
                c(self.g),
                c(self.b),
                c(self.a)
            )
        }
    }

    pub fn with_alpha(&self, a: f32) -> Self {
        Self { a, ..*self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| D::Error::custom(format!("invalid color {s:?}")))
    }
}

/// A circle, filled when `fill` is set and stroked when `width > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f64,
    pub width: f64,
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
}

impl Circle {
    pub fn filled(center: Vec2, radius: f64, fill: Color) -> Self {
        Self {
            center,
            radius,
            width: 0.0,
            stroke: None,
            fill: Some(fill),
        }
    }

    pub fn outline(center: Vec2, radius: f64, width: f64, stroke: Color) -> Self {
        Self {
            center,
            radius,
            width,
            stroke: Some(stroke),
            fill: None,
        }
    }

    pub fn bbox(&self) -> BBox {
        let r = self.radius + self.width / 2.0;
        BBox::new(self.center.x - r, self.center.y - r, r * 2.0, r * 2.0)
    }
}

/// A stroked arc.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcShape {
    pub arc: Arc,
    pub stroke: Color,
}

impl ArcShape {
    pub fn new(arc: Arc, stroke: Color) -> Self {
        Self { arc, stroke }
    }

    pub fn bbox(&self) -> BBox {
        self.arc.bbox()
    }
}

/// An open stroked path.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Vec2>,
    pub width: f64,
    pub stroke: Color,
}

impl Polyline {
    pub fn new(points: Vec<Vec2>, width: f64, stroke: Color) -> Self {
        Self {
            points,
            width,
            stroke,
        }
    }

    pub fn bbox(&self) -> BBox {
        BBox::from_points(self.points.iter().copied()).grow(self.width / 2.0)
    }
}

/// A filled closed polygon. Point order is not significant; backends fill
/// with the non-zero rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Vec2>,
    pub fill: Color,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>, fill: Color) -> Self {
        Self { points, fill }
    }

    pub fn bbox(&self) -> BBox {
        BBox::from_points(self.points.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = Color::from_hex("#ff8000").unwrap();
        assert_eq!(c.to_hex(), "#ff8000");
        let c = Color::from_hex("#ff800080").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(Color::from_hex("#fff").unwrap(), Color::WHITE);
    }

    #[test]
    fn test_invalid_hex() {
        assert!(Color::from_hex("red").is_none());
        assert!(Color::from_hex("#12345").is_none());
    }

    #[test]
    fn test_circle_bbox_includes_stroke() {
        let c = Circle::outline(Vec2::ZERO, 1.0, 0.2, Color::BLACK);
        assert_eq!(c.bbox(), BBox::new(-1.1, -1.1, 2.2, 2.2));
    }

    #[test]
    fn test_polyline_bbox() {
        let p = Polyline::new(
            vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 4.0)],
            1.0,
            Color::BLACK,
        );
        assert_eq!(p.bbox(), BBox::new(-0.5, -0.5, 3.0, 5.0));
    }
}

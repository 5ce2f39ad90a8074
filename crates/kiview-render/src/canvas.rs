//! Software canvas backend.
//!
//! Composites committed layer batches into a tiny-skia pixmap with
//! anti-aliased 2D rendering, and exports the result as an image buffer
//! for display in a UI.

use image::{Rgb, RgbImage};
use tiny_skia::{BlendMode, FillRule, Paint, PathBuilder, Pixmap, Stroke, Transform};
use tracing::debug;

use kiview_core::error::{RenderError, Result};
use kiview_core::math::Matrix3;
use kiview_core::shapes::Color;

use crate::renderer::{CommittedLayer, Primitive};

/// How a batch composites over what is already on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Blend {
    /// Ordinary source-over alpha.
    #[default]
    Alpha,
    /// Additive, used for the highlight overlay so highlights stay
    /// readable over the geometry they cover.
    Additive,
}

impl Blend {
    fn mode(self) -> BlendMode {
        match self {
            Blend::Alpha => BlendMode::SourceOver,
            Blend::Additive => BlendMode::Plus,
        }
    }
}

/// Composites committed batches back-to-front into a pixel surface.
pub struct CanvasCompositor {
    pixmap: Pixmap,
}

fn to_skia_color(c: Color, opacity: f32) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        c.r.clamp(0.0, 1.0),
        c.g.clamp(0.0, 1.0),
        c.b.clamp(0.0, 1.0),
        (c.a * opacity).clamp(0.0, 1.0),
    )
    .unwrap_or(tiny_skia::Color::TRANSPARENT)
}

fn to_skia_transform(m: &Matrix3) -> Transform {
    let e = &m.elements;
    // Row-major affine [a b c; d e f] maps to tiny-skia's
    // (sx, ky, kx, sy, tx, ty) column order.
    Transform::from_row(
        e[0] as f32,
        e[3] as f32,
        e[1] as f32,
        e[4] as f32,
        e[2] as f32,
        e[5] as f32,
    )
}

impl CanvasCompositor {
    /// Creates a compositor with a surface of the given pixel size.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceCreation { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fills the whole surface, discarding previous contents.
    pub fn clear(&mut self, background: Color) {
        self.pixmap.fill(to_skia_color(background, 1.0));
    }

    /// Draws one committed batch through a world-to-screen transform,
    /// scaling every primitive's alpha by `opacity`.
    pub fn draw_layer(&mut self, layer: &CommittedLayer, matrix: &Matrix3, opacity: f32) {
        self.draw_layer_blended(layer, matrix, opacity, Blend::Alpha);
    }

    /// Like [`CanvasCompositor::draw_layer`], with an explicit blend mode.
    pub fn draw_layer_blended(
        &mut self,
        layer: &CommittedLayer,
        matrix: &Matrix3,
        opacity: f32,
        blend: Blend,
    ) {
        if opacity <= 0.0 || layer.is_empty() {
            return;
        }
        debug!(
            layer = layer.name.as_str(),
            primitives = layer.len(),
            "compositing layer"
        );
        let transform = to_skia_transform(matrix);
        for primitive in layer.primitives() {
            self.draw_primitive(primitive, transform, opacity, blend);
        }
    }

    fn draw_primitive(
        &mut self,
        primitive: &Primitive,
        transform: Transform,
        opacity: f32,
        blend: Blend,
    ) {
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.blend_mode = blend.mode();

        match primitive {
            Primitive::Line(line) => {
                if line.points.len() < 2 {
                    return;
                }
                let mut pb = PathBuilder::new();
                pb.move_to(line.points[0].x as f32, line.points[0].y as f32);
                for p in &line.points[1..] {
                    pb.line_to(p.x as f32, p.y as f32);
                }
                let Some(path) = pb.finish() else { return };
                paint.set_color(to_skia_color(line.stroke, opacity));
                let stroke = Stroke {
                    width: line.width.max(0.01) as f32,
                    line_cap: tiny_skia::LineCap::Round,
                    ..Default::default()
                };
                self.pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            }
            Primitive::Circle(circle) => {
                let Some(path) = PathBuilder::from_circle(
                    circle.center.x as f32,
                    circle.center.y as f32,
                    circle.radius.max(1e-4) as f32,
                ) else {
                    return;
                };
                if let Some(fill) = circle.fill {
                    paint.set_color(to_skia_color(fill, opacity));
                    self.pixmap
                        .fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
                if let Some(stroke_color) = circle.stroke {
                    paint.set_color(to_skia_color(stroke_color, opacity));
                    let stroke = Stroke {
                        width: circle.width.max(0.01) as f32,
                        ..Default::default()
                    };
                    self.pixmap.stroke_path(&path, &paint, &stroke, transform, None);
                }
            }
            Primitive::Arc(shape) => {
                let points = shape.arc.to_polyline_points(0.01);
                if points.len() < 2 {
                    return;
                }
                let mut pb = PathBuilder::new();
                pb.move_to(points[0].x as f32, points[0].y as f32);
                for p in &points[1..] {
                    pb.line_to(p.x as f32, p.y as f32);
                }
                let Some(path) = pb.finish() else { return };
                paint.set_color(to_skia_color(shape.stroke, opacity));
                let stroke = Stroke {
                    width: shape.arc.width.max(0.01) as f32,
                    line_cap: tiny_skia::LineCap::Round,
                    ..Default::default()
                };
                self.pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            }
            Primitive::Polygon(polygon) => {
                if polygon.points.len() < 3 {
                    return;
                }
                let mut pb = PathBuilder::new();
                pb.move_to(polygon.points[0].x as f32, polygon.points[0].y as f32);
                for p in &polygon.points[1..] {
                    pb.line_to(p.x as f32, p.y as f32);
                }
                pb.close();
                let Some(path) = pb.finish() else { return };
                paint.set_color(to_skia_color(polygon.fill, opacity));
                self.pixmap
                    .fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
    }

    /// Exports the surface as an RGB image buffer.
    pub fn to_image(&self) -> RgbImage {
        let mut img = RgbImage::new(self.pixmap.width(), self.pixmap.height());
        for (i, pixel) in self.pixmap.pixels().iter().enumerate() {
            let x = i as u32 % self.pixmap.width();
            let y = i as u32 / self.pixmap.width();
            img.put_pixel(x, y, Rgb([pixel.red(), pixel.green(), pixel.blue()]));
        }
        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{BatchRenderer, Renderer};
    use kiview_core::math::Vec2;
    use kiview_core::shapes::Polygon;

    fn committed_square(color: Color) -> CommittedLayer {
        let mut gfx = BatchRenderer::new();
        gfx.start_layer("test").unwrap();
        gfx.polygon(&Polygon::new(
            vec![
                Vec2::new(10.0, 10.0),
                Vec2::new(50.0, 10.0),
                Vec2::new(50.0, 50.0),
                Vec2::new(10.0, 50.0),
            ],
            color,
        ))
        .unwrap();
        gfx.end_layer().unwrap()
    }

    #[test]
    fn test_surface_creation_failure() {
        assert!(CanvasCompositor::new(0, 0).is_err());
    }

    #[test]
    fn test_polygon_fills_pixels() {
        let mut canvas = CanvasCompositor::new(64, 64).unwrap();
        canvas.clear(Color::BLACK);
        let layer = committed_square(Color::new(1.0, 1.0, 1.0, 1.0));
        canvas.draw_layer(&layer, &Matrix3::IDENTITY, 1.0);
        let img = canvas.to_image();
        assert_eq!(img.get_pixel(30, 30).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(60, 60).0, [0, 0, 0]);
    }

    #[test]
    fn test_zero_opacity_draws_nothing() {
        let mut canvas = CanvasCompositor::new(64, 64).unwrap();
        canvas.clear(Color::BLACK);
        let layer = committed_square(Color::WHITE);
        canvas.draw_layer(&layer, &Matrix3::IDENTITY, 0.0);
        assert_eq!(canvas.to_image().get_pixel(30, 30).0, [0, 0, 0]);
    }

    #[test]
    fn test_additive_blend_brightens() {
        let mut canvas = CanvasCompositor::new(64, 64).unwrap();
        canvas.clear(Color::new(0.5, 0.5, 0.5, 1.0));
        let layer = committed_square(Color::new(0.5, 0.0, 0.0, 1.0));
        canvas.draw_layer_blended(&layer, &Matrix3::IDENTITY, 1.0, Blend::Additive);
        let p = canvas.to_image().get_pixel(30, 30).0;
        assert!(p[0] > 200, "red channel sums with the background");
        assert!((126..=129).contains(&p[1]), "green keeps the background");
    }

    #[test]
    fn test_transform_moves_content() {
        let mut canvas = CanvasCompositor::new(128, 128).unwrap();
        canvas.clear(Color::BLACK);
        let layer = committed_square(Color::WHITE);
        canvas.draw_layer(&layer, &Matrix3::translation(60.0, 60.0), 1.0);
        let img = canvas.to_image();
        assert_eq!(img.get_pixel(30, 30).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(90, 90).0, [255, 255, 255]);
    }
}

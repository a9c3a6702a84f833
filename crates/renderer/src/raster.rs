use std::path::Path;

use anyhow::{Context, Result};
use fxconfig::Rgb;
use image::{Rgba as Pixel, RgbaImage};

use crate::surface::Surface2d;
use crate::types::{Point, Rect, Rgba, Viewport};

/// CPU rasteriser drawing into an opaque RGBA8 image with source-over
/// blending and one pixel of edge antialiasing.
pub struct RasterSurface {
    image: RgbaImage,
    background: Rgb,
}

impl RasterSurface {
    pub fn new(viewport: Viewport, background: Rgb) -> Self {
        let (width, height) = viewport.pixel_size();
        let mut surface = Self {
            image: RgbaImage::new(width, height),
            background,
        };
        surface.clear();
        surface
    }

    pub fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.pixel_size();
        if self.image.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
            self.clear();
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw RGBA8 rows, tightly packed.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write frame to {}", path.display()))
    }

    fn blend(&mut self, x: i64, y: i64, color: Rgba, coverage: f32) {
        let (width, height) = self.image.dimensions();
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return;
        }
        let alpha = color.a * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        let mix = |dst: u8, src: u8| -> u8 {
            (src as f32 * alpha + dst as f32 * (1.0 - alpha)).round() as u8
        };
        pixel.0 = [
            mix(pixel.0[0], color.r),
            mix(pixel.0[1], color.g),
            mix(pixel.0[2], color.b),
            255,
        ];
    }

    /// Visits every pixel whose centre lies within `margin` of the box.
    fn for_each_in_box(
        &mut self,
        min: Point,
        max: Point,
        mut coverage: impl FnMut(Point) -> f32,
        color: Rgba,
    ) {
        let (width, height) = self.image.dimensions();
        let x0 = (min.x.floor() as i64).max(0);
        let y0 = (min.y.floor() as i64).max(0);
        let x1 = (max.x.ceil() as i64).min(width as i64 - 1);
        let y1 = (max.y.ceil() as i64).min(height as i64 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                let amount = coverage(center);
                if amount > 0.0 {
                    self.blend(x, y, color, amount);
                }
            }
        }
    }
}

impl Surface2d for RasterSurface {
    fn viewport(&self) -> Viewport {
        self.image.dimensions().into()
    }

    fn clear(&mut self) {
        let fill = Pixel([self.background.r, self.background.g, self.background.b, 255]);
        for pixel in self.image.pixels_mut() {
            *pixel = fill;
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let reach = radius + 1.0;
        self.for_each_in_box(
            center.offset(-reach, -reach),
            center.offset(reach, reach),
            |pixel| radius + 0.5 - pixel.distance(center),
            color,
        );
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, width: f32, color: Rgba) {
        let half = width.max(1.0) / 2.0;
        let reach = radius + half + 1.0;
        self.for_each_in_box(
            center.offset(-reach, -reach),
            center.offset(reach, reach),
            |pixel| half + 0.5 - (pixel.distance(center) - radius).abs(),
            color,
        );
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgba) {
        let half = width.max(1.0) / 2.0;
        let reach = half + 1.0;
        let min = Point::new(from.x.min(to.x) - reach, from.y.min(to.y) - reach);
        let max = Point::new(from.x.max(to.x) + reach, from.y.max(to.y) + reach);
        self.for_each_in_box(
            min,
            max,
            |pixel| half + 0.5 - distance_to_segment(pixel, from, to),
            color,
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let min = Point::new(rect.x, rect.y);
        let max = Point::new(rect.x + rect.width, rect.y + rect.height);
        self.for_each_in_box(
            min,
            max,
            |pixel| {
                let inside_x = (pixel.x - min.x).min(max.x - pixel.x) + 0.5;
                let inside_y = (pixel.y - min.y).min(max.y - pixel.y) + 0.5;
                inside_x.min(inside_y).min(1.0)
            },
            color,
        );
    }

    fn fill_quad(&mut self, corners: [Point; 4], color: Rgba) {
        let twice_area: f32 = edges(&corners).map(|(a, b)| a.x * b.y - b.x * a.y).sum();
        if twice_area.abs() <= f32::EPSILON {
            return;
        }
        let winding = twice_area.signum();
        let min = corners
            .iter()
            .fold(Point::new(f32::INFINITY, f32::INFINITY), |acc, p| {
                Point::new(acc.x.min(p.x), acc.y.min(p.y))
            });
        let max = corners
            .iter()
            .fold(Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY), |acc, p| {
                Point::new(acc.x.max(p.x), acc.y.max(p.y))
            });
        self.for_each_in_box(
            min,
            max,
            |pixel| {
                let inside = edges(&corners)
                    .map(|(a, b)| winding * signed_edge_distance(pixel, a, b))
                    .fold(f32::INFINITY, f32::min);
                (inside + 0.5).min(1.0)
            },
            color,
        );
    }
}

fn edges(corners: &[Point; 4]) -> impl Iterator<Item = (Point, Point)> + '_ {
    (0..corners.len()).map(move |i| (corners[i], corners[(i + 1) % corners.len()]))
}

/// Distance from `point` to the line through `from` and `to`, positive on
/// the left of the direction of travel.
fn signed_edge_distance(point: Point, from: Point, to: Point) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = dx.hypot(dy);
    if length <= f32::EPSILON {
        return f32::INFINITY;
    }
    (dx * (point.y - from.y) - dy * (point.x - from.x)) / length
}

fn distance_to_segment(point: Point, from: Point, to: Point) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq <= f32::EPSILON {
        return point.distance(from);
    }
    let t = (((point.x - from.x) * dx + (point.y - from.y) * dy) / length_sq).clamp(0.0, 1.0);
    point.distance(Point::new(from.x + dx * t, from.y + dy * t))
}

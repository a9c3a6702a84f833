use fxconfig::Rgb;

/// Size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A viewport with no area cannot host a surface.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whole-pixel dimensions, never smaller than 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.max(1.0).round() as u32,
            self.height.max(1.0).round() as u32,
        )
    }
}

impl From<(u32, u32)> for Viewport {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        [
            Point::new(self.x, self.y),
            Point::new(right, self.y),
            Point::new(right, bottom),
            Point::new(self.x, bottom),
        ]
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grows the rectangle around its centre.
    pub fn scale(&self, factor: f32) -> Rect {
        let width = self.width * factor;
        let height = self.height * factor;
        let center = self.center();
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }
}

/// Straight (non-premultiplied) colour with a floating point alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn from_rgb(color: Rgb, alpha: f32) -> Self {
        Self::new(color.r, color.g, color.b, alpha)
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self::new(self.r, self.g, self.b, alpha)
    }
}

/// How the renderer should present frames.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderMode {
    /// Interactive preview window driven by `winit`.
    Windowed,
    /// Render `frames` frames off-screen and write them as PNG files.
    Export(ExportOptions),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Output path. With more than one frame a zero-padded index is appended
    /// to the file stem.
    pub path: std::path::PathBuf,
    pub frames: u32,
    /// Fixed frame interval used by the simulated clock.
    pub frame_interval: std::time::Duration,
    /// Pointer position replayed before every frame, if any.
    pub pointer: Option<Point>,
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window or surface size in physical pixels.
    pub surface_size: (u32, u32),
    pub mode: RenderMode,
    /// Optional FPS cap; `None` renders on every redraw.
    pub target_fps: Option<f32>,
    /// Colour the surface is cleared to before every frame.
    pub background: Rgb,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            mode: RenderMode::Windowed,
            target_fps: None,
            background: Rgb::new(10, 10, 15),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_viewports_are_detected() {
        assert!(Viewport::new(0.0, 720.0).is_empty());
        assert!(Viewport::new(f32::NAN, 720.0).is_empty());
        assert!(!Viewport::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn rect_scale_keeps_center() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        let scaled = rect.scale(1.1);
        assert!((scaled.center().x - rect.center().x).abs() < 1e-4);
        assert!((scaled.center().y - rect.center().y).abs() < 1e-4);
        assert!((scaled.width - 110.0).abs() < 1e-4);
    }

    #[test]
    fn alpha_is_clamped() {
        assert_eq!(Rgba::new(1, 2, 3, 1.5).a, 1.0);
        assert_eq!(Rgba::new(1, 2, 3, -0.5).a, 0.0);
    }
}

use crate::types::{Point, Rect, Rgba, Viewport};

/// Immediate-mode 2D drawing target, the subset of a canvas context the
/// effects need.
pub trait Surface2d {
    fn viewport(&self) -> Viewport;
    /// Resets every pixel to the surface background.
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Point, radius: f32, width: f32, color: Rgba);
    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgba);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    /// Fills a convex quadrilateral given in either winding order.
    fn fill_quad(&mut self, corners: [Point; 4], color: Rgba);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillCircle {
        center: Point,
        radius: f32,
        color: Rgba,
    },
    StrokeCircle {
        center: Point,
        radius: f32,
        width: f32,
        color: Rgba,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Rgba,
    },
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    FillQuad {
        corners: [Point; 4],
        color: Rgba,
    },
}

/// Surface that keeps the commands of the current frame instead of drawing
/// them. `clear` drops everything recorded so far.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    viewport: Viewport,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Line { .. }))
    }

    pub fn quads(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillQuad { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::FillCircle { .. }))
    }
}

impl Surface2d for RecordingSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            width,
            color,
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_quad(&mut self, corners: [Point; 4], color: Rgba) {
        self.commands.push(DrawCommand::FillQuad { corners, color });
    }
}

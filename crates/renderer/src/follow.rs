//! Exponential smoothing followers used by the cursor ring and the parallax
//! backdrop.

use fxconfig::ParallaxSettings;

use crate::types::{Point, Viewport};

pub fn lerp(start: f32, end: f32, factor: f32) -> f32 {
    start + (end - start) * factor
}

/// One-axis follower that closes a fixed fraction of the gap to its target
/// on every [`advance`](Follower::advance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Follower {
    current: f32,
    target: f32,
    factor: f32,
}

impl Follower {
    pub fn new(initial: f32, factor: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            factor,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn advance(&mut self) -> f32 {
        self.current = lerp(self.current, self.target, self.factor);
        self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Follower2 {
    x: Follower,
    y: Follower,
}

impl Follower2 {
    pub fn new(initial: Point, factor: f32) -> Self {
        Self {
            x: Follower::new(initial.x, factor),
            y: Follower::new(initial.y, factor),
        }
    }

    pub fn current(&self) -> Point {
        Point::new(self.x.current(), self.y.current())
    }

    pub fn target(&self) -> Point {
        Point::new(self.x.target(), self.y.target())
    }

    pub fn set_target(&mut self, target: Point) {
        self.x.set_target(target.x);
        self.y.set_target(target.y);
    }

    pub fn advance(&mut self) -> Point {
        Point::new(self.x.advance(), self.y.advance())
    }
}

/// Pointer-driven offset shared by the background blobs. Each blob moves by
/// the same smoothed offset scaled by its own multiplier.
#[derive(Debug, Clone)]
pub struct Parallax {
    follower: Follower2,
    amplitude: f32,
    step: f32,
    viewport: Viewport,
}

impl Parallax {
    pub fn new(settings: &ParallaxSettings, viewport: Viewport) -> Self {
        Self {
            follower: Follower2::new(Point::ORIGIN, settings.smoothing),
            amplitude: settings.amplitude,
            step: settings.blob_step,
            viewport,
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn on_pointer(&mut self, pointer: Point) {
        if self.viewport.is_empty() {
            return;
        }
        self.follower.set_target(Point::new(
            (pointer.x / self.viewport.width - 0.5) * self.amplitude,
            (pointer.y / self.viewport.height - 0.5) * self.amplitude,
        ));
    }

    pub fn advance(&mut self) -> Point {
        self.follower.advance()
    }

    pub fn offset(&self) -> Point {
        self.follower.current()
    }

    pub fn blob_offset(&self, index: usize) -> Point {
        let scale = (index + 1) as f32 * self.step;
        let offset = self.offset();
        Point::new(offset.x * scale, offset.y * scale)
    }
}

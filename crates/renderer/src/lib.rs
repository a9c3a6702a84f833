//! Background effects renderer for the portfolio page.
//!
//! The crate simulates the particle field, the pointer followers and the hover
//! effects, and draws them through the [`Surface2d`] trait. Frames are
//! rasterised on the CPU and either presented in a preview window or written
//! to PNG files:
//!
//! ```text
//!   folio (CLI)
//!       │ RendererConfig + Frontend
//!       ▼
//!   Renderer::run ──▶ window::run ──▶ winit events ──▶ Frontend::handle_event
//!       │                    │
//!       │                    └─▶ RedrawRequested ─▶ Frontend::render ─▶ RasterSurface ─▶ wgpu surface
//!       └─▶ export::export_frames ─▶ SteppedTimeSource ─▶ RasterSurface ─▶ PNG
//! ```
//!
//! [`Scene`] is the stock frontend; hosts that also track page state wrap it.

mod export;
pub mod events;
pub mod follow;
mod gpu;
pub mod interaction;
pub mod particles;
pub mod raster;
pub mod runtime;
pub mod scene;
pub mod surface;
mod types;
mod window;

use std::path::PathBuf;

use anyhow::Result;

pub use events::{EventBus, EventKind, HostEvent, Subscription};
pub use export::{export_frames, frame_path};
pub use follow::{lerp, Follower, Follower2, Parallax};
pub use gpu::SurfaceError;
pub use interaction::{magnetic, tilt, HoverKind, HoverTarget, Magnet, Tilt, Transform};
pub use particles::{connection_alpha, Particle, ParticleField, TrailParticle};
pub use raster::RasterSurface;
pub use runtime::{
    FrameLoop, Frontend, SteppedTimeSource, SystemTimeSource, TimeSample, TimeSource,
};
pub use scene::{PointerState, Scene};
pub use surface::{DrawCommand, RecordingSurface, Surface2d};
pub use types::{ExportOptions, Point, Rect, RenderMode, RendererConfig, Rgba, Viewport};

/// Entry point that owns the configuration and picks the presentation path.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Runs `frontend` until the preview window closes, or until every export
    /// frame is written. Returns the files written, which is empty for the
    /// preview window.
    pub fn run<F: Frontend>(&mut self, frontend: &mut F) -> Result<Vec<PathBuf>> {
        match &self.config.mode {
            RenderMode::Windowed => {
                window::run(&self.config, frontend)?;
                Ok(Vec::new())
            }
            RenderMode::Export(options) => export_frames(&self.config, options, frontend),
        }
    }
}

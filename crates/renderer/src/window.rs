use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::events::HostEvent;
use crate::gpu::Presenter;
use crate::raster::RasterSurface;
use crate::runtime::{FrameLoop, Frontend, SystemTimeSource, TimeSource};
use crate::types::{Point, RendererConfig, Viewport};

/// Pixels scrolled per wheel notch for line-based scroll deltas.
const LINE_HEIGHT: f32 = 40.0;

/// Window, presenter and the CPU frame buffer drawn into every frame.
struct WindowState {
    window: Arc<Window>,
    presenter: Presenter,
    raster: RasterSurface,
}

impl WindowState {
    fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let presenter = Presenter::new(window.as_ref(), size)?;
        let raster = RasterSurface::new(viewport_of(size), config.background);
        Ok(Self {
            window,
            presenter,
            raster,
        })
    }

    fn window(&self) -> &Window {
        self.window.as_ref()
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.presenter.resize(size);
        if size.width > 0 && size.height > 0 {
            self.raster.resize(viewport_of(size));
        }
    }

    fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.presenter
            .present(self.raster.pixels(), self.raster.dimensions())
    }
}

fn viewport_of(size: PhysicalSize<u32>) -> Viewport {
    Viewport::from((size.width, size.height))
}

fn point_of(position: PhysicalPosition<f64>) -> Point {
    Point::new(position.x as f32, position.y as f32)
}

/// Browser convention: positive when the page scrolls down.
fn scroll_delta(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => -lines * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(position) => -(position.y as f32),
    }
}

/// Opens the preview window and drives `frontend` from the winit event loop
/// until the window is closed.
pub(crate) fn run<F: Frontend>(config: &RendererConfig, frontend: &mut F) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title("Folio")
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create preview window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, config)?;
    let mut frame_loop = FrameLoop::new(config.target_fps);
    let mut clock = SystemTimeSource::new();
    tracing::info!(
        width = state.presenter.size().width,
        height = state.presenter.size().height,
        fps_cap = ?config.target_fps,
        "preview window ready"
    );
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        frame_loop.stop();
                        elwt.exit();
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        frontend.handle_event(HostEvent::PointerMoved(point_of(position)), clock.now());
                    }
                    WindowEvent::CursorLeft { .. } => {
                        frontend.handle_event(HostEvent::PointerLeft, clock.now());
                    }
                    WindowEvent::MouseInput {
                        state: button_state,
                        button: MouseButton::Left,
                        ..
                    } => {
                        let event = match button_state {
                            ElementState::Pressed => HostEvent::PointerPressed,
                            ElementState::Released => HostEvent::PointerReleased,
                        };
                        frontend.handle_event(event, clock.now());
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let delta_y = scroll_delta(delta);
                        frontend.handle_event(HostEvent::Scrolled { delta_y }, clock.now());
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size);
                        frontend.handle_event(HostEvent::Resized(viewport_of(new_size)), clock.now());
                    }
                    WindowEvent::RedrawRequested => {
                        let sample = clock.sample();
                        frontend.render(&mut state.raster, sample);
                        match state.present() {
                            Ok(()) => frame_loop.mark_rendered(sample.instant),
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                let size = state.presenter.size();
                                state.resize(size);
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                tracing::error!("surface out of memory; closing preview");
                                frame_loop.stop();
                                elwt.exit();
                            }
                            Err(other) => {
                                tracing::warn!("surface error: {other:?}; retrying next frame");
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = clock.now();
                if frame_loop.ready_for_frame(now) {
                    state.window().request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = earliest(frame_loop.next_deadline(), frontend.next_deadline()) {
                    tracing::trace!(
                        deadline_ms = deadline.saturating_duration_since(now).as_millis(),
                        "waiting until next frame"
                    );
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

fn earliest<T: Ord>(first: Option<T>, second: Option<T>) -> Option<T> {
    match (first, second) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

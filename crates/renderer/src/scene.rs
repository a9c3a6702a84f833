use std::time::Instant;

use fxconfig::{CursorSettings, FxConfig, ParallaxSettings, Rgb};
use rand::rngs::StdRng;

use crate::events::HostEvent;
use crate::follow::{Follower2, Parallax};
use crate::interaction::{HoverKind, HoverTarget, Transform};
use crate::particles::ParticleField;
use crate::runtime::{Frontend, TimeSample};
use crate::surface::Surface2d;
use crate::types::{Point, Rect, Rgba, Viewport};

/// Where the blobs sit, as fractions of the viewport. Cycled when more
/// colours are configured.
const BLOB_ANCHORS: [(f32, f32); 3] = [(0.2, 0.25), (0.8, 0.35), (0.45, 0.8)];
/// Concentric discs used to fake a soft edge.
const BLOB_LAYERS: usize = 4;
const RING_WIDTH: f32 = 1.5;
const RING_ALPHA: f32 = 0.5;
/// Spotlight radius as a fraction of the card's shorter side.
const SPOTLIGHT_RADIUS: f32 = 0.4;
const SPOTLIGHT_ALPHA: f32 = 0.08;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub position: Option<Point>,
    pub pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Blob {
    anchor: (f32, f32),
    color: Rgb,
}

/// Every visual entity of the page background, advanced once per frame.
pub struct Scene {
    viewport: Viewport,
    field: ParticleField,
    pointer: PointerState,
    cursor: Follower2,
    cursor_settings: CursorSettings,
    parallax: Parallax,
    parallax_settings: ParallaxSettings,
    blobs: Vec<Blob>,
    hover_targets: Vec<HoverTarget>,
}

impl Scene {
    /// Builds the scene, or `None` when there is nothing to draw onto.
    pub fn new(config: &FxConfig, viewport: Viewport, rng: StdRng) -> Option<Self> {
        if viewport.is_empty() {
            tracing::debug!(?viewport, "no drawable surface; background effects disabled");
            return None;
        }
        let blobs = config
            .parallax
            .blob_colors
            .iter()
            .zip(BLOB_ANCHORS.iter().cycle())
            .map(|(color, anchor)| Blob {
                anchor: *anchor,
                color: *color,
            })
            .collect();
        Some(Self {
            viewport,
            field: ParticleField::initialize(config, viewport, rng),
            pointer: PointerState::default(),
            cursor: Follower2::new(viewport.center(), config.cursor.smoothing),
            cursor_settings: config.cursor.clone(),
            parallax: Parallax::new(&config.parallax, viewport),
            parallax_settings: config.parallax.clone(),
            blobs,
            hover_targets: Vec::new(),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn cursor(&self) -> Point {
        self.cursor.current()
    }

    pub fn parallax(&self) -> &Parallax {
        &self.parallax
    }

    pub fn add_hover_target(&mut self, rect: Rect, kind: HoverKind) -> usize {
        self.hover_targets.push(HoverTarget::new(rect, kind));
        self.hover_targets.len() - 1
    }

    pub fn hover_target(&self, index: usize) -> Option<&HoverTarget> {
        self.hover_targets.get(index)
    }

    pub fn handle_event(&mut self, event: &HostEvent) {
        match *event {
            HostEvent::PointerMoved(position) => self.pointer_moved(position),
            HostEvent::PointerPressed => self.pointer.pressed = true,
            HostEvent::PointerReleased => self.pointer.pressed = false,
            HostEvent::PointerLeft => {
                self.pointer.position = None;
                for target in &mut self.hover_targets {
                    target.pointer_left();
                }
            }
            HostEvent::Resized(viewport) => self.resize(viewport),
            HostEvent::Scrolled { .. } => {}
        }
    }

    fn pointer_moved(&mut self, position: Point) {
        self.pointer.position = Some(position);
        self.field.apply_repulsion(position);
        self.field.spawn_trail(position);
        self.cursor.set_target(position);
        self.parallax.on_pointer(position);
        for target in &mut self.hover_targets {
            if target.pointer_moved(position) {
                tracing::trace!(transform = ?target.transform(), "hover transform changed");
            }
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            tracing::debug!(?viewport, "ignoring resize to an empty viewport");
            return;
        }
        self.viewport = viewport;
        self.field.resize(viewport);
        self.parallax.resize(viewport);
    }

    /// Advances the simulation by one frame and draws it.
    pub fn frame(&mut self, surface: &mut dyn Surface2d) {
        self.field.step();
        self.cursor.advance();
        self.parallax.advance();

        if self.blobs.is_empty() {
            self.field.render_frame(surface);
        } else {
            surface.clear();
            self.draw_blobs(surface);
            self.field.draw(surface);
        }
        self.draw_hover_targets(surface);
        if self.pointer.position.is_some() {
            surface.stroke_circle(
                self.cursor.current(),
                self.cursor_settings.ring_radius,
                RING_WIDTH,
                Rgba::from_rgb(self.cursor_settings.color, RING_ALPHA),
            );
        }
    }

    fn draw_blobs(&self, surface: &mut dyn Surface2d) {
        let radius = self.parallax_settings.blob_radius;
        let layer_alpha = self.parallax_settings.blob_opacity / BLOB_LAYERS as f32;
        for (index, blob) in self.blobs.iter().enumerate() {
            let offset = self.parallax.blob_offset(index);
            let center = Point::new(
                blob.anchor.0 * self.viewport.width + offset.x,
                blob.anchor.1 * self.viewport.height + offset.y,
            );
            for layer in 0..BLOB_LAYERS {
                let shrink = 1.0 - layer as f32 / BLOB_LAYERS as f32;
                surface.fill_circle(center, radius * shrink, Rgba::from_rgb(blob.color, layer_alpha));
            }
        }
    }

    fn draw_hover_targets(&self, surface: &mut dyn Surface2d) {
        for target in &self.hover_targets {
            let alpha = match target.transform() {
                Transform::Tilt(_) => 0.06,
                Transform::Magnet(_) => 0.18,
            };
            let boost = if target.is_hovered() { 1.5 } else { 1.0 };
            surface.fill_quad(
                target.displayed_quad(),
                Rgba::from_rgb(self.cursor_settings.color, alpha * boost),
            );
            if let Some(spot) = target.spotlight() {
                let rect = target.rect();
                surface.fill_circle(
                    spot,
                    rect.width.min(rect.height) * SPOTLIGHT_RADIUS,
                    Rgba::new(255, 255, 255, SPOTLIGHT_ALPHA),
                );
            }
        }
    }
}

impl Frontend for Scene {
    fn handle_event(&mut self, event: HostEvent, _now: Instant) {
        Scene::handle_event(self, &event);
    }

    fn render(&mut self, surface: &mut dyn Surface2d, _sample: TimeSample) {
        self.frame(surface);
    }
}

#[cfg(test)]
mod tests {
    use fxconfig::{MagneticSettings, TiltSettings};
    use rand::SeedableRng;

    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn scene(config: &FxConfig) -> Scene {
        Scene::new(config, Viewport::new(800.0, 600.0), StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn empty_viewport_yields_no_scene() {
        let config = FxConfig::default();
        assert!(Scene::new(&config, Viewport::new(0.0, 600.0), StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn pointer_move_feeds_every_effect() {
        let config = FxConfig::default();
        let mut scene = scene(&config);
        assert_eq!(scene.cursor(), Point::new(400.0, 300.0));

        scene.handle_event(&HostEvent::PointerMoved(Point::new(100.0, 100.0)));
        assert_eq!(scene.pointer().position, Some(Point::new(100.0, 100.0)));
        assert_eq!(scene.field().trail().len(), 1);

        let mut surface = RecordingSurface::new(scene.viewport());
        scene.frame(&mut surface);
        assert!(scene.cursor().x < 400.0);
        assert!(scene.parallax().offset().x < 0.0);
    }

    #[test]
    fn pointer_move_pushes_nearby_particles_away() {
        let config = FxConfig::default();
        let mut scene = scene(&config);
        let particle = &mut scene.field_mut().particles_mut()[0];
        particle.x = 130.0;
        particle.y = 100.0;

        scene.handle_event(&HostEvent::PointerMoved(Point::new(100.0, 100.0)));
        let moved = scene.field().particles()[0];
        // distance 30 inside radius 100: 30 * 0.7 * 0.05
        assert!((moved.x - 131.05).abs() < 1e-4);
        assert_eq!(moved.y, 100.0);
    }

    #[test]
    fn hovered_card_draws_tilted_quad_and_spotlight() {
        let config = FxConfig::default();
        let mut scene = scene(&config);
        let card = Rect::new(100.0, 100.0, 300.0, 200.0);
        let index = scene.add_hover_target(card, HoverKind::Tilt(TiltSettings::default()));

        let mut surface = RecordingSurface::new(scene.viewport());
        scene.frame(&mut surface);
        assert!(matches!(
            surface.quads().next(),
            Some(DrawCommand::FillQuad { corners, .. }) if *corners == card.corners()
        ));

        scene.handle_event(&HostEvent::PointerMoved(Point::new(120.0, 120.0)));
        assert_ne!(scene.hover_target(index).unwrap().displayed_quad(), card.corners());
        let spot = scene.hover_target(index).unwrap().spotlight().unwrap();
        let mut surface = RecordingSurface::new(scene.viewport());
        scene.frame(&mut surface);
        let spotlight_drawn = surface.commands().iter().any(|command| match command {
            DrawCommand::FillCircle { center, radius, .. } => {
                *center == spot && (*radius - 80.0).abs() < 1e-3
            }
            _ => false,
        });
        assert!(spotlight_drawn);
    }

    #[test]
    fn frame_draws_backdrop_before_particles() {
        let mut config = FxConfig::default();
        config.particles.count = 2;
        let mut scene = scene(&config);
        let mut surface = RecordingSurface::new(scene.viewport());
        scene.frame(&mut surface);

        let commands = surface.commands();
        assert_eq!(commands[0], DrawCommand::Clear);
        let blob_discs = config.parallax.blob_colors.len() * BLOB_LAYERS;
        assert_eq!(surface.circles().count(), blob_discs + 2);
        // no pointer yet, so no cursor ring
        assert!(!commands
            .iter()
            .any(|command| matches!(command, DrawCommand::StrokeCircle { .. })));
    }

    #[test]
    fn frame_without_blobs_renders_field_directly() {
        let mut config = FxConfig::default();
        config.particles.count = 2;
        config.parallax.blob_colors.clear();
        let mut scene = scene(&config);
        scene.handle_event(&HostEvent::PointerMoved(Point::new(10.0, 10.0)));
        let mut surface = RecordingSurface::new(scene.viewport());
        scene.frame(&mut surface);

        assert_eq!(surface.commands()[0], DrawCommand::Clear);
        // two particles plus one trail particle
        assert_eq!(surface.circles().count(), 3);
        assert!(matches!(
            surface.commands().last(),
            Some(DrawCommand::StrokeCircle { .. })
        ));
    }

    #[test]
    fn empty_resize_is_ignored() {
        let config = FxConfig::default();
        let mut scene = scene(&config);
        scene.handle_event(&HostEvent::Resized(Viewport::new(0.0, 0.0)));
        assert_eq!(scene.viewport(), Viewport::new(800.0, 600.0));
        scene.handle_event(&HostEvent::Resized(Viewport::new(1024.0, 768.0)));
        assert_eq!(scene.field().viewport(), Viewport::new(1024.0, 768.0));
    }

    #[test]
    fn pointer_leaving_window_resets_hover_targets() {
        let config = FxConfig::default();
        let mut scene = scene(&config);
        let button = scene.add_hover_target(
            Rect::new(50.0, 50.0, 100.0, 40.0),
            HoverKind::Magnetic(MagneticSettings::default()),
        );
        scene.handle_event(&HostEvent::PointerMoved(Point::new(110.0, 70.0)));
        assert!(scene.hover_target(button).unwrap().is_hovered());

        scene.handle_event(&HostEvent::PointerLeft);
        let target = scene.hover_target(button).unwrap();
        assert!(!target.is_hovered());
        assert_eq!(scene.pointer().position, None);
    }
}

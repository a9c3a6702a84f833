//! Ambient particle field and the pointer trail drawn on top of it.
//!
//! Particles live in a flat `Vec` and are advanced by free functions over the
//! slice; [`ParticleField`] only owns the collections, the tuning and the
//! random source.

use fxconfig::{ConnectionSettings, FxConfig, ParticleSettings, RepulsionSettings, TrailSettings};
use rand::rngs::StdRng;
use rand::Rng;

use crate::surface::Surface2d;
use crate::types::{Point, Rgba, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub opacity: f32,
}

impl Particle {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Short-lived particle spawned by pointer motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailParticle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub opacity: f32,
    /// Remaining life in `[0, 1]`.
    pub life: f32,
}

/// Advances every particle by its velocity and wraps it to the opposite edge
/// when it leaves the viewport.
pub fn step_particles(particles: &mut [Particle], viewport: Viewport) {
    for particle in particles.iter_mut() {
        particle.x = wrap(particle.x + particle.vx, viewport.width);
        particle.y = wrap(particle.y + particle.vy, viewport.height);
    }
}

fn wrap(value: f32, bound: f32) -> f32 {
    if value < 0.0 {
        bound
    } else if value > bound {
        0.0
    } else {
        value
    }
}

/// Pushes particles within `radius` of `pointer` away from it, harder the
/// closer they are.
pub fn repel_particles(particles: &mut [Particle], pointer: Point, radius: f32, strength: f32) {
    for particle in particles.iter_mut() {
        let dx = particle.x - pointer.x;
        let dy = particle.y - pointer.y;
        let distance = dx.hypot(dy);
        if distance < radius {
            let force = (radius - distance) / radius;
            particle.x += dx * force * strength;
            particle.y += dy * force * strength;
        }
    }
}

/// Ages the trail by one frame and drops particles whose life ran out.
pub fn age_trail(trail: &mut Vec<TrailParticle>, decay: f32, rise: f32) {
    trail.retain_mut(|particle| {
        particle.life -= decay;
        particle.y -= rise;
        particle.life > 0.0
    });
}

/// Opacity of the line joining two particles `distance` apart, or `None`
/// when they are too far apart to be connected.
pub fn connection_alpha(distance: f32, max_distance: f32, max_alpha: f32) -> Option<f32> {
    if distance < max_distance {
        Some((1.0 - distance / max_distance) * max_alpha)
    } else {
        None
    }
}

fn sample(rng: &mut StdRng, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    trail: Vec<TrailParticle>,
    viewport: Viewport,
    settings: ParticleSettings,
    connections: ConnectionSettings,
    repulsion: RepulsionSettings,
    trail_settings: TrailSettings,
    rng: StdRng,
}

impl ParticleField {
    /// Scatters `config.particles.count` particles uniformly over the viewport.
    pub fn initialize(config: &FxConfig, viewport: Viewport, mut rng: StdRng) -> Self {
        let settings = config.particles.clone();
        let particles = (0..settings.count)
            .map(|_| Particle {
                x: sample(&mut rng, 0.0, viewport.width),
                y: sample(&mut rng, 0.0, viewport.height),
                vx: sample(&mut rng, -settings.max_speed, settings.max_speed),
                vy: sample(&mut rng, -settings.max_speed, settings.max_speed),
                radius: sample(&mut rng, settings.min_radius, settings.max_radius),
                opacity: sample(&mut rng, settings.min_opacity, settings.max_opacity),
            })
            .collect();
        Self {
            particles,
            trail: Vec::with_capacity(config.trail.cap),
            viewport,
            settings,
            connections: config.connections.clone(),
            repulsion: config.repulsion.clone(),
            trail_settings: config.trail.clone(),
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn trail(&self) -> &[TrailParticle] {
        &self.trail
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Adopts new bounds; particles outside them wrap on the next step.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn step(&mut self) {
        step_particles(&mut self.particles, self.viewport);
    }

    pub fn apply_repulsion(&mut self, pointer: Point) {
        repel_particles(
            &mut self.particles,
            pointer,
            self.repulsion.radius,
            self.repulsion.strength,
        );
    }

    /// Adds a trail particle at `pointer` unless the trail is full. Returns
    /// whether a particle was added.
    pub fn spawn_trail(&mut self, pointer: Point) -> bool {
        if self.trail.len() >= self.trail_settings.cap {
            return false;
        }
        let size = sample(
            &mut self.rng,
            self.trail_settings.min_size,
            self.trail_settings.max_size,
        );
        self.trail.push(TrailParticle {
            x: pointer.x,
            y: pointer.y,
            size,
            opacity: self.trail_settings.opacity,
            life: 1.0,
        });
        true
    }

    /// Clears the surface and draws the whole field.
    pub fn render_frame(&mut self, surface: &mut dyn Surface2d) {
        surface.clear();
        self.draw(surface);
    }

    /// Draws particles, their connections and the trail without clearing, so
    /// the field can be layered over a backdrop. Ages the trail as it goes.
    pub fn draw(&mut self, surface: &mut dyn Surface2d) {
        let color = self.settings.color;
        for particle in &self.particles {
            surface.fill_circle(
                particle.position(),
                particle.radius,
                Rgba::from_rgb(color, particle.opacity),
            );
        }

        self.draw_connections(surface);

        age_trail(
            &mut self.trail,
            self.trail_settings.life_decay,
            self.trail_settings.rise,
        );
        let trail_color = self.trail_settings.color;
        for particle in &self.trail {
            surface.fill_circle(
                Point::new(particle.x, particle.y),
                particle.size,
                Rgba::from_rgb(trail_color, particle.opacity * particle.life),
            );
        }
    }

    fn draw_connections(&self, surface: &mut dyn Surface2d) {
        let ConnectionSettings {
            max_distance,
            max_alpha,
            line_width,
        } = self.connections;
        let color = self.settings.color;
        for (index, first) in self.particles.iter().enumerate() {
            for second in &self.particles[index + 1..] {
                let distance = first.position().distance(second.position());
                if let Some(alpha) = connection_alpha(distance, max_distance, max_alpha) {
                    surface.stroke_line(
                        first.position(),
                        second.position(),
                        line_width,
                        Rgba::from_rgb(color, alpha),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn field(config: &FxConfig) -> ParticleField {
        ParticleField::initialize(config, viewport(), StdRng::seed_from_u64(7))
    }

    fn particle(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        Particle {
            x,
            y,
            vx,
            vy,
            radius: 1.0,
            opacity: 0.5,
        }
    }

    #[test]
    fn initializes_within_bounds() {
        let config = FxConfig::default();
        let field = field(&config);
        assert_eq!(field.particles().len(), 80);
        for particle in field.particles() {
            assert!((0.0..=800.0).contains(&particle.x));
            assert!((0.0..=600.0).contains(&particle.y));
            assert!(particle.vx.abs() <= 0.25 && particle.vy.abs() <= 0.25);
            assert!((1.0..3.0).contains(&particle.radius));
            assert!((0.2..0.7).contains(&particle.opacity));
        }
    }

    #[test]
    fn step_wraps_to_the_opposite_edge() {
        let mut particles = vec![
            particle(0.1, 300.0, -0.25, 0.0),
            particle(799.9, 300.0, 0.25, 0.0),
            particle(400.0, 0.1, 0.0, -0.25),
            particle(400.0, 599.9, 0.0, 0.25),
        ];
        step_particles(&mut particles, viewport());
        assert_eq!(particles[0].x, 800.0);
        assert_eq!(particles[1].x, 0.0);
        assert_eq!(particles[2].y, 600.0);
        assert_eq!(particles[3].y, 0.0);
        for particle in &particles {
            assert!((0.0..=800.0).contains(&particle.x));
            assert!((0.0..=600.0).contains(&particle.y));
        }
    }

    #[test]
    fn step_wraps_particles_pushed_far_outside() {
        let mut particles = vec![particle(-40.0, 900.0, 0.1, 0.1)];
        step_particles(&mut particles, viewport());
        assert_eq!(particles[0].x, 800.0);
        assert_eq!(particles[0].y, 0.0);
    }

    #[test]
    fn repulsion_only_moves_nearby_particles() {
        let mut particles = vec![particle(150.0, 100.0, 0.0, 0.0), particle(300.0, 100.0, 0.0, 0.0)];
        repel_particles(&mut particles, Point::new(100.0, 100.0), 100.0, 0.05);
        // distance 50: force 0.5, displacement 50 * 0.5 * 0.05
        assert!((particles[0].x - 151.25).abs() < 1e-4);
        assert_eq!(particles[0].y, 100.0);
        assert_eq!(particles[1].x, 300.0);
    }

    #[test]
    fn repulsion_at_the_pointer_is_a_no_op() {
        let mut particles = vec![particle(100.0, 100.0, 0.0, 0.0)];
        repel_particles(&mut particles, Point::new(100.0, 100.0), 100.0, 0.05);
        assert_eq!(particles[0].position(), Point::new(100.0, 100.0));
    }

    #[test]
    fn trail_never_exceeds_cap() {
        let config = FxConfig::default();
        let mut field = field(&config);
        let mut accepted = 0;
        for step in 0..50 {
            if field.spawn_trail(Point::new(step as f32, 10.0)) {
                accepted += 1;
            }
            assert!(field.trail().len() <= config.trail.cap);
        }
        assert_eq!(accepted, config.trail.cap);
    }

    #[test]
    fn trail_particle_reaching_zero_life_is_removed() {
        let mut trail = vec![
            TrailParticle {
                x: 0.0,
                y: 10.0,
                size: 2.0,
                opacity: 0.8,
                life: 0.5,
            },
            TrailParticle {
                x: 0.0,
                y: 10.0,
                size: 2.0,
                opacity: 0.8,
                life: 0.75,
            },
        ];
        age_trail(&mut trail, 0.5, 1.0);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].life, 0.25);
        assert_eq!(trail[0].y, 9.0);
    }

    #[test]
    fn connection_alpha_boundaries() {
        assert_eq!(connection_alpha(0.0, 150.0, 0.2), Some(0.2));
        assert_eq!(connection_alpha(150.0, 150.0, 0.2), None);
        assert_eq!(connection_alpha(151.0, 150.0, 0.2), None);
        let half = connection_alpha(75.0, 150.0, 0.2).unwrap();
        assert!((half - 0.1).abs() < 1e-6);
    }

    #[test]
    fn render_frame_connects_only_close_pairs() {
        let mut config = FxConfig::default();
        config.particles.count = 3;
        let mut field = field(&config);
        let positions = [(100.0, 100.0), (200.0, 100.0), (600.0, 500.0)];
        for (particle, (x, y)) in field.particles_mut().iter_mut().zip(positions) {
            particle.x = x;
            particle.y = y;
        }
        let mut surface = RecordingSurface::new(viewport());
        field.render_frame(&mut surface);

        assert_eq!(surface.commands()[0], DrawCommand::Clear);
        assert_eq!(surface.circles().count(), 3);
        let lines: Vec<_> = surface.lines().collect();
        assert_eq!(lines.len(), 1);
        match lines[0] {
            DrawCommand::Line { from, to, color, .. } => {
                assert_eq!(*from, Point::new(100.0, 100.0));
                assert_eq!(*to, Point::new(200.0, 100.0));
                assert!((color.a - (1.0 - 100.0 / 150.0) * 0.2).abs() < 1e-6);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn render_frame_ages_and_draws_trail() {
        let mut config = FxConfig::default();
        config.particles.count = 1;
        let mut field = field(&config);
        field.spawn_trail(Point::new(50.0, 50.0));
        let mut surface = RecordingSurface::new(viewport());
        field.render_frame(&mut surface);

        let trail = field.trail()[0];
        assert!((trail.life - 0.98).abs() < 1e-6);
        assert_eq!(trail.y, 49.0);
        let last = surface.commands().last().unwrap();
        match last {
            DrawCommand::FillCircle { center, color, .. } => {
                assert_eq!(*center, Point::new(50.0, 49.0));
                assert!((color.a - 0.8 * 0.98).abs() < 1e-6);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}

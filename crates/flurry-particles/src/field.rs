//! Per-frame particle integration
//!
//! [`ParticleField`] owns every particle's state and advances it one frame at
//! a time from a [`FrameInput`]. Each frame a particle is in exactly one
//! regime, checked in this order:
//!
//! 1. wish reveal: mode is Wish and a wish field is published
//! 2. explosion free-flight: an explosion has been triggered
//! 3. steady pursuit of the current mode's target
//!
//! Color blending, activation glow and instance packing run for every
//! particle regardless of regime.

use crate::config::{FieldConfig, MotionConfig};
use crate::curves::{fade_out, ramp, smoothing_factor};
use crate::particle::{Particle, ParticleInstance, ParticleSeeds};
use crate::rand::ParticleRng;
use crate::targets::TargetField;
use flurry_core::{Color, Mode, Vec3};
use std::collections::HashMap;
use std::f32::consts::TAU;

/// Read access to published target fields by mode.
pub trait TargetLookup {
    fn target(&self, mode: Mode) -> Option<&TargetField>;
}

impl TargetLookup for HashMap<Mode, TargetField> {
    fn target(&self, mode: Mode) -> Option<&TargetField> {
        self.get(&mode)
    }
}

/// Everything one integration step reads besides the particles themselves.
pub struct FrameInput<'a> {
    pub mode: Mode,
    /// Seconds since start; phase source for jitter and twinkle
    pub elapsed: f32,
    pub delta: f32,
    /// Seconds since the current mode was entered
    pub since_entry: f32,
    /// Sleigh light position while it is in flight
    pub light: Option<Vec3>,
    /// Explosion signal is active
    pub exploding: bool,
    pub targets: &'a dyn TargetLookup,
}

/// Steady-pursuit target for a mode and how it modulates the particle.
struct SteadyTarget<'a> {
    field: Option<&'a TargetField>,
    jitter: f32,
    brightness: f32,
    scale: f32,
}

fn steady_target<'a>(mode: Mode, targets: &'a dyn TargetLookup, motion: &MotionConfig) -> SteadyTarget<'a> {
    let plain = |field: Option<&'a TargetField>| SteadyTarget {
        field,
        jitter: 1.0,
        brightness: 1.0,
        scale: 1.0,
    };
    match mode {
        Mode::Image => match targets.target(Mode::Image) {
            Some(field) => SteadyTarget {
                field: Some(field),
                jitter: 1.0,
                brightness: motion.image_brightness,
                scale: motion.image_scale,
            },
            // No photo yet: gather at the default cluster
            None => plain(None),
        },
        Mode::Tree | Mode::Greeting | Mode::Text => plain(targets.target(mode)),
        Mode::Scatter | Mode::Wish => SteadyTarget {
            jitter: motion.scatter_jitter,
            ..plain(targets.target(Mode::Scatter))
        },
    }
}

/// Color a particle drifts toward in `mode`.
fn target_color(mode: Mode, index: usize, palette: Color, image: Option<&TargetField>) -> Color {
    match mode {
        Mode::Greeting | Mode::Wish => Color::GOLD,
        Mode::Image | Mode::Text | Mode::Tree => image.and_then(|f| f.color(index)).unwrap_or(palette),
        Mode::Scatter => palette,
    }
}

/// Move `current` toward `target` by the inertia-weighted pursuit rate.
pub fn pursue(current: Vec3, target: Vec3, delta: f32, inertia: f32, motion: &MotionConfig) -> Vec3 {
    let rate = motion.pursuit_speed * (motion.inertia_base + motion.inertia_gain * inertia);
    current.lerp(target, smoothing_factor(delta, rate))
}

pub struct ParticleField {
    particles: Vec<Particle>,
    instances: Vec<ParticleInstance>,
    config: FieldConfig,
    rng: ParticleRng,
    explosion_started: Option<f32>,
}

impl ParticleField {
    /// `count` particles gathered at the origin with freshly drawn seeds.
    pub fn new(count: usize, seed: u64, config: FieldConfig) -> Self {
        let mut rng = ParticleRng::new(seed);
        let palette = [Color::GOLD, Color::WHITE];
        let particles: Vec<Particle> = (0..count)
            .map(|_| Particle::new(ParticleSeeds::draw(&mut rng, &palette, config.motion.primary_share), Vec3::ZERO))
            .collect();
        let instances = particles
            .iter()
            .enumerate()
            .map(|(i, p)| ParticleInstance::from_particle(i, p, p.color))
            .collect();
        log::info!("[particles] field of {} particles (seed {})", count, seed);
        Self {
            particles,
            instances,
            config,
            rng,
            explosion_started: None,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Instance records packed by the last step
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// Seat every particle on `field`, restore palette colors and stop all
    /// motion. Slots beyond the field's length go to the origin.
    pub fn reset_to(&mut self, field: &TargetField) {
        for (i, p) in self.particles.iter_mut().enumerate() {
            p.position = field.position(i).unwrap_or(Vec3::ZERO);
            p.velocity = Vec3::ZERO;
            p.color = p.seeds.palette;
        }
        log::debug!("[particles] reset onto {} targets", field.len());
    }

    /// Launch every particle outward. Ignored if an explosion is already
    /// running. Returns whether a new explosion started.
    pub fn trigger_explosion(&mut self, now: f32) -> bool {
        if self.explosion_started.is_some() {
            return false;
        }
        let cfg = &self.config.explosion;
        for p in &mut self.particles {
            let dir = self.rng.cube_direction();
            let speed = (cfg.speed_min + self.rng.next_f32() * cfg.speed_spread) * p.seeds.inertia;
            p.velocity = dir * speed + Vec3::new(0.0, cfg.lift, 0.0);
        }
        self.explosion_started = Some(now);
        log::debug!("[particles] explosion at {:.2}s", now);
        true
    }

    /// End the explosion episode. Particles drop their launch velocity and
    /// resume pursuit from where they are.
    pub fn clear_explosion(&mut self) {
        self.explosion_started = None;
        for p in &mut self.particles {
            p.velocity = Vec3::ZERO;
        }
    }

    pub fn explosion_started(&self) -> Option<f32> {
        self.explosion_started
    }

    /// Advance all particles by one frame and repack instances.
    pub fn step(&mut self, input: &FrameInput) {
        let Self {
            particles,
            instances,
            config,
            explosion_started,
            ..
        } = self;
        let motion = &config.motion;
        let explosion = &config.explosion;
        let wish_cfg = &config.wish;

        let t = input.elapsed;
        let dt = input.delta;
        let wish = match input.mode {
            Mode::Wish => input.targets.target(Mode::Wish),
            _ => None,
        };
        let steady = steady_target(input.mode, input.targets, motion);
        let image = input.targets.target(Mode::Image);
        let explosion_age = explosion_started.map(|start| t - start);
        let color_rate = match input.mode {
            Mode::Image => motion.image_color_rate,
            _ => motion.color_rate,
        };
        let color_t = smoothing_factor(dt, color_rate);
        let radius_sq = motion.activation_radius * motion.activation_radius;

        for (i, p) in particles.iter_mut().enumerate() {
            let phase = p.seeds.phase * TAU;
            let jitter = Vec3::new(
                (t * 2.5 + phase).sin(),
                (t * 2.2 + phase).cos(),
                (t * 2.8 + phase).sin(),
            ) * motion.jitter_amplitude;
            let twinkle = (t * 4.0 + phase).sin() * 0.4 + 0.8;

            if let Some(wish) = wish {
                let target = wish.position(i).unwrap_or(Vec3::ZERO);
                p.position = target;
                p.velocity = Vec3::ZERO;
                let progress = ramp(input.since_entry, wish_cfg.delay_for(target.x), wish_cfg.ramp);
                p.scale = progress * wish_cfg.scale_cap;
                p.brightness = twinkle * progress;
            } else if let Some(age) = explosion_age {
                p.position += p.velocity * dt;
                p.velocity.x *= explosion.damping;
                p.velocity.y = (p.velocity.y - explosion.gravity * dt) * explosion.damping;
                p.velocity.z *= explosion.damping;
                p.scale = fade_out(age, explosion.shrink_duration);
                let mut brightness = 1.0 + fade_out(age, explosion.flash_duration) * explosion.flash_gain;
                if p.scale < explosion.fade_floor {
                    brightness *= p.scale / explosion.fade_floor;
                }
                p.brightness = brightness;
            } else {
                let target = match steady.field.and_then(|f| f.position(i)) {
                    Some(target) => target + jitter * steady.jitter,
                    None => Vec3::ZERO,
                };
                p.position = pursue(p.position, target, dt, p.seeds.inertia, motion);
                p.brightness = (1.0 + motion.activation_glow * p.activation) * twinkle * steady.brightness;
                p.scale = steady.scale;
            }

            let lit = input.mode == Mode::Tree
                && (input.exploding
                    || input
                        .light
                        .is_some_and(|light| p.position.distance_squared(&light) < radius_sq));
            p.activation = if lit {
                1.0
            } else {
                (p.activation - motion.activation_decay * dt).max(0.0)
            };

            let goal = target_color(input.mode, i, p.seeds.palette, image);
            p.color = p.color.lerp(goal, color_t);
            let tinted = if p.activation > 0.0 && input.mode != Mode::Wish {
                p.color.lerp(Color::GOLD, p.activation * motion.activation_tint)
            } else {
                p.color
            };
            instances[i] = ParticleInstance::from_particle(i, p, tinted.scaled(p.brightness));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn still_config() -> FieldConfig {
        FieldConfig {
            motion: MotionConfig {
                jitter_amplitude: 0.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn spread_field(count: usize, seed: u64) -> TargetField {
        let mut rng = ParticleRng::new(seed);
        TargetField::new(
            (0..count)
                .map(|_| Vec3::new(rng.range(-8.0, 8.0), rng.range(-4.0, 4.0), rng.range(-1.0, 1.0)))
                .collect(),
        )
    }

    fn frame<'a>(mode: Mode, frame: usize, since_entry: f32, targets: &'a dyn TargetLookup) -> FrameInput<'a> {
        FrameInput {
            mode,
            elapsed: frame as f32 * DT,
            delta: DT,
            since_entry,
            light: None,
            exploding: false,
            targets,
        }
    }

    #[test]
    fn pursuit_converges_within_three_seconds() {
        let mut targets = HashMap::new();
        targets.insert(Mode::Greeting, spread_field(300, 1));
        let mut field = ParticleField::new(300, 2, still_config());
        let goal = targets[&Mode::Greeting].clone();

        let initial: Vec<f32> = field
            .particles()
            .iter()
            .enumerate()
            .map(|(i, p)| (goal.position(i).unwrap() - p.position).length())
            .collect();
        let mut previous = initial.clone();
        for k in 0..180 {
            field.step(&frame(Mode::Greeting, k, k as f32 * DT, &targets));
            for (i, p) in field.particles().iter().enumerate() {
                let d = (goal.position(i).unwrap() - p.position).length();
                assert!(d <= previous[i] + 1e-5);
                previous[i] = d;
            }
        }
        for (d, d0) in previous.iter().zip(&initial) {
            assert!(*d < 0.05 * d0, "{d} vs {d0}");
        }
    }

    #[test]
    fn pursue_never_overshoots() {
        let motion = MotionConfig::default();
        let target = Vec3::new(10.0, 0.0, 0.0);
        let next = pursue(Vec3::ZERO, target, 5.0, 1.6, &motion);
        assert_eq!(next, target);
        let partial = pursue(Vec3::ZERO, target, DT, 1.0, &motion);
        assert!(partial.x > 0.0 && partial.x < 10.0);
    }

    #[test]
    fn missing_target_gathers_at_origin() {
        let targets: HashMap<Mode, TargetField> = HashMap::new();
        let mut field = ParticleField::new(10, 3, still_config());
        field.reset_to(&spread_field(10, 4));
        for k in 0..600 {
            field.step(&frame(Mode::Image, k, 0.0, &targets));
        }
        assert!(field.particles().iter().all(|p| p.position.length() < 0.01));
    }

    #[test]
    fn explosion_shrinks_monotonically() {
        let targets: HashMap<Mode, TargetField> = HashMap::new();
        let mut field = ParticleField::new(50, 5, FieldConfig::default());
        assert!(field.trigger_explosion(0.0));
        assert!(!field.trigger_explosion(0.5));
        assert!(field.particles().iter().all(|p| p.velocity.length() > 0.0));

        let mut last = f32::MAX;
        for k in 1..=100 {
            field.step(&frame(Mode::Tree, k, 0.0, &targets));
            let scale = field.particles()[0].scale;
            assert!(scale <= last);
            last = scale;
            if k as f32 * DT >= 1.5 {
                assert!(field.particles().iter().all(|p| p.scale == 0.0));
            }
        }
        field.clear_explosion();
        assert!(field.explosion_started().is_none());
    }

    #[test]
    fn clearing_the_explosion_stops_free_flight() {
        let targets: HashMap<Mode, TargetField> = HashMap::new();
        let mut field = ParticleField::new(40, 8, still_config());
        field.trigger_explosion(0.0);
        field.step(&frame(Mode::Tree, 1, 0.0, &targets));
        field.clear_explosion();
        assert!(field.particles().iter().all(|p| p.velocity == Vec3::ZERO));

        let before: Vec<Vec3> = field.particles().iter().map(|p| p.position).collect();
        field.step(&frame(Mode::Greeting, 2, 0.0, &targets));
        for (p, b) in field.particles().iter().zip(&before) {
            assert_eq!(p.velocity, Vec3::ZERO);
            // Pursuit toward the origin only, no leftover drift outward
            assert!(p.position.length() <= b.length() + 1e-4);
        }
    }

    #[test]
    fn explosion_velocity_damps_and_falls() {
        let cfg = FieldConfig::default();
        let mut field = ParticleField::new(1, 6, cfg.clone());
        field.trigger_explosion(0.0);
        let v0 = field.particles()[0].velocity;
        let targets: HashMap<Mode, TargetField> = HashMap::new();
        field.step(&frame(Mode::Tree, 1, 0.0, &targets));
        let v1 = field.particles()[0].velocity;
        assert!((v1.x - v0.x * 0.95).abs() < 1e-3);
        assert!((v1.y - (v0.y - 9.8 * DT) * 0.95).abs() < 1e-3);
    }

    #[test]
    fn activation_decays_at_fixed_rate() {
        let targets: HashMap<Mode, TargetField> = HashMap::new();
        let mut field = ParticleField::new(20, 7, FieldConfig::default());
        let mut input = frame(Mode::Tree, 0, 0.0, &targets);
        input.exploding = true;
        field.step(&input);
        assert!(field.particles().iter().all(|p| p.activation == 1.0));

        let mut last = 1.0;
        for k in 1..=120 {
            field.step(&frame(Mode::Greeting, k, 0.0, &targets));
            let a = field.particles()[0].activation;
            assert!(a <= last);
            if last > 0.0 {
                let expected = (last - 0.65 * DT).max(0.0);
                assert!((a - expected).abs() < 1e-5);
            }
            last = a;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn light_activates_only_nearby_particles_in_tree() {
        let mut targets = HashMap::new();
        let mut positions = vec![Vec3::ZERO; 2];
        positions[1] = Vec3::new(50.0, 0.0, 0.0);
        targets.insert(Mode::Tree, TargetField::new(positions.clone()));
        let mut field = ParticleField::new(2, 8, still_config());
        field.reset_to(&TargetField::new(positions));

        let mut input = frame(Mode::Tree, 0, 0.0, &targets);
        input.light = Some(Vec3::new(1.0, 0.0, 0.0));
        field.step(&input);
        assert_eq!(field.particles()[0].activation, 1.0);
        assert_eq!(field.particles()[1].activation, 0.0);

        input.mode = Mode::Text;
        field.step(&input);
        assert!(field.particles()[0].activation < 1.0);
    }

    #[test]
    fn wish_reveal_staggers_left_to_right() {
        let count = 40;
        let positions: Vec<Vec3> = (0..count)
            .map(|i| Vec3::new(-10.0 + i as f32 * 0.5, 2.0, 0.0))
            .collect();
        let mut targets = HashMap::new();
        targets.insert(Mode::Wish, TargetField::new(positions.clone()));
        let mut field = ParticleField::new(count, 9, FieldConfig::default());
        // An explosion in progress does not override the reveal
        field.trigger_explosion(0.0);

        for since in [0.5_f32, 1.0, 2.0, 3.0] {
            field.step(&frame(Mode::Wish, 60, since, &targets));
            let particles = field.particles();
            for i in 1..count {
                assert_eq!(particles[i].position, positions[i]);
                let left = particles[i - 1].scale;
                let right = particles[i].scale;
                assert!(left >= right, "slot {i} at {since}s");
            }
        }
        field.step(&frame(Mode::Wish, 60, 10.0, &targets));
        assert!(field.particles().iter().all(|p| (p.scale - 0.54).abs() < 1e-6));
    }

    #[test]
    fn colors_drift_toward_mode_color() {
        let mut targets = HashMap::new();
        targets.insert(Mode::Greeting, TargetField::zeroed(5));
        targets.insert(
            Mode::Image,
            TargetField::with_colors(vec![Vec3::ZERO; 5], vec![Color::new(0.0, 0.0, 1.0); 5]),
        );
        let mut field = ParticleField::new(5, 10, FieldConfig::default());
        for k in 0..600 {
            field.step(&frame(Mode::Greeting, k, 0.0, &targets));
        }
        assert!(field.particles().iter().all(|p| (p.color.r - Color::GOLD.r).abs() < 1e-3));

        // Tree borrows the photo's colors once one is published
        for k in 0..600 {
            field.step(&frame(Mode::Tree, k, 0.0, &targets));
        }
        assert!(field.particles().iter().all(|p| p.color.b > 0.99));
    }

    #[test]
    fn instances_track_every_particle() {
        let targets: HashMap<Mode, TargetField> = HashMap::new();
        let mut field = ParticleField::new(12, 11, FieldConfig::default());
        field.step(&frame(Mode::Scatter, 1, 0.0, &targets));
        assert_eq!(field.instances().len(), 12);
        let p = &field.particles()[3];
        let inst = &field.instances()[3];
        assert_eq!(inst.pos_size[3], p.size());
        assert_eq!(inst.shape_slot[0], 3.0);
    }
}

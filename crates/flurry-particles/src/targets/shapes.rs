//! Procedural targets: tree foliage, scatter shell, tree ornaments

use super::TargetField;
use crate::rand::ParticleRng;
use flurry_core::Vec3;
use std::f32::consts::{PI, TAU};

pub const TREE_HEIGHT: f32 = 15.12;
pub const TREE_RADIUS: f32 = 6.72;
const TREE_TOP_RADIUS: f32 = 0.84;
const TREE_TURNS_ANGLE: f32 = 20.0 * PI;
const DECORATION_STANDOFF: f32 = 1.0;

const SCATTER_RADIUS: f32 = 40.0;

/// Cone of foliage: apex at the top, widest at the base. Parametric depth
/// `t` drives height, radius and a spiral angle; radial jitter widens
/// toward the base.
pub fn tree_positions(count: usize, rng: &mut ParticleRng) -> TargetField {
    let positions = (0..count)
        .map(|_| {
            let t = rng.next_f32();
            let y = TREE_HEIGHT / 2.0 - t * TREE_HEIGHT;
            let radius = TREE_RADIUS * t;
            let angle = t * TREE_TURNS_ANGLE + rng.range(0.0, TAU);
            let spread = 0.3 + t * 1.8;
            let jx = rng.centered() * spread;
            let jz = rng.centered() * spread;
            Vec3::new(angle.cos() * radius + jx, y, angle.sin() * radius + jz)
        })
        .collect();
    TargetField::new(positions)
}

/// Spherical shell of radius 32 to 52 around the origin.
pub fn scatter_positions(count: usize, rng: &mut ParticleRng) -> TargetField {
    let positions = (0..count)
        .map(|_| {
            let theta = rng.range(0.0, TAU);
            let phi = rng.range(-1.0, 1.0).acos();
            let r = SCATTER_RADIUS * (0.8 + rng.next_f32() * 0.5);
            Vec3::new(
                r * phi.sin() * theta.cos(),
                r * phi.sin() * theta.sin(),
                r * phi.cos(),
            )
        })
        .collect();
    TargetField::new(positions)
}

/// Ornaments hanging just outside the foliage cone.
pub fn decoration_positions(count: usize, rng: &mut ParticleRng) -> TargetField {
    let positions = (0..count)
        .map(|_| {
            let t = rng.next_f32();
            let y = TREE_HEIGHT / 2.0 - t * TREE_HEIGHT;
            let r = TREE_TOP_RADIUS + (TREE_RADIUS - TREE_TOP_RADIUS) * t + DECORATION_STANDOFF;
            let angle = rng.range(0.0, TAU);
            Vec3::new(r * angle.cos(), y, r * angle.sin())
        })
        .collect();
    TargetField::new(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radial(p: &Vec3) -> f32 {
        (p.x * p.x + p.z * p.z).sqrt()
    }

    #[test]
    fn tree_stays_inside_jittered_cone() {
        let field = tree_positions(5000, &mut ParticleRng::new(11));
        assert_eq!(field.len(), 5000);
        for p in field.positions() {
            assert!(p.y <= TREE_HEIGHT / 2.0 && p.y > -TREE_HEIGHT / 2.0);
            let t = (TREE_HEIGHT / 2.0 - p.y) / TREE_HEIGHT;
            // Cone radius plus the worst-case diagonal jitter
            let bound = TREE_RADIUS * t + (0.3 + 1.8 * t) * 0.75;
            assert!(radial(p) <= bound + 1e-3);
        }
    }

    #[test]
    fn scatter_shell_bounds() {
        let field = scatter_positions(4000, &mut ParticleRng::new(3));
        for p in field.positions() {
            let r = p.length();
            assert!(r >= 32.0 - 1e-3 && r < 52.0 + 1e-3, "r = {r}");
        }
    }

    #[test]
    fn decorations_sit_outside_the_cone() {
        let field = decoration_positions(1000, &mut ParticleRng::new(9));
        for p in field.positions() {
            let t = (TREE_HEIGHT / 2.0 - p.y) / TREE_HEIGHT;
            assert!(radial(p) > TREE_RADIUS * t);
            assert!(radial(p) >= TREE_TOP_RADIUS + DECORATION_STANDOFF - 1e-3);
        }
    }

    #[test]
    fn same_seed_same_shape() {
        let a = tree_positions(100, &mut ParticleRng::new(5));
        let b = tree_positions(100, &mut ParticleRng::new(5));
        assert_eq!(a, b);
    }
}

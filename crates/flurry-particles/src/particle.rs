//! Particle types: CPU simulation state and GPU instance data

use crate::rand::ParticleRng;
use bytemuck::{Pod, Zeroable};
use flurry_core::{Color, Vec3};
use serde::Serialize;

/// Instanced geometry a particle is drawn with. Particles are dealt to the
/// five shapes round-robin so each instanced batch holds `count / 5` entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleShape {
    Sphere,
    Cube,
    TriangularPrism,
    PentagonalPrism,
    HexagonalPrism,
}

impl ParticleShape {
    pub const COUNT: usize = 5;

    pub fn for_index(index: usize) -> Self {
        match index % Self::COUNT {
            0 => ParticleShape::Sphere,
            1 => ParticleShape::Cube,
            2 => ParticleShape::TriangularPrism,
            3 => ParticleShape::PentagonalPrism,
            _ => ParticleShape::HexagonalPrism,
        }
    }

    /// Slot of `index` inside its shape's instanced batch
    pub fn instance_slot(index: usize) -> usize {
        index / Self::COUNT
    }
}

/// Per-particle constants drawn once at creation.
#[derive(Clone, Copy, Debug)]
pub struct ParticleSeeds {
    /// Jitter/twinkle phase in [0, 1)
    pub phase: f32,
    /// Transition and explosion inertia in [0.4, 1.6)
    pub inertia: f32,
    /// Fixed base size the scale multiplier applies to
    pub base_size: f32,
    /// Resting color when no mode overrides it
    pub palette: Color,
}

impl ParticleSeeds {
    pub fn draw(rng: &mut ParticleRng, palette: &[Color; 2], primary_share: f32) -> Self {
        let base_size = 0.0067 + rng.next_f32() * 0.02;
        let phase = rng.next_f32();
        let inertia = 0.4 + rng.next_f32() * 1.2;
        let palette = if rng.next_f32() < primary_share {
            palette[0]
        } else {
            palette[1]
        };
        Self {
            phase,
            inertia,
            base_size,
            palette,
        }
    }
}

/// CPU-side particle state (not sent to GPU)
#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Blended color before brightness and activation tint
    pub color: Color,
    /// Multiplier on `seeds.base_size`
    pub scale: f32,
    /// Brightness multiplier applied to the displayed color this frame
    pub brightness: f32,
    /// Transient glow in [0, 1]
    pub activation: f32,
    pub seeds: ParticleSeeds,
}

impl Particle {
    pub fn new(seeds: ParticleSeeds, position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            color: seeds.palette,
            scale: 1.0,
            brightness: 1.0,
            activation: 0.0,
            seeds,
        }
    }

    /// Final rendered size
    pub fn size(&self) -> f32 {
        self.seeds.base_size * self.scale
    }
}

/// Transform handed to a render sink for one particle. Particles are
/// rotation-free; `rotation` is the identity quaternion `[x, y, z, w]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ParticleTransform {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: f32,
}

/// GPU instance data, matching a WGSL `ParticleInstance` struct.
/// 48 bytes, 16-byte aligned (3 rows of vec4).
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    /// World position + size packed into vec4
    pub pos_size: [f32; 4], // xyz = position, w = size
    /// Displayed color, alpha always 1
    pub color: [f32; 4],
    /// x = shape index, y = slot within the shape batch, z = activation, w = unused
    pub shape_slot: [f32; 4],
}

impl ParticleInstance {
    pub fn from_particle(index: usize, p: &Particle, displayed: Color) -> Self {
        Self {
            pos_size: [p.position.x, p.position.y, p.position.z, p.size()],
            color: [displayed.r, displayed.g, displayed.b, 1.0],
            shape_slot: [
                (index % ParticleShape::COUNT) as f32,
                ParticleShape::instance_slot(index) as f32,
                p.activation,
                0.0,
            ],
        }
    }
}

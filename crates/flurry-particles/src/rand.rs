//! Seeded particle RNG on top of `rand`'s `StdRng`

use flurry_core::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct ParticleRng {
    inner: StdRng,
}

impl ParticleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// Non-reproducible generator for production runs
    pub fn from_entropy() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }

    /// Derive an independent generator, e.g. for a background job
    pub fn fork(&mut self) -> Self {
        Self::new(self.inner.gen())
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.gen()
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.gen::<f32>()
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        min + self.next_f32() * (max - min)
    }

    /// Returns a float in [-0.5, 0.5)
    pub fn centered(&mut self) -> f32 {
        self.next_f32() - 0.5
    }

    /// Normalized vector from a uniform sample of the [-1, 1] cube.
    /// Biased toward the cube's diagonals, which reads as a livelier burst
    /// than a perfectly uniform sphere.
    pub fn cube_direction(&mut self) -> Vec3 {
        let v = Vec3::new(
            self.range(-1.0, 1.0),
            self.range(-1.0, 1.0),
            self.range(-1.0, 1.0),
        );
        let len = v.length();
        if len < 1e-6 {
            return Vec3::UP;
        }
        v * (1.0 / len)
    }

    /// Uniform index in `0..len`; `None` for an empty range
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.inner.gen_range(0..len))
        }
    }
}

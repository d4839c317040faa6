//! Tuning parameters for the particle field
//!
//! Every section deserializes with `#[serde(default)]` so a TOML file only
//! needs the keys it overrides.

use serde::{Deserialize, Serialize};

/// Steady-pursuit motion, twinkle, color blending and activation glow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Base pursuit rate per second
    pub pursuit_speed: f32,
    /// Pursuit rate multiplier is `inertia_base + inertia_gain * inertia`
    pub inertia_base: f32,
    pub inertia_gain: f32,
    /// Amplitude of the idle jitter added to steady targets
    pub jitter_amplitude: f32,
    /// Jitter multiplier while scattered
    pub scatter_jitter: f32,
    /// Color blend rate per second in image mode
    pub image_color_rate: f32,
    /// Color blend rate per second elsewhere
    pub color_rate: f32,
    /// Share of particles seeded with the primary (gold) palette color
    pub primary_share: f32,
    /// Distance from the light within which particles light up
    pub activation_radius: f32,
    /// Activation lost per second
    pub activation_decay: f32,
    /// Brightness gain at full activation
    pub activation_glow: f32,
    /// How far full activation pulls the displayed color toward gold
    pub activation_tint: f32,
    pub image_brightness: f32,
    pub image_scale: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            pursuit_speed: 1.5,
            inertia_base: 0.8,
            inertia_gain: 0.5,
            jitter_amplitude: 0.05,
            scatter_jitter: 2.0,
            image_color_rate: 5.0,
            color_rate: 2.0,
            primary_share: 0.7,
            activation_radius: 3.0,
            activation_decay: 0.65,
            activation_glow: 1.25,
            activation_tint: 0.8,
            image_brightness: 1.24,
            image_scale: 1.075,
        }
    }
}

/// Free-flight burst that precedes the wish reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosionConfig {
    /// Minimum launch speed before the inertia multiplier
    pub speed_min: f32,
    /// Random launch speed added on top of `speed_min`
    pub speed_spread: f32,
    /// Extra upward launch velocity
    pub lift: f32,
    /// Per-frame velocity retention
    pub damping: f32,
    pub gravity: f32,
    /// Seconds until particles shrink to nothing
    pub shrink_duration: f32,
    /// Seconds the launch flash takes to fade
    pub flash_duration: f32,
    /// Peak extra brightness of the flash
    pub flash_gain: f32,
    /// Scale below which brightness fades with scale
    pub fade_floor: f32,
}

impl Default for ExplosionConfig {
    fn default() -> Self {
        Self {
            speed_min: 80.0,
            speed_spread: 120.0,
            lift: 20.0,
            damping: 0.95,
            gravity: 9.8,
            shrink_duration: 1.5,
            flash_duration: 0.8,
            flash_gain: 5.0,
            fade_floor: 0.1,
        }
    }
}

/// Left-to-right staggered wish reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WishConfig {
    /// Seconds each particle takes to ramp in
    pub ramp: f32,
    /// Delay between the leftmost and rightmost particle starting
    pub delay_span: f32,
    /// Scene X mapped to zero delay is `-left_edge`
    pub left_edge: f32,
    /// Scene width mapped onto the full delay span
    pub sweep_width: f32,
    /// Particle scale once fully revealed
    pub scale_cap: f32,
}

impl Default for WishConfig {
    fn default() -> Self {
        Self {
            ramp: 2.5,
            delay_span: 1.5,
            left_edge: 11.25,
            sweep_width: 22.5,
            scale_cap: 0.54,
        }
    }
}

impl WishConfig {
    /// Seconds after wish entry before a particle at `x` starts to appear.
    pub fn delay_for(&self, x: f32) -> f32 {
        if self.sweep_width <= 0.0 {
            return 0.0;
        }
        (x + self.left_edge) / self.sweep_width * self.delay_span
    }
}

/// All tuning the field needs, grouped by regime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub motion: MotionConfig,
    pub explosion: ExplosionConfig,
    pub wish: WishConfig,
}

//! Choreography configuration loaded from TOML
//!
//! ```toml
//! [particles]
//! count = 62500
//! seed = 7
//!
//! [schedule]
//! advance_interval = 45.0
//! autoplay = true
//!
//! [assets]
//! logo_image = "assets/logo.png"
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use flurry_core::{FlurryError, Result};
use flurry_particles::{ExplosionConfig, FieldConfig, MotionConfig, WishConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PARTICLE_COUNT: usize = 62_500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlesConfig {
    pub count: usize,
    /// Fixed seed for reproducible runs; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_PARTICLE_COUNT,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between automatic advances
    pub advance_interval: f32,
    /// Seconds the wish stays up after the interlude hands over
    pub wish_interval: f32,
    /// Seconds from reaching the treetop to the wish reveal
    pub interlude_delay: f32,
    /// Seconds the explosion signal stays active
    pub explosion_signal: f32,
    /// Seconds the sleigh takes to reach the treetop
    pub sleigh_duration: f32,
    /// Arm the auto-advance timer at start instead of on first interaction
    pub autoplay: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            advance_interval: 45.0,
            wish_interval: 18.0,
            interlude_delay: 1.0,
            explosion_signal: 3.0,
            sleigh_duration: 10.0,
            autoplay: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Image whose silhouette replaces the built-in greeting lettering
    pub logo_image: Option<PathBuf>,
    /// TrueType/OpenType font for all lettering; the bundled font when absent
    pub font: Option<PathBuf>,
    /// The two banner lines shown in text mode
    pub banner: [String; 2],
    /// Replacement wish pool; the built-in wishes when empty
    pub wishes: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            logo_image: None,
            font: None,
            banner: ["MERRY".to_string(), "CHRISTMAS".to_string()],
            wishes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreographyConfig {
    pub particles: ParticlesConfig,
    pub motion: MotionConfig,
    pub explosion: ExplosionConfig,
    pub wish: WishConfig,
    pub schedule: ScheduleConfig,
    pub assets: AssetsConfig,
}

impl ChoreographyConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("[config] loaded {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn field_config(&self) -> FieldConfig {
        FieldConfig {
            motion: self.motion.clone(),
            explosion: self.explosion.clone(),
            wish: self.wish.clone(),
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.particles.count == 0 {
            return Err(FlurryError::ValueOutOfRange {
                field: "particles.count".into(),
                min: 1.0,
                max: f64::MAX,
                value: 0.0,
            });
        }
        let positive = [
            ("schedule.advance_interval", self.schedule.advance_interval),
            ("schedule.wish_interval", self.schedule.wish_interval),
            ("schedule.sleigh_duration", self.schedule.sleigh_duration),
            ("wish.ramp", self.wish.ramp),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(FlurryError::ValueOutOfRange {
                    field: field.into(),
                    min: 0.0,
                    max: f64::MAX,
                    value: value as f64,
                });
            }
        }
        let unit = [
            ("motion.primary_share", self.motion.primary_share),
            ("explosion.damping", self.explosion.damping),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(FlurryError::ValueOutOfRange {
                    field: field.into(),
                    min: 0.0,
                    max: 1.0,
                    value: value as f64,
                });
            }
        }
        Ok(())
    }
}

//! Flurry Particles - the particle field and everything it chases
//!
//! - Target generators turning text, images and procedural shapes into
//!   dense per-particle target fields
//! - A target cache that builds fields on worker threads
//! - The per-frame integrator: steady pursuit, explosion free-flight and the
//!   staggered wish reveal
//! - The sleigh flight path that lights particles up
//! - Instance packing and a per-particle render sink

pub mod cache;
pub mod config;
pub mod curves;
pub mod field;
pub mod particle;
pub mod rand;
pub mod render;
pub mod sleigh;
pub mod targets;

pub use cache::{TargetCache, TargetSource};
pub use config::{ExplosionConfig, FieldConfig, MotionConfig, WishConfig};
pub use field::{FrameInput, ParticleField, TargetLookup};
pub use particle::{Particle, ParticleInstance, ParticleShape, ParticleTransform};
pub use render::{emit, RecordingSink, RenderSink, ShapeBatches, SinkRecord};
pub use sleigh::{SleighPath, SleighPose};
pub use targets::{default_raster, MonoFontRaster, NullRaster, OutlineFontRaster, TargetField, TextRaster};

//! Flurry Core - Foundational types for the Flurry engine
//!
//! This crate provides the core types that all other Flurry crates depend on:
//! - `Vec3`, `Color` - Spatial and color types
//! - `Mode` - The closed set of swarm formations
//! - `ContentHash` - SHA-256 based source fingerprints
//! - `spline` - Catmull-Rom path math
//! - Error types and Result alias

mod error;
mod hash;
mod mode;
pub mod spline;
mod types;

pub use error::{FlurryError, Result};
pub use hash::ContentHash;
pub use mode::Mode;
pub use types::{Color, Vec3};

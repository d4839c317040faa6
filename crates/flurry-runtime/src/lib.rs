//! Flurry Runtime - choreography on top of the particle field
//!
//! - `GameClock`: wall-clock or fixed-step frame timing
//! - `ModeMachine`: current formation and when it was entered
//! - `AutoAdvance` / `ExplosionInterlude`: polled deadlines
//! - `GameEvent` / `EventBus`: what happened this frame, for the host
//! - `Choreographer`: owns all of the above plus the target cache and field

mod choreographer;
mod clock;
mod config;
mod event;
mod event_bus;
mod input;
mod mode;
mod scheduler;
mod wishes;

pub use choreographer::Choreographer;
pub use clock::GameClock;
pub use config::{AssetsConfig, ChoreographyConfig, ParticlesConfig, ScheduleConfig, DEFAULT_PARTICLE_COUNT};
pub use event::{GameEvent, TransitionCause};
pub use event_bus::EventBus;
pub use input::{TapGesture, TapThresholds};
pub use mode::{ModeMachine, Transition};
pub use scheduler::{AutoAdvance, ExplosionInterlude, InterludeStep};
pub use wishes::{WishPool, WISHES};

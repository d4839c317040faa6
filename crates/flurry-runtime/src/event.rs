//! Events the choreographer reports to its host

use flurry_core::Mode;
use serde::Serialize;

/// What caused a mode transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    /// Auto-advance timer
    Auto,
    /// Tap or explicit advance request
    Advance,
    /// Photo upload forcing image mode
    Upload,
    /// Host set the mode directly
    Explicit,
    /// Deferred wish after the sleigh reached the top
    Interlude,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    ModeChanged {
        from: Mode,
        to: Mode,
        cause: TransitionCause,
        at: f32,
    },
    ReachedTop {
        at: f32,
    },
    ExplosionStarted {
        at: f32,
    },
    ExplosionEnded {
        at: f32,
    },
    TargetsPublished {
        mode: Mode,
    },
    UploadRejected {
        reason: String,
    },
}

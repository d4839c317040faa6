//! Mode state machine: which formation is live and since when

use flurry_core::Mode;

/// A completed mode change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub at: f32,
}

pub struct ModeMachine {
    current: Mode,
    previous: Option<Mode>,
    entered_at: f32,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ModeMachine {
    /// Start in Greeting at `now`.
    pub fn new(now: f32) -> Self {
        Self {
            current: Mode::Greeting,
            previous: None,
            entered_at: now,
        }
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    pub fn previous(&self) -> Option<Mode> {
        self.previous
    }

    pub fn entered_at(&self) -> f32 {
        self.entered_at
    }

    pub fn since_entry(&self, now: f32) -> f32 {
        (now - self.entered_at).max(0.0)
    }

    /// Switch to `mode`. Re-entering the current mode is not a transition
    /// and leaves the entry time alone.
    pub fn enter(&mut self, mode: Mode, now: f32) -> Option<Transition> {
        if mode == self.current {
            return None;
        }
        let from = self.current;
        self.previous = Some(from);
        self.current = mode;
        self.entered_at = now;
        Some(Transition { from, to: mode, at: now })
    }

    /// Next mode in the cycle.
    pub fn advance(&mut self, now: f32) -> Option<Transition> {
        self.enter(self.current.next(), now)
    }

    /// An accepted photo forces image mode.
    pub fn upload(&mut self, now: f32) -> Option<Transition> {
        self.enter(Mode::Image, now)
    }
}

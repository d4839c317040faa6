//! Frame clock: wall-clock driven for live hosts, manually stepped for
//! headless runs

use std::time::Instant;

/// Tracks elapsed time and the last frame's delta
pub struct GameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Longest delta a single frame may report
    pub max_delta: f64,
    /// Frames ticked so far
    pub frame: u64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            max_delta: 0.25,
            frame: 0,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance from the wall clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            self.frame += 1;
            return;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance by an explicit step, for fixed-rate headless simulation.
    pub fn advance(&mut self, dt: f64) {
        // Clamp to avoid one huge step after a stall
        self.delta_time = dt.clamp(0.0, self.max_delta);
        self.total_time += self.delta_time;
        self.frame += 1;
    }

    /// Elapsed and delta as the `f32` pair the choreographer consumes
    pub fn frame_times(&self) -> (f32, f32) {
        (self.total_time as f32, self.delta_time as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = GameClock::new();
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame, 0);
    }

    #[test]
    fn test_first_tick_zero_delta() {
        let mut clock = GameClock::new();
        clock.tick();
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.frame, 1);
    }

    #[test]
    fn fixed_steps_accumulate() {
        let mut clock = GameClock::new();
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.total_time - 1.0).abs() < 1e-9);
        assert_eq!(clock.frame, 60);
        let (elapsed, delta) = clock.frame_times();
        assert!((elapsed - 1.0).abs() < 1e-6);
        assert!((delta - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut clock = GameClock::new();
        clock.advance(3.0);
        assert_eq!(clock.delta_time, 0.25);
        clock.advance(-1.0);
        assert_eq!(clock.delta_time, 0.0);
    }
}

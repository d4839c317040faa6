//! Polled deadlines: the auto-advance timer and the explosion interlude
//!
//! Nothing here owns an OS timer. The choreographer asks each deadline
//! whether it is due once per tick, so there is exactly one pending
//! auto-advance at any time and rearming simply overwrites it.

/// Periodic request to move to the next mode.
#[derive(Debug, Clone)]
pub struct AutoAdvance {
    interval: f32,
    deadline: Option<f32>,
}

impl AutoAdvance {
    /// Disarmed timer that fires every `interval` seconds once armed.
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<f32> {
        self.deadline
    }

    /// Fire one regular interval from `now`, replacing any pending deadline.
    pub fn arm(&mut self, now: f32) {
        self.arm_for(now, self.interval);
    }

    /// Fire once `after` seconds from `now`; later rearms use the regular
    /// interval again.
    pub fn arm_for(&mut self, now: f32, after: f32) {
        self.deadline = Some(now + after.max(0.0));
    }

    /// Rearm only if already armed.
    pub fn rearm(&mut self, now: f32) {
        if self.is_armed() {
            self.arm(now);
        }
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// True once the deadline has passed. The timer immediately schedules
    /// the next regular interval.
    pub fn poll(&mut self, now: f32) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.arm(now);
                true
            }
            _ => false,
        }
    }
}

/// What the interlude wants done this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterludeStep {
    /// Time to hand over to the wish reveal
    pub handover: bool,
    /// The explosion signal just ran out
    pub signal_ended: bool,
}

/// The short episode between the sleigh reaching the treetop and the wish
/// reveal: an explosion signal of fixed length and a deferred switch to
/// Wish.
#[derive(Debug, Clone)]
pub struct ExplosionInterlude {
    handover_delay: f32,
    signal_duration: f32,
    started_at: Option<f32>,
    handover_at: Option<f32>,
    signal_until: Option<f32>,
}

impl ExplosionInterlude {
    pub fn new(handover_delay: f32, signal_duration: f32) -> Self {
        Self {
            handover_delay,
            signal_duration,
            started_at: None,
            handover_at: None,
            signal_until: None,
        }
    }

    /// Start the episode. A second trigger before `reset` is ignored.
    pub fn trigger(&mut self, now: f32) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        self.handover_at = Some(now + self.handover_delay);
        self.signal_until = Some(now + self.signal_duration);
        true
    }

    pub fn started_at(&self) -> Option<f32> {
        self.started_at
    }

    pub fn is_triggered(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn signal_active(&self) -> bool {
        self.signal_until.is_some()
    }

    pub fn handover_pending(&self) -> bool {
        self.handover_at.is_some()
    }

    /// Drop the deferred handover, keeping the signal running.
    pub fn cancel_handover(&mut self) {
        self.handover_at = None;
    }

    /// Forget the episode entirely.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.handover_at = None;
        self.signal_until = None;
    }

    pub fn poll(&mut self, now: f32) -> InterludeStep {
        let mut step = InterludeStep::default();
        if self.handover_at.is_some_and(|at| now >= at) {
            self.handover_at = None;
            step.handover = true;
        }
        if self.signal_until.is_some_and(|until| now >= until) {
            self.signal_until = None;
            step.signal_ended = true;
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_timer_never_fires() {
        let mut timer = AutoAdvance::new(45.0);
        assert!(!timer.poll(1000.0));
        timer.rearm(10.0);
        assert!(!timer.is_armed());
    }

    #[test]
    fn fires_on_deadline_and_reschedules() {
        let mut timer = AutoAdvance::new(45.0);
        timer.arm(0.0);
        assert!(!timer.poll(44.9));
        assert!(timer.poll(45.0));
        assert_eq!(timer.deadline(), Some(90.0));
    }

    #[test]
    fn rearm_replaces_pending_deadline() {
        let mut timer = AutoAdvance::new(45.0);
        timer.arm(0.0);
        timer.rearm(30.0);
        assert!(!timer.poll(45.0));
        assert!(timer.poll(75.0));
    }

    #[test]
    fn one_shot_interval() {
        let mut timer = AutoAdvance::new(45.0);
        timer.arm_for(10.0, 18.0);
        assert!(timer.poll(28.0));
        assert_eq!(timer.deadline(), Some(73.0));
        timer.disarm();
        assert!(!timer.is_armed());
    }

    #[test]
    fn interlude_hands_over_then_ends_signal() {
        let mut interlude = ExplosionInterlude::new(1.0, 3.0);
        assert!(interlude.trigger(10.0));
        assert!(!interlude.trigger(10.5));
        assert!(interlude.signal_active());

        assert_eq!(interlude.poll(10.5), InterludeStep::default());
        let step = interlude.poll(11.0);
        assert!(step.handover && !step.signal_ended);
        assert!(!interlude.poll(12.0).handover);
        let step = interlude.poll(13.0);
        assert!(step.signal_ended);
        assert!(!interlude.signal_active());
        assert!(interlude.is_triggered());
    }

    #[test]
    fn cancelled_handover_never_fires() {
        let mut interlude = ExplosionInterlude::new(1.0, 3.0);
        interlude.trigger(0.0);
        assert!(interlude.handover_pending());
        interlude.cancel_handover();
        assert!(!interlude.handover_pending());
        assert!(!interlude.poll(5.0).handover);
        interlude.reset();
        assert!(interlude.trigger(6.0));
    }
}

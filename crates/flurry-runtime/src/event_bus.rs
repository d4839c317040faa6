//! Event bus for broadcasting choreography events

use crate::event::GameEvent;

/// A simple event queue the choreographer pushes to and the host drains
pub struct EventBus {
    events: Vec<GameEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event onto the bus
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events from the bus, returning them
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TransitionCause;
    use flurry_core::Mode;

    #[test]
    fn test_push_and_drain() {
        let mut bus = EventBus::new();
        assert!(bus.is_empty());

        bus.push(GameEvent::ReachedTop { at: 9.9 });
        bus.push(GameEvent::ModeChanged {
            from: Mode::Tree,
            to: Mode::Wish,
            cause: TransitionCause::Interlude,
            at: 10.9,
        });

        assert_eq!(bus.len(), 2);
        assert!(!bus.is_empty());

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_drain_clears() {
        let mut bus = EventBus::new();
        bus.push(GameEvent::TargetsPublished { mode: Mode::Text });

        let _ = bus.drain();
        let events = bus.drain();
        assert!(events.is_empty());
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_string(&GameEvent::ExplosionStarted { at: 1.5 }).unwrap();
        assert_eq!(json, r#"{"event":"explosion_started","at":1.5}"#);
    }
}

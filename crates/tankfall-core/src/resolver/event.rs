//! Event log for presentation and telemetry.
//!
//! Resolvers push [`GameEvent`]s while they mutate the arena. The log never
//! changes game state; the host drains it with [`EventLog::take_events`] once
//! per tick (or whenever it likes) to drive UI, audio or analytics.

use crate::output::GameEvent;

/// Ordered buffer of events produced during resolution.
///
/// # Example
///
/// ```
/// use tankfall_core::entity::EntityId;
/// use tankfall_core::output::GameEvent;
/// use tankfall_core::resolver::EventLog;
///
/// let mut log = EventLog::new();
/// log.push(GameEvent::PlayerRespawned { entity: EntityId::new(0) });
/// assert_eq!(log.len(), 1);
///
/// let events = log.take_events();
/// assert_eq!(events.len(), 1);
/// assert!(log.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event.
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drains and returns all recorded events, oldest first.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events recorded so far, without draining.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Returns the number of events currently in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the event log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clears all events from the log without returning them.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

//! Event logging and observer notification
//!
//! The Event enum captures every significant state change of a session.
//! Events serve two consumers:
//! - the append-only [`EventLog`], used for auditing and by tests
//! - registered [`EventSink`] observers (the audio collaborator
//!   boundary) which are notified, never polled
//!
//! The core does not depend on what a sink does with a notification;
//! sinks are infallible by contract so no collaborator failure can
//! abort a tick.

use serde::{Deserialize, Serialize};

use crate::models::facility::FacilityKind;
use crate::models::session::GameOverReason;

/// Simulation event capturing a state change
///
/// All events carry `at`, the simulation time when they occurred.
/// Within one tick, events are logged in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A session started (fresh or restarted)
    SessionStarted { at: u64, difficulty: u32 },

    /// The running session was paused
    SessionPaused { at: u64 },

    /// The paused session resumed
    SessionResumed { at: u64 },

    /// The session ended (lives reached zero)
    SessionEnded {
        at: u64,
        score: u32,
        reason: GameOverReason,
        new_high_score: bool,
    },

    /// A new occupant entered the queue
    OccupantSpawned { at: u64, occupant_id: u64 },

    /// An occupant was matched to a facility
    OccupantAssigned {
        at: u64,
        occupant_id: u64,
        kind: FacilityKind,
        index: usize,
    },

    /// A waiting occupant exhausted its wait budget
    OccupantTimedOut { at: u64, occupant_id: u64 },

    /// A Primary facility auto-released (scores a point)
    PrimaryReleased {
        at: u64,
        index: usize,
        occupant_id: u64,
    },

    /// A Secondary facility auto-released (no score)
    SecondaryReleased {
        at: u64,
        index: usize,
        occupant_id: u64,
    },

    /// Two adjacent Primary slots became simultaneously occupied
    ///
    /// The assignment itself succeeded; the life penalty lands later,
    /// after the configured display delay.
    AdjacencyViolation { at: u64, index: usize },

    /// A life was gained (reward claimed)
    LifeGained { at: u64, lives: i32 },

    /// A life was lost
    LifeLost {
        at: u64,
        lives: i32,
        reason: GameOverReason,
    },

    /// Score reached a positive multiple of the milestone interval
    MilestoneReached {
        at: u64,
        score: u32,
        difficulty: u32,
    },

    /// A facility went out of order
    OutageStarted {
        at: u64,
        kind: FacilityKind,
        index: usize,
    },

    /// An out-of-order facility was restored
    OutageEnded {
        at: u64,
        kind: FacilityKind,
        index: usize,
    },

    /// A bonus-life reward appeared on a facility
    RewardPlaced {
        at: u64,
        kind: FacilityKind,
        index: usize,
    },

    /// A pending reward was consumed by an assignment
    RewardClaimed {
        at: u64,
        kind: FacilityKind,
        index: usize,
        occupant_id: u64,
    },
}

impl Event {
    /// Simulation time when this event occurred
    pub fn at(&self) -> u64 {
        match self {
            Event::SessionStarted { at, .. } => *at,
            Event::SessionPaused { at } => *at,
            Event::SessionResumed { at } => *at,
            Event::SessionEnded { at, .. } => *at,
            Event::OccupantSpawned { at, .. } => *at,
            Event::OccupantAssigned { at, .. } => *at,
            Event::OccupantTimedOut { at, .. } => *at,
            Event::PrimaryReleased { at, .. } => *at,
            Event::SecondaryReleased { at, .. } => *at,
            Event::AdjacencyViolation { at, .. } => *at,
            Event::LifeGained { at, .. } => *at,
            Event::LifeLost { at, .. } => *at,
            Event::MilestoneReached { at, .. } => *at,
            Event::OutageStarted { at, .. } => *at,
            Event::OutageEnded { at, .. } => *at,
            Event::RewardPlaced { at, .. } => *at,
            Event::RewardClaimed { at, .. } => *at,
        }
    }

    /// Short name of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "SessionStarted",
            Event::SessionPaused { .. } => "SessionPaused",
            Event::SessionResumed { .. } => "SessionResumed",
            Event::SessionEnded { .. } => "SessionEnded",
            Event::OccupantSpawned { .. } => "OccupantSpawned",
            Event::OccupantAssigned { .. } => "OccupantAssigned",
            Event::OccupantTimedOut { .. } => "OccupantTimedOut",
            Event::PrimaryReleased { .. } => "PrimaryReleased",
            Event::SecondaryReleased { .. } => "SecondaryReleased",
            Event::AdjacencyViolation { .. } => "AdjacencyViolation",
            Event::LifeGained { .. } => "LifeGained",
            Event::LifeLost { .. } => "LifeLost",
            Event::MilestoneReached { .. } => "MilestoneReached",
            Event::OutageStarted { .. } => "OutageStarted",
            Event::OutageEnded { .. } => "OutageEnded",
            Event::RewardPlaced { .. } => "RewardPlaced",
            Event::RewardClaimed { .. } => "RewardClaimed",
        }
    }
}

/// Observer boundary for event notifications
///
/// Registered sinks receive every event as it is logged. The engine
/// does not depend on what a sink does; the audio collaborator is the
/// canonical implementor.
pub trait EventSink {
    /// Called once per event, in emission order
    fn on_event(&mut self, event: &Event);
}

/// Append-only log of all events for one session
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in emission order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Count events of a given type name
    pub fn count_of(&self, event_type: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    /// Drop all events (used when a new session starts)
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_order() {
        let mut log = EventLog::new();
        log.log(Event::OccupantSpawned {
            at: 50,
            occupant_id: 1,
        });
        log.log(Event::OccupantSpawned {
            at: 100,
            occupant_id: 2,
        });

        assert_eq!(log.len(), 2);
        assert_eq!(log.events()[0].at(), 50);
        assert_eq!(log.events()[1].at(), 100);
    }

    #[test]
    fn test_count_of() {
        let mut log = EventLog::new();
        log.log(Event::LifeGained { at: 10, lives: 4 });
        log.log(Event::OccupantSpawned {
            at: 20,
            occupant_id: 1,
        });
        log.log(Event::LifeGained { at: 30, lives: 5 });

        assert_eq!(log.count_of("LifeGained"), 2);
        assert_eq!(log.count_of("LifeLost"), 0);
    }
}

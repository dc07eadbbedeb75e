//! Occupant model
//!
//! An occupant is a transient actor that waits for a facility, uses it,
//! and leaves. State transitions are monotone:
//! Waiting → Assigned → Using → removed (removal is terminal and not a
//! stored state — the queue simply drops the occupant).
//!
//! Elapsed-time queries are computed on demand from `now - spawned_at`,
//! never accumulated, so the timeout check is stateless and replay-safe.

use serde::{Deserialize, Serialize};

use crate::models::facility::FacilityKind;

/// Lifecycle state of an occupant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupantState {
    /// In the queue, wait clock running against the budget
    Waiting,
    /// Matched to a facility; the wait clock stops here
    Assigned,
    /// Occupying the facility; the facility's usage clock governs removal
    Using,
}

/// A transient actor awaiting or using a facility
///
/// # Example
/// ```
/// use facility_sim_core_rs::{Occupant, OccupantState};
///
/// let occupant = Occupant::new(1, 0, 12000);
/// assert_eq!(occupant.state(), OccupantState::Waiting);
/// assert_eq!(occupant.time_remaining(4000), 8000);
/// assert_eq!(occupant.time_remaining(12000), 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occupant {
    /// Session-unique id, monotonically increasing from 1
    id: u64,

    /// Time this occupant entered the queue
    spawned_at: u64,

    /// How long the occupant will wait before timing out
    wait_budget: u64,

    /// Current lifecycle state
    state: OccupantState,

    /// Facility this occupant was matched to, once assigned
    assigned_facility: Option<(FacilityKind, usize)>,
}

impl Occupant {
    /// Create a new waiting occupant
    pub fn new(id: u64, spawned_at: u64, wait_budget: u64) -> Self {
        Self {
            id,
            spawned_at,
            wait_budget,
            state: OccupantState::Waiting,
            assigned_facility: None,
        }
    }

    /// Session-unique id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Time this occupant entered the queue
    pub fn spawned_at(&self) -> u64 {
        self.spawned_at
    }

    /// Configured wait budget
    pub fn wait_budget(&self) -> u64 {
        self.wait_budget
    }

    /// Current lifecycle state
    pub fn state(&self) -> OccupantState {
        self.state
    }

    /// Facility this occupant was matched to, once assigned
    pub fn assigned_facility(&self) -> Option<(FacilityKind, usize)> {
        self.assigned_facility
    }

    /// Wait budget left at `now`
    ///
    /// While Waiting this decays toward zero; once assigned it is frozen
    /// at the full budget (neither decaying nor recovering).
    pub fn time_remaining(&self, now: u64) -> u64 {
        match self.state {
            OccupantState::Waiting => self
                .wait_budget
                .saturating_sub(now.saturating_sub(self.spawned_at)),
            OccupantState::Assigned | OccupantState::Using => self.wait_budget,
        }
    }

    /// Whether this occupant has exhausted its wait budget
    pub fn is_expired(&self, now: u64) -> bool {
        self.state == OccupantState::Waiting && self.time_remaining(now) == 0
    }

    /// Transition Waiting → Assigned, recording the target facility
    ///
    /// # Panics
    /// Panics unless the occupant is Waiting; assigning a non-waiting
    /// occupant is a programming error.
    pub fn assign(&mut self, kind: FacilityKind, index: usize) {
        assert_eq!(
            self.state,
            OccupantState::Waiting,
            "assign() on occupant {} in state {:?}",
            self.id,
            self.state
        );
        self.state = OccupantState::Assigned;
        self.assigned_facility = Some((kind, index));
    }

    /// Transition Assigned → Using
    ///
    /// Using is a marker for external collaborators; the facility's
    /// usage clock governs removal, the occupant runs no timer of its
    /// own from here on.
    pub fn start_using(&mut self) {
        assert_eq!(
            self.state,
            OccupantState::Assigned,
            "start_using() on occupant {} in state {:?}",
            self.id,
            self.state
        );
        self.state = OccupantState::Using;
    }
}

//! Occupant queue
//!
//! Owns the live set of occupants, keyed by their monotonically
//! increasing ids. Iteration order is id-ascending everywhere — the
//! timeout scan and the head-of-queue assignment both depend on it, and
//! it is what makes "always serve the oldest waiter" deterministic.

use thiserror::Error;

use crate::models::facility::FacilityKind;
use crate::models::occupant::{Occupant, OccupantState};

/// Errors callers are expected to handle
#[derive(Debug, Error, PartialEq)]
pub enum QueueError {
    #[error("no waiting occupant in the queue")]
    QueueEmpty,
}

/// Owner of all live occupants
///
/// # Example
/// ```
/// use facility_sim_core_rs::{FacilityKind, OccupantQueue};
///
/// let mut queue = OccupantQueue::new(12000);
/// let first = queue.spawn(0);
/// let second = queue.spawn(3500);
/// assert_eq!((first, second), (1, 2));
///
/// // The oldest waiter is always served first.
/// let assigned = queue.assign_head(FacilityKind::Primary, 0).unwrap();
/// assert_eq!(assigned, first);
/// ```
#[derive(Debug, Clone)]
pub struct OccupantQueue {
    /// Live occupants, id-ascending (ids are handed out monotonically
    /// and only appended, so the vector stays sorted)
    occupants: Vec<Occupant>,

    /// Next id to hand out; reset to 1 with the session
    next_id: u64,

    /// Wait budget stamped onto every new occupant
    wait_budget: u64,
}

impl OccupantQueue {
    /// Create an empty queue handing out the given wait budget
    pub fn new(wait_budget: u64) -> Self {
        Self {
            occupants: Vec::new(),
            next_id: 1,
            wait_budget,
        }
    }

    /// Create a new waiting occupant, returning its id
    pub fn spawn(&mut self, now: u64) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.occupants.push(Occupant::new(id, now, self.wait_budget));
        id
    }

    /// All live occupants, id-ascending
    pub fn occupants(&self) -> &[Occupant] {
        &self.occupants
    }

    /// Look up one occupant
    pub fn get(&self, occupant_id: u64) -> Option<&Occupant> {
        self.occupants.iter().find(|o| o.id() == occupant_id)
    }

    /// Number of live occupants
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Whether no occupants are live
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Number of occupants still Waiting
    pub fn waiting_count(&self) -> usize {
        self.occupants
            .iter()
            .filter(|o| o.state() == OccupantState::Waiting)
            .count()
    }

    /// First (lowest-id) Waiting occupant whose budget has run out
    pub fn check_timeout(&self, now: u64) -> Option<u64> {
        self.occupants
            .iter()
            .find(|o| o.is_expired(now))
            .map(|o| o.id())
    }

    /// Assign the lowest-id Waiting occupant to the given facility
    ///
    /// Transitions it Waiting → Assigned → Using and records the
    /// target. The player chooses *where*, never *which*: the oldest
    /// waiter is always the one placed.
    pub fn assign_head(
        &mut self,
        kind: FacilityKind,
        index: usize,
    ) -> Result<u64, QueueError> {
        let head = self
            .occupants
            .iter_mut()
            .find(|o| o.state() == OccupantState::Waiting)
            .ok_or(QueueError::QueueEmpty)?;

        head.assign(kind, index);
        head.start_using();
        Ok(head.id())
    }

    /// Delete an occupant from the live set unconditionally
    ///
    /// Used both for normal completion and for forced eviction.
    ///
    /// # Panics
    /// Panics if the id is not live; removing a nonexistent occupant is
    /// a programming error.
    pub fn remove(&mut self, occupant_id: u64) {
        let position = self
            .occupants
            .iter()
            .position(|o| o.id() == occupant_id)
            .unwrap_or_else(|| panic!("remove() of unknown occupant id {}", occupant_id));
        let _ = self.occupants.remove(position);
    }

    /// Clear all occupants and restart ids at 1
    pub fn reset(&mut self) {
        self.occupants.clear();
        self.next_id = 1;
    }

    /// Waiting occupant ids wrapped into fixed-size display rows
    ///
    /// Pure ordering helper for the render collaborator: id-ascending,
    /// `per_row` entries per row, last row possibly short.
    pub fn display_rows(&self, per_row: usize) -> Vec<Vec<u64>> {
        assert!(per_row > 0, "per_row must be positive");
        let waiting: Vec<u64> = self
            .occupants
            .iter()
            .filter(|o| o.state() == OccupantState::Waiting)
            .map(|o| o.id())
            .collect();
        waiting.chunks(per_row).map(|row| row.to_vec()).collect()
    }
}

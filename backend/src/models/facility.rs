//! Facility model
//!
//! A facility is a single assignable resource slot. There are two kinds:
//! Primary slots participate in the adjacency rule (two occupied
//! neighbors with consecutive indices are an illegal configuration),
//! Secondary slots are exempt.
//!
//! # Critical Invariants
//!
//! 1. `occupied` ⇒ `occupied_at` is set and `out_of_order` is false
//! 2. `out_of_order` ⇒ `occupied` is false (setting the flag on an
//!    occupied slot forces an immediate release)
//! 3. A facility is *available* iff not occupied and not out of order

use serde::{Deserialize, Serialize};

/// The two facility kinds
///
/// Ordinal indices are stable and zero-based within each kind; for
/// `Primary` they define the adjacency neighbors (index ± 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacilityKind {
    /// Adjacency-checked slot
    Primary,
    /// Adjacency-exempt slot
    Secondary,
}

/// A single assignable resource slot
///
/// Created once at pool initialization with a fixed kind and index;
/// occupancy and outage flags mutate for the session lifetime.
///
/// # Example
/// ```
/// use facility_sim_core_rs::{Facility, FacilityKind};
///
/// let mut facility = Facility::new(FacilityKind::Primary, 0, 4000);
/// assert!(facility.is_available());
///
/// facility.occupy(1, 100);
/// assert!(facility.is_occupied());
/// assert!(!facility.usage_expired(4099));
/// assert!(facility.usage_expired(4100)); // boundary is inclusive
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    /// Kind of this slot (fixed at creation)
    kind: FacilityKind,

    /// Stable zero-based ordinal within its kind
    index: usize,

    /// Whether an occupant currently holds this slot
    occupied: bool,

    /// Weak back-reference to the occupant holding the slot
    ///
    /// Never an owning handle: the occupant lives in the queue and is
    /// looked up by id when the slot auto-releases.
    occupant_id: Option<u64>,

    /// Time the current occupancy began
    occupied_at: Option<u64>,

    /// How long one occupancy lasts before auto-release (per kind)
    usage_duration: u64,

    /// Temporarily unavailable through a disruption
    out_of_order: bool,

    /// Bonus-life flag, consumed by the next assignment
    has_reward: bool,
}

impl Facility {
    /// Create a new free facility
    pub fn new(kind: FacilityKind, index: usize, usage_duration: u64) -> Self {
        Self {
            kind,
            index,
            occupied: false,
            occupant_id: None,
            occupied_at: None,
            usage_duration,
            out_of_order: false,
            has_reward: false,
        }
    }

    /// Kind of this slot
    pub fn kind(&self) -> FacilityKind {
        self.kind
    }

    /// Stable ordinal index within its kind
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether an occupant currently holds this slot
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Id of the occupant holding this slot, if any
    pub fn occupant_id(&self) -> Option<u64> {
        self.occupant_id
    }

    /// Time the current occupancy began, if occupied
    pub fn occupied_at(&self) -> Option<u64> {
        self.occupied_at
    }

    /// Configured occupancy duration for this slot
    pub fn usage_duration(&self) -> u64 {
        self.usage_duration
    }

    /// Whether the slot is disabled by a disruption
    pub fn is_out_of_order(&self) -> bool {
        self.out_of_order
    }

    /// Whether a bonus-life reward is waiting on this slot
    pub fn has_reward(&self) -> bool {
        self.has_reward
    }

    /// Available = not occupied and not out of order
    pub fn is_available(&self) -> bool {
        !self.occupied && !self.out_of_order
    }

    /// Mark the slot occupied by the given occupant at the given time
    ///
    /// # Panics
    /// Panics if the slot is not available. Callers (the pool) must
    /// check availability first; occupying an unavailable slot is a
    /// programming error, not a runtime condition.
    pub fn occupy(&mut self, occupant_id: u64, now: u64) {
        assert!(
            self.is_available(),
            "occupy() on unavailable facility {:?} #{}",
            self.kind,
            self.index
        );
        self.occupied = true;
        self.occupant_id = Some(occupant_id);
        self.occupied_at = Some(now);
    }

    /// Clear occupancy. Idempotent on an already-free slot.
    pub fn release(&mut self) {
        self.occupied = false;
        self.occupant_id = None;
        self.occupied_at = None;
    }

    /// Whether the current occupancy has run its full duration
    ///
    /// The boundary is inclusive: expired exactly at
    /// `occupied_at + usage_duration`.
    pub fn usage_expired(&self, now: u64) -> bool {
        match self.occupied_at {
            Some(at) if self.occupied => now.saturating_sub(at) >= self.usage_duration,
            _ => false,
        }
    }

    /// Units elapsed in the current occupancy, if occupied
    pub fn usage_elapsed(&self, now: u64) -> Option<u64> {
        if self.occupied {
            self.occupied_at.map(|at| now.saturating_sub(at))
        } else {
            None
        }
    }

    /// Set or clear the out-of-order flag. Idempotent.
    ///
    /// Setting the flag on an occupied slot forces a release first and
    /// returns the evicted occupant id so the caller can drop the
    /// occupant from the queue. The eviction carries no life penalty; it
    /// is a facility fault, not a player error.
    pub fn set_out_of_order(&mut self, flag: bool) -> Option<u64> {
        let evicted = if flag && self.occupied {
            let id = self.occupant_id;
            self.release();
            id
        } else {
            None
        };
        self.out_of_order = flag;
        evicted
    }

    /// Set or clear the reward flag
    pub fn set_reward(&mut self, flag: bool) {
        self.has_reward = flag;
    }

    /// Consume a pending reward, reporting whether one was present
    pub fn take_reward(&mut self) -> bool {
        let had = self.has_reward;
        self.has_reward = false;
        had
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_is_idempotent() {
        let mut facility = Facility::new(FacilityKind::Secondary, 2, 6000);
        facility.occupy(7, 10);
        facility.release();
        let after_first = facility.clone();
        facility.release();
        assert_eq!(facility.is_occupied(), after_first.is_occupied());
        assert_eq!(facility.occupant_id(), after_first.occupant_id());
    }

    #[test]
    fn test_out_of_order_evicts_occupant() {
        let mut facility = Facility::new(FacilityKind::Primary, 1, 4000);
        facility.occupy(42, 0);

        let evicted = facility.set_out_of_order(true);
        assert_eq!(evicted, Some(42));
        assert!(!facility.is_occupied());
        assert!(facility.is_out_of_order());
    }

    #[test]
    #[should_panic(expected = "occupy() on unavailable facility")]
    fn test_occupy_out_of_order_panics() {
        let mut facility = Facility::new(FacilityKind::Primary, 0, 4000);
        let _ = facility.set_out_of_order(true);
        facility.occupy(1, 0);
    }

    #[test]
    fn test_take_reward_clears_flag() {
        let mut facility = Facility::new(FacilityKind::Secondary, 0, 6000);
        facility.set_reward(true);

        assert!(facility.take_reward());
        assert!(!facility.has_reward());
        assert!(!facility.take_reward());
    }
}

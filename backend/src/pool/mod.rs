//! Facility pool
//!
//! Owns every facility of both kinds, arranges their logical order,
//! evaluates the adjacency rule, executes auto-release sweeps and
//! provides the weighted target selection used by the disruption
//! processes.
//!
//! # Critical Invariants
//!
//! 1. Iteration order is kind-then-index ascending, Primary before
//!    Secondary — sweeps and snapshots depend on it
//! 2. Rewards are consumed before the adjacency check; the adjacency
//!    check runs after occupancy commits, against the newly created
//!    configuration
//! 3. An adjacency violation never rejects the assignment — it is
//!    reported to the caller, which owns the penalty
//! 4. Out-of-range kind/index is a programming error (asserted), while
//!    unavailability is an expected caller-handled condition

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::facility::{Facility, FacilityKind};
use crate::rng::RngManager;

/// Errors callers are expected to handle
#[derive(Debug, Error, PartialEq)]
pub enum PoolError {
    #[error("facility {kind:?} #{index} is not available")]
    NotAvailable { kind: FacilityKind, index: usize },
}

/// What an assignment reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignOutcome {
    /// A pending reward was consumed by this assignment
    pub reward_claimed: bool,

    /// The new configuration has two adjacent occupied Primary slots
    pub adjacency_violation: bool,
}

/// One facility released by an auto-release sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRelease {
    pub kind: FacilityKind,
    pub index: usize,
    pub occupant_id: u64,
}

/// Owner of all facility slots
///
/// # Example
/// ```
/// use facility_sim_core_rs::{FacilityKind, FacilityPool};
///
/// let mut pool = FacilityPool::new(5, 3, 4000, 6000);
///
/// let outcome = pool.assign(FacilityKind::Primary, 2, 1, 0).unwrap();
/// assert!(!outcome.adjacency_violation);
///
/// // Occupying a neighbor of #2 reports a violation but still succeeds.
/// let outcome = pool.assign(FacilityKind::Primary, 1, 2, 10).unwrap();
/// assert!(outcome.adjacency_violation);
/// assert!(pool.facility(FacilityKind::Primary, 1).is_occupied());
/// ```
#[derive(Debug, Clone)]
pub struct FacilityPool {
    primaries: Vec<Facility>,
    secondaries: Vec<Facility>,
    primary_usage_duration: u64,
    secondary_usage_duration: u64,
}

impl FacilityPool {
    /// Create a pool with the given slot counts and per-kind usage
    /// durations
    pub fn new(
        primary_count: usize,
        secondary_count: usize,
        primary_usage_duration: u64,
        secondary_usage_duration: u64,
    ) -> Self {
        let primaries = (0..primary_count)
            .map(|i| Facility::new(FacilityKind::Primary, i, primary_usage_duration))
            .collect();
        let secondaries = (0..secondary_count)
            .map(|i| Facility::new(FacilityKind::Secondary, i, secondary_usage_duration))
            .collect();

        Self {
            primaries,
            secondaries,
            primary_usage_duration,
            secondary_usage_duration,
        }
    }

    /// Reinitialize every slot in place, discarding occupancy, outage
    /// and reward flags
    pub fn reset(&mut self) {
        for facility in &mut self.primaries {
            *facility = Facility::new(
                FacilityKind::Primary,
                facility.index(),
                self.primary_usage_duration,
            );
        }
        for facility in &mut self.secondaries {
            *facility = Facility::new(
                FacilityKind::Secondary,
                facility.index(),
                self.secondary_usage_duration,
            );
        }
    }

    fn slots(&self, kind: FacilityKind) -> &[Facility] {
        match kind {
            FacilityKind::Primary => &self.primaries,
            FacilityKind::Secondary => &self.secondaries,
        }
    }

    fn slot(&self, kind: FacilityKind, index: usize) -> &Facility {
        let slots = self.slots(kind);
        assert!(
            index < slots.len(),
            "facility index out of range: {:?} #{} (count {})",
            kind,
            index,
            slots.len()
        );
        &slots[index]
    }

    fn slot_mut(&mut self, kind: FacilityKind, index: usize) -> &mut Facility {
        let slots = match kind {
            FacilityKind::Primary => &mut self.primaries,
            FacilityKind::Secondary => &mut self.secondaries,
        };
        assert!(
            index < slots.len(),
            "facility index out of range: {:?} #{} (count {})",
            kind,
            index,
            slots.len()
        );
        &mut slots[index]
    }

    /// Number of Primary slots
    pub fn primary_count(&self) -> usize {
        self.primaries.len()
    }

    /// Number of Secondary slots
    pub fn secondary_count(&self) -> usize {
        self.secondaries.len()
    }

    /// Read one facility
    ///
    /// # Panics
    /// Panics on an out-of-range kind/index pair.
    pub fn facility(&self, kind: FacilityKind, index: usize) -> &Facility {
        self.slot(kind, index)
    }

    /// All facilities, Primary before Secondary, index-ascending
    pub fn facilities(&self) -> impl Iterator<Item = &Facility> {
        self.primaries.iter().chain(self.secondaries.iter())
    }

    /// Available = not occupied and not out of order
    pub fn is_available(&self, kind: FacilityKind, index: usize) -> bool {
        self.slot(kind, index).is_available()
    }

    /// Whether either immediate neighbor of Primary slot `index` is
    /// occupied
    ///
    /// Pure check, exposed independently of [`assign`](Self::assign) so
    /// the adjacency rule is testable on its own.
    pub fn neighbor_occupied(&self, index: usize) -> bool {
        assert!(
            index < self.primaries.len(),
            "facility index out of range: Primary #{} (count {})",
            index,
            self.primaries.len()
        );
        let left = index > 0 && self.primaries[index - 1].is_occupied();
        let right = index + 1 < self.primaries.len() && self.primaries[index + 1].is_occupied();
        left || right
    }

    /// Assign an occupant to a facility
    ///
    /// Fails with [`PoolError::NotAvailable`] if the slot is occupied or
    /// out of order. On success the slot is committed first; any pending
    /// reward is consumed and reported *before* the adjacency check,
    /// which is evaluated against the post-assignment configuration. A
    /// reported violation does not undo the assignment.
    pub fn assign(
        &mut self,
        kind: FacilityKind,
        index: usize,
        occupant_id: u64,
        now: u64,
    ) -> Result<AssignOutcome, PoolError> {
        let reward_claimed = {
            let slot = self.slot_mut(kind, index);
            if !slot.is_available() {
                return Err(PoolError::NotAvailable { kind, index });
            }
            slot.occupy(occupant_id, now);
            slot.take_reward()
        };

        let adjacency_violation =
            kind == FacilityKind::Primary && self.neighbor_occupied(index);

        Ok(AssignOutcome {
            reward_claimed,
            adjacency_violation,
        })
    }

    /// Clear a slot. Idempotent on an already-free slot.
    pub fn release(&mut self, kind: FacilityKind, index: usize) {
        self.slot_mut(kind, index).release();
    }

    /// Release every occupied facility whose usage duration has elapsed
    ///
    /// The boundary is inclusive: a slot occupied at `t` with duration
    /// `d` releases at `now >= t + d`. Results are ordered Primary
    /// before Secondary, index-ascending within each kind — callers
    /// score Primary releases and remove the returned occupants.
    pub fn sweep_auto_release(&mut self, now: u64) -> Vec<AutoRelease> {
        let mut released = Vec::new();
        for facility in self.primaries.iter_mut().chain(self.secondaries.iter_mut()) {
            if facility.usage_expired(now) {
                if let Some(occupant_id) = facility.occupant_id() {
                    released.push(AutoRelease {
                        kind: facility.kind(),
                        index: facility.index(),
                        occupant_id,
                    });
                }
                facility.release();
            }
        }
        released
    }

    /// Set or clear the out-of-order flag on one slot. Idempotent.
    ///
    /// Setting the flag on an occupied slot force-releases it and
    /// returns the evicted occupant id; the caller removes that
    /// occupant from the queue with no life penalty.
    pub fn set_out_of_order(
        &mut self,
        kind: FacilityKind,
        index: usize,
        flag: bool,
    ) -> Option<u64> {
        self.slot_mut(kind, index).set_out_of_order(flag)
    }

    /// Number of slots currently out of order, across both kinds
    pub fn count_out_of_order(&self) -> usize {
        self.facilities().filter(|f| f.is_out_of_order()).count()
    }

    /// Set or clear the reward flag on one slot
    pub fn set_reward(&mut self, kind: FacilityKind, index: usize, flag: bool) {
        self.slot_mut(kind, index).set_reward(flag);
    }

    /// Pick a facility for a disruption, weighted by difficulty
    ///
    /// Candidates are slots that are neither occupied nor already out
    /// of order. Primary slots whose one-based position is even carry
    /// weight 3 while difficulty ≤ 5; above difficulty 5 the odd
    /// positions carry weight 3 instead; all other Primary slots weigh
    /// 1. Secondary slots weigh a flat 2. Returns `None` when no slot
    /// is eligible.
    pub fn pick_disruption_target(
        &self,
        difficulty: u32,
        rng: &mut RngManager,
    ) -> Option<(FacilityKind, usize)> {
        let mut candidates: Vec<((FacilityKind, usize), u32)> = Vec::new();

        for facility in &self.primaries {
            if facility.is_occupied() || facility.is_out_of_order() {
                continue;
            }
            let position_even = (facility.index() + 1) % 2 == 0;
            let favored = if difficulty <= 5 {
                position_even
            } else {
                !position_even
            };
            let weight = if favored { 3 } else { 1 };
            candidates.push(((FacilityKind::Primary, facility.index()), weight));
        }

        for facility in &self.secondaries {
            if facility.is_occupied() || facility.is_out_of_order() {
                continue;
            }
            candidates.push(((FacilityKind::Secondary, facility.index()), 2));
        }

        Self::sample_weighted(&candidates, rng)
    }

    /// Pick a facility to carry a bonus-life reward
    ///
    /// Candidates are slots that are neither out of order nor already
    /// carrying a reward (an occupied slot may receive one; it is
    /// claimed by the next assignment after release). Even-indexed
    /// Primary slots weigh 3, odd-indexed weigh 1, Secondary slots
    /// weigh a flat 3.
    pub fn pick_reward_target(&self, rng: &mut RngManager) -> Option<(FacilityKind, usize)> {
        let mut candidates: Vec<((FacilityKind, usize), u32)> = Vec::new();

        for facility in &self.primaries {
            if facility.is_out_of_order() || facility.has_reward() {
                continue;
            }
            let weight = if facility.index() % 2 == 0 { 3 } else { 1 };
            candidates.push(((FacilityKind::Primary, facility.index()), weight));
        }

        for facility in &self.secondaries {
            if facility.is_out_of_order() || facility.has_reward() {
                continue;
            }
            candidates.push(((FacilityKind::Secondary, facility.index()), 3));
        }

        Self::sample_weighted(&candidates, rng)
    }

    /// Uniform sample over a weighted candidate list
    fn sample_weighted(
        candidates: &[((FacilityKind, usize), u32)],
        rng: &mut RngManager,
    ) -> Option<(FacilityKind, usize)> {
        if candidates.is_empty() {
            return None;
        }

        let total: i64 = candidates.iter().map(|(_, w)| i64::from(*w)).sum();
        let mut target = rng.range(0, total);

        for (candidate, weight) in candidates {
            target -= i64::from(*weight);
            if target < 0 {
                return Some(*candidate);
            }
        }

        // total was the sum of all weights, so the walk cannot pass it
        panic!("weighted sample walked past the total weight");
    }
}

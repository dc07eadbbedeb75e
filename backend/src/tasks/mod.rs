//! Deterministic one-shot task scheduling
//!
//! Fire-and-forget timers (outage restorations, the delayed adjacency
//! penalty) are modelled as explicitly scheduled tasks in a min-heap of
//! `(fire_time, seq)` pairs drained once per engine tick, instead of
//! independent uncooperative timers. Insertion order breaks fire-time
//! ties, so callback ordering is deterministic and testable without
//! real waiting.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::models::facility::FacilityKind;

/// A deferred action against shared session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Clear the out-of-order flag on one specific facility
    ///
    /// Fires exactly once regardless of session state changes in the
    /// interim; clearing the flag is idempotent against a reset pool.
    RestoreFacility { kind: FacilityKind, index: usize },

    /// Apply the deferred adjacency life penalty
    ///
    /// Carries the session epoch captured when the violation was
    /// scored; the engine drops the penalty if the session has been
    /// reset or is no longer playing.
    AdjacencyPenalty { epoch: u64 },
}

/// A task paired with its fire time and tie-breaking sequence number
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduledTask {
    fire_at: u64,
    seq: u64,
    task: Task,
}

// BinaryHeap is a max-heap; invert so the earliest (fire_at, seq) is on top.
impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.fire_at, other.seq).cmp(&(self.fire_at, self.seq))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-threaded task queue drained once per tick
///
/// # Example
/// ```
/// use facility_sim_core_rs::{FacilityKind, Task, TaskQueue};
///
/// let mut tasks = TaskQueue::new();
/// tasks.schedule(500, Task::AdjacencyPenalty { epoch: 1 });
/// tasks.schedule(
///     300,
///     Task::RestoreFacility { kind: FacilityKind::Primary, index: 2 },
/// );
///
/// assert!(tasks.drain_due(299).is_empty());
/// let due = tasks.drain_due(500);
/// assert_eq!(due.len(), 2);
/// assert!(matches!(due[0], Task::RestoreFacility { .. }));
/// ```
#[derive(Debug, Default)]
pub struct TaskQueue {
    heap: BinaryHeap<ScheduledTask>,
    next_seq: u64,
}

impl TaskQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to fire at `fire_at`
    pub fn schedule(&mut self, fire_at: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledTask { fire_at, seq, task });
    }

    /// Remove and return every task with `fire_at <= now`, in
    /// (fire_time, insertion) order. The boundary is inclusive.
    pub fn drain_due(&mut self, now: u64) -> Vec<Task> {
        let mut due = Vec::new();
        while let Some(top) = self.heap.peek() {
            if top.fire_at > now {
                break;
            }
            // peek() just confirmed the heap is non-empty
            let scheduled = self.heap.pop().expect("heap emptied under peek");
            due.push(scheduled.task);
        }
        due
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether no tasks are pending
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ties_drain_in_insertion_order() {
        let mut tasks = TaskQueue::new();
        tasks.schedule(100, Task::AdjacencyPenalty { epoch: 1 });
        tasks.schedule(
            100,
            Task::RestoreFacility {
                kind: FacilityKind::Secondary,
                index: 0,
            },
        );

        let due = tasks.drain_due(100);
        assert_eq!(
            due,
            vec![
                Task::AdjacencyPenalty { epoch: 1 },
                Task::RestoreFacility {
                    kind: FacilityKind::Secondary,
                    index: 0,
                },
            ]
        );
    }

    #[test]
    fn test_drain_boundary_is_inclusive() {
        let mut tasks = TaskQueue::new();
        tasks.schedule(
            200,
            Task::RestoreFacility {
                kind: FacilityKind::Primary,
                index: 1,
            },
        );

        assert!(tasks.drain_due(199).is_empty());
        assert_eq!(tasks.drain_due(200).len(), 1);
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_undue_tasks_stay_queued() {
        let mut tasks = TaskQueue::new();
        tasks.schedule(50, Task::AdjacencyPenalty { epoch: 3 });
        tasks.schedule(5000, Task::AdjacencyPenalty { epoch: 3 });

        assert_eq!(tasks.drain_due(100).len(), 1);
        assert_eq!(tasks.len(), 1);
    }
}

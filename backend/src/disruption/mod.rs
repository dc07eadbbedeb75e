//! Stochastic disruption processes
//!
//! Two independently configured periodic processes run against the
//! facility pool while a session is playing:
//! - the **outage process** takes facilities out of order and schedules
//!   a one-shot restoration for each outage
//! - the **reward process** attaches bonus-life flags that persist
//!   until claimed or reset
//!
//! Both are driven from the engine tick through [`poll`]: each process
//! keeps its own next-due timestamp and no-ops until it comes due, so
//! the cadences stay independent of the tick rate. Stopping the
//! scheduler cancels the recurring checks but deliberately leaves
//! already-scheduled restorations in the shared task queue — an
//! out-of-order facility restores on its own schedule no matter what
//! the session does in the meantime.
//!
//! [`poll`]: DisruptionScheduler::poll

use serde::{Deserialize, Serialize};

use crate::models::facility::FacilityKind;
use crate::models::session::{SessionRecord, SessionStatus};
use crate::pool::FacilityPool;
use crate::rng::RngManager;
use crate::tasks::{Task, TaskQueue};

/// Outage process tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutageConfig {
    /// Units between outage checks
    pub check_interval: u64,

    /// Minimum difficulty before outages can trigger
    pub start_difficulty: u32,

    /// Maximum number of simultaneously out-of-order facilities
    pub max_concurrent: usize,

    /// Restoration delay drawn uniformly from this inclusive range
    pub restore_duration_range: (u64, u64),
}

impl Default for OutageConfig {
    fn default() -> Self {
        Self {
            check_interval: 6000,
            start_difficulty: 2,
            max_concurrent: 2,
            restore_duration_range: (20_000, 40_000),
        }
    }
}

/// Reward process tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Units between reward checks
    pub check_interval: u64,

    /// Flat probability of placing a reward per check
    pub probability: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            check_interval: 8000,
            probability: 0.2,
        }
    }
}

/// What one poll changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisruptionOutcome {
    /// Facilities taken out of order this poll
    pub outages_started: Vec<(FacilityKind, usize)>,

    /// Facilities that received a reward flag this poll
    pub rewards_placed: Vec<(FacilityKind, usize)>,
}

/// Driver of the outage and reward processes
pub struct DisruptionScheduler {
    outage: OutageConfig,
    reward: RewardConfig,
    running: bool,
    next_outage_check: u64,
    next_reward_check: u64,
}

impl DisruptionScheduler {
    /// Create a stopped scheduler
    pub fn new(outage: OutageConfig, reward: RewardConfig) -> Self {
        Self {
            outage,
            reward,
            running: false,
            next_outage_check: 0,
            next_reward_check: 0,
        }
    }

    /// Whether the recurring checks are active
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Activate both processes, anchoring their cadences at `now`
    ///
    /// No-op when already running — a second start must not reset the
    /// pending check times.
    pub fn start(&mut self, now: u64) {
        if self.running {
            return;
        }
        self.running = true;
        self.next_outage_check = now + self.outage.check_interval;
        self.next_reward_check = now + self.reward.check_interval;
    }

    /// Deactivate the recurring checks
    ///
    /// Restorations already in the task queue are not retracted.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Run every check that has come due by `now`
    pub fn poll(
        &mut self,
        now: u64,
        session: &SessionRecord,
        pool: &mut FacilityPool,
        rng: &mut RngManager,
        tasks: &mut TaskQueue,
    ) -> DisruptionOutcome {
        let mut outcome = DisruptionOutcome::default();
        if !self.running {
            return outcome;
        }

        while now >= self.next_outage_check {
            self.next_outage_check += self.outage.check_interval;
            self.run_outage_check(now, session, pool, rng, tasks, &mut outcome);
        }

        while now >= self.next_reward_check {
            self.next_reward_check += self.reward.check_interval;
            self.run_reward_check(session, pool, rng, &mut outcome);
        }

        outcome
    }

    fn run_outage_check(
        &self,
        now: u64,
        session: &SessionRecord,
        pool: &mut FacilityPool,
        rng: &mut RngManager,
        tasks: &mut TaskQueue,
        outcome: &mut DisruptionOutcome,
    ) {
        if session.status != SessionStatus::Playing {
            return;
        }
        if session.difficulty < self.outage.start_difficulty {
            return;
        }

        let probability = ((f64::from(session.difficulty) - 2.0) * 0.15).min(0.5);
        if rng.next_f64() >= probability {
            return;
        }
        if pool.count_out_of_order() >= self.outage.max_concurrent {
            return;
        }

        if let Some((kind, index)) = pool.pick_disruption_target(session.difficulty, rng) {
            let evicted = pool.set_out_of_order(kind, index, true);
            debug_assert!(evicted.is_none(), "picker must exclude occupied slots");

            let (min, max) = self.outage.restore_duration_range;
            let duration = rng.range(min as i64, max as i64 + 1) as u64;
            tasks.schedule(now + duration, Task::RestoreFacility { kind, index });

            outcome.outages_started.push((kind, index));
        }
    }

    fn run_reward_check(
        &self,
        session: &SessionRecord,
        pool: &mut FacilityPool,
        rng: &mut RngManager,
        outcome: &mut DisruptionOutcome,
    ) {
        if session.status != SessionStatus::Playing {
            return;
        }
        if rng.next_f64() >= self.reward.probability {
            return;
        }

        if let Some((kind, index)) = pool.pick_reward_target(rng) {
            pool.set_reward(kind, index, true);
            outcome.rewards_placed.push((kind, index));
        }
    }
}

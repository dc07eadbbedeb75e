//! Session engine
//!
//! Main simulation loop integrating all components:
//! - Occupant spawning (fixed cadence, difficulty-scaled)
//! - Timeout detection (at most one per tick)
//! - Facility auto-release sweeps (scoring)
//! - Milestone checks (difficulty ramp)
//! - Disruption processes (outages, rewards)
//! - Deferred one-shot tasks (restorations, adjacency penalties)
//! - Event logging and observer notification
//!
//! # Architecture
//!
//! The controller drives a fixed-cadence tick:
//!
//! ```text
//! For each tick:
//! 1. Advance the clock
//! 2. Drain due one-shot tasks (runs in every status)
//! 3. If not Playing, stop here
//! 4. Spawn-cadence check
//! 5. Timeout scan (single timeout per tick)
//! 6. Auto-release sweep (score Primary releases, milestone checks)
//! 7. Poll the disruption processes
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use facility_sim_core_rs::orchestrator::{SessionConfig, SessionController};
//!
//! let mut controller = SessionController::new(SessionConfig::default()).unwrap();
//! controller.start();
//!
//! for _ in 0..100 {
//!     let result = controller.tick();
//!     println!("t={} score={}", result.now, controller.session().score);
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::clock::GameClock;
use crate::disruption::{DisruptionScheduler, OutageConfig, RewardConfig};
use crate::events::{Event, EventLog, EventSink};
use crate::models::facility::FacilityKind;
use crate::models::session::{GameOverReason, SessionRecord, SessionStatus};
use crate::pool::{FacilityPool, PoolError};
use crate::queue::{OccupantQueue, QueueError};
use crate::rng::RngManager;
use crate::storage::{HighScoreStore, InMemoryHighScoreStore};
use crate::tasks::{Task, TaskQueue};

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete session configuration
///
/// Constructed once and passed into [`SessionController::new`]; the
/// controller threads the relevant pieces into the pool, the queue and
/// the disruption scheduler. There is no ambient configuration lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Number of Primary (adjacency-checked) facilities
    pub primary_count: usize,

    /// Number of Secondary (adjacency-exempt) facilities
    pub secondary_count: usize,

    /// Occupancy duration of a Primary facility (time units)
    pub primary_usage_duration: u64,

    /// Occupancy duration of a Secondary facility (time units)
    pub secondary_usage_duration: u64,

    /// How long an occupant waits before timing out
    pub wait_budget: u64,

    /// Spawn cadence at difficulty 1
    pub base_spawn_rate: u64,

    /// Floor for the spawn cadence
    pub min_spawn_rate: u64,

    /// Cadence reduction per difficulty level
    pub spawn_rate_step: u64,

    /// Score interval that triggers a difficulty increase
    pub milestone_interval: u32,

    /// Lives at session start
    pub starting_lives: i32,

    /// Difficulty at session start (≥ 1)
    pub starting_difficulty: u32,

    /// Time units added per engine tick
    pub tick_interval: u64,

    /// Delay between an adjacency violation and its life penalty,
    /// so the illegal configuration is visible before the penalty lands
    pub adjacency_penalty_delay: u64,

    /// Outage process tuning
    pub outage: OutageConfig,

    /// Reward process tuning
    pub reward: RewardConfig,

    /// Seed for deterministic random number generation
    pub rng_seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            primary_count: 5,
            secondary_count: 3,
            primary_usage_duration: 4000,
            secondary_usage_duration: 6000,
            wait_budget: 12_000,
            base_spawn_rate: 3500,
            min_spawn_rate: 1000,
            spawn_rate_step: 300,
            milestone_interval: 10,
            starting_lives: 3,
            starting_difficulty: 1,
            tick_interval: 50,
            adjacency_penalty_delay: 500,
            outage: OutageConfig::default(),
            reward: RewardConfig::default(),
            rng_seed: 12345,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Fatal simulation errors
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Snapshot serialization failed
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Expected-contention failures of an assignment attempt
///
/// Surfaced to the input collaborator, which shows a rejection and
/// mutates nothing.
#[derive(Debug, Error, PartialEq)]
pub enum AssignmentError {
    #[error("facility {kind:?} #{index} is not available")]
    NotAvailable { kind: FacilityKind, index: usize },

    #[error("no waiting occupant in the queue")]
    QueueEmpty,

    #[error("no session is currently playing")]
    SessionNotActive,
}

impl From<PoolError> for AssignmentError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::NotAvailable { kind, index } => {
                AssignmentError::NotAvailable { kind, index }
            }
        }
    }
}

impl From<QueueError> for AssignmentError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::QueueEmpty => AssignmentError::QueueEmpty,
        }
    }
}

// ============================================================================
// Tick Result
// ============================================================================

/// Summary of a single tick
#[derive(Debug, Clone, Default)]
pub struct TickResult {
    /// Simulation time after this tick
    pub now: u64,

    /// Occupant spawned this tick, if any
    pub spawned: Option<u64>,

    /// Occupant that timed out this tick, if any
    pub timed_out: Option<u64>,

    /// Primary facilities auto-released this tick (each scored a point)
    pub primary_releases: usize,

    /// Secondary facilities auto-released this tick
    pub secondary_releases: usize,

    /// Outages started by the disruption process this tick
    pub outages_started: usize,

    /// Rewards placed by the disruption process this tick
    pub rewards_placed: usize,

    /// One-shot tasks that fired this tick
    pub tasks_fired: usize,
}

// ============================================================================
// Session Controller
// ============================================================================

/// Orchestrates the session: owns all subordinate state and applies the
/// scoring, life-economy and difficulty-scaling rules
///
/// # Determinism
///
/// All randomness flows through the seeded xorshift64* RNG and all time
/// through the fixed-step clock, so the same configuration replays into
/// the same session, tick for tick.
pub struct SessionController {
    /// Immutable configuration
    config: SessionConfig,

    /// Fixed-step simulation clock
    clock: GameClock,

    /// Deterministic RNG
    rng: RngManager,

    /// All facility slots
    pool: FacilityPool,

    /// All live occupants
    queue: OccupantQueue,

    /// Outage and reward processes
    disruption: DisruptionScheduler,

    /// Deferred one-shot tasks (restorations, adjacency penalties)
    tasks: TaskQueue,

    /// The session-state record
    session: SessionRecord,

    /// Time of the most recent spawn (anchors the spawn cadence)
    last_spawn_at: u64,

    /// Bumped on every start; stale adjacency penalties are dropped by
    /// comparing against it
    epoch: u64,

    /// Event log for the current session
    event_log: EventLog,

    /// Registered observers (audio collaborator boundary)
    sinks: Vec<Box<dyn EventSink>>,

    /// Persistence collaborator
    high_scores: Box<dyn HighScoreStore>,
}

impl SessionController {
    /// Create a controller in the menu with an in-memory high-score
    /// store
    pub fn new(config: SessionConfig) -> Result<Self, SimulationError> {
        Self::with_high_score_store(config, Box::new(InMemoryHighScoreStore::new()))
    }

    /// Create a controller using the given persistence collaborator
    ///
    /// The stored high score is read once here; a failing store is
    /// treated as an empty one.
    pub fn with_high_score_store(
        config: SessionConfig,
        high_scores: Box<dyn HighScoreStore>,
    ) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        let high_score = high_scores.get_high_score().unwrap_or(0);
        let clock = GameClock::new(config.tick_interval);
        let rng = RngManager::new(config.rng_seed);
        let pool = FacilityPool::new(
            config.primary_count,
            config.secondary_count,
            config.primary_usage_duration,
            config.secondary_usage_duration,
        );
        let queue = OccupantQueue::new(config.wait_budget);
        let disruption =
            DisruptionScheduler::new(config.outage.clone(), config.reward.clone());

        Ok(Self {
            session: SessionRecord::menu(high_score),
            clock,
            rng,
            pool,
            queue,
            disruption,
            tasks: TaskQueue::new(),
            last_spawn_at: 0,
            epoch: 0,
            event_log: EventLog::new(),
            sinks: Vec::new(),
            high_scores,
            config,
        })
    }

    /// Validate configuration
    fn validate_config(config: &SessionConfig) -> Result<(), SimulationError> {
        if config.primary_count == 0 {
            return Err(SimulationError::InvalidConfig(
                "primary_count must be > 0".to_string(),
            ));
        }
        if config.tick_interval == 0 {
            return Err(SimulationError::InvalidConfig(
                "tick_interval must be > 0".to_string(),
            ));
        }
        if config.milestone_interval == 0 {
            return Err(SimulationError::InvalidConfig(
                "milestone_interval must be > 0".to_string(),
            ));
        }
        if config.wait_budget == 0 {
            return Err(SimulationError::InvalidConfig(
                "wait_budget must be > 0".to_string(),
            ));
        }
        if config.primary_usage_duration == 0 || config.secondary_usage_duration == 0 {
            return Err(SimulationError::InvalidConfig(
                "usage durations must be > 0".to_string(),
            ));
        }
        if config.min_spawn_rate > config.base_spawn_rate {
            return Err(SimulationError::InvalidConfig(
                "min_spawn_rate must not exceed base_spawn_rate".to_string(),
            ));
        }
        if config.starting_difficulty == 0 {
            return Err(SimulationError::InvalidConfig(
                "starting_difficulty must be >= 1".to_string(),
            ));
        }
        let (restore_min, restore_max) = config.outage.restore_duration_range;
        if restore_min > restore_max {
            return Err(SimulationError::InvalidConfig(
                "outage restore range must be ordered".to_string(),
            ));
        }
        if config.outage.check_interval == 0 || config.reward.check_interval == 0 {
            return Err(SimulationError::InvalidConfig(
                "disruption check intervals must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current simulation time
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// The session-state record
    pub fn session(&self) -> &SessionRecord {
        &self.session
    }

    /// The facility pool
    pub fn pool(&self) -> &FacilityPool {
        &self.pool
    }

    /// Mutable facility pool
    ///
    /// # Safety
    ///
    /// This is primarily for testing. Direct pool mutation bypasses
    /// controller invariants. Use with caution.
    pub fn pool_mut(&mut self) -> &mut FacilityPool {
        &mut self.pool
    }

    /// The occupant queue
    pub fn queue(&self) -> &OccupantQueue {
        &self.queue
    }

    /// The configuration this controller was built with
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The event log of the current session
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Number of pending one-shot tasks
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Register an observer for event notifications
    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Availability pre-check for the input collaborator
    ///
    /// Adjacency is deliberately not pre-checked: an adjacent placement
    /// is legal to make and penalized afterwards.
    pub fn is_assignment_valid(&self, kind: FacilityKind, index: usize) -> bool {
        self.pool.is_available(kind, index)
    }

    // ========================================================================
    // Event Emission
    // ========================================================================

    /// Notify sinks and append to the log
    fn emit(&mut self, event: Event) {
        for sink in &mut self.sinks {
            sink.on_event(&event);
        }
        self.event_log.log(event);
    }

    // ========================================================================
    // Status Transitions
    // ========================================================================

    /// Start a session at the configured starting difficulty
    ///
    /// Re-entrant from any status; always performs a full reset of the
    /// score/life economy, the pool and the queue, then spawns one
    /// occupant synchronously so the session is never observed with an
    /// empty queue.
    pub fn start(&mut self) {
        self.start_at_difficulty(self.config.starting_difficulty);
    }

    /// Start a session at a player-chosen difficulty
    ///
    /// # Panics
    /// Panics if `difficulty` is zero; starting difficulty is ≥ 1 by
    /// contract.
    pub fn start_at_difficulty(&mut self, difficulty: u32) {
        assert!(difficulty >= 1, "starting difficulty must be >= 1");

        self.epoch += 1;
        self.pool.reset();
        self.queue.reset();
        self.event_log.clear();

        let spawn_rate = self.spawn_rate_for(difficulty);
        self.session = SessionRecord::started(
            self.config.starting_lives,
            difficulty,
            spawn_rate,
            self.session.high_score,
        );

        let now = self.clock.now();
        self.last_spawn_at = now;
        self.emit(Event::SessionStarted { at: now, difficulty });

        let occupant_id = self.queue.spawn(now);
        self.emit(Event::OccupantSpawned { at: now, occupant_id });

        // A pause or game over may have left the processes stopped;
        // re-anchor their cadences at the new session's start.
        self.disruption.stop();
        self.disruption.start(now);
    }

    /// Suspend the running session
    pub fn pause(&mut self) {
        if self.session.status != SessionStatus::Playing {
            return;
        }
        self.session.status = SessionStatus::Paused;
        self.disruption.stop();
        let now = self.clock.now();
        self.emit(Event::SessionPaused { at: now });
    }

    /// Resume a paused session
    pub fn resume(&mut self) {
        if self.session.status != SessionStatus::Paused {
            return;
        }
        self.session.status = SessionStatus::Playing;
        let now = self.clock.now();
        self.disruption.start(now);
        self.emit(Event::SessionResumed { at: now });
    }

    /// Leave the session and return to the menu
    pub fn return_to_menu(&mut self) {
        if self.session.status == SessionStatus::Menu {
            return;
        }
        self.disruption.stop();
        self.session = SessionRecord::menu(self.session.high_score);
    }

    /// Spawn cadence for a difficulty level
    fn spawn_rate_for(&self, difficulty: u32) -> u64 {
        let reduction = u64::from(difficulty - 1) * self.config.spawn_rate_step;
        self.config
            .base_spawn_rate
            .saturating_sub(reduction)
            .max(self.config.min_spawn_rate)
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Execute one simulation tick
    ///
    /// The clock advances and due one-shot tasks fire in every status
    /// (a restoration must land during a pause); the gameplay steps run
    /// only while Playing.
    pub fn tick(&mut self) -> TickResult {
        let now = self.clock.advance();

        // STEP 1: DEFERRED TASKS
        let due = self.tasks.drain_due(now);
        let tasks_fired = due.len();
        for task in due {
            self.run_task(task, now);
        }

        let mut result = TickResult {
            now,
            tasks_fired,
            ..TickResult::default()
        };

        if self.session.status != SessionStatus::Playing {
            return result;
        }

        // STEP 2: SPAWN CADENCE
        if now - self.last_spawn_at >= self.session.spawn_rate {
            let occupant_id = self.queue.spawn(now);
            self.last_spawn_at = now;
            self.emit(Event::OccupantSpawned { at: now, occupant_id });
            result.spawned = Some(occupant_id);
        }

        // STEP 3: TIMEOUT SCAN
        // At most one timeout per tick; remaining expirations are
        // caught on subsequent ticks.
        if let Some(occupant_id) = self.queue.check_timeout(now) {
            self.queue.remove(occupant_id);
            self.emit(Event::OccupantTimedOut { at: now, occupant_id });
            self.lose_life(GameOverReason::Timeout, now);
            result.timed_out = Some(occupant_id);
            if self.session.status == SessionStatus::GameOver {
                return result;
            }
        }

        // STEP 4: AUTO-RELEASE SWEEP
        for release in self.pool.sweep_auto_release(now) {
            self.queue.remove(release.occupant_id);
            match release.kind {
                FacilityKind::Primary => {
                    result.primary_releases += 1;
                    self.emit(Event::PrimaryReleased {
                        at: now,
                        index: release.index,
                        occupant_id: release.occupant_id,
                    });
                    self.award_point(now);
                }
                FacilityKind::Secondary => {
                    result.secondary_releases += 1;
                    self.emit(Event::SecondaryReleased {
                        at: now,
                        index: release.index,
                        occupant_id: release.occupant_id,
                    });
                }
            }
        }

        // STEP 5: DISRUPTION PROCESSES
        let outcome = self.disruption.poll(
            now,
            &self.session,
            &mut self.pool,
            &mut self.rng,
            &mut self.tasks,
        );
        for (kind, index) in &outcome.outages_started {
            self.emit(Event::OutageStarted {
                at: now,
                kind: *kind,
                index: *index,
            });
        }
        for (kind, index) in &outcome.rewards_placed {
            self.emit(Event::RewardPlaced {
                at: now,
                kind: *kind,
                index: *index,
            });
        }
        result.outages_started = outcome.outages_started.len();
        result.rewards_placed = outcome.rewards_placed.len();

        result
    }

    /// Execute one fired one-shot task
    fn run_task(&mut self, task: Task, now: u64) {
        match task {
            Task::RestoreFacility { kind, index } => {
                // Clearing the flag is idempotent: against a pool that
                // was reset in the interim this is a silent no-op.
                if self.pool.facility(kind, index).is_out_of_order() {
                    let _ = self.pool.set_out_of_order(kind, index, false);
                    self.emit(Event::OutageEnded { at: now, kind, index });
                }
            }
            Task::AdjacencyPenalty { epoch } => {
                // Stale penalties (scheduled before a reset) and
                // penalties landing outside a live session are dropped.
                if epoch == self.epoch && self.session.status == SessionStatus::Playing {
                    self.lose_life(GameOverReason::Adjacency, now);
                }
            }
        }
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    /// Place the oldest waiting occupant onto a facility
    ///
    /// The availability check runs before the queue head transitions,
    /// so a rejection leaves every collection untouched. On success a
    /// consumed reward gains a life immediately; an adjacency violation
    /// schedules the life penalty after the configured display delay.
    pub fn apply_assignment(
        &mut self,
        kind: FacilityKind,
        index: usize,
    ) -> Result<(), AssignmentError> {
        if self.session.status != SessionStatus::Playing {
            return Err(AssignmentError::SessionNotActive);
        }

        let now = self.clock.now();
        if !self.pool.is_available(kind, index) {
            return Err(AssignmentError::NotAvailable { kind, index });
        }

        let occupant_id = self.queue.assign_head(kind, index)?;
        let outcome = self.pool.assign(kind, index, occupant_id, now)?;

        self.emit(Event::OccupantAssigned {
            at: now,
            occupant_id,
            kind,
            index,
        });

        // The reward is granted before the adjacency consequence is
        // even scheduled; the pool already consumed the flag.
        if outcome.reward_claimed {
            self.emit(Event::RewardClaimed {
                at: now,
                kind,
                index,
                occupant_id,
            });
            self.gain_life(now);
        }

        if outcome.adjacency_violation {
            self.emit(Event::AdjacencyViolation { at: now, index });
            self.tasks.schedule(
                now + self.config.adjacency_penalty_delay,
                Task::AdjacencyPenalty { epoch: self.epoch },
            );
        }

        Ok(())
    }

    // ========================================================================
    // Score and Life Economy
    // ========================================================================

    /// Score one point and run the milestone check
    fn award_point(&mut self, now: u64) {
        self.session.score += 1;

        if self.session.score % self.config.milestone_interval == 0 {
            self.session.difficulty += 1;
            self.session.spawn_rate = self.spawn_rate_for(self.session.difficulty);
            self.emit(Event::MilestoneReached {
                at: now,
                score: self.session.score,
                difficulty: self.session.difficulty,
            });
        }
    }

    /// Grant one life. Unbounded above.
    fn gain_life(&mut self, now: u64) {
        self.session.lives += 1;
        self.emit(Event::LifeGained {
            at: now,
            lives: self.session.lives,
        });
    }

    /// Remove one life; entering GameOver at zero
    ///
    /// Ignored once the session is over — the terminal transition
    /// happens exactly once.
    fn lose_life(&mut self, reason: GameOverReason, now: u64) {
        if self.session.status == SessionStatus::GameOver {
            return;
        }

        self.session.lives -= 1;
        self.emit(Event::LifeLost {
            at: now,
            lives: self.session.lives,
            reason,
        });

        if self.session.lives <= 0 {
            self.game_over(reason, now);
        }
    }

    /// Terminal transition: finalize the high score comparison
    fn game_over(&mut self, reason: GameOverReason, now: u64) {
        self.session.status = SessionStatus::GameOver;
        self.session.game_over_reason = Some(reason);
        self.disruption.stop();

        // One read and at most one write per game over, comparing
        // against the stored value rather than the in-memory one. A
        // failing store degrades silently.
        let score = self.session.score;
        let stored = self.high_scores.get_high_score().unwrap_or(0);
        if score > 0 && score > stored {
            let _ = self.high_scores.set_high_score(score);
            self.session.is_new_high_score = true;
        }
        self.session.high_score = self.session.high_score.max(stored).max(score);

        self.emit(Event::SessionEnded {
            at: now,
            score,
            reason,
            new_high_score: self.session.is_new_high_score,
        });
    }
}

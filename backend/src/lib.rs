//! Facility Simulator Core - Rust Engine
//!
//! Real-time resource-assignment arena simulation with deterministic
//! execution: transient occupants are matched to a small pool of typed,
//! time-limited facilities under an adjacency constraint, while a
//! life/score economy and a difficulty ramp evolve over the session.
//!
//! # Architecture
//!
//! - **core**: Simulation clock
//! - **models**: Domain types (Facility, Occupant, SessionRecord)
//! - **pool**: Facility ownership, adjacency rule, auto-release sweeps
//! - **queue**: Occupant ownership, spawning, timeouts
//! - **disruption**: Stochastic outage and reward processes
//! - **tasks**: Deterministic one-shot scheduling
//! - **events**: Typed event log and observer notification
//! - **storage**: High-score persistence boundary
//! - **orchestrator**: Session controller and snapshot surface
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All time is abstract units from the fixed-step clock
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Iteration order is fixed: occupants id-ascending, facilities
//!    kind-then-index ascending

// Module declarations
pub mod core;
pub mod disruption;
pub mod events;
pub mod models;
pub mod orchestrator;
pub mod pool;
pub mod queue;
pub mod rng;
pub mod storage;
pub mod tasks;

// Re-exports for convenience
pub use crate::core::clock::GameClock;
pub use disruption::{DisruptionScheduler, OutageConfig, RewardConfig};
pub use events::{Event, EventLog, EventSink};
pub use models::{
    facility::{Facility, FacilityKind},
    occupant::{Occupant, OccupantState},
    session::{GameOverReason, SessionRecord, SessionStatus},
};
pub use orchestrator::{
    compute_digest, AssignmentError, FacilityView, OccupantView, SessionConfig,
    SessionController, SessionSnapshot, SimulationError, TickResult,
};
pub use pool::{AssignOutcome, AutoRelease, FacilityPool, PoolError};
pub use queue::{OccupantQueue, QueueError};
pub use rng::RngManager;
pub use storage::{HighScoreStore, InMemoryHighScoreStore, StoreError};
pub use tasks::{Task, TaskQueue};

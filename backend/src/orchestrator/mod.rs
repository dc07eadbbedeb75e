//! Orchestrator - the session engine
//!
//! Drives the per-tick update across the pool, the queue and the
//! disruption processes, and owns the score/life/difficulty economy.
//!
//! See `engine.rs` for the tick loop, `snapshot.rs` for the read
//! surface exposed to external collaborators.

pub mod engine;
pub mod snapshot;

// Re-export main types for convenience
pub use engine::{
    AssignmentError, SessionConfig, SessionController, SimulationError, TickResult,
};
pub use snapshot::{compute_digest, FacilityView, OccupantView, SessionSnapshot};

//! Domain models for the arena simulator

pub mod facility;
pub mod occupant;
pub mod session;

// Re-exports
pub use facility::{Facility, FacilityKind};
pub use occupant::{Occupant, OccupantState};
pub use session::{GameOverReason, SessionRecord, SessionStatus};

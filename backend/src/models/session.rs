//! Session state record
//!
//! The single record describing one arena session: status, the
//! score/lives economy, the difficulty ramp and the current spawn rate.
//! Owned exclusively by the session controller; the render collaborator
//! reads it through snapshots.
//!
//! # Critical Invariants
//!
//! 1. `status == GameOver` ⇔ lives reached 0 (and stays there until the
//!    next start)
//! 2. `difficulty` only increases within one session
//! 3. `spawn_rate` is monotonically non-increasing as difficulty rises,
//!    floored at the configured minimum

use serde::{Deserialize, Serialize};

/// Top-level session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session running
    Menu,
    /// Session live, tick loop active
    Playing,
    /// Session suspended, gameplay frozen
    Paused,
    /// Lives reached zero
    GameOver,
}

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// An occupant exhausted its wait budget
    Timeout,
    /// An adjacency penalty landed on the last life
    Adjacency,
}

/// The session-state record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Current status
    pub status: SessionStatus,

    /// Non-negative score; each Primary auto-release adds one
    pub score: u32,

    /// Remaining lives; may exceed the starting value via rewards
    pub lives: i32,

    /// Positive difficulty level; only milestones raise it
    pub difficulty: u32,

    /// Current spawn cadence in time units
    pub spawn_rate: u64,

    /// Set once on the GameOver transition
    pub game_over_reason: Option<GameOverReason>,

    /// Best score known to the persistence collaborator (or this run)
    pub high_score: u32,

    /// Whether the just-ended session set a new high score
    pub is_new_high_score: bool,
}

impl SessionRecord {
    /// Record for a controller sitting in the menu
    pub fn menu(high_score: u32) -> Self {
        Self {
            status: SessionStatus::Menu,
            score: 0,
            lives: 0,
            difficulty: 1,
            spawn_rate: 0,
            game_over_reason: None,
            high_score,
            is_new_high_score: false,
        }
    }

    /// Fresh record for a session that just started
    pub fn started(lives: i32, difficulty: u32, spawn_rate: u64, high_score: u32) -> Self {
        Self {
            status: SessionStatus::Playing,
            score: 0,
            lives,
            difficulty,
            spawn_rate,
            game_over_reason: None,
            high_score,
            is_new_high_score: false,
        }
    }
}

//! Time management for the simulation
//!
//! The simulation operates in abstract time units. The engine advances a
//! fixed number of units per tick, and every timestamp in the system
//! (occupant spawn times, facility occupancy stamps, scheduled task fire
//! times) is read from this clock. There is no wall clock anywhere.

use serde::{Deserialize, Serialize};

/// Monotonic simulation clock advancing in fixed steps
///
/// # Example
/// ```
/// use facility_sim_core_rs::GameClock;
///
/// let mut clock = GameClock::new(50); // 50 time units per tick
/// assert_eq!(clock.now(), 0);
///
/// let now = clock.advance();
/// assert_eq!(now, 50);
/// assert_eq!(clock.ticks_elapsed(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    /// Current time in units since simulation start
    now: u64,
    /// Units added per engine tick
    tick_interval: u64,
}

impl GameClock {
    /// Create a new clock
    ///
    /// # Arguments
    /// * `tick_interval` - Time units added by each [`advance`](Self::advance)
    pub fn new(tick_interval: u64) -> Self {
        assert!(tick_interval > 0, "tick_interval must be positive");
        Self {
            now: 0,
            tick_interval,
        }
    }

    /// Advance the clock by one tick and return the new time
    pub fn advance(&mut self) -> u64 {
        self.now += self.tick_interval;
        self.now
    }

    /// Current time in units since start
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of whole ticks elapsed since start
    pub fn ticks_elapsed(&self) -> u64 {
        self.now / self.tick_interval
    }

    /// Units added per tick
    pub fn tick_interval(&self) -> u64 {
        self.tick_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "tick_interval must be positive")]
    fn test_zero_tick_interval_panics() {
        GameClock::new(0);
    }
}

//! Deterministic random number generation
//!
//! Uses the xorshift64* algorithm. CRITICAL: all randomness in the
//! simulator MUST go through this module — the disruption draws, reward
//! draws and weighted facility selection all consume the same stream.

mod xorshift;

pub use xorshift::RngManager;

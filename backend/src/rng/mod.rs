//! Deterministic random number generation
//!
//! A seeded xorshift64* generator drives every random draw in the game:
//! price volatility, order-book jitter, decision jitter, detection rolls.
//! CRITICAL: All randomness in the simulator MUST go through this module
//! so a run is fully reproducible from its seed.

mod xorshift;

pub use xorshift::RngManager;

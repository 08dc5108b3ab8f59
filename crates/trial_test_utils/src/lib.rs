//! # Trial Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Fixture simulations
//! - Pacing and balance checks
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod pacing;

/// Re-export proptest for convenience.
pub use proptest;

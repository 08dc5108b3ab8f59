//! Headless run driver for balance testing and CI verification.
//!
//! This crate drives the deterministic simulation in `trial_core`
//! without a renderer. Scripted pilots play complete runs, batches
//! sweep seed ranges in parallel, and replay journals are verified
//! bit for bit. This enables:
//!
//! - **Balance sweeps**: clear rates and death waves across thousands
//!   of seeded runs
//! - **CI verification**: determinism and replay checks on every build
//! - **Profiling**: sustained tick throughput without frame pacing
//!
//! # Example
//!
//! ```bash
//! # Play one scripted run
//! cargo run -p trial_headless -- run --scenario boss_rush --seed 7
//!
//! # Sweep 1000 seeds of the starter world
//! cargo run -p trial_headless -- batch --scenario withering_tree --count 1000
//!
//! # Verify a recorded replay reproduces its hash
//! cargo run -p trial_headless -- replay --file run.replay --verify
//! ```

pub mod batch;
pub mod game_runner;
pub mod metrics;
pub mod pilot;
pub mod scenario;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults};
pub use game_runner::{run_game, GameConfig, GameResult, GameRunner};
pub use metrics::{BatchSummary, GameMetrics, MetricsCollector, RunOutcome};
pub use pilot::PilotKind;
pub use scenario::{Scenario, ScenarioError};

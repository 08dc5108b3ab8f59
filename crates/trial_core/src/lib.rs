//! # Trial Core
//!
//! Deterministic combat simulation core for The Wizard's Trial.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No system clocks or randomness
//! - No floating-point math in simulation state (fixed-point throughout)
//!
//! This separation enables:
//! - Bit-identical runs from the same seed on any device
//! - Headless balance sweeps
//! - Replay journals with end-of-run verification
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`simulation`] - Core fixed-tick loop
//! - [`player`] - The wizard: input, mana, casting, damage intake
//! - [`enemy`] - Enemy kinds and movement behaviors
//! - [`waves`] - Wave scheduling and spawn placement
//! - [`spells`] - Spellbook, cooldowns, and timed effects
//! - [`replay`] - Replay recording and playback
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod enemy;
pub mod events;
pub mod math;
pub mod player;
pub mod projectile;
pub mod replay;
pub mod rng;
pub mod simulation;
pub mod spells;
pub mod waves;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::Health;
    pub use crate::enemy::{Behavior, Enemy, EnemyKind};
    pub use crate::events::{Event, TickEvents};
    pub use crate::math::{Arena, Fixed, Vec2Fixed};
    pub use crate::player::{CastError, Command, Player};
    pub use crate::projectile::{Projectile, ProjectileKind};
    pub use crate::replay::{Replay, ReplayError, ReplayPlayer, ReplayRecorder};
    pub use crate::rng::GameRng;
    pub use crate::simulation::{SimError, Simulation, SimulationParams, SimulationState, MAX_DT};
    pub use crate::spells::{SpellBook, SpellKind};
    pub use crate::waves::{WavePhase, WaveScheduler, WorldId};
}

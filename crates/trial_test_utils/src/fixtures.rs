//! Test fixtures and helpers.
//!
//! Pre-built simulations and fixed-point conveniences
//! for consistent testing.

use fixed::types::I32F32;

use trial_core::math::Vec2Fixed;
use trial_core::player::Command;
use trial_core::simulation::{Simulation, SimulationParams, MAX_DT};
use trial_core::waves::{WorldId, WAVES_PER_WORLD};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A run a few seconds into its first wave, wand firing downward.
#[must_use]
pub fn opening_skirmish(seed: u64) -> Simulation {
    let mut sim = Simulation::new(SimulationParams {
        seed,
        ..SimulationParams::default()
    });
    let _ = sim.apply_command(Command::SetAimInput(Vec2Fixed::new(fixed(0), fixed(1))));
    for _ in 0..90 {
        sim.tick(MAX_DT);
    }
    sim
}

/// A mid-run push: wave 20 of the Drowned Sanctum with a level 25 wizard,
/// several seconds in so walkers, archers, and a caster are all on the field.
#[must_use]
pub fn mid_world_push(seed: u64) -> Simulation {
    let params = SimulationParams {
        seed,
        world: WorldId::DrownedSanctum,
        starting_level: 25,
        starting_wave: 20,
        ..SimulationParams::default()
    };
    let mut sim = Simulation::new(params);
    let _ = sim.apply_command(Command::SetAimInput(Vec2Fixed::new(fixed(0), fixed(1))));
    for _ in 0..120 {
        sim.tick(MAX_DT);
    }
    sim
}

/// A run parked at the final wave of the last world, one cleared wave away
/// from the boss fight.
#[must_use]
pub fn boss_doorstep(seed: u64) -> Simulation {
    Simulation::new(SimulationParams {
        seed,
        world: WorldId::TowerOfBabel,
        starting_level: 50,
        starting_wave: WAVES_PER_WORLD,
        ..SimulationParams::default()
    })
}

//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Runs must be bit-reproducible: replay verification and leaderboard
//! honesty both hinge on it. Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`trial_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Entities live in `Vec`s and are visited in spawn order.
//!
//! - **System randomness**: No calls to `rand()` without explicit seeds.
//!   All "random" behavior uses the seeded xorshift stream.
//!
//! - **Wall clocks**: The host feeds every tick length explicitly, and the
//!   core clamps it. No simulation path reads a timer.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual piece determinism (casting, waves, etc.)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full runs are reproducible
//! 4. **Parallel tests**: Running N simulations in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use trial_core::simulation::MAX_DT;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use trial_test_utils::determinism::verify_determinism;
/// use trial_core::simulation::{Simulation, SimulationParams, MAX_DT};
///
/// let result = verify_determinism(
///     5,   // Run 5 times
///     100, // 100 ticks each
///     || Simulation::new(SimulationParams { seed: 7, ..SimulationParams::default() }),
///     |sim| { sim.tick(MAX_DT); },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Simplified determinism verification for the `Simulation` type.
///
/// Runs the simulation twice with identical setup, stepping at the fixed
/// tick cap each time, and verifies the final state hashes match exactly.
///
/// # Arguments
///
/// * `setup_fn` - Function that creates and configures a simulation
/// * `num_ticks` - Number of ticks to run
///
/// # Returns
///
/// `true` if both runs produced identical state hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> trial_core::simulation::Simulation,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick(MAX_DT);
        },
        |sim| sim.state_hash(),
    );
    result.is_deterministic
}

/// Run N simulations in parallel and collect final hashes.
///
/// This is useful for catching non-determinism that only manifests
/// under thread scheduling variations, memory layout differences, etc.
///
/// # Arguments
///
/// * `setup_fn` - Function that creates and configures a simulation (must be thread-safe)
/// * `num_sims` - Number of parallel simulations to run
/// * `num_ticks` - Number of ticks to run each simulation
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> trial_core::simulation::Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick(MAX_DT);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two simulation runs tick-by-tick, finding the first divergence.
///
/// Useful for debugging non-determinism by finding exactly when
/// simulations start to differ.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> trial_core::simulation::Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    // Check initial state
    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick(MAX_DT);
        sim2.tick(MAX_DT);

        if sim1.state_hash() != sim2.state_hash() {
            tracing::debug!(tick, "simulations diverged");
            return Some(tick);
        }
    }

    None
}

/// Verify that a snapshot round-trip preserves simulation state exactly.
///
/// This is critical for save/resume and replay bootstrapping.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> trial_core::simulation::Simulation,
{
    let mut sim = setup_fn();

    for _ in 0..num_ticks {
        sim.tick(MAX_DT);
    }

    let hash_before = sim.state_hash();

    let bytes = match sim.serialize() {
        Ok(b) => b,
        Err(_) => return false,
    };

    let restored = match trial_core::simulation::Simulation::deserialize(&bytes) {
        Ok(s) => s,
        Err(_) => return false,
    };

    let hash_after = restored.state_hash();

    hash_before == hash_after
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of simulation determinism.
pub mod strategies {
    use proptest::prelude::*;

    use trial_core::math::{Fixed, Vec2Fixed};
    use trial_core::player::Command;
    use trial_core::simulation::SimulationParams;
    use trial_core::spells::{SpellBook, SpellKind};
    use trial_core::waves::{WorldId, WAVES_PER_WORLD};

    /// Generate a stick axis value in [-1, 1] at millistick resolution.
    pub fn arb_stick_axis() -> impl Strategy<Value = Fixed> {
        (-1000i32..=1000).prop_map(|v| Fixed::from_num(v) / Fixed::from_num(1000))
    }

    /// Generate a full stick input, including sub-deadzone wobble.
    pub fn arb_stick() -> impl Strategy<Value = Vec2Fixed> {
        (arb_stick_axis(), arb_stick_axis()).prop_map(|(x, y)| Vec2Fixed::new(x, y))
    }

    /// Generate a tick length between 1 ms and 33 ms.
    pub fn arb_dt() -> impl Strategy<Value = Fixed> {
        (1i32..=33).prop_map(|ms| Fixed::from_num(ms) / Fixed::from_num(1000))
    }

    /// Generate a sequence of tick lengths, as an uneven host would feed them.
    pub fn arb_dt_sequence(max_len: usize) -> impl Strategy<Value = Vec<Fixed>> {
        proptest::collection::vec(arb_dt(), 1..max_len)
    }

    /// Generate any spell in the catalog.
    pub fn arb_spell() -> impl Strategy<Value = SpellKind> {
        (0..SpellKind::ALL.len()).prop_map(|i| SpellKind::ALL[i])
    }

    /// Generate a movement input command.
    pub fn arb_move_command() -> impl Strategy<Value = Command> {
        arb_stick().prop_map(Command::SetMoveInput)
    }

    /// Generate an aim input command.
    pub fn arb_aim_command() -> impl Strategy<Value = Command> {
        arb_stick().prop_map(Command::SetAimInput)
    }

    /// Generate a cast command.
    pub fn arb_cast_command() -> impl Strategy<Value = Command> {
        arb_spell().prop_map(Command::CastSpell)
    }

    /// Generate any player command.
    pub fn arb_command() -> impl Strategy<Value = Command> {
        prop_oneof![arb_move_command(), arb_aim_command(), arb_cast_command()]
    }

    /// Generate a sequence of commands.
    pub fn arb_command_sequence(max_len: usize) -> impl Strategy<Value = Vec<Command>> {
        proptest::collection::vec(arb_command(), 0..max_len)
    }

    /// Generate a spellbook with a random subset of the catalog.
    pub fn arb_spellbook() -> impl Strategy<Value = SpellBook> {
        proptest::collection::vec(arb_spell(), 0..SpellKind::ALL.len())
            .prop_map(|kinds| kinds.into_iter().collect())
    }

    /// Generate full run parameters across worlds, waves, and levels.
    pub fn arb_params() -> impl Strategy<Value = SimulationParams> {
        (
            any::<u64>(),
            0..WorldId::ALL.len(),
            1u32..=60,
            1u32..=WAVES_PER_WORLD,
            arb_spellbook(),
        )
            .prop_map(|(seed, world, starting_level, starting_wave, spells)| {
                SimulationParams {
                    seed,
                    world: WorldId::ALL[world],
                    starting_level,
                    starting_wave,
                    spells,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::fixtures;
    use trial_core::simulation::{Simulation, SimulationParams};

    // =========================================================================
    // Basic determinism tests
    // =========================================================================

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_fresh_run_determinism() {
        assert!(verify_simulation_determinism(
            || Simulation::new(SimulationParams::default()),
            100
        ));
    }

    #[test]
    fn test_opening_skirmish_determinism() {
        let result = verify_determinism(
            5,
            200,
            || fixtures::opening_skirmish(7),
            |sim| {
                sim.tick(MAX_DT);
            },
            |sim| sim.state_hash(),
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_mid_world_push_determinism() {
        let result = verify_determinism(
            3,
            300,
            || fixtures::mid_world_push(1234),
            |sim| {
                sim.tick(MAX_DT);
            },
            |sim| sim.state_hash(),
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_boss_fight_determinism() {
        // Enough ticks to clear wave 49 and get well into the boss fight.
        let result = verify_determinism(
            3,
            1500,
            || fixtures::boss_doorstep(99),
            |sim| {
                sim.tick(MAX_DT);
            },
            |sim| sim.state_hash(),
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_find_divergence_on_identical_setup() {
        let divergence = find_first_divergence(|| fixtures::opening_skirmish(42), 200);
        assert!(divergence.is_none(), "Expected no divergence");
    }

    #[test]
    fn test_per_tick_events_match() {
        let mut sim1 = fixtures::mid_world_push(5);
        let mut sim2 = fixtures::mid_world_push(5);

        for tick in 0..300 {
            let events1 = sim1.tick(MAX_DT);
            let events2 = sim2.tick(MAX_DT);
            assert_eq!(
                events1.events, events2.events,
                "Event streams differ at tick {tick}"
            );
        }
    }

    // =========================================================================
    // Serialization round-trip tests
    // =========================================================================

    #[test]
    fn test_serialization_preserves_fresh_run() {
        assert!(verify_serialization_determinism(
            || Simulation::new(SimulationParams::default()),
            0
        ));
    }

    #[test]
    fn test_serialization_preserves_busy_arena() {
        assert!(verify_serialization_determinism(
            || fixtures::mid_world_push(77),
            120
        ));
    }

    #[test]
    fn test_resumed_snapshot_stays_in_lockstep() {
        let mut live = fixtures::opening_skirmish(31);
        let bytes = live.serialize().unwrap();
        let mut resumed = Simulation::deserialize(&bytes).unwrap();

        for _ in 0..200 {
            live.tick(MAX_DT);
            resumed.tick(MAX_DT);
            assert_eq!(live.state_hash(), resumed.state_hash());
        }
    }

    // =========================================================================
    // Parallel simulation tests
    // =========================================================================

    #[test]
    fn test_parallel_fresh_simulations() {
        let result =
            run_parallel_simulations(|| Simulation::new(SimulationParams::default()), 4, 100);
        result.assert_deterministic();
    }

    #[test]
    fn test_parallel_skirmish_simulations() {
        let result = run_parallel_simulations(|| fixtures::opening_skirmish(8), 4, 300);
        result.assert_deterministic();
    }

    // =========================================================================
    // Property-based tests using proptest
    // =========================================================================

    proptest! {
        /// Any seed should produce a reproducible run.
        #[test]
        fn prop_any_seed_is_deterministic(seed in any::<u64>()) {
            let setup = move || Simulation::new(SimulationParams {
                seed,
                ..SimulationParams::default()
            });
            prop_assert!(verify_simulation_determinism(setup, 60));
        }

        /// Any stick input, including sub-deadzone wobble, should replay exactly.
        #[test]
        fn prop_stick_inputs_are_deterministic(
            move_stick in strategies::arb_stick(),
            aim_stick in strategies::arb_stick(),
        ) {
            use trial_core::player::Command;

            let setup = move || {
                let mut sim = Simulation::new(SimulationParams {
                    seed: 1,
                    ..SimulationParams::default()
                });
                let _ = sim.apply_command(Command::SetMoveInput(move_stick));
                let _ = sim.apply_command(Command::SetAimInput(aim_stick));
                sim
            };

            prop_assert!(verify_simulation_determinism(setup, 100));
        }

        /// Random command scripts applied at setup should replay exactly.
        #[test]
        fn prop_command_scripts_are_replayable(
            commands in strategies::arb_command_sequence(10),
        ) {
            let commands_clone = commands.clone();

            let setup = move || {
                let mut sim = Simulation::new(SimulationParams {
                    seed: 3,
                    ..SimulationParams::default()
                });
                for command in &commands_clone {
                    let _ = sim.apply_command(*command);
                }
                sim
            };

            let result = verify_determinism(
                2,
                150,
                setup,
                |s| { s.tick(MAX_DT); },
                |s| s.state_hash(),
            );
            prop_assert!(result.is_deterministic);
        }

        /// The same uneven dt sequence must land on the same state.
        #[test]
        fn prop_dt_sequences_are_deterministic(
            dts in strategies::arb_dt_sequence(80),
        ) {
            let params = SimulationParams {
                seed: 11,
                ..SimulationParams::default()
            };

            let mut sim1 = Simulation::new(params);
            let mut sim2 = Simulation::new(params);
            for dt in &dts {
                sim1.tick(*dt);
                sim2.tick(*dt);
            }

            prop_assert_eq!(sim1.state_hash(), sim2.state_hash());
        }

        /// Any combination of world, wave, level, and loadout reproduces.
        #[test]
        fn prop_any_params_are_deterministic(
            params in strategies::arb_params(),
        ) {
            let setup = move || Simulation::new(params);
            prop_assert!(verify_simulation_determinism(setup, 60));
        }

        /// Snapshot round-trips preserve state at any depth into a run.
        #[test]
        fn prop_serialization_roundtrip_is_exact(
            seed in any::<u64>(),
            num_ticks in 0u64..100,
        ) {
            let setup = move || Simulation::new(SimulationParams {
                seed,
                ..SimulationParams::default()
            });
            prop_assert!(verify_serialization_determinism(setup, num_ticks));
        }
    }

    // =========================================================================
    // Stress tests (only run explicitly with --ignored)
    // =========================================================================

    #[test]
    #[ignore = "Long-running stress test"]
    fn stress_test_full_survival_run() {
        // Ten minutes of simulated time at the tick cap.
        let result = verify_determinism(
            3,
            18_000,
            || fixtures::mid_world_push(2024),
            |sim| {
                sim.tick(MAX_DT);
            },
            |sim| sim.state_hash(),
        );
        result.assert_deterministic();
    }

    #[test]
    #[ignore = "Long-running stress test"]
    fn stress_test_parallel_many_simulations() {
        let result = run_parallel_simulations(|| fixtures::opening_skirmish(55), 16, 1000);
        result.assert_deterministic();
    }
}

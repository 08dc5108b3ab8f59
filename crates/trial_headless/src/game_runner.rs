//! Scripted run execution for headless testing.
//!
//! This module drives trial_core's `Simulation` with a scripted pilot
//! at a fixed 60 Hz timestep and folds the event stream into metrics.
//!
//! # Defensive Coding Principles
//!
//! - The main loop is bounded by an explicit tick cap
//! - Entity growth is checked against a hard limit every tick
//! - Progress is logged at regular intervals
//! - Failure modes are explicit, not silent

use std::time::{Duration, Instant};

use tracing::{debug, error, info, trace, warn};

use trial_core::math::Fixed;
use trial_core::simulation::Simulation;

use crate::metrics::{GameMetrics, MetricsCollector, RunOutcome};
use crate::scenario::Scenario;

/// Simulation rate the runner drives at.
pub const TICKS_PER_SECOND: u64 = 60;

/// Default tick cap: 10 minutes of game time at 60 tps.
pub const DEFAULT_MAX_TICKS: u64 = 600 * TICKS_PER_SECOND;

/// The fixed timestep, 1/60 s in 32.32 fixed point.
pub const TICK_DT: Fixed = Fixed::from_bits(71_582_788);

// =============================================================================
// RESOURCE LIMITS
// =============================================================================

/// Maximum live entities (enemies + projectiles) before the runner
/// aborts. The wave tables top out near thirty enemies and the sweep
/// bounds projectiles, so reaching this means runaway spawning.
const MAX_LIVE_ENTITIES: usize = 4_096;

/// Progress logging interval (ticks).
const PROGRESS_LOG_INTERVAL: u64 = 1_000;

// =============================================================================
// WATCHDOG TIMEOUTS (detecting hangs, not game duration)
// =============================================================================

/// Maximum wall-clock time for a single tick to complete.
/// Normal ticks finish in well under a millisecond.
const TICK_TIMEOUT_MS: u128 = 5_000;

/// Grace period before logging "slow tick" warnings (ms).
const SLOW_TICK_THRESHOLD_MS: u128 = 100;

/// High-level run driver for headless testing.
#[derive(Debug, Clone)]
pub struct GameRunner {
    /// Default max ticks if neither config nor scenario specifies one.
    pub default_max_ticks: u64,
}

impl Default for GameRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRunner {
    /// Create a new game runner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_max_ticks: DEFAULT_MAX_TICKS,
        }
    }

    /// Run a game with the given configuration.
    pub fn run(&self, mut config: GameConfig) -> GameResult {
        if config.max_ticks == 0 && config.scenario.max_ticks == 0 {
            config.max_ticks = self.default_max_ticks;
        }
        run_game(config)
    }
}

/// Configuration for a single run.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Scenario to play.
    pub scenario: Scenario,
    /// Random seed for determinism.
    pub seed: u64,
    /// Tick cap override (0 = scenario value, then runner default).
    pub max_ticks: u64,
    /// Run ID for tracking.
    pub game_id: String,
}

/// Result of running a game.
#[derive(Debug)]
pub struct GameResult {
    /// Collected run metrics.
    pub metrics: GameMetrics,
    /// Final state hash, duplicated out of the metrics for callers
    /// that only compare hashes.
    pub final_state_hash: u64,
}

fn resolve_max_ticks(config: &GameConfig) -> u64 {
    if config.max_ticks > 0 {
        config.max_ticks
    } else if config.scenario.max_ticks > 0 {
        config.scenario.max_ticks
    } else {
        DEFAULT_MAX_TICKS
    }
}

/// Run a scripted game to completion.
///
/// The loop ends when the simulation reaches a terminal state, the
/// tick cap is hit, or a safety cap trips.
pub fn run_game(config: GameConfig) -> GameResult {
    let game_start = Instant::now();
    let max_ticks = resolve_max_ticks(&config);
    let pilot = config.scenario.pilot;

    info!(
        game_id = %config.game_id,
        seed = config.seed,
        max_ticks = max_ticks,
        scenario = %config.scenario.name,
        world = config.scenario.world.name(),
        pilot = pilot.name(),
        "Starting run"
    );

    let mut sim = Simulation::new(config.scenario.params(config.seed));
    let mut collector =
        MetricsCollector::new(&config.game_id, &config.scenario.name, config.seed);
    let mut aborted = false;
    let mut last_progress_log = Instant::now();

    while sim.get_tick() < max_ticks && !sim.is_terminal() {
        let tick_start = Instant::now();

        // Defensive check: entity count sanity.
        let live_entities = sim.enemies().len() + sim.projectiles().len();
        if live_entities > MAX_LIVE_ENTITIES {
            error!(
                tick = sim.get_tick(),
                live_entities = live_entities,
                max = MAX_LIVE_ENTITIES,
                "FATAL: Entity count exceeded maximum - aborting to prevent OOM"
            );
            aborted = true;
            break;
        }

        // Pilot input for this tick. Rejected casts are expected
        // (cooldown races, mana overdraw) and are not errors.
        for command in pilot.decide(&sim) {
            if let Err(rejection) = sim.apply_command(command) {
                trace!(
                    tick = sim.get_tick(),
                    rejection = %rejection,
                    "Pilot command rejected"
                );
            }
        }

        let events = sim.tick(TICK_DT);
        collector.set_tick(sim.get_tick());
        collector.observe(&events);

        // Watchdog: check tick duration.
        let tick_duration = tick_start.elapsed();
        if tick_duration.as_millis() > SLOW_TICK_THRESHOLD_MS
            && tick_duration.as_millis() <= TICK_TIMEOUT_MS
        {
            warn!(
                tick = sim.get_tick(),
                duration_ms = tick_duration.as_millis(),
                threshold_ms = SLOW_TICK_THRESHOLD_MS,
                enemies = sim.enemies().len(),
                projectiles = sim.projectiles().len(),
                "Slow tick detected - possible performance issue"
            );
        }
        if tick_duration.as_millis() > TICK_TIMEOUT_MS {
            error!(
                tick = sim.get_tick(),
                duration_ms = tick_duration.as_millis(),
                timeout_ms = TICK_TIMEOUT_MS,
                "FATAL: Tick took too long - possible infinite loop or deadlock"
            );
            aborted = true;
            break;
        }

        // Progress logging.
        if sim.get_tick() % PROGRESS_LOG_INTERVAL == 0
            || last_progress_log.elapsed() > Duration::from_secs(5)
        {
            debug!(
                tick = sim.get_tick(),
                max_ticks = max_ticks,
                progress_pct = (sim.get_tick() as f64 / max_ticks as f64 * 100.0) as u32,
                wave = sim.scheduler().wave(),
                enemies = sim.enemies().len(),
                projectiles = sim.projectiles().len(),
                player_hp = sim.player().hp.current,
                elapsed_ms = game_start.elapsed().as_millis(),
                "Run progress"
            );
            last_progress_log = Instant::now();
        }
    }

    let game_duration = game_start.elapsed();
    let mut metrics = collector.finalize(&sim);
    if aborted {
        metrics.outcome = RunOutcome::Aborted;
    }

    info!(
        game_id = %config.game_id,
        duration_ticks = metrics.duration_ticks,
        duration_ms = game_duration.as_millis(),
        outcome = ?metrics.outcome,
        waves_cleared = metrics.waves_cleared,
        kills = metrics.total_kills,
        final_level = metrics.final_level,
        "Run complete"
    );

    let final_state_hash = metrics.final_state_hash;
    GameResult {
        metrics,
        final_state_hash,
    }
}

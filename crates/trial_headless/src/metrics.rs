//! Run metrics collection for balance analysis.
//!
//! This module collects per-run metrics from the simulation's event
//! stream and aggregates them across batches, so difficulty sweeps can
//! answer questions like "what wave kills a level-15 battlemage in
//! Blackrock Valley".

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use trial_core::events::{Event, TickEvents};
use trial_core::simulation::{Simulation, SimulationState};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Hit the tick cap with the player still standing.
    #[default]
    Timeout,
    /// The world boss fell.
    Cleared,
    /// The player fell.
    Died {
        /// Wave the run ended on.
        wave: u32,
    },
    /// The runner bailed out on a safety cap.
    Aborted,
}

/// Complete metrics for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameMetrics {
    /// Unique run identifier.
    pub game_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// Total run duration in ticks.
    pub duration_ticks: u64,
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Highest wave fully cleared.
    pub waves_cleared: u32,
    /// Highest wave that started spawning.
    pub waves_started: u32,
    /// Whether the boss entered the arena.
    pub boss_seen: bool,
    /// Whether the boss died.
    pub boss_killed: bool,
    /// Character level at the end of the run.
    pub final_level: u32,
    /// Level-ups earned during the run.
    pub levels_gained: u32,
    /// Kills by enemy kind.
    pub kills_by_kind: HashMap<String, u32>,
    /// Total enemy kills.
    pub total_kills: u32,
    /// Damage dealt to enemies.
    pub damage_dealt: i64,
    /// HP damage the player took (shield absorptions excluded).
    pub damage_taken: i64,
    /// Mana the shield paid to absorb hits.
    pub shield_absorbed: i64,
    /// Mana spent on casts.
    pub mana_spent: i64,
    /// Successful casts by spell.
    pub spells_cast: HashMap<String, u32>,
    /// Times the armed revive fired.
    pub times_revived: u32,
    /// XP earned during the run.
    pub xp_gained: u64,
    /// Coin total at the end of the run.
    pub coins: u64,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl GameMetrics {
    /// Create a new run metrics instance.
    #[must_use]
    pub fn new(game_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            game_id: game_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Wand/projectile damage per enemy killed, a rough efficiency read.
    #[must_use]
    pub fn damage_per_kill(&self) -> f64 {
        if self.total_kills == 0 {
            return 0.0;
        }
        self.damage_dealt as f64 / f64::from(self.total_kills)
    }

    /// The wave the player died on, if the run ended in a death.
    #[must_use]
    pub fn death_wave(&self) -> Option<u32> {
        match self.outcome {
            RunOutcome::Died { wave } => Some(wave),
            _ => None,
        }
    }
}

/// Metrics collector that folds the per-tick event stream into a
/// [`GameMetrics`].
#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: GameMetrics,
    current_tick: u64,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    #[must_use]
    pub fn new(game_id: &str, scenario: &str, seed: u64) -> Self {
        Self {
            metrics: GameMetrics::new(game_id, scenario, seed),
            current_tick: 0,
        }
    }

    /// Update the current tick.
    pub fn set_tick(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    /// Fold one tick's events into the running totals.
    pub fn observe(&mut self, events: &TickEvents) {
        for event in events.iter() {
            match *event {
                Event::DamageTaken { amount } => {
                    self.metrics.damage_taken += i64::from(amount);
                }
                Event::ShieldAbsorbed { cost } => {
                    self.metrics.shield_absorbed += i64::from(cost);
                }
                Event::ManaSpent { amount } => {
                    self.metrics.mana_spent += i64::from(amount);
                }
                Event::EnemyHit { amount, .. } => {
                    self.metrics.damage_dealt += i64::from(amount);
                }
                Event::EnemyKilled { kind, .. } => {
                    *self
                        .metrics
                        .kills_by_kind
                        .entry(kind.name().to_string())
                        .or_default() += 1;
                    self.metrics.total_kills += 1;
                }
                Event::XpGained { amount } => {
                    self.metrics.xp_gained += u64::from(amount);
                }
                Event::LevelUp { .. } => {
                    self.metrics.levels_gained += 1;
                }
                Event::WaveStarted { wave } => {
                    self.metrics.waves_started = self.metrics.waves_started.max(wave);
                }
                Event::WaveCleared { wave } => {
                    self.metrics.waves_cleared = self.metrics.waves_cleared.max(wave);
                }
                Event::BossSpawned => {
                    self.metrics.boss_seen = true;
                }
                Event::BossDefeated => {
                    self.metrics.boss_killed = true;
                }
                Event::SpellCast { spell } => {
                    *self
                        .metrics
                        .spells_cast
                        .entry(spell.name().to_string())
                        .or_default() += 1;
                }
                Event::PlayerRevived => {
                    self.metrics.times_revived += 1;
                }
                _ => {}
            }
        }
    }

    /// Finalize against the ended simulation and return the metrics.
    #[must_use]
    pub fn finalize(mut self, sim: &Simulation) -> GameMetrics {
        self.metrics.duration_ticks = sim.get_tick();
        self.metrics.outcome = match sim.state() {
            SimulationState::Running => RunOutcome::Timeout,
            SimulationState::GameOver { wave } => RunOutcome::Died { wave },
            SimulationState::WorldCleared => RunOutcome::Cleared,
        };
        self.metrics.final_level = sim.player().level;
        self.metrics.coins = sim.player().coins;
        self.metrics.final_state_hash = sim.state_hash();
        self.metrics
    }

    /// Get current metrics (immutable).
    #[must_use]
    pub fn current(&self) -> &GameMetrics {
        &self.metrics
    }
}

/// Summary statistics across multiple runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total runs played.
    pub total_games: u32,
    /// Runs that cleared the world.
    pub clears: u32,
    /// Runs that ended in a death.
    pub deaths: u32,
    /// Runs that hit the tick cap.
    pub timeouts: u32,
    /// Runs the runner aborted on a safety cap.
    pub aborts: u32,
    /// Fraction of runs that cleared the world.
    pub clear_rate: f64,
    /// Fraction of runs that killed the boss.
    pub boss_kill_rate: f64,
    /// Average run duration in ticks.
    pub avg_duration_ticks: f64,
    /// Shortest run.
    pub min_duration_ticks: u64,
    /// Longest run.
    pub max_duration_ticks: u64,
    /// Average of the highest wave cleared.
    pub avg_waves_cleared: f64,
    /// Average final character level.
    pub avg_final_level: f64,
    /// Average kills per run.
    pub avg_kills: f64,
    /// Average HP damage taken per run.
    pub avg_damage_taken: f64,
    /// Deaths per wave, ordered by wave.
    pub death_wave_histogram: BTreeMap<u32, u32>,
}

impl BatchSummary {
    /// Calculate summary from a list of run metrics.
    #[must_use]
    pub fn from_games(games: &[GameMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_games: games.len() as u32,
            min_duration_ticks: u64::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut boss_kills = 0u32;
        let mut waves_sum = 0u64;
        let mut level_sum = 0u64;
        let mut kills_sum = 0u64;
        let mut damage_sum = 0i64;

        for game in games {
            duration_sum += game.duration_ticks;
            summary.min_duration_ticks = summary.min_duration_ticks.min(game.duration_ticks);
            summary.max_duration_ticks = summary.max_duration_ticks.max(game.duration_ticks);

            match game.outcome {
                RunOutcome::Cleared => summary.clears += 1,
                RunOutcome::Died { wave } => {
                    summary.deaths += 1;
                    *summary.death_wave_histogram.entry(wave).or_default() += 1;
                }
                RunOutcome::Timeout => summary.timeouts += 1,
                RunOutcome::Aborted => summary.aborts += 1,
            }

            if game.boss_killed {
                boss_kills += 1;
            }
            waves_sum += u64::from(game.waves_cleared);
            level_sum += u64::from(game.final_level);
            kills_sum += u64::from(game.total_kills);
            damage_sum += game.damage_taken;
        }

        let count = games.len() as f64;
        summary.clear_rate = f64::from(summary.clears) / count;
        summary.boss_kill_rate = f64::from(boss_kills) / count;
        summary.avg_duration_ticks = duration_sum as f64 / count;
        summary.avg_waves_cleared = waves_sum as f64 / count;
        summary.avg_final_level = level_sum as f64 / count;
        summary.avg_kills = kills_sum as f64 / count;
        summary.avg_damage_taken = damage_sum as f64 / count;

        summary
    }

    /// The wave that killed the most runs, if any run died.
    #[must_use]
    pub fn deadliest_wave(&self) -> Option<u32> {
        self.death_wave_histogram
            .iter()
            .max_by_key(|(wave, deaths)| (**deaths, std::cmp::Reverse(**wave)))
            .map(|(wave, _)| *wave)
    }

    /// Whether the scenario sits inside a target clear-rate band.
    #[must_use]
    pub fn is_within_clear_band(&self, low: f64, high: f64) -> bool {
        self.clear_rate >= low && self.clear_rate <= high
    }
}

//! Batch run driver for balance testing.
//!
//! Runs many scripted games in parallel using rayon to collect
//! survival statistics across seeds efficiently.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::game_runner::{run_game, GameConfig, DEFAULT_MAX_TICKS};
use crate::metrics::{BatchSummary, GameMetrics, RunOutcome};
use crate::pilot::PilotKind;
use crate::scenario::Scenario;

/// Tick cap for extended batches: one hour of game time at 60 tps.
pub const EXTENDED_DEFAULT_MAX_TICKS: u64 = 216_000;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario to run (built-in name or RON path).
    pub scenario: String,
    /// Number of runs.
    pub game_count: u32,
    /// Maximum parallel runs (0 = use rayon default).
    pub parallel_games: u32,
    /// Output directory for results.
    pub output_dir: PathBuf,
    /// Starting seed; run `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Tick cap per run (0 = scenario value, then runner default).
    pub max_ticks: u64,
    /// Pilot override for every run.
    pub pilot: Option<PilotKind>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "withering_tree".to_string(),
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_ticks: DEFAULT_MAX_TICKS,
            pilot: None,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario.
    #[must_use]
    pub fn new(scenario: &str, game_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory.
    #[must_use]
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Override the scenario's pilot.
    #[must_use]
    pub fn with_pilot(mut self, pilot: PilotKind) -> Self {
        self.pilot = Some(pilot);
        self
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual run metrics.
    pub games: Vec<GameMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Errors encountered.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Run index.
    pub game_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

fn outcome_label(outcome: RunOutcome) -> &'static str {
    match outcome {
        RunOutcome::Cleared => "cleared",
        RunOutcome::Died { .. } => "died",
        RunOutcome::Timeout => "timeout",
        RunOutcome::Aborted => "aborted",
    }
}

/// Progress tracking for batch runs.
#[derive(Debug)]
pub struct BatchProgress {
    /// Total runs.
    pub total: u32,
    /// Completed runs.
    pub completed: Arc<AtomicU32>,
    /// Start time.
    pub start_time: Instant,
    /// Partial outcome tallies for live stats.
    partial_outcomes: Arc<Mutex<HashMap<&'static str, u32>>>,
}

impl BatchProgress {
    /// Create new progress tracker.
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: Arc::new(AtomicU32::new(0)),
            start_time: Instant::now(),
            partial_outcomes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a completed run.
    pub fn record_completion(&self, outcome: RunOutcome) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut outcomes) = self.partial_outcomes.lock() {
            *outcomes.entry(outcome_label(outcome)).or_insert(0) += 1;
        }
    }

    /// Get current completion count.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Get estimated time remaining.
    #[must_use]
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.start_time.elapsed();
        let per_game = elapsed.as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_game * f64::from(remaining))
    }

    /// Get current outcome rates.
    #[must_use]
    pub fn current_outcome_rates(&self) -> HashMap<&'static str, f64> {
        let completed = self.current();
        if completed == 0 {
            return HashMap::new();
        }

        if let Ok(outcomes) = self.partial_outcomes.lock() {
            outcomes
                .iter()
                .map(|(k, v)| (*k, f64::from(*v) / f64::from(completed)))
                .collect()
        } else {
            HashMap::new()
        }
    }

    /// Display progress to stderr.
    pub fn display(&self) {
        let completed = self.current();
        let eta = self.eta();
        let rates = self.current_outcome_rates();

        eprintln!("╔════════════════════════════════════╗");
        eprintln!(
            "║ Batch Progress: {:>4}/{:<4} ({:>5.1}%) ║",
            completed,
            self.total,
            self.percentage()
        );
        eprintln!(
            "║ ETA: {:>28} ║",
            format!("{}m {}s", eta.as_secs() / 60, eta.as_secs() % 60)
        );
        if !rates.is_empty() {
            eprintln!("╟────────────────────────────────────╢");
            eprintln!("║ Outcomes So Far:                   ║");
            for (outcome, rate) in &rates {
                eprintln!("║   {:<12}: {:>5.1}%              ║", outcome, rate * 100.0);
            }
        }
        eprintln!("╚════════════════════════════════════╝");
    }
}

/// Run a single game for the batch.
fn run_single_game(scenario: &str, seed: u64, config: &BatchConfig) -> Result<GameMetrics, String> {
    let mut scenario_data = Scenario::resolve(scenario).map_err(|e| e.to_string())?;
    if let Some(pilot) = config.pilot {
        scenario_data.pilot = pilot;
    }

    let game_config = GameConfig {
        scenario: scenario_data,
        seed,
        max_ticks: config.max_ticks,
        game_id: format!("game_{seed}"),
    };

    Ok(run_game(game_config).metrics)
}

/// Run a batch of games.
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let progress = Arc::new(BatchProgress::new(config.game_count));

    info!(
        "Starting batch run: {} games of '{}'",
        config.game_count, config.scenario
    );

    // Configure thread pool if specified.
    if config.parallel_games > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<GameMetrics, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));

            match run_single_game(&config.scenario, seed, &config) {
                Ok(metrics) => {
                    progress.record_completion(metrics.outcome);

                    let completed = progress.current();
                    if completed % 10 == 0 {
                        debug!("Progress: {}/{}", completed, config.game_count);
                    }
                    if completed % 100 == 0 {
                        progress.display();
                    }

                    Ok(metrics)
                }
                Err(e) => {
                    warn!("Game {} failed: {}", i, e);
                    Err(BatchError {
                        game_index: i,
                        seed,
                        message: e,
                    })
                }
            }
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(0.001)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by running the same seed multiple times.
pub fn verify_determinism(scenario: &str, seed: u64, runs: u32) -> bool {
    let mut results: Vec<GameMetrics> = Vec::with_capacity(runs as usize);
    for _ in 0..runs {
        match run_single_game(scenario, seed, &BatchConfig::default()) {
            Ok(metrics) => results.push(metrics),
            Err(error) => {
                warn!(error = %error, "Verification run failed");
                return false;
            }
        }
    }

    let Some(first) = results.first() else {
        return false;
    };
    results.iter().all(|r| {
        r.final_state_hash == first.final_state_hash
            && r.duration_ticks == first.duration_ticks
            && r.outcome == first.outcome
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.game_count, 100);
        assert_eq!(config.scenario, "withering_tree");
        assert_eq!(config.max_ticks, DEFAULT_MAX_TICKS);
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new("boss_rush", 500)
            .with_output(PathBuf::from("/tmp/results"))
            .with_seed(12345)
            .with_pilot(PilotKind::Turret);

        assert_eq!(config.scenario, "boss_rush");
        assert_eq!(config.game_count, 500);
        assert_eq!(config.seed_start, 12345);
        assert_eq!(config.pilot, Some(PilotKind::Turret));
    }

    #[test]
    fn test_progress_tracking() {
        let progress = BatchProgress::new(100);
        assert_eq!(progress.current(), 0);
        assert!((progress.percentage() - 0.0).abs() < f64::EPSILON);

        progress.record_completion(RunOutcome::Cleared);
        progress.record_completion(RunOutcome::Died { wave: 12 });
        progress.record_completion(RunOutcome::Cleared);

        assert_eq!(progress.current(), 3);

        let rates = progress.current_outcome_rates();
        assert!((rates["cleared"] - 0.666).abs() < 0.01);
        assert!((rates["died"] - 0.333).abs() < 0.01);
    }

    #[test]
    fn test_run_batch_small() {
        let config = BatchConfig {
            game_count: 4,
            max_ticks: 120,
            ..BatchConfig::default()
        };
        let results = run_batch(config);

        assert_eq!(results.games.len(), 4);
        assert!(results.errors.is_empty());
        assert!(results.duration_seconds > 0.0);
        assert_eq!(results.summary.total_games, 4);
    }

    #[test]
    fn test_unknown_scenario_reports_errors() {
        let config = BatchConfig {
            scenario: "no_such_scenario".to_string(),
            game_count: 3,
            max_ticks: 60,
            ..BatchConfig::default()
        };
        let results = run_batch(config);

        assert!(results.games.is_empty());
        assert_eq!(results.errors.len(), 3);
    }

    #[test]
    fn test_batch_seeds_are_sequential() {
        let config = BatchConfig {
            game_count: 3,
            max_ticks: 60,
            seed_start: 40,
            ..BatchConfig::default()
        };
        let results = run_batch(config);

        let mut seeds: Vec<u64> = results.games.iter().map(|g| g.seed).collect();
        seeds.sort_unstable();
        assert_eq!(seeds, vec![40, 41, 42]);
    }

    #[test]
    fn test_batch_results_save_load() {
        let config = BatchConfig {
            game_count: 2,
            max_ticks: 60,
            ..BatchConfig::default()
        };
        let results = run_batch(config);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games.len(), 2);
        assert_eq!(loaded.config.scenario, "withering_tree");
    }

    #[test]
    fn test_verify_determinism() {
        assert!(verify_determinism("withering_tree", 12345, 2));
    }
}

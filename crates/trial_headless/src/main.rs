//! Headless runner for wave-survival balance testing.
//!
//! This binary plays scripted runs without graphics: single games,
//! parallel balance batches, determinism checks, replay verification
//! and tick-throughput benchmarks.
//!
//! # Usage
//!
//! ```bash
//! # Play one scripted run
//! cargo run -p trial_headless -- run --scenario boss_rush --seed 7
//!
//! # Run a balance batch
//! cargo run -p trial_headless -- batch --scenario withering_tree --count 1000 --output results/
//!
//! # Verify determinism of a seed
//! cargo run -p trial_headless -- verify --scenario blackrock_gauntlet --seed 12345
//!
//! # Verify a recorded replay
//! cargo run -p trial_headless -- replay --file run.replay --verify
//! ```
//!
//! Logs go to stderr; results files are JSON on disk.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trial_headless::{
    batch::{run_batch, verify_determinism, BatchConfig, EXTENDED_DEFAULT_MAX_TICKS},
    game_runner::{GameConfig, GameRunner, TICKS_PER_SECOND, TICK_DT},
    metrics::RunOutcome,
    pilot::PilotKind,
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "trial_headless")]
#[command(about = "Headless wave-survival runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single scripted run
    Run {
        /// Built-in scenario name or RON file path
        #[arg(short, long, default_value = "withering_tree")]
        scenario: String,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Tick cap (0 = scenario default)
        #[arg(long, default_value = "0")]
        max_ticks: u64,

        /// Pilot override: passive, turret or battlemage
        #[arg(long)]
        pilot: Option<String>,
    },

    /// Run a batch of games for balance testing
    Batch {
        /// Built-in scenario name or RON file path
        #[arg(short, long, default_value = "withering_tree")]
        scenario: String,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel games (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Pilot override: passive, turret or battlemage
        #[arg(long)]
        pilot: Option<String>,

        /// Maximum game duration in minutes (game time, not wall clock)
        #[arg(long, default_value = "10")]
        duration_minutes: u32,

        /// Quick mode: 5-minute games for rapid iteration
        #[arg(long, conflicts_with = "duration_minutes")]
        quick: bool,

        /// Extended mode: 60-minute games for full-clear testing
        #[arg(long, conflicts_with = "duration_minutes")]
        extended: bool,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Scenario to test
        #[arg(short, long, default_value = "withering_tree")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Play back or verify a recorded replay journal
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Verify playback reproduces the recorded hash
        #[arg(long)]
        verify: bool,
    },

    /// Run N ticks for benchmarking
    Bench {
        /// Number of ticks to run
        #[arg(short, long, default_value = "36000")]
        ticks: u64,

        /// Scenario to benchmark
        #[arg(short, long)]
        scenario: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logging to stderr; stdout stays clean for piped output.
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            max_ticks,
            pilot,
        }) => {
            cmd_run(&scenario, seed, max_ticks, pilot.as_deref());
        }
        Some(Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            pilot,
            duration_minutes,
            quick,
            extended,
        }) => {
            cmd_batch(
                scenario,
                count,
                parallel,
                output,
                seed,
                pilot.as_deref(),
                duration_minutes,
                quick,
                extended,
            );
        }
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => {
            cmd_verify(&scenario, seed, runs);
        }
        Some(Commands::Replay { file, verify }) => {
            cmd_replay(file, verify);
        }
        Some(Commands::Bench { ticks, scenario }) => {
            cmd_bench(ticks, scenario.as_deref());
        }
        None => {
            cmd_run("withering_tree", 0, 0, None);
        }
    }
}

/// Parse a pilot name, falling back to the battlemage.
fn parse_pilot(name: &str) -> PilotKind {
    match name {
        "passive" => PilotKind::Passive,
        "turret" => PilotKind::Turret,
        "battlemage" => PilotKind::Battlemage,
        other => {
            tracing::warn!(pilot = other, "Unknown pilot, using battlemage");
            PilotKind::Battlemage
        }
    }
}

/// Resolve a scenario argument or exit.
fn load_scenario(spec: &str) -> Scenario {
    match Scenario::resolve(spec) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario '{}': {}", spec, e);
            std::process::exit(1);
        }
    }
}

/// Play a single scripted run and print its summary.
fn cmd_run(scenario: &str, seed: u64, max_ticks: u64, pilot: Option<&str>) {
    let mut scenario_data = load_scenario(scenario);
    if let Some(name) = pilot {
        scenario_data.pilot = parse_pilot(name);
    }

    tracing::info!(
        scenario = %scenario_data.name,
        seed = seed,
        pilot = scenario_data.pilot.name(),
        "Starting single run"
    );

    let config = GameConfig {
        scenario: scenario_data,
        seed,
        max_ticks,
        game_id: format!("run_{seed}"),
    };
    let result = GameRunner::new().run(config);
    let metrics = &result.metrics;

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("RUN COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Scenario: {}", metrics.scenario);
    eprintln!("Seed: {}", metrics.seed);
    match metrics.outcome {
        RunOutcome::Cleared => eprintln!("Outcome: world cleared"),
        RunOutcome::Died { wave } => eprintln!("Outcome: died on wave {wave}"),
        RunOutcome::Timeout => eprintln!("Outcome: tick cap reached"),
        RunOutcome::Aborted => eprintln!("Outcome: ABORTED on a safety cap"),
    }
    eprintln!(
        "Duration: {} ticks ({:.1}s game time)",
        metrics.duration_ticks,
        metrics.duration_ticks as f64 / TICKS_PER_SECOND as f64
    );
    eprintln!(
        "Waves: {} started, {} cleared",
        metrics.waves_started, metrics.waves_cleared
    );
    eprintln!(
        "Level: {} (+{} this run)",
        metrics.final_level, metrics.levels_gained
    );
    eprintln!("Kills: {}", metrics.total_kills);
    for (kind, count) in &metrics.kills_by_kind {
        eprintln!("  {}: {}", kind, count);
    }
    eprintln!(
        "Damage: {} dealt, {} taken ({} absorbed by shield)",
        metrics.damage_dealt, metrics.damage_taken, metrics.shield_absorbed
    );
    eprintln!("Mana spent: {}", metrics.mana_spent);
    for (spell, count) in &metrics.spells_cast {
        eprintln!("  {}: {} casts", spell, count);
    }
    eprintln!("Coins: {}", metrics.coins);
    eprintln!("State hash: {:016x}", result.final_state_hash);
}

/// Run a batch of games for balance testing.
fn cmd_batch(
    scenario: String,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    pilot: Option<&str>,
    duration_minutes: u32,
    quick: bool,
    extended: bool,
) {
    use std::time::Instant;

    let batch_start = Instant::now();

    // Ticks = minutes * 60 seconds * 60 ticks/second.
    const TICKS_PER_MINUTE: u64 = 60 * TICKS_PER_SECOND;
    let max_ticks = if quick {
        5 * TICKS_PER_MINUTE
    } else if extended {
        EXTENDED_DEFAULT_MAX_TICKS
    } else {
        u64::from(duration_minutes) * TICKS_PER_MINUTE
    };

    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    tracing::info!(
        scenario = %scenario,
        count = count,
        parallel = parallel,
        seed = seed,
        output = %output.display(),
        cpus_available = num_cpus,
        max_ticks = max_ticks,
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!(
            "FATAL: Cannot create output directory '{}': {}",
            output.display(),
            e
        );
        std::process::exit(1);
    }

    let config = BatchConfig {
        scenario,
        game_count: count,
        parallel_games: parallel,
        output_dir: output.clone(),
        seed_start: seed,
        max_ticks,
        pilot: pilot.map(parse_pilot),
    };

    let results = run_batch(config);

    let batch_duration = batch_start.elapsed();
    tracing::info!(
        games_completed = results.games.len(),
        games_failed = results.errors.len(),
        total_duration_secs = format!("{:.1}", batch_duration.as_secs_f64()),
        "Batch execution finished"
    );

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {}", e);
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Throughput: {:.1} games/sec",
        results.games.len() as f64 / results.duration_seconds.max(0.001)
    );
    eprintln!("\nOutcomes:");
    eprintln!(
        "  cleared: {} ({:.1}%)",
        summary.clears,
        summary.clear_rate * 100.0
    );
    eprintln!("  died: {}", summary.deaths);
    eprintln!("  timeout: {}", summary.timeouts);
    if summary.aborts > 0 {
        eprintln!("  ABORTED: {}", summary.aborts);
    }
    eprintln!("Boss kill rate: {:.1}%", summary.boss_kill_rate * 100.0);
    eprintln!("Avg waves cleared: {:.1}", summary.avg_waves_cleared);
    eprintln!("Avg final level: {:.1}", summary.avg_final_level);
    if let Some(wave) = summary.deadliest_wave() {
        eprintln!("Deadliest wave: {}", wave);
    }
    if !summary.death_wave_histogram.is_empty() {
        eprintln!("\nDeaths by wave:");
        for (wave, deaths) in &summary.death_wave_histogram {
            eprintln!("  wave {:>2}: {}", wave, deaths);
        }
    }

    if !results.errors.is_empty() {
        eprintln!("\nGAME FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Game {} (seed {}): {}",
                error.game_index, error.seed, error.message
            );
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Verify determinism.
fn cmd_verify(scenario: &str, seed: u64, runs: u32) {
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario,
        seed,
        runs
    );

    if verify_determinism(scenario, seed, runs) {
        eprintln!("PASS: All {} runs produced identical results", runs);
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
}

/// Play back or verify a recorded replay journal.
fn cmd_replay(file: PathBuf, verify: bool) {
    use trial_core::replay::{Replay, ReplayPlayer};

    if verify {
        tracing::info!("Verifying replay: {}", file.display());
    } else {
        tracing::info!("Playing replay: {}", file.display());
    }

    let replay = match Replay::load(&file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load replay: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!("Loaded replay:");
    eprintln!("  World: {}", replay.params.world.name());
    eprintln!("  Seed: {}", replay.params.seed);
    eprintln!("  Frames: {}", replay.frame_count());
    eprintln!("  Commands: {}", replay.command_count());

    let mut player = ReplayPlayer::new(replay);

    if verify {
        eprintln!("Verifying replay...");
        match player.verify() {
            Ok(hash) => {
                eprintln!("PASS: Replay verification successful");
                eprintln!("  State hash: {:016x}", hash);
            }
            Err(e) => {
                eprintln!("FAIL: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        let total = player.replay().frame_count();
        let mut last_percent = 0;

        loop {
            let more = player.advance();
            let percent = (player.current_frame() * 100 / total.max(1)) as u32;
            if percent > last_percent && percent % 10 == 0 {
                eprintln!("Progress: {}%", percent);
                last_percent = percent;
            }
            if !more {
                break;
            }
        }

        let sim = player.simulation();
        eprintln!("Replay complete at tick {}", sim.get_tick());
        eprintln!("Final state hash: {:016x}", sim.state_hash());
        eprintln!("\nFinal State:");
        eprintln!("  Wave: {}", sim.scheduler().wave());
        eprintln!("  Player level: {}", sim.player().level);
        eprintln!(
            "  Player HP: {}/{}",
            sim.player().hp.current,
            sim.player().hp.max
        );
        eprintln!("  Enemies alive: {}", sim.enemies().len());
    }
}

/// Run a raw tick-throughput benchmark.
fn cmd_bench(ticks: u64, scenario: Option<&str>) {
    use std::time::Instant;
    use trial_core::simulation::Simulation;

    tracing::info!("Running {} tick benchmark", ticks);

    let scenario_data = match scenario {
        Some(s) => load_scenario(s),
        None => Scenario::withering_tree(),
    };

    let mut sim = Simulation::new(scenario_data.params(0));

    eprintln!("Benchmarking scenario '{}'", scenario_data.name);
    eprintln!("Running {} ticks...", ticks);

    // Warmup
    for _ in 0..100 {
        sim.tick(TICK_DT);
    }

    let start = Instant::now();
    for _ in 0..ticks {
        sim.tick(TICK_DT);
    }
    let elapsed = start.elapsed();

    let tps = ticks as f64 / elapsed.as_secs_f64();

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Ticks: {}", ticks);
    eprintln!("Duration: {:.3}s", elapsed.as_secs_f64());
    eprintln!("Ticks/second: {:.1}", tps);
    eprintln!("ms/tick: {:.4}", elapsed.as_millis() as f64 / ticks as f64);
    eprintln!("Final wave: {}", sim.scheduler().wave());
    eprintln!("Enemies alive: {}", sim.enemies().len());
    eprintln!("State hash: {:016x}", sim.state_hash());
}

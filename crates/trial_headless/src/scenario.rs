//! Scenario loading and configuration.
//!
//! A scenario pins down everything about a headless run except the
//! seed: the world, the carried character level, the spell loadout,
//! the first wave, the scripted pilot and the tick cap. Scenarios are
//! RON files on disk or named built-ins.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use trial_core::simulation::SimulationParams;
use trial_core::spells::{SpellBook, SpellKind};
use trial_core::waves::{WorldId, WAVES_PER_WORLD};

use crate::pilot::PilotKind;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// World to run.
    pub world: WorldId,
    /// Persistent character level carried into the run.
    pub starting_level: u32,
    /// First wave to schedule (1 for a full run).
    pub starting_wave: u32,
    /// Spells the player owns.
    pub spells: Vec<SpellKind>,
    /// Scripted pilot driving the player.
    pub pilot: PilotKind,
    /// Tick cap for the run (0 = runner default).
    pub max_ticks: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::withering_tree()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Look up a named built-in scenario.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "withering_tree" | "default" => Some(Self::withering_tree()),
            "blackrock_gauntlet" => Some(Self::blackrock_gauntlet()),
            "boss_rush" => Some(Self::boss_rush()),
            _ => None,
        }
    }

    /// Resolve a CLI scenario argument: built-in name first, then a
    /// RON file path.
    pub fn resolve(spec: &str) -> Result<Self, ScenarioError> {
        match Self::by_name(spec) {
            Some(scenario) => Ok(scenario),
            None => Self::load(spec),
        }
    }

    /// A fresh character's first run: starter world, starter kit.
    #[must_use]
    pub fn withering_tree() -> Self {
        Self {
            name: "Withering Tree".to_string(),
            description: "Fresh level-1 run through the starter world".to_string(),
            world: WorldId::WitheringTree,
            starting_level: 1,
            starting_wave: 1,
            spells: vec![
                SpellKind::HealthPotion,
                SpellKind::ManaShield,
                SpellKind::Fireball,
            ],
            pilot: PilotKind::Battlemage,
            max_ticks: 0,
        }
    }

    /// A mid-progression run with a broader book and tougher spawns.
    #[must_use]
    pub fn blackrock_gauntlet() -> Self {
        Self {
            name: "Blackrock Gauntlet".to_string(),
            description: "Mid-game loadout against the Blackrock Valley roster".to_string(),
            world: WorldId::BlackrockValley,
            starting_level: 15,
            starting_wave: 1,
            spells: vec![
                SpellKind::HealthPotion,
                SpellKind::ManaCrystal,
                SpellKind::Revive,
                SpellKind::ManaShield,
                SpellKind::RapidWand,
                SpellKind::Fireball,
            ],
            pilot: PilotKind::Battlemage,
            max_ticks: 0,
        }
    }

    /// Skip straight to the final wave and the Bohban fight.
    #[must_use]
    pub fn boss_rush() -> Self {
        Self {
            name: "Boss Rush".to_string(),
            description: "Endgame loadout dropped in front of the Tower of Babel boss".to_string(),
            world: WorldId::TowerOfBabel,
            starting_level: 50,
            starting_wave: WAVES_PER_WORLD,
            spells: SpellKind::ALL.to_vec(),
            pilot: PilotKind::Battlemage,
            max_ticks: 0,
        }
    }

    /// Simulation parameters for this scenario under `seed`.
    #[must_use]
    pub fn params(&self, seed: u64) -> SimulationParams {
        SimulationParams {
            seed,
            world: self.world,
            starting_level: self.starting_level.max(1),
            starting_wave: self.starting_wave.clamp(1, WAVES_PER_WORLD),
            spells: self.spells.iter().copied().collect::<SpellBook>(),
        }
    }
}

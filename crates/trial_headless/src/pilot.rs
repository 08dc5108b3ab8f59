//! Scripted pilots for headless runs.
//!
//! A pilot is a deterministic policy that reads the public simulation
//! state between ticks and issues input commands. Pilots carry no
//! private randomness and no hidden state, so a (scenario, seed) pair
//! always produces the same run.

use serde::{Deserialize, Serialize};

use trial_core::math::{Fixed, Vec2Fixed};
use trial_core::player::Command;
use trial_core::simulation::Simulation;
use trial_core::spells::SpellKind;
use trial_core::waves::WavePhase;

/// HP percentage below which the battlemage drinks a potion.
const POTION_HP_PERCENT: u32 = 40;
/// HP percentage below which the battlemage burns the full heal.
const FAIRY_DUST_HP_PERCENT: u32 = 15;
/// HP percentage below which the battlemage goes for full immunity.
const EMERGENCY_HP_PERCENT: u32 = 25;
/// Crowd size that justifies a blizzard.
const BLIZZARD_CROWD: usize = 6;
/// Crowd size that justifies burning the attack-speed buff early.
const RAPID_WAND_CROWD: usize = 8;
/// Enemy count from which fireballs are worth the mana.
const FIREBALL_CROWD: usize = 2;

/// Which scripted pilot drives the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PilotKind {
    /// No input at all. Measures pure attrition.
    Passive,
    /// Stand at the spawn point and keep the wand on the nearest enemy.
    Turret,
    /// Turret aim plus spell heuristics.
    #[default]
    Battlemage,
}

impl PilotKind {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Passive => "passive",
            Self::Turret => "turret",
            Self::Battlemage => "battlemage",
        }
    }

    /// Decide this tick's commands from the observed state.
    ///
    /// Commands are returned in application order. Casts the simulation
    /// rejects (cooldown races, mana overdraw) are harmless; the runner
    /// applies each command and discards rejections.
    #[must_use]
    pub fn decide(self, sim: &Simulation) -> Vec<Command> {
        match self {
            Self::Passive => Vec::new(),
            Self::Turret => aim_at_nearest(sim).into_iter().collect(),
            Self::Battlemage => {
                let mut commands: Vec<Command> = aim_at_nearest(sim).into_iter().collect();
                commands.extend(spell_casts(sim));
                commands
            }
        }
    }
}

/// Aim command toward the nearest live enemy, or `None` to hold the
/// current aim when the arena is empty.
fn aim_at_nearest(sim: &Simulation) -> Option<Command> {
    let player = sim.player();
    let nearest = sim
        .enemies()
        .iter()
        .filter(|enemy| enemy.alive())
        .min_by_key(|enemy| enemy.position.distance_squared(player.position))?;
    let direction = (nearest.position - player.position).normalize();
    if direction == Vec2Fixed::ZERO {
        return None;
    }
    Some(Command::SetAimInput(direction))
}

/// Current HP as an integer percentage of max.
fn hp_percent(sim: &Simulation) -> u32 {
    let hp = sim.player().hp;
    hp.current * 100 / hp.max.max(1)
}

/// Whether a cast is worth proposing at all this tick.
fn castable(sim: &Simulation, kind: SpellKind) -> bool {
    let player = sim.player();
    player.spellbook.owns(kind)
        && player.cooldowns.ready(kind)
        && !player.active.is_active(kind)
        && player.mana >= Fixed::from_num(kind.mana_cost())
}

/// The battlemage's cast priorities, checked top to bottom.
fn spell_casts(sim: &Simulation) -> Vec<Command> {
    let player = sim.player();
    let enemies = sim.enemies().iter().filter(|enemy| enemy.alive()).count();
    let hp = hp_percent(sim);
    let boss_phase = sim.scheduler().phase() == WavePhase::BossFight;
    let mut casts = Vec::new();

    // Survival first: heal, then keep the rescue armed.
    if hp < FAIRY_DUST_HP_PERCENT && castable(sim, SpellKind::FairyDust) {
        casts.push(Command::CastSpell(SpellKind::FairyDust));
    } else if hp < POTION_HP_PERCENT && castable(sim, SpellKind::HealthPotion) {
        casts.push(Command::CastSpell(SpellKind::HealthPotion));
    }
    if !player.revive_armed && castable(sim, SpellKind::Revive) {
        casts.push(Command::CastSpell(SpellKind::Revive));
    }

    // Defense: immunity when near death, otherwise the mana shield
    // whenever anything is on the board.
    if hp < EMERGENCY_HP_PERCENT && castable(sim, SpellKind::LightningShield) {
        casts.push(Command::CastSpell(SpellKind::LightningShield));
    } else if enemies > 0
        && !player.active.hard_defense_active()
        && castable(sim, SpellKind::ManaShield)
    {
        casts.push(Command::CastSpell(SpellKind::ManaShield));
    }

    // Refill when the pool is nearly dry so the shield keeps paying.
    if player.mana * 5 < player.max_mana() && castable(sim, SpellKind::ManaCrystal) {
        casts.push(Command::CastSpell(SpellKind::ManaCrystal));
    }

    // Offense, biggest hammer first.
    if enemies >= BLIZZARD_CROWD && castable(sim, SpellKind::Blizzard) {
        casts.push(Command::CastSpell(SpellKind::Blizzard));
    }
    if (boss_phase || enemies >= RAPID_WAND_CROWD) && castable(sim, SpellKind::RapidWand) {
        casts.push(Command::CastSpell(SpellKind::RapidWand));
    }
    if enemies >= FIREBALL_CROWD && castable(sim, SpellKind::Fireball) {
        casts.push(Command::CastSpell(SpellKind::Fireball));
    }

    casts
}

//! Pacing checks for the difficulty curve.
//!
//! This module provides closed-form pacing math for judging wave budgets,
//! wand throughput, and incoming pressure across worlds and wizard levels
//! without running full simulations.

use serde::Serialize;

use trial_core::enemy::EnemyKind;
use trial_core::player::{max_hp_for_level, FIRE_INTERVAL};
use trial_core::projectile::ProjectileKind;
use trial_core::waves::{caster_count, ranged_count, walker_count, WorldId, WAVES_PER_WORLD};

/// Attack speed factor granted by the Rapid Wand spell.
const RAPID_WAND_FACTOR: f64 = 1.5;

/// An enemy's HP after the world scale is applied.
#[must_use]
pub fn scaled_hp(kind: EnemyKind, world: WorldId) -> u32 {
    kind.max_health() * world.enemy_hp_scale_percent() / 100
}

/// Enemy composition and health budget for one wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WaveBudget {
    /// World whose roster and scale apply.
    pub world: WorldId,
    /// Wave number, 1-based.
    pub wave: u32,
    /// Walker-slot spawns.
    pub walkers: u32,
    /// Ranged-slot spawns.
    pub ranged: u32,
    /// Caster-slot spawns.
    pub casters: u32,
}

impl WaveBudget {
    /// Budget for a wave as the scheduler would dispatch it.
    #[must_use]
    pub fn for_wave(world: WorldId, wave: u32, player_level: u32) -> Self {
        Self {
            world,
            wave,
            walkers: walker_count(wave),
            ranged: ranged_count(wave),
            casters: caster_count(wave, player_level),
        }
    }

    /// Total spawns in the wave.
    #[must_use]
    pub fn total_enemies(&self) -> u32 {
        self.walkers + self.ranged + self.casters
    }

    /// Total scaled HP the player must chew through.
    #[must_use]
    pub fn total_hp(&self) -> u32 {
        let roster = self.world.roster();
        self.walkers * scaled_hp(roster.walker, self.world)
            + self.ranged * scaled_hp(roster.ranged, self.world)
            + self.casters * scaled_hp(roster.caster, self.world)
    }

    /// XP awarded for clearing every spawn in the wave.
    #[must_use]
    pub fn xp_award(&self) -> u32 {
        let roster = self.world.roster();
        self.walkers * roster.walker.xp_value()
            + self.ranged * roster.ranged.xp_value()
            + self.casters * roster.caster.xp_value()
    }
}

/// Budgets for every wave of a world at a fixed wizard level.
#[must_use]
pub fn pacing_table(world: WorldId, player_level: u32) -> Vec<WaveBudget> {
    (1..=WAVES_PER_WORLD)
        .map(|wave| WaveBudget::for_wave(world, wave, player_level))
        .collect()
}

/// Wand damage throughput in HP per second.
#[must_use]
pub fn wand_dps(rapid_wand: bool) -> f64 {
    let interval: f64 = FIRE_INTERVAL.to_num();
    let factor = if rapid_wand { RAPID_WAND_FACTOR } else { 1.0 };
    f64::from(ProjectileKind::WandMissile.damage()) * factor / interval
}

/// Wand shots needed to put down one enemy.
#[must_use]
pub fn shots_to_kill(kind: EnemyKind, world: WorldId) -> u32 {
    scaled_hp(kind, world).div_ceil(ProjectileKind::WandMissile.damage())
}

/// Seconds of sustained wand fire to put down one enemy.
#[must_use]
pub fn seconds_to_kill(kind: EnemyKind, world: WorldId, rapid_wand: bool) -> f64 {
    let interval: f64 = FIRE_INTERVAL.to_num();
    let factor = if rapid_wand { RAPID_WAND_FACTOR } else { 1.0 };
    f64::from(shots_to_kill(kind, world)) * interval / factor
}

/// Single-target time to clear a wave's whole budget, in seconds.
///
/// A floor, since it ignores walk-in time and fireball or aura help.
#[must_use]
pub fn clear_time_estimate(world: WorldId, wave: u32, player_level: u32) -> f64 {
    f64::from(WaveBudget::for_wave(world, wave, player_level).total_hp()) / wand_dps(false)
}

/// The projectile a ranged or caster kind attacks with.
#[must_use]
pub fn shot_of(kind: EnemyKind) -> Option<ProjectileKind> {
    match kind {
        EnemyKind::Elf => Some(ProjectileKind::ElfArrow),
        EnemyKind::AxeThrower => Some(ProjectileKind::ThrownAxe),
        EnemyKind::Druid => Some(ProjectileKind::DruidOrb),
        EnemyKind::Shaman => Some(ProjectileKind::ShamanRock),
        EnemyKind::Bohban => Some(ProjectileKind::BossOrb),
        EnemyKind::Ent | EnemyKind::Spearman => None,
    }
}

/// Ranged pressure on the player in HP per second for a full wave.
///
/// Shaman barrages count a single rock per volley here, so treat the
/// result as a floor.
#[must_use]
pub fn incoming_ranged_dps(world: WorldId, wave: u32, player_level: u32) -> f64 {
    let budget = WaveBudget::for_wave(world, wave, player_level);
    let roster = world.roster();

    let per_kind = |kind: EnemyKind, count: u32| -> f64 {
        let (Some(shot), Some(interval)) = (shot_of(kind), kind.attack_interval()) else {
            return 0.0;
        };
        let interval: f64 = interval.to_num();
        f64::from(count) * f64::from(shot.damage()) / interval
    };

    per_kind(roster.ranged, budget.ranged) + per_kind(roster.caster, budget.casters)
}

/// Seconds the wizard survives the wave's ranged pressure if every shot lands.
#[must_use]
pub fn time_to_down(world: WorldId, wave: u32, player_level: u32) -> f64 {
    let dps = incoming_ranged_dps(world, wave, player_level);
    if dps <= 0.0 {
        return f64::INFINITY;
    }
    f64::from(max_hp_for_level(player_level)) / dps
}

/// Wand time-to-kill for every world's roster.
#[must_use]
pub fn generate_wand_ttk_matrix() -> Vec<(WorldId, EnemyKind, f64)> {
    let mut results = Vec::new();

    for world in WorldId::ALL {
        let roster = world.roster();
        for kind in [roster.walker, roster.ranged, roster.caster] {
            results.push((world, kind, seconds_to_kill(kind, world, false)));
        }
    }

    results
}

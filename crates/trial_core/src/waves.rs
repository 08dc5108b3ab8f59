//! Wave scheduling: world rosters, composition curves, spawn placement
//! and the phase machine that paces a run from wave 1 to the boss.

use crate::enemy::{
    Behavior, Enemy, EnemyKind, BOSS_ENTRANCE_TIME, BOSS_SPAWN_OFFSET, HOVER_RADIUS_X,
    HOVER_RADIUS_Y,
};
use crate::math::{fixed_cos, fixed_serde, fixed_sin, Arena, Fixed, Vec2Fixed, FIXED_TWO_PI};
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};

/// Waves before the boss phase.
pub const WAVES_PER_WORLD: u32 = 49;
/// Pause between a cleared wave and the next one, in seconds.
pub const BREATHER_TIME: Fixed = Fixed::from_bits(2 << 32);
/// Horizontal margin kept between ground spawns and the arena edges.
pub const SPAWN_EDGE_MARGIN: u32 = 40;
/// How far above the arena's top edge ground enemies appear.
pub const TOP_SPAWN_OFFSET: u32 = 60;
/// How far off the left or right edge archers appear.
pub const SIDE_SPAWN_OFFSET: u32 = 60;

/// The six selectable worlds, in progression order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldId {
    /// Starter forest.
    WitheringTree,
    /// Rocky pass.
    BlackrockValley,
    /// Flooded ruin.
    DrownedSanctum,
    /// Storm-wracked shrine.
    LightningTemple,
    /// Overgrown sanctuary.
    HollowGarden,
    /// The final ascent.
    TowerOfBabel,
}

/// Which enemy kind fills each composition slot in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldRoster {
    /// The walker slot (ground chasers and lane fallers).
    pub walker: EnemyKind,
    /// The ranged slot (hovering archers).
    pub ranged: EnemyKind,
    /// The caster slot (orbiting casters, excluded from clearance).
    pub caster: EnemyKind,
}

impl WorldId {
    /// Every world, in progression order.
    pub const ALL: [WorldId; 6] = [
        WorldId::WitheringTree,
        WorldId::BlackrockValley,
        WorldId::DrownedSanctum,
        WorldId::LightningTemple,
        WorldId::HollowGarden,
        WorldId::TowerOfBabel,
    ];

    /// The enemy kinds this world draws from.
    #[must_use]
    pub const fn roster(self) -> WorldRoster {
        match self {
            WorldId::WitheringTree => WorldRoster {
                walker: EnemyKind::Ent,
                ranged: EnemyKind::Elf,
                caster: EnemyKind::Druid,
            },
            WorldId::BlackrockValley => WorldRoster {
                walker: EnemyKind::Spearman,
                ranged: EnemyKind::AxeThrower,
                caster: EnemyKind::Shaman,
            },
            WorldId::DrownedSanctum => WorldRoster {
                walker: EnemyKind::Ent,
                ranged: EnemyKind::Elf,
                caster: EnemyKind::Shaman,
            },
            WorldId::LightningTemple => WorldRoster {
                walker: EnemyKind::Spearman,
                ranged: EnemyKind::Elf,
                caster: EnemyKind::Druid,
            },
            WorldId::HollowGarden => WorldRoster {
                walker: EnemyKind::Ent,
                ranged: EnemyKind::AxeThrower,
                caster: EnemyKind::Druid,
            },
            WorldId::TowerOfBabel => WorldRoster {
                walker: EnemyKind::Spearman,
                ranged: EnemyKind::AxeThrower,
                caster: EnemyKind::Shaman,
            },
        }
    }

    /// Percentage applied to every enemy's base HP in this world.
    #[must_use]
    pub const fn enemy_hp_scale_percent(self) -> u32 {
        match self {
            WorldId::WitheringTree | WorldId::BlackrockValley => 100,
            WorldId::DrownedSanctum => 125,
            WorldId::LightningTemple => 150,
            WorldId::HollowGarden => 175,
            WorldId::TowerOfBabel => 200,
        }
    }

    /// Whether the passive coin metronome pays out in this world.
    #[must_use]
    pub const fn passive_coins(self) -> bool {
        // Every current world awards coins; the flag is per-world so a
        // future challenge world can turn the tap off.
        true
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            WorldId::WitheringTree => "Withering Tree",
            WorldId::BlackrockValley => "Blackrock Valley",
            WorldId::DrownedSanctum => "Drowned Sanctum",
            WorldId::LightningTemple => "Lightning Temple",
            WorldId::HollowGarden => "Hollow Garden",
            WorldId::TowerOfBabel => "Tower of Babel",
        }
    }
}

/// Walkers in a wave: starts at 1, +1 every third wave, capped at 12.
#[must_use]
pub const fn walker_count(wave: u32) -> u32 {
    let count = 1 + wave / 3;
    if count > 12 {
        12
    } else {
        count
    }
}

/// Ranged enemies in a wave: none before wave 7, then +1 every third
/// wave, capped at 10.
#[must_use]
pub const fn ranged_count(wave: u32) -> u32 {
    let count = wave.saturating_sub(4) / 3;
    if count > 10 {
        10
    } else {
        count
    }
}

/// Casters in a wave: gated until wave 20 and persistent level 20,
/// then 1 plus one more every eighth wave, capped at 3.
#[must_use]
pub const fn caster_count(wave: u32, player_level: u32) -> u32 {
    if wave < 20 || player_level < 20 {
        return 0;
    }
    let count = 1 + (wave - 20) / 8;
    if count > 3 {
        3
    } else {
        count
    }
}

/// A spawn the simulation should perform: what, where, and with which
/// behavior seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnOrder {
    /// Enemy kind to mint.
    pub kind: EnemyKind,
    /// Spawn position.
    pub position: Vec2Fixed,
    /// Initial behavior state.
    pub behavior: Behavior,
}

/// Roll a seeded placement for one enemy of `kind`.
///
/// Ground kinds drop in from above the top edge, archers slide in from
/// a side, casters fade in on their hover ellipse, and the boss starts
/// its entrance dive above the arena's center line.
pub fn place_enemy(kind: EnemyKind, arena: &Arena, rng: &mut GameRng) -> SpawnOrder {
    let w = arena.width;
    let h = arena.height;
    match kind {
        EnemyKind::Ent | EnemyKind::Spearman => {
            let margin = Fixed::from_num(SPAWN_EDGE_MARGIN);
            let x = rng.next_fixed_range(margin, w - margin);
            let position = Vec2Fixed::new(x, h + Fixed::from_num(TOP_SPAWN_OFFSET));
            let behavior = if matches!(kind, EnemyKind::Spearman) {
                Behavior::LaneFaller
            } else {
                Behavior::Walker
            };
            SpawnOrder {
                kind,
                position,
                behavior,
            }
        }
        EnemyKind::Elf | EnemyKind::AxeThrower => {
            let offset = Fixed::from_num(SIDE_SPAWN_OFFSET);
            // Hold bands sit at 22-35% of the width on the left and
            // 65-78% on the right
            let (spawn_x, band_lo, band_hi) = if rng.coin_flip() {
                (-offset, w * 11 / 50, w * 7 / 20)
            } else {
                (w + offset, w * 13 / 20, w * 39 / 50)
            };
            let hold_x = rng.next_fixed_range(band_lo, band_hi);
            let y = rng.next_fixed_range(h * 9 / 20, h * 4 / 5);
            SpawnOrder {
                kind,
                position: Vec2Fixed::new(spawn_x, y),
                behavior: Behavior::Archer {
                    hold_x,
                    fire_timer: Fixed::ZERO,
                },
            }
        }
        EnemyKind::Druid | EnemyKind::Shaman => {
            let cx = rng.next_fixed_range(w / 4, w * 3 / 4);
            let cy = rng.next_fixed_range(h * 11 / 20, h * 17 / 20);
            let center = Vec2Fixed::new(cx, cy);
            let angle = rng.next_fixed_range(Fixed::ZERO, FIXED_TWO_PI);
            let position = Vec2Fixed::new(
                center.x + fixed_cos(angle) * Fixed::from_num(HOVER_RADIUS_X),
                center.y + fixed_sin(angle) * Fixed::from_num(HOVER_RADIUS_Y),
            );
            SpawnOrder {
                kind,
                position,
                behavior: Behavior::Orbiter {
                    center,
                    angle,
                    cast_timer: Fixed::ZERO,
                },
            }
        }
        EnemyKind::Bohban => SpawnOrder {
            kind,
            position: Vec2Fixed::new(w / 2, h + Fixed::from_num(BOSS_SPAWN_OFFSET)),
            behavior: Behavior::Boss {
                entrance_remaining: BOSS_ENTRANCE_TIME,
                attack_timer: Fixed::ZERO,
                roar_timer: Fixed::ZERO,
                reinforcements_delay: None,
            },
        },
    }
}

/// Scheduler phase. Waves only begin from `Idle` or a finished
/// breather, so a straggler stalls progression instead of stacking
/// overlapping waves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// Nothing scheduled yet.
    Idle,
    /// The current wave's tracked enemies are still out.
    WaveInProgress,
    /// Countdown until the next wave (or the boss) is released.
    Breather(#[serde(with = "fixed_serde")] Fixed),
    /// The boss is out.
    BossFight,
    /// The boss fell. Terminal victory state.
    WorldCleared,
}

/// What the scheduler decided this tick.
#[derive(Debug, Clone, Default)]
pub struct SchedulerTick {
    /// Enemies the simulation should spawn, in order.
    pub spawns: Vec<SpawnOrder>,
    /// Wave that began this tick.
    pub started: Option<u32>,
    /// Wave that finished this tick.
    pub cleared: Option<u32>,
    /// The boss was dispatched this tick.
    pub boss_entered: bool,
}

/// Paces one world's run: 49 composed waves, a breather between them,
/// then the boss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveScheduler {
    world: WorldId,
    wave: u32,
    phase: WavePhase,
    boss_dispatched: bool,
}

impl WaveScheduler {
    /// Scheduler for a fresh run of `world`.
    #[must_use]
    pub fn new(world: WorldId) -> Self {
        Self::starting_at(world, 1)
    }

    /// Scheduler whose first wave will be `first_wave`. Used by
    /// scripted scenarios that skip the early game.
    #[must_use]
    pub fn starting_at(world: WorldId, first_wave: u32) -> Self {
        Self {
            world,
            wave: first_wave.clamp(1, WAVES_PER_WORLD) - 1,
            phase: WavePhase::Idle,
            boss_dispatched: false,
        }
    }

    /// The world this scheduler paces.
    #[must_use]
    pub fn world(&self) -> WorldId {
        self.world
    }

    /// Wave currently in progress (0 before the first wave).
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Whether enemies of this behavior hold the wave open. Orbiting
    /// casters and the boss never do.
    fn blocks_clearance(enemy: &Enemy) -> bool {
        matches!(
            enemy.behavior,
            Behavior::Walker | Behavior::LaneFaller | Behavior::Archer { .. }
        )
    }

    /// Advance the phase machine. `enemies` is the post-sweep live
    /// list for this tick.
    pub fn update(
        &mut self,
        dt: Fixed,
        enemies: &[Enemy],
        player_level: u32,
        arena: &Arena,
        rng: &mut GameRng,
    ) -> SchedulerTick {
        let mut out = SchedulerTick::default();
        match self.phase {
            WavePhase::Idle => self.begin_next_wave(player_level, arena, rng, &mut out),
            WavePhase::WaveInProgress => {
                let holding = enemies
                    .iter()
                    .any(|enemy| enemy.alive() && Self::blocks_clearance(enemy));
                if !holding {
                    out.cleared = Some(self.wave);
                    self.phase = WavePhase::Breather(BREATHER_TIME);
                }
            }
            WavePhase::Breather(remaining) => {
                let remaining = remaining - dt;
                if remaining > Fixed::ZERO {
                    self.phase = WavePhase::Breather(remaining);
                } else if self.wave >= WAVES_PER_WORLD {
                    self.dispatch_boss(arena, rng, &mut out);
                } else {
                    self.begin_next_wave(player_level, arena, rng, &mut out);
                }
            }
            WavePhase::BossFight => {
                let boss_up = enemies
                    .iter()
                    .any(|enemy| enemy.alive() && enemy.kind.is_boss());
                if self.boss_dispatched && !boss_up {
                    self.phase = WavePhase::WorldCleared;
                }
            }
            WavePhase::WorldCleared => {}
        }
        out
    }

    /// Spawn orders for one boss reinforcement call: a walker and two
    /// of the world's caster kind. Reinforcements never hold a wave
    /// open because no wave is in progress during the boss fight.
    pub fn reinforcement_orders(&self, arena: &Arena, rng: &mut GameRng) -> Vec<SpawnOrder> {
        let roster = self.world.roster();
        vec![
            place_enemy(roster.walker, arena, rng),
            place_enemy(roster.caster, arena, rng),
            place_enemy(roster.caster, arena, rng),
        ]
    }

    fn begin_next_wave(
        &mut self,
        player_level: u32,
        arena: &Arena,
        rng: &mut GameRng,
        out: &mut SchedulerTick,
    ) {
        self.wave += 1;
        let roster = self.world.roster();
        for _ in 0..walker_count(self.wave) {
            out.spawns.push(place_enemy(roster.walker, arena, rng));
        }
        for _ in 0..ranged_count(self.wave) {
            out.spawns.push(place_enemy(roster.ranged, arena, rng));
        }
        for _ in 0..caster_count(self.wave, player_level) {
            out.spawns.push(place_enemy(roster.caster, arena, rng));
        }
        out.started = Some(self.wave);
        self.phase = WavePhase::WaveInProgress;
    }

    fn dispatch_boss(&mut self, arena: &Arena, rng: &mut GameRng, out: &mut SchedulerTick) {
        out.spawns.push(place_enemy(EnemyKind::Bohban, arena, rng));
        out.boss_entered = true;
        self.boss_dispatched = true;
        self.phase = WavePhase::BossFight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(value: i32) -> Fixed {
        Fixed::from_num(value)
    }

    fn fixed_f(value: f64) -> Fixed {
        Fixed::from_num(value)
    }

    fn enemy_from(order: SpawnOrder, id: u64) -> Enemy {
        Enemy::new(id, order.kind, order.position, order.behavior, 100)
    }

    #[test]
    fn test_composition_curves() {
        assert_eq!(walker_count(1), 1);
        assert_eq!(walker_count(3), 2);
        assert_eq!(walker_count(10), 4);
        assert_eq!(walker_count(49), 12, "walker cap");

        assert_eq!(ranged_count(1), 0);
        assert_eq!(ranged_count(6), 0);
        assert_eq!(ranged_count(7), 1);
        assert_eq!(ranged_count(10), 2);
        assert_eq!(ranged_count(49), 10, "ranged cap");

        assert_eq!(caster_count(19, 99), 0, "gated before wave 20");
        assert_eq!(caster_count(30, 19), 0, "gated below level 20");
        assert_eq!(caster_count(20, 20), 1);
        assert_eq!(caster_count(28, 20), 2);
        assert_eq!(caster_count(36, 20), 3);
        assert_eq!(caster_count(49, 99), 3, "caster cap");
    }

    #[test]
    fn test_world_tables() {
        assert_eq!(WorldId::ALL.len(), 6);
        assert_eq!(WorldId::WitheringTree.enemy_hp_scale_percent(), 100);
        assert_eq!(WorldId::DrownedSanctum.enemy_hp_scale_percent(), 125);
        assert_eq!(WorldId::TowerOfBabel.enemy_hp_scale_percent(), 200);

        let roster = WorldId::BlackrockValley.roster();
        assert_eq!(roster.walker, EnemyKind::Spearman);
        assert_eq!(roster.ranged, EnemyKind::AxeThrower);
        assert_eq!(roster.caster, EnemyKind::Shaman);

        for world in WorldId::ALL {
            assert!(world.passive_coins());
            assert!(!world.name().is_empty());
        }
    }

    #[test]
    fn test_ground_placement_bounds() {
        let arena = Arena::default();
        let mut rng = GameRng::new(7);

        for _ in 0..50 {
            let order = place_enemy(EnemyKind::Ent, &arena, &mut rng);
            assert_eq!(order.behavior, Behavior::Walker);
            assert!(order.position.x >= fixed(40));
            assert!(order.position.x <= arena.width - fixed(40));
            assert_eq!(order.position.y, arena.height + fixed(60));
        }

        let order = place_enemy(EnemyKind::Spearman, &arena, &mut rng);
        assert_eq!(order.behavior, Behavior::LaneFaller);
    }

    #[test]
    fn test_archer_placement_matches_side() {
        let arena = Arena::default();
        let mut rng = GameRng::new(11);
        let mut seen_left = false;
        let mut seen_right = false;

        for _ in 0..50 {
            let order = place_enemy(EnemyKind::Elf, &arena, &mut rng);
            let Behavior::Archer { hold_x, .. } = order.behavior else {
                panic!("elf must hover");
            };
            if order.position.x < Fixed::ZERO {
                seen_left = true;
                assert!(hold_x >= arena.width * 11 / 50);
                assert!(hold_x < arena.width * 7 / 20);
            } else {
                seen_right = true;
                assert!(order.position.x > arena.width);
                assert!(hold_x >= arena.width * 13 / 20);
                assert!(hold_x < arena.width * 39 / 50);
            }
            assert!(order.position.y >= arena.height * 9 / 20);
            assert!(order.position.y < arena.height * 4 / 5);
        }
        assert!(seen_left && seen_right, "both sides should appear");
    }

    #[test]
    fn test_orbiter_placement_centers_in_band() {
        let arena = Arena::default();
        let mut rng = GameRng::new(3);

        for _ in 0..50 {
            let order = place_enemy(EnemyKind::Shaman, &arena, &mut rng);
            let Behavior::Orbiter { center, .. } = order.behavior else {
                panic!("shaman must orbit");
            };
            assert!(center.x >= arena.width / 4);
            assert!(center.x < arena.width * 3 / 4);
            assert!(center.y >= arena.height * 11 / 20);
            assert!(center.y < arena.height * 17 / 20);
            // Spawn point sits on the hover ellipse
            assert!((order.position.x - center.x).abs() <= fixed(HOVER_RADIUS_X as i32));
            assert!((order.position.y - center.y).abs() <= fixed(HOVER_RADIUS_Y as i32));
        }
    }

    #[test]
    fn test_boss_placement() {
        let arena = Arena::default();
        let mut rng = GameRng::new(1);

        let order = place_enemy(EnemyKind::Bohban, &arena, &mut rng);
        assert_eq!(order.position.x, arena.width / 2);
        assert_eq!(order.position.y, arena.height + fixed(80));
        assert!(matches!(order.behavior, Behavior::Boss { .. }));
    }

    #[test]
    fn test_first_update_begins_wave_one() {
        let arena = Arena::default();
        let mut rng = GameRng::new(42);
        let mut scheduler = WaveScheduler::new(WorldId::WitheringTree);
        assert_eq!(scheduler.wave(), 0);

        let tick = scheduler.update(fixed_f(0.1), &[], 1, &arena, &mut rng);
        assert_eq!(tick.started, Some(1));
        assert_eq!(tick.spawns.len(), 1, "wave 1 is a single walker");
        assert_eq!(tick.spawns[0].kind, EnemyKind::Ent);
        assert_eq!(scheduler.phase(), WavePhase::WaveInProgress);
    }

    #[test]
    fn test_wave_blocks_until_tracked_enemies_fall() {
        let arena = Arena::default();
        let mut rng = GameRng::new(42);
        let mut scheduler = WaveScheduler::starting_at(WorldId::WitheringTree, 10);

        let tick = scheduler.update(fixed_f(0.1), &[], 1, &arena, &mut rng);
        assert_eq!(tick.started, Some(10));
        // Wave 10: 4 walkers + 2 ranged (casters still gated)
        assert_eq!(tick.spawns.len(), 6);

        let enemies: Vec<Enemy> = tick
            .spawns
            .iter()
            .enumerate()
            .map(|(i, order)| enemy_from(*order, i as u64 + 1))
            .collect();

        // Five of six down: still in progress
        let mut survivors = enemies.clone();
        survivors.truncate(1);
        let tick = scheduler.update(fixed_f(0.1), &survivors, 1, &arena, &mut rng);
        assert!(tick.cleared.is_none());
        assert_eq!(scheduler.phase(), WavePhase::WaveInProgress);

        // All six down: cleared, breather begins
        let tick = scheduler.update(fixed_f(0.1), &[], 1, &arena, &mut rng);
        assert_eq!(tick.cleared, Some(10));
        assert!(matches!(scheduler.phase(), WavePhase::Breather(_)));
    }

    #[test]
    fn test_orbiters_never_hold_a_wave_open() {
        let arena = Arena::default();
        let mut rng = GameRng::new(9);
        let mut scheduler = WaveScheduler::starting_at(WorldId::WitheringTree, 20);

        scheduler.update(fixed_f(0.1), &[], 20, &arena, &mut rng);
        let caster = enemy_from(place_enemy(EnemyKind::Druid, &arena, &mut rng), 99);

        let tick = scheduler.update(fixed_f(0.1), &[caster], 20, &arena, &mut rng);
        assert_eq!(tick.cleared, Some(20), "a lone caster cannot stall the run");
    }

    #[test]
    fn test_breather_is_two_seconds() {
        let arena = Arena::default();
        let mut rng = GameRng::new(42);
        let mut scheduler = WaveScheduler::new(WorldId::WitheringTree);

        scheduler.update(fixed_f(0.1), &[], 1, &arena, &mut rng);
        scheduler.update(fixed_f(0.1), &[], 1, &arena, &mut rng);

        // 19 ticks of 0.1 s leave the breather short of 2.0 s
        for _ in 0..19 {
            let tick = scheduler.update(fixed_f(0.1), &[], 1, &arena, &mut rng);
            assert!(tick.started.is_none());
        }
        let tick = scheduler.update(fixed_f(0.1), &[], 1, &arena, &mut rng);
        assert_eq!(tick.started, Some(2));
    }

    #[test]
    fn test_boss_phase_and_world_clear() {
        let arena = Arena::default();
        let mut rng = GameRng::new(42);
        let mut scheduler = WaveScheduler::starting_at(WorldId::TowerOfBabel, 49);

        scheduler.update(fixed_f(0.1), &[], 99, &arena, &mut rng);
        // Clear wave 49 and burn the breather
        scheduler.update(fixed_f(0.1), &[], 99, &arena, &mut rng);
        let mut boss_tick = None;
        for _ in 0..30 {
            let tick = scheduler.update(fixed_f(0.1), &[], 99, &arena, &mut rng);
            if tick.boss_entered {
                boss_tick = Some(tick);
                break;
            }
        }
        let boss_tick = boss_tick.unwrap_or_default();
        assert!(boss_tick.boss_entered);
        assert_eq!(boss_tick.spawns.len(), 1);
        assert_eq!(boss_tick.spawns[0].kind, EnemyKind::Bohban);
        assert_eq!(scheduler.phase(), WavePhase::BossFight);

        // Boss alive: still fighting
        let boss = enemy_from(boss_tick.spawns[0], 500);
        scheduler.update(fixed_f(0.1), &[boss], 99, &arena, &mut rng);
        assert_eq!(scheduler.phase(), WavePhase::BossFight);

        // Boss gone: terminal victory
        scheduler.update(fixed_f(0.1), &[], 99, &arena, &mut rng);
        assert_eq!(scheduler.phase(), WavePhase::WorldCleared);

        // Terminal phase stays put
        let tick = scheduler.update(fixed_f(0.1), &[], 99, &arena, &mut rng);
        assert!(tick.spawns.is_empty());
        assert_eq!(scheduler.phase(), WavePhase::WorldCleared);
    }

    #[test]
    fn test_reinforcement_composition() {
        let arena = Arena::default();
        let mut rng = GameRng::new(5);
        let scheduler = WaveScheduler::new(WorldId::BlackrockValley);

        let orders = scheduler.reinforcement_orders(&arena, &mut rng);
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].kind, EnemyKind::Spearman);
        assert_eq!(orders[1].kind, EnemyKind::Shaman);
        assert_eq!(orders[2].kind, EnemyKind::Shaman);
    }

    #[test]
    fn test_scheduler_serde_roundtrip() {
        let arena = Arena::default();
        let mut rng = GameRng::new(42);
        let mut scheduler = WaveScheduler::new(WorldId::HollowGarden);
        scheduler.update(fixed_f(0.1), &[], 1, &arena, &mut rng);
        scheduler.update(fixed_f(0.1), &[], 1, &arena, &mut rng);

        let bytes = bincode::serialize(&scheduler).unwrap();
        let restored: WaveScheduler = bincode::deserialize(&bytes).unwrap();
        assert_eq!(scheduler, restored);
    }
}

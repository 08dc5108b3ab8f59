//! Enemy kinds, their behavior policies and the boss state machine.
//!
//! Behaviors never mutate anything outside their own enemy: attacks
//! and summons come out as [`BehaviorEffect`] values for the caller to
//! apply after the whole enemy pass, so iteration order stays the only
//! ordering that matters.

use crate::combat::{Category, EntityId, Health};
use crate::math::{
    fixed_cos, fixed_serde, fixed_sin, option_fixed_serde, Arena, Fixed, Vec2Fixed, FIXED_TWO_PI,
};
use crate::projectile::ProjectileKind;
use crate::rng::GameRng;
use serde::{Deserialize, Serialize};

/// Damage a detonating melee body deals on player contact.
pub const MELEE_CONTACT_DAMAGE: u32 = 25;

/// Hover angular speed in radians per second, as raw fixed-point bits
/// (`from_num` is not const). Equals 1.6 rad/s.
pub const HOVER_ANGULAR_SPEED: Fixed = Fixed::from_bits(6_871_947_674);

/// Hover ellipse horizontal semi-axis in world units.
pub const HOVER_RADIUS_X: u32 = 26;
/// Hover ellipse vertical semi-axis in world units (flattened to half).
pub const HOVER_RADIUS_Y: u32 = 13;

/// Smallest shaman barrage.
pub const BARRAGE_MIN_ROCKS: u32 = 6;
/// Largest shaman barrage.
pub const BARRAGE_MAX_ROCKS: u32 = 10;
/// Horizontal jitter around the player's x for barrage rocks.
pub const BARRAGE_JITTER: u32 = 80;
/// Per-rock stagger step in seconds, as raw bits. Equals 0.06 s.
pub const BARRAGE_STAGGER: Fixed = Fixed::from_bits(257_698_038);
/// How far above the arena top barrage rocks materialize.
pub const ROCK_DROP_MARGIN: u32 = 40;

/// Boss entrance length in seconds, as raw bits. Equals 2.2 s.
pub const BOSS_ENTRANCE_TIME: Fixed = Fixed::from_bits(9_448_928_051);
/// Seconds between boss roars.
pub const BOSS_ROAR_INTERVAL: Fixed = Fixed::from_bits(10 << 32);
/// Delay between a roar and its reinforcements arriving.
pub const BOSS_REINFORCEMENT_DELAY: Fixed = Fixed::from_bits(2 << 32);
/// How far above the arena top the boss spawns.
pub const BOSS_SPAWN_OFFSET: u32 = 80;

/// Altitude the boss settles at after its entrance (0.65 of arena height).
#[must_use]
pub fn boss_hover_y(arena: &Arena) -> Fixed {
    arena.height * Fixed::from_num(13) / Fixed::from_num(20)
}

/// The closed set of enemy kinds across all six worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Woodland walker. Marches at the player and detonates on contact.
    Ent,
    /// Woodland archer. Holds a flank and fires arrows.
    Elf,
    /// Blackrock archer. Holds a flank and throws boomerang axes.
    AxeThrower,
    /// Woodland caster. Hovers and fires aimed orbs.
    Druid,
    /// Blackrock caster. Hovers and rains rock barrages.
    Shaman,
    /// Blackrock lane faller. Drops straight down, contact damage only.
    Spearman,
    /// The boss.
    Bohban,
}

impl EnemyKind {
    /// Base maximum health before per-world scaling.
    #[must_use]
    pub const fn max_health(self) -> u32 {
        match self {
            Self::Ent => 100,
            Self::Elf => 50,
            Self::AxeThrower => 60,
            Self::Druid => 60,
            Self::Shaman => 80,
            Self::Spearman => 40,
            Self::Bohban => 2000,
        }
    }

    /// Movement speed in world units per second. Hovering kinds and
    /// the boss move through their own behavior, not this value.
    #[must_use]
    pub fn speed(self) -> Fixed {
        let units: u32 = match self {
            Self::Ent => 90,
            Self::Elf | Self::AxeThrower => 120,
            Self::Spearman => 140,
            Self::Druid | Self::Shaman | Self::Bohban => 0,
        };
        Fixed::from_num(units)
    }

    /// Seconds between attacks, `None` for contact-only kinds.
    #[must_use]
    pub fn attack_interval(self) -> Option<Fixed> {
        match self {
            Self::Elf => Some(Fixed::from_num(4)),
            Self::AxeThrower => Some(Fixed::from_num(3)),
            Self::Druid | Self::Shaman => Some(Fixed::from_num(5)),
            Self::Bohban => Some(Fixed::from_num(5) / Fixed::from_num(2)),
            Self::Ent | Self::Spearman => None,
        }
    }

    /// XP granted to the player on a kill.
    #[must_use]
    pub const fn xp_value(self) -> u32 {
        match self {
            Self::Ent => 25,
            Self::Elf | Self::AxeThrower => 20,
            Self::Druid => 40,
            Self::Shaman => 30,
            Self::Spearman => 15,
            Self::Bohban => 100,
        }
    }

    /// Body collision radius in world units.
    #[must_use]
    pub fn radius(self) -> Fixed {
        let units: u32 = match self {
            Self::Ent => 30,
            Self::Elf | Self::AxeThrower => 28,
            Self::Druid | Self::Shaman => 26,
            Self::Spearman => 24,
            Self::Bohban => 56,
        };
        Fixed::from_num(units)
    }

    /// Collision category bits for this kind's body.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Ent => Category::ENEMY_MELEE,
            Self::Elf | Self::AxeThrower => Category::ENEMY_RANGED,
            Self::Druid | Self::Shaman => Category::ENEMY_ORBITER,
            Self::Spearman => Category::ENEMY_MELEE.union(Category::ENEMY_LANE_FALLER),
            Self::Bohban => Category::BOSS_BODY,
        }
    }

    /// Whether this kind is the boss.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, Self::Bohban)
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ent => "Ent",
            Self::Elf => "Elf",
            Self::AxeThrower => "Axe Thrower",
            Self::Druid => "Druid",
            Self::Shaman => "Shaman",
            Self::Spearman => "Spearman",
            Self::Bohban => "Bohban",
        }
    }
}

/// Coarse life-cycle state of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Just spawned, behavior not yet engaged.
    Spawning,
    /// Moving toward its station or target.
    Approaching,
    /// Holding position (or hovering) between attacks.
    Idle,
    /// Mid-attack this tick, recovers to idle next tick.
    Attacking,
    /// Lethal damage taken. Terminal, swept at end of tick.
    Dying,
}

/// Per-kind behavior payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    /// March straight at the player.
    Walker,
    /// Walk to a flank station, then fire on an interval.
    Archer {
        /// Station to hold.
        #[serde(with = "fixed_serde")]
        hold_x: Fixed,
        /// Accumulated time toward the next shot.
        #[serde(with = "fixed_serde")]
        fire_timer: Fixed,
    },
    /// Hover an ellipse around a fixed center, casting on an interval.
    Orbiter {
        /// Ellipse center.
        center: Vec2Fixed,
        /// Current hover angle in radians.
        #[serde(with = "fixed_serde")]
        angle: Fixed,
        /// Accumulated time toward the next cast.
        #[serde(with = "fixed_serde")]
        cast_timer: Fixed,
    },
    /// Fall straight down the spawn lane.
    LaneFaller,
    /// The boss: timed entrance, then attack and roar cycles.
    Boss {
        /// Entrance time left; the boss descends while this burns.
        #[serde(with = "fixed_serde")]
        entrance_remaining: Fixed,
        /// Accumulated time toward the next orb.
        #[serde(with = "fixed_serde")]
        attack_timer: Fixed,
        /// Accumulated time toward the next roar.
        #[serde(with = "fixed_serde")]
        roar_timer: Fixed,
        /// Countdown from roar to reinforcements, when pending.
        #[serde(with = "option_fixed_serde")]
        reinforcements_delay: Option<Fixed>,
    },
}

/// Read-only context handed to every behavior tick.
#[derive(Debug, Clone, Copy)]
pub struct TickCtx {
    /// The play area.
    pub arena: Arena,
    /// Player position this tick.
    pub player_position: Vec2Fixed,
}

/// Side effects a behavior wants applied after the enemy pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorEffect {
    /// Launch a projectile.
    Fire {
        /// What to launch.
        kind: ProjectileKind,
        /// Launch position.
        from: Vec2Fixed,
        /// Aim position, sampled at fire time (no homing).
        toward: Vec2Fixed,
    },
    /// Queue one staggered barrage rock above the arena.
    DropRock {
        /// Drop lane x.
        x: Fixed,
        /// Inert time before the rock goes live.
        delay: Fixed,
    },
    /// The boss roared; reinforcements follow after a fixed delay.
    Roared,
    /// Summon the boss's reinforcements now.
    Reinforcements,
}

/// A live enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enemy {
    /// Unique id, shared with the projectile id space.
    pub id: EntityId,
    /// Which kind this is.
    pub kind: EnemyKind,
    /// Current position.
    pub position: Vec2Fixed,
    /// Health pool, already world-scaled.
    pub hp: Health,
    /// Life-cycle state.
    pub state: EnemyState,
    /// Movement scale, held at 0.5 while a blizzard runs.
    #[serde(with = "fixed_serde")]
    pub speed_multiplier: Fixed,
    /// Behavior payload.
    pub behavior: Behavior,
    /// Deferred-removal flag, honored by the end-of-tick sweep.
    pub removed: bool,
}

impl Enemy {
    /// Create an enemy with world-scaled health.
    #[must_use]
    pub fn new(
        id: EntityId,
        kind: EnemyKind,
        position: Vec2Fixed,
        behavior: Behavior,
        hp_scale_percent: u32,
    ) -> Self {
        let scaled = (kind.max_health() * hp_scale_percent / 100).max(1);
        Self {
            id,
            kind,
            position,
            hp: Health::new(scaled),
            state: EnemyState::Spawning,
            speed_multiplier: Fixed::from_num(1),
            behavior,
            removed: false,
        }
    }

    /// Whether this enemy still acts and collides.
    #[must_use]
    pub fn alive(&self) -> bool {
        !self.removed && !matches!(self.state, EnemyState::Dying)
    }

    /// Apply damage; returns whether this call was lethal.
    ///
    /// Idempotent past death: damage to a dying or removed enemy is a
    /// no-op returning `false`, so kill credit fires exactly once.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.alive() {
            return false;
        }
        self.hp.apply_damage(amount);
        if self.hp.is_dead() {
            self.state = EnemyState::Dying;
            self.removed = true;
            true
        } else {
            false
        }
    }

    /// Run one behavior tick, pushing side effects for the caller.
    pub fn tick(
        &mut self,
        dt: Fixed,
        ctx: &TickCtx,
        rng: &mut GameRng,
        effects: &mut Vec<BehaviorEffect>,
    ) {
        if !self.alive() {
            return;
        }

        // Attack pose recovery
        if matches!(self.state, EnemyState::Attacking) {
            self.state = EnemyState::Idle;
        }

        match &mut self.behavior {
            Behavior::Walker => {
                if matches!(self.state, EnemyState::Spawning) {
                    self.state = EnemyState::Approaching;
                }
                let direction = (ctx.player_position - self.position).normalize();
                let step = self.kind.speed() * self.speed_multiplier * dt;
                self.position = self.position + direction * step;
            }

            Behavior::LaneFaller => {
                if matches!(self.state, EnemyState::Spawning) {
                    self.state = EnemyState::Approaching;
                }
                self.position.y -= self.kind.speed() * self.speed_multiplier * dt;
            }

            Behavior::Archer { hold_x, fire_timer } => {
                if matches!(self.state, EnemyState::Spawning) {
                    self.state = EnemyState::Approaching;
                }
                if matches!(self.state, EnemyState::Approaching) {
                    // The arrival tick is spent arriving; held time
                    // starts counting next tick.
                    let dx = *hold_x - self.position.x;
                    let step = self.kind.speed() * self.speed_multiplier * dt;
                    if dx.abs() <= step {
                        self.position.x = *hold_x;
                        self.state = EnemyState::Idle;
                    } else if dx > Fixed::ZERO {
                        self.position.x += step;
                    } else {
                        self.position.x -= step;
                    }
                } else if matches!(self.state, EnemyState::Idle) {
                    *fire_timer += dt;
                    if let Some(interval) = self.kind.attack_interval() {
                        if *fire_timer >= interval {
                            *fire_timer -= interval;
                            let kind = match self.kind {
                                EnemyKind::AxeThrower => ProjectileKind::ThrownAxe,
                                _ => ProjectileKind::ElfArrow,
                            };
                            effects.push(BehaviorEffect::Fire {
                                kind,
                                from: self.position,
                                toward: ctx.player_position,
                            });
                            self.state = EnemyState::Attacking;
                        }
                    }
                }
            }

            Behavior::Orbiter {
                center,
                angle,
                cast_timer,
            } => {
                if matches!(self.state, EnemyState::Spawning) {
                    self.state = EnemyState::Idle;
                }

                *angle += HOVER_ANGULAR_SPEED * self.speed_multiplier * dt;
                if *angle >= FIXED_TWO_PI {
                    *angle -= FIXED_TWO_PI;
                }
                self.position = Vec2Fixed::new(
                    center.x + fixed_cos(*angle) * Fixed::from_num(HOVER_RADIUS_X),
                    center.y + fixed_sin(*angle) * Fixed::from_num(HOVER_RADIUS_Y),
                );

                *cast_timer += dt;
                if let Some(interval) = self.kind.attack_interval() {
                    if *cast_timer >= interval {
                        *cast_timer -= interval;
                        match self.kind {
                            EnemyKind::Shaman => {
                                let count = rng.next_range(BARRAGE_MIN_ROCKS, BARRAGE_MAX_ROCKS);
                                let jitter = Fixed::from_num(BARRAGE_JITTER);
                                for i in 0..count {
                                    let x = ctx.player_position.x
                                        + rng.next_fixed_range(-jitter, jitter);
                                    effects.push(BehaviorEffect::DropRock {
                                        x,
                                        delay: Fixed::from_num(i) * BARRAGE_STAGGER,
                                    });
                                }
                            }
                            _ => {
                                effects.push(BehaviorEffect::Fire {
                                    kind: ProjectileKind::DruidOrb,
                                    from: self.position,
                                    toward: ctx.player_position,
                                });
                            }
                        }
                        self.state = EnemyState::Attacking;
                    }
                }
            }

            Behavior::Boss {
                entrance_remaining,
                attack_timer,
                roar_timer,
                reinforcements_delay,
            } => {
                if matches!(self.state, EnemyState::Spawning) {
                    *entrance_remaining = (*entrance_remaining - dt).max(Fixed::ZERO);
                    let start_y = ctx.arena.height + Fixed::from_num(BOSS_SPAWN_OFFSET);
                    let target_y = boss_hover_y(&ctx.arena);
                    let frac = *entrance_remaining / BOSS_ENTRANCE_TIME;
                    self.position.y = target_y + (start_y - target_y) * frac;
                    if *entrance_remaining == Fixed::ZERO {
                        self.state = EnemyState::Idle;
                    }
                    return;
                }

                *attack_timer += dt;
                if let Some(interval) = self.kind.attack_interval() {
                    if *attack_timer >= interval {
                        *attack_timer -= interval;
                        effects.push(BehaviorEffect::Fire {
                            kind: ProjectileKind::BossOrb,
                            from: self.position,
                            toward: ctx.player_position,
                        });
                        self.state = EnemyState::Attacking;
                    }
                }

                // Pending reinforcements count down before the roar
                // check so a fresh roar is not shortchanged by its
                // own tick.
                if let Some(delay) = reinforcements_delay {
                    if *delay <= dt {
                        *reinforcements_delay = None;
                        effects.push(BehaviorEffect::Reinforcements);
                    } else {
                        *delay -= dt;
                    }
                }

                *roar_timer += dt;
                if *roar_timer >= BOSS_ROAR_INTERVAL {
                    *roar_timer -= BOSS_ROAR_INTERVAL;
                    *reinforcements_delay = Some(BOSS_REINFORCEMENT_DELAY);
                    effects.push(BehaviorEffect::Roared);
                }
            }
        }
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

    fn ctx_at(player_x: i32, player_y: i32) -> TickCtx {
        TickCtx {
            arena: Arena::default(),
            player_position: Vec2Fixed::new(fixed(player_x), fixed(player_y)),
        }
    }

    fn walker(id: EntityId, x: i32, y: i32) -> Enemy {
        Enemy::new(
            id,
            EnemyKind::Ent,
            Vec2Fixed::new(fixed(x), fixed(y)),
            Behavior::Walker,
            100,
        )
    }

    #[test]
    fn test_world_scaling_applies_to_health() {
        let base = walker(1, 0, 0);
        assert_eq!(base.hp.max, 100);

        let scaled = Enemy::new(
            2,
            EnemyKind::Ent,
            Vec2Fixed::ZERO,
            Behavior::Walker,
            150,
        );
        assert_eq!(scaled.hp.max, 150);
    }

    #[test]
    fn test_take_damage_is_idempotent_past_death() {
        let mut enemy = walker(1, 0, 0);

        assert!(!enemy.take_damage(60));
        assert_eq!(enemy.hp.current, 40);

        assert!(enemy.take_damage(60), "second hit must be lethal");
        assert_eq!(enemy.hp.current, 0);
        assert!(matches!(enemy.state, EnemyState::Dying));
        assert!(enemy.removed);

        // Further damage is a no-op with no second death
        assert!(!enemy.take_damage(999));
        assert_eq!(enemy.hp.current, 0);
    }

    #[test]
    fn test_dying_enemy_does_not_act() {
        let mut enemy = walker(1, 100, 500);
        enemy.take_damage(1000);

        let before = enemy.position;
        let mut rng = GameRng::new(0);
        let mut effects = Vec::new();
        enemy.tick(fixed_f(0.1), &ctx_at(100, 0), &mut rng, &mut effects);

        assert_eq!(enemy.position, before);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_walker_closes_on_player() {
        let mut enemy = walker(1, 200, 700);
        let ctx = ctx_at(200, 100);
        let mut rng = GameRng::new(0);
        let mut effects = Vec::new();

        let start = enemy.position.distance_squared(ctx.player_position);
        enemy.tick(Fixed::from_num(1), &ctx, &mut rng, &mut effects);
        let after = enemy.position.distance_squared(ctx.player_position);

        assert!(after < start);
        // 90 u/s straight down the gap
        let moved = fixed(700) - enemy.position.y;
        assert!((moved - fixed(90)).abs() < fixed_f(0.01));
        assert!(matches!(enemy.state, EnemyState::Approaching));
    }

    #[test]
    fn test_blizzard_multiplier_halves_walker_speed() {
        let mut enemy = walker(1, 200, 700);
        enemy.speed_multiplier = fixed_f(0.5);
        let mut rng = GameRng::new(0);
        let mut effects = Vec::new();

        enemy.tick(Fixed::from_num(1), &ctx_at(200, 100), &mut rng, &mut effects);
        let moved = fixed(700) - enemy.position.y;
        assert!((moved - fixed(45)).abs() < fixed_f(0.01));
    }

    #[test]
    fn test_lane_faller_drops_straight_down() {
        let mut enemy = Enemy::new(
            1,
            EnemyKind::Spearman,
            Vec2Fixed::new(fixed(77), fixed(900)),
            Behavior::LaneFaller,
            100,
        );
        let mut rng = GameRng::new(0);
        let mut effects = Vec::new();

        enemy.tick(Fixed::from_num(1), &ctx_at(300, 100), &mut rng, &mut effects);
        assert_eq!(enemy.position.x, fixed(77), "lane must not drift");
        assert!((enemy.position.y - fixed(760)).abs() < fixed_f(0.01));
    }

    #[test]
    fn test_archer_walks_to_station_then_fires() {
        let mut enemy = Enemy::new(
            1,
            EnemyKind::Elf,
            Vec2Fixed::new(fixed(-60), fixed(500)),
            Behavior::Archer {
                hold_x: fixed(120),
                fire_timer: Fixed::ZERO,
            },
            100,
        );
        let ctx = ctx_at(200, 100);
        let mut rng = GameRng::new(0);
        let mut effects = Vec::new();

        // 180 units at 120 u/s: arrives during the second tick
        enemy.tick(Fixed::from_num(1), &ctx, &mut rng, &mut effects);
        assert!(matches!(enemy.state, EnemyState::Approaching));
        enemy.tick(Fixed::from_num(1), &ctx, &mut rng, &mut effects);
        assert_eq!(enemy.position.x, fixed(120));
        assert!(matches!(enemy.state, EnemyState::Idle));
        assert!(effects.is_empty(), "no shots while approaching");

        // Elf interval is 4 s of held time
        for _ in 0..3 {
            enemy.tick(Fixed::from_num(1), &ctx, &mut rng, &mut effects);
        }
        assert!(effects.is_empty());
        enemy.tick(Fixed::from_num(1), &ctx, &mut rng, &mut effects);

        assert_eq!(effects.len(), 1);
        match effects[0] {
            BehaviorEffect::Fire { kind, toward, .. } => {
                assert_eq!(kind, ProjectileKind::ElfArrow);
                assert_eq!(toward, ctx.player_position, "aim sampled at fire time");
            }
            _ => panic!("expected a fire effect"),
        }
        assert!(matches!(enemy.state, EnemyState::Attacking));
    }

    #[test]
    fn test_axe_thrower_fires_boomerangs_on_short_interval() {
        let mut enemy = Enemy::new(
            1,
            EnemyKind::AxeThrower,
            Vec2Fixed::new(fixed(120), fixed(500)),
            Behavior::Archer {
                hold_x: fixed(120),
                fire_timer: Fixed::ZERO,
            },
            100,
        );
        let ctx = ctx_at(200, 100);
        let mut rng = GameRng::new(0);
        let mut effects = Vec::new();

        // Already at station: first tick goes idle, then 3 s to fire
        for _ in 0..4 {
            enemy.tick(Fixed::from_num(1), &ctx, &mut rng, &mut effects);
        }
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            effects[0],
            BehaviorEffect::Fire {
                kind: ProjectileKind::ThrownAxe,
                ..
            }
        ));
    }

    #[test]
    fn test_orbiter_hovers_near_center() {
        let center = Vec2Fixed::new(fixed(200), fixed(600));
        let mut enemy = Enemy::new(
            1,
            EnemyKind::Druid,
            center,
            Behavior::Orbiter {
                center,
                angle: Fixed::ZERO,
                cast_timer: Fixed::ZERO,
            },
            100,
        );
        let ctx = ctx_at(200, 100);
        let mut rng = GameRng::new(0);
        let mut effects = Vec::new();

        for _ in 0..50 {
            enemy.tick(fixed_f(0.1), &ctx, &mut rng, &mut effects);
            let dx = (enemy.position.x - center.x).abs();
            let dy = (enemy.position.y - center.y).abs();
            assert!(dx <= fixed(HOVER_RADIUS_X as i32) + fixed(1));
            assert!(dy <= fixed(HOVER_RADIUS_Y as i32) + fixed(1));
        }
        // 5 s elapsed: exactly one orb cast
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            effects[0],
            BehaviorEffect::Fire {
                kind: ProjectileKind::DruidOrb,
                ..
            }
        ));
    }

    #[test]
    fn test_shaman_barrage_is_staggered_and_jittered() {
        let center = Vec2Fixed::new(fixed(200), fixed(600));
        let mut enemy = Enemy::new(
            1,
            EnemyKind::Shaman,
            center,
            Behavior::Orbiter {
                center,
                angle: Fixed::ZERO,
                cast_timer: Fixed::ZERO,
            },
            100,
        );
        let ctx = ctx_at(180, 120);
        let mut rng = GameRng::new(42);
        let mut effects = Vec::new();

        for _ in 0..50 {
            enemy.tick(fixed_f(0.1), &ctx, &mut rng, &mut effects);
        }

        let rocks: Vec<_> = effects
            .iter()
            .filter_map(|e| match e {
                BehaviorEffect::DropRock { x, delay } => Some((*x, *delay)),
                _ => None,
            })
            .collect();

        assert!(
            rocks.len() >= BARRAGE_MIN_ROCKS as usize
                && rocks.len() <= BARRAGE_MAX_ROCKS as usize,
            "barrage size {} out of range",
            rocks.len()
        );

        let jitter = fixed(BARRAGE_JITTER as i32);
        for (i, (x, delay)) in rocks.iter().enumerate() {
            assert!((*x - ctx.player_position.x).abs() <= jitter);
            assert_eq!(*delay, Fixed::from_num(i as u32) * BARRAGE_STAGGER);
        }
    }

    fn boss_at_station(ctx: &TickCtx) -> Enemy {
        let mut boss = Enemy::new(
            99,
            EnemyKind::Bohban,
            Vec2Fixed::new(
                ctx.arena.width / fixed(2),
                ctx.arena.height + fixed(BOSS_SPAWN_OFFSET as i32),
            ),
            Behavior::Boss {
                entrance_remaining: BOSS_ENTRANCE_TIME,
                attack_timer: Fixed::ZERO,
                roar_timer: Fixed::ZERO,
                reinforcements_delay: None,
            },
            100,
        );
        let mut rng = GameRng::new(0);
        let mut effects = Vec::new();
        // Burn the whole entrance; the station tick itself is the 22nd
        for _ in 0..22 {
            boss.tick(fixed_f(0.1), ctx, &mut rng, &mut effects);
        }
        assert!(effects.is_empty(), "no attacks during the entrance");
        boss
    }

    #[test]
    fn test_boss_entrance_descends_to_station() {
        let ctx = ctx_at(195, 100);
        let boss = boss_at_station(&ctx);

        assert!(matches!(boss.state, EnemyState::Idle));
        let error = (boss.position.y - boss_hover_y(&ctx.arena)).abs();
        assert!(error < fixed_f(0.01), "off station by {:?}", error);
    }

    #[test]
    fn test_boss_fires_orbs_on_interval() {
        let ctx = ctx_at(195, 100);
        let mut boss = boss_at_station(&ctx);
        let mut rng = GameRng::new(0);
        let mut effects = Vec::new();

        // 2.5 s interval: 5 s of idle time yields exactly two orbs
        for _ in 0..50 {
            boss.tick(fixed_f(0.1), &ctx, &mut rng, &mut effects);
        }
        let orbs = effects
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    BehaviorEffect::Fire {
                        kind: ProjectileKind::BossOrb,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(orbs, 2);
    }

    #[test]
    fn test_boss_roar_then_delayed_reinforcements() {
        let ctx = ctx_at(195, 100);
        let mut boss = boss_at_station(&ctx);
        let mut rng = GameRng::new(0);

        let mut roar_tick = None;
        let mut reinforcement_tick = None;
        for tick in 0..130 {
            let mut effects = Vec::new();
            boss.tick(fixed_f(0.1), &ctx, &mut rng, &mut effects);
            for effect in &effects {
                match effect {
                    BehaviorEffect::Roared if roar_tick.is_none() => roar_tick = Some(tick),
                    BehaviorEffect::Reinforcements if reinforcement_tick.is_none() => {
                        reinforcement_tick = Some(tick);
                    }
                    _ => {}
                }
            }
        }

        let roar = roar_tick.expect("boss never roared");
        let arrive = reinforcement_tick.expect("reinforcements never came");
        // Roar at 10 s, helpers 2 s later
        assert_eq!(roar, 99);
        assert_eq!(arrive - roar, 20);
    }

    #[test]
    fn test_boss_takes_damage_like_any_enemy() {
        let ctx = ctx_at(195, 100);
        let mut boss = boss_at_station(&ctx);

        assert!(!boss.take_damage(1999));
        assert_eq!(boss.hp.current, 1);
        assert!(boss.take_damage(1));
        assert!(!boss.take_damage(50), "no second lethal credit");
    }

    #[test]
    fn test_enemy_serde_roundtrip() {
        let center = Vec2Fixed::new(fixed(100), fixed(600));
        let mut enemy = Enemy::new(
            5,
            EnemyKind::Shaman,
            center,
            Behavior::Orbiter {
                center,
                angle: Fixed::ZERO,
                cast_timer: Fixed::ZERO,
            },
            125,
        );
        let mut rng = GameRng::new(7);
        let mut effects = Vec::new();
        enemy.tick(fixed_f(0.3), &ctx_at(200, 100), &mut rng, &mut effects);

        let bytes = bincode::serialize(&enemy).unwrap();
        let restored: Enemy = bincode::deserialize(&bytes).unwrap();
        assert_eq!(enemy, restored);
    }
}

//! Shared combat primitives: health pools, collision categories and
//! the pair dispatch table.
//!
//! Every overlap in the game resolves through [`classify_pair`], a
//! single ordered rule table over category bit-sets. Call sites never
//! inspect concrete enemy or projectile types to decide an outcome.

use crate::math::{Fixed, Vec2Fixed};
use serde::{Deserialize, Serialize};

/// Unique identifier for enemies and projectiles.
pub type EntityId = u64;

/// Health component for the player, enemies and the boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create a new health component with full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { max, current: max }
    }

    /// Apply damage, saturating at 0.
    pub fn apply_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    /// Heal, capped at max.
    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Check if the pool is empty.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current == 0
    }
}

/// Collision category bit-set.
///
/// A body may carry several bits (a spearman is both a melee body and
/// a lane faller). The dispatch rules below test bits, never concrete
/// types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(u32);

impl Category {
    // === Bodies ===
    /// The player's body.
    pub const PLAYER: Self = Self(1);
    /// Ground enemy that detonates on player contact.
    pub const ENEMY_MELEE: Self = Self(1 << 1);
    /// Enemy that holds position and fires aimed shots.
    pub const ENEMY_RANGED: Self = Self(1 << 2);
    /// Enemy that hovers an elliptical path and casts.
    pub const ENEMY_ORBITER: Self = Self(1 << 3);
    /// Enemy that falls straight down a spawn lane.
    pub const ENEMY_LANE_FALLER: Self = Self(1 << 4);
    /// The boss's body.
    pub const BOSS_BODY: Self = Self(1 << 5);

    // === Projectiles ===
    /// Anything the player fires (wand missile, fireball).
    pub const PLAYER_PROJECTILE: Self = Self(1 << 6);
    /// Archer arrows and thrown axes.
    pub const ENEMY_ARROW: Self = Self(1 << 7);
    /// Caster orbs.
    pub const ENEMY_ORB: Self = Self(1 << 8);
    /// Falling barrage rocks.
    pub const ENEMY_ROCK: Self = Self(1 << 9);
    /// The boss's own shots, kept distinct so their impact resolves
    /// through the boss rule rather than the generic projectile rule.
    pub const BOSS_PROJECTILE: Self = Self(1 << 10);

    // === Unions ===
    /// Any enemy body, boss included.
    pub const ENEMY_ANY: Self = Self(
        Self::ENEMY_MELEE.0
            | Self::ENEMY_RANGED.0
            | Self::ENEMY_ORBITER.0
            | Self::ENEMY_LANE_FALLER.0
            | Self::BOSS_BODY.0,
    );
    /// Any regular enemy projectile (not the boss's).
    pub const ENEMY_PROJECTILE_ANY: Self =
        Self(Self::ENEMY_ARROW.0 | Self::ENEMY_ORB.0 | Self::ENEMY_ROCK.0);

    /// Empty category (matches nothing).
    pub const NONE: Self = Self(0);

    /// Check if this category contains all bits in `other`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check if this category shares any bits with `other`.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Combine two categories.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Construct from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl std::ops::BitOr for Category {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Category {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Outcome of a category-pair overlap.
///
/// Orientation-free: the caller already knows which of its two bodies
/// is the projectile or the player, the effect only names the rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairEffect {
    /// A player shot struck an enemy body. Damage the enemy, remove
    /// the shot, credit a kill if the damage was lethal.
    PlayerShotHitsEnemy,
    /// The player touched a detonating enemy body. The enemy dies
    /// either way; the player takes contact damage unless a hard
    /// defense is up.
    MeleeContact,
    /// An enemy shot struck the player. Remove the shot and run the
    /// player damage pipeline. Boss shots additionally detonate.
    EnemyShotHitsPlayer {
        /// Whether the shot came from the boss.
        from_boss: bool,
    },
}

/// Resolve an unordered category pair to an effect.
///
/// Rules are tried in a fixed order and the first match wins. The
/// categories are laid out so no pair can match two rules, but the
/// ordering stays authoritative if that ever changes.
#[must_use]
pub fn classify_pair(a: Category, b: Category) -> Option<PairEffect> {
    let player_shot = |x: Category, y: Category| {
        x.contains(Category::PLAYER_PROJECTILE) && y.intersects(Category::ENEMY_ANY)
    };
    if player_shot(a, b) || player_shot(b, a) {
        return Some(PairEffect::PlayerShotHitsEnemy);
    }

    let melee = |x: Category, y: Category| {
        x.contains(Category::PLAYER) && y.intersects(Category::ENEMY_MELEE)
    };
    if melee(a, b) || melee(b, a) {
        return Some(PairEffect::MeleeContact);
    }

    let enemy_shot = |x: Category, y: Category| {
        x.contains(Category::PLAYER) && y.intersects(Category::ENEMY_PROJECTILE_ANY)
    };
    if enemy_shot(a, b) || enemy_shot(b, a) {
        return Some(PairEffect::EnemyShotHitsPlayer { from_boss: false });
    }

    let boss_shot = |x: Category, y: Category| {
        x.contains(Category::PLAYER) && y.contains(Category::BOSS_PROJECTILE)
    };
    if boss_shot(a, b) || boss_shot(b, a) {
        return Some(PairEffect::EnemyShotHitsPlayer { from_boss: true });
    }

    None
}

/// Circle overlap test used by all collision checks.
#[must_use]
pub fn circles_overlap(a: Vec2Fixed, a_radius: Fixed, b: Vec2Fixed, b_radius: Fixed) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) <= reach * reach
}

//! Projectiles: everything that flies, falls or boomerangs.
//!
//! A projectile is pure data plus one `advance` step. Damage numbers,
//! speeds, radii and lifetimes are a closed per-kind table; collision
//! outcomes are decided elsewhere from the kind's category bits.

use crate::combat::{Category, EntityId};
use crate::math::{fixed_serde, option_fixed_serde, Arena, Fixed, Vec2Fixed};
use serde::{Deserialize, Serialize};

/// Wall bounces a fireball survives before burning out.
pub const FIREBALL_BOUNCES: u8 = 3;

/// One boomerang leg (out or back) in seconds, as raw fixed-point
/// bits (`from_num` is not const). Equals 0.45 s.
pub const BOOMERANG_LEG_TIME: Fixed = Fixed::from_bits(1_932_735_283);

/// The closed set of projectile kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// The player's basic auto-fire shot.
    WandMissile,
    /// The player's heavy bouncing spell projectile.
    Fireball,
    /// Elf archer arrow.
    ElfArrow,
    /// Axe thrower boomerang.
    ThrownAxe,
    /// Druid's aimed orb.
    DruidOrb,
    /// The boss's aimed orb. Detonates against the player.
    BossOrb,
    /// Shaman barrage rock, falls straight down after a stagger delay.
    ShamanRock,
}

impl ProjectileKind {
    /// Damage applied on impact.
    #[must_use]
    pub const fn damage(self) -> u32 {
        match self {
            Self::WandMissile => 10,
            Self::Fireball => 50,
            Self::ElfArrow | Self::ThrownAxe => 15,
            Self::DruidOrb | Self::BossOrb | Self::ShamanRock => 35,
        }
    }

    /// Straight-line speed in world units per second.
    ///
    /// Boomerangs are time-parameterized rather than velocity-driven,
    /// so the axe has no meaningful entry here.
    #[must_use]
    pub fn speed(self) -> Fixed {
        let units: u32 = match self {
            Self::WandMissile => 680,
            Self::Fireball => 520,
            Self::ElfArrow => 360,
            Self::ThrownAxe => 0,
            Self::DruidOrb => 260,
            Self::BossOrb => 420,
            Self::ShamanRock => 520,
        };
        Fixed::from_num(units)
    }

    /// Collision radius in world units.
    #[must_use]
    pub fn radius(self) -> Fixed {
        let units: u32 = match self {
            Self::WandMissile => 12,
            Self::Fireball => 22,
            Self::ElfArrow => 10,
            Self::ThrownAxe => 30,
            Self::DruidOrb => 26,
            Self::BossOrb | Self::ShamanRock => 18,
        };
        Fixed::from_num(units)
    }

    /// Lifetime in seconds, `None` for kinds limited by bounds or
    /// flight shape instead.
    #[must_use]
    pub fn ttl(self) -> Option<Fixed> {
        match self {
            Self::ElfArrow => Some(Fixed::from_num(4)),
            Self::DruidOrb => Some(Fixed::from_num(5)),
            Self::ShamanRock => Some(Fixed::from_num(2.5)),
            _ => None,
        }
    }

    /// Collision category bits for this kind.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::WandMissile | Self::Fireball => Category::PLAYER_PROJECTILE,
            Self::ElfArrow | Self::ThrownAxe => Category::ENEMY_ARROW,
            Self::DruidOrb => Category::ENEMY_ORB,
            Self::ShamanRock => Category::ENEMY_ROCK,
            Self::BossOrb => Category::BOSS_PROJECTILE,
        }
    }

    /// Whether the player fired this kind.
    #[must_use]
    pub const fn player_owned(self) -> bool {
        self.category().contains(Category::PLAYER_PROJECTILE)
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::WandMissile => "Wand Missile",
            Self::Fireball => "Fireball",
            Self::ElfArrow => "Elf Arrow",
            Self::ThrownAxe => "Thrown Axe",
            Self::DruidOrb => "Druid Orb",
            Self::BossOrb => "Boss Orb",
            Self::ShamanRock => "Shaman Rock",
        }
    }
}

/// How a projectile moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flight {
    /// Constant velocity.
    Linear {
        /// World units per second.
        velocity: Vec2Fixed,
    },
    /// Constant velocity, reflecting off arena edges a limited number
    /// of times.
    Bouncing {
        /// World units per second.
        velocity: Vec2Fixed,
        /// Wall reflections left before burnout.
        bounces_left: u8,
    },
    /// Fixed-time out leg to an apex, then a fixed-time return leg.
    Boomerang {
        /// Launch point, also the landing point.
        origin: Vec2Fixed,
        /// Turnaround point (the aim position at throw time).
        apex: Vec2Fixed,
        /// Time spent in the current leg.
        #[serde(with = "fixed_serde")]
        elapsed: Fixed,
        /// Whether the return leg has started.
        returning: bool,
    },
}

/// A live projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projectile {
    /// Unique id, shared with the enemy id space.
    pub id: EntityId,
    /// Which kind this is.
    pub kind: ProjectileKind,
    /// Current position.
    pub position: Vec2Fixed,
    /// Movement state.
    pub flight: Flight,
    /// Remaining lifetime, if this kind expires by time.
    #[serde(with = "option_fixed_serde")]
    pub ttl: Option<Fixed>,
    /// Inert time left before the projectile starts moving and
    /// colliding. Nonzero only for staggered barrage rocks.
    #[serde(with = "fixed_serde")]
    pub delay: Fixed,
    /// Deferred-removal flag, honored by the end-of-tick sweep.
    pub removed: bool,
}

impl Projectile {
    /// Spawn a projectile of `kind` at `from`, aimed at `toward`.
    ///
    /// Aiming at the launch point itself degenerates to straight up.
    #[must_use]
    pub fn fired(id: EntityId, kind: ProjectileKind, from: Vec2Fixed, toward: Vec2Fixed) -> Self {
        let mut direction = (toward - from).normalize();
        if direction == Vec2Fixed::ZERO {
            direction = Vec2Fixed::new(Fixed::ZERO, Fixed::from_num(1));
        }

        let flight = match kind {
            ProjectileKind::ThrownAxe => Flight::Boomerang {
                origin: from,
                apex: toward,
                elapsed: Fixed::ZERO,
                returning: false,
            },
            ProjectileKind::Fireball => Flight::Bouncing {
                velocity: direction * kind.speed(),
                bounces_left: FIREBALL_BOUNCES,
            },
            _ => Flight::Linear {
                velocity: direction * kind.speed(),
            },
        };

        Self {
            id,
            kind,
            position: from,
            flight,
            ttl: kind.ttl(),
            delay: Fixed::ZERO,
            removed: false,
        }
    }

    /// Spawn one barrage rock above the arena, falling after `delay`.
    #[must_use]
    pub fn rock(id: EntityId, x: Fixed, top_y: Fixed, delay: Fixed) -> Self {
        let kind = ProjectileKind::ShamanRock;
        Self {
            id,
            kind,
            position: Vec2Fixed::new(x, top_y),
            flight: Flight::Linear {
                velocity: Vec2Fixed::new(Fixed::ZERO, -kind.speed()),
            },
            ttl: kind.ttl(),
            delay,
            removed: false,
        }
    }

    /// Whether this projectile moves and collides right now.
    #[must_use]
    pub fn active(&self) -> bool {
        !self.removed && self.delay <= Fixed::ZERO
    }

    /// Advance one tick: burn delay, age out, then move.
    pub fn advance(&mut self, dt: Fixed, arena: &Arena) {
        if self.removed {
            return;
        }

        if self.delay > Fixed::ZERO {
            self.delay = (self.delay - dt).max(Fixed::ZERO);
            return;
        }

        if let Some(remaining) = self.ttl {
            if remaining <= dt {
                self.removed = true;
                return;
            }
            self.ttl = Some(remaining - dt);
        }

        match &mut self.flight {
            Flight::Linear { velocity } => {
                self.position = self.position + *velocity * dt;
            }
            Flight::Bouncing {
                velocity,
                bounces_left,
            } => {
                self.position = self.position + *velocity * dt;

                // Each wall contact is one bounce; a corner can
                // consume two in the same tick.
                if self.position.x < Fixed::ZERO && *bounces_left > 0 {
                    self.position.x = -self.position.x;
                    velocity.x = -velocity.x;
                    *bounces_left -= 1;
                }
                if self.position.x > arena.width && *bounces_left > 0 {
                    self.position.x = arena.width + arena.width - self.position.x;
                    velocity.x = -velocity.x;
                    *bounces_left -= 1;
                }
                if self.position.y < Fixed::ZERO && *bounces_left > 0 {
                    self.position.y = -self.position.y;
                    velocity.y = -velocity.y;
                    *bounces_left -= 1;
                }
                if self.position.y > arena.height && *bounces_left > 0 {
                    self.position.y = arena.height + arena.height - self.position.y;
                    velocity.y = -velocity.y;
                    *bounces_left -= 1;
                }

                if *bounces_left == 0 {
                    self.removed = true;
                }
            }
            Flight::Boomerang {
                origin,
                apex,
                elapsed,
                returning,
            } => {
                *elapsed += dt;
                if *returning {
                    if *elapsed >= BOOMERANG_LEG_TIME {
                        self.position = *origin;
                        self.removed = true;
                    } else {
                        let t = *elapsed / BOOMERANG_LEG_TIME;
                        self.position = apex.lerp(*origin, t);
                    }
                } else if *elapsed >= BOOMERANG_LEG_TIME {
                    // Carry the overshoot into the return leg
                    *elapsed -= BOOMERANG_LEG_TIME;
                    *returning = true;
                    let t = (*elapsed / BOOMERANG_LEG_TIME).min(Fixed::from_num(1));
                    self.position = apex.lerp(*origin, t);
                } else {
                    let t = *elapsed / BOOMERANG_LEG_TIME;
                    self.position = origin.lerp(*apex, t);
                }
            }
        }
    }
}

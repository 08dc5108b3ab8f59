//! Per-tick event stream.
//!
//! The simulation is headless; these events are how a presentation
//! layer learns what to flash, shake or play a sound for. Events are
//! emitted in processing order within the tick and reset every tick.

use crate::combat::EntityId;
use crate::enemy::EnemyKind;
use crate::spells::SpellKind;
use serde::{Deserialize, Serialize};

/// A single observable thing that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// The player lost HP.
    DamageTaken {
        /// Damage the attacker asked for.
        amount: u32,
    },
    /// The mana shield paid for a hit instead of HP.
    ShieldAbsorbed {
        /// Mana the absorption cost.
        cost: u32,
    },
    /// Mana was spent on a cast.
    ManaSpent {
        /// Mana removed from the pool.
        amount: u32,
    },
    /// An enemy took damage and survived.
    EnemyHit {
        /// The enemy that was hit.
        id: EntityId,
        /// What kind of enemy it is.
        kind: EnemyKind,
        /// Damage dealt.
        amount: u32,
    },
    /// An enemy died.
    EnemyKilled {
        /// What kind of enemy died.
        kind: EnemyKind,
        /// XP the kill awarded.
        xp: u32,
    },
    /// The player gained XP.
    XpGained {
        /// XP added.
        amount: u32,
    },
    /// The player reached a new level.
    LevelUp {
        /// The level just reached.
        level: u32,
    },
    /// The passive income metronome paid out.
    CoinTick {
        /// Coin total after the payout.
        total: u64,
    },
    /// A wave began spawning.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
    },
    /// A wave's required kills are all down.
    WaveCleared {
        /// One-based wave number.
        wave: u32,
    },
    /// The world boss entered the arena.
    BossSpawned,
    /// The boss roared and called for reinforcements.
    BossRoared,
    /// The boss died.
    BossDefeated,
    /// A boss orb detonated against the player or a defense.
    BossOrbExploded,
    /// A spell cast succeeded.
    SpellCast {
        /// The spell that was cast.
        spell: SpellKind,
    },
    /// A timed spell effect ran out.
    SpellExpired {
        /// The spell whose effect ended.
        spell: SpellKind,
    },
    /// The armed revive consumed itself and saved the run.
    PlayerRevived,
    /// The run ended.
    GameOver {
        /// Wave the run ended on.
        wave: u32,
    },
}

/// Everything observable that happened during one simulation tick.
///
/// A fresh value is produced per tick; the presentation layer drains
/// it and the simulation never reads it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Events in emission order.
    pub events: Vec<Event>,
}

impl TickEvents {
    /// Append an event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Whether nothing observable happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events this tick.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Iterate events in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Number of enemy deaths this tick.
    #[must_use]
    pub fn kills(&self) -> u32 {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::EnemyKilled { .. }))
            .count() as u32
    }

    /// Total HP damage the player took this tick.
    #[must_use]
    pub fn damage_taken(&self) -> u32 {
        self.events
            .iter()
            .map(|event| match event {
                Event::DamageTaken { amount } => *amount,
                _ => 0,
            })
            .sum()
    }
}

//! Spell catalog, ownership, cooldowns and active timed effects.
//!
//! Spell data is a closed catalog: costs, cooldowns and durations are
//! methods on [`SpellKind`], not external config. Timed effects live in
//! [`ActiveSpells`] as monotonically decreasing counters advanced by
//! `dt`, so pausing the host freezes everything for free.

use crate::math::{fixed_serde, fixed_vec_serde, option_fixed_serde, Fixed};
use serde::{Deserialize, Serialize};

/// Number of spells in the catalog.
pub const SPELL_COUNT: usize = 10;

/// Seconds between aura damage pulses, as raw fixed-point bits
/// (`from_num` is not const). Equals 0.2 s.
pub const AURA_PULSE_INTERVAL: Fixed = Fixed::from_bits(858_993_459);

/// Damage per lightning aura pulse.
pub const LIGHTNING_PULSE_DAMAGE: u32 = 10;
/// Lightning aura reach in world units.
pub const LIGHTNING_AURA_RADIUS: u32 = 150;
/// Damage per ice block aura pulse.
pub const ICE_PULSE_DAMAGE: u32 = 15;
/// Ice block aura reach in world units.
pub const ICE_AURA_RADIUS: u32 = 120;
/// Damage per blizzard pulse. The blizzard covers the whole arena.
pub const BLIZZARD_PULSE_DAMAGE: u32 = 20;

/// The fixed spell catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellKind {
    /// Restores 35% of max HP. Rejected at full health.
    HealthPotion,
    /// Refills mana to max.
    ManaCrystal,
    /// Refills HP to max.
    FairyDust,
    /// Arms a once-per-run rescue: the next lethal hit instead
    /// restores half of max HP.
    Revive,
    /// Absorbs incoming hits at 15 mana each for up to 10 s.
    ManaShield,
    /// Full immunity plus a damaging aura for 10 s.
    LightningShield,
    /// Multiplies attack speed by 1.5 for 20 s.
    RapidWand,
    /// Arena-wide damage-over-time and enemy slow for 10 s.
    Blizzard,
    /// Launches one heavy bouncing projectile.
    Fireball,
    /// Invulnerable but immobile for 5 s, with a damaging aura.
    IceBlock,
}

impl SpellKind {
    /// All spells in catalog order.
    pub const ALL: [Self; SPELL_COUNT] = [
        Self::HealthPotion,
        Self::ManaCrystal,
        Self::FairyDust,
        Self::Revive,
        Self::ManaShield,
        Self::LightningShield,
        Self::RapidWand,
        Self::Blizzard,
        Self::Fireball,
        Self::IceBlock,
    ];

    /// Stable catalog index, used for cooldown slots and ownership bits.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::HealthPotion => 0,
            Self::ManaCrystal => 1,
            Self::FairyDust => 2,
            Self::Revive => 3,
            Self::ManaShield => 4,
            Self::LightningShield => 5,
            Self::RapidWand => 6,
            Self::Blizzard => 7,
            Self::Fireball => 8,
            Self::IceBlock => 9,
        }
    }

    /// Mana spent on cast. Consumables are free.
    #[must_use]
    pub const fn mana_cost(self) -> u32 {
        match self {
            Self::HealthPotion | Self::ManaCrystal | Self::FairyDust | Self::Revive => 0,
            Self::ManaShield => 25,
            Self::LightningShield => 40,
            Self::RapidWand => 30,
            Self::Blizzard => 45,
            Self::Fireball => 30,
            Self::IceBlock => 35,
        }
    }

    /// Cooldown in seconds started on a successful cast.
    #[must_use]
    pub fn cooldown(self) -> Fixed {
        let seconds: u32 = match self {
            Self::HealthPotion | Self::ManaCrystal | Self::FairyDust | Self::Revive => 1,
            Self::ManaShield => 15,
            Self::LightningShield | Self::RapidWand => 25,
            Self::Blizzard => 30,
            Self::Fireball => 8,
            Self::IceBlock => 20,
        };
        Fixed::from_num(seconds)
    }

    /// Active-effect duration, `None` for instant spells.
    #[must_use]
    pub fn duration(self) -> Option<Fixed> {
        let seconds: u32 = match self {
            Self::ManaShield | Self::LightningShield | Self::Blizzard => 10,
            Self::RapidWand => 20,
            Self::IceBlock => 5,
            _ => return None,
        };
        Some(Fixed::from_num(seconds))
    }

    /// Shop price in coins. Carried for economy metrics only.
    #[must_use]
    pub const fn price(self) -> u32 {
        match self {
            Self::HealthPotion => 20,
            Self::ManaCrystal => 30,
            Self::FairyDust => 40,
            Self::Revive => 200,
            Self::ManaShield => 25,
            Self::LightningShield => 60,
            Self::RapidWand => 55,
            Self::Blizzard => 45,
            Self::Fireball => 35,
            Self::IceBlock => 35,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HealthPotion => "Health Potion",
            Self::ManaCrystal => "Mana Crystal",
            Self::FairyDust => "Fairy Dust",
            Self::Revive => "Revive",
            Self::ManaShield => "Mana Shield",
            Self::LightningShield => "Lightning Shield",
            Self::RapidWand => "Rapid Wand",
            Self::Blizzard => "Blizzard",
            Self::Fireball => "Fireball",
            Self::IceBlock => "Ice Block",
        }
    }
}

/// Which spells the player owns, as a catalog-index bitmask.
///
/// Ownership itself is bought outside the simulation; the core only
/// checks it when gating casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpellBook(u16);

impl SpellBook {
    /// A book with no spells.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// A book with the entire catalog.
    #[must_use]
    pub const fn full() -> Self {
        Self((1 << SPELL_COUNT as u16) - 1)
    }

    /// Add a spell to the book.
    pub fn grant(&mut self, kind: SpellKind) {
        self.0 |= 1 << kind.index();
    }

    /// Whether the book contains `kind`.
    #[must_use]
    pub const fn owns(self, kind: SpellKind) -> bool {
        self.0 & (1 << kind.index()) != 0
    }

    /// Raw ownership bits.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl Default for SpellBook {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<SpellKind> for SpellBook {
    fn from_iter<I: IntoIterator<Item = SpellKind>>(iter: I) -> Self {
        let mut book = Self::empty();
        for kind in iter {
            book.grant(kind);
        }
        book
    }
}

/// Per-spell cooldown timers, indexed by catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CooldownBank {
    /// Remaining seconds per spell, floored at zero.
    #[serde(with = "fixed_vec_serde")]
    remaining: Vec<Fixed>,
}

impl CooldownBank {
    /// All cooldowns ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            remaining: vec![Fixed::ZERO; SPELL_COUNT],
        }
    }

    /// Advance every timer by `dt`, flooring at zero.
    pub fn tick(&mut self, dt: Fixed) {
        for slot in &mut self.remaining {
            if *slot > Fixed::ZERO {
                *slot = (*slot - dt).max(Fixed::ZERO);
            }
        }
    }

    /// Whether `kind` can be cast right now.
    #[must_use]
    pub fn ready(&self, kind: SpellKind) -> bool {
        self.remaining(kind) == Fixed::ZERO
    }

    /// Remaining cooldown for `kind`.
    #[must_use]
    pub fn remaining(&self, kind: SpellKind) -> Fixed {
        self.remaining.get(kind.index()).copied().unwrap_or(Fixed::ZERO)
    }

    /// Start `kind`'s full cooldown.
    pub fn start(&mut self, kind: SpellKind) {
        if let Some(slot) = self.remaining.get_mut(kind.index()) {
            *slot = kind.cooldown();
        }
    }
}

impl Default for CooldownBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Aura pulses owed after a timer tick, one counter per aura source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuraPulses {
    /// Lightning shield pulses (10 damage, radius 150).
    pub lightning: u32,
    /// Ice block pulses (15 damage, radius 120).
    pub ice: u32,
    /// Blizzard pulses (20 damage, arena-wide).
    pub blizzard: u32,
}

/// Result of advancing active spell timers by one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellTick {
    /// Aura pulses owed this tick.
    pub pulses: AuraPulses,
    /// Effects whose duration ran out this tick.
    pub expired: Vec<SpellKind>,
}

/// Remaining durations of the timed spell effects.
///
/// One authoritative timer per effect. Derived quantities (attack
/// speed, immunity, movement lock) are read from these timers rather
/// than stored as separate multipliers that could drift out of sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSpells {
    /// Mana shield time left.
    #[serde(with = "option_fixed_serde")]
    pub mana_shield: Option<Fixed>,
    /// Lightning shield time left.
    #[serde(with = "option_fixed_serde")]
    pub lightning_shield: Option<Fixed>,
    /// Ice block time left.
    #[serde(with = "option_fixed_serde")]
    pub ice_block: Option<Fixed>,
    /// Rapid wand time left.
    #[serde(with = "option_fixed_serde")]
    pub rapid_wand: Option<Fixed>,
    /// Blizzard time left.
    #[serde(with = "option_fixed_serde")]
    pub blizzard: Option<Fixed>,
    /// Time accumulated toward the next lightning pulse.
    #[serde(with = "fixed_serde")]
    pub lightning_accum: Fixed,
    /// Time accumulated toward the next ice pulse.
    #[serde(with = "fixed_serde")]
    pub ice_accum: Fixed,
    /// Time accumulated toward the next blizzard pulse.
    #[serde(with = "fixed_serde")]
    pub blizzard_accum: Fixed,
}

impl ActiveSpells {
    /// Begin a timed effect. Instant spells are a no-op here.
    pub fn activate(&mut self, kind: SpellKind) {
        let Some(duration) = kind.duration() else {
            return;
        };
        match kind {
            SpellKind::ManaShield => self.mana_shield = Some(duration),
            SpellKind::LightningShield => {
                self.lightning_shield = Some(duration);
                self.lightning_accum = Fixed::ZERO;
            }
            SpellKind::IceBlock => {
                self.ice_block = Some(duration);
                self.ice_accum = Fixed::ZERO;
            }
            SpellKind::RapidWand => self.rapid_wand = Some(duration),
            SpellKind::Blizzard => {
                self.blizzard = Some(duration);
                self.blizzard_accum = Fixed::ZERO;
            }
            _ => {}
        }
    }

    /// Whether `kind`'s timed effect is currently running.
    #[must_use]
    pub fn is_active(&self, kind: SpellKind) -> bool {
        match kind {
            SpellKind::ManaShield => self.mana_shield.is_some(),
            SpellKind::LightningShield => self.lightning_shield.is_some(),
            SpellKind::IceBlock => self.ice_block.is_some(),
            SpellKind::RapidWand => self.rapid_wand.is_some(),
            SpellKind::Blizzard => self.blizzard.is_some(),
            _ => false,
        }
    }

    /// Advance all effect timers by `dt`.
    ///
    /// Aura accumulators only count time the effect was actually
    /// active within this tick, so a 10 s aura at the 0.2 s pulse
    /// interval fires exactly 50 times no matter how `dt` divides it.
    pub fn tick(&mut self, dt: Fixed) -> SpellTick {
        let mut out = SpellTick::default();

        if let Some(remaining) = self.lightning_shield {
            let effective = dt.min(remaining);
            self.lightning_accum += effective;
            while self.lightning_accum >= AURA_PULSE_INTERVAL {
                self.lightning_accum -= AURA_PULSE_INTERVAL;
                out.pulses.lightning += 1;
            }
            if remaining <= dt {
                self.lightning_shield = None;
                self.lightning_accum = Fixed::ZERO;
                out.expired.push(SpellKind::LightningShield);
            } else {
                self.lightning_shield = Some(remaining - dt);
            }
        }

        if let Some(remaining) = self.ice_block {
            let effective = dt.min(remaining);
            self.ice_accum += effective;
            while self.ice_accum >= AURA_PULSE_INTERVAL {
                self.ice_accum -= AURA_PULSE_INTERVAL;
                out.pulses.ice += 1;
            }
            if remaining <= dt {
                self.ice_block = None;
                self.ice_accum = Fixed::ZERO;
                out.expired.push(SpellKind::IceBlock);
            } else {
                self.ice_block = Some(remaining - dt);
            }
        }

        if let Some(remaining) = self.blizzard {
            let effective = dt.min(remaining);
            self.blizzard_accum += effective;
            while self.blizzard_accum >= AURA_PULSE_INTERVAL {
                self.blizzard_accum -= AURA_PULSE_INTERVAL;
                out.pulses.blizzard += 1;
            }
            if remaining <= dt {
                self.blizzard = None;
                self.blizzard_accum = Fixed::ZERO;
                out.expired.push(SpellKind::Blizzard);
            } else {
                self.blizzard = Some(remaining - dt);
            }
        }

        if let Some(remaining) = self.mana_shield {
            if remaining <= dt {
                self.mana_shield = None;
                out.expired.push(SpellKind::ManaShield);
            } else {
                self.mana_shield = Some(remaining - dt);
            }
        }

        if let Some(remaining) = self.rapid_wand {
            if remaining <= dt {
                self.rapid_wand = None;
                out.expired.push(SpellKind::RapidWand);
            } else {
                self.rapid_wand = Some(remaining - dt);
            }
        }

        out
    }

    /// Whether a hard defense (full immunity) is up.
    #[must_use]
    pub fn hard_defense_active(&self) -> bool {
        self.lightning_shield.is_some() || self.ice_block.is_some()
    }

    /// Drop the mana shield early (insufficient mana for another absorb).
    pub fn drop_mana_shield(&mut self) {
        self.mana_shield = None;
    }

    /// Current fire-rate multiplier, derived from the rapid wand timer.
    #[must_use]
    pub fn attack_speed_multiplier(&self) -> Fixed {
        if self.rapid_wand.is_some() {
            Fixed::from_num(3) / Fixed::from_num(2)
        } else {
            Fixed::from_num(1)
        }
    }

    /// Whether movement is locked (frozen inside the ice block).
    #[must_use]
    pub fn movement_locked(&self) -> bool {
        self.ice_block.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_f(value: f64) -> Fixed {
        Fixed::from_num(value)
    }

    #[test]
    fn test_catalog_index_matches_all_order() {
        for (i, kind) in SpellKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_consumables_are_free_with_short_cooldown() {
        for kind in [
            SpellKind::HealthPotion,
            SpellKind::ManaCrystal,
            SpellKind::FairyDust,
            SpellKind::Revive,
        ] {
            assert_eq!(kind.mana_cost(), 0);
            assert_eq!(kind.cooldown(), Fixed::from_num(1));
            assert!(kind.duration().is_none());
        }
    }

    #[test]
    fn test_spellbook_grant_and_owns() {
        let mut book = SpellBook::empty();
        assert!(!book.owns(SpellKind::Fireball));

        book.grant(SpellKind::Fireball);
        book.grant(SpellKind::ManaShield);
        assert!(book.owns(SpellKind::Fireball));
        assert!(book.owns(SpellKind::ManaShield));
        assert!(!book.owns(SpellKind::Blizzard));

        let full = SpellBook::full();
        for kind in SpellKind::ALL {
            assert!(full.owns(kind));
        }
    }

    #[test]
    fn test_spellbook_from_iter() {
        let book: SpellBook = [SpellKind::Revive, SpellKind::IceBlock].into_iter().collect();
        assert!(book.owns(SpellKind::Revive));
        assert!(book.owns(SpellKind::IceBlock));
        assert!(!book.owns(SpellKind::HealthPotion));
    }

    #[test]
    fn test_cooldown_bank_tick_floors_at_zero() {
        let mut bank = CooldownBank::new();
        assert!(bank.ready(SpellKind::Fireball));

        bank.start(SpellKind::Fireball);
        assert!(!bank.ready(SpellKind::Fireball));
        assert_eq!(bank.remaining(SpellKind::Fireball), Fixed::from_num(8));

        bank.tick(fixed_f(7.5));
        assert_eq!(bank.remaining(SpellKind::Fireball), fixed_f(0.5));

        // Overshooting must floor, not wrap
        bank.tick(fixed_f(2.0));
        assert!(bank.ready(SpellKind::Fireball));
        assert_eq!(bank.remaining(SpellKind::Fireball), Fixed::ZERO);
    }

    #[test]
    fn test_activate_and_expire() {
        let mut active = ActiveSpells::default();
        active.activate(SpellKind::RapidWand);
        assert!(active.is_active(SpellKind::RapidWand));
        assert_eq!(active.attack_speed_multiplier(), fixed_f(1.5));

        // 20 s duration: expire exactly at the boundary
        let tick = active.tick(Fixed::from_num(20));
        assert!(!active.is_active(SpellKind::RapidWand));
        assert_eq!(tick.expired, vec![SpellKind::RapidWand]);
        assert_eq!(active.attack_speed_multiplier(), Fixed::from_num(1));
    }

    #[test]
    fn test_instant_spells_never_activate() {
        let mut active = ActiveSpells::default();
        active.activate(SpellKind::HealthPotion);
        active.activate(SpellKind::Fireball);
        assert!(!active.is_active(SpellKind::HealthPotion));
        assert!(!active.is_active(SpellKind::Fireball));
    }

    #[test]
    fn test_hard_defense_and_movement_lock() {
        let mut active = ActiveSpells::default();
        assert!(!active.hard_defense_active());

        active.activate(SpellKind::LightningShield);
        assert!(active.hard_defense_active());
        assert!(!active.movement_locked());

        active.activate(SpellKind::IceBlock);
        assert!(active.movement_locked());
    }

    #[test]
    fn test_blizzard_pulses_exactly_fifty_times() {
        let mut active = ActiveSpells::default();
        active.activate(SpellKind::Blizzard);

        let dt = fixed_f(0.1);
        let mut pulses = 0;
        let mut expired = false;
        for _ in 0..200 {
            let tick = active.tick(dt);
            pulses += tick.pulses.blizzard;
            if tick.expired.contains(&SpellKind::Blizzard) {
                expired = true;
                break;
            }
        }

        assert!(expired, "blizzard never expired");
        assert_eq!(pulses, 50, "10 s at 0.2 s intervals must pulse 50 times");
    }

    #[test]
    fn test_ice_aura_pulses_exactly_twenty_five_times() {
        let mut active = ActiveSpells::default();
        active.activate(SpellKind::IceBlock);

        // Coarse steps: 5 pulses per 1 s tick
        let mut pulses = 0;
        for _ in 0..6 {
            pulses += active.tick(Fixed::from_num(1)).pulses.ice;
        }
        assert_eq!(pulses, 25);
        assert!(!active.is_active(SpellKind::IceBlock));
    }

    #[test]
    fn test_oversized_dt_does_not_overcount_pulses() {
        let mut active = ActiveSpells::default();
        active.activate(SpellKind::LightningShield);

        // One giant step far past the 10 s duration
        let tick = active.tick(Fixed::from_num(60));
        assert_eq!(tick.pulses.lightning, 50);
        assert_eq!(tick.expired, vec![SpellKind::LightningShield]);
    }

    #[test]
    fn test_mana_shield_drop() {
        let mut active = ActiveSpells::default();
        active.activate(SpellKind::ManaShield);
        assert!(active.is_active(SpellKind::ManaShield));

        active.drop_mana_shield();
        assert!(!active.is_active(SpellKind::ManaShield));
        // A dropped shield must not report expiry later
        assert!(active.tick(fixed_f(0.5)).expired.is_empty());
    }

    #[test]
    fn test_active_spells_serde_roundtrip() {
        let mut active = ActiveSpells::default();
        active.activate(SpellKind::Blizzard);
        active.activate(SpellKind::RapidWand);
        active.tick(fixed_f(0.3));

        let bytes = bincode::serialize(&active).unwrap();
        let restored: ActiveSpells = bincode::deserialize(&bytes).unwrap();
        assert_eq!(active, restored);
    }
}

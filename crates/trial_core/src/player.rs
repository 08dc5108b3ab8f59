//! Player combat state: health, mana, casting, movement and auto-fire.
//!
//! The player never emits events itself. Every operation returns a
//! value describing what happened and the simulation translates those
//! into the per-tick event stream.

use crate::combat::Health;
use crate::math::{fixed_serde, Arena, Fixed, Vec2Fixed};
use crate::spells::{ActiveSpells, CooldownBank, SpellBook, SpellKind, SpellTick};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Movement speed in world units per second.
pub const MOVE_SPEED: u32 = 260;
/// Collision radius of the player's body.
pub const PLAYER_RADIUS: u32 = 26;
/// How far from every arena edge the player is kept.
pub const ARENA_INSET: u32 = 40;
/// Mana one shield absorption costs.
pub const SHIELD_ABSORB_COST: u32 = 15;
/// Melee-stick deadzone on the movement input, as raw fixed-point
/// bits (`from_num` is not const). Equals 0.2.
pub const MOVE_DEADZONE: Fixed = Fixed::from_bits(858_993_459);
/// Aim-stick deadzone gating firing intent. Equals 0.15.
pub const AIM_DEADZONE: Fixed = Fixed::from_bits(644_245_094);
/// Base seconds between auto-fire shots. Equals 0.18 s.
pub const FIRE_INTERVAL: Fixed = Fixed::from_bits(773_094_113);
/// Mana metronome step. Equals 0.1 s.
pub const MANA_STEP: Fixed = Fixed::from_bits(429_496_730);
/// How far past the player the aim vector projects the target point.
pub const AIM_REACH: u32 = 300;

/// Max HP at a given character level.
#[must_use]
pub const fn max_hp_for_level(level: u32) -> u32 {
    100 + 6 * level.saturating_sub(1)
}

/// Max mana at a given character level.
#[must_use]
pub const fn max_mana_for_level(level: u32) -> u32 {
    100 + 10 * level.saturating_sub(1)
}

/// XP needed to clear a given level: 100 at level 1, then ×1.25 per
/// level with integer truncation.
#[must_use]
pub fn xp_threshold(level: u32) -> u32 {
    let mut threshold = 100u32;
    let mut at = 1;
    while at < level {
        threshold = threshold * 5 / 4;
        at += 1;
    }
    threshold
}

/// A discrete input applied between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Replace the movement vector (clamped to unit magnitude).
    SetMoveInput(Vec2Fixed),
    /// Replace the aim vector (clamped to unit magnitude).
    SetAimInput(Vec2Fixed),
    /// Attempt to cast a spell.
    CastSpell(SpellKind),
}

/// Why a cast was rejected. No state changes on rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CastError {
    /// The spell is not in the player's book.
    #[error("spell not owned")]
    NotOwned,
    /// The spell's cooldown has not reached zero.
    #[error("spell on cooldown")]
    OnCooldown,
    /// The spell's timed effect (or armed revive) is already running.
    #[error("effect already active")]
    AlreadyActive,
    /// Not enough mana for the cast.
    #[error("insufficient mana: need {required}")]
    InsufficientMana {
        /// Mana the cast would have needed.
        required: u32,
    },
    /// Restorative cast with nothing to restore.
    #[error("nothing to restore")]
    NothingToRestore,
    /// The simulation already reached a terminal state.
    #[error("simulation halted")]
    Halted,
}

/// What a successful cast asks the simulation to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastAction {
    /// The effect was applied entirely inside the player state.
    Applied,
    /// Launch the fireball projectile.
    LaunchFireball {
        /// Launch position.
        from: Vec2Fixed,
        /// Aim target.
        toward: Vec2Fixed,
    },
}

/// How an incoming hit resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// A hard defense ate the hit entirely.
    Immune,
    /// The mana shield paid for the hit.
    Absorbed {
        /// Mana spent on the absorption.
        cost: u32,
        /// Whether the shield broke because the next absorption
        /// could no longer be paid for.
        shield_dropped: bool,
    },
    /// HP was lost but the player stands.
    Harmed {
        /// Damage requested by the attacker.
        amount: u32,
    },
    /// The hit was lethal and the armed revive consumed itself to
    /// restore half of max HP.
    Revived {
        /// Damage requested by the attacker.
        amount: u32,
    },
    /// The hit was lethal. The run is over.
    Fatal {
        /// Damage requested by the attacker.
        amount: u32,
    },
    /// The player was already down. Nothing happened.
    AlreadyDown,
}

/// The player's full combat state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Current position.
    pub position: Vec2Fixed,
    /// Health pool.
    pub hp: Health,
    /// Current mana.
    #[serde(with = "fixed_serde")]
    pub mana: Fixed,
    /// Character level.
    pub level: u32,
    /// XP toward the next level.
    pub xp: u32,
    /// XP needed to clear the current level.
    pub xp_to_next: u32,
    /// Passive currency collected this run.
    pub coins: u64,
    /// Movement input, unit-clamped.
    pub move_input: Vec2Fixed,
    /// Aim input, unit-clamped.
    pub aim_input: Vec2Fixed,
    /// Time since the last auto-fire shot.
    #[serde(with = "fixed_serde")]
    pub fire_timer: Fixed,
    /// Accumulator for the 0.1 s mana metronome.
    #[serde(with = "fixed_serde")]
    pub mana_accum: Fixed,
    /// Spells the player owns.
    pub spellbook: SpellBook,
    /// Per-spell cooldowns.
    pub cooldowns: CooldownBank,
    /// Running timed effects.
    pub active: ActiveSpells,
    /// Whether the once-per-run revive is armed.
    pub revive_armed: bool,
}

impl Player {
    /// Create a player at `position` with a given persistent level.
    #[must_use]
    pub fn new(position: Vec2Fixed, level: u32, spellbook: SpellBook) -> Self {
        let level = level.max(1);
        Self {
            position,
            hp: Health::new(max_hp_for_level(level)),
            mana: Fixed::from_num(max_mana_for_level(level)),
            level,
            xp: 0,
            xp_to_next: xp_threshold(level),
            coins: 0,
            move_input: Vec2Fixed::ZERO,
            aim_input: Vec2Fixed::ZERO,
            fire_timer: Fixed::ZERO,
            mana_accum: Fixed::ZERO,
            spellbook,
            cooldowns: CooldownBank::new(),
            active: ActiveSpells::default(),
            revive_armed: false,
        }
    }

    /// Current mana ceiling.
    #[must_use]
    pub fn max_mana(&self) -> Fixed {
        Fixed::from_num(max_mana_for_level(self.level))
    }

    /// Replace the movement input, clamped to the unit circle.
    pub fn set_move_input(&mut self, input: Vec2Fixed) {
        self.move_input = input.clamp_magnitude(Fixed::from_num(1));
    }

    /// Replace the aim input, clamped to the unit circle.
    pub fn set_aim_input(&mut self, input: Vec2Fixed) {
        self.aim_input = input.clamp_magnitude(Fixed::from_num(1));
    }

    /// Whether the aim input is past its deadzone (firing intent).
    #[must_use]
    pub fn aiming(&self) -> bool {
        self.aim_input.length_squared() > AIM_DEADZONE * AIM_DEADZONE
    }

    /// The point auto-fire and the fireball aim at.
    #[must_use]
    pub fn aim_target(&self) -> Vec2Fixed {
        self.position + self.aim_input * Fixed::from_num(AIM_REACH)
    }

    /// Advance position by the movement input, respecting the
    /// deadzone, the ice-block lock and the arena inset.
    pub fn advance(&mut self, dt: Fixed, arena: &Arena) {
        if self.active.movement_locked() {
            return;
        }
        if self.move_input.length_squared() <= MOVE_DEADZONE * MOVE_DEADZONE {
            return;
        }
        let step = Fixed::from_num(MOVE_SPEED) * dt;
        self.position = self.position + self.move_input * step;
        self.position = arena.clamp_point(self.position, Fixed::from_num(ARENA_INSET));
    }

    /// Tick spell cooldowns and active-effect timers.
    pub fn tick_spells(&mut self, dt: Fixed) -> SpellTick {
        self.cooldowns.tick(dt);
        self.active.tick(dt)
    }

    /// Run the mana metronome: each elapsed 0.1 s step drains 0.5
    /// while firing intent is active, otherwise regenerates 0.5.
    pub fn tick_mana(&mut self, dt: Fixed) {
        let half = Fixed::from_num(1) / Fixed::from_num(2);
        self.mana_accum += dt;
        while self.mana_accum >= MANA_STEP {
            self.mana_accum -= MANA_STEP;
            if self.aiming() && self.mana > Fixed::ZERO {
                self.mana = (self.mana - half).max(Fixed::ZERO);
            } else {
                self.mana = (self.mana + half).min(self.max_mana());
            }
        }
    }

    /// Accumulate fire time; returns the shot's launch and target
    /// points when a shot is due this tick.
    pub fn try_auto_fire(&mut self, dt: Fixed) -> Option<(Vec2Fixed, Vec2Fixed)> {
        self.fire_timer += dt;
        if !self.aiming() || self.mana <= Fixed::ZERO {
            return None;
        }
        let interval = FIRE_INTERVAL / self.active.attack_speed_multiplier();
        if self.fire_timer < interval {
            return None;
        }
        self.fire_timer = Fixed::ZERO;
        Some((self.position, self.aim_target()))
    }

    /// Spend mana if the pool covers it.
    pub fn try_spend_mana(&mut self, amount: u32) -> bool {
        let cost = Fixed::from_num(amount);
        if self.mana < cost {
            return false;
        }
        self.mana -= cost;
        true
    }

    /// Run one incoming hit through the defense pipeline.
    ///
    /// Idempotent past death: a hit on a player already at zero HP is
    /// a no-op, so the terminal signal fires exactly once even when
    /// several projectiles land in the same tick.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.hp.is_dead() {
            return DamageOutcome::AlreadyDown;
        }

        if self.active.hard_defense_active() {
            return DamageOutcome::Immune;
        }

        if self.active.is_active(SpellKind::ManaShield)
            && self.mana >= Fixed::from_num(SHIELD_ABSORB_COST)
        {
            self.mana -= Fixed::from_num(SHIELD_ABSORB_COST);
            // Exactly 15 left still covers one more absorption
            let shield_dropped = self.mana < Fixed::from_num(SHIELD_ABSORB_COST);
            if shield_dropped {
                self.active.drop_mana_shield();
            }
            return DamageOutcome::Absorbed {
                cost: SHIELD_ABSORB_COST,
                shield_dropped,
            };
        }

        self.hp.apply_damage(amount);
        if !self.hp.is_dead() {
            return DamageOutcome::Harmed { amount };
        }

        if self.revive_armed {
            self.revive_armed = false;
            self.hp.current = self.hp.max / 2;
            return DamageOutcome::Revived { amount };
        }
        DamageOutcome::Fatal { amount }
    }

    /// Add XP, leveling up as thresholds are crossed. Each level-up
    /// raises both pools and refills them.
    pub fn gain_xp(&mut self, amount: u32) {
        self.xp += amount;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.xp_to_next = self.xp_to_next * 5 / 4;
            self.hp = Health::new(max_hp_for_level(self.level));
            self.mana = Fixed::from_num(max_mana_for_level(self.level));
        }
    }

    /// Attempt a cast. All gates are checked before any state moves.
    pub fn cast_spell(&mut self, kind: SpellKind) -> Result<CastAction, CastError> {
        if !self.spellbook.owns(kind) {
            return Err(CastError::NotOwned);
        }
        // Active-effect check first: a running effect is always also
        // on cooldown, and the more specific error wins.
        if self.active.is_active(kind) {
            return Err(CastError::AlreadyActive);
        }
        if !self.cooldowns.ready(kind) {
            return Err(CastError::OnCooldown);
        }
        match kind {
            SpellKind::HealthPotion | SpellKind::FairyDust if self.hp.current == self.hp.max => {
                return Err(CastError::NothingToRestore);
            }
            SpellKind::ManaCrystal if self.mana == self.max_mana() => {
                return Err(CastError::NothingToRestore);
            }
            SpellKind::Revive if self.revive_armed => {
                return Err(CastError::AlreadyActive);
            }
            _ => {}
        }

        let cost = kind.mana_cost();
        if !self.try_spend_mana(cost) {
            return Err(CastError::InsufficientMana { required: cost });
        }
        self.cooldowns.start(kind);

        let action = match kind {
            SpellKind::HealthPotion => {
                self.hp.heal(self.hp.max * 35 / 100);
                CastAction::Applied
            }
            SpellKind::ManaCrystal => {
                self.mana = self.max_mana();
                CastAction::Applied
            }
            SpellKind::FairyDust => {
                self.hp.heal(self.hp.max);
                CastAction::Applied
            }
            SpellKind::Revive => {
                self.revive_armed = true;
                CastAction::Applied
            }
            SpellKind::Fireball => CastAction::LaunchFireball {
                from: self.position,
                toward: self.aim_target(),
            },
            _ => {
                self.active.activate(kind);
                CastAction::Applied
            }
        };
        Ok(action)
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

    fn player() -> Player {
        Player::new(
            Vec2Fixed::new(fixed(195), fixed(120)),
            1,
            SpellBook::full(),
        )
    }

    #[test]
    fn test_level_scaling_formulas() {
        assert_eq!(max_hp_for_level(1), 100);
        assert_eq!(max_hp_for_level(10), 154);
        assert_eq!(max_mana_for_level(1), 100);
        assert_eq!(max_mana_for_level(10), 190);

        assert_eq!(xp_threshold(1), 100);
        assert_eq!(xp_threshold(2), 125);
        assert_eq!(xp_threshold(3), 156);
        assert_eq!(xp_threshold(4), 195);
    }

    #[test]
    fn test_gain_xp_levels_up_and_refills() {
        let mut p = player();
        p.hp.apply_damage(50);
        p.mana = fixed(10);

        p.gain_xp(100);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 0);
        assert_eq!(p.xp_to_next, 125);
        assert_eq!(p.hp.current, 106, "level-up must refill HP");
        assert_eq!(p.mana, fixed(110), "level-up must refill mana");
    }

    #[test]
    fn test_gain_xp_can_cross_two_levels() {
        let mut p = player();
        p.gain_xp(230);
        // 230 clears 100 (level 1) and 125 (level 2), leaving 5
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 5);
        assert_eq!(p.xp_to_next, 156);
    }

    #[test]
    fn test_damage_pipeline_plain_hit() {
        let mut p = player();
        let outcome = p.apply_damage(35);
        assert_eq!(outcome, DamageOutcome::Harmed { amount: 35 });
        assert_eq!(p.hp.current, 65);
    }

    #[test]
    fn test_hard_defense_grants_full_immunity() {
        let mut p = player();
        p.active.activate(SpellKind::LightningShield);

        assert_eq!(p.apply_damage(999), DamageOutcome::Immune);
        assert_eq!(p.hp.current, 100);
    }

    #[test]
    fn test_shield_absorption_boundary() {
        let mut p = player();
        p.active.activate(SpellKind::ManaShield);
        p.mana = fixed(30);

        // First hit: 30 -> 15, exactly 15 left keeps the shield up
        let first = p.apply_damage(50);
        assert_eq!(
            first,
            DamageOutcome::Absorbed {
                cost: SHIELD_ABSORB_COST,
                shield_dropped: false
            }
        );
        assert_eq!(p.mana, fixed(15));
        assert_eq!(p.hp.current, 100);
        assert!(p.active.is_active(SpellKind::ManaShield));

        // Second hit: 15 -> 0, shield breaks
        let second = p.apply_damage(50);
        assert_eq!(
            second,
            DamageOutcome::Absorbed {
                cost: SHIELD_ABSORB_COST,
                shield_dropped: true
            }
        );
        assert_eq!(p.mana, fixed(0));
        assert!(!p.active.is_active(SpellKind::ManaShield));

        // Third hit lands on HP
        assert_eq!(p.apply_damage(50), DamageOutcome::Harmed { amount: 50 });
        assert_eq!(p.hp.current, 50);
    }

    #[test]
    fn test_shield_with_thin_mana_cannot_absorb() {
        let mut p = player();
        p.active.activate(SpellKind::ManaShield);
        p.mana = fixed(10);

        assert_eq!(p.apply_damage(20), DamageOutcome::Harmed { amount: 20 });
        assert_eq!(p.hp.current, 80);
        assert_eq!(p.mana, fixed(10));
    }

    #[test]
    fn test_lethal_hit_is_terminal_exactly_once() {
        let mut p = player();
        assert_eq!(p.apply_damage(150), DamageOutcome::Fatal { amount: 150 });
        assert_eq!(p.hp.current, 0);

        // Same-tick second projectile must not double the signal
        assert_eq!(p.apply_damage(10), DamageOutcome::AlreadyDown);
    }

    #[test]
    fn test_armed_revive_rescues_once() {
        let mut p = player();
        p.revive_armed = true;

        assert_eq!(p.apply_damage(150), DamageOutcome::Revived { amount: 150 });
        assert_eq!(p.hp.current, 50, "revive restores half of max HP");
        assert!(!p.revive_armed);

        assert_eq!(p.apply_damage(150), DamageOutcome::Fatal { amount: 150 });
    }

    #[test]
    fn test_try_spend_mana_is_gated() {
        let mut p = player();
        p.mana = fixed(20);

        assert!(p.try_spend_mana(15));
        assert_eq!(p.mana, fixed(5));
        assert!(!p.try_spend_mana(15), "overdraw must be rejected");
        assert_eq!(p.mana, fixed(5), "rejected spend must not mutate");
    }

    #[test]
    fn test_cast_rejections_leave_state_unchanged() {
        let mut p = Player::new(Vec2Fixed::ZERO, 1, SpellBook::empty());
        assert_eq!(p.cast_spell(SpellKind::Fireball), Err(CastError::NotOwned));

        let mut p = player();
        p.mana = fixed(10);
        assert_eq!(
            p.cast_spell(SpellKind::Blizzard),
            Err(CastError::InsufficientMana { required: 45 })
        );
        assert_eq!(p.mana, fixed(10));
        assert!(p.cooldowns.ready(SpellKind::Blizzard));

        let mut p = player();
        assert!(p.cast_spell(SpellKind::ManaShield).is_ok());
        assert_eq!(
            p.cast_spell(SpellKind::ManaShield),
            Err(CastError::AlreadyActive)
        );

        let mut p = player();
        p.hp.apply_damage(10);
        assert!(p.cast_spell(SpellKind::HealthPotion).is_ok());
        p.hp.apply_damage(10);
        assert_eq!(
            p.cast_spell(SpellKind::HealthPotion),
            Err(CastError::OnCooldown)
        );
    }

    #[test]
    fn test_health_potion_heals_percentage() {
        let mut p = player();
        assert_eq!(
            p.cast_spell(SpellKind::HealthPotion),
            Err(CastError::NothingToRestore)
        );

        p.hp.apply_damage(80);
        assert!(p.cast_spell(SpellKind::HealthPotion).is_ok());
        assert_eq!(p.hp.current, 55, "potion heals 35% of max");
    }

    #[test]
    fn test_restoratives_refill_pools() {
        let mut p = player();
        p.mana = fixed(3);
        assert!(p.cast_spell(SpellKind::ManaCrystal).is_ok());
        assert_eq!(p.mana, p.max_mana());

        p.hp.apply_damage(99);
        assert!(p.cast_spell(SpellKind::FairyDust).is_ok());
        assert_eq!(p.hp.current, p.hp.max);
    }

    #[test]
    fn test_fireball_cast_returns_launch_action() {
        let mut p = player();
        p.set_aim_input(Vec2Fixed::new(fixed(1), Fixed::ZERO));

        match p.cast_spell(SpellKind::Fireball) {
            Ok(CastAction::LaunchFireball { from, toward }) => {
                assert_eq!(from, p.position);
                assert_eq!(toward, p.position + Vec2Fixed::new(fixed(300), Fixed::ZERO));
            }
            other => panic!("expected a launch action, got {other:?}"),
        }
        assert_eq!(p.mana, fixed(70), "fireball costs 30 mana");
        assert!(!p.cooldowns.ready(SpellKind::Fireball));
    }

    #[test]
    fn test_mana_metronome_drains_while_aiming() {
        let mut p = player();
        p.set_aim_input(Vec2Fixed::new(fixed(1), Fixed::ZERO));

        p.tick_mana(Fixed::from_num(1));
        assert_eq!(p.mana, fixed(95), "10 steps of 0.5 drain");
    }

    #[test]
    fn test_mana_metronome_regenerates_when_idle() {
        let mut p = player();
        p.mana = fixed(50);

        p.tick_mana(Fixed::from_num(1));
        assert_eq!(p.mana, fixed(55), "10 steps of 0.5 regen");

        // Regen clamps at the ceiling
        p.mana = p.max_mana() - fixed_f(0.25);
        p.tick_mana(fixed_f(0.1));
        assert_eq!(p.mana, p.max_mana());
    }

    #[test]
    fn test_auto_fire_rate_limit() {
        let mut p = player();
        p.set_aim_input(Vec2Fixed::new(fixed(1), Fixed::ZERO));

        // Cold start: timer has had time to accumulate
        assert!(p.try_auto_fire(fixed_f(0.2)).is_some());

        // Just under the interval: rejected
        assert!(p.try_auto_fire(fixed_f(0.17)).is_none());
        // The rest of the interval: accepted
        assert!(p.try_auto_fire(fixed_f(0.01)).is_some());
    }

    #[test]
    fn test_rapid_wand_shortens_fire_interval() {
        let mut p = player();
        p.set_aim_input(Vec2Fixed::new(fixed(1), Fixed::ZERO));
        p.active.activate(SpellKind::RapidWand);

        assert!(p.try_auto_fire(fixed_f(0.2)).is_some());
        // 0.18 / 1.5 = 0.12: a hair under is rejected, a hair over lands
        assert!(p.try_auto_fire(fixed_f(0.119)).is_none());
        assert!(p.try_auto_fire(fixed_f(0.002)).is_some());
    }

    #[test]
    fn test_auto_fire_requires_aim_and_mana() {
        let mut p = player();
        assert!(p.try_auto_fire(fixed(1)).is_none(), "no aim, no shot");

        p.set_aim_input(Vec2Fixed::new(fixed(1), Fixed::ZERO));
        p.mana = Fixed::ZERO;
        assert!(p.try_auto_fire(fixed(1)).is_none(), "no mana, no shot");
    }

    #[test]
    fn test_aim_deadzone_gates_intent() {
        let mut p = player();
        p.set_aim_input(Vec2Fixed::new(fixed_f(0.1), Fixed::ZERO));
        assert!(!p.aiming());

        p.set_aim_input(Vec2Fixed::new(fixed_f(0.2), Fixed::ZERO));
        assert!(p.aiming());
    }

    #[test]
    fn test_movement_respects_deadzone_and_inset() {
        let arena = Arena::default();
        let mut p = player();

        p.set_move_input(Vec2Fixed::new(fixed_f(0.1), Fixed::ZERO));
        let before = p.position;
        p.advance(fixed_f(0.1), &arena);
        assert_eq!(p.position, before, "sub-deadzone input must not move");

        p.set_move_input(Vec2Fixed::new(-fixed(1), Fixed::ZERO));
        for _ in 0..100 {
            p.advance(fixed_f(0.1), &arena);
        }
        assert_eq!(p.position.x, fixed(40), "inset clamps the left edge");
    }

    #[test]
    fn test_ice_block_freezes_movement() {
        let arena = Arena::default();
        let mut p = player();
        p.set_move_input(Vec2Fixed::new(fixed(1), Fixed::ZERO));
        p.active.activate(SpellKind::IceBlock);

        let before = p.position;
        p.advance(fixed_f(0.5), &arena);
        assert_eq!(p.position, before);
    }

    #[test]
    fn test_oversized_inputs_are_clamped() {
        let mut p = player();
        p.set_move_input(Vec2Fixed::new(fixed(30), fixed(40)));

        let epsilon = fixed_f(0.001);
        assert!((p.move_input.length_squared() - fixed(1)).abs() < epsilon);
    }

    #[test]
    fn test_player_serde_roundtrip() {
        let mut p = player();
        p.set_aim_input(Vec2Fixed::new(fixed(1), Fixed::ZERO));
        p.cast_spell(SpellKind::ManaShield).unwrap();
        p.tick_mana(fixed_f(0.3));
        p.gain_xp(40);

        let bytes = bincode::serialize(&p).unwrap();
        let restored: Player = bincode::deserialize(&bytes).unwrap();
        assert_eq!(p, restored);
    }
}

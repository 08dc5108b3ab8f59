//! The simulation: one owner of all run state, advanced tick by tick.
//!
//! External code mutates the run only through [`Simulation::apply_command`]
//! and observes it only through read accessors and the [`TickEvents`]
//! each tick returns. Nothing in here reads a clock or system RNG, so
//! identical inputs always replay to identical state.

use crate::combat::{circles_overlap, classify_pair, Category, EntityId, PairEffect};
use crate::enemy::{BehaviorEffect, Enemy, TickCtx, MELEE_CONTACT_DAMAGE, ROCK_DROP_MARGIN};
use crate::events::{Event, TickEvents};
use crate::math::{fixed_serde, Arena, Fixed, Vec2Fixed};
use crate::player::{CastAction, CastError, Command, DamageOutcome, Player, PLAYER_RADIUS};
use crate::projectile::{Projectile, ProjectileKind};
use crate::rng::GameRng;
use crate::spells::{
    AuraPulses, SpellBook, SpellKind, BLIZZARD_PULSE_DAMAGE, ICE_AURA_RADIUS, ICE_PULSE_DAMAGE,
    LIGHTNING_AURA_RADIUS, LIGHTNING_PULSE_DAMAGE,
};
use crate::waves::{SpawnOrder, WavePhase, WaveScheduler, WorldId};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Upper clamp on a tick's dt: one thirtieth of a second. A stalled
/// host catches up over several ticks instead of tunneling entities
/// through each other.
pub const MAX_DT: Fixed = Fixed::from_bits(143_165_577);
/// Seconds between passive coin payouts.
pub const COIN_INTERVAL: Fixed = Fixed::from_bits(1 << 32);
/// How far outside the arena an enemy may drift before the sweep
/// reclaims it.
pub const ENEMY_SWEEP_MARGIN: u32 = 100;
/// How far outside the arena a projectile may fly before the sweep
/// reclaims it.
pub const PROJECTILE_SWEEP_MARGIN: u32 = 40;

/// State-encoding failures.
#[derive(Debug, Error)]
pub enum SimError {
    /// The state could not be written out.
    #[error("state serialization failed: {0}")]
    Serialize(String),
    /// The bytes could not be read back as a simulation.
    #[error("state deserialization failed: {0}")]
    Deserialize(String),
}

/// Where the run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationState {
    /// Ticks advance the run.
    Running,
    /// The player fell. Terminal.
    GameOver {
        /// Wave the run ended on.
        wave: u32,
    },
    /// The boss fell. Terminal.
    WorldCleared,
}

/// Everything needed to reproduce a run bit for bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// RNG seed.
    pub seed: u64,
    /// World to run.
    pub world: WorldId,
    /// Persistent character level carried into the run.
    pub starting_level: u32,
    /// First wave to schedule (1 for a full run).
    pub starting_wave: u32,
    /// Spells the player owns.
    pub spells: SpellBook,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            seed: 0,
            world: WorldId::WitheringTree,
            starting_level: 1,
            starting_wave: 1,
            spells: SpellBook::full(),
        }
    }
}

/// The core game simulation.
///
/// # Tick order
///
/// Each tick runs these steps in a fixed order so every client and
/// every replay computes the same state:
///
/// 1. **Spell timers** - cooldowns and active effects, expiry events
/// 2. **Player movement** - move input, deadzone, arena inset
/// 3. **Aura damage** - accumulated lightning/ice/blizzard pulses
/// 4. **Enemy behaviors** - ascending id order, effects deferred
/// 5. **Projectile flight** - linear, bouncing, boomerang, rock delays
/// 6. **Collision resolution** - unordered pairs, first-match rules
/// 7. **Auto-fire** - wand missile toward the aim point
/// 8. **Removal sweep** - flagged or out-of-bounds entities
/// 9. **Wave scheduling** - completion checks, breather, boss
/// 10. **Coin metronome** - passive income
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    /// Ticks advanced so far.
    tick: u64,
    /// Terminal-state latch.
    state: SimulationState,
    /// The play area.
    arena: Arena,
    /// The player avatar.
    player: Player,
    /// Live enemies, ascending id order.
    enemies: Vec<Enemy>,
    /// Live projectiles, ascending id order.
    projectiles: Vec<Projectile>,
    /// Wave pacing.
    scheduler: WaveScheduler,
    /// Seeded randomness; every draw goes through here.
    rng: GameRng,
    /// Next id to mint; enemies and projectiles share the space.
    next_entity_id: EntityId,
    /// Accumulator for the coin metronome.
    #[serde(with = "fixed_serde")]
    coin_accum: Fixed,
    /// Parameters the run started from.
    params: SimulationParams,
    /// Events produced by between-tick commands, drained into the
    /// next tick's output.
    #[serde(skip)]
    pending: TickEvents,
}

impl Simulation {
    /// Start a run.
    #[must_use]
    pub fn new(params: SimulationParams) -> Self {
        let arena = Arena::default();
        let start = Vec2Fixed::new(arena.width / 2, arena.height / 4);
        Self {
            tick: 0,
            state: SimulationState::Running,
            arena,
            player: Player::new(start, params.starting_level.max(1), params.spells),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            scheduler: WaveScheduler::starting_at(params.world, params.starting_wave.max(1)),
            rng: GameRng::new(params.seed),
            next_entity_id: 1,
            coin_accum: Fixed::ZERO,
            params,
            pending: TickEvents::default(),
        }
    }

    /// Ticks advanced so far.
    #[must_use]
    pub fn get_tick(&self) -> u64 {
        self.tick
    }

    /// Current run state.
    #[must_use]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Whether the run has ended.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, SimulationState::Running)
    }

    /// The player avatar.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Live enemies in ascending id order.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Live projectiles in ascending id order.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// The wave scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    /// The play area.
    #[must_use]
    pub fn arena(&self) -> Arena {
        self.arena
    }

    /// Parameters the run started from.
    #[must_use]
    pub fn params(&self) -> SimulationParams {
        self.params
    }

    /// Apply one input command between ticks.
    ///
    /// Commands against a terminal simulation are rejected with
    /// [`CastError::Halted`] and mutate nothing.
    pub fn apply_command(&mut self, command: Command) -> Result<(), CastError> {
        if self.is_terminal() {
            return Err(CastError::Halted);
        }
        match command {
            Command::SetMoveInput(input) => {
                self.player.set_move_input(input);
                Ok(())
            }
            Command::SetAimInput(input) => {
                self.player.set_aim_input(input);
                Ok(())
            }
            Command::CastSpell(kind) => {
                let action = self.player.cast_spell(kind)?;
                self.pending.push(Event::SpellCast { spell: kind });
                let cost = kind.mana_cost();
                if cost > 0 {
                    self.pending.push(Event::ManaSpent { amount: cost });
                }
                if let CastAction::LaunchFireball { from, toward } = action {
                    let id = self.mint_id();
                    self.projectiles.push(Projectile::fired(
                        id,
                        ProjectileKind::Fireball,
                        from,
                        toward,
                    ));
                }
                Ok(())
            }
        }
    }

    /// Advance the simulation by `dt` seconds (clamped to [`MAX_DT`]).
    ///
    /// A terminal simulation returns empty events and mutates nothing.
    pub fn tick(&mut self, dt: Fixed) -> TickEvents {
        if self.is_terminal() {
            return TickEvents::default();
        }
        let dt = dt.clamp(Fixed::ZERO, MAX_DT);
        let mut events = std::mem::take(&mut self.pending);
        self.tick += 1;

        // 1. Spell timers
        let spell_tick = self.player.tick_spells(dt);
        for spell in &spell_tick.expired {
            events.push(Event::SpellExpired { spell: *spell });
        }

        // 2. Player movement
        self.player.advance(dt, &self.arena);

        // 3. Aura damage
        self.apply_aura_pulses(&spell_tick.pulses, &mut events);

        // 4. Enemy behaviors. The blizzard slow is reasserted every
        // tick so enemies spawned mid-storm are caught too.
        let multiplier = if self.player.active.is_active(SpellKind::Blizzard) {
            Fixed::from_num(1) / Fixed::from_num(2)
        } else {
            Fixed::from_num(1)
        };
        let ctx = TickCtx {
            arena: self.arena,
            player_position: self.player.position,
        };
        let mut effects = Vec::new();
        for enemy in &mut self.enemies {
            enemy.speed_multiplier = multiplier;
            enemy.tick(dt, &ctx, &mut self.rng, &mut effects);
        }
        self.apply_behavior_effects(&effects, &mut events);

        // 5. Projectile flight
        for projectile in &mut self.projectiles {
            projectile.advance(dt, &self.arena);
        }

        // 6. Collision resolution
        self.resolve_collisions(&mut events);

        // 7. Auto-fire
        if let Some((from, toward)) = self.player.try_auto_fire(dt) {
            let id = self.mint_id();
            self.projectiles
                .push(Projectile::fired(id, ProjectileKind::WandMissile, from, toward));
        }

        // 8. Removal sweep
        self.sweep();

        // 9. Wave scheduling
        self.run_scheduler(dt, &mut events);

        // 10. Coin metronome
        if self.scheduler.world().passive_coins() {
            self.coin_accum += dt;
            while self.coin_accum >= COIN_INTERVAL {
                self.coin_accum -= COIN_INTERVAL;
                self.player.coins += 1;
                events.push(Event::CoinTick {
                    total: self.player.coins,
                });
            }
        }

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    /// Digest of the full mutable state. Two simulations fed the same
    /// seed and inputs report the same hash on the same tick.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.state.hash(&mut hasher);
        self.player.hash(&mut hasher);
        self.enemies.hash(&mut hasher);
        self.projectiles.hash(&mut hasher);
        self.scheduler.hash(&mut hasher);
        self.rng.hash(&mut hasher);
        self.next_entity_id.hash(&mut hasher);
        self.coin_accum.to_bits().hash(&mut hasher);
        hasher.finish()
    }

    /// Encode the full state.
    pub fn serialize(&self) -> Result<Vec<u8>, SimError> {
        bincode::serialize(self).map_err(|err| SimError::Serialize(err.to_string()))
    }

    /// Restore a simulation from [`Self::serialize`] output.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, SimError> {
        bincode::deserialize(bytes).map_err(|err| SimError::Deserialize(err.to_string()))
    }

    fn mint_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Damage one enemy, emitting hit/kill/XP/level events. Safe to
    /// call on an enemy that already died this tick.
    fn hit_enemy(&mut self, index: usize, amount: u32, events: &mut TickEvents) {
        let enemy = &mut self.enemies[index];
        if !enemy.alive() {
            return;
        }
        let id = enemy.id;
        let kind = enemy.kind;
        if enemy.take_damage(amount) {
            let xp = kind.xp_value();
            if kind.is_boss() {
                events.push(Event::BossDefeated);
            } else {
                events.push(Event::EnemyKilled { kind, xp });
            }
            events.push(Event::XpGained { amount: xp });
            let before = self.player.level;
            self.player.gain_xp(xp);
            for level in before + 1..=self.player.level {
                events.push(Event::LevelUp { level });
            }
        } else {
            events.push(Event::EnemyHit { id, kind, amount });
        }
    }

    /// Run one hit through the player's defense pipeline and emit the
    /// matching events, latching the terminal state on a fatal hit.
    fn apply_player_damage(&mut self, amount: u32, events: &mut TickEvents) {
        match self.player.apply_damage(amount) {
            DamageOutcome::Immune | DamageOutcome::AlreadyDown => {}
            DamageOutcome::Absorbed {
                cost,
                shield_dropped,
            } => {
                events.push(Event::ShieldAbsorbed { cost });
                if shield_dropped {
                    events.push(Event::SpellExpired {
                        spell: SpellKind::ManaShield,
                    });
                }
            }
            DamageOutcome::Harmed { amount } => {
                events.push(Event::DamageTaken { amount });
            }
            DamageOutcome::Revived { amount } => {
                events.push(Event::DamageTaken { amount });
                events.push(Event::PlayerRevived);
            }
            DamageOutcome::Fatal { amount } => {
                events.push(Event::DamageTaken { amount });
                let wave = self.scheduler.wave();
                events.push(Event::GameOver { wave });
                self.state = SimulationState::GameOver { wave };
            }
        }
    }

    /// Apply accumulated aura pulses to every live enemy in range.
    fn apply_aura_pulses(&mut self, pulses: &AuraPulses, events: &mut TickEvents) {
        if pulses.lightning == 0 && pulses.ice == 0 && pulses.blizzard == 0 {
            return;
        }
        let player_pos = self.player.position;
        let lightning_r = Fixed::from_num(LIGHTNING_AURA_RADIUS);
        let ice_r = Fixed::from_num(ICE_AURA_RADIUS);

        let mut hits: Vec<(usize, u32)> = Vec::new();
        for (index, enemy) in self.enemies.iter().enumerate() {
            if !enemy.alive() {
                continue;
            }
            let dist_sq = enemy.position.distance_squared(player_pos);
            let mut total = 0;
            if pulses.lightning > 0 && dist_sq <= lightning_r * lightning_r {
                total += pulses.lightning * LIGHTNING_PULSE_DAMAGE;
            }
            if pulses.ice > 0 && dist_sq <= ice_r * ice_r {
                total += pulses.ice * ICE_PULSE_DAMAGE;
            }
            // The blizzard covers the whole arena
            total += pulses.blizzard * BLIZZARD_PULSE_DAMAGE;
            if total > 0 {
                hits.push((index, total));
            }
        }
        for (index, amount) in hits {
            self.hit_enemy(index, amount, events);
        }
    }

    /// Apply the side effects queued by enemy behaviors.
    fn apply_behavior_effects(&mut self, effects: &[BehaviorEffect], events: &mut TickEvents) {
        for effect in effects {
            match *effect {
                BehaviorEffect::Fire { kind, from, toward } => {
                    let id = self.mint_id();
                    self.projectiles
                        .push(Projectile::fired(id, kind, from, toward));
                }
                BehaviorEffect::DropRock { x, delay } => {
                    let id = self.mint_id();
                    let top = self.arena.height + Fixed::from_num(ROCK_DROP_MARGIN);
                    self.projectiles.push(Projectile::rock(id, x, top, delay));
                }
                BehaviorEffect::Roared => events.push(Event::BossRoared),
                BehaviorEffect::Reinforcements => {
                    let orders = self.scheduler.reinforcement_orders(&self.arena, &mut self.rng);
                    self.spawn_orders(&orders);
                }
            }
        }
    }

    /// Mint enemies for a batch of spawn orders.
    fn spawn_orders(&mut self, orders: &[SpawnOrder]) {
        let scale = self.scheduler.world().enemy_hp_scale_percent();
        for order in orders {
            let id = self.mint_id();
            self.enemies.push(Enemy::new(
                id,
                order.kind,
                order.position,
                order.behavior,
                scale,
            ));
        }
    }

    /// Evaluate the collision rules against this step's configuration.
    ///
    /// All matches are collected before any damage is applied, so a
    /// wand hit and a body contact on the same walker in the same tick
    /// both land; the liveness checks inside the appliers turn the
    /// duplicate lethal effect into a no-op.
    fn resolve_collisions(&mut self, events: &mut TickEvents) {
        let player_pos = self.player.position;
        let player_radius = Fixed::from_num(PLAYER_RADIUS);

        // Rule 1: player shots against enemy bodies. A projectile is
        // spent on its first victim.
        let mut shot_hits: Vec<(usize, u32)> = Vec::new();
        for projectile in &mut self.projectiles {
            if !projectile.active() || !projectile.kind.player_owned() {
                continue;
            }
            for (index, enemy) in self.enemies.iter().enumerate() {
                if !enemy.alive() {
                    continue;
                }
                let pair = classify_pair(projectile.kind.category(), enemy.kind.category());
                if !matches!(pair, Some(PairEffect::PlayerShotHitsEnemy)) {
                    continue;
                }
                if circles_overlap(
                    projectile.position,
                    projectile.kind.radius(),
                    enemy.position,
                    enemy.kind.radius(),
                ) {
                    projectile.removed = true;
                    shot_hits.push((index, projectile.kind.damage()));
                    break;
                }
            }
        }

        // Rule 2: body contact with melee enemies
        let mut contacts: Vec<usize> = Vec::new();
        for (index, enemy) in self.enemies.iter().enumerate() {
            if !enemy.alive() {
                continue;
            }
            let pair = classify_pair(Category::PLAYER, enemy.kind.category());
            if !matches!(pair, Some(PairEffect::MeleeContact)) {
                continue;
            }
            if circles_overlap(player_pos, player_radius, enemy.position, enemy.kind.radius()) {
                contacts.push(index);
            }
        }

        // Rules 3 and 4: enemy fire against the player
        let mut incoming: Vec<(u32, bool)> = Vec::new();
        for projectile in &mut self.projectiles {
            if !projectile.active() || projectile.kind.player_owned() {
                continue;
            }
            let pair = classify_pair(Category::PLAYER, projectile.kind.category());
            let Some(PairEffect::EnemyShotHitsPlayer { from_boss }) = pair else {
                continue;
            };
            if circles_overlap(
                player_pos,
                player_radius,
                projectile.position,
                projectile.kind.radius(),
            ) {
                projectile.removed = true;
                incoming.push((projectile.kind.damage(), from_boss));
            }
        }

        for (index, amount) in shot_hits {
            self.hit_enemy(index, amount, events);
        }
        for index in contacts {
            // The contact explosion is the enemy's own death; whatever
            // HP the shots left, it all goes now.
            let remaining = self.enemies[index].hp.current;
            self.hit_enemy(index, remaining, events);
            self.apply_player_damage(MELEE_CONTACT_DAMAGE, events);
        }
        for (amount, from_boss) in incoming {
            if from_boss {
                events.push(Event::BossOrbExploded);
            }
            self.apply_player_damage(amount, events);
        }
    }

    /// Reclaim everything flagged removed or far out of bounds.
    fn sweep(&mut self) {
        let arena = self.arena;
        let enemy_margin = Fixed::from_num(ENEMY_SWEEP_MARGIN);
        let projectile_margin = Fixed::from_num(PROJECTILE_SWEEP_MARGIN);
        self.enemies
            .retain(|enemy| !enemy.removed && arena.contains_with_margin(enemy.position, enemy_margin));
        self.projectiles.retain(|projectile| {
            !projectile.removed
                && arena.contains_with_margin(projectile.position, projectile_margin)
        });
    }

    /// Advance the wave scheduler and apply its decisions.
    fn run_scheduler(&mut self, dt: Fixed, events: &mut TickEvents) {
        let outcome = self.scheduler.update(
            dt,
            &self.enemies,
            self.player.level,
            &self.arena,
            &mut self.rng,
        );
        if let Some(wave) = outcome.cleared {
            events.push(Event::WaveCleared { wave });
        }
        if let Some(wave) = outcome.started {
            events.push(Event::WaveStarted { wave });
        }
        if outcome.boss_entered {
            events.push(Event::BossSpawned);
        }
        self.spawn_orders(&outcome.spawns);

        if matches!(self.scheduler.phase(), WavePhase::WorldCleared) && !self.is_terminal() {
            self.state = SimulationState::WorldCleared;
        }
    }
}

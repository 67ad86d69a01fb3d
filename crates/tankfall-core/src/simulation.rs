//! Simulation module with the fixed-step tick pipeline.
//!
//! The `Simulation` struct owns the arena, the configuration, the only random
//! stream and every resolver, and advances them one fixed step at a time:
//!
//! 1. **TIMERS**: weapon cooldowns, regeneration, time-since-damage and
//!    projectile lifetimes
//! 2. **PILOTS**: player intent, queued host requests and AI brains become
//!    commands
//! 3. **COMMANDS**: progression, steering/aiming and firing resolve in order
//! 4. **MOTION**: every mover integrates, decays and clamps
//! 5. **CONTACTS**: overlaps become damage and knockback modifiers
//! 6. **MODIFIERS**: knockback and damage resolve; deaths pay experience
//! 7. **CLEANUP**: the dead and expired leave, the population refills and the
//!    tick advances
//!
//! # Determinism
//!
//! The simulation guarantees deterministic execution:
//! - Entities are iterated in ID order (via `BTreeMap`)
//! - Outputs are resolved in the order they were produced
//! - Every random draw comes from one `ChaCha8Rng` seeded by the master seed
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tankfall_core::config::SimConfig;
//! use tankfall_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new(SimConfig::default(), 42).unwrap();
//! let player = sim.spawn_player(Vec2::ZERO);
//! sim.populate();
//!
//! for _ in 0..10 {
//!     sim.step();
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! assert_eq!(sim.level(player), Some(1));
//! ```

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::arena::Arena;
use crate::class_tree::TankClass;
use crate::config::{ConfigError, SimConfig};
use crate::entity::{EntityId, EntityInner, EntityTag, ShapeComponents, ShapeKind, TankComponents};
use crate::health::HealthState;
use crate::math::within_bounds;
use crate::output::{Command, GameEvent, Output};
use crate::pilot::{ai_commands, player_commands, PlayerIntent};
use crate::population::{ShapeSpawner, TankSpawner};
use crate::progression::StatKind;
use crate::resolver::{
    dispatch, ArmamentResolver, CombatResolver, ContactDetector, EventLog, PhysicsResolver,
    ProgressionResolver, ResolveContext, Resolver,
};

// =============================================================================
// Simulation
// =============================================================================

/// The main simulation orchestrator.
///
/// `Simulation` manages:
/// - The arena and its entities
/// - Resolvers for output processing
/// - The contact detector and both spawners
/// - The host's player intent and queued upgrade requests
/// - The event log drained by the presentation layer
pub struct Simulation {
    /// Entity storage and spatial index.
    arena: Arena,
    /// Validated tuning.
    config: SimConfig,
    /// The only random stream.
    rng: ChaCha8Rng,
    /// Seed the random stream started from.
    master_seed: u64,
    /// Events awaiting the host.
    events: EventLog,
    /// Resolvers that process commands and modifiers.
    resolvers: Vec<Box<dyn Resolver>>,
    /// Drives the motion phase.
    physics: PhysicsResolver,
    /// Remembers which pairs are touching.
    contacts: ContactDetector,
    /// Keeps shapes topped up.
    shapes: ShapeSpawner,
    /// Brings in AI tanks.
    tanks: TankSpawner,
    /// Latest host input for the player tank.
    intent: PlayerIntent,
    /// Host upgrade requests for the next tick.
    pending: Vec<Command>,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("arena", &self.arena)
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .field("contacts", &self.contacts)
            .field("intent", &self.intent)
            .field("pending", &self.pending)
            .field("master_seed", &self.master_seed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a new simulation with an empty arena.
    ///
    /// # Arguments
    ///
    /// * `config` - Tuning; validated before anything is built
    /// * `seed` - Master seed for the random stream
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by [`SimConfig::validate`].
    ///
    /// # Example
    ///
    /// ```
    /// use tankfall_core::config::SimConfig;
    /// use tankfall_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new(SimConfig::default(), 12345).unwrap();
    /// assert_eq!(sim.tick(), 0);
    /// assert_eq!(sim.seed(), 12345);
    ///
    /// let mut broken = SimConfig::default();
    /// broken.physics.dt = 0.0;
    /// assert!(Simulation::new(broken, 1).is_err());
    /// ```
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(seed, "simulation created");

        Ok(Self {
            arena: Arena::with_bounds(config.arena.half_extent),
            rng: ChaCha8Rng::seed_from_u64(seed),
            master_seed: seed,
            events: EventLog::new(),
            resolvers: vec![
                Box::new(ProgressionResolver::new()),
                Box::new(PhysicsResolver::with_dt(config.physics.dt)),
                Box::new(ArmamentResolver::new()),
                Box::new(CombatResolver::new()),
            ],
            physics: PhysicsResolver::with_dt(config.physics.dt),
            contacts: ContactDetector::new(),
            shapes: ShapeSpawner::new(&config.population),
            tanks: TankSpawner::new(&config.population),
            intent: PlayerIntent::default(),
            pending: Vec::new(),
            config,
        })
    }

    // =========================================================================
    // Spawning
    // =========================================================================

    /// Spawns the player tank, or returns the existing one.
    pub fn spawn_player(&mut self, position: Vec2) -> EntityId {
        if let Some(id) = self.arena.player_id() {
            return id;
        }
        let tank = TankComponents::player(position, &self.config.tanks);
        self.spawn(EntityTag::Player, EntityInner::Tank(tank))
    }

    /// Spawns a level-1 AI tank.
    pub fn spawn_ai_tank(&mut self, position: Vec2) -> EntityId {
        let tank = TankComponents::ai(position, &self.config.tanks, &self.config.ai);
        self.spawn(EntityTag::Ai, EntityInner::Tank(tank))
    }

    /// Spawns a shape with its configured profile.
    pub fn spawn_shape(&mut self, kind: ShapeKind, position: Vec2) -> EntityId {
        let shape = ShapeComponents::new(kind, position, *self.config.shapes.profile(kind));
        self.spawn(EntityTag::Shape, EntityInner::Shape(shape))
    }

    /// Tops the arena up to `max_shapes` living shapes.
    pub fn populate(&mut self) {
        let plan = self
            .shapes
            .plan_refill(&self.arena, &self.config.population, &mut self.rng);
        for (kind, position) in plan {
            self.spawn_shape(kind, position);
        }
    }

    fn spawn(&mut self, tag: EntityTag, inner: EntityInner) -> EntityId {
        let id = self.arena.spawn(tag, inner);
        debug!(entity = %id, %tag, "spawned");
        self.events.push(GameEvent::EntitySpawned { entity: id, tag });
        id
    }

    // =========================================================================
    // Host input
    // =========================================================================

    /// Replaces the player's intent; it holds until replaced.
    pub fn set_player_intent(&mut self, intent: PlayerIntent) {
        self.intent = intent;
    }

    /// The intent currently applied to the player.
    #[must_use]
    pub const fn player_intent(&self) -> &PlayerIntent {
        &self.intent
    }

    /// Queues a stat-point spend for the next tick.
    ///
    /// Returns false when there is no player to receive it. Whether the point
    /// is actually spent is decided on the tick.
    pub fn request_stat_upgrade(&mut self, stat: StatKind) -> bool {
        let Some(target) = self.arena.player_id() else {
            return false;
        };
        self.pending.push(Command::UpgradeStat { target, stat });
        true
    }

    /// Like [`Simulation::request_stat_upgrade`], by stat name.
    ///
    /// Unknown names are rejected without queuing anything.
    pub fn request_stat_upgrade_named(&mut self, name: &str) -> bool {
        name.parse::<StatKind>()
            .is_ok_and(|stat| self.request_stat_upgrade(stat))
    }

    /// Queues a class change for the next tick.
    pub fn request_class_upgrade(&mut self, class: TankClass) -> bool {
        let Some(target) = self.arena.player_id() else {
            return false;
        };
        self.pending.push(Command::UpgradeClass { target, class });
        true
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Executes one simulation tick.
    pub fn step(&mut self) {
        let dt = self.config.physics.dt;
        self.advance_timers(dt);

        let mut commands = player_commands(&self.arena, &self.intent, &self.config);
        commands.append(&mut self.pending);
        commands.extend(ai_commands(&mut self.arena, &self.config, &mut self.rng));
        let commands: Vec<Output> = commands.into_iter().map(Output::from).collect();
        self.resolve(&commands);

        self.physics.integrate(&mut self.arena, &self.config);

        let modifiers = self.contacts.detect(&mut self.arena, &self.config);
        self.resolve(&modifiers);

        self.cleanup();
        if let Some(position) = self
            .tanks
            .tick(dt, &self.arena, &self.config.population, &mut self.rng)
        {
            self.spawn_ai_tank(position);
        }
        self.populate();
        self.arena.advance_tick();
    }

    fn resolve(&mut self, outputs: &[Output]) {
        let mut ctx = ResolveContext {
            config: &self.config,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        dispatch(&self.resolvers, outputs, &mut self.arena, &mut ctx);
    }

    fn advance_timers(&mut self, dt: f32) {
        for entity in self.arena.entities_sorted_mut() {
            let id = entity.id();
            match entity.inner_mut() {
                EntityInner::Tank(tank) => {
                    tank.weapon.tick(dt);
                    if tank.regenerate(dt) {
                        self.events.push(GameEvent::HealthChanged {
                            entity: id,
                            current: tank.health.current(),
                            max: tank.health.max(),
                        });
                    }
                    tank.health.tick(dt);
                }
                EntityInner::Shape(shape) => shape.health.tick(dt),
                EntityInner::Projectile(projectile) => projectile.lifetime_left -= dt,
            }
        }
    }

    /// Removes dead shapes and AI tanks, and spent or escaped projectiles.
    ///
    /// A dead player stays until [`Simulation::respawn_player`].
    fn cleanup(&mut self) {
        let half = self.arena.half_extent();
        let doomed: Vec<EntityId> = self
            .arena
            .entities_sorted()
            .filter(|entity| match entity.tag() {
                EntityTag::Player => false,
                EntityTag::Ai | EntityTag::Shape => entity.is_dead(),
                EntityTag::Projectile => entity
                    .as_projectile()
                    .is_some_and(|p| p.is_spent() || !within_bounds(p.transform.position, half)),
            })
            .map(|entity| entity.id())
            .collect();

        for id in doomed {
            if let Some(entity) = self.arena.despawn(id) {
                debug!(entity = %id, tag = %entity.tag(), "despawned");
            }
        }
    }

    /// Resets the player to a fresh level-1 tank at the origin and clears
    /// the arena around it.
    ///
    /// AI tanks, shapes and projectiles are removed, the spawners restart and
    /// shapes are repopulated. Returns `None` if there is no player.
    pub fn respawn_player(&mut self) -> Option<EntityId> {
        let id = self.arena.player_id()?;
        if let Some(tank) = self.arena.tank_mut(id) {
            tank.reset(Vec2::ZERO);
        }

        let removed = self
            .arena
            .despawn_tagged(&[EntityTag::Ai, EntityTag::Shape, EntityTag::Projectile]);
        self.arena.refresh_spatial();
        self.contacts.clear();
        self.tanks.reset();
        self.pending.clear();

        info!(entity = %id, removed = removed.len(), "player respawned");
        self.events.push(GameEvent::PlayerRespawned { entity: id });
        self.populate();
        Some(id)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Drains every event produced since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.events.take_events()
    }

    /// Health as a fraction of max, for anything with health.
    #[must_use]
    pub fn health_fraction(&self, id: EntityId) -> Option<f32> {
        self.health_of(id).map(HealthState::fraction)
    }

    /// Seconds since the entity last took damage.
    #[must_use]
    pub fn since_damage(&self, id: EntityId) -> Option<f32> {
        self.health_of(id).map(HealthState::since_damage)
    }

    /// A tank's level.
    #[must_use]
    pub fn level(&self, id: EntityId) -> Option<u32> {
        self.arena.tank(id).map(TankComponents::level)
    }

    /// A tank's progress toward its next level, in `[0, 1]`.
    #[must_use]
    pub fn experience_fraction(&self, id: EntityId) -> Option<f32> {
        self.arena.tank(id).map(|tank| tank.stats.experience_fraction())
    }

    /// A tank's current class.
    #[must_use]
    pub fn class_of(&self, id: EntityId) -> Option<TankClass> {
        self.arena.tank(id).map(TankComponents::current_class)
    }

    fn health_of(&self, id: EntityId) -> Option<&HealthState> {
        self.arena.get(id).and_then(|entity| entity.inner().health())
    }

    /// The player tank's ID, if one exists.
    #[must_use]
    pub fn player_id(&self) -> Option<EntityId> {
        self.arena.player_id()
    }

    /// True while the player exists and is dead.
    #[must_use]
    pub fn is_player_defeated(&self) -> bool {
        self.player_id()
            .and_then(|id| self.arena.tank(id))
            .is_some_and(|tank| !tank.is_alive())
    }

    /// Returns a reference to the arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns a mutable reference to the arena, for scripted setups.
    ///
    /// Call [`Arena::refresh_spatial`] after moving things by hand.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// The configuration this simulation runs on.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Returns the master seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.master_seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> Simulation {
        Simulation::new(SimConfig::sandbox(), 7).unwrap()
    }

    mod basic_tests {
        use super::*;

        #[test]
        fn new_rejects_invalid_config() {
            let mut config = SimConfig::default();
            config.physics.bounce_factor = 1.5;
            assert_eq!(
                Simulation::new(config, 0).unwrap_err(),
                ConfigError::InvalidBounce(1.5)
            );
        }

        #[test]
        fn step_advances_tick() {
            let mut sim = sandbox();
            sim.step();
            sim.step();
            assert_eq!(sim.tick(), 2);
        }

        #[test]
        fn player_is_unique() {
            let mut sim = sandbox();
            let first = sim.spawn_player(Vec2::ZERO);
            let second = sim.spawn_player(Vec2::new(100.0, 0.0));
            assert_eq!(first, second);
            assert_eq!(sim.arena().ids_with_tag(EntityTag::Player).len(), 1);
        }

        #[test]
        fn spawns_are_announced() {
            let mut sim = sandbox();
            let player = sim.spawn_player(Vec2::ZERO);
            let shape = sim.spawn_shape(ShapeKind::Square, Vec2::new(300.0, 0.0));
            assert_eq!(
                sim.take_events(),
                vec![
                    GameEvent::EntitySpawned { entity: player, tag: EntityTag::Player },
                    GameEvent::EntitySpawned { entity: shape, tag: EntityTag::Shape },
                ]
            );
        }

        #[test]
        fn populate_fills_to_cap() {
            let mut sim = Simulation::new(SimConfig::default(), 3).unwrap();
            sim.populate();
            assert_eq!(
                sim.arena().count_alive_with_tag(EntityTag::Shape),
                sim.config().population.max_shapes
            );
        }

        #[test]
        fn requests_need_a_player() {
            let mut sim = sandbox();
            assert!(!sim.request_stat_upgrade(StatKind::Health));
            sim.spawn_player(Vec2::ZERO);
            assert!(sim.request_stat_upgrade_named("reload"));
            assert!(!sim.request_stat_upgrade_named("luck"));
            assert!(sim.request_class_upgrade(TankClass::Twin));
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn presentation_queries() {
            let mut sim = sandbox();
            let player = sim.spawn_player(Vec2::ZERO);
            let shape = sim.spawn_shape(ShapeKind::Square, Vec2::new(500.0, 0.0));

            assert_eq!(sim.health_fraction(player), Some(1.0));
            assert_eq!(sim.level(player), Some(1));
            assert_eq!(sim.experience_fraction(player), Some(0.0));
            assert_eq!(sim.class_of(player), Some(TankClass::Basic));
            assert_eq!(sim.level(shape), None);
            assert_eq!(sim.health_fraction(shape), Some(1.0));
            assert_eq!(sim.health_fraction(EntityId::new(99)), None);
            assert!(!sim.is_player_defeated());
        }

        #[test]
        fn since_damage_counts_up_after_a_hit() {
            let mut sim = sandbox();
            let player = sim.spawn_player(Vec2::ZERO);
            sim.arena_mut().tank_mut(player).unwrap().health.apply_damage(5.0, None);
            for _ in 0..30 {
                sim.step();
            }
            let seconds = sim.since_damage(player).unwrap();
            assert!((seconds - 0.5).abs() < 1e-3);
        }
    }
}

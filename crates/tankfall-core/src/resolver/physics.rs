//! Physics resolver for steering, knockback and motion integration.
//!
//! The `PhysicsResolver` handles:
//! - `Steer` commands: set a tank's desired velocity
//! - `Aim` commands: turn a tank's barrels
//! - `Knockback` modifiers: push tanks and shapes
//! - Integration: advance every mover by one fixed step
//!
//! # Motion model
//!
//! Tanks keep two velocity terms. The pilot's desired velocity is replaced
//! by every `Steer`; knockback accumulates from hits and recoil and decays on
//! its own. Each step the tank moves by `desired + knockback × resistance`.
//!
//! Shapes only move when pushed and slow down under friction. Projectiles fly
//! in a straight line and are never clamped; leaving the arena retires them.
//!
//! # Fixed Timestep
//!
//! The physics resolver uses a fixed timestep of 1/60 seconds (60 FPS).
//! This ensures deterministic physics regardless of actual frame time.

use glam::Vec2;
use tracing::trace;

use crate::arena::Arena;
use crate::config::SimConfig;
use crate::entity::EntityId;
use crate::math::{cap_length, clamp_to_bounds, move_toward};
use crate::output::{Command, Modifier, Output, OutputKind};

use super::{ResolveContext, Resolver};

/// Fixed timestep for physics integration (1/60 second = ~16.67ms).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Pushes `target` along `direction`.
///
/// Tanks add `direction × force` to their knockback accumulator. Shapes gain
/// `direction × shape_knockback_force × force / resistance` of velocity. Both
/// are capped at `max_knockback_speed`. Dead or missing targets are ignored.
pub fn apply_knockback(
    arena: &mut Arena,
    target: EntityId,
    direction: Vec2,
    force: f32,
    config: &SimConfig,
) {
    let max = config.physics.max_knockback_speed;
    let Some(entity) = arena.get_mut(target) else {
        return;
    };
    if entity.is_dead() {
        return;
    }

    if let Some(tank) = entity.as_tank_mut() {
        tank.knockback = cap_length(tank.knockback + direction * force, max);
    } else if let Some(shape) = entity.as_shape_mut() {
        let resistance = shape.profile.knockback_resistance.max(f32::EPSILON);
        let push = direction * config.physics.shape_knockback_force * force / resistance;
        shape.velocity = cap_length(shape.velocity + push, max);
    }
}

/// Resolver for motion-related outputs and integration.
///
/// # Processing Order
///
/// 1. Apply `Steer` and `Aim` commands in order
/// 2. Apply `Knockback` modifiers in order
/// 3. [`PhysicsResolver::integrate`] is driven separately by the simulation,
///    between the command and modifier phases
///
/// # Example
///
/// ```
/// use tankfall_core::resolver::PhysicsResolver;
/// use tankfall_core::resolver::Resolver;
/// use tankfall_core::output::OutputKind;
///
/// let resolver = PhysicsResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Command));
/// assert!(resolver.handles().contains(&OutputKind::Modifier));
/// ```
#[derive(Debug, Clone)]
pub struct PhysicsResolver {
    /// Fixed timestep for physics integration
    dt: f32,
}

impl PhysicsResolver {
    /// Creates a new physics resolver with the default fixed timestep.
    #[must_use]
    pub fn new() -> Self {
        Self { dt: FIXED_DT }
    }

    /// Creates a physics resolver with a custom timestep.
    ///
    /// Useful for testing or non-standard tick rates.
    #[must_use]
    pub fn with_dt(dt: f32) -> Self {
        Self { dt }
    }

    /// Returns the timestep used for physics integration.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    fn apply_steer(arena: &mut Arena, target: EntityId, velocity: Vec2) {
        if let Some(tank) = arena.tank_mut(target).filter(|tank| tank.is_alive()) {
            tank.desired_velocity = velocity;
        }
    }

    fn apply_aim(arena: &mut Arena, target: EntityId, direction: Vec2) {
        let Some(direction) = direction.try_normalize() else {
            return;
        };
        if let Some(tank) = arena.tank_mut(target).filter(|tank| tank.is_alive()) {
            tank.aim = direction;
            tank.transform.rotation = direction.to_angle();
        }
    }

    /// Advances every mover by one step and re-syncs the spatial index.
    pub fn integrate(&self, arena: &mut Arena, config: &SimConfig) {
        let dt = self.dt;
        let half = arena.half_extent();
        let resistance = config.tanks.knockback_resistance;
        let tank_friction = config.tanks.knockback_friction * dt;
        let shape_friction = config.physics.shape_friction * dt;

        for entity in arena.entities_sorted_mut() {
            if let Some(tank) = entity.as_tank_mut() {
                if !tank.is_alive() {
                    tank.velocity = Vec2::ZERO;
                    continue;
                }
                tank.velocity = tank.desired_velocity + tank.knockback * resistance;
                tank.transform.position =
                    clamp_to_bounds(tank.transform.position + tank.velocity * dt, half);
                tank.knockback = move_toward(tank.knockback, Vec2::ZERO, tank_friction);
            } else if let Some(shape) = entity.as_shape_mut() {
                if shape.velocity == Vec2::ZERO {
                    continue;
                }
                shape.transform.position =
                    clamp_to_bounds(shape.transform.position + shape.velocity * dt, half);
                shape.velocity = move_toward(shape.velocity, Vec2::ZERO, shape_friction);
            } else if let Some(projectile) = entity.as_projectile_mut() {
                projectile.transform.position += projectile.velocity() * dt;
            }
        }

        arena.refresh_spatial();
        trace!(tick = arena.current_tick(), "integrated motion");
    }
}

impl Default for PhysicsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver for PhysicsResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Command, OutputKind::Modifier]
    }

    fn resolve(&self, outputs: &[&Output], arena: &mut Arena, ctx: &mut ResolveContext<'_>) {
        for output in outputs {
            if let Some(command) = output.as_command() {
                match command {
                    Command::Steer { target, velocity } => {
                        Self::apply_steer(arena, *target, *velocity);
                    }
                    Command::Aim { target, direction } => {
                        Self::apply_aim(arena, *target, *direction);
                    }
                    Command::Fire { .. }
                    | Command::UpgradeStat { .. }
                    | Command::UpgradeClass { .. } => {}
                }
            } else if let Some(Modifier::Knockback { target, direction, force }) =
                output.as_modifier()
            {
                apply_knockback(arena, *target, *direction, *force, ctx.config);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeTuning;
    use crate::entity::{EntityInner, EntityTag, ShapeComponents, ShapeKind, TankComponents};
    use crate::resolver::EventLog;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spawn_tank(arena: &mut Arena, position: Vec2) -> EntityId {
        let tank = TankComponents::player(position, &SimConfig::default().tanks);
        arena.spawn(EntityTag::Player, EntityInner::Tank(tank))
    }

    fn spawn_shape(arena: &mut Arena, kind: ShapeKind, position: Vec2) -> EntityId {
        let profile = *ShapeTuning::default().profile(kind);
        let shape = ShapeComponents::new(kind, position, profile);
        arena.spawn(EntityTag::Shape, EntityInner::Shape(shape))
    }

    fn resolve(arena: &mut Arena, outputs: Vec<Output>) {
        let config = SimConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut events = EventLog::new();
        let mut ctx = ResolveContext { config: &config, rng: &mut rng, events: &mut events };
        let refs: Vec<&Output> = outputs.iter().collect();
        PhysicsResolver::new().resolve(&refs, arena, &mut ctx);
    }

    mod resolver_trait_tests {
        use super::*;

        #[test]
        fn default_uses_fixed_dt() {
            assert!((PhysicsResolver::default().dt() - FIXED_DT).abs() < f32::EPSILON);
            assert!((PhysicsResolver::with_dt(0.5).dt() - 0.5).abs() < f32::EPSILON);
        }
    }

    mod command_tests {
        use super::*;

        #[test]
        fn steer_sets_desired_velocity() {
            let mut arena = Arena::new();
            let id = spawn_tank(&mut arena, Vec2::ZERO);
            resolve(
                &mut arena,
                vec![Command::Steer { target: id, velocity: Vec2::new(300.0, 0.0) }.into()],
            );
            assert_eq!(arena.tank(id).map(|t| t.desired_velocity), Some(Vec2::new(300.0, 0.0)));
        }

        #[test]
        fn aim_normalizes_and_ignores_zero() {
            let mut arena = Arena::new();
            let id = spawn_tank(&mut arena, Vec2::ZERO);
            let aim = Command::Aim { target: id, direction: Vec2::new(0.0, 5.0) };
            resolve(&mut arena, vec![aim.into()]);
            let tank = arena.tank(id).unwrap();
            assert!((tank.aim - Vec2::Y).length() < 1e-6);
            assert!((tank.transform.rotation - std::f32::consts::FRAC_PI_2).abs() < 1e-6);

            resolve(&mut arena, vec![Command::Aim { target: id, direction: Vec2::ZERO }.into()]);
            assert!((arena.tank(id).unwrap().aim - Vec2::Y).length() < 1e-6);
        }

        #[test]
        fn dead_tank_ignores_steering() {
            let mut arena = Arena::new();
            let id = spawn_tank(&mut arena, Vec2::ZERO);
            arena.tank_mut(id).unwrap().health.apply_damage(1000.0, None);
            resolve(&mut arena, vec![Command::Steer { target: id, velocity: Vec2::X }.into()]);
            assert_eq!(arena.tank(id).unwrap().desired_velocity, Vec2::ZERO);
        }
    }

    mod knockback_tests {
        use super::*;

        #[test]
        fn tank_knockback_accumulates_and_caps() {
            let mut arena = Arena::new();
            let id = spawn_tank(&mut arena, Vec2::ZERO);
            let config = SimConfig::default();
            apply_knockback(&mut arena, id, Vec2::X, 300.0, &config);
            assert!((arena.tank(id).unwrap().knockback.x - 300.0).abs() < 1e-3);

            apply_knockback(&mut arena, id, Vec2::X, 5000.0, &config);
            let length = arena.tank(id).unwrap().knockback.length();
            assert!((length - config.physics.max_knockback_speed).abs() < 1e-2);
        }

        #[test]
        fn shape_knockback_divides_by_resistance() {
            let mut arena = Arena::new();
            let config = SimConfig::default();
            let id = spawn_shape(&mut arena, ShapeKind::Square, Vec2::ZERO);
            let resistance = arena.shape(id).unwrap().profile.knockback_resistance;
            resolve(
                &mut arena,
                vec![Modifier::Knockback { target: id, direction: Vec2::Y, force: 1.0 }.into()],
            );
            let expected = (config.physics.shape_knockback_force / resistance)
                .min(config.physics.max_knockback_speed);
            assert!((arena.shape(id).unwrap().velocity.y - expected).abs() < 1e-2);
        }
    }

    mod integration_tests {
        use super::*;

        #[test]
        fn tank_moves_by_desired_plus_scaled_knockback() {
            let mut arena = Arena::new();
            let config = SimConfig::default();
            let id = spawn_tank(&mut arena, Vec2::ZERO);
            {
                let tank = arena.tank_mut(id).unwrap();
                tank.desired_velocity = Vec2::new(60.0, 0.0);
                tank.knockback = Vec2::new(0.0, 120.0);
            }
            PhysicsResolver::new().integrate(&mut arena, &config);

            let tank = arena.tank(id).unwrap();
            assert!((tank.transform.position.x - 1.0).abs() < 1e-4);
            assert!((tank.transform.position.y - 1.0).abs() < 1e-4);
            // 500/s friction over one 1/60 step
            assert!((tank.knockback.y - (120.0 - 500.0 / 60.0)).abs() < 1e-3);
        }

        #[test]
        fn tank_is_clamped_to_arena() {
            let mut arena = Arena::with_bounds(Vec2::splat(100.0));
            let id = spawn_tank(&mut arena, Vec2::new(99.0, 0.0));
            arena.tank_mut(id).unwrap().desired_velocity = Vec2::new(600.0, 0.0);
            PhysicsResolver::new().integrate(&mut arena, &SimConfig::default());
            assert!((arena.tank(id).unwrap().transform.position.x - 100.0).abs() < 1e-4);
        }

        #[test]
        fn shape_slides_and_stops() {
            let mut arena = Arena::new();
            let config = SimConfig::default();
            let id = spawn_shape(&mut arena, ShapeKind::Square, Vec2::ZERO);
            arena.shape_mut(id).unwrap().velocity = Vec2::new(10.0, 0.0);

            let physics = PhysicsResolver::new();
            for _ in 0..60 {
                physics.integrate(&mut arena, &config);
            }
            let shape = arena.shape(id).unwrap();
            assert_eq!(shape.velocity, Vec2::ZERO);
            assert!(shape.transform.position.x > 0.0);
            assert!(shape.transform.position.x < 10.0);
        }

        #[test]
        fn spatial_index_follows_motion() {
            let mut arena = Arena::new();
            let id = spawn_tank(&mut arena, Vec2::ZERO);
            arena.tank_mut(id).unwrap().desired_velocity = Vec2::new(600.0, 0.0);
            PhysicsResolver::new().integrate(&mut arena, &SimConfig::default());
            let indexed = arena.spatial().get(id).unwrap();
            assert!((indexed.x - 10.0).abs() < 1e-4);
        }
    }
}

//! Contact detection: overlaps become damage and knockback.
//!
//! The detector reads overlapping pairs from the arena's spatial index once
//! per tick and classifies each pair by faction:
//!
//! | Pair               | When            | Effect                                        |
//! |--------------------|-----------------|-----------------------------------------------|
//! | shape ↔ shape      | every tick      | bounce (applied here), impact damage to both  |
//! | tank ↔ shape       | contact begins  | contact and body damage, both pushed apart    |
//! | tank ↔ tank        | contact begins  | each rams the other, both pushed apart        |
//! | projectile → other | first overlap   | projectile damage and knockback               |
//!
//! Shape bounces change velocities directly since both sides are known here.
//! Everything else is returned as [`Modifier`] outputs for the combat and
//! physics resolvers. Because pairs come out of the index sorted and unique,
//! each contact is processed once per tick no matter which side "saw" it.

use std::collections::BTreeSet;

use glam::Vec2;
use tracing::trace;

use crate::arena::Arena;
use crate::config::SimConfig;
use crate::entity::{Entity, EntityId, EntityTag};
use crate::health::DamageSource;
use crate::output::{Modifier, Output};

/// Knockback multiplier a shape receives when a tank runs into it.
pub const SHAPE_CONTACT_FORCE: f32 = 1.0;

/// Shape impact force is divided by this to get the damage multiplier.
const IMPACT_DAMAGE_DIVISOR: f32 = 100.0;

/// Tracks which pairs were touching last tick.
#[derive(Debug, Clone, Default)]
pub struct ContactDetector {
    active: BTreeSet<(EntityId, EntityId)>,
}

impl ContactDetector {
    /// Creates a detector with no remembered contacts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pairs touching at the last detection.
    #[must_use]
    pub fn active_contacts(&self) -> usize {
        self.active.len()
    }

    /// Forgets every remembered contact.
    pub fn clear(&mut self) {
        self.active.clear();
    }

    /// Processes this tick's overlaps.
    ///
    /// Shape bounces and projectile hit bookkeeping are applied to `arena`
    /// immediately; damage and knockback are returned as modifiers.
    pub fn detect(&mut self, arena: &mut Arena, config: &SimConfig) -> Vec<Output> {
        let pairs = arena.spatial().overlapping_pairs();
        let mut outputs = Vec::new();

        for &(a, b) in &pairs {
            let (tag_a, tag_b) = match (arena.get(a), arena.get(b)) {
                (Some(ea), Some(eb)) if !ea.is_dead() && !eb.is_dead() => (ea.tag(), eb.tag()),
                _ => continue,
            };
            let entered = !self.active.contains(&(a, b));

            match (tag_a, tag_b) {
                (EntityTag::Shape, EntityTag::Shape) => {
                    Self::shape_bounce(arena, a, b, config, &mut outputs);
                }
                (EntityTag::Projectile, _) => {
                    Self::projectile_hit(arena, a, b, config, &mut outputs);
                }
                (_, EntityTag::Projectile) => {
                    Self::projectile_hit(arena, b, a, config, &mut outputs);
                }
                (EntityTag::Shape, _) if entered => {
                    Self::tank_meets_shape(arena, b, a, config, &mut outputs);
                }
                (_, EntityTag::Shape) if entered => {
                    Self::tank_meets_shape(arena, a, b, config, &mut outputs);
                }
                _ if entered => Self::tank_meets_tank(arena, a, b, config, &mut outputs),
                _ => {}
            }
        }

        trace!(pairs = pairs.len(), outputs = outputs.len(), "contacts detected");
        self.active = pairs.into_iter().collect();
        outputs
    }

    fn shape_bounce(
        arena: &mut Arena,
        a: EntityId,
        b: EntityId,
        config: &SimConfig,
        outputs: &mut Vec<Output>,
    ) {
        let (Some(sa), Some(sb)) = (arena.shape(a), arena.shape(b)) else {
            return;
        };
        let relative = sa.velocity - sb.velocity;
        let speed = relative.length();
        if speed <= config.physics.min_collision_speed {
            return;
        }

        let direction = (sb.transform.position - sa.transform.position)
            .try_normalize()
            .unwrap_or(Vec2::X);
        let force = speed * config.physics.collision_force_scale;
        let total_mass = (sa.profile.mass + sb.profile.mass).max(f32::EPSILON);
        let bounce = config.physics.bounce_factor;

        let a_velocity = sa.velocity - direction * force * (sb.profile.mass / total_mass) * bounce;
        let b_velocity = sb.velocity + direction * force * (sa.profile.mass / total_mass) * bounce;

        let impact = force / IMPACT_DAMAGE_DIVISOR;
        let a_damage = sb.profile.contact_damage * impact;
        let b_damage = sa.profile.contact_damage * impact;

        if let Some(shape) = arena.shape_mut(a) {
            shape.velocity = a_velocity;
        }
        if let Some(shape) = arena.shape_mut(b) {
            shape.velocity = b_velocity;
        }

        outputs.push(damage(a, a_damage, DamageSource::Shape(b)));
        outputs.push(damage(b, b_damage, DamageSource::Shape(a)));
    }

    fn tank_meets_shape(
        arena: &Arena,
        tank: EntityId,
        shape: EntityId,
        config: &SimConfig,
        outputs: &mut Vec<Output>,
    ) {
        let (Some(t), Some(s)) = (arena.tank(tank), arena.shape(shape)) else {
            return;
        };
        let direction = (s.transform.position - t.transform.position)
            .try_normalize()
            .unwrap_or(Vec2::X);

        outputs.push(damage(tank, s.profile.contact_damage, DamageSource::Shape(shape)));
        outputs.push(damage(shape, t.stats.body_damage, DamageSource::Tank(tank)));
        outputs.push(knockback(shape, direction, SHAPE_CONTACT_FORCE));
        outputs.push(knockback(tank, -direction, config.physics.tank_contact_push));
    }

    fn tank_meets_tank(
        arena: &Arena,
        a: EntityId,
        b: EntityId,
        config: &SimConfig,
        outputs: &mut Vec<Output>,
    ) {
        let (Some(ta), Some(tb)) = (arena.tank(a), arena.tank(b)) else {
            return;
        };
        let direction = (tb.transform.position - ta.transform.position)
            .try_normalize()
            .unwrap_or(Vec2::X);
        let push = config.physics.tank_contact_push;

        outputs.push(damage(a, tb.stats.body_damage, DamageSource::Tank(b)));
        outputs.push(damage(b, ta.stats.body_damage, DamageSource::Tank(a)));
        outputs.push(knockback(a, -direction, push));
        outputs.push(knockback(b, direction, push));
    }

    fn projectile_hit(
        arena: &mut Arena,
        projectile: EntityId,
        target: EntityId,
        config: &SimConfig,
        outputs: &mut Vec<Output>,
    ) {
        let Some(target_is_tank) = arena.get(target).map(Entity::is_tank) else {
            return;
        };
        let Some(p) = arena.projectile_mut(projectile) else {
            return;
        };
        if !p.can_strike(target) {
            return;
        }
        p.register_hit(target);

        let force = if target_is_tank {
            config.projectiles.tank_knockback
        } else {
            config.projectiles.shape_knockback
        };
        outputs.push(damage(
            target,
            p.damage,
            DamageSource::Projectile { projectile, owner: p.owner },
        ));
        outputs.push(knockback(target, p.direction, force));
    }
}

fn damage(target: EntityId, amount: f32, source: DamageSource) -> Output {
    Modifier::ApplyDamage { target, amount, source }.into()
}

fn knockback(target: EntityId, direction: Vec2, force: f32) -> Output {
    Modifier::Knockback { target, direction, force }.into()
}

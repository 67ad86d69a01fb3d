//! Combat resolver for damage, deaths and experience.
//!
//! The `CombatResolver` handles `ApplyDamage` modifiers. Damage goes through
//! each entity's health model, which records the responsible tank. When
//! something dies the resolver works out who gets the kill and pays them.
//!
//! # Kill attribution
//!
//! Only tanks are ever credited. A shape never takes credit itself, so a kill
//! delivered by a shape falls back to the tanks that touched the shapes:
//!
//! - A shape dying keeps the tank that last hit *it*; failing that, the tank
//!   that last hit the shape that finished it off.
//! - A tank killed by a shape credits the tank that last hit that shape;
//!   failing that, the victim's own last attacker.
//! - Anything else credits the victim's last attacker.
//!
//! A tank never earns experience from its own death, and a dead killer earns
//! nothing.
//!
//! # Destruction Handling
//!
//! Dead entities stay in the arena until the simulation's cleanup phase, so
//! later modifiers in the same tick see them as dead and are ignored.

use tracing::{info, trace};

use crate::arena::Arena;
use crate::entity::{Entity, EntityId, EntityTag};
use crate::health::{DamageOutcome, DamageSource, HealthState};
use crate::output::{GameEvent, Modifier, Output, OutputKind};
use crate::progression::tank_kill_experience;

use super::{ResolveContext, Resolver};

/// Resolver for damage modifiers.
///
/// # Processing Order
///
/// Modifiers apply in output order. Damage to an already-dead entity is
/// ignored, so the first lethal hit decides the kill credit.
///
/// # Example
///
/// ```
/// use tankfall_core::resolver::CombatResolver;
/// use tankfall_core::resolver::Resolver;
/// use tankfall_core::output::OutputKind;
///
/// let resolver = CombatResolver::new();
/// assert!(resolver.handles().contains(&OutputKind::Modifier));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn apply_damage(
        arena: &mut Arena,
        ctx: &mut ResolveContext<'_>,
        target: EntityId,
        amount: f32,
        source: DamageSource,
    ) {
        // Credit only tanks that still exist
        let credit = source.credited_tank().filter(|id| arena.tank(*id).is_some());
        let Some(entity) = arena.get_mut(target) else {
            return;
        };
        let tag = entity.tag();
        let Some(health) = entity.inner_mut().health_mut() else {
            return;
        };

        let outcome = health.apply_damage(amount, credit);
        if outcome == DamageOutcome::Ignored {
            return;
        }
        trace!(entity = %target, amount, remaining = health.current(), "damage applied");
        if tag.is_tank() {
            ctx.events.push(GameEvent::HealthChanged {
                entity: target,
                current: health.current(),
                max: health.max(),
            });
        }

        if outcome == DamageOutcome::Killed {
            Self::on_death(arena, ctx, target, tag, source);
        }
    }

    /// Picks the tank credited with killing `victim`.
    fn resolve_killer(
        arena: &Arena,
        victim: EntityId,
        tag: EntityTag,
        source: DamageSource,
    ) -> Option<EntityId> {
        let own = arena
            .get(victim)
            .and_then(|entity| entity.inner().health())
            .and_then(HealthState::last_attacker);
        let via_shape = match source {
            DamageSource::Shape(shape) => arena.shape(shape).and_then(|s| s.health.last_attacker()),
            DamageSource::Tank(_) | DamageSource::Projectile { .. } => None,
        };

        match tag {
            EntityTag::Shape => own.or(via_shape),
            _ if source.is_shape() => via_shape.or(own),
            _ => own,
        }
    }

    fn on_death(
        arena: &mut Arena,
        ctx: &mut ResolveContext<'_>,
        victim: EntityId,
        tag: EntityTag,
        source: DamageSource,
    ) {
        let killer = Self::resolve_killer(arena, victim, tag, source).filter(|id| *id != victim);

        let reward = arena.get(victim).and_then(reward_for);
        if let (Some(killer), Some((amount, label))) = (killer, reward) {
            Self::award(arena, ctx, killer, victim, amount, label);
        }

        if tag == EntityTag::Player {
            info!(entity = %victim, killer = ?killer, "player defeated");
            ctx.events.push(GameEvent::PlayerDefeated { entity: victim, killer });
        } else {
            trace!(entity = %victim, %tag, killer = ?killer, "entity destroyed");
            ctx.events.push(GameEvent::EntityDestroyed { entity: victim, tag, killer });
        }
    }

    fn award(
        arena: &mut Arena,
        ctx: &mut ResolveContext<'_>,
        killer: EntityId,
        victim: EntityId,
        amount: f32,
        label: String,
    ) {
        let Some(tank) = arena.tank_mut(killer).filter(|tank| tank.is_alive()) else {
            return;
        };
        let level_ups = tank.add_experience(amount);

        info!(entity = %killer, amount, victim = %victim, %label, "experience awarded");
        ctx.events.push(GameEvent::ExperienceGained {
            entity: killer,
            amount,
            source: victim,
            label,
        });

        for up in level_ups {
            info!(entity = %killer, level = up.level, points = up.available_points, "level up");
            ctx.events.push(GameEvent::LevelUp {
                entity: killer,
                level: up.level,
                points: up.available_points,
            });
            if up.tier_unlocked {
                ctx.events.push(GameEvent::UpgradeAvailable { entity: killer, level: up.level });
            }
        }
    }
}

/// Experience and display label paid for destroying `entity`.
fn reward_for(entity: &Entity) -> Option<(f32, String)> {
    if let Some(shape) = entity.as_shape() {
        Some((shape.profile.experience, shape.kind.name().to_string()))
    } else {
        entity
            .as_tank()
            .map(|tank| (tank_kill_experience(tank.level()), tank.current_class().to_string()))
    }
}

impl Resolver for CombatResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Modifier]
    }

    fn resolve(&self, outputs: &[&Output], arena: &mut Arena, ctx: &mut ResolveContext<'_>) {
        for output in outputs {
            if let Some(Modifier::ApplyDamage { target, amount, source }) = output.as_modifier() {
                Self::apply_damage(arena, ctx, *target, *amount, *source);
            }
        }
    }
}

//! Progression resolver: stat-point spending and class upgrades.
//!
//! Requests that can't be honoured (no points left, or a class not reachable
//! at the current level) are dropped without an event.

use tracing::{debug, info};

use crate::arena::Arena;
use crate::class_tree::TankClass;
use crate::entity::EntityId;
use crate::output::{Command, GameEvent, Output, OutputKind};
use crate::progression::StatKind;

use super::{ResolveContext, Resolver};

/// Resolver for `UpgradeStat` and `UpgradeClass` commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressionResolver;

impl ProgressionResolver {
    /// Creates a new progression resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn upgrade_stat(
        arena: &mut Arena,
        ctx: &mut ResolveContext<'_>,
        target: EntityId,
        stat: StatKind,
    ) {
        let Some(tank) = arena.tank_mut(target) else {
            return;
        };
        if !tank.upgrade_stat(stat) {
            debug!(entity = %target, stat = stat.name(), "stat upgrade rejected");
            return;
        }

        ctx.events.push(GameEvent::StatUpgraded {
            entity: target,
            stat,
            remaining: tank.stats.available_points(),
        });
        if stat == StatKind::Health {
            ctx.events.push(GameEvent::HealthChanged {
                entity: target,
                current: tank.health.current(),
                max: tank.health.max(),
            });
        }
    }

    fn upgrade_class(
        arena: &mut Arena,
        ctx: &mut ResolveContext<'_>,
        target: EntityId,
        class: TankClass,
    ) {
        let Some(tank) = arena.tank_mut(target) else {
            return;
        };
        let from = tank.current_class();
        if !tank.upgrade_class(class) {
            debug!(entity = %target, %from, to = %class, "class upgrade rejected");
            return;
        }

        info!(entity = %target, %from, to = %class, level = tank.level(), "class changed");
        ctx.events.push(GameEvent::ClassChanged { entity: target, class });
    }
}

impl Resolver for ProgressionResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Command]
    }

    fn resolve(&self, outputs: &[&Output], arena: &mut Arena, ctx: &mut ResolveContext<'_>) {
        for output in outputs {
            match output.as_command() {
                Some(Command::UpgradeStat { target, stat }) => {
                    Self::upgrade_stat(arena, ctx, *target, *stat);
                }
                Some(Command::UpgradeClass { target, class }) => {
                    Self::upgrade_class(arena, ctx, *target, *class);
                }
                _ => {}
            }
        }
    }
}

//! Armament resolver: turns `Fire` commands into projectiles.
//!
//! A volley fires every muzzle of the tank's current layout at once, using the
//! tank's stats for bullet speed, damage, penetration and spread. The reload
//! timer lives on the weapon, so repeated `Fire` commands inside the cooldown
//! are simply dropped. Each volley kicks the tank backwards through its
//! knockback accumulator.

use glam::Vec2;
use tracing::debug;

use crate::arena::Arena;
use crate::entity::{EntityId, EntityInner, EntityTag, ProjectileComponents};
use crate::math::cap_length;
use crate::output::{Command, GameEvent, Output, OutputKind};
use crate::weapon::FireRequest;

use super::{ResolveContext, Resolver};

/// Resolver for `Fire` commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmamentResolver;

impl ArmamentResolver {
    /// Creates a new armament resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fire(arena: &mut Arena, ctx: &mut ResolveContext<'_>, shooter: EntityId, at: Option<Vec2>) {
        let config = ctx.config;
        let Some(tank) = arena.tank_mut(shooter) else {
            return;
        };
        if !tank.is_alive() {
            return;
        }

        let request = FireRequest {
            origin: tank.transform.position,
            aim: tank.aim,
            target: at,
        };
        let Some(volley) = tank.weapon.fire(&request, &tank.stats, &mut *ctx.rng) else {
            return;
        };

        tank.knockback = cap_length(
            tank.knockback + volley.recoil * config.tanks.recoil_force,
            config.physics.max_knockback_speed,
        );

        for spec in &volley.projectiles {
            let projectile = ProjectileComponents::launch(spec, Some(shooter), &config.projectiles);
            arena.spawn(EntityTag::Projectile, EntityInner::Projectile(projectile));
        }

        debug!(entity = %shooter, projectiles = volley.projectiles.len(), "volley fired");
        ctx.events.push(GameEvent::VolleyFired {
            entity: shooter,
            projectiles: volley.projectiles.len(),
        });
    }
}

impl Resolver for ArmamentResolver {
    fn handles(&self) -> &[OutputKind] {
        &[OutputKind::Command]
    }

    fn resolve(&self, outputs: &[&Output], arena: &mut Arena, ctx: &mut ResolveContext<'_>) {
        for output in outputs {
            if let Some(Command::Fire { target, at }) = output.as_command() {
                Self::fire(arena, ctx, *target, *at);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class_tree::TankClass;
    use crate::config::SimConfig;
    use crate::entity::TankComponents;
    use crate::resolver::EventLog;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spawn_tank(arena: &mut Arena, config: &SimConfig) -> EntityId {
        let tank = TankComponents::player(Vec2::ZERO, &config.tanks);
        arena.spawn(EntityTag::Player, EntityInner::Tank(tank))
    }

    fn fire(
        arena: &mut Arena,
        config: &SimConfig,
        shooter: EntityId,
        times: usize,
    ) -> Vec<GameEvent> {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut events = EventLog::new();
        let outputs: Vec<Output> = (0..times)
            .map(|_| Command::Fire { target: shooter, at: None }.into())
            .collect();
        let refs: Vec<&Output> = outputs.iter().collect();
        {
            let mut ctx = ResolveContext { config, rng: &mut rng, events: &mut events };
            ArmamentResolver::new().resolve(&refs, arena, &mut ctx);
        }
        events.take_events()
    }

    #[test]
    fn fire_spawns_owned_projectile() {
        let config = SimConfig::default();
        let mut arena = Arena::new();
        let id = spawn_tank(&mut arena, &config);

        let events = fire(&mut arena, &config, id, 1);
        assert_eq!(events, vec![GameEvent::VolleyFired { entity: id, projectiles: 1 }]);

        let projectiles = arena.ids_with_tag(EntityTag::Projectile);
        assert_eq!(projectiles.len(), 1);
        let projectile = arena.projectile(projectiles[0]).unwrap();
        assert_eq!(projectile.owner, Some(id));
        assert!(projectile.direction.x > 0.99);
        assert!(projectile.transform.position.x > 0.0);
    }

    #[test]
    fn recoil_pushes_tank_backwards() {
        let config = SimConfig::default();
        let mut arena = Arena::new();
        let id = spawn_tank(&mut arena, &config);
        fire(&mut arena, &config, id, 1);

        let knockback = arena.tank(id).unwrap().knockback;
        assert!((knockback.x + config.tanks.recoil_force).abs() < 1e-3);
    }

    #[test]
    fn cooldown_limits_to_one_volley() {
        let config = SimConfig::default();
        let mut arena = Arena::new();
        let id = spawn_tank(&mut arena, &config);

        let events = fire(&mut arena, &config, id, 3);
        assert_eq!(events.len(), 1);
        assert_eq!(arena.ids_with_tag(EntityTag::Projectile).len(), 1);
    }

    #[test]
    fn dead_tank_cannot_fire() {
        let config = SimConfig::default();
        let mut arena = Arena::new();
        let id = spawn_tank(&mut arena, &config);
        arena.tank_mut(id).unwrap().health.apply_damage(1.0e6, None);

        assert!(fire(&mut arena, &config, id, 1).is_empty());
        assert!(arena.ids_with_tag(EntityTag::Projectile).is_empty());
    }

    #[test]
    fn smasher_has_no_barrels() {
        let config = SimConfig::default();
        let mut arena = Arena::new();
        let id = spawn_tank(&mut arena, &config);
        {
            let tank = arena.tank_mut(id).unwrap();
            tank.add_experience(1.0e9);
            assert!(tank.upgrade_class(TankClass::Smasher));
        }

        assert!(fire(&mut arena, &config, id, 1).is_empty());
    }
}

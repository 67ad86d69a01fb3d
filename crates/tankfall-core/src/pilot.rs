//! Pilots: where tank commands come from.
//!
//! Tanks are driven either by the host (through a [`PlayerIntent`]) or by an
//! [`AiBrain`](crate::ai::AiBrain). Both only ever emit [`Command`]s; the
//! resolvers decide what actually happens, so a player and an AI tank with
//! the same stats behave identically.
//!
//! # Outputs
//!
//! - Player: `Steer`, `Aim` when an aim point is set, `Fire` while the
//!   trigger is held (down the barrels).
//! - AI: `Steer`, `Aim` and `Fire` (at the opponent) on each decision beat;
//!   `UpgradeStat`/`UpgradeClass` on each upgrade beat.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ai::{AiBrain, AiView};
use crate::arena::Arena;
use crate::config::SimConfig;
use crate::entity::{EntityTag, Pilot};
use crate::output::Command;

/// What the host wants the player tank to do this tick.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use tankfall_core::pilot::PlayerIntent;
///
/// let intent = PlayerIntent {
///     movement: Vec2::new(1.0, 1.0),
///     aim_point: Some(Vec2::new(200.0, 0.0)),
///     fire: true,
/// };
/// assert!(intent.fire);
/// assert!(PlayerIntent::default().aim_point.is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// Movement input; anything longer than 1 is clamped to 1.
    pub movement: Vec2,
    /// World point to aim at. `None` keeps the current aim.
    pub aim_point: Option<Vec2>,
    /// Trigger held.
    pub fire: bool,
}

/// Commands for the player tank, if it exists and is alive.
#[must_use]
pub fn player_commands(arena: &Arena, intent: &PlayerIntent, config: &SimConfig) -> Vec<Command> {
    let Some(id) = arena.player_id() else {
        return Vec::new();
    };
    let Some(tank) = arena.living_tank(id) else {
        return Vec::new();
    };

    let mut commands = vec![Command::Steer {
        target: id,
        velocity: intent.movement.clamp_length_max(1.0) * tank.movement_speed(&config.tanks),
    }];
    if let Some(point) = intent.aim_point {
        commands.push(Command::Aim {
            target: id,
            direction: point - tank.transform.position,
        });
    }
    if intent.fire {
        commands.push(Command::Fire { target: id, at: None });
    }
    commands
}

/// Advances every living AI brain by one tick and collects its commands.
///
/// Brains decide against the living player. With no player to track they
/// hold still until one appears.
pub fn ai_commands<R: Rng>(arena: &mut Arena, config: &SimConfig, rng: &mut R) -> Vec<Command> {
    let opponent = arena
        .player_id()
        .and_then(|id| arena.living_tank(id))
        .map(|player| player.transform.position);
    let half_extent = arena.half_extent();
    let dt = config.physics.dt;
    let mut commands = Vec::new();

    for id in arena.ids_with_tag(EntityTag::Ai) {
        let Some(tank) = arena.tank_mut(id).filter(|tank| tank.is_alive()) else {
            continue;
        };
        let position = tank.transform.position;
        let speed = tank.movement_speed(&config.tanks);
        let class = tank.current_class();
        let Pilot::Ai(brain) = &mut tank.pilot else {
            continue;
        };

        let timers = brain.tick(dt);
        if timers.decide {
            match opponent {
                Some(opponent) => {
                    let before = brain.state();
                    let view = AiView { position, speed, class, opponent, half_extent };
                    let decision = brain.decide(&view, &config.ai, rng);
                    if decision.state != before {
                        debug!(
                            entity = %id,
                            from = ?before,
                            to = ?decision.state,
                            "ai state changed"
                        );
                    }

                    commands.push(Command::Steer { target: id, velocity: decision.velocity });
                    if let Some(direction) = decision.aim {
                        commands.push(Command::Aim { target: id, direction });
                    }
                    if let Some(at) = decision.fire_at {
                        commands.push(Command::Fire { target: id, at: Some(at) });
                    }
                }
                None => commands.push(Command::Steer { target: id, velocity: Vec2::ZERO }),
            }
        }

        if timers.upgrade {
            let plan = AiBrain::plan_upgrades(&tank.stats, &tank.class, rng);
            commands.extend(
                plan.stats.into_iter().map(|stat| Command::UpgradeStat { target: id, stat }),
            );
            if let Some(class) = plan.class {
                commands.push(Command::UpgradeClass { target: id, class });
            }
        }
    }
    commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, EntityInner, TankComponents};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spawn_player(arena: &mut Arena, position: Vec2) -> EntityId {
        let tank = TankComponents::player(position, &SimConfig::default().tanks);
        arena.spawn(EntityTag::Player, EntityInner::Tank(tank))
    }

    fn spawn_ai(arena: &mut Arena, position: Vec2) -> EntityId {
        let config = SimConfig::default();
        let tank = TankComponents::ai(position, &config.tanks, &config.ai);
        arena.spawn(EntityTag::Ai, EntityInner::Tank(tank))
    }

    /// Runs AI ticks until some commands come out, up to one second.
    fn first_ai_beat(arena: &mut Arena) -> Vec<Command> {
        let config = SimConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..60 {
            let commands = ai_commands(arena, &config, &mut rng);
            if !commands.is_empty() {
                return commands;
            }
        }
        Vec::new()
    }

    mod player_tests {
        use super::*;

        #[test]
        fn intent_becomes_commands() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, Vec2::new(10.0, 0.0));
            let intent = PlayerIntent {
                movement: Vec2::new(3.0, 4.0),
                aim_point: Some(Vec2::new(10.0, 50.0)),
                fire: true,
            };

            let commands = player_commands(&arena, &intent, &SimConfig::default());
            assert_eq!(commands.len(), 3);
            match commands[0] {
                Command::Steer { target, velocity } => {
                    assert_eq!(target, id);
                    // clamped to unit length, times 300 base speed
                    assert!((velocity - Vec2::new(180.0, 240.0)).length() < 1e-3);
                }
                ref other => panic!("expected steer, got {other:?}"),
            }
            assert_eq!(commands[1], Command::Aim { target: id, direction: Vec2::new(0.0, 50.0) });
            assert_eq!(commands[2], Command::Fire { target: id, at: None });
        }

        #[test]
        fn idle_intent_only_steers() {
            let mut arena = Arena::new();
            spawn_player(&mut arena, Vec2::ZERO);
            let commands = player_commands(&arena, &PlayerIntent::default(), &SimConfig::default());
            assert_eq!(commands.len(), 1);
        }

        #[test]
        fn dead_player_issues_nothing() {
            let mut arena = Arena::new();
            let id = spawn_player(&mut arena, Vec2::ZERO);
            arena.tank_mut(id).unwrap().health.apply_damage(1.0e6, None);
            let intent = PlayerIntent { fire: true, ..PlayerIntent::default() };
            assert!(player_commands(&arena, &intent, &SimConfig::default()).is_empty());
        }
    }

    mod ai_tests {
        use super::*;

        #[test]
        fn ai_engages_nearby_player() {
            let mut arena = Arena::new();
            let player = spawn_player(&mut arena, Vec2::new(300.0, 0.0));
            let ai = spawn_ai(&mut arena, Vec2::ZERO);

            let commands = first_ai_beat(&mut arena);
            assert!(matches!(commands[0], Command::Steer { target, .. } if target == ai));
            assert!(commands
                .iter()
                .any(|c| matches!(c, Command::Aim { target, .. } if *target == ai)));

            let position = arena.tank(player).unwrap().transform.position;
            for command in &commands {
                if let Command::Fire { at, .. } = command {
                    assert_eq!(*at, Some(position));
                }
            }
        }

        #[test]
        fn ai_holds_still_without_player() {
            let mut arena = Arena::new();
            let ai = spawn_ai(&mut arena, Vec2::ZERO);

            let commands = first_ai_beat(&mut arena);
            assert_eq!(commands, vec![Command::Steer { target: ai, velocity: Vec2::ZERO }]);
        }

        #[test]
        fn ai_spends_points_on_upgrade_beat() {
            let mut arena = Arena::new();
            spawn_player(&mut arena, Vec2::new(5000.0, 0.0));
            let ai = spawn_ai(&mut arena, Vec2::ZERO);
            arena.tank_mut(ai).unwrap().add_experience(250.0);
            let points = arena.tank(ai).unwrap().stats.available_points();
            assert!(points >= 2);

            let config = SimConfig::default();
            let mut rng = ChaCha8Rng::seed_from_u64(2);
            let mut upgrades = 0;
            for _ in 0..70 {
                upgrades += ai_commands(&mut arena, &config, &mut rng)
                    .iter()
                    .filter(|c| matches!(c, Command::UpgradeStat { .. }))
                    .count();
            }
            assert_eq!(upgrades, points as usize);
        }

        #[test]
        fn dead_ai_is_silent() {
            let mut arena = Arena::new();
            spawn_player(&mut arena, Vec2::new(100.0, 0.0));
            let ai = spawn_ai(&mut arena, Vec2::ZERO);
            arena.tank_mut(ai).unwrap().health.apply_damage(1.0e6, None);
            assert!(first_ai_beat(&mut arena).is_empty());
        }
    }
}

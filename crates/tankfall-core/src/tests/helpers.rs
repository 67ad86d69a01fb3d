//! Test helper functions for setting up simulations and entities.
//!
//! This module provides factory functions and setup utilities that make
//! writing tests more ergonomic and consistent.

use glam::Vec2;

use crate::ai::AiState;
use crate::config::SimConfig;
use crate::entity::{EntityId, ShapeKind};
use crate::output::GameEvent;
use crate::pilot::PlayerIntent;
use crate::simulation::Simulation;

// =============================================================================
// Scenario Setup
// =============================================================================

/// A simulation with automatic population switched off.
pub fn sandbox(seed: u64) -> Simulation {
    Simulation::new(SimConfig::sandbox(), seed).unwrap()
}

/// A sandbox with the player at `player` and one shape at `shape`.
///
/// # Returns
///
/// A tuple of (`player_id`, `shape_id`).
pub fn player_and_shape(
    sim: &mut Simulation,
    player: Vec2,
    kind: ShapeKind,
    shape: Vec2,
) -> (EntityId, EntityId) {
    let player = sim.spawn_player(player);
    let shape = sim.spawn_shape(kind, shape);
    (player, shape)
}

/// Holds the trigger while aiming at `point`.
pub fn shoot_at(sim: &mut Simulation, point: Vec2) {
    sim.set_player_intent(PlayerIntent {
        movement: Vec2::ZERO,
        aim_point: Some(point),
        fire: true,
    });
}

// =============================================================================
// Running
// =============================================================================

/// Steps `ticks` times and returns every event produced.
pub fn run(sim: &mut Simulation, ticks: usize) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        sim.step();
        events.extend(sim.take_events());
    }
    events
}

/// Steps until `done` holds or `limit` ticks pass. Returns true if it held.
pub fn run_until(
    sim: &mut Simulation,
    limit: usize,
    mut done: impl FnMut(&Simulation) -> bool,
) -> bool {
    for _ in 0..limit {
        if done(sim) {
            return true;
        }
        sim.step();
    }
    done(sim)
}

// =============================================================================
// State Manipulation Functions
// =============================================================================

/// Teleports an entity and resyncs the spatial index.
pub fn place(sim: &mut Simulation, id: EntityId, position: Vec2) {
    let arena = sim.arena_mut();
    if let Some(entity) = arena.get_mut(id) {
        if let Some(tank) = entity.as_tank_mut() {
            tank.transform.position = position;
        } else if let Some(shape) = entity.as_shape_mut() {
            shape.transform.position = position;
        } else if let Some(projectile) = entity.as_projectile_mut() {
            projectile.transform.position = position;
        }
    }
    arena.refresh_spatial();
}

/// Deals unattributed damage directly, outside the tick.
pub fn wound(sim: &mut Simulation, id: EntityId, amount: f32) {
    if let Some(health) = sim.arena_mut().get_mut(id).and_then(|e| e.inner_mut().health_mut()) {
        health.apply_damage(amount, None);
    }
}

/// Grants experience directly, outside the tick.
pub fn grant_experience(sim: &mut Simulation, id: EntityId, amount: f32) {
    if let Some(tank) = sim.arena_mut().tank_mut(id) {
        tank.add_experience(amount);
    }
}

// =============================================================================
// Query Functions
// =============================================================================

/// Gets the position of an entity.
pub fn get_position(sim: &Simulation, id: EntityId) -> Option<Vec2> {
    sim.arena().get(id).map(crate::entity::Entity::position)
}

/// Current behavior state of an AI tank.
pub fn ai_state(sim: &Simulation, id: EntityId) -> Option<AiState> {
    sim.arena().tank(id).and_then(|tank| tank.brain()).map(|brain| brain.state())
}

/// Experience awards credited to `entity`, as `(amount, source, label)`.
pub fn experience_for(events: &[GameEvent], entity: EntityId) -> Vec<(f32, EntityId, String)> {
    events
        .iter()
        .filter_map(|event| match event {
            GameEvent::ExperienceGained { entity: e, amount, source, label } if *e == entity => {
                Some((*amount, *source, label.clone()))
            }
            _ => None,
        })
        .collect()
}

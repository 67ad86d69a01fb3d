//! # Tankfall Core
//!
//! Combat simulation core for the Tankfall arena shooter.
//!
//! This crate provides the deterministic, single-threaded simulation that
//! sits behind the game: tanks and shapes moving and colliding in a bounded
//! arena, damage with kill attribution, experience and stat growth, the class
//! upgrade tree, weapons, and the AI that pilots enemy tanks.
//!
//! ## Architecture
//!
//! - **Entities**: Tanks (player and AI), shapes, projectiles
//! - **Pilots**: Host intent and AI brains, both emitting commands
//! - **Resolvers**: Progression, physics, armament, combat
//!
//! Nothing here renders, polls input or loads files. The host feeds a
//! [`PlayerIntent`] in, calls [`Simulation::step`] at a fixed rate and drains
//! [`GameEvent`]s out.
//!
//! ## Usage
//!
//! ```
//! use glam::Vec2;
//! use tankfall_core::{PlayerIntent, SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(SimConfig::default(), 7).unwrap();
//! sim.spawn_player(Vec2::ZERO);
//! sim.populate();
//!
//! sim.set_player_intent(PlayerIntent {
//!     movement: Vec2::X,
//!     aim_point: Some(Vec2::new(500.0, 0.0)),
//!     fire: true,
//! });
//! for _ in 0..60 {
//!     sim.step();
//! }
//! let events = sim.take_events();
//! assert!(!events.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ai;
pub mod arena;
pub mod class_tree;
pub mod config;
pub mod entity;
pub mod health;
pub mod math;
pub mod output;
pub mod pilot;
pub mod population;
pub mod progression;
pub mod resolver;
pub mod simulation;
pub mod timer;
pub mod weapon;

#[cfg(test)]
mod tests;

pub use arena::Arena;
pub use class_tree::TankClass;
pub use config::{ConfigError, SimConfig};
pub use entity::{EntityId, EntityTag, ShapeKind};
pub use output::GameEvent;
pub use pilot::PlayerIntent;
pub use progression::StatKind;
pub use simulation::Simulation;

//! Output types: what pilots and contacts ask for, and what happened.
//!
//! Every state change in a tick goes through an [`Output`]:
//!
//! - [`Command`]: a pilot's request (steer, aim, fire, spend a point, change
//!   class). Commands may be rejected: a dead tank can't steer, a reloading
//!   weapon can't fire, an illegal class transition is ignored.
//! - [`Modifier`]: a value change produced by contact or firing (damage,
//!   knockback). Modifiers on missing or dead targets are dropped.
//!
//! Resolvers consume outputs and report what actually happened as
//! [`GameEvent`]s, which the host drains for presentation.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tankfall_core::entity::EntityId;
//! use tankfall_core::output::{Command, Output, OutputKind};
//!
//! let output = Output::from(Command::Steer {
//!     target: EntityId::new(1),
//!     velocity: Vec2::new(10.0, 5.0),
//! });
//!
//! assert_eq!(output.kind(), OutputKind::Command);
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::class_tree::TankClass;
use crate::entity::{EntityId, EntityTag};
use crate::health::DamageSource;
use crate::progression::StatKind;

// =============================================================================
// Commands
// =============================================================================

/// Pilot requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Set a tank's desired movement velocity.
    Steer {
        /// Tank to steer.
        target: EntityId,
        /// Desired velocity, before knockback.
        velocity: Vec2,
    },
    /// Point a tank's barrels.
    Aim {
        /// Tank to turn.
        target: EntityId,
        /// Aim direction; zero vectors are ignored.
        direction: Vec2,
    },
    /// Fire one volley.
    Fire {
        /// Tank firing.
        target: EntityId,
        /// Point every muzzle converges on. `None` fires down the barrels.
        at: Option<Vec2>,
    },
    /// Spend one stat point.
    UpgradeStat {
        /// Tank spending.
        target: EntityId,
        /// Stat to grow.
        stat: StatKind,
    },
    /// Move to a child class.
    UpgradeClass {
        /// Tank upgrading.
        target: EntityId,
        /// Class to enter.
        class: TankClass,
    },
}

impl Command {
    /// The tank this command applies to.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        match self {
            Self::Steer { target, .. }
            | Self::Aim { target, .. }
            | Self::Fire { target, .. }
            | Self::UpgradeStat { target, .. }
            | Self::UpgradeClass { target, .. } => *target,
        }
    }
}

// =============================================================================
// Modifiers
// =============================================================================

/// Value changes from contacts and firing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    /// Reduce an entity's health.
    ApplyDamage {
        /// Entity to damage.
        target: EntityId,
        /// Non-negative amount.
        amount: f32,
        /// Immediate cause, used for attribution.
        source: DamageSource,
    },
    /// Push an entity.
    ///
    /// For tanks `force` is an impulse added to the knockback accumulator.
    /// For shapes it is a multiplier on the configured shape knockback
    /// force, divided by the shape's resistance. Either way the resulting
    /// speed is capped.
    Knockback {
        /// Entity to push.
        target: EntityId,
        /// Unit push direction.
        direction: Vec2,
        /// Impulse or force multiplier, see above.
        force: f32,
    },
}

impl Modifier {
    /// Returns the target entity for this modifier.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        match self {
            Self::ApplyDamage { target, .. } | Self::Knockback { target, .. } => *target,
        }
    }
}

// =============================================================================
// Top-Level Output Enum
// =============================================================================

/// Output kind for resolver routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputKind {
    /// Pilot requests.
    Command,
    /// Value changes.
    Modifier,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "Command"),
            Self::Modifier => write!(f, "Modifier"),
        }
    }
}

/// A proposed state change, routed to resolvers by [`OutputKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    /// A pilot request.
    Command(Command),
    /// A value change.
    Modifier(Modifier),
}

impl Output {
    /// Returns the kind of this output for resolver routing.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        match self {
            Self::Command(_) => OutputKind::Command,
            Self::Modifier(_) => OutputKind::Modifier,
        }
    }

    /// Returns the command if this is a command output.
    #[must_use]
    pub const fn as_command(&self) -> Option<&Command> {
        match self {
            Self::Command(cmd) => Some(cmd),
            Self::Modifier(_) => None,
        }
    }

    /// Returns the modifier if this is a modifier output.
    #[must_use]
    pub const fn as_modifier(&self) -> Option<&Modifier> {
        match self {
            Self::Modifier(m) => Some(m),
            Self::Command(_) => None,
        }
    }
}

impl From<Command> for Output {
    fn from(cmd: Command) -> Self {
        Self::Command(cmd)
    }
}

impl From<Modifier> for Output {
    fn from(m: Modifier) -> Self {
        Self::Modifier(m)
    }
}

// =============================================================================
// Events
// =============================================================================

/// Something that happened, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An entity entered the arena.
    EntitySpawned {
        /// The new entity.
        entity: EntityId,
        /// Its faction.
        tag: EntityTag,
    },
    /// A tank reached a new level.
    LevelUp {
        /// The tank.
        entity: EntityId,
        /// Level reached.
        level: u32,
        /// Unspent points after the level-up.
        points: u32,
    },
    /// A tier of class upgrades opened.
    UpgradeAvailable {
        /// The tank.
        entity: EntityId,
        /// Level that opened it.
        level: u32,
    },
    /// A stat point was spent.
    StatUpgraded {
        /// The tank.
        entity: EntityId,
        /// Stat grown.
        stat: StatKind,
        /// Points left.
        remaining: u32,
    },
    /// A tank changed class.
    ClassChanged {
        /// The tank.
        entity: EntityId,
        /// New class.
        class: TankClass,
    },
    /// Health moved (damage, regen or a health upgrade).
    HealthChanged {
        /// The entity.
        entity: EntityId,
        /// Current health.
        current: f32,
        /// Maximum health.
        max: f32,
    },
    /// Experience was awarded for a kill.
    ExperienceGained {
        /// The credited tank.
        entity: EntityId,
        /// Amount awarded.
        amount: f32,
        /// The destroyed entity.
        source: EntityId,
        /// Human-readable victim name.
        label: String,
    },
    /// A tank fired a volley.
    VolleyFired {
        /// The tank.
        entity: EntityId,
        /// Projectiles spawned.
        projectiles: usize,
    },
    /// A shape or AI tank died; it leaves the arena at the end of the tick.
    EntityDestroyed {
        /// The removed entity.
        entity: EntityId,
        /// Its faction.
        tag: EntityTag,
        /// Credited killer, if any.
        killer: Option<EntityId>,
    },
    /// The player tank died; it stays until respawned.
    PlayerDefeated {
        /// The player tank.
        entity: EntityId,
        /// Credited killer, if any.
        killer: Option<EntityId>,
    },
    /// The player was reset to a fresh level-1 tank.
    PlayerRespawned {
        /// The player tank.
        entity: EntityId,
    },
}

impl GameEvent {
    /// Returns the primary entity involved in this event.
    #[must_use]
    pub const fn primary_entity(&self) -> EntityId {
        match self {
            Self::EntitySpawned { entity, .. }
            | Self::LevelUp { entity, .. }
            | Self::UpgradeAvailable { entity, .. }
            | Self::StatUpgraded { entity, .. }
            | Self::ClassChanged { entity, .. }
            | Self::HealthChanged { entity, .. }
            | Self::ExperienceGained { entity, .. }
            | Self::VolleyFired { entity, .. }
            | Self::EntityDestroyed { entity, .. }
            | Self::PlayerDefeated { entity, .. }
            | Self::PlayerRespawned { entity } => *entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_target() {
        let id = EntityId::new(4);
        let commands = [
            Command::Steer { target: id, velocity: Vec2::ZERO },
            Command::Aim { target: id, direction: Vec2::X },
            Command::Fire { target: id, at: None },
            Command::UpgradeStat { target: id, stat: StatKind::Reload },
            Command::UpgradeClass { target: id, class: TankClass::Twin },
        ];
        for command in commands {
            assert_eq!(command.target(), id);
        }
    }

    #[test]
    fn output_routing() {
        let damage = Output::from(Modifier::ApplyDamage {
            target: EntityId::new(1),
            amount: 5.0,
            source: DamageSource::Tank(EntityId::new(2)),
        });
        assert_eq!(damage.kind(), OutputKind::Modifier);
        assert!(damage.as_command().is_none());
        assert_eq!(damage.as_modifier().map(Modifier::target), Some(EntityId::new(1)));
    }

    #[test]
    fn event_serializes_for_hosts() {
        let event = GameEvent::ExperienceGained {
            entity: EntityId::new(1),
            amount: 10.0,
            source: EntityId::new(9),
            label: "Square".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.primary_entity(), EntityId::new(1));
    }

    #[test]
    fn kind_display() {
        assert_eq!(OutputKind::Command.to_string(), "Command");
        assert_eq!(OutputKind::Modifier.to_string(), "Modifier");
    }
}

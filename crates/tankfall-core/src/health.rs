//! Damage and health model shared by every damageable entity.
//!
//! [`HealthState`] tracks hit points, detects death exactly once and remembers
//! the last tank that damaged it so kills can be credited later. The attacker
//! is stored as an [`EntityId`] only: it is resolved through the arena when the
//! credit is paid out, so a destroyed attacker simply earns nothing.
//!
//! # Invariants
//!
//! - `0 <= current <= max`
//! - `dead` goes `false -> true` once and never back, except through
//!   [`HealthState::reset`]
//! - damage and healing on a dead entity are no-ops

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// The immediate cause of a damage application.
///
/// Only tank-backed sources (a tank, or a projectile owned by a tank) are
/// eligible to become the victim's recorded attacker. Shape sources are
/// resolved transitively at death time through the shapes' own records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    /// Direct contact with a tank body.
    Tank(EntityId),
    /// A projectile hit, credited to its owner if it has one.
    Projectile {
        /// The projectile entity.
        projectile: EntityId,
        /// The tank that fired it.
        owner: Option<EntityId>,
    },
    /// Contact with a shape.
    Shape(EntityId),
}

impl DamageSource {
    /// Returns the tank directly responsible for this damage, if any.
    ///
    /// Shapes never carry direct credit.
    #[must_use]
    pub const fn credited_tank(&self) -> Option<EntityId> {
        match self {
            Self::Tank(id) => Some(*id),
            Self::Projectile { owner, .. } => *owner,
            Self::Shape(_) => None,
        }
    }

    /// Returns true if the damage came from a shape.
    #[must_use]
    pub const fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }
}

/// Result of a single [`HealthState::apply_damage`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The entity was already dead; nothing changed.
    Ignored,
    /// Health dropped but the entity survived.
    Wounded,
    /// This hit brought health to zero. Reported once per life.
    Killed,
}

/// Hit points plus death and attribution state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
    current: f32,
    max: f32,
    dead: bool,
    last_attacker: Option<EntityId>,
    since_damage: f32,
}

impl HealthState {
    /// Creates a full-health state.
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            dead: false,
            last_attacker: None,
            since_damage: f32::INFINITY,
        }
    }

    /// Current hit points.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Returns true once health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// The last tank recorded as having damaged this entity.
    #[must_use]
    pub const fn last_attacker(&self) -> Option<EntityId> {
        self.last_attacker
    }

    /// Seconds elapsed since the last damaging hit (infinite if never hit).
    #[must_use]
    pub const fn since_damage(&self) -> f32 {
        self.since_damage
    }

    /// Health as a fraction of max, in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    /// Applies `amount` damage.
    ///
    /// `credit` is the tank to remember as attacker; callers pass `None` for
    /// shape sources and for tanks that no longer exist. Negative amounts are
    /// treated as zero.
    pub fn apply_damage(&mut self, amount: f32, credit: Option<EntityId>) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }

        self.current = (self.current - amount.max(0.0)).max(0.0);
        self.since_damage = 0.0;
        if let Some(tank) = credit {
            self.last_attacker = Some(tank);
        }

        if self.current <= 0.0 {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Restores up to `amount` hit points. Returns true if health changed.
    pub fn heal(&mut self, amount: f32) -> bool {
        if self.dead || self.current >= self.max || amount <= 0.0 {
            return false;
        }
        self.current = (self.current + amount).min(self.max);
        true
    }

    /// Changes the maximum, optionally refilling to the new max.
    ///
    /// Ignored while dead so a corpse can't be revived by a stat bump.
    pub fn set_max(&mut self, max: f32, refill: bool) {
        if self.dead {
            return;
        }
        self.max = max.max(0.0);
        self.current = if refill {
            self.max
        } else {
            self.current.min(self.max)
        };
    }

    /// Advances the time-since-damage clock.
    pub fn tick(&mut self, dt: f32) {
        self.since_damage += dt;
    }

    /// Reinitializes the whole structure for a respawn.
    pub fn reset(&mut self, max: f32) {
        *self = Self::new(max);
    }
}

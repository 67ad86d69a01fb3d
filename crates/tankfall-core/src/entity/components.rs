//! Component structs for each entity kind.
//!
//! The component structs hold all state for a particular entity type. Tanks
//! compose the health, progression, class and weapon models; shapes carry a
//! fixed [`ShapeProfile`] picked at spawn; projectiles are plain movers with an
//! owner id and a penetration budget.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::EntityId;
use crate::ai::AiBrain;
use crate::class_tree::{ClassState, TankClass};
use crate::config::{AiTuning, ProjectileTuning, ShapeProfile, TankTuning};
use crate::health::HealthState;
use crate::progression::{LevelUp, StatBlock, StatKind};
use crate::timer::Countdown;
use crate::weapon::{ProjectileSpec, WeaponState};

// =============================================================================
// Shared components
// =============================================================================

/// Position and facing of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World position.
    pub position: Vec2,
    /// Facing angle in radians.
    pub rotation: f32,
}

impl TransformState {
    /// A transform at `position` facing `rotation`.
    #[must_use]
    pub const fn new(position: Vec2, rotation: f32) -> Self {
        Self { position, rotation }
    }
}

bitflags::bitflags! {
    /// Collision filtering layers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CollisionLayers: u8 {
        /// Player and AI tank bodies.
        const TANK = 1 << 0;
        /// Environmental shapes.
        const SHAPE = 1 << 1;
        /// Bullets.
        const PROJECTILE = 1 << 2;
    }
}

// =============================================================================
// Shapes
// =============================================================================

/// The four shape kinds, lightest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Common, weak, cheap.
    Square,
    /// Slightly tougher.
    Triangle,
    /// Tanky and valuable.
    Pentagon,
    /// Rare boss shape.
    AlphaPentagon,
}

impl ShapeKind {
    /// Every kind, in spawn-weight order.
    pub const ALL: [Self; 4] = [
        Self::Square,
        Self::Triangle,
        Self::Pentagon,
        Self::AlphaPentagon,
    ];

    /// Label used in experience events.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Square => "Square",
            Self::Triangle => "Triangle",
            Self::Pentagon => "Pentagon",
            Self::AlphaPentagon => "Alpha Pentagon",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Components for Shape entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeComponents {
    /// Position and facing.
    pub transform: TransformState,
    /// Knockback/bounce velocity, decayed by friction.
    pub velocity: Vec2,
    /// Which shape this is.
    pub kind: ShapeKind,
    /// Properties fixed at spawn.
    pub profile: ShapeProfile,
    /// Hit points and attribution.
    pub health: HealthState,
}

impl ShapeComponents {
    /// A resting shape of `kind` at `position`.
    #[must_use]
    pub fn new(kind: ShapeKind, position: Vec2, profile: ShapeProfile) -> Self {
        Self {
            transform: TransformState::new(position, 0.0),
            velocity: Vec2::ZERO,
            kind,
            profile,
            health: HealthState::new(profile.health),
        }
    }

    /// Collision radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.profile.radius
    }
}

// =============================================================================
// Tanks
// =============================================================================

/// Who drives a tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pilot {
    /// Driven by host-supplied intent.
    Player,
    /// Driven by a decision engine.
    Ai(Box<AiBrain>),
}

/// Components for Tank entities.
///
/// A tank's actual velocity is recomputed every tick as
/// `desired_velocity + knockback × knockback_resistance`; neither term
/// overwrites the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankComponents {
    /// Position and facing.
    pub transform: TransformState,
    /// Unit aim direction.
    pub aim: Vec2,
    /// Velocity requested by the pilot.
    pub desired_velocity: Vec2,
    /// Knockback accumulator, decayed independently.
    pub knockback: Vec2,
    /// Velocity integrated last tick.
    pub velocity: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Hit points and attribution.
    pub health: HealthState,
    /// Combat stats and progression.
    pub stats: StatBlock,
    /// Position in the class tree.
    pub class: ClassState,
    /// Muzzles and reload.
    pub weapon: WeaponState,
    /// Regeneration countdown.
    pub regen: Countdown,
    /// Controller.
    pub pilot: Pilot,
}

impl TankComponents {
    /// A fresh level-1 tank at `position`.
    #[must_use]
    pub fn new(position: Vec2, pilot: Pilot, tuning: &TankTuning) -> Self {
        let stats = StatBlock::new();
        Self {
            transform: TransformState::new(position, 0.0),
            aim: Vec2::X,
            desired_velocity: Vec2::ZERO,
            knockback: Vec2::ZERO,
            velocity: Vec2::ZERO,
            radius: tuning.radius,
            health: HealthState::new(stats.max_health),
            stats,
            class: ClassState::new(),
            weapon: WeaponState::new(),
            regen: Countdown::new(tuning.regen_interval),
            pilot,
        }
    }

    /// A player-driven tank.
    #[must_use]
    pub fn player(position: Vec2, tuning: &TankTuning) -> Self {
        Self::new(position, Pilot::Player, tuning)
    }

    /// An AI-driven tank with a fresh brain.
    #[must_use]
    pub fn ai(position: Vec2, tuning: &TankTuning, ai: &AiTuning) -> Self {
        let brain = AiBrain::with_tuning(TankClass::Basic, ai);
        Self::new(position, Pilot::Ai(Box::new(brain)), tuning)
    }

    /// True while health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.stats.level()
    }

    /// Current class.
    #[must_use]
    pub const fn current_class(&self) -> TankClass {
        self.class.current()
    }

    /// The decision engine, for AI tanks.
    #[must_use]
    pub fn brain(&self) -> Option<&AiBrain> {
        match &self.pilot {
            Pilot::Ai(brain) => Some(&**brain),
            Pilot::Player => None,
        }
    }

    /// Mutable decision engine, for AI tanks.
    pub fn brain_mut(&mut self) -> Option<&mut AiBrain> {
        match &mut self.pilot {
            Pilot::Ai(brain) => Some(&mut **brain),
            Pilot::Player => None,
        }
    }

    /// Full movement speed for the current stats.
    #[must_use]
    pub fn movement_speed(&self, tuning: &TankTuning) -> f32 {
        tuning.base_speed * self.stats.movement_speed
    }

    /// Grants experience. A dead tank gains nothing.
    pub fn add_experience(&mut self, amount: f32) -> Vec<LevelUp> {
        if self.health.is_dead() {
            return Vec::new();
        }
        self.stats.add_experience(amount)
    }

    /// Spends a stat point. A health upgrade refills to the new max.
    pub fn upgrade_stat(&mut self, kind: StatKind) -> bool {
        if self.health.is_dead() || !self.stats.upgrade(kind) {
            return false;
        }
        if kind == StatKind::Health {
            self.health.set_max(self.stats.max_health, true);
        }
        true
    }

    /// Moves into `target` and applies its effect once.
    pub fn upgrade_class(&mut self, target: TankClass) -> bool {
        if self.health.is_dead() {
            return false;
        }
        let Some(effect) = self.class.upgrade_to(target, self.stats.level()) else {
            return false;
        };

        self.stats = effect.apply(&self.stats);
        if let Some(layout) = effect.layout {
            self.weapon.set_layout(layout);
        }
        if let Some(brain) = self.brain_mut() {
            brain.adopt_class(target);
        }
        true
    }

    /// Advances the regen countdown; heals one step when it elapses.
    ///
    /// Returns true if health changed.
    pub fn regenerate(&mut self, dt: f32) -> bool {
        self.regen.tick(dt) && self.health.heal(self.stats.health_regen)
    }

    /// Restores a brand-new level-1 tank at `position`, keeping the pilot.
    pub fn reset(&mut self, position: Vec2) {
        self.transform = TransformState::new(position, 0.0);
        self.aim = Vec2::X;
        self.desired_velocity = Vec2::ZERO;
        self.knockback = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.stats.reset();
        self.health.reset(self.stats.max_health);
        self.class.reset();
        self.weapon.reset();
        self.regen.reset();
    }
}

// =============================================================================
// Projectiles
// =============================================================================

/// Components for Projectile entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileComponents {
    /// Position and facing.
    pub transform: TransformState,
    /// Unit travel direction.
    pub direction: Vec2,
    /// Travel speed.
    pub speed: f32,
    /// Damage per hit.
    pub damage: f32,
    /// Remaining hits; the projectile is spent at zero.
    pub penetration_left: f32,
    /// Seconds until expiry.
    pub lifetime_left: f32,
    /// The tank that fired it. Never damaged by it.
    pub owner: Option<EntityId>,
    /// Collision radius.
    pub radius: f32,
    /// Entities already hit, each at most once.
    pub struck: Vec<EntityId>,
}

impl ProjectileComponents {
    /// A projectile launched from a volley entry.
    #[must_use]
    pub fn launch(
        spec: &ProjectileSpec,
        owner: Option<EntityId>,
        tuning: &ProjectileTuning,
    ) -> Self {
        Self {
            transform: TransformState::new(spec.position, spec.direction.to_angle()),
            direction: spec.direction,
            speed: spec.speed,
            damage: spec.damage,
            penetration_left: spec.penetration,
            lifetime_left: tuning.lifetime,
            owner,
            radius: tuning.radius,
            struck: Vec::new(),
        }
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    /// True once lifetime or penetration is used up.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.lifetime_left <= 0.0 || self.penetration_left <= 0.0
    }

    /// True if `target` may still be hit by this projectile.
    #[must_use]
    pub fn can_strike(&self, target: EntityId) -> bool {
        !self.is_spent() && self.owner != Some(target) && !self.struck.contains(&target)
    }

    /// Records a hit on `target` and spends one penetration.
    pub fn register_hit(&mut self, target: EntityId) {
        self.struck.push(target);
        self.penetration_left -= 1.0;
    }
}

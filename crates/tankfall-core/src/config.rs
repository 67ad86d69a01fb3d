//! Simulation configuration.
//!
//! [`SimConfig`] gathers every tuning constant the simulation reads. All groups
//! implement `Default` with the reference tuning and deserialize with
//! `#[serde(default)]`, so a host config file only needs to name the values it
//! overrides.
//!
//! # Example
//!
//! ```
//! use tankfall_core::config::SimConfig;
//!
//! let config = SimConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let sandbox = SimConfig::sandbox();
//! assert_eq!(sandbox.population.max_shapes, 0);
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::components::ShapeKind;

/// Errors reported when a configuration can't drive a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The arena must have a positive, finite half-extent on both axes.
    #[error("arena half-extent must be positive on both axes, got ({x}, {y})")]
    InvalidArena {
        /// Horizontal half-extent.
        x: f32,
        /// Vertical half-extent.
        y: f32,
    },

    /// The physics timestep must be positive and finite.
    #[error("physics timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),

    /// Bounce damping has to lie strictly between 0 and 1.
    #[error("bounce factor must lie in (0, 1), got {0}")]
    InvalidBounce(f32),

    /// A value that must be strictly positive was not.
    #[error("{name} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// Shape spawn weights are all zero or negative.
    #[error("shape spawn weights must contain at least one positive entry")]
    EmptySpawnWeights,

    /// Minimum tank spawn distance exceeds the maximum.
    #[error("tank spawn distance range is inverted: {min} > {max}")]
    InvertedSpawnRange {
        /// Configured minimum distance.
        min: f32,
        /// Configured maximum distance.
        max: f32,
    },
}

/// Result alias for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Groups
// =============================================================================

/// Playfield bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Half the arena size; positions are clamped to `[-half, half]` per axis.
    pub half_extent: Vec2,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_extent: Vec2::new(1500.0, 1500.0),
        }
    }
}

/// Integration, friction and collision response constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Fixed timestep in seconds.
    pub dt: f32,
    /// Rate (units/s²) at which shape velocity decays toward zero.
    pub shape_friction: f32,
    /// Velocity a unit knockback force gives a shape of resistance 1.
    pub shape_knockback_force: f32,
    /// Hard cap on knockback-driven speed.
    pub max_knockback_speed: f32,
    /// Relative speeds at or below this don't collide.
    pub min_collision_speed: f32,
    /// Impact force per unit of relative speed.
    pub collision_force_scale: f32,
    /// Damping applied to collision impulses.
    pub bounce_factor: f32,
    /// Impulse pushing a tank off a shape or another tank on first contact.
    pub tank_contact_push: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            shape_friction: 50.0,
            shape_knockback_force: 800.0,
            max_knockback_speed: 1500.0,
            min_collision_speed: 5.0,
            collision_force_scale: 2.0,
            bounce_factor: 0.8,
            tank_contact_push: 400.0,
        }
    }
}

/// Fixed per-kind properties of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeProfile {
    /// Starting and maximum health.
    pub health: f32,
    /// Experience paid to the credited tank on death.
    pub experience: f32,
    /// Damage dealt on contact.
    pub contact_damage: f32,
    /// Divides incoming knockback.
    pub knockback_resistance: f32,
    /// Mass class used by shape-on-shape collisions.
    pub mass: f32,
    /// Collision radius.
    pub radius: f32,
}

impl ShapeProfile {
    const fn new(
        health: f32,
        experience: f32,
        contact_damage: f32,
        knockback_resistance: f32,
        mass: f32,
        radius: f32,
    ) -> Self {
        Self {
            health,
            experience,
            contact_damage,
            knockback_resistance,
            mass,
            radius,
        }
    }
}

/// Shape profiles keyed by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeTuning {
    /// Square profile.
    pub square: ShapeProfile,
    /// Triangle profile.
    pub triangle: ShapeProfile,
    /// Pentagon profile.
    pub pentagon: ShapeProfile,
    /// Alpha pentagon profile.
    pub alpha_pentagon: ShapeProfile,
}

impl ShapeTuning {
    /// Returns the profile for `kind`.
    #[must_use]
    pub const fn profile(&self, kind: ShapeKind) -> &ShapeProfile {
        match kind {
            ShapeKind::Square => &self.square,
            ShapeKind::Triangle => &self.triangle,
            ShapeKind::Pentagon => &self.pentagon,
            ShapeKind::AlphaPentagon => &self.alpha_pentagon,
        }
    }
}

impl Default for ShapeTuning {
    fn default() -> Self {
        Self {
            square: ShapeProfile::new(20.0, 10.0, 10.0, 1.0, 1.0, 15.0),
            triangle: ShapeProfile::new(30.0, 25.0, 15.0, 1.2, 2.0, 17.0),
            pentagon: ShapeProfile::new(100.0, 130.0, 20.0, 1.5, 4.0, 22.0),
            alpha_pentagon: ShapeProfile::new(3000.0, 3000.0, 40.0, 2.0, 8.0, 44.0),
        }
    }
}

/// Tank movement and body tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankTuning {
    /// Speed at movement multiplier 1.
    pub base_speed: f32,
    /// Fraction of accumulated knockback that reaches the tank's velocity.
    pub knockback_resistance: f32,
    /// Rate (units/s²) at which tank knockback decays.
    pub knockback_friction: f32,
    /// Impulse applied opposite the first muzzle on every volley.
    pub recoil_force: f32,
    /// Collision radius.
    pub radius: f32,
    /// Seconds between regeneration ticks.
    pub regen_interval: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            base_speed: 300.0,
            knockback_resistance: 0.5,
            knockback_friction: 500.0,
            recoil_force: 100.0,
            radius: 24.0,
            regen_interval: 1.0,
        }
    }
}

/// Projectile tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Seconds before an unspent projectile expires.
    pub lifetime: f32,
    /// Impulse given to a tank on hit, along the projectile direction.
    pub tank_knockback: f32,
    /// Knockback force given to a shape on hit.
    pub shape_knockback: f32,
    /// Collision radius.
    pub radius: f32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            lifetime: 2.0,
            tank_knockback: 300.0,
            shape_knockback: 1.0,
            radius: 6.0,
        }
    }
}

/// Decision-engine tuning shared by every AI tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Seconds between behavior decisions.
    pub decision_interval: f32,
    /// Seconds between stat/class auto-spend passes.
    pub upgrade_interval: f32,
    /// Shortest strategy period.
    pub strategy_min: f32,
    /// Longest strategy period.
    pub strategy_max: f32,
    /// Chance a strategy change flips Combat into Flank.
    pub flank_chance: f64,
    /// Distance at which wander and flank points count as reached.
    pub capture_radius: f32,
    /// Fraction of full speed used while strafing.
    pub combat_speed_factor: f32,
    /// Largest angular aim error in radians.
    pub max_inaccuracy: f32,
    /// Aim error below which a shot is taken.
    pub fire_threshold: f32,
    /// Looser threshold for rapid-fire classes.
    pub rapid_fire_threshold: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            decision_interval: 0.2,
            upgrade_interval: 1.0,
            strategy_min: 2.0,
            strategy_max: 5.0,
            flank_chance: 0.3,
            capture_radius: 50.0,
            combat_speed_factor: 0.7,
            max_inaccuracy: 0.2,
            fire_threshold: 0.1,
            rapid_fire_threshold: 0.3,
        }
    }
}

/// Automatic population of shapes and AI tanks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of shapes kept alive.
    pub max_shapes: usize,
    /// Relative spawn weights for Square, Triangle, Pentagon, AlphaPentagon.
    pub shape_weights: [f32; 4],
    /// Cap on simultaneously alive AI tanks.
    pub max_ai_tanks: usize,
    /// Seconds between AI spawn attempts.
    pub ai_spawn_interval: f32,
    /// Closest an AI tank may spawn to the player.
    pub ai_spawn_min_distance: f32,
    /// Farthest an AI tank may spawn from the player.
    pub ai_spawn_max_distance: f32,
    /// Candidate positions tried per spawn attempt.
    pub ai_spawn_attempts: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            max_shapes: 50,
            shape_weights: [70.0, 20.0, 8.0, 2.0],
            max_ai_tanks: 5,
            ai_spawn_interval: 5.0,
            ai_spawn_min_distance: 500.0,
            ai_spawn_max_distance: 1000.0,
            ai_spawn_attempts: 10,
        }
    }
}

// =============================================================================
// SimConfig
// =============================================================================

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Arena bounds.
    pub arena: ArenaConfig,
    /// Physics constants.
    pub physics: PhysicsConfig,
    /// Shape profiles.
    pub shapes: ShapeTuning,
    /// Tank tuning.
    pub tanks: TankTuning,
    /// Projectile tuning.
    pub projectiles: ProjectileTuning,
    /// AI decision tuning.
    pub ai: AiTuning,
    /// Automatic population.
    pub population: PopulationConfig,
}

impl SimConfig {
    /// Default tuning with automatic population switched off.
    ///
    /// Scripted scenarios and tests spawn everything themselves.
    #[must_use]
    pub fn sandbox() -> Self {
        let mut config = Self::default();
        config.population.max_shapes = 0;
        config.population.max_ai_tanks = 0;
        config
    }

    /// Checks that every value can drive a simulation.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        let half = self.arena.half_extent;
        if !(half.x > 0.0 && half.y > 0.0 && half.is_finite()) {
            return Err(ConfigError::InvalidArena {
                x: half.x,
                y: half.y,
            });
        }

        let dt = self.physics.dt;
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(ConfigError::InvalidTimestep(dt));
        }

        let bounce = self.physics.bounce_factor;
        if !(bounce > 0.0 && bounce < 1.0) {
            return Err(ConfigError::InvalidBounce(bounce));
        }

        positive("physics.max_knockback_speed", self.physics.max_knockback_speed)?;
        positive("tanks.base_speed", self.tanks.base_speed)?;
        positive("tanks.radius", self.tanks.radius)?;
        positive("tanks.regen_interval", self.tanks.regen_interval)?;
        positive("projectiles.lifetime", self.projectiles.lifetime)?;
        positive("projectiles.radius", self.projectiles.radius)?;
        positive("ai.decision_interval", self.ai.decision_interval)?;
        positive("ai.upgrade_interval", self.ai.upgrade_interval)?;
        positive("population.ai_spawn_interval", self.population.ai_spawn_interval)?;

        for kind in ShapeKind::ALL {
            let profile = self.shapes.profile(kind);
            positive("shape health", profile.health)?;
            positive("shape mass", profile.mass)?;
            positive("shape knockback resistance", profile.knockback_resistance)?;
            positive("shape radius", profile.radius)?;
        }

        if self.population.max_shapes > 0
            && !self.population.shape_weights.iter().any(|w| *w > 0.0)
        {
            return Err(ConfigError::EmptySpawnWeights);
        }

        let (min, max) = (
            self.population.ai_spawn_min_distance,
            self.population.ai_spawn_max_distance,
        );
        if min > max {
            return Err(ConfigError::InvertedSpawnRange { min, max });
        }

        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> ConfigResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

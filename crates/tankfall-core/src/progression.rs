//! Progression engine: experience, levels and stat points.
//!
//! A [`StatBlock`] carries a tank's combat stats together with its progression
//! counters. Experience converts into levels with a threshold that grows ×1.5
//! per level; every level grants one stat point, and spending a point grows one
//! stat by ×1.1 permanently.
//!
//! # Example
//!
//! ```
//! use tankfall_core::progression::{StatBlock, StatKind};
//!
//! let mut stats = StatBlock::new();
//! assert!(!stats.upgrade(StatKind::Damage));
//!
//! let levels = stats.add_experience(100.0);
//! assert_eq!(levels.len(), 1);
//! assert_eq!(stats.level(), 2);
//! assert_eq!(stats.available_points(), 1);
//! assert_eq!(stats.experience_to_next_level(), 150.0);
//!
//! assert!(stats.upgrade(StatKind::Damage));
//! assert!((stats.bullet_damage - 11.0).abs() < 1e-4);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 45;

/// Experience needed to leave level 1.
pub const BASE_EXPERIENCE_TO_LEVEL: f32 = 100.0;

/// Threshold growth per level.
pub const EXPERIENCE_GROWTH: f32 = 1.5;

/// Multiplicative growth per spent stat point.
pub const STAT_GROWTH: f32 = 1.1;

/// Levels at which a new class tier unlocks.
pub const TIER_LEVELS: [u32; 3] = [15, 30, 45];

/// A stat that can receive points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatKind {
    /// Maximum health (refills on upgrade).
    Health,
    /// Health regenerated per second.
    Regen,
    /// Bullet damage.
    Damage,
    /// Bullet penetration.
    Penetration,
    /// Bullet speed.
    BulletSpeed,
    /// Reload rate multiplier.
    Reload,
    /// Movement speed multiplier.
    Movement,
    /// Contact damage dealt by the tank body.
    BodyDamage,
}

impl StatKind {
    /// Every upgradable stat.
    pub const ALL: [Self; 8] = [
        Self::Health,
        Self::Regen,
        Self::Damage,
        Self::Penetration,
        Self::BulletSpeed,
        Self::Reload,
        Self::Movement,
        Self::BodyDamage,
    ];

    /// The canonical lowercase name accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Regen => "regen",
            Self::Damage => "damage",
            Self::Penetration => "penetration",
            Self::BulletSpeed => "speed",
            Self::Reload => "reload",
            Self::Movement => "movement",
            Self::BodyDamage => "bodydamage",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing an unrecognized stat name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stat name: {0:?}")]
pub struct UnknownStat(pub String);

impl FromStr for StatKind {
    type Err = UnknownStat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| UnknownStat(s.to_string()))
    }
}

/// One level gained inside [`StatBlock::add_experience`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    /// The level just reached.
    pub level: u32,
    /// Unspent points after this level's grant.
    pub available_points: u32,
    /// True at the class-tier levels (15, 30, 45).
    pub tier_unlocked: bool,
}

/// Combat stats plus progression counters.
///
/// Stat fields are public because class effects rewrite them wholesale.
/// Progression counters are private so the leveling rules can't be bypassed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Maximum health.
    pub max_health: f32,
    /// Health restored per regen tick.
    pub health_regen: f32,
    /// Damage carried by each bullet.
    pub bullet_damage: f32,
    /// Bullet speed in units per second.
    pub bullet_speed: f32,
    /// Hits a bullet survives.
    pub bullet_penetration: f32,
    /// Half-width of the random spread cone, in degrees.
    pub bullet_spread_degrees: f32,
    /// Multiplier on base movement speed.
    pub movement_speed: f32,
    /// Damage dealt by ramming.
    pub body_damage: f32,
    /// Reload rate; the reload period is divided by it.
    pub reload_speed: f32,
    level: u32,
    experience: f32,
    experience_to_next_level: f32,
    available_points: u32,
}

impl StatBlock {
    /// Creates a level-1 block with base stats.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_health: 100.0,
            health_regen: 1.0,
            bullet_damage: 10.0,
            bullet_speed: 500.0,
            bullet_penetration: 1.0,
            bullet_spread_degrees: 0.0,
            movement_speed: 1.0,
            body_damage: 10.0,
            reload_speed: 1.0,
            level: 1,
            experience: 0.0,
            experience_to_next_level: BASE_EXPERIENCE_TO_LEVEL,
            available_points: 0,
        }
    }

    /// Current level, 1 through [`MAX_LEVEL`].
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated toward the next level.
    #[must_use]
    pub const fn experience(&self) -> f32 {
        self.experience
    }

    /// Threshold for the next level.
    #[must_use]
    pub const fn experience_to_next_level(&self) -> f32 {
        self.experience_to_next_level
    }

    /// Unspent stat points.
    #[must_use]
    pub const fn available_points(&self) -> u32 {
        self.available_points
    }

    /// Progress toward the next level in `[0, 1]`.
    #[must_use]
    pub fn experience_fraction(&self) -> f32 {
        (self.experience / self.experience_to_next_level).clamp(0.0, 1.0)
    }

    /// Adds experience and converts it into levels.
    ///
    /// Returns every level gained, in order. Leveling stops at [`MAX_LEVEL`];
    /// surplus experience keeps accumulating.
    pub fn add_experience(&mut self, amount: f32) -> Vec<LevelUp> {
        self.experience += amount.max(0.0);

        let mut gained = Vec::new();
        while self.experience >= self.experience_to_next_level && self.level < MAX_LEVEL {
            self.level += 1;
            self.experience -= self.experience_to_next_level;
            self.experience_to_next_level *= EXPERIENCE_GROWTH;
            self.available_points += 1;

            gained.push(LevelUp {
                level: self.level,
                available_points: self.available_points,
                tier_unlocked: TIER_LEVELS.contains(&self.level),
            });
        }
        gained
    }

    /// Spends one point on `kind`. Returns false (and changes nothing) when
    /// no points are available.
    ///
    /// Health refill on a [`StatKind::Health`] upgrade is the caller's job,
    /// since current health lives in the health model.
    pub fn upgrade(&mut self, kind: StatKind) -> bool {
        if self.available_points == 0 {
            return false;
        }

        let stat = match kind {
            StatKind::Health => &mut self.max_health,
            StatKind::Regen => &mut self.health_regen,
            StatKind::Damage => &mut self.bullet_damage,
            StatKind::Penetration => &mut self.bullet_penetration,
            StatKind::BulletSpeed => &mut self.bullet_speed,
            StatKind::Reload => &mut self.reload_speed,
            StatKind::Movement => &mut self.movement_speed,
            StatKind::BodyDamage => &mut self.body_damage,
        };
        *stat *= STAT_GROWTH;
        self.available_points -= 1;
        true
    }

    /// Restores base stats and level 1.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for StatBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Experience paid for destroying a tank of `level`.
#[must_use]
pub fn tank_kill_experience(level: u32) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let level = level as f32;
    100.0 + 50.0 * level
}

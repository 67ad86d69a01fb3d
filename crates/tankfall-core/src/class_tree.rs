//! Class/upgrade tree.
//!
//! Classes form a fixed, level-gated directed acyclic graph rooted at
//! [`TankClass::Basic`]. Each node owns an immutable [`ClassEffect`]: a list of
//! stat adjustments and an optional muzzle layout. The effect is applied once,
//! on the transition into the node; because the graph has no cycles and no
//! self-loops, a class can never be entered twice in one life.
//!
//! ```text
//! Basic ──┬─ Twin ───────┬─ TripleShot
//!         │              ├─ QuadTank
//!         │              └─ TwinFlank
//!         ├─ Sniper ─────┬─ Assassin
//!         │              ├─ Overseer
//!         │              └─ Hunter
//!         ├─ MachineGun ─┬─ Destroyer
//!         │              └─ Gunner
//!         ├─ FlankGuard ─┬─ TriAngle
//!         │              ├─ QuadTank
//!         │              ├─ TwinFlank
//!         │              └─ Auto3
//!         └─ Smasher (level 30)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::progression::StatBlock;
use crate::weapon::{CannonKind, MuzzleSpec};

use CannonKind::{Basic as B, MachineGun as M, Sniper as S};
use StatAdjustment::{
    ScaleBodyDamage, ScaleBulletSpeed, ScaleDamage, ScaleReload, SetDamage, SetSpread,
};

/// A node in the upgrade graph.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TankClass {
    /// Root class.
    #[default]
    Basic,
    /// Two parallel barrels.
    Twin,
    /// One long barrel.
    Sniper,
    /// Rapid, inaccurate barrel.
    MachineGun,
    /// Front and rear barrels.
    FlankGuard,
    /// Three-way spread.
    TripleShot,
    /// Four barrels at right angles.
    QuadTank,
    /// Twin barrels front and back.
    TwinFlank,
    /// Heavier sniper.
    Assassin,
    /// Sniper branch without its own layout.
    Overseer,
    /// Stacked sniper and basic barrels.
    Hunter,
    /// One huge slow barrel.
    Destroyer,
    /// Four small rapid barrels.
    Gunner,
    /// Front barrel and two rear thrusters.
    TriAngle,
    /// Three barrels at 120°.
    Auto3,
    /// No barrels; rams with heavy body damage.
    Smasher,
}

/// Whole-class stat rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatAdjustment {
    /// Multiply bullet damage.
    ScaleDamage(f32),
    /// Multiply bullet speed.
    ScaleBulletSpeed(f32),
    /// Multiply reload rate.
    ScaleReload(f32),
    /// Multiply body damage.
    ScaleBodyDamage(f32),
    /// Replace bullet damage.
    SetDamage(f32),
    /// Replace spread half-angle (degrees).
    SetSpread(f32),
}

impl StatAdjustment {
    fn apply(self, stats: &mut StatBlock) {
        match self {
            Self::ScaleDamage(f) => stats.bullet_damage *= f,
            Self::ScaleBulletSpeed(f) => stats.bullet_speed *= f,
            Self::ScaleReload(f) => stats.reload_speed *= f,
            Self::ScaleBodyDamage(f) => stats.body_damage *= f,
            Self::SetDamage(v) => stats.bullet_damage = v,
            Self::SetSpread(v) => stats.bullet_spread_degrees = v,
        }
    }
}

/// The one-time effect of entering a class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassEffect {
    /// Applied in order.
    pub adjustments: &'static [StatAdjustment],
    /// Replacement muzzle layout; `None` keeps the current one.
    pub layout: Option<&'static [MuzzleSpec]>,
}

impl ClassEffect {
    const NONE: Self = Self {
        adjustments: &[],
        layout: None,
    };

    /// Returns `stats` with this effect's adjustments applied.
    #[must_use]
    pub fn apply(&self, stats: &StatBlock) -> StatBlock {
        let mut next = stats.clone();
        for adjustment in self.adjustments {
            adjustment.apply(&mut next);
        }
        next
    }
}

const TWIN_LAYOUT: &[MuzzleSpec] = &[MuzzleSpec::new(-15.0, B, 0.9), MuzzleSpec::new(15.0, B, 0.9)];
const SNIPER_LAYOUT: &[MuzzleSpec] = &[MuzzleSpec::new(0.0, S, 1.0)];
const MACHINE_GUN_LAYOUT: &[MuzzleSpec] = &[MuzzleSpec::new(0.0, M, 1.2)];
const FLANK_LAYOUT: &[MuzzleSpec] = &[MuzzleSpec::new(0.0, B, 1.0), MuzzleSpec::new(180.0, B, 1.0)];
const TRIPLE_LAYOUT: &[MuzzleSpec] = &[
    MuzzleSpec::new(-30.0, B, 0.9),
    MuzzleSpec::new(0.0, B, 0.9),
    MuzzleSpec::new(30.0, B, 0.9),
];
const QUAD_LAYOUT: &[MuzzleSpec] = &[
    MuzzleSpec::new(0.0, B, 0.9),
    MuzzleSpec::new(90.0, B, 0.9),
    MuzzleSpec::new(180.0, B, 0.9),
    MuzzleSpec::new(270.0, B, 0.9),
];
const TWIN_FLANK_LAYOUT: &[MuzzleSpec] = &[
    MuzzleSpec::new(-15.0, B, 0.9),
    MuzzleSpec::new(15.0, B, 0.9),
    MuzzleSpec::new(165.0, B, 0.9),
    MuzzleSpec::new(195.0, B, 0.9),
];
const HUNTER_LAYOUT: &[MuzzleSpec] = &[MuzzleSpec::new(0.0, S, 1.0), MuzzleSpec::new(0.0, B, 0.7)];
const DESTROYER_LAYOUT: &[MuzzleSpec] = &[MuzzleSpec::new(0.0, B, 2.0)];
const GUNNER_LAYOUT: &[MuzzleSpec] = &[
    MuzzleSpec::new(-8.0, B, 0.4),
    MuzzleSpec::new(-2.5, B, 0.4),
    MuzzleSpec::new(2.5, B, 0.4),
    MuzzleSpec::new(8.0, B, 0.4),
];
const TRI_ANGLE_LAYOUT: &[MuzzleSpec] = &[
    MuzzleSpec::new(0.0, B, 1.0),
    MuzzleSpec::new(150.0, B, 0.8),
    MuzzleSpec::new(210.0, B, 0.8),
];
const AUTO3_LAYOUT: &[MuzzleSpec] = &[
    MuzzleSpec::new(0.0, B, 0.9),
    MuzzleSpec::new(120.0, B, 0.9),
    MuzzleSpec::new(240.0, B, 0.9),
];

impl TankClass {
    /// Every class, root first.
    pub const ALL: [Self; 16] = [
        Self::Basic,
        Self::Twin,
        Self::Sniper,
        Self::MachineGun,
        Self::FlankGuard,
        Self::TripleShot,
        Self::QuadTank,
        Self::TwinFlank,
        Self::Assassin,
        Self::Overseer,
        Self::Hunter,
        Self::Destroyer,
        Self::Gunner,
        Self::TriAngle,
        Self::Auto3,
        Self::Smasher,
    ];

    /// Level a tank needs before it may enter this class.
    #[must_use]
    pub const fn required_level(self) -> u32 {
        match self {
            Self::Basic => 1,
            Self::Twin | Self::Sniper | Self::MachineGun | Self::FlankGuard => 15,
            _ => 30,
        }
    }

    /// Direct children in the upgrade graph.
    #[must_use]
    pub const fn children(self) -> &'static [Self] {
        match self {
            Self::Basic => &[
                Self::Twin,
                Self::Sniper,
                Self::MachineGun,
                Self::FlankGuard,
                Self::Smasher,
            ],
            Self::Twin => &[Self::TripleShot, Self::QuadTank, Self::TwinFlank],
            Self::Sniper => &[Self::Assassin, Self::Overseer, Self::Hunter],
            Self::MachineGun => &[Self::Destroyer, Self::Gunner],
            Self::FlankGuard => &[Self::TriAngle, Self::QuadTank, Self::TwinFlank, Self::Auto3],
            _ => &[],
        }
    }

    /// True if `target` is a direct child of this class.
    #[must_use]
    pub fn leads_to(self, target: Self) -> bool {
        self.children().contains(&target)
    }

    /// Stat and layout change applied on entering this class.
    #[must_use]
    pub fn effect(self) -> ClassEffect {
        match self {
            Self::Basic | Self::Overseer => ClassEffect::NONE,
            Self::Twin => ClassEffect {
                adjustments: &[ScaleDamage(0.8), ScaleReload(1.5)],
                layout: Some(TWIN_LAYOUT),
            },
            Self::Sniper => ClassEffect {
                adjustments: &[ScaleDamage(1.5), ScaleBulletSpeed(1.5), ScaleReload(0.7)],
                layout: Some(SNIPER_LAYOUT),
            },
            Self::MachineGun => ClassEffect {
                adjustments: &[ScaleDamage(1.2), ScaleReload(2.0), SetSpread(30.0)],
                layout: Some(MACHINE_GUN_LAYOUT),
            },
            Self::FlankGuard => ClassEffect {
                adjustments: &[],
                layout: Some(FLANK_LAYOUT),
            },
            Self::TripleShot => ClassEffect {
                adjustments: &[ScaleDamage(0.7), ScaleReload(1.3)],
                layout: Some(TRIPLE_LAYOUT),
            },
            Self::QuadTank => ClassEffect {
                adjustments: &[ScaleDamage(0.7)],
                layout: Some(QUAD_LAYOUT),
            },
            Self::TwinFlank => ClassEffect {
                adjustments: &[ScaleDamage(0.7), ScaleReload(1.5)],
                layout: Some(TWIN_FLANK_LAYOUT),
            },
            Self::Assassin => ClassEffect {
                adjustments: &[ScaleDamage(2.0), ScaleBulletSpeed(2.0), ScaleReload(0.5)],
                layout: Some(SNIPER_LAYOUT),
            },
            Self::Hunter => ClassEffect {
                adjustments: &[ScaleDamage(1.3), ScaleBulletSpeed(1.7), ScaleReload(0.6)],
                layout: Some(HUNTER_LAYOUT),
            },
            Self::Destroyer => ClassEffect {
                adjustments: &[ScaleDamage(3.0), ScaleReload(0.3)],
                layout: Some(DESTROYER_LAYOUT),
            },
            Self::Gunner => ClassEffect {
                adjustments: &[ScaleDamage(0.4), ScaleReload(3.0)],
                layout: Some(GUNNER_LAYOUT),
            },
            Self::TriAngle => ClassEffect {
                adjustments: &[ScaleDamage(0.8)],
                layout: Some(TRI_ANGLE_LAYOUT),
            },
            Self::Auto3 => ClassEffect {
                adjustments: &[ScaleDamage(0.7), ScaleReload(1.2)],
                layout: Some(AUTO3_LAYOUT),
            },
            Self::Smasher => ClassEffect {
                adjustments: &[SetDamage(0.0), ScaleBodyDamage(4.0)],
                layout: Some(&[]),
            },
        }
    }

    /// Long-range classes that aim twice as precisely.
    #[must_use]
    pub const fn is_precision(self) -> bool {
        matches!(self, Self::Sniper | Self::Assassin)
    }

    /// Classes that fire on a looser accuracy threshold.
    #[must_use]
    pub const fn is_rapid_fire(self) -> bool {
        matches!(self, Self::MachineGun | Self::Gunner)
    }
}

impl fmt::Display for TankClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A tank's position in the upgrade graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassState {
    current: TankClass,
}

impl ClassState {
    /// Starts at the root.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: TankClass::Basic,
        }
    }

    /// The current class.
    #[must_use]
    pub const fn current(&self) -> TankClass {
        self.current
    }

    /// Children of the current class whose level gate is met.
    #[must_use]
    pub fn available_upgrades(&self, level: u32) -> Vec<TankClass> {
        self.current
            .children()
            .iter()
            .copied()
            .filter(|class| level >= class.required_level())
            .collect()
    }

    /// True if `target` is a direct child and the level gate is met.
    #[must_use]
    pub fn can_upgrade_to(&self, target: TankClass, level: u32) -> bool {
        self.current.leads_to(target) && level >= target.required_level()
    }

    /// Moves to `target` if the transition is legal.
    ///
    /// Returns the effect to apply, or `None` with no state change.
    pub fn upgrade_to(&mut self, target: TankClass, level: u32) -> Option<ClassEffect> {
        if !self.can_upgrade_to(target, level) {
            return None;
        }
        self.current = target;
        Some(target.effect())
    }

    /// Back to the root class.
    pub fn reset(&mut self) {
        self.current = TankClass::Basic;
    }
}

//! Weapon/firing controller.
//!
//! A [`WeaponState`] holds the ordered muzzle layout installed by the tank's
//! class and a reload [`Cooldown`]. [`WeaponState::fire`] turns a stat snapshot
//! and an aim into a [`Volley`]: one [`ProjectileSpec`] per muzzle and a single
//! recoil direction for the whole volley.
//!
//! Spawning the projectiles and applying recoil is left to the armament
//! resolver; this module never touches the arena.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::progression::StatBlock;
use crate::timer::Cooldown;

/// Reload period at reload multiplier 1.
pub const BASE_RELOAD_SECONDS: f32 = 1.0;

/// Barrel style, which fixes the muzzle distance from the tank center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CannonKind {
    /// Standard barrel.
    Basic,
    /// Short, wide barrel.
    MachineGun,
    /// Long, thin barrel.
    Sniper,
}

impl CannonKind {
    /// Barrel length at scale 1.
    #[must_use]
    pub const fn barrel_length(self) -> f32 {
        match self {
            Self::Basic => 45.0,
            Self::MachineGun => 40.0,
            Self::Sniper => 60.0,
        }
    }
}

/// One firing point: an angular offset from the aim, a barrel kind and scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MuzzleSpec {
    /// Offset from the aim direction in degrees (positive is clockwise on
    /// screen, i.e. toward +y).
    pub angle_degrees: f32,
    /// Barrel style.
    pub cannon: CannonKind,
    /// Size multiplier.
    pub scale: f32,
}

impl MuzzleSpec {
    /// Creates a muzzle spec.
    #[must_use]
    pub const fn new(angle_degrees: f32, cannon: CannonKind, scale: f32) -> Self {
        Self {
            angle_degrees,
            cannon,
            scale,
        }
    }

    /// Distance from the tank center to the muzzle tip.
    #[must_use]
    pub fn barrel_length(&self) -> f32 {
        self.cannon.barrel_length() * self.scale
    }

    /// Barrel direction for a tank aiming along `aim` (unit vector).
    #[must_use]
    pub fn barrel_direction(&self, aim: Vec2) -> Vec2 {
        Vec2::from_angle(self.angle_degrees.to_radians()).rotate(aim)
    }
}

/// The single-barrel layout every tank starts with.
pub const BASIC_LAYOUT: &[MuzzleSpec] = &[MuzzleSpec::new(0.0, CannonKind::Basic, 1.0)];

/// Where and how to shoot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireRequest {
    /// Tank center.
    pub origin: Vec2,
    /// Unit aim direction.
    pub aim: Vec2,
    /// Point every muzzle converges on. `None` fires straight down each barrel.
    pub target: Option<Vec2>,
}

/// One projectile to spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpec {
    /// Spawn point (the muzzle tip).
    pub position: Vec2,
    /// Unit travel direction, spread included.
    pub direction: Vec2,
    /// Travel speed.
    pub speed: f32,
    /// Damage per hit.
    pub damage: f32,
    /// Hits it survives.
    pub penetration: f32,
}

/// Result of a successful [`WeaponState::fire`].
#[derive(Debug, Clone, PartialEq)]
pub struct Volley {
    /// One entry per muzzle, in layout order.
    pub projectiles: Vec<ProjectileSpec>,
    /// Unit direction of the single recoil impulse (opposite the first shot).
    pub recoil: Vec2,
}

/// Muzzle layout and reload state of one tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    muzzles: Vec<MuzzleSpec>,
    cooldown: Cooldown,
}

impl WeaponState {
    /// A loaded weapon with the basic layout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            muzzles: BASIC_LAYOUT.to_vec(),
            cooldown: Cooldown::ready(),
        }
    }

    /// Installed muzzles in firing order.
    #[must_use]
    pub fn muzzles(&self) -> &[MuzzleSpec] {
        &self.muzzles
    }

    /// True when a volley may be fired.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown.is_ready() && !self.muzzles.is_empty()
    }

    /// Seconds until the weapon is loaded.
    #[must_use]
    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown.remaining()
    }

    /// Replaces the muzzle layout. An empty layout disarms the tank.
    pub fn set_layout(&mut self, layout: &[MuzzleSpec]) {
        self.muzzles = layout.to_vec();
    }

    /// Advances the reload timer.
    pub fn tick(&mut self, dt: f32) {
        self.cooldown.tick(dt);
    }

    /// Back to a loaded basic layout.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Fires every muzzle once.
    ///
    /// Returns `None` while reloading or with no muzzles installed. On success
    /// the reload timer restarts at `BASE_RELOAD_SECONDS / reload_speed`.
    pub fn fire<R: Rng>(
        &mut self,
        request: &FireRequest,
        stats: &StatBlock,
        rng: &mut R,
    ) -> Option<Volley> {
        if !self.is_ready() {
            return None;
        }

        let aim = request.aim.try_normalize().unwrap_or(Vec2::X);
        let spread = stats.bullet_spread_degrees.abs();

        let projectiles: Vec<ProjectileSpec> = self
            .muzzles
            .iter()
            .map(|muzzle| {
                let barrel = muzzle.barrel_direction(aim);
                let tip = request.origin + barrel * muzzle.barrel_length();
                let base = request
                    .target
                    .and_then(|target| (target - tip).try_normalize())
                    .unwrap_or(barrel);
                let direction = if spread > 0.0 {
                    let offset: f32 = rng.gen_range(-spread..=spread);
                    Vec2::from_angle(offset.to_radians()).rotate(base)
                } else {
                    base
                };
                ProjectileSpec {
                    position: tip,
                    direction,
                    speed: stats.bullet_speed,
                    damage: stats.bullet_damage,
                    penetration: stats.bullet_penetration,
                }
            })
            .collect();

        let recoil = -projectiles.first()?.direction;
        let reload = stats.reload_speed.max(f32::EPSILON);
        self.cooldown.start(BASE_RELOAD_SECONDS / reload);

        Some(Volley {
            projectiles,
            recoil,
        })
    }
}

impl Default for WeaponState {
    fn default() -> Self {
        Self::new()
    }
}

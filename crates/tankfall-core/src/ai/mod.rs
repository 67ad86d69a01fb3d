//! Agent decision engine for AI-controlled tanks.
//!
//! Each AI tank owns an [`AiBrain`]. The brain runs on its own countdowns,
//! much coarser than the physics tick:
//!
//! - every `decision_interval` (0.2 s) it re-evaluates its [`AiState`] against
//!   the tracked opponent, produces a desired velocity and, if the opponent is
//!   within detection range, an aim and a fire decision;
//! - every `upgrade_interval` (1 s) it spends stat points at random and picks
//!   a class upgrade once the level gates open.
//!
//! The brain never touches the arena. It returns an [`AiDecision`] or an
//! [`UpgradePlan`] that the simulation turns into commands, so the AI goes
//! through exactly the same resolvers as the player.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use tankfall_core::ai::{AiBrain, AiState, AiView};
//! use tankfall_core::class_tree::TankClass;
//! use tankfall_core::config::AiTuning;
//!
//! let tuning = AiTuning::default();
//! let mut brain = AiBrain::new(TankClass::Basic);
//! let mut rng = ChaCha8Rng::seed_from_u64(0);
//!
//! let view = AiView {
//!     position: Vec2::ZERO,
//!     speed: 300.0,
//!     class: TankClass::Basic,
//!     opponent: Vec2::new(2000.0, 0.0),
//!     half_extent: Vec2::splat(1500.0),
//! };
//! let decision = brain.decide(&view, &tuning, &mut rng);
//! assert_eq!(decision.state, AiState::Wander);
//! assert!(decision.fire_at.is_none());
//! ```

mod aim;
mod state;

pub use aim::{aim_at, AimSolution};
pub use state::{next_state, AiState};

use std::f32::consts::TAU;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::class_tree::{ClassState, TankClass};
use crate::config::AiTuning;
use crate::math::{clamp_to_bounds, polar};
use crate::progression::{StatBlock, StatKind, TIER_LEVELS};
use crate::timer::Countdown;

/// Stats an AI spends its points on.
pub const AUTO_SPEND_POOL: [StatKind; 6] = [
    StatKind::Health,
    StatKind::Damage,
    StatKind::BulletSpeed,
    StatKind::Penetration,
    StatKind::Reload,
    StatKind::Movement,
];

/// Ranges that shape an AI's behavior, adjusted per class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    /// Beyond this the opponent is ignored.
    pub detection_range: f32,
    /// Distance the AI tries to hold.
    pub preferred_distance: f32,
    /// Radius of random wander hops.
    pub wander_radius: f32,
}

impl AiProfile {
    /// Wander radius shared by every class.
    pub const WANDER_RADIUS: f32 = 200.0;

    /// The profile an AI adopts after entering `class`.
    #[must_use]
    pub const fn for_class(class: TankClass) -> Self {
        let (preferred_distance, detection_range) = match class {
            TankClass::Sniper | TankClass::Assassin => (600.0, 1000.0),
            TankClass::MachineGun | TankClass::Gunner => (300.0, 500.0),
            TankClass::FlankGuard | TankClass::TriAngle => (200.0, 800.0),
            TankClass::Smasher => (0.0, 400.0),
            _ => (400.0, 800.0),
        };
        Self {
            detection_range,
            preferred_distance,
            wander_radius: Self::WANDER_RADIUS,
        }
    }
}

/// What the brain sees when deciding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiView {
    /// Own position.
    pub position: Vec2,
    /// Own full movement speed.
    pub speed: f32,
    /// Own class.
    pub class: TankClass,
    /// Tracked opponent position.
    pub opponent: Vec2,
    /// Arena half-extent for clamping wander targets.
    pub half_extent: Vec2,
}

/// Output of one decision tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiDecision {
    /// State after the decision.
    pub state: AiState,
    /// Desired movement velocity.
    pub velocity: Vec2,
    /// New aim direction, when the opponent is in range.
    pub aim: Option<Vec2>,
    /// Point to shoot at, when the aim is good enough.
    pub fire_at: Option<Vec2>,
}

/// Output of one upgrade tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradePlan {
    /// One pick per available stat point.
    pub stats: Vec<StatKind>,
    /// Class to move into, if any upgrade is open.
    pub class: Option<TankClass>,
}

/// Which of the brain's countdowns elapsed this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiTimers {
    /// A behavior decision is due.
    pub decide: bool,
    /// An upgrade pass is due.
    pub upgrade: bool,
}

/// Per-tank decision state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiBrain {
    state: AiState,
    profile: AiProfile,
    decision_timer: Countdown,
    upgrade_timer: Countdown,
    strategy_elapsed: f32,
    next_strategy_change: f32,
    strafe_sign: f32,
    wander_target: Option<Vec2>,
}

impl AiBrain {
    /// A fresh brain for a tank of `class`, on the default countdowns.
    #[must_use]
    pub fn new(class: TankClass) -> Self {
        Self::with_tuning(class, &AiTuning::default())
    }

    /// A fresh brain using the given countdown periods.
    #[must_use]
    pub fn with_tuning(class: TankClass, tuning: &AiTuning) -> Self {
        Self {
            state: AiState::Wander,
            profile: AiProfile::for_class(class),
            decision_timer: Countdown::new(tuning.decision_interval),
            upgrade_timer: Countdown::new(tuning.upgrade_interval),
            strategy_elapsed: 0.0,
            next_strategy_change: 0.0,
            strafe_sign: 1.0,
            wander_target: None,
        }
    }

    /// Current behavior state.
    #[must_use]
    pub const fn state(&self) -> AiState {
        self.state
    }

    /// Current behavior ranges.
    #[must_use]
    pub const fn profile(&self) -> &AiProfile {
        &self.profile
    }

    /// The point being wandered toward, if one is set.
    #[must_use]
    pub const fn wander_target(&self) -> Option<Vec2> {
        self.wander_target
    }

    /// Lateral strafe direction, `1.0` or `-1.0`.
    #[must_use]
    pub const fn strafe_sign(&self) -> f32 {
        self.strafe_sign
    }

    /// Re-tunes behavior ranges after a class change.
    pub fn adopt_class(&mut self, class: TankClass) {
        self.profile = AiProfile::for_class(class);
    }

    /// Advances both countdowns.
    pub fn tick(&mut self, dt: f32) -> AiTimers {
        AiTimers {
            decide: self.decision_timer.tick(dt),
            upgrade: self.upgrade_timer.tick(dt),
        }
    }

    /// Runs one behavior decision against the opponent.
    pub fn decide<R: Rng>(&mut self, view: &AiView, tuning: &AiTuning, rng: &mut R) -> AiDecision {
        let to_opponent = view.opponent - view.position;
        let distance = to_opponent.length();
        let direction = to_opponent.normalize_or_zero();

        self.advance_strategy(tuning, rng);
        self.state = next_state(self.state, distance, &self.profile, view.class);

        let velocity = match self.state {
            AiState::Wander => self.wander_velocity(view, tuning, rng),
            AiState::Chase => direction * view.speed,
            AiState::Retreat => -direction * view.speed,
            AiState::Combat => {
                direction.perp() * self.strafe_sign * view.speed * tuning.combat_speed_factor
            }
            AiState::Flank => {
                let flank_point = view.opponent
                    + direction.perp() * self.strafe_sign * self.profile.preferred_distance;
                let velocity = (flank_point - view.position).normalize_or_zero() * view.speed;
                if view.position.distance(flank_point) < tuning.capture_radius {
                    self.state = AiState::Combat;
                }
                velocity
            }
        };

        let (aim, fire_at) = if distance <= self.profile.detection_range {
            let solution = aim_at(
                rng,
                direction,
                distance,
                self.profile.detection_range,
                view.class,
                tuning,
            );
            (
                Some(solution.direction),
                solution.fire.then_some(view.opponent),
            )
        } else {
            (None, None)
        };

        AiDecision {
            state: self.state,
            velocity,
            aim,
            fire_at,
        }
    }

    /// Picks stats for every unspent point and, past level 15, a class upgrade.
    pub fn plan_upgrades<R: Rng>(
        stats: &StatBlock,
        class: &ClassState,
        rng: &mut R,
    ) -> UpgradePlan {
        let mut plan = UpgradePlan::default();
        for _ in 0..stats.available_points() {
            if let Some(kind) = AUTO_SPEND_POOL.choose(rng) {
                plan.stats.push(*kind);
            }
        }

        if stats.level() >= TIER_LEVELS[0] {
            plan.class = class.available_upgrades(stats.level()).choose(rng).copied();
        }
        plan
    }

    fn advance_strategy<R: Rng>(&mut self, tuning: &AiTuning, rng: &mut R) {
        self.strategy_elapsed += tuning.decision_interval;
        if self.strategy_elapsed < self.next_strategy_change {
            return;
        }

        self.strategy_elapsed = 0.0;
        self.next_strategy_change = if tuning.strategy_max > tuning.strategy_min {
            rng.gen_range(tuning.strategy_min..tuning.strategy_max)
        } else {
            tuning.strategy_min
        };
        self.strafe_sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

        if self.state == AiState::Combat && rng.gen_bool(tuning.flank_chance.clamp(0.0, 1.0)) {
            self.state = AiState::Flank;
        }
    }

    fn wander_velocity<R: Rng>(&mut self, view: &AiView, tuning: &AiTuning, rng: &mut R) -> Vec2 {
        let reached = self
            .wander_target
            .map_or(true, |target| view.position.distance(target) < tuning.capture_radius);

        let target = match self.wander_target {
            Some(target) if !reached => target,
            _ => {
                let angle = rng.gen::<f32>() * TAU;
                let radius = rng.gen::<f32>() * self.profile.wander_radius;
                let target =
                    clamp_to_bounds(view.position + polar(angle, radius), view.half_extent);
                self.wander_target = Some(target);
                target
            }
        };

        (target - view.position).normalize_or_zero() * view.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn view(position: Vec2, opponent: Vec2) -> AiView {
        AiView {
            position,
            speed: 300.0,
            class: TankClass::Basic,
            opponent,
            half_extent: Vec2::splat(1500.0),
        }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(99)
    }

    mod profile_tests {
        use super::*;

        #[test]
        fn class_profiles() {
            assert_eq!(AiProfile::for_class(TankClass::Basic).detection_range, 800.0);
            assert_eq!(AiProfile::for_class(TankClass::Assassin).preferred_distance, 600.0);
            assert_eq!(AiProfile::for_class(TankClass::Gunner).detection_range, 500.0);
            assert_eq!(AiProfile::for_class(TankClass::TriAngle).preferred_distance, 200.0);
            assert_eq!(AiProfile::for_class(TankClass::Smasher).preferred_distance, 0.0);
        }

        #[test]
        fn adopt_class_switches_profile() {
            let mut brain = AiBrain::new(TankClass::Basic);
            brain.adopt_class(TankClass::Sniper);
            assert_eq!(brain.profile().detection_range, 1000.0);
        }
    }

    mod decision_tests {
        use super::*;

        #[test]
        fn far_opponent_means_wander_without_fire() {
            let mut brain = AiBrain::new(TankClass::Basic);
            let mut rng = rng();
            let decision = brain.decide(
                &view(Vec2::ZERO, Vec2::new(900.0, 0.0)),
                &AiTuning::default(),
                &mut rng,
            );
            assert_eq!(decision.state, AiState::Wander);
            assert!(decision.aim.is_none());
            assert!(decision.fire_at.is_none());

            let target = brain.wander_target().unwrap();
            assert!(target.length() <= 200.0 + 1e-3);
            if target.length() > 1e-3 {
                assert!((decision.velocity.length() - 300.0).abs() < 1e-2);
            }
        }

        #[test]
        fn close_opponent_means_retreat() {
            let mut brain = AiBrain::new(TankClass::Basic);
            let decision = brain.decide(
                &view(Vec2::ZERO, Vec2::new(100.0, 0.0)),
                &AiTuning::default(),
                &mut rng(),
            );
            assert_eq!(decision.state, AiState::Retreat);
            assert!((decision.velocity - Vec2::new(-300.0, 0.0)).length() < 1e-3);
            assert!(decision.aim.is_some());
        }

        #[test]
        fn distant_but_detected_means_chase() {
            let mut brain = AiBrain::new(TankClass::Basic);
            let decision = brain.decide(
                &view(Vec2::ZERO, Vec2::new(0.0, 700.0)),
                &AiTuning::default(),
                &mut rng(),
            );
            assert_eq!(decision.state, AiState::Chase);
            assert!((decision.velocity - Vec2::new(0.0, 300.0)).length() < 1e-3);
        }

        #[test]
        fn combat_strafes_perpendicular_at_reduced_speed() {
            let mut tuning = AiTuning::default();
            tuning.flank_chance = 0.0;
            let mut brain = AiBrain::new(TankClass::Basic);
            let decision = brain.decide(
                &view(Vec2::ZERO, Vec2::new(400.0, 0.0)),
                &tuning,
                &mut rng(),
            );
            assert_eq!(decision.state, AiState::Combat);
            assert!(decision.velocity.x.abs() < 1e-3);
            assert!((decision.velocity.y.abs() - 210.0).abs() < 1e-2);
        }

        #[test]
        fn combat_turns_into_flank_when_strategy_rolls_it() {
            let mut tuning = AiTuning::default();
            tuning.flank_chance = 1.0;
            let mut brain = AiBrain::new(TankClass::Basic);
            let mut rng = rng();
            let v = view(Vec2::ZERO, Vec2::new(400.0, 0.0));

            // First decision rolls strategy before entering combat
            assert_eq!(brain.decide(&v, &tuning, &mut rng).state, AiState::Combat);

            let mut flanked = false;
            for _ in 0..40 {
                if brain.decide(&v, &tuning, &mut rng).state == AiState::Flank {
                    flanked = true;
                    break;
                }
            }
            assert!(flanked);
        }

        #[test]
        fn flank_reverts_to_combat_at_capture_point() {
            let mut tuning = AiTuning::default();
            tuning.flank_chance = 1.0;
            let mut brain = AiBrain::new(TankClass::Basic);
            brain.state = AiState::Flank;
            brain.next_strategy_change = 100.0;
            brain.profile.preferred_distance = 30.0;

            // 30 from the opponent keeps Flank inside the band; the flank
            // point sits sqrt(30² + 30²) away, inside the capture radius
            let opponent = Vec2::new(400.0, 0.0);
            let decision = brain.decide(
                &view(Vec2::new(430.0, 0.0), opponent),
                &tuning,
                &mut rng(),
            );
            assert_eq!(decision.state, AiState::Combat);
        }

        #[test]
        fn flank_heads_beside_the_opponent() {
            let mut brain = AiBrain::new(TankClass::Basic);
            brain.state = AiState::Flank;
            brain.next_strategy_change = 100.0;

            let decision = brain.decide(
                &view(Vec2::ZERO, Vec2::new(400.0, 0.0)),
                &AiTuning::default(),
                &mut rng(),
            );
            assert_eq!(decision.state, AiState::Flank);
            // Flank point is (400, 400) for a positive strafe sign
            let expected = Vec2::new(400.0, 400.0).normalize() * 300.0;
            assert!((decision.velocity - expected).length() < 1e-2);
        }

        #[test]
        fn smasher_chases_to_ram() {
            let mut brain = AiBrain::new(TankClass::Smasher);
            let mut v = view(Vec2::ZERO, Vec2::new(50.0, 0.0));
            v.class = TankClass::Smasher;
            let decision = brain.decide(&v, &AiTuning::default(), &mut rng());
            assert_eq!(decision.state, AiState::Chase);
            // Smashers have no barrels but still track the opponent
            assert!(decision.aim.is_some());
        }

        #[test]
        fn fire_target_is_opponent_position() {
            let mut brain = AiBrain::new(TankClass::MachineGun);
            let mut v = view(Vec2::ZERO, Vec2::new(250.0, 0.0));
            v.class = TankClass::MachineGun;
            let decision = brain.decide(&v, &AiTuning::default(), &mut rng());
            assert_eq!(decision.fire_at, Some(Vec2::new(250.0, 0.0)));
        }
    }

    mod timer_tests {
        use super::*;

        #[test]
        fn decisions_are_coarser_than_physics() {
            let mut brain = AiBrain::new(TankClass::Basic);
            let mut decisions = 0;
            let mut upgrades = 0;
            for _ in 0..120 {
                let timers = brain.tick(1.0 / 60.0);
                decisions += usize::from(timers.decide);
                upgrades += usize::from(timers.upgrade);
            }
            assert_eq!(decisions, 10);
            assert_eq!(upgrades, 2);
        }
    }

    mod upgrade_tests {
        use super::*;

        #[test]
        fn spends_every_point_from_pool() {
            let mut stats = StatBlock::new();
            stats.add_experience(1000.0);
            let points = stats.available_points();
            let plan = AiBrain::plan_upgrades(&stats, &ClassState::new(), &mut rng());
            assert_eq!(plan.stats.len(), points as usize);
            assert!(plan.stats.iter().all(|s| AUTO_SPEND_POOL.contains(s)));
            assert!(plan.class.is_none());
        }

        #[test]
        fn picks_available_class_past_fifteen() {
            let mut stats = StatBlock::new();
            stats.add_experience(1.0e6);
            assert!(stats.level() >= 15);
            let state = ClassState::new();
            let plan = AiBrain::plan_upgrades(&stats, &state, &mut rng());
            let chosen = plan.class.unwrap();
            assert!(state.can_upgrade_to(chosen, stats.level()));
        }
    }
}

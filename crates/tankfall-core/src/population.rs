//! Automatic population: shapes to farm and AI tanks to fight.
//!
//! Both spawners only *plan* spawns; the simulation performs them so that
//! every entity goes through the same arena bookkeeping and events.
//!
//! - [`ShapeSpawner`] tops the arena up to `max_shapes`, picking kinds by
//!   weight and positions uniformly inside the bounds.
//! - [`TankSpawner`] runs on a countdown and, while a living player exists
//!   and the AI cap isn't reached, picks a point on a ring around the player.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::arena::Arena;
use crate::config::PopulationConfig;
use crate::entity::{EntityTag, ShapeKind};
use crate::math::{polar, within_bounds};
use crate::timer::Countdown;

/// Chooses shape kinds and positions.
#[derive(Debug, Clone)]
pub struct ShapeSpawner {
    /// `None` when no weight is positive; every pick is then a square.
    weights: Option<WeightedIndex<f32>>,
}

impl ShapeSpawner {
    /// Builds the kind distribution from `config.shape_weights`.
    #[must_use]
    pub fn new(config: &PopulationConfig) -> Self {
        Self {
            weights: WeightedIndex::new(config.shape_weights).ok(),
        }
    }

    /// Draws a shape kind by weight.
    pub fn pick_kind<R: Rng>(&self, rng: &mut R) -> ShapeKind {
        self.weights
            .as_ref()
            .and_then(|weights| ShapeKind::ALL.get(weights.sample(rng)))
            .copied()
            .unwrap_or(ShapeKind::Square)
    }

    /// Uniform position inside `[-half_extent, half_extent]`.
    pub fn pick_position<R: Rng>(half_extent: Vec2, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.gen_range(-half_extent.x..=half_extent.x),
            rng.gen_range(-half_extent.y..=half_extent.y),
        )
    }

    /// Shapes needed to bring the arena back to `max_shapes`.
    pub fn plan_refill<R: Rng>(
        &self,
        arena: &Arena,
        config: &PopulationConfig,
        rng: &mut R,
    ) -> Vec<(ShapeKind, Vec2)> {
        let missing = config
            .max_shapes
            .saturating_sub(arena.count_alive_with_tag(EntityTag::Shape));
        (0..missing)
            .map(|_| {
                let kind = self.pick_kind(rng);
                (kind, Self::pick_position(arena.half_extent(), rng))
            })
            .collect()
    }
}

/// Periodically finds a spot for a new AI tank.
#[derive(Debug, Clone)]
pub struct TankSpawner {
    timer: Countdown,
}

impl TankSpawner {
    /// A spawner on the configured interval.
    #[must_use]
    pub const fn new(config: &PopulationConfig) -> Self {
        Self {
            timer: Countdown::new(config.ai_spawn_interval),
        }
    }

    /// Seconds until the next attempt.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.timer.remaining()
    }

    /// Advances the countdown; on an attempt, returns where to spawn.
    ///
    /// Returns `None` between attempts, without a living player, at the AI
    /// cap, or when no sampled point lands inside the arena.
    pub fn tick<R: Rng>(
        &mut self,
        dt: f32,
        arena: &Arena,
        config: &PopulationConfig,
        rng: &mut R,
    ) -> Option<Vec2> {
        if !self.timer.tick(dt) {
            return None;
        }
        let player = arena
            .player_id()
            .and_then(|id| arena.living_tank(id))?
            .transform
            .position;
        if arena.count_alive_with_tag(EntityTag::Ai) >= config.max_ai_tanks {
            return None;
        }

        let spot = Self::find_spawn_point(player, arena.half_extent(), config, rng);
        if spot.is_none() {
            debug!(attempts = config.ai_spawn_attempts, "no room to spawn an ai tank");
        }
        spot
    }

    /// Samples up to `ai_spawn_attempts` points on the spawn ring around
    /// `around` and returns the first inside the arena.
    pub fn find_spawn_point<R: Rng>(
        around: Vec2,
        half_extent: Vec2,
        config: &PopulationConfig,
        rng: &mut R,
    ) -> Option<Vec2> {
        let (min, max) = (config.ai_spawn_min_distance, config.ai_spawn_max_distance);
        (0..config.ai_spawn_attempts).find_map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let distance = if max > min { rng.gen_range(min..=max) } else { min };
            let candidate = around + polar(angle, distance);
            within_bounds(candidate, half_extent).then_some(candidate)
        })
    }

    /// Restarts the countdown.
    pub fn reset(&mut self) {
        self.timer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::entity::{EntityInner, ShapeComponents, TankComponents};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(21)
    }

    fn spawn_player(arena: &mut Arena, position: Vec2) {
        let tank = TankComponents::player(position, &SimConfig::default().tanks);
        arena.spawn(EntityTag::Player, EntityInner::Tank(tank));
    }

    mod shape_tests {
        use super::*;

        #[test]
        fn refill_tops_up_to_the_cap() {
            let config = SimConfig::default();
            let mut arena = Arena::new();
            let profile = *config.shapes.profile(ShapeKind::Square);
            for _ in 0..10 {
                arena.spawn(
                    EntityTag::Shape,
                    EntityInner::Shape(ShapeComponents::new(
                        ShapeKind::Square,
                        Vec2::ZERO,
                        profile,
                    )),
                );
            }

            let plan = ShapeSpawner::new(&config.population).plan_refill(
                &arena,
                &config.population,
                &mut rng(),
            );
            assert_eq!(plan.len(), config.population.max_shapes - 10);
            let half = arena.half_extent();
            assert!(plan.iter().all(|(_, position)| within_bounds(*position, half)));
        }

        #[test]
        fn weights_pick_the_kind() {
            let population = PopulationConfig {
                shape_weights: [0.0, 0.0, 1.0, 0.0],
                ..PopulationConfig::default()
            };
            let spawner = ShapeSpawner::new(&population);
            let mut rng = rng();
            assert!((0..50).all(|_| spawner.pick_kind(&mut rng) == ShapeKind::Pentagon));
        }

        #[test]
        fn zero_weights_fall_back_to_squares() {
            let population = PopulationConfig {
                shape_weights: [0.0; 4],
                ..PopulationConfig::default()
            };
            let spawner = ShapeSpawner::new(&population);
            assert_eq!(spawner.pick_kind(&mut rng()), ShapeKind::Square);
        }

        #[test]
        fn default_weights_favour_squares() {
            let spawner = ShapeSpawner::new(&PopulationConfig::default());
            let mut rng = rng();
            let squares = (0..1000)
                .filter(|_| spawner.pick_kind(&mut rng) == ShapeKind::Square)
                .count();
            assert!(squares > 600 && squares < 800, "squares = {squares}");
        }
    }

    mod tank_tests {
        use super::*;

        fn first_attempt(
            spawner: &mut TankSpawner,
            arena: &Arena,
            config: &PopulationConfig,
        ) -> Option<Vec2> {
            let mut rng = rng();
            // a little over the 5 s interval
            (0..320).find_map(|_| spawner.tick(1.0 / 60.0, arena, config, &mut rng))
        }

        #[test]
        fn spawns_on_the_ring_around_the_player() {
            let config = PopulationConfig::default();
            let mut arena = Arena::new();
            spawn_player(&mut arena, Vec2::ZERO);

            let spot = first_attempt(&mut TankSpawner::new(&config), &arena, &config).unwrap();
            let distance = spot.length();
            assert!(distance >= config.ai_spawn_min_distance - 1e-3);
            assert!(distance <= config.ai_spawn_max_distance + 1e-3);
        }

        #[test]
        fn waits_for_the_interval() {
            let config = PopulationConfig::default();
            let mut arena = Arena::new();
            spawn_player(&mut arena, Vec2::ZERO);
            let mut spawner = TankSpawner::new(&config);
            let mut rng = rng();

            assert!(spawner.tick(1.0, &arena, &config, &mut rng).is_none());
            assert!((spawner.remaining() - 4.0).abs() < 1e-4);
            spawner.reset();
            assert!((spawner.remaining() - config.ai_spawn_interval).abs() < 1e-4);
        }

        #[test]
        fn needs_a_living_player() {
            let config = PopulationConfig::default();
            let arena = Arena::new();
            assert!(first_attempt(&mut TankSpawner::new(&config), &arena, &config).is_none());
        }

        #[test]
        fn respects_the_ai_cap() {
            let config = PopulationConfig {
                max_ai_tanks: 1,
                ..PopulationConfig::default()
            };
            let sim = SimConfig::default();
            let mut arena = Arena::new();
            spawn_player(&mut arena, Vec2::ZERO);
            arena.spawn(
                EntityTag::Ai,
                EntityInner::Tank(TankComponents::ai(Vec2::new(800.0, 0.0), &sim.tanks, &sim.ai)),
            );

            assert!(first_attempt(&mut TankSpawner::new(&config), &arena, &config).is_none());
        }

        #[test]
        fn gives_up_when_the_ring_is_outside() {
            let config = PopulationConfig::default();
            let found =
                TankSpawner::find_spawn_point(Vec2::ZERO, Vec2::splat(100.0), &config, &mut rng());
            assert!(found.is_none());
        }
    }
}

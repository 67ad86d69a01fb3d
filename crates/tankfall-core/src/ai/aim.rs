//! Aiming with simulated inaccuracy.

use glam::Vec2;
use rand::Rng;

use crate::class_tree::TankClass;
use crate::config::AiTuning;

/// Outcome of one aiming pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSolution {
    /// Unit aim direction, error included.
    pub direction: Vec2,
    /// Magnitude of the angular error in radians.
    pub inaccuracy: f32,
    /// True if the error is small enough to take the shot.
    pub fire: bool,
}

/// Aims along `to_target` (unit) with an error that grows with range.
///
/// The error is uniform in `[0, max_inaccuracy × clamp(distance / detection)]`,
/// halved for precision classes, and applied with a random sign. A shot is
/// taken only when the error is below the class threshold.
pub fn aim_at<R: Rng>(
    rng: &mut R,
    to_target: Vec2,
    distance: f32,
    detection_range: f32,
    class: TankClass,
    tuning: &AiTuning,
) -> AimSolution {
    let range_factor = if detection_range > 0.0 {
        (distance / detection_range).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let mut inaccuracy = rng.gen::<f32>() * tuning.max_inaccuracy * range_factor;
    if class.is_precision() {
        inaccuracy *= 0.5;
    }

    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let direction = Vec2::from_angle(inaccuracy * sign).rotate(to_target);

    let threshold = if class.is_rapid_fire() {
        tuning.rapid_fire_threshold
    } else {
        tuning.fire_threshold
    };

    AimSolution {
        direction,
        inaccuracy,
        fire: inaccuracy < threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn point_blank_is_perfect() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let aim = aim_at(&mut rng, Vec2::X, 0.0, 800.0, TankClass::Basic, &AiTuning::default());
        assert_eq!(aim.inaccuracy, 0.0);
        assert!(aim.fire);
        assert!((aim.direction - Vec2::X).length() < 1e-6);
    }

    #[test]
    fn error_bounded_by_range_factor() {
        let tuning = AiTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..500 {
            let aim = aim_at(&mut rng, Vec2::Y, 400.0, 800.0, TankClass::Basic, &tuning);
            assert!(aim.inaccuracy <= 0.1 + 1e-6);
            let d = aim.direction;
            let angle = d.perp_dot(Vec2::Y).abs().atan2(d.dot(Vec2::Y));
            assert!((angle - aim.inaccuracy).abs() < 1e-3);
        }
    }

    #[test]
    fn precision_classes_halve_error() {
        let tuning = AiTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let aim = aim_at(&mut rng, Vec2::X, 2000.0, 800.0, TankClass::Sniper, &tuning);
            assert!(aim.inaccuracy <= 0.1 + 1e-6);
        }
    }

    #[test]
    fn rapid_fire_always_shoots() {
        let tuning = AiTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..500 {
            let aim = aim_at(&mut rng, Vec2::X, 800.0, 800.0, TankClass::MachineGun, &tuning);
            assert!(aim.fire);
        }
    }

    #[test]
    fn fire_matches_threshold() {
        let tuning = AiTuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..500 {
            let aim = aim_at(&mut rng, Vec2::X, 800.0, 800.0, TankClass::Basic, &tuning);
            assert_eq!(aim.fire, aim.inaccuracy < tuning.fire_threshold);
        }
    }
}

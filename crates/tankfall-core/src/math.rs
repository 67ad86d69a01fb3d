//! Small vector helpers used by the resolvers and the AI.

use glam::Vec2;

/// Moves `current` toward `target` by at most `max_delta`, never overshooting.
#[must_use]
pub fn move_toward(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta
    }
}

/// Clamps each axis of `position` to `[-half_extent, half_extent]`.
#[must_use]
pub fn clamp_to_bounds(position: Vec2, half_extent: Vec2) -> Vec2 {
    position.clamp(-half_extent, half_extent)
}

/// Returns true if `position` lies inside (or on) the bounds.
#[must_use]
pub fn within_bounds(position: Vec2, half_extent: Vec2) -> bool {
    position.x.abs() <= half_extent.x && position.y.abs() <= half_extent.y
}

/// Rescales `v` so its length does not exceed `max`.
#[must_use]
pub fn cap_length(v: Vec2, max: f32) -> Vec2 {
    if v.length_squared() > max * max {
        v.normalize_or_zero() * max
    } else {
        v
    }
}

/// Unit vector at `angle` radians plus `length` along it.
#[must_use]
pub fn polar(angle: f32, length: f32) -> Vec2 {
    Vec2::from_angle(angle) * length
}

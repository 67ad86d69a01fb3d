//! Behavior states and the distance-driven transition rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AiProfile;
use crate::class_tree::TankClass;

/// What an AI tank is currently trying to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    /// Drift between random nearby points.
    #[default]
    Wander,
    /// Close the distance to the opponent.
    Chase,
    /// Back away from the opponent.
    Retreat,
    /// Strafe around the opponent at preferred range.
    Combat,
    /// Move to a point beside the opponent.
    Flank,
}

impl fmt::Display for AiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Picks the next state from the distance to the opponent.
///
/// Smashers only know Wander and Chase. Everyone else retreats inside 70% of
/// the preferred distance, chases beyond 130%, and otherwise fights; a Flank
/// in progress is left alone inside that band.
#[must_use]
pub fn next_state(
    current: AiState,
    distance: f32,
    profile: &AiProfile,
    class: TankClass,
) -> AiState {
    if class == TankClass::Smasher {
        return if distance > profile.detection_range {
            AiState::Wander
        } else {
            AiState::Chase
        };
    }

    if distance > profile.detection_range {
        AiState::Wander
    } else if distance < profile.preferred_distance * 0.7 {
        AiState::Retreat
    } else if distance > profile.preferred_distance * 1.3 {
        AiState::Chase
    } else if current == AiState::Flank {
        AiState::Flank
    } else {
        AiState::Combat
    }
}

//! Entity types for the arena.
//!
//! - [`EntityId`]: Unique identifier for entities
//! - [`EntityTag`]: Faction, used for targeting and collision filtering
//! - [`EntityInner`]: Type-safe storage for entity-specific components
//! - [`Entity`]: The complete entity container
//!
//! # Architecture
//!
//! `EntityTag` decides who may collide with whom and which group queries an
//! entity belongs to; `EntityInner` holds the concrete component struct. A
//! player tank and an AI tank share `EntityInner::Tank` but carry different
//! tags.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tankfall_core::config::TankTuning;
//! use tankfall_core::entity::{Entity, EntityId, EntityInner, EntityTag};
//! use tankfall_core::entity::components::TankComponents;
//!
//! let tank = Entity::new(
//!     EntityId::new(42),
//!     EntityTag::Player,
//!     EntityInner::Tank(TankComponents::player(Vec2::ZERO, &TankTuning::default())),
//! );
//!
//! assert_eq!(tank.id().as_u64(), 42);
//! assert!(tank.is_tank());
//! ```

pub mod components;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    CollisionLayers, Pilot, ProjectileComponents, ShapeComponents, ShapeKind, TankComponents,
    TransformState,
};

use crate::health::HealthState;

/// Unique identifier for an entity.
///
/// Entity IDs are assigned monotonically by the arena and never reused, so a
/// stale id held as an attacker reference simply fails to resolve once its
/// entity is gone.
///
/// # Example
///
/// ```
/// use tankfall_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Faction tag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The host-controlled tank.
    Player,
    /// A tank driven by the decision engine.
    Ai,
    /// An environmental shape.
    Shape,
    /// A bullet in flight.
    Projectile,
}

impl EntityTag {
    /// The layer this faction occupies.
    #[must_use]
    pub const fn layer(self) -> CollisionLayers {
        match self {
            Self::Player | Self::Ai => CollisionLayers::TANK,
            Self::Shape => CollisionLayers::SHAPE,
            Self::Projectile => CollisionLayers::PROJECTILE,
        }
    }

    /// The layers this faction collides with.
    #[must_use]
    pub const fn mask(self) -> CollisionLayers {
        match self {
            Self::Player | Self::Ai | Self::Shape => CollisionLayers::all(),
            Self::Projectile => CollisionLayers::TANK.union(CollisionLayers::SHAPE),
        }
    }

    /// True if both factions accept each other.
    #[must_use]
    pub const fn collides_with(self, other: Self) -> bool {
        self.mask().contains(other.layer()) && other.mask().contains(self.layer())
    }

    /// True for player and AI tanks.
    #[must_use]
    pub const fn is_tank(self) -> bool {
        matches!(self, Self::Player | Self::Ai)
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "Player"),
            Self::Ai => write!(f, "Ai"),
            Self::Shape => write!(f, "Shape"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

/// Type-safe storage for entity-specific components.
///
/// The variant should always match the entity's tag: `Player` and `Ai` pair
/// with `Tank`, `Shape` with `Shape`, `Projectile` with `Projectile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Tank components.
    Tank(TankComponents),
    /// Shape components.
    Shape(ShapeComponents),
    /// Projectile components.
    Projectile(ProjectileComponents),
}

impl EntityInner {
    /// Returns a reference to the tank components, if this is a tank.
    #[must_use]
    pub const fn as_tank(&self) -> Option<&TankComponents> {
        match self {
            Self::Tank(components) => Some(components),
            _ => None,
        }
    }

    /// Returns a mutable reference to the tank components, if this is a tank.
    #[must_use]
    pub fn as_tank_mut(&mut self) -> Option<&mut TankComponents> {
        match self {
            Self::Tank(components) => Some(components),
            _ => None,
        }
    }

    /// Returns a reference to the shape components, if this is a shape.
    #[must_use]
    pub const fn as_shape(&self) -> Option<&ShapeComponents> {
        match self {
            Self::Shape(components) => Some(components),
            _ => None,
        }
    }

    /// Returns a mutable reference to the shape components, if this is a shape.
    #[must_use]
    pub fn as_shape_mut(&mut self) -> Option<&mut ShapeComponents> {
        match self {
            Self::Shape(components) => Some(components),
            _ => None,
        }
    }

    /// Returns a reference to the projectile components, if this is a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileComponents> {
        match self {
            Self::Projectile(components) => Some(components),
            _ => None,
        }
    }

    /// Returns a mutable reference to the projectile components, if this is a projectile.
    #[must_use]
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileComponents> {
        match self {
            Self::Projectile(components) => Some(components),
            _ => None,
        }
    }

    /// Position of whatever this is.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        match self {
            Self::Tank(c) => c.transform.position,
            Self::Shape(c) => c.transform.position,
            Self::Projectile(c) => c.transform.position,
        }
    }

    /// Collision radius of whatever this is.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        match self {
            Self::Tank(c) => c.radius,
            Self::Shape(c) => c.radius(),
            Self::Projectile(c) => c.radius,
        }
    }

    /// Health, for damageable entities.
    #[must_use]
    pub const fn health(&self) -> Option<&HealthState> {
        match self {
            Self::Tank(c) => Some(&c.health),
            Self::Shape(c) => Some(&c.health),
            Self::Projectile(_) => None,
        }
    }

    /// Mutable health, for damageable entities.
    #[must_use]
    pub fn health_mut(&mut self) -> Option<&mut HealthState> {
        match self {
            Self::Tank(c) => Some(&mut c.health),
            Self::Shape(c) => Some(&mut c.health),
            Self::Projectile(_) => None,
        }
    }
}

/// A complete entity in the arena.
///
/// # Invariants
///
/// - The `EntityId` is unique within an arena
/// - The `EntityTag` matches the `EntityInner` variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    tag: EntityTag,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new entity with the given ID, tag, and inner storage.
    #[must_use]
    pub const fn new(id: EntityId, tag: EntityTag, inner: EntityInner) -> Self {
        Self { id, tag, inner }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's faction.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.tag
    }

    /// Returns a reference to the entity's inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Returns `true` if this entity is a tank of either faction.
    #[must_use]
    pub const fn is_tank(&self) -> bool {
        self.tag.is_tank()
    }

    /// Returns `true` if this entity is a shape.
    #[must_use]
    pub const fn is_shape(&self) -> bool {
        matches!(self.tag, EntityTag::Shape)
    }

    /// Returns `true` if this entity is a projectile.
    #[must_use]
    pub const fn is_projectile(&self) -> bool {
        matches!(self.tag, EntityTag::Projectile)
    }

    /// Returns `true` if the entity has health and it has run out.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.inner.health().is_some_and(HealthState::is_dead)
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.inner.position()
    }

    /// Collision radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.inner.radius()
    }

    /// Returns the tank components if this is a tank, `None` otherwise.
    #[must_use]
    pub const fn as_tank(&self) -> Option<&TankComponents> {
        self.inner.as_tank()
    }

    /// Returns mutable tank components if this is a tank, `None` otherwise.
    #[must_use]
    pub fn as_tank_mut(&mut self) -> Option<&mut TankComponents> {
        self.inner.as_tank_mut()
    }

    /// Returns the shape components if this is a shape, `None` otherwise.
    #[must_use]
    pub const fn as_shape(&self) -> Option<&ShapeComponents> {
        self.inner.as_shape()
    }

    /// Returns mutable shape components if this is a shape, `None` otherwise.
    #[must_use]
    pub fn as_shape_mut(&mut self) -> Option<&mut ShapeComponents> {
        self.inner.as_shape_mut()
    }

    /// Returns the projectile components if this is a projectile, `None` otherwise.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileComponents> {
        self.inner.as_projectile()
    }

    /// Returns mutable projectile components if this is a projectile, `None` otherwise.
    #[must_use]
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileComponents> {
        self.inner.as_projectile_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ShapeTuning, TankTuning};

    fn tank(id: u64, tag: EntityTag) -> Entity {
        Entity::new(
            EntityId::new(id),
            tag,
            EntityInner::Tank(TankComponents::player(Vec2::new(5.0, 6.0), &TankTuning::default())),
        )
    }

    mod entity_id_tests {
        use super::*;

        #[test]
        fn ordering() {
            let mut ids = vec![EntityId::new(3), EntityId::new(1), EntityId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
        }

        #[test]
        fn debug_and_display_format() {
            let id = EntityId::new(42);
            assert_eq!(format!("{id:?}"), "EntityId(42)");
            assert_eq!(format!("{id}"), "42");
        }

        #[test]
        fn u64_conversions() {
            let id: EntityId = 42u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 42);
        }

        #[test]
        fn serialization_roundtrip() {
            let id = EntityId::new(12345);
            let json = serde_json::to_string(&id).unwrap();
            let deserialized: EntityId = serde_json::from_str(&json).unwrap();
            assert_eq!(id, deserialized);
        }
    }

    mod entity_tag_tests {
        use super::*;

        #[test]
        fn tanks_share_a_layer() {
            assert_eq!(EntityTag::Player.layer(), CollisionLayers::TANK);
            assert_eq!(EntityTag::Ai.layer(), CollisionLayers::TANK);
            assert!(EntityTag::Player.is_tank());
            assert!(!EntityTag::Shape.is_tank());
        }

        #[test]
        fn projectiles_ignore_projectiles() {
            assert!(!EntityTag::Projectile.collides_with(EntityTag::Projectile));
            assert!(EntityTag::Projectile.collides_with(EntityTag::Shape));
            assert!(EntityTag::Projectile.collides_with(EntityTag::Ai));
            assert!(EntityTag::Shape.collides_with(EntityTag::Shape));
            assert!(EntityTag::Player.collides_with(EntityTag::Ai));
        }

        #[test]
        fn display_format() {
            assert_eq!(EntityTag::Player.to_string(), "Player");
            assert_eq!(EntityTag::Projectile.to_string(), "Projectile");
        }
    }

    mod entity_tests {
        use super::*;

        #[test]
        fn accessors_match_variant() {
            let mut entity = tank(1, EntityTag::Ai);
            assert!(entity.is_tank());
            assert!(!entity.is_shape());
            assert!(entity.as_tank().is_some());
            assert!(entity.as_tank_mut().is_some());
            assert!(entity.as_shape().is_none());
            assert!(entity.as_projectile().is_none());
            assert_eq!(entity.position(), Vec2::new(5.0, 6.0));
            assert_eq!(entity.radius(), 24.0);
        }

        #[test]
        fn shape_health_is_reachable_generically() {
            let shape = ShapeComponents::new(
                ShapeKind::Square,
                Vec2::ZERO,
                ShapeTuning::default().square,
            );
            let mut entity =
                Entity::new(EntityId::new(2), EntityTag::Shape, EntityInner::Shape(shape));
            assert!(!entity.is_dead());

            entity
                .inner_mut()
                .health_mut()
                .unwrap()
                .apply_damage(100.0, None);
            assert!(entity.is_dead());
        }

        #[test]
        fn tag_serialization_roundtrip() {
            let json = serde_json::to_string(&EntityTag::Ai).unwrap();
            let tag: EntityTag = serde_json::from_str(&json).unwrap();
            assert_eq!(tag, EntityTag::Ai);
        }
    }
}

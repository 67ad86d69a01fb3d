//! Arena module: the container for every entity in a match.
//!
//! The Arena provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - A spatial index for proximity and overlap queries
//! - Entity lifecycle management (spawn/despawn)
//! - Group queries by faction tag
//! - The rectangular bound every movable entity is clamped to
//!
//! # Spatial Index Synchronization
//!
//! The spatial index is NOT automatically synchronized when entity positions
//! change. After moving entities through `get_mut()`, call
//! [`Arena::update_spatial`] for one entity or [`Arena::refresh_spatial`] for
//! all of them before running queries. Spawning and despawning update the
//! index automatically.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use tankfall_core::arena::Arena;
//! use tankfall_core::config::TankTuning;
//! use tankfall_core::entity::{EntityInner, EntityTag, TankComponents};
//!
//! let mut arena = Arena::new();
//! let tuning = TankTuning::default();
//!
//! let a = arena.spawn(
//!     EntityTag::Player,
//!     EntityInner::Tank(TankComponents::player(Vec2::ZERO, &tuning)),
//! );
//! let b = arena.spawn(
//!     EntityTag::Ai,
//!     EntityInner::Tank(TankComponents::player(Vec2::new(30.0, 0.0), &tuning)),
//! );
//!
//! assert_eq!(arena.spatial().overlapping_pairs(), vec![(a, b)]);
//! ```

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::{
    Entity, EntityId, EntityInner, EntityTag, ProjectileComponents, ShapeComponents,
    TankComponents,
};

/// Default arena half-extent (a 3000 × 3000 field).
pub const DEFAULT_HALF_EXTENT: Vec2 = Vec2::new(1500.0, 1500.0);

// =============================================================================
// Spatial Index
// =============================================================================

/// One indexed body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialEntry {
    /// Center.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Faction, for collision filtering.
    pub tag: EntityTag,
}

impl SpatialEntry {
    fn overlaps(&self, other: &Self) -> bool {
        let reach = self.radius + other.radius;
        self.position.distance_squared(other.position) < reach * reach
    }
}

/// Spatial index for proximity and overlap queries.
///
/// Entries live in a `BTreeMap` so every scan visits ids in order. Overlap
/// detection sorts entries along the x axis and sweeps, which keeps a full
/// arena of shapes cheap without a grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    entries: BTreeMap<EntityId, SpatialEntry>,
}

impl SpatialIndex {
    /// Creates a new empty spatial index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Inserts or updates an entry.
    pub fn insert(&mut self, id: EntityId, entry: SpatialEntry) {
        self.entries.insert(id, entry);
    }

    /// Removes an entity from the spatial index.
    pub fn remove(&mut self, id: EntityId) {
        self.entries.remove(&id);
    }

    /// Returns the indexed position of an entity, if known.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec2> {
        self.entries.get(&id).map(|entry| entry.position)
    }

    /// Entities whose center lies within `radius` of `center`, sorted by ID.
    #[must_use]
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        self.entries
            .iter()
            .filter(|(_, entry)| center.distance_squared(entry.position) <= radius_sq)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Every pair of bodies that currently overlap and whose factions collide.
    ///
    /// Each pair appears once as `(lower id, higher id)`; the list is sorted.
    #[must_use]
    pub fn overlapping_pairs(&self) -> Vec<(EntityId, EntityId)> {
        let mut sweep: Vec<(EntityId, &SpatialEntry)> =
            self.entries.iter().map(|(id, entry)| (*id, entry)).collect();
        sweep.sort_by(|a, b| {
            let a_min = a.1.position.x - a.1.radius;
            let b_min = b.1.position.x - b.1.radius;
            a_min.total_cmp(&b_min).then(a.0.cmp(&b.0))
        });

        let mut pairs = Vec::new();
        for (i, (id_a, a)) in sweep.iter().enumerate() {
            let a_max = a.position.x + a.radius;
            for (id_b, b) in &sweep[i + 1..] {
                if b.position.x - b.radius > a_max {
                    break;
                }
                if a.tag.collides_with(b.tag) && a.overlaps(b) {
                    pairs.push(if id_a < id_b {
                        (*id_a, *id_b)
                    } else {
                        (*id_b, *id_a)
                    });
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }

    /// Returns the number of entities in the spatial index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the spatial index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

// =============================================================================
// Arena
// =============================================================================

/// The match container.
///
/// # Determinism
///
/// Entity IDs are assigned monotonically and stored in a `BTreeMap`, so
/// iterating always visits entities in spawn order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    /// Monotonically increasing entity ID counter.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Spatial index for proximity queries.
    spatial: SpatialIndex,
    /// Current simulation tick.
    tick: u64,
    /// Half the playfield size.
    half_extent: Vec2,
}

impl Arena {
    /// Creates an empty arena with the default bounds.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bounds(DEFAULT_HALF_EXTENT)
    }

    /// Creates an empty arena clamped to `[-half_extent, half_extent]`.
    #[must_use]
    pub fn with_bounds(half_extent: Vec2) -> Self {
        Self {
            next_id: 0,
            entities: BTreeMap::new(),
            spatial: SpatialIndex::new(),
            tick: 0,
            half_extent,
        }
    }

    /// Half the playfield size.
    #[must_use]
    pub const fn half_extent(&self) -> Vec2 {
        self.half_extent
    }

    /// Spawns a new entity and indexes it.
    pub fn spawn(&mut self, tag: EntityTag, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = Entity::new(id, tag, inner);
        self.spatial.insert(id, Self::spatial_entry(&entity));
        self.entities.insert(id, entity);
        id
    }

    /// Removes an entity from storage and the spatial index.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.spatial.remove(id);
        self.entities.remove(&id)
    }

    /// Removes every entity carrying one of `tags`. Returns the removed ids.
    pub fn despawn_tagged(&mut self, tags: &[EntityTag]) -> Vec<EntityId> {
        let doomed: Vec<EntityId> = self
            .entities
            .values()
            .filter(|entity| tags.contains(&entity.tag()))
            .map(Entity::id)
            .collect();
        for id in &doomed {
            self.despawn(*id);
        }
        doomed
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// True if `id` is still in the arena.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Tank components by ID.
    #[must_use]
    pub fn tank(&self, id: EntityId) -> Option<&TankComponents> {
        self.get(id).and_then(Entity::as_tank)
    }

    /// Mutable tank components by ID.
    #[must_use]
    pub fn tank_mut(&mut self, id: EntityId) -> Option<&mut TankComponents> {
        self.get_mut(id).and_then(Entity::as_tank_mut)
    }

    /// Shape components by ID.
    #[must_use]
    pub fn shape(&self, id: EntityId) -> Option<&ShapeComponents> {
        self.get(id).and_then(Entity::as_shape)
    }

    /// Mutable shape components by ID.
    #[must_use]
    pub fn shape_mut(&mut self, id: EntityId) -> Option<&mut ShapeComponents> {
        self.get_mut(id).and_then(Entity::as_shape_mut)
    }

    /// Projectile components by ID.
    #[must_use]
    pub fn projectile(&self, id: EntityId) -> Option<&ProjectileComponents> {
        self.get(id).and_then(Entity::as_projectile)
    }

    /// Mutable projectile components by ID.
    #[must_use]
    pub fn projectile_mut(&mut self, id: EntityId) -> Option<&mut ProjectileComponents> {
        self.get_mut(id).and_then(Entity::as_projectile_mut)
    }

    /// Resolves `id` to a living tank, if it still is one.
    #[must_use]
    pub fn living_tank(&self, id: EntityId) -> Option<&TankComponents> {
        self.tank(id).filter(|tank| tank.is_alive())
    }

    /// Returns an iterator over entity IDs in deterministic (sorted) order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Returns an iterator over entities in deterministic (sorted by ID) order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Returns an iterator over mutable entities in deterministic order.
    pub fn entities_sorted_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// IDs of every entity in a faction, in order.
    #[must_use]
    pub fn ids_with_tag(&self, tag: EntityTag) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.tag() == tag)
            .map(Entity::id)
            .collect()
    }

    /// Number of living (or non-damageable) entities in a faction.
    #[must_use]
    pub fn count_alive_with_tag(&self, tag: EntityTag) -> usize {
        self.entities
            .values()
            .filter(|entity| entity.tag() == tag && !entity.is_dead())
            .count()
    }

    /// The player tank's ID, if one exists.
    #[must_use]
    pub fn player_id(&self) -> Option<EntityId> {
        self.entities
            .values()
            .find(|entity| entity.tag() == EntityTag::Player)
            .map(Entity::id)
    }

    /// Returns the number of entities in the arena.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns a reference to the spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Re-syncs one entity's spatial entry after it moved.
    pub fn update_spatial(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get(&id) {
            self.spatial.insert(id, Self::spatial_entry(entity));
        }
    }

    /// Rebuilds the whole spatial index from current positions.
    pub fn refresh_spatial(&mut self) {
        self.spatial.clear();
        for (id, entity) in &self.entities {
            self.spatial.insert(*id, Self::spatial_entry(entity));
        }
    }

    fn spatial_entry(entity: &Entity) -> SpatialEntry {
        SpatialEntry {
            position: entity.position(),
            radius: entity.radius(),
            tag: entity.tag(),
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

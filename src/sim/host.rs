//! Collaborator interfaces the simulation consumes but never implements
//!
//! - Spatial queries (disc overlap, line of sight, rays) filtered by
//!   explicit categories instead of layer bitmasks
//! - Entity lifecycle (spawn, destroy, impulses, body mode)
//! - Loot pools attached to liquid bodies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::loot::LootEntry;

/// Identifier of a collider in the spatial world
pub type BodyId = u32;

/// What a collider represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Liquid,
    Ground,
    Obstacle,
    Character,
    Float,
    Loot,
}

/// Predicate over categories: an optional allow-list plus a deny-list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    only: Option<Vec<Category>>,
    ignore: Vec<Category>,
}

impl QueryFilter {
    /// Admits every category
    pub fn all() -> Self {
        Self::default()
    }

    /// Admits only the listed categories
    pub fn only(categories: &[Category]) -> Self {
        Self {
            only: Some(categories.to_vec()),
            ignore: Vec::new(),
        }
    }

    /// Admits everything except the listed categories
    pub fn ignoring(categories: &[Category]) -> Self {
        Self {
            only: None,
            ignore: categories.to_vec(),
        }
    }

    pub fn admits(&self, category: Category) -> bool {
        if self.ignore.contains(&category) {
            return false;
        }
        self.only
            .as_ref()
            .is_none_or(|only| only.contains(&category))
    }
}

/// A single query result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub body: BodyId,
    pub category: Category,
    /// Contact point (the query origin for overlaps and start-inside casts)
    pub point: Vec2,
    /// Distance from the query origin to `point`
    pub distance: f32,
}

/// Spatial query service
pub trait SpatialQuery {
    /// All admitted colliders overlapping the disc
    fn overlap_disc(&self, center: Vec2, radius: f32, filter: &QueryFilter) -> Vec<Hit>;

    /// First admitted collider crossed by the segment `a -> b`
    fn linecast(&self, a: Vec2, b: Vec2, filter: &QueryFilter) -> Option<Hit>;

    /// Nearest admitted collider along a ray
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<Hit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance <= 0.0 {
            return None;
        }
        self.linecast(origin, origin + dir * max_distance, filter)
    }
}

/// Read-only access to the loot configured on liquid bodies
pub trait LootPools {
    fn loot_pool(&self, body: BodyId) -> Option<&[LootEntry]>;
}

/// Opaque handle to a spawned entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u32);

/// Whether physics or the simulation drives a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    #[default]
    Dynamic,
    Kinematic,
}

/// Entity lifecycle service
///
/// Operations on a handle that no longer exists are no-ops.
pub trait EntityHost {
    fn spawn(&mut self, prefab: &str, position: Vec2, orientation: f32) -> EntityHandle;
    fn destroy(&mut self, handle: EntityHandle);
    fn exists(&self, handle: EntityHandle) -> bool;
    fn apply_impulse(&mut self, handle: EntityHandle, impulse: Vec2);
    fn position(&self, handle: EntityHandle) -> Option<Vec2>;
    fn set_position(&mut self, handle: EntityHandle, position: Vec2);
    fn velocity(&self, handle: EntityHandle) -> Option<Vec2>;
    fn set_velocity(&mut self, handle: EntityHandle, velocity: Vec2);
    fn set_body_kind(&mut self, handle: EntityHandle, kind: BodyKind);
    fn set_collider_enabled(&mut self, handle: EntityHandle, enabled: bool);
}

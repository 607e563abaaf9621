//! Spawned entities (floats, loot items, returned bait)
//!
//! A minimal rigid-body store: unit mass, gravity, linear drag and
//! inelastic contacts against solid scene colliders. Kinematic bodies are
//! moved only by their velocity or by direct placement.

use std::collections::BTreeMap;

use glam::Vec2;

use super::shapes::absorb_velocity;
use super::static_world::StaticWorld;
use crate::sim::host::{BodyKind, Category, EntityHandle, EntityHost, QueryFilter};

/// Default downward acceleration for side-view scenes
pub const SIDE_VIEW_GRAVITY: Vec2 = Vec2::new(0.0, -9.81);
/// Gap kept between a resting body and the surface it touched
const CONTACT_SKIN: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub prefab: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub orientation: f32,
    pub kind: BodyKind,
    pub collider_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct BodyStore {
    bodies: BTreeMap<EntityHandle, Body>,
    next_id: u32,
    pub gravity: Vec2,
    /// Fraction of velocity lost per second
    pub drag: f32,
    /// Fraction of velocity lost on each contact
    pub contact_damping: f32,
}

impl Default for BodyStore {
    fn default() -> Self {
        Self {
            bodies: BTreeMap::new(),
            next_id: 1,
            gravity: SIDE_VIEW_GRAVITY,
            drag: 0.0,
            contact_damping: 0.3,
        }
    }
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat scene seen from above: no gravity, bodies coast to a stop
    pub fn top_down(drag: f32) -> Self {
        Self {
            gravity: Vec2::ZERO,
            drag,
            ..Self::default()
        }
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    pub fn body_kind(&self, handle: EntityHandle) -> Option<BodyKind> {
        self.get(handle).map(|b| b.kind)
    }

    pub fn collider_enabled(&self, handle: EntityHandle) -> Option<bool> {
        self.get(handle).map(|b| b.collider_enabled)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Live entities spawned from `prefab`, in handle order
    pub fn spawned(&self, prefab: &str) -> Vec<EntityHandle> {
        self.bodies
            .iter()
            .filter(|(_, b)| b.prefab == prefab)
            .map(|(h, _)| *h)
            .collect()
    }

    /// Advance every body by `dt`, in handle order
    pub fn integrate(&mut self, dt: f32, world: &StaticWorld) {
        let solids = QueryFilter::only(&[Category::Ground, Category::Obstacle]);
        let drag = (1.0 - self.drag * dt).clamp(0.0, 1.0);

        for body in self.bodies.values_mut() {
            if body.kind == BodyKind::Dynamic {
                body.velocity = (body.velocity + self.gravity * dt) * drag;
            }

            let next = body.position + body.velocity * dt;
            let contact = if body.kind == BodyKind::Dynamic && body.collider_enabled {
                world.sweep(body.position, next, &solids)
            } else {
                None
            };

            match contact {
                Some((_, hit)) => {
                    body.position = hit.point + hit.normal * CONTACT_SKIN;
                    body.velocity = absorb_velocity(body.velocity, hit.normal, self.contact_damping);
                }
                None => body.position = next,
            }
        }
    }
}

impl EntityHost for BodyStore {
    fn spawn(&mut self, prefab: &str, position: Vec2, orientation: f32) -> EntityHandle {
        let handle = EntityHandle(self.next_id);
        self.next_id += 1;
        self.bodies.insert(
            handle,
            Body {
                prefab: prefab.to_string(),
                position,
                velocity: Vec2::ZERO,
                orientation,
                kind: BodyKind::Dynamic,
                collider_enabled: true,
            },
        );
        log::debug!("Spawned {} as {:?}", prefab, handle);
        handle
    }

    fn destroy(&mut self, handle: EntityHandle) {
        if self.bodies.remove(&handle).is_some() {
            log::debug!("Destroyed {:?}", handle);
        }
    }

    fn exists(&self, handle: EntityHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn apply_impulse(&mut self, handle: EntityHandle, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.velocity += impulse;
        }
    }

    fn position(&self, handle: EntityHandle) -> Option<Vec2> {
        self.get(handle).map(|b| b.position)
    }

    fn set_position(&mut self, handle: EntityHandle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.position = position;
        }
    }

    fn velocity(&self, handle: EntityHandle) -> Option<Vec2> {
        self.get(handle).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, handle: EntityHandle, velocity: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.velocity = velocity;
        }
    }

    fn set_body_kind(&mut self, handle: EntityHandle, kind: BodyKind) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.kind = kind;
        }
    }

    fn set_collider_enabled(&mut self, handle: EntityHandle, enabled: bool) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.collider_enabled = enabled;
        }
    }
}

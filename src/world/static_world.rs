//! Static scene colliders
//!
//! Banks, water volumes and rocks never move during a session, so the
//! world is a flat list indexed by `BodyId`. Queries walk it in id order,
//! which keeps results stable from run to run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shapes::{SegmentHit, Shape};
use crate::settings::ConfigError;
use crate::sim::host::{BodyId, Category, Hit, LootPools, QueryFilter, SpatialQuery};
use crate::sim::loot::LootEntry;

/// One authored collider; liquid bodies carry their loot pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColliderDef {
    pub name: String,
    pub category: Category,
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loot: Vec<LootEntry>,
}

impl ColliderDef {
    pub fn new(name: impl Into<String>, category: Category, shape: Shape) -> Self {
        Self {
            name: name.into(),
            category,
            shape,
            loot: Vec::new(),
        }
    }

    pub fn with_loot(mut self, loot: Vec<LootEntry>) -> Self {
        self.loot = loot;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.shape.is_valid() {
            return Err(ConfigError::DegenerateShape(self.name.clone()));
        }
        if self.category == Category::Liquid && self.loot.is_empty() {
            return Err(ConfigError::EmptyLootPool(self.name.clone()));
        }
        for entry in &self.loot {
            entry.validate()?;
        }
        Ok(())
    }
}

/// Serializable scene description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDef {
    pub colliders: Vec<ColliderDef>,
}

impl SceneDef {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let scene: SceneDef = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.colliders.iter().try_for_each(ColliderDef::validate)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticWorld {
    colliders: Vec<ColliderDef>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a validated scene
    pub fn from_scene(scene: SceneDef) -> Result<Self, ConfigError> {
        scene.validate()?;
        log::info!("Scene loaded with {} colliders", scene.colliders.len());
        Ok(Self {
            colliders: scene.colliders,
        })
    }

    /// Add a collider; ids are handed out in insertion order from 0
    pub fn add(&mut self, collider: ColliderDef) -> BodyId {
        self.colliders.push(collider);
        (self.colliders.len() - 1) as BodyId
    }

    pub fn get(&self, id: BodyId) -> Option<&ColliderDef> {
        self.colliders.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn admitted<'a>(
        &'a self,
        filter: &'a QueryFilter,
    ) -> impl Iterator<Item = (BodyId, &'a ColliderDef)> + 'a {
        self.colliders
            .iter()
            .enumerate()
            .filter(move |(_, c)| filter.admits(c.category))
            .map(|(i, c)| (i as BodyId, c))
    }

    /// Nearest contact along `a -> b` including the surface normal
    pub fn sweep(&self, a: Vec2, b: Vec2, filter: &QueryFilter) -> Option<(BodyId, SegmentHit)> {
        let mut best: Option<(BodyId, SegmentHit)> = None;
        for (id, collider) in self.admitted(filter) {
            if let Some(hit) = collider.shape.segment_hit(a, b) {
                if best.is_none_or(|(_, nearest)| hit.t < nearest.t) {
                    best = Some((id, hit));
                }
            }
        }
        best
    }
}

impl SpatialQuery for StaticWorld {
    fn overlap_disc(&self, center: Vec2, radius: f32, filter: &QueryFilter) -> Vec<Hit> {
        self.admitted(filter)
            .filter(|(_, c)| c.shape.overlaps_disc(center, radius))
            .map(|(id, c)| Hit {
                body: id,
                category: c.category,
                point: center,
                distance: 0.0,
            })
            .collect()
    }

    fn linecast(&self, a: Vec2, b: Vec2, filter: &QueryFilter) -> Option<Hit> {
        self.sweep(a, b, filter).map(|(id, hit)| Hit {
            body: id,
            category: self.colliders[id as usize].category,
            point: hit.point,
            distance: a.distance(hit.point),
        })
    }
}

impl LootPools for StaticWorld {
    fn loot_pool(&self, body: BodyId) -> Option<&[LootEntry]> {
        self.get(body)
            .filter(|c| c.category == Category::Liquid)
            .map(|c| c.loot.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::loot::{LootKind, LootTier, WeightRange};

    fn perch() -> LootEntry {
        LootEntry {
            id: "perch".to_string(),
            kind: LootKind::Fish,
            tier: LootTier::Common,
            rarity: 70.0,
            weight_range: WeightRange { min: 0.2, max: 1.5 },
            item_id: Some("perch_item".to_string()),
        }
    }

    fn scene() -> StaticWorld {
        let mut world = StaticWorld::new();
        world.add(ColliderDef::new(
            "bank",
            Category::Ground,
            Shape::Rect {
                min: Vec2::new(-10.0, -5.0),
                max: Vec2::new(0.0, 0.0),
            },
        ));
        world.add(
            ColliderDef::new(
                "pond",
                Category::Liquid,
                Shape::Rect {
                    min: Vec2::new(0.0, -5.0),
                    max: Vec2::new(10.0, -0.5),
                },
            )
            .with_loot(vec![perch()]),
        );
        world.add(ColliderDef::new(
            "rock",
            Category::Obstacle,
            Shape::Circle {
                center: Vec2::new(6.0, -3.0),
                radius: 1.0,
            },
        ));
        world
    }

    #[test]
    fn test_linecast_returns_nearest_admitted() {
        let world = scene();
        let solids = QueryFilter::ignoring(&[Category::Liquid]);

        let hit = world
            .linecast(Vec2::new(2.0, -3.0), Vec2::new(9.0, -3.0), &solids)
            .expect("rock in the way");
        assert_eq!(hit.body, 2);
        assert!((hit.distance - 3.0).abs() < 1e-4);

        let everything = QueryFilter::all();
        let hit = world
            .linecast(Vec2::new(2.0, 2.0), Vec2::new(2.0, -3.0), &everything)
            .expect("water surface first");
        assert_eq!(hit.category, Category::Liquid);
        assert!((hit.point.y + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_overlap_in_id_order() {
        let world = scene();
        let hits = world.overlap_disc(Vec2::new(0.0, -1.0), 0.1, &QueryFilter::all());
        let ids: Vec<BodyId> = hits.iter().map(|h| h.body).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_loot_pool_only_on_liquid() {
        let world = scene();
        assert_eq!(world.loot_pool(1).map(<[LootEntry]>::len), Some(1));
        assert!(world.loot_pool(0).is_none());
        assert!(world.loot_pool(99).is_none());
    }

    #[test]
    fn test_scene_json_validation() {
        let json = r#"{
            "colliders": [
                { "name": "lake", "category": "Liquid",
                  "shape": { "type": "rect", "min": [0.0, -4.0], "max": [8.0, -0.5] } }
            ]
        }"#;
        let err = SceneDef::from_json(json).expect_err("liquid without loot");
        assert!(matches!(err, ConfigError::EmptyLootPool(name) if name == "lake"));

        let json = r#"{
            "colliders": [
                { "name": "rock", "category": "Obstacle",
                  "shape": { "type": "circle", "center": [1.0, 1.0], "radius": 0.5 } }
            ]
        }"#;
        let world = StaticWorld::from_scene(SceneDef::from_json(json).expect("valid")).expect("valid");
        assert_eq!(world.len(), 1);
    }
}

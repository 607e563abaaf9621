//! Substrate classification
//!
//! One disc overlap per tick around the float decides whether it is in the
//! air, resting on land or floating on a liquid body. The first admitted
//! collider wins. Landing on water hands the float over to the simulation
//! (kinematic, collider off); anything else gives it back to physics.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::host::{BodyId, BodyKind, Category, EntityHandle, EntityHost, QueryFilter, SpatialQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Substrate {
    #[default]
    InAir,
    Land,
    Water,
}

impl Substrate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Substrate::InAir => "in air",
            Substrate::Land => "land",
            Substrate::Water => "water",
        }
    }
}

/// Result of one classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstrateReading {
    pub substrate: Substrate,
    /// The liquid body under the float, when on water
    pub liquid_body: Option<BodyId>,
}

impl SubstrateReading {
    pub const IN_AIR: Self = Self {
        substrate: Substrate::InAir,
        liquid_body: None,
    };
}

#[derive(Debug, Clone)]
pub struct SubstrateClassifier {
    radius: f32,
    /// What counts as liquid
    liquid: QueryFilter,
    /// What the probe never sees (the float itself, loose loot)
    probe: QueryFilter,
    previous: Substrate,
}

impl SubstrateClassifier {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            liquid: QueryFilter::only(&[Category::Liquid]),
            probe: QueryFilter::ignoring(&[Category::Float, Category::Loot]),
            previous: Substrate::InAir,
        }
    }

    /// Substrate reported by the last classification
    pub fn previous(&self) -> Substrate {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = Substrate::InAir;
    }

    /// Pure lookup without touching the float body
    pub fn probe<W>(&self, world: &W, position: Vec2) -> SubstrateReading
    where
        W: SpatialQuery + ?Sized,
    {
        let hits = world.overlap_disc(position, self.radius, &self.probe);
        match hits.first() {
            Some(hit) if self.liquid.admits(hit.category) => SubstrateReading {
                substrate: Substrate::Water,
                liquid_body: Some(hit.body),
            },
            Some(_) => SubstrateReading {
                substrate: Substrate::Land,
                liquid_body: None,
            },
            None => SubstrateReading::IN_AIR,
        }
    }

    /// Classify the float and switch its body mode to match.
    /// While `checking` is false the float counts as airborne and is left alone.
    pub fn classify<W, H>(
        &mut self,
        world: &W,
        bodies: &mut H,
        float: EntityHandle,
        checking: bool,
    ) -> SubstrateReading
    where
        W: SpatialQuery + ?Sized,
        H: EntityHost + ?Sized,
    {
        if !checking {
            return SubstrateReading::IN_AIR;
        }
        let Some(position) = bodies.position(float) else {
            return SubstrateReading::IN_AIR;
        };

        bodies.set_collider_enabled(float, true);
        let reading = self.probe(world, position);

        match reading.substrate {
            Substrate::Water => {
                bodies.set_body_kind(float, BodyKind::Kinematic);
                bodies.set_velocity(float, Vec2::ZERO);
                bodies.set_collider_enabled(float, false);
            }
            Substrate::Land => {
                bodies.set_body_kind(float, BodyKind::Dynamic);
            }
            Substrate::InAir => {
                if self.previous == Substrate::Water {
                    bodies.set_body_kind(float, BodyKind::Dynamic);
                }
            }
        }

        if reading.substrate != self.previous {
            log::debug!(
                "Float substrate {} -> {}",
                self.previous.as_str(),
                reading.substrate.as_str()
            );
        }
        self.previous = reading.substrate;
        reading
    }
}

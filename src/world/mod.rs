//! In-memory environment for hosts and tests
//!
//! Implements the spatial, loot and entity services the simulation consumes.
//! Nothing in `sim` depends on this module.

pub mod bodies;
pub mod shapes;
pub mod static_world;

pub use bodies::{Body, BodyStore, SIDE_VIEW_GRAVITY};
pub use shapes::{SegmentHit, Shape};
pub use static_world::{ColliderDef, SceneDef, StaticWorld};

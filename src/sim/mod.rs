//! Deterministic simulation module
//!
//! All fishing logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, passed in by the host
//! - Stable iteration order (waypoints, loot pools, overlap hits)
//! - No rendering, physics engine or platform dependencies; the host
//!   provides spatial queries and entities through the `host` traits

pub mod cast;
pub mod catch;
pub mod diagnostics;
pub mod host;
pub mod line;
pub mod loot;
pub mod path;
pub mod reel;
pub mod rng;
pub mod schedule;
pub mod state;
pub mod substrate;
pub mod tick;

pub use cast::{CastCommit, CastController, CastDirection};
pub use catch::BiteCheck;
pub use diagnostics::{DiagnosticsSink, NullDiagnostics, RecordingDiagnostics};
pub use host::{
    BodyId, BodyKind, Category, EntityHandle, EntityHost, Hit, LootPools, QueryFilter,
    SpatialQuery,
};
pub use line::{LineStatus, LineTensionModel, TensionOutcome};
pub use loot::{BaitItem, BaitTier, HookedLoot, LootEntry, LootKind, LootSelector, LootTier, WeightRange};
pub use path::{FloatPathfinder, Waypoint, WaypointQuality};
pub use reel::ReelSpeed;
pub use rng::{RandomSource, RngSeed};
pub use schedule::{Scheduler, TaskId};
pub use state::{Deferred, FishingEvent, FishingPhase, FishingState, Rod, RodRegistry, Session};
pub use substrate::{Substrate, SubstrateClassifier, SubstrateReading};
pub use tick::{Env, TickInput, abort, equip_bait, tick};

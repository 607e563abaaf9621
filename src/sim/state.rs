//! Fishing state and session types
//!
//! `FishingState` owns everything one rod needs between ticks. A `Session`
//! exists from cast commit until the attempt resolves.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::cast::{CastCommit, CastController, CastDirection};
use super::catch::BiteCheck;
use super::host::{BodyId, EntityHandle};
use super::line::{LineStatus, LineTensionModel};
use super::loot::{BaitItem, HookedLoot, LootTier};
use super::path::FloatPathfinder;
use super::reel::ReelSpeed;
use super::schedule::{Scheduler, TaskId};
use super::substrate::{Substrate, SubstrateClassifier};
use crate::settings::{ConfigError, Settings};

/// Where the current attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FishingPhase {
    #[default]
    Idle,
    /// Cast committed, float not spawned yet
    Casting,
    AttractingNoLoot(Substrate),
    /// Something bit; loot is being drawn
    BitingCheck,
    AttractingWithLoot,
    Caught,
    /// Ended without loot (retrieved, lost in the air, aborted)
    Escaped,
    LineBroken,
}

impl FishingPhase {
    /// Terminal phases last one tick before returning to Idle
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            FishingPhase::Caught | FishingPhase::Escaped | FishingPhase::LineBroken
        )
    }

    pub fn is_attracting(&self) -> bool {
        matches!(
            self,
            FishingPhase::AttractingNoLoot(_)
                | FishingPhase::BitingCheck
                | FishingPhase::AttractingWithLoot
        )
    }
}

/// Observable outcomes, drained by the host each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FishingEvent {
    FloatCast {
        float: EntityHandle,
    },
    /// Float pulled back in without loot
    FloatRetrieved,
    LootHooked {
        loot_id: String,
        tier: LootTier,
        weight: f32,
    },
    CatchSucceeded {
        loot_id: String,
        tier: LootTier,
        weight: f32,
        item: Option<EntityHandle>,
    },
    CatchFailed,
    LineBroken,
    BaitReturned {
        item_id: String,
        item: EntityHandle,
    },
}

/// Work deferred on the simulation clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Deferred {
    SpawnFloat(CastCommit),
    EnableCollider(EntityHandle),
}

/// The angler's rod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rod {
    pub id: u32,
    /// Angler position: bite distance, catch distance and pulls are measured from here
    pub position: Vec2,
    /// Rod tip: floats spawn here and the line length is measured from here
    pub line_attachment: Vec2,
    /// Direction the rod points, for the line angle
    pub facing: Vec2,
}

impl Rod {
    pub fn new(id: u32, position: Vec2, line_attachment: Vec2) -> Self {
        Self {
            id,
            position,
            line_attachment,
            facing: Vec2::X,
        }
    }

    pub fn with_facing(mut self, facing: Vec2) -> Self {
        self.facing = facing;
        self
    }
}

/// Rods already driving a fishing state
#[derive(Debug, Clone, Default)]
pub struct RodRegistry {
    bound: BTreeSet<u32>,
}

impl RodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, rod: u32) -> Result<(), ConfigError> {
        if !self.bound.insert(rod) {
            return Err(ConfigError::RodAlreadyBound(rod));
        }
        Ok(())
    }

    pub fn release(&mut self, rod: u32) -> bool {
        self.bound.remove(&rod)
    }

    pub fn is_bound(&self, rod: u32) -> bool {
        self.bound.contains(&rod)
    }
}

/// One fishing attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Charge the cast committed with
    pub charge: f32,
    pub float: Option<EntityHandle>,
    pub loot: Option<HookedLoot>,
    /// Bait spent on the hooked loot
    pub consumed_bait: Option<BaitItem>,
    pub pending_spawn: Option<TaskId>,
    /// Time since the float spawned
    pub cast_timer: f32,
    /// Top-down flight time before the substrate is checked
    pub hang_time: f32,
    pub substrate: Substrate,
    pub liquid_body: Option<BodyId>,
    /// A bite is waiting for a loot draw
    pub biting: bool,
    /// Loot draws spent on the current bite
    pub bite_draws: u32,
}

impl Session {
    pub fn new(commit: &CastCommit, pending_spawn: TaskId) -> Self {
        Self {
            charge: commit.charge,
            float: None,
            loot: None,
            consumed_bait: None,
            pending_spawn: Some(pending_spawn),
            cast_timer: 0.0,
            hang_time: commit.hang_time,
            substrate: Substrate::InAir,
            liquid_body: None,
            biting: false,
            bite_draws: 0,
        }
    }
}

/// Complete fishing state for one rod
#[derive(Debug, Clone)]
pub struct FishingState {
    pub settings: Settings,
    pub rod: Rod,
    pub phase: FishingPhase,
    pub session: Option<Session>,
    /// Equipped bait (taken when loot is hooked)
    pub bait: Option<BaitItem>,
    pub cast_direction: CastDirection,
    pub line: LineStatus,
    pub tension: LineTensionModel,
    pub cast: CastController,
    pub classifier: SubstrateClassifier,
    pub bite: BiteCheck,
    pub reel: ReelSpeed,
    pub path: FloatPathfinder,
    pub scheduler: Scheduler<Deferred>,
    /// Accumulated simulation time in seconds
    pub clock: f64,
    pub time_ticks: u64,
    events: Vec<FishingEvent>,
}

impl FishingState {
    /// Validate settings and bind the rod; the only fallible step
    pub fn new(settings: Settings, rod: Rod, registry: &mut RodRegistry) -> Result<Self, ConfigError> {
        settings.validate()?;
        registry.bind(rod.id)?;

        log::info!(
            "Rod {} ready ({} view)",
            rod.id,
            settings.view_mode.as_str()
        );
        Ok(Self {
            line: LineStatus::new(&settings.line),
            tension: LineTensionModel::new(&settings.line),
            cast: CastController::new(settings.view_mode, &settings.cast),
            classifier: SubstrateClassifier::new(settings.checker_radius),
            bite: BiteCheck::new(settings.catch_check_interval),
            reel: ReelSpeed::new(),
            path: FloatPathfinder::new(),
            scheduler: Scheduler::new(),
            phase: FishingPhase::Idle,
            session: None,
            bait: None,
            cast_direction: CastDirection::default(),
            clock: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            settings,
            rod,
        })
    }

    pub fn float(&self) -> Option<EntityHandle> {
        self.session.as_ref().and_then(|s| s.float)
    }

    pub fn hooked_loot(&self) -> Option<&HookedLoot> {
        self.session.as_ref().and_then(|s| s.loot.as_ref())
    }

    /// Point the float is pulled toward
    pub fn attraction_point(&self) -> Vec2 {
        self.rod.position + self.settings.attraction_point_correction.unwrap_or(Vec2::ZERO)
    }

    pub fn set_cast_direction(&mut self, direction: CastDirection) {
        self.cast_direction = direction;
    }

    /// Clear a broken line
    pub fn repair_line(&mut self) {
        self.line.repair();
    }

    pub(crate) fn push_event(&mut self, event: FishingEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[FishingEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<FishingEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rod_bound_once() {
        let mut registry = RodRegistry::new();
        let rod = Rod::new(3, Vec2::ZERO, Vec2::Y);
        let state = FishingState::new(Settings::default(), rod.clone(), &mut registry);
        assert!(state.is_ok());

        let err = FishingState::new(Settings::default(), rod, &mut registry).expect_err("bound twice");
        assert!(matches!(err, ConfigError::RodAlreadyBound(3)));

        assert!(registry.release(3));
        assert!(!registry.is_bound(3));
    }

    #[test]
    fn test_invalid_settings_rejected_before_binding() {
        let mut registry = RodRegistry::new();
        let mut settings = Settings::default();
        settings.line.max_load = 0.0;
        let result = FishingState::new(settings, Rod::new(1, Vec2::ZERO, Vec2::Y), &mut registry);
        assert!(matches!(result, Err(ConfigError::NonPositive { .. })));
        assert!(!registry.is_bound(1));
    }

    #[test]
    fn test_attraction_point_correction() {
        let mut registry = RodRegistry::new();
        let mut settings = Settings::default();
        settings.attraction_point_correction = Some(Vec2::new(0.0, -1.0));
        let state = FishingState::new(settings, Rod::new(1, Vec2::new(2.0, 2.0), Vec2::Y), &mut registry)
            .expect("valid");
        assert_eq!(state.attraction_point(), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_resolved_phases() {
        assert!(FishingPhase::Caught.is_resolved());
        assert!(FishingPhase::LineBroken.is_resolved());
        assert!(!FishingPhase::AttractingNoLoot(Substrate::Water).is_resolved());
        assert!(FishingPhase::BitingCheck.is_attracting());
    }
}

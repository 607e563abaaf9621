//! Line tension
//!
//! Load builds while the angler reels against hooked loot and bleeds off
//! when they let go. Sitting at max load for `overload_duration` seconds of
//! continuous reeling snaps the line and forces the session to stop.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::loot::LootTier;
use crate::consts::{ATTRACT_BONUS_BY_TIER, LOAD_GAIN_DIVISOR, LOAD_RELIEF_PER_SEC};
use crate::settings::LineSettings;
use crate::{angle_between_deg, inverse_lerp, lerp};

/// Live state of the fishing line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStatus {
    pub max_load: f32,
    pub overload_duration: f32,
    pub max_length: f32,

    pub current_length: f32,
    pub current_load: f32,
    /// Seconds spent at max load while reeling
    pub current_overload: f32,
    pub attract_speed: f32,
    pub is_broken: bool,
}

impl LineStatus {
    pub fn new(settings: &LineSettings) -> Self {
        Self {
            max_load: settings.max_load,
            overload_duration: settings.overload_duration,
            max_length: settings.max_length,
            current_length: 0.0,
            current_load: 0.0,
            current_overload: 0.0,
            attract_speed: 0.0,
            is_broken: false,
        }
    }

    /// Reset the per-catch values after a session ends
    pub fn finish(&mut self) {
        self.attract_speed = 0.0;
        self.current_load = 0.0;
        self.current_overload = 0.0;
    }

    /// Explicit repair; the only way to clear a break
    pub fn repair(&mut self) {
        if self.is_broken {
            log::info!("Line repaired");
        }
        self.is_broken = false;
    }

    pub fn load_ratio(&self) -> f32 {
        inverse_lerp(0.0, self.max_load, self.current_load)
    }
}

/// Result of one tension update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensionOutcome {
    Holding,
    /// Sustained overload: the session must end now
    ForcedStop,
}

/// Rod and line behaviour under load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineTensionModel {
    pub breakable: bool,
    pub base_attract_speed: f32,
    /// Largest rod-to-float angle considered (degrees)
    pub fishing_angle: f32,
}

impl LineTensionModel {
    pub fn new(settings: &LineSettings) -> Self {
        Self {
            breakable: settings.breakable,
            base_attract_speed: settings.base_attract_speed,
            fishing_angle: settings.fishing_angle,
        }
    }

    /// Angle between the rod's facing and the line to the float, clamped
    pub fn rod_angle(&self, rod_facing: Vec2, rod_position: Vec2, float_position: Vec2) -> f32 {
        angle_between_deg(rod_facing, float_position - rod_position).min(self.fishing_angle)
    }

    /// Weight the line feels; heavier tiers fight relatively less per kilo
    pub fn effective_weight(weight: f32, tier: LootTier) -> f32 {
        let tier = tier.ordinal();
        if tier == 0 {
            return 1.0;
        }
        let w = weight - weight / tier as f32;
        if w <= 0.0 { 1.0 } else { w }
    }

    /// Advance load, overload and attract speed by one step
    pub fn update(
        &self,
        status: &mut LineStatus,
        attracting: bool,
        loot_weight: f32,
        loot_tier: LootTier,
        angle: f32,
        dt: f32,
    ) -> TensionOutcome {
        let angle = angle.clamp(0.0, self.fishing_angle);
        let mut outcome = TensionOutcome::Holding;

        if attracting {
            let weight = Self::effective_weight(loot_weight, loot_tier);
            status.current_load += angle * weight * dt / LOAD_GAIN_DIVISOR;
            status.current_load = status.current_load.min(status.max_load);
        } else {
            status.current_overload = 0.0;
            status.current_load = (status.current_load - LOAD_RELIEF_PER_SEC * dt).max(0.0);
        }

        if status.current_load == status.max_load {
            status.current_overload += dt;

            if status.current_overload >= status.overload_duration {
                if self.breakable {
                    status.is_broken = true;
                }
                log::warn!(
                    "Line overloaded for {:.2}s (broken: {})",
                    status.current_overload,
                    status.is_broken
                );
                outcome = TensionOutcome::ForcedStop;
            }
        }

        status.attract_speed =
            self.attract_speed(angle, status.current_load, status.max_load, loot_tier);
        outcome
    }

    /// Reel speed: base plus a load-dependent bonus scaled by the rod angle
    pub fn attract_speed(&self, angle: f32, load: f32, max_load: f32, tier: LootTier) -> f32 {
        let normalized_angle = if self.fishing_angle > 0.0 {
            angle / self.fishing_angle
        } else {
            0.0
        };
        self.base_attract_speed + normalized_angle * Self::attract_bonus(load, max_load, tier)
    }

    /// Slides from 1.0 toward `load * tier multiplier` as load approaches max
    pub fn attract_bonus(load: f32, max_load: f32, tier: LootTier) -> f32 {
        let x = inverse_lerp(0.0, max_load, load);
        lerp(1.0, load * ATTRACT_BONUS_BY_TIER[tier.index()], x)
    }
}

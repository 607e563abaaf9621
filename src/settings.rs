//! Fishing configuration
//!
//! Plain immutable data loaded once before a session starts. Everything is
//! serde-friendly so hosts can author it as JSON; missing fields fall back
//! to the stock values.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::loot::LootTier;

/// Setup-time configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be between 0 and 100 (got {value})")]
    PercentOutOfRange { field: &'static str, value: u32 },
    #[error("loot `{id}` has an inverted weight range ({min} > {max})")]
    InvertedWeightRange { id: String, min: f32, max: f32 },
    #[error("loot `{id}` has a non-positive rarity weight ({rarity})")]
    NonPositiveRarity { id: String, rarity: f32 },
    #[error("collider `{0}` has a degenerate shape")]
    DegenerateShape(String),
    #[error("liquid body `{0}` has an empty loot pool")]
    EmptyLootPool(String),
    #[error("rod {0} is already bound to a fishing session")]
    RodAlreadyBound(u32),
}

/// Camera/gameplay perspective; changes the cast model and water checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ViewMode {
    #[default]
    SideView,
    TopDown,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::SideView => "SideView",
            ViewMode::TopDown => "TopDown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "side" | "sideview" | "side-view" => Some(ViewMode::SideView),
            "top" | "topdown" | "top-down" => Some(ViewMode::TopDown),
            _ => None,
        }
    }
}

/// Base bite percentages per tier plus the distance factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchProbabilityConfig {
    pub common: u32,
    pub uncommon: u32,
    pub rare: u32,
    pub epic: u32,
    pub legendary: u32,
    /// Cast distance at which bite chances reach their base value
    pub min_safe_fishing_distance_factor: f32,
}

impl Default for CatchProbabilityConfig {
    fn default() -> Self {
        Self {
            common: 5,
            uncommon: 12,
            rare: 22,
            epic: 35,
            legendary: 45,
            min_safe_fishing_distance_factor: 5.0,
        }
    }
}

impl CatchProbabilityConfig {
    /// Base percentage for a tier
    pub fn base_for(&self, tier: LootTier) -> u32 {
        match tier {
            LootTier::Common => self.common,
            LootTier::Uncommon => self.uncommon,
            LootTier::Rare => self.rare,
            LootTier::Epic => self.epic,
            LootTier::Legendary => self.legendary,
        }
    }
}

/// Line and rod tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSettings {
    pub max_load: f32,
    /// Seconds the line may sit at max load before it snaps
    pub overload_duration: f32,
    pub max_length: f32,
    pub breakable: bool,
    pub base_attract_speed: f32,
    /// Largest rod-to-float angle (degrees) used by the tension model
    pub fishing_angle: f32,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            max_load: 100.0,
            overload_duration: 2.0,
            max_length: 15.0,
            breakable: true,
            base_attract_speed: 5.0,
            fishing_angle: 60.0,
        }
    }
}

/// Charge-and-release casting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastSettings {
    /// Side view: impulse cap
    pub max_cast_force: f32,
    pub force_charge_rate: f32,
    /// Top-down: hang-time cap in seconds
    pub max_cast_time: f32,
    pub time_charge_rate: f32,
    pub initial_force: f32,
    /// Presentation delay between commit and float spawn
    pub spawn_delay: f32,
    pub float_prefab: String,
}

impl Default for CastSettings {
    fn default() -> Self {
        Self {
            max_cast_force: 20.0,
            force_charge_rate: 4.0,
            max_cast_time: 2.0,
            time_charge_rate: 0.3,
            initial_force: 10.0,
            spawn_delay: 0.3,
            float_prefab: "fishing_float".to_string(),
        }
    }
}

/// Complete fishing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub view_mode: ViewMode,
    pub catch_probability: CatchProbabilityConfig,
    pub line: LineSettings,
    pub cast: CastSettings,

    // === Session ===
    /// Distance to the angler at which the float is picked up
    pub catch_distance: f32,
    pub return_speed_without_loot: f32,
    /// Seconds between bite trials
    pub catch_check_interval: f32,
    /// Radius of the substrate probe around the float
    pub checker_radius: f32,
    /// Offset added to the angler position when pulling the float in
    pub attraction_point_correction: Option<Vec2>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::SideView,
            catch_probability: CatchProbabilityConfig::default(),
            line: LineSettings::default(),
            cast: CastSettings::default(),

            catch_distance: 1.0,
            return_speed_without_loot: 2.0,
            catch_check_interval: 1.0,
            checker_radius: 0.05,
            attraction_point_correction: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("line.max_load", self.line.max_load),
            ("line.overload_duration", self.line.overload_duration),
            ("line.max_length", self.line.max_length),
            ("line.fishing_angle", self.line.fishing_angle),
            ("cast.max_cast_force", self.cast.max_cast_force),
            ("cast.force_charge_rate", self.cast.force_charge_rate),
            ("cast.max_cast_time", self.cast.max_cast_time),
            ("cast.time_charge_rate", self.cast.time_charge_rate),
            ("catch_check_interval", self.catch_check_interval),
            ("checker_radius", self.checker_radius),
            ("catch_distance", self.catch_distance),
            ("return_speed_without_loot", self.return_speed_without_loot),
        ];
        for (field, value) in positives {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let non_negatives = [
            ("cast.spawn_delay", self.cast.spawn_delay),
            ("cast.initial_force", self.cast.initial_force),
        ];
        for (field, value) in non_negatives {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        let p = &self.catch_probability;
        let percents = [
            ("catch_probability.common", p.common),
            ("catch_probability.uncommon", p.uncommon),
            ("catch_probability.rare", p.rare),
            ("catch_probability.epic", p.epic),
            ("catch_probability.legendary", p.legendary),
        ];
        for (field, value) in percents {
            if value > 100 {
                return Err(ConfigError::PercentOutOfRange { field, value });
            }
        }
        if !(p.min_safe_fishing_distance_factor > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "catch_probability.min_safe_fishing_distance_factor",
                value: p.min_safe_fishing_distance_factor,
            });
        }

        Ok(())
    }
}

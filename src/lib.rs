//! Tightline - a skill-based fishing simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (casting, substrate, bites, loot, tension, pathing)
//! - `settings`: Data-driven configuration (catch table, line, cast, session tuning)
//! - `world`: In-memory spatial world and body store used by hosts and tests

pub mod settings;
pub mod sim;
pub mod world;

pub use settings::{ConfigError, Settings, ViewMode};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the demo host (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Load bled off the line per second while not attracting
    pub const LOAD_RELIEF_PER_SEC: f32 = 5.0;
    /// Divisor applied to load gained while attracting
    pub const LOAD_GAIN_DIVISOR: f32 = 4.0;
    /// Attract bonus multiplier per loot tier (Common..Legendary)
    pub const ATTRACT_BONUS_BY_TIER: [f32; 5] = [0.2, 0.4, 0.6, 0.8, 1.0];

    /// Distance-scaling floor for bite probability at zero cast distance
    pub const BITE_SCALE_MIN: f32 = 0.3;
    /// Distance-scaling ceiling at or beyond the safe fishing distance
    pub const BITE_SCALE_MAX: f32 = 1.0;

    /// Loot draws allowed per tick before deferring to the next tick
    pub const MAX_LOOT_DRAWS_PER_TICK: u32 = 8;
    /// Loot draws allowed per bite before the bite is dropped
    pub const MAX_LOOT_DRAWS_PER_BITE: u32 = 64;

    /// Loot swim speed base and per-tier multipliers
    pub const LOOT_BASE_SPEED: f32 = 1.2;
    pub const LOOT_SPEED_BY_TIER: [f32; 5] = [1.0, 1.5, 2.0, 2.5, 3.0];
    /// Share of attract speed that survives against the loot, per tier
    pub const REEL_FACTOR_BY_TIER: [f32; 5] = [1.2, 1.0, 0.8, 0.6, 0.5];
    /// Lowest speed the float is reeled at while attracting loot
    pub const MIN_REEL_SPEED: f32 = 2.0;
    /// Rate of the final-speed smoothing (per second)
    pub const REEL_SMOOTHING: f32 = 3.0;

    /// Path window size (waypoints ahead of the float)
    pub const MAX_PATH_POINTS: usize = 3;
    /// Radius of the random offset around the previous waypoint
    pub const PATH_SAMPLE_RANGE: f32 = 15.0;
    /// Minimum turn angle between consecutive segments (degrees)
    pub const MIN_TURN_ANGLE_DEG: f32 = 60.0;
    /// Minimum separation between consecutive waypoints
    pub const MIN_WAYPOINT_SEPARATION: f32 = 1.0;
    /// Waypoints stay this far below the float's initial height in side view
    pub const WATER_LEVEL_MARGIN: f32 = 0.5;
    /// Distance kept in front of an obstacle hit along a segment
    pub const OBSTACLE_STANDOFF: f32 = 1.2;
    /// Strict resampling attempts before constraints are relaxed
    pub const STRICT_PATH_ATTEMPTS: u32 = 400;
    /// Relaxed resampling attempts before the fallback point is used
    pub const RELAXED_PATH_ATTEMPTS: u32 = 1000;
    /// Exponential smoothing rate of the float's move vector
    pub const MOVE_SMOOTHING: f32 = 10.0;
    /// Strength of the pull toward the angler
    pub const ATTRACT_STRENGTH: f32 = 1.5;
    /// Probe length used to deflect the attract vector from obstacles
    pub const AVOID_PROBE: f32 = 1.0;
    pub const AVOID_FACTOR: f32 = 0.7;

    /// Max correction speed applied when the line is overstretched
    pub const LINE_PULLBACK_MAX_SPEED: f32 = 5.0;
}

/// Linear interpolation between `a` and `b`, with `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Where `value` sits between `a` and `b`, clamped to [0, 1]
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Unsigned angle between two vectors in degrees (0 if either is zero)
#[inline]
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    let (a, b) = (a.normalize_or_zero(), b.normalize_or_zero());
    if a == Vec2::ZERO || b == Vec2::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}

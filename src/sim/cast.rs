//! Charge-and-release casting
//!
//! Holding the cast input charges; releasing with some charge, or charging
//! to the cap, commits. Side view charges an impulse directly. Top-down
//! charges hang time, and the impulse is that time times the initial force.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::{CastSettings, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CastDirection {
    Left,
    #[default]
    Right,
    Up,
    Down,
}

impl CastDirection {
    /// Unnormalized launch vector; its length is part of the cast strength
    pub fn vector(self) -> Vec2 {
        match self {
            CastDirection::Left => Vec2::new(-1.0, 1.0),
            CastDirection::Right => Vec2::new(1.0, 1.0),
            CastDirection::Up => Vec2::new(0.0, 2.0),
            CastDirection::Down => Vec2::new(0.0, -1.0),
        }
    }
}

/// A committed cast, ready to be scheduled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CastCommit {
    pub direction: CastDirection,
    /// Force (side view) or hang time (top-down) at release
    pub charge: f32,
    pub impulse: Vec2,
    /// Seconds the float flies before its substrate is checked (top-down only)
    pub hang_time: f32,
}

#[derive(Debug, Clone)]
pub struct CastController {
    view_mode: ViewMode,
    settings: CastSettings,
    charge: f32,
}

impl CastController {
    pub fn new(view_mode: ViewMode, settings: &CastSettings) -> Self {
        Self {
            view_mode,
            settings: settings.clone(),
            charge: 0.0,
        }
    }

    /// Accumulated force (side view) or hang time (top-down)
    pub fn charge(&self) -> f32 {
        self.charge
    }

    pub fn max_charge(&self) -> f32 {
        match self.view_mode {
            ViewMode::SideView => self.settings.max_cast_force,
            ViewMode::TopDown => self.settings.max_cast_time,
        }
    }

    fn charge_rate(&self) -> f32 {
        match self.view_mode {
            ViewMode::SideView => self.settings.force_charge_rate,
            ViewMode::TopDown => self.settings.time_charge_rate,
        }
    }

    /// Drop any charge without casting
    pub fn reset(&mut self) {
        self.charge = 0.0;
    }

    /// Advance charging by one step; returns the cast once it commits
    pub fn step(&mut self, held: bool, dt: f32, direction: CastDirection) -> Option<CastCommit> {
        if held {
            self.charge = (self.charge + self.charge_rate() * dt).min(self.max_charge());
        }

        let released = !held && self.charge != 0.0;
        if !released && self.charge < self.max_charge() {
            return None;
        }

        let strength = match self.view_mode {
            ViewMode::SideView => self.charge,
            ViewMode::TopDown => self.charge * self.settings.initial_force,
        };
        let commit = CastCommit {
            direction,
            charge: self.charge,
            impulse: direction.vector() * strength,
            hang_time: match self.view_mode {
                ViewMode::SideView => 0.0,
                ViewMode::TopDown => self.charge,
            },
        };

        log::info!(
            "Cast committed {:?} with charge {:.2} (impulse {:.2})",
            direction,
            self.charge,
            commit.impulse.length()
        );
        self.charge = 0.0;
        Some(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_commits_side_view_force() {
        let mut cast = CastController::new(ViewMode::SideView, &CastSettings::default());
        assert!(cast.step(true, 0.5, CastDirection::Right).is_none());
        assert!(cast.step(true, 0.5, CastDirection::Right).is_none());
        assert_eq!(cast.charge(), 4.0);

        let commit = cast.step(false, 0.1, CastDirection::Right).expect("release commits");
        assert_eq!(commit.impulse, Vec2::new(4.0, 4.0));
        assert_eq!(commit.hang_time, 0.0);
        assert_eq!(cast.charge(), 0.0);
    }

    #[test]
    fn test_idle_release_does_nothing() {
        let mut cast = CastController::new(ViewMode::SideView, &CastSettings::default());
        for _ in 0..10 {
            assert!(cast.step(false, 0.1, CastDirection::Left).is_none());
        }
    }

    #[test]
    fn test_full_charge_commits_while_held() {
        let mut cast = CastController::new(ViewMode::SideView, &CastSettings::default());
        // 20 / 4 = 5 seconds to the cap
        let mut commit = None;
        for _ in 0..60 {
            commit = cast.step(true, 0.1, CastDirection::Up);
            if commit.is_some() {
                break;
            }
        }
        let commit = commit.expect("cap commits");
        assert_eq!(commit.impulse, Vec2::new(0.0, 40.0));
    }

    #[test]
    fn test_top_down_charges_hang_time() {
        let mut cast = CastController::new(ViewMode::TopDown, &CastSettings::default());
        cast.step(true, 1.0, CastDirection::Down);
        let commit = cast.step(false, 0.0, CastDirection::Down).expect("release commits");

        assert!((commit.hang_time - 0.3).abs() < 1e-6);
        // 0.3 s * initial force 10 along (0, -1)
        assert!((commit.impulse - Vec2::new(0.0, -3.0)).length() < 1e-5);
    }

    #[test]
    fn test_direction_vectors() {
        assert_eq!(CastDirection::Left.vector(), Vec2::new(-1.0, 1.0));
        assert_eq!(CastDirection::Up.vector().length(), 2.0);
    }
}

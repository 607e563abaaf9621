//! Optional debug output
//!
//! A sink for the line drawings a debugger would show (path windows,
//! attract rays). Nothing here feeds back into the simulation.

use glam::Vec2;

pub trait DiagnosticsSink {
    /// Current waypoint window, oldest first
    fn path(&mut self, points: &[Vec2]);
    /// A directional probe starting at `origin`
    fn ray(&mut self, origin: Vec2, vector: Vec2);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl DiagnosticsSink for NullDiagnostics {
    fn path(&mut self, _points: &[Vec2]) {}
    fn ray(&mut self, _origin: Vec2, _vector: Vec2) {}
}

/// Keeps the most recent drawings (handy in tests and debug overlays)
#[derive(Debug, Default, Clone)]
pub struct RecordingDiagnostics {
    pub last_path: Vec<Vec2>,
    pub rays: Vec<(Vec2, Vec2)>,
}

impl DiagnosticsSink for RecordingDiagnostics {
    fn path(&mut self, points: &[Vec2]) {
        self.last_path.clear();
        self.last_path.extend_from_slice(points);
    }

    fn ray(&mut self, origin: Vec2, vector: Vec2) {
        self.rays.push((origin, vector));
    }
}

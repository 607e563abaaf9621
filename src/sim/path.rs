//! Evasive float pathing
//!
//! Hooked fish drag the float along a short rolling window of waypoints.
//! Each waypoint is sampled around the one before it and has to keep:
//! - at least `MIN_WAYPOINT_SEPARATION` from the previous waypoint
//! - within the line's reach of the anchor
//! - a clear line of sight from the waypoint before the previous one
//! - a turn of at least `MIN_TURN_ANGLE_DEG`
//! - (side view) below the water surface margin
//!
//! After `STRICT_PATH_ATTEMPTS` failures only distance and water level are
//! enforced; after `RELAXED_PATH_ATTEMPTS` more the waypoint drops to just
//! below where the float started. Both loops are bounded.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::diagnostics::DiagnosticsSink;
use super::host::{Category, QueryFilter, SpatialQuery};
use super::rng::RandomSource;
use crate::angle_between_deg;
use crate::consts::{
    ATTRACT_STRENGTH, AVOID_FACTOR, AVOID_PROBE, MAX_PATH_POINTS, MIN_TURN_ANGLE_DEG,
    MIN_WAYPOINT_SEPARATION, MOVE_SMOOTHING, OBSTACLE_STANDOFF, PATH_SAMPLE_RANGE,
    RELAXED_PATH_ATTEMPTS, STRICT_PATH_ATTEMPTS, WATER_LEVEL_MARGIN,
};
use crate::settings::ViewMode;

/// Colliders that block paths and deflect the attract vector
pub fn obstacle_filter() -> QueryFilter {
    QueryFilter::ignoring(&[
        Category::Liquid,
        Category::Float,
        Category::Loot,
        Category::Character,
    ])
}

/// Which constraint set a waypoint satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaypointQuality {
    Strict,
    /// Turn angle and line of sight were dropped
    Relaxed,
    /// Nothing valid was found; placed below the float's start
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Vec2,
    pub quality: WaypointQuality,
}

/// Fixed inputs for one pathing step
#[derive(Debug, Clone, Copy)]
pub struct PathContext {
    pub view_mode: ViewMode,
    /// Where the line is anchored (the angler)
    pub anchor: Vec2,
    pub max_line_length: f32,
}

/// Per-tick motion request
#[derive(Debug, Clone, Copy)]
pub struct FloatMotion {
    pub float_position: Vec2,
    /// Follow the waypoint window (hooked fish)
    pub evade: bool,
    /// Pull toward the anchor
    pub attracting: bool,
    pub speed: f32,
    pub dt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatPathfinder {
    points: Vec<Waypoint>,
    initial_position: Vec2,
    needs_seed: bool,
    move_vector: Vec2,
}

impl Default for FloatPathfinder {
    fn default() -> Self {
        Self {
            points: Vec::with_capacity(MAX_PATH_POINTS + 1),
            initial_position: Vec2::ZERO,
            needs_seed: true,
            move_vector: Vec2::ZERO,
        }
    }
}

impl FloatPathfinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every waypoint; the next evasive step seeds a fresh window
    pub fn clear(&mut self) {
        self.points.clear();
        self.needs_seed = true;
    }

    pub fn is_seeded(&self) -> bool {
        !self.needs_seed
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.points
    }

    /// Float position captured when the current window was seeded
    pub fn initial_position(&self) -> Vec2 {
        self.initial_position
    }

    pub fn move_vector(&self) -> Vec2 {
        self.move_vector
    }

    /// Advance the window and return the float's position delta for this tick
    pub fn step<W, R>(
        &mut self,
        ctx: &PathContext,
        motion: &FloatMotion,
        world: &W,
        rng: &mut R,
        diagnostics: &mut dyn DiagnosticsSink,
    ) -> Vec2
    where
        W: SpatialQuery + ?Sized,
        R: RandomSource,
    {
        let float_pos = motion.float_position;
        if self.needs_seed {
            self.initial_position = float_pos;
        }

        let mut loot_vector = Vec2::ZERO;
        let mut attract_vector = Vec2::ZERO;

        if motion.evade {
            if self.needs_seed {
                self.seed(ctx, float_pos, world, rng);
            }

            let (p0, p1) = (self.points[0].position, self.points[1].position);
            if float_pos.distance(p1) < p0.distance(p1) / 4.0 {
                self.points.remove(0);
                let current = self.points[MAX_PATH_POINTS - 1].position;
                let previous = self.points[MAX_PATH_POINTS - 2].position;
                let next = self.generate_waypoint(ctx, current, previous, world, rng);
                self.points.push(next);
            }

            loot_vector = (self.points[1].position - float_pos).normalize_or_zero();

            let polyline: Vec<Vec2> = self.points.iter().map(|w| w.position).collect();
            diagnostics.path(&polyline);
        }

        if motion.attracting {
            attract_vector = self.attract_direction(ctx, float_pos) * ATTRACT_STRENGTH;
            attract_vector = avoid_edges(attract_vector, float_pos, world);
            diagnostics.ray(float_pos, attract_vector);
        }

        let target = loot_vector + attract_vector;
        let t = (MOVE_SMOOTHING * motion.dt).clamp(0.0, 1.0);
        self.move_vector = self.move_vector.lerp(target, t);

        self.move_vector * motion.speed * motion.dt
    }

    fn seed<W, R>(&mut self, ctx: &PathContext, float_pos: Vec2, world: &W, rng: &mut R)
    where
        W: SpatialQuery + ?Sized,
        R: RandomSource,
    {
        if self.points.is_empty() {
            self.points.push(Waypoint {
                position: float_pos,
                quality: WaypointQuality::Strict,
            });
        }

        for i in 0..MAX_PATH_POINTS {
            let current = self.points[i].position;
            let previous = if i > 0 { self.points[i - 1].position } else { current };
            let next = self.generate_waypoint(ctx, current, previous, world, rng);
            self.points.push(next);
        }

        self.needs_seed = false;
        log::debug!(
            "Seeded float path from ({:.2}, {:.2})",
            float_pos.x,
            float_pos.y
        );
    }

    /// Direction toward the anchor; side view never climbs above the start
    fn attract_direction(&self, ctx: &PathContext, float_pos: Vec2) -> Vec2 {
        let mut dir = (ctx.anchor - float_pos).normalize_or_zero();
        if ctx.view_mode == ViewMode::SideView && float_pos.y >= self.initial_position.y {
            dir.y = 0.0;
        }
        dir.normalize_or_zero()
    }

    fn generate_waypoint<W, R>(
        &self,
        ctx: &PathContext,
        current: Vec2,
        previous: Vec2,
        world: &W,
        rng: &mut R,
    ) -> Waypoint
    where
        W: SpatialQuery + ?Sized,
        R: RandomSource,
    {
        let filter = obstacle_filter();

        let mut last = None;
        for _ in 0..STRICT_PATH_ATTEMPTS {
            let candidate = sample_candidate(current, world, &filter, rng);
            if self.fits_relaxed(ctx, current, candidate)
                && world.linecast(previous, candidate, &filter).is_none()
                && turns_enough(current, previous, candidate)
            {
                return Waypoint {
                    position: candidate,
                    quality: WaypointQuality::Strict,
                };
            }
            last = Some(candidate);
        }

        // the last strict candidate gets a second look before resampling
        if let Some(candidate) = last.filter(|c| self.fits_relaxed(ctx, current, *c)) {
            return Waypoint {
                position: candidate,
                quality: WaypointQuality::Relaxed,
            };
        }

        for _ in 0..RELAXED_PATH_ATTEMPTS {
            let candidate = sample_candidate(current, world, &filter, rng);
            if self.fits_relaxed(ctx, current, candidate) {
                return Waypoint {
                    position: candidate,
                    quality: WaypointQuality::Relaxed,
                };
            }
        }

        let position = self.initial_position - Vec2::new(0.0, WATER_LEVEL_MARGIN);
        log::warn!(
            "No valid waypoint around ({:.2}, {:.2}); falling back to ({:.2}, {:.2})",
            current.x,
            current.y,
            position.x,
            position.y
        );
        Waypoint {
            position,
            quality: WaypointQuality::Fallback,
        }
    }

    /// Distance and water level only
    fn fits_relaxed(&self, ctx: &PathContext, current: Vec2, candidate: Vec2) -> bool {
        self.within_reach(ctx, current, candidate) && self.below_surface(ctx, candidate)
    }

    fn within_reach(&self, ctx: &PathContext, current: Vec2, candidate: Vec2) -> bool {
        current.distance(candidate) >= MIN_WAYPOINT_SEPARATION
            && candidate.distance(ctx.anchor) <= ctx.max_line_length
    }

    fn below_surface(&self, ctx: &PathContext, candidate: Vec2) -> bool {
        match ctx.view_mode {
            ViewMode::TopDown => true,
            ViewMode::SideView => candidate.y <= self.initial_position.y - WATER_LEVEL_MARGIN,
        }
    }
}

/// Random point around `current`, pulled back in front of any obstacle on the way
fn sample_candidate<W, R>(current: Vec2, world: &W, filter: &QueryFilter, rng: &mut R) -> Vec2
where
    W: SpatialQuery + ?Sized,
    R: RandomSource,
{
    let candidate = current + rng.inside_unit_circle() * PATH_SAMPLE_RANGE;
    match world.linecast(current, candidate, filter) {
        Some(hit) => hit.point + (current - hit.point).normalize_or_zero() * OBSTACLE_STANDOFF,
        None => candidate,
    }
}

/// Turn at `current` from the incoming segment to the candidate is wide enough.
/// The first waypoint of a window has no incoming segment.
fn turns_enough(current: Vec2, previous: Vec2, candidate: Vec2) -> bool {
    if previous == current {
        return true;
    }
    angle_between_deg(previous - current, candidate - current) >= MIN_TURN_ANGLE_DEG
}

/// Bend the attract vector sideways when an obstacle is right ahead
fn avoid_edges<W>(direction: Vec2, float_pos: Vec2, world: &W) -> Vec2
where
    W: SpatialQuery + ?Sized,
{
    let filter = obstacle_filter();
    let Some(hit) = world.raycast(float_pos, direction, AVOID_PROBE, &filter) else {
        return direction;
    };

    let normal = (float_pos - hit.point).normalize_or_zero();
    let up = Vec2::new(-normal.y, normal.x);
    let down = Vec2::new(normal.y, -normal.x);

    let hit_up = world.raycast(float_pos, up, AVOID_PROBE, &filter);
    let hit_down = world.raycast(float_pos, down, AVOID_PROBE, &filter);

    // an unobstructed side reports distance 0
    let down_distance = hit_down.map_or(0.0, |h| h.distance);
    let side = match hit_up {
        None => down,
        Some(h) if down_distance < h.distance => down,
        Some(_) => up,
    };

    (direction + side * AVOID_FACTOR).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::diagnostics::{NullDiagnostics, RecordingDiagnostics};
    use crate::sim::host::{BodyId, Hit};
    use crate::sim::rng::RngSeed;
    use proptest::prelude::*;

    /// Open water with an optional solid half-plane `x >= wall`
    struct Pond {
        wall: Option<f32>,
    }

    impl SpatialQuery for Pond {
        fn overlap_disc(&self, _center: Vec2, _radius: f32, _filter: &QueryFilter) -> Vec<Hit> {
            Vec::new()
        }

        fn linecast(&self, a: Vec2, b: Vec2, filter: &QueryFilter) -> Option<Hit> {
            let wall = self.wall?;
            if !filter.admits(Category::Obstacle) {
                return None;
            }
            let body: BodyId = 1;
            if a.x >= wall {
                return Some(Hit {
                    body,
                    category: Category::Obstacle,
                    point: a,
                    distance: 0.0,
                });
            }
            if b.x < wall {
                return None;
            }
            let t = (wall - a.x) / (b.x - a.x);
            let point = a + (b - a) * t;
            Some(Hit {
                body,
                category: Category::Obstacle,
                point,
                distance: a.distance(point),
            })
        }
    }

    fn ctx(view_mode: ViewMode) -> PathContext {
        PathContext {
            view_mode,
            anchor: Vec2::new(0.0, 2.0),
            max_line_length: 15.0,
        }
    }

    fn evading(float_position: Vec2) -> FloatMotion {
        FloatMotion {
            float_position,
            evade: true,
            attracting: false,
            speed: 2.0,
            dt: 1.0 / 60.0,
        }
    }

    /// Always offers the same point and counts how often it was asked
    struct FixedOffset {
        offset: Vec2,
        draws: u32,
    }

    impl RandomSource for FixedOffset {
        fn range_f32(&mut self, min: f32, _max: f32) -> f32 {
            min
        }

        fn range_i32(&mut self, min: i32, _max: i32) -> i32 {
            min
        }

        fn inside_unit_circle(&mut self) -> Vec2 {
            self.draws += 1;
            self.offset
        }

        fn shuffle<T>(&mut self, _items: &mut [T]) {}
    }

    #[test]
    fn test_last_strict_candidate_reused_when_relaxed() {
        let path = FloatPathfinder::new();
        let world = Pond { wall: None };
        let mut rng = FixedOffset {
            offset: Vec2::new(0.2, 0.0),
            draws: 0,
        };

        // coming from (2, 0.5), a candidate at (3, 0) turns far less than the minimum
        let current = Vec2::ZERO;
        let previous = Vec2::new(2.0, 0.5);
        let waypoint = path.generate_waypoint(&ctx(ViewMode::TopDown), current, previous, &world, &mut rng);

        assert_eq!(waypoint.quality, WaypointQuality::Relaxed);
        assert!((waypoint.position - Vec2::new(3.0, 0.0)).length() < 1e-5);
        assert_eq!(rng.draws, STRICT_PATH_ATTEMPTS);
    }

    #[test]
    fn test_seed_fills_window() {
        let mut rng = RngSeed::new(5).to_rng();
        let mut path = FloatPathfinder::new();
        let world = Pond { wall: None };
        let start = Vec2::new(6.0, -1.0);

        assert!(!path.is_seeded());
        path.step(&ctx(ViewMode::SideView), &evading(start), &world, &mut rng, &mut NullDiagnostics);

        assert!(path.is_seeded());
        assert_eq!(path.waypoints().len(), MAX_PATH_POINTS + 1);
        assert_eq!(path.waypoints()[0].position, start);
        assert_eq!(path.initial_position(), start);
        for w in &path.waypoints()[1..] {
            assert!(w.position.y <= start.y - WATER_LEVEL_MARGIN);
            assert!(w.position.distance(ctx(ViewMode::SideView).anchor) <= 15.0);
        }
    }

    #[test]
    fn test_strict_waypoints_turn_and_separate() {
        let mut rng = RngSeed::new(21).to_rng();
        let mut path = FloatPathfinder::new();
        let world = Pond { wall: None };
        path.step(&ctx(ViewMode::TopDown), &evading(Vec2::new(3.0, 0.0)), &world, &mut rng, &mut NullDiagnostics);

        let points = path.waypoints();
        for pair in points.windows(2) {
            if pair[1].quality != WaypointQuality::Fallback {
                assert!(pair[0].position.distance(pair[1].position) >= MIN_WAYPOINT_SEPARATION);
            }
        }
        for triple in points.windows(3) {
            if triple[2].quality == WaypointQuality::Strict {
                let angle = angle_between_deg(
                    triple[0].position - triple[1].position,
                    triple[2].position - triple[1].position,
                );
                assert!(angle >= MIN_TURN_ANGLE_DEG - 1e-3);
            }
        }
    }

    #[test]
    fn test_waypoints_stay_in_front_of_wall() {
        let mut rng = RngSeed::new(8).to_rng();
        let mut path = FloatPathfinder::new();
        let world = Pond { wall: Some(5.0) };
        path.step(&ctx(ViewMode::TopDown), &evading(Vec2::new(2.0, 0.0)), &world, &mut rng, &mut NullDiagnostics);

        for w in path.waypoints() {
            assert!(w.position.x < 5.0, "waypoint {:?} crossed the wall", w.position);
        }
    }

    #[test]
    fn test_window_advances_when_target_reached() {
        let mut rng = RngSeed::new(13).to_rng();
        let mut path = FloatPathfinder::new();
        let world = Pond { wall: None };
        let context = ctx(ViewMode::TopDown);
        path.step(&context, &evading(Vec2::new(1.0, 1.0)), &world, &mut rng, &mut NullDiagnostics);

        let before: Vec<Vec2> = path.waypoints().iter().map(|w| w.position).collect();
        path.step(&context, &evading(before[1]), &world, &mut rng, &mut NullDiagnostics);

        let after = path.waypoints();
        assert_eq!(after.len(), MAX_PATH_POINTS + 1);
        assert_eq!(after[0].position, before[1]);
        assert_eq!(after[1].position, before[2]);
        assert_eq!(after[2].position, before[3]);
    }

    #[test]
    fn test_unreachable_anchor_falls_back() {
        let mut rng = RngSeed::new(3).to_rng();
        let mut path = FloatPathfinder::new();
        let world = Pond { wall: None };
        let context = PathContext {
            view_mode: ViewMode::SideView,
            anchor: Vec2::new(500.0, 500.0),
            max_line_length: 1.0,
        };
        let start = Vec2::new(4.0, -2.0);
        path.step(&context, &evading(start), &world, &mut rng, &mut NullDiagnostics);

        for w in &path.waypoints()[1..] {
            assert_eq!(w.quality, WaypointQuality::Fallback);
            assert_eq!(w.position, start - Vec2::new(0.0, WATER_LEVEL_MARGIN));
        }
    }

    #[test]
    fn test_clear_reseeds_from_new_position() {
        let mut rng = RngSeed::new(4).to_rng();
        let mut path = FloatPathfinder::new();
        let world = Pond { wall: None };
        let context = ctx(ViewMode::TopDown);
        path.step(&context, &evading(Vec2::ZERO), &world, &mut rng, &mut NullDiagnostics);

        path.clear();
        assert!(!path.is_seeded());
        assert!(path.waypoints().is_empty());

        let fresh = Vec2::new(-3.0, 4.0);
        path.step(&context, &evading(fresh), &world, &mut rng, &mut NullDiagnostics);
        assert_eq!(path.waypoints()[0].position, fresh);
        assert_eq!(path.initial_position(), fresh);
    }

    #[test]
    fn test_side_view_attract_stays_on_surface() {
        let mut rng = RngSeed::new(1).to_rng();
        let mut path = FloatPathfinder::new();
        let world = Pond { wall: None };
        let motion = FloatMotion {
            float_position: Vec2::new(8.0, -0.5),
            evade: false,
            attracting: true,
            speed: 2.0,
            dt: 0.1,
        };
        let mut diag = RecordingDiagnostics::default();
        let delta = path.step(&ctx(ViewMode::SideView), &motion, &world, &mut rng, &mut diag);

        assert!(delta.x < 0.0);
        assert_eq!(delta.y, 0.0);
        assert!(!path.is_seeded());
        assert_eq!(diag.rays.len(), 1);
        assert!((diag.rays[0].1.length() - ATTRACT_STRENGTH).abs() < 1e-4);
    }

    #[test]
    fn test_attract_bends_around_obstacle() {
        let world = Pond { wall: Some(0.5) };
        // heading straight into the wall
        let bent = avoid_edges(Vec2::new(1.5, 0.0), Vec2::ZERO, &world);
        assert!((bent.length() - 1.0).abs() < 1e-4);
        assert!(bent.y.abs() > 0.1);

        let clear = avoid_edges(Vec2::new(-1.5, 0.0), Vec2::ZERO, &world);
        assert_eq!(clear, Vec2::new(-1.5, 0.0));
    }

    #[test]
    fn test_move_vector_smooths() {
        let mut rng = RngSeed::new(6).to_rng();
        let mut path = FloatPathfinder::new();
        let world = Pond { wall: None };
        let motion = FloatMotion {
            float_position: Vec2::new(5.0, 2.0),
            evade: false,
            attracting: true,
            speed: 1.0,
            dt: 0.05,
        };
        path.step(&ctx(ViewMode::TopDown), &motion, &world, &mut rng, &mut NullDiagnostics);
        // halfway toward a full-strength pull
        assert!((path.move_vector().length() - ATTRACT_STRENGTH * 0.5).abs() < 1e-4);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_waypoints_within_line_reach(
            seed in any::<u64>(),
            x in -10.0f32..10.0,
            y in -8.0f32..-1.0,
            hops in 1usize..12,
        ) {
            let mut rng = RngSeed::new(seed).to_rng();
            let mut path = FloatPathfinder::new();
            let world = Pond { wall: Some(12.0) };
            let context = ctx(ViewMode::SideView);

            path.step(&context, &evading(Vec2::new(x, y)), &world, &mut rng, &mut NullDiagnostics);
            for _ in 0..hops {
                let target = path.waypoints()[1].position;
                path.step(&context, &evading(target), &world, &mut rng, &mut NullDiagnostics);
            }

            let points = path.waypoints();
            for w in &points[1..] {
                if w.quality != WaypointQuality::Fallback {
                    prop_assert!(w.position.distance(context.anchor) <= context.max_line_length);
                    prop_assert!(w.position.x < 12.0);
                }
            }
            for triple in points.windows(3) {
                if triple[2].quality == WaypointQuality::Strict && triple[0].position != triple[1].position {
                    let angle = angle_between_deg(
                        triple[0].position - triple[1].position,
                        triple[2].position - triple[1].position,
                    );
                    prop_assert!(angle >= MIN_TURN_ANGLE_DEG - 1e-3);
                }
            }
        }
    }
}

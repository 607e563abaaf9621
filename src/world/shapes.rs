//! Collider shapes and the geometry queries run against them
//!
//! Circles and axis-aligned boxes cover everything a pond scene needs:
//! banks, water volumes, rocks, the floor. Segment casts report the entry
//! point and the surface normal there; a segment that starts inside a shape
//! hits at its own start.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
}

/// Where a segment first touches a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Fraction along the segment in [0, 1]
    pub t: f32,
    pub point: Vec2,
    /// Surface normal pointing back toward the segment start
    pub normal: Vec2,
}

impl Shape {
    pub fn contains(&self, p: Vec2) -> bool {
        match *self {
            Shape::Circle { center, radius } => p.distance_squared(center) <= radius * radius,
            Shape::Rect { min, max } => p.cmpge(min).all() && p.cmple(max).all(),
        }
    }

    /// Whether a disc touches or overlaps the shape
    pub fn overlaps_disc(&self, center: Vec2, radius: f32) -> bool {
        match *self {
            Shape::Circle {
                center: c,
                radius: r,
            } => center.distance(c) <= r + radius,
            Shape::Rect { min, max } => {
                let closest = center.clamp(min, max);
                closest.distance(center) <= radius
            }
        }
    }

    /// First contact of the segment `a -> b` with the shape
    pub fn segment_hit(&self, a: Vec2, b: Vec2) -> Option<SegmentHit> {
        match *self {
            Shape::Circle { center, radius } => segment_circle(a, b, center, radius),
            Shape::Rect { min, max } => segment_rect(a, b, min, max),
        }
    }

    pub fn is_valid(&self) -> bool {
        match *self {
            Shape::Circle { radius, .. } => radius > 0.0,
            Shape::Rect { min, max } => min.cmplt(max).all(),
        }
    }
}

fn segment_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> Option<SegmentHit> {
    let to_start = a - center;
    if to_start.length_squared() <= radius * radius {
        return Some(SegmentHit {
            t: 0.0,
            point: a,
            normal: to_start.normalize_or_zero(),
        });
    }

    let d = b - a;
    let qa = d.length_squared();
    if qa <= f32::EPSILON {
        return None;
    }
    let qb = 2.0 * to_start.dot(d);
    let qc = to_start.length_squared() - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }

    let t = (-qb - disc.sqrt()) / (2.0 * qa);
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let point = a + d * t;
    Some(SegmentHit {
        t,
        point,
        normal: (point - center).normalize_or_zero(),
    })
}

/// Slab test against an axis-aligned box
fn segment_rect(a: Vec2, b: Vec2, min: Vec2, max: Vec2) -> Option<SegmentHit> {
    if a.cmpge(min).all() && a.cmple(max).all() {
        let center = (min + max) * 0.5;
        return Some(SegmentHit {
            t: 0.0,
            point: a,
            normal: axis_normal(a - center, (max - min) * 0.5),
        });
    }

    let d = b - a;
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (origin, dir, lo, hi) = (a[axis], d[axis], min[axis], max[axis]);
        if dir.abs() <= f32::EPSILON {
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }

        let (mut t0, mut t1) = ((lo - origin) / dir, (hi - origin) / dir);
        let mut n = Vec2::ZERO;
        n[axis] = -dir.signum();
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        if t0 > t_enter {
            t_enter = t0;
            normal = n;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(SegmentHit {
        t: t_enter,
        point: a + d * t_enter,
        normal,
    })
}

/// Outward normal of the box face nearest to `offset` (relative to the center)
fn axis_normal(offset: Vec2, half_extents: Vec2) -> Vec2 {
    let gap = half_extents - offset.abs();
    if gap.x < gap.y {
        Vec2::new(offset.x.signum(), 0.0)
    } else {
        Vec2::new(0.0, offset.y.signum())
    }
}

/// Velocity left after an inelastic contact: the part driving into the
/// surface is removed, the rest is damped
#[inline]
pub fn absorb_velocity(velocity: Vec2, normal: Vec2, damping: f32) -> Vec2 {
    let into = velocity.dot(normal);
    let slid = if into < 0.0 {
        velocity - into * normal
    } else {
        velocity
    };
    slid * (1.0 - damping).clamp(0.0, 1.0)
}

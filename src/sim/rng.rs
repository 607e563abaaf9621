//! Injected randomness
//!
//! The simulation never touches a global RNG. Everything draws from a
//! `RandomSource`, implemented here for the seedable `Pcg32`.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Uniform random draws used by the simulation
pub trait RandomSource {
    /// Uniform float in `[min, max)`; returns `min` for an empty range
    fn range_f32(&mut self, min: f32, max: f32) -> f32;
    /// Uniform integer in `[min, max]`
    fn range_i32(&mut self, min: i32, max: i32) -> i32;
    /// Uniform point inside the unit disc
    fn inside_unit_circle(&mut self) -> Vec2;
    /// Uniform random permutation in place
    fn shuffle<T>(&mut self, items: &mut [T]);
}

impl RandomSource for Pcg32 {
    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.random_range(min..max)
    }

    fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.random_range(min..=max)
    }

    fn inside_unit_circle(&mut self) -> Vec2 {
        // sqrt keeps the density uniform over the disc area
        let r = self.random::<f32>().sqrt();
        let theta = self.random_range(0.0..TAU);
        Vec2::new(theta.cos(), theta.sin()) * r
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(self);
    }
}

/// RNG seed wrapper for serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngSeed {
    pub seed: u64,
}

impl RngSeed {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

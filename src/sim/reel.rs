//! Reel speed
//!
//! Hooked loot swims at a jittery speed of its own. While the angler reels,
//! the float moves at whatever the line's attract speed beats the loot by;
//! otherwise the loot sets the pace. The applied speed eases toward the
//! target instead of jumping.

use serde::{Deserialize, Serialize};

use super::loot::LootTier;
use super::rng::RandomSource;
use crate::consts::{
    LOOT_BASE_SPEED, LOOT_SPEED_BY_TIER, MIN_REEL_SPEED, REEL_FACTOR_BY_TIER, REEL_SMOOTHING,
};
use crate::lerp;

const JITTER_MIN: f32 = 1.0;
const JITTER_MAX: f32 = 3.0;
const JITTER_PERIOD_MIN: f32 = 2.0;
const JITTER_PERIOD_MAX: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelSpeed {
    jitter: f32,
    jitter_timer: f32,
    /// Speed applied to the float this tick
    pub final_speed: f32,
}

impl Default for ReelSpeed {
    fn default() -> Self {
        Self {
            jitter: JITTER_MIN,
            jitter_timer: JITTER_PERIOD_MIN,
            final_speed: 0.0,
        }
    }
}

impl ReelSpeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn jitter(&self) -> f32 {
        self.jitter
    }

    /// Unjittered swim speed of loot
    pub fn base_loot_speed(weight: f32, tier: LootTier) -> f32 {
        LOOT_BASE_SPEED + weight * 0.1 * LOOT_SPEED_BY_TIER[tier.index()]
    }

    /// Swim speed of the loot this tick; resamples the jitter when due
    pub fn loot_speed<R: RandomSource>(
        &mut self,
        weight: f32,
        tier: LootTier,
        dt: f32,
        rng: &mut R,
    ) -> f32 {
        self.jitter_timer -= dt;
        if self.jitter_timer < 0.0 {
            self.jitter = rng.range_f32(JITTER_MIN, JITTER_MAX);
            self.jitter_timer = rng.range_f32(JITTER_PERIOD_MIN, JITTER_PERIOD_MAX);
        }
        Self::base_loot_speed(weight, tier) * self.jitter
    }

    /// Speed the float should be heading toward
    pub fn target_speed(attracting: bool, attract_speed: f32, loot_speed: f32, tier: LootTier) -> f32 {
        if attracting {
            ((attract_speed - loot_speed) * REEL_FACTOR_BY_TIER[tier.index()]).max(MIN_REEL_SPEED)
        } else {
            loot_speed
        }
    }

    /// Advance one tick and return the smoothed speed
    pub fn step<R: RandomSource>(
        &mut self,
        attracting: bool,
        attract_speed: f32,
        weight: f32,
        tier: LootTier,
        dt: f32,
        rng: &mut R,
    ) -> f32 {
        let loot_speed = self.loot_speed(weight, tier, dt, rng);
        let target = Self::target_speed(attracting, attract_speed, loot_speed, tier);
        self.final_speed = lerp(self.final_speed, target, REEL_SMOOTHING * dt);
        self.final_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::RngSeed;

    #[test]
    fn test_base_loot_speed() {
        assert!((ReelSpeed::base_loot_speed(10.0, LootTier::Common) - 2.2).abs() < 1e-5);
        assert!((ReelSpeed::base_loot_speed(10.0, LootTier::Legendary) - 4.2).abs() < 1e-5);
    }

    #[test]
    fn test_target_speed_floor_and_tiers() {
        // loot outpaces the reel: floor applies
        assert_eq!(ReelSpeed::target_speed(true, 3.0, 10.0, LootTier::Rare), 2.0);
        let t = ReelSpeed::target_speed(true, 20.0, 10.0, LootTier::Legendary);
        assert!((t - 5.0).abs() < 1e-5);
        assert_eq!(ReelSpeed::target_speed(false, 20.0, 7.5, LootTier::Epic), 7.5);
    }

    #[test]
    fn test_jitter_holds_until_timer_expires() {
        let mut rng = RngSeed::new(11).to_rng();
        let mut reel = ReelSpeed::new();

        // first two seconds keep the initial jitter of 1.0
        for _ in 0..19 {
            let speed = reel.loot_speed(0.0, LootTier::Common, 0.1, &mut rng);
            assert!((speed - LOOT_BASE_SPEED).abs() < 1e-5);
        }
        for _ in 0..5 {
            reel.loot_speed(0.0, LootTier::Common, 0.1, &mut rng);
        }
        assert!((JITTER_MIN..JITTER_MAX).contains(&reel.jitter()));
    }

    #[test]
    fn test_final_speed_eases_toward_target() {
        let mut rng = RngSeed::new(2).to_rng();
        let mut reel = ReelSpeed::new();
        let first = reel.step(true, 40.0, 1.0, LootTier::Common, 0.1, &mut rng);
        assert!(first > 0.0);
        let mut last = first;
        for _ in 0..10 {
            last = reel.step(true, 40.0, 1.0, LootTier::Common, 0.1, &mut rng);
        }
        assert!(last > first);

        reel.reset();
        assert_eq!(reel.final_speed, 0.0);
    }
}

//! Bite detection
//!
//! Every `catch_check_interval` seconds one integer sample in [1, 100] is
//! compared against the bite percentage of the active tier, scaled down for
//! short casts: `base * lerp(0.3, 1.0, distance / safe_distance)`, floored.

use serde::{Deserialize, Serialize};

use super::loot::{BaitItem, LootTier};
use super::rng::RandomSource;
use crate::consts::{BITE_SCALE_MAX, BITE_SCALE_MIN};
use crate::settings::CatchProbabilityConfig;
use crate::{inverse_lerp, lerp};

/// Multiplier applied to base percentages for a cast of `distance`
#[inline]
pub fn distance_scale(distance: f32, safe_distance: f32) -> f32 {
    lerp(
        BITE_SCALE_MIN,
        BITE_SCALE_MAX,
        inverse_lerp(0.0, safe_distance, distance),
    )
}

/// Distance-scaled percentage, floored to a whole number
pub fn scaled_probability(base: u32, distance: f32, safe_distance: f32) -> u32 {
    (base as f32 * distance_scale(distance, safe_distance)).floor() as u32
}

/// Scaled percentages for every tier (Common..Legendary)
pub fn scaled_table(config: &CatchProbabilityConfig, distance: f32) -> [u32; 5] {
    LootTier::ALL.map(|tier| {
        scaled_probability(
            config.base_for(tier),
            distance,
            config.min_safe_fishing_distance_factor,
        )
    })
}

/// The tier whose percentage governs bites: the bait's, or Common without bait
pub fn bite_tier(bait: Option<&BaitItem>) -> LootTier {
    bait.map_or(LootTier::Common, |b| b.tier.loot_tier())
}

/// Resolve one trial with an explicit sample
pub fn is_bite(
    sample: u32,
    config: &CatchProbabilityConfig,
    bait: Option<&BaitItem>,
    distance: f32,
) -> bool {
    let table = scaled_table(config, distance);
    sample <= table[bite_tier(bait).index()]
}

/// Countdown between bite trials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiteCheck {
    interval: f32,
    timer: f32,
}

impl BiteCheck {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            timer: interval,
        }
    }

    pub fn reset(&mut self) {
        self.timer = self.interval;
    }

    /// Seconds until the next trial
    pub fn remaining(&self) -> f32 {
        self.timer
    }

    /// Advance the countdown; runs a trial when it elapses.
    /// Returns true when something bites.
    pub fn step<R: RandomSource>(
        &mut self,
        dt: f32,
        rng: &mut R,
        config: &CatchProbabilityConfig,
        bait: Option<&BaitItem>,
        distance: f32,
    ) -> bool {
        self.timer -= dt;
        if self.timer > 0.0 {
            return false;
        }
        self.timer = self.interval;

        let sample = rng.range_i32(1, 100) as u32;
        let bite = is_bite(sample, config, bait, distance);
        log::debug!(
            "Bite trial: sample {} vs {:?} at {:.2} -> {}",
            sample,
            bite_tier(bait),
            distance,
            bite
        );
        bite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::loot::BaitTier;
    use crate::sim::rng::RngSeed;
    use proptest::prelude::*;

    fn bait(tier: BaitTier) -> BaitItem {
        BaitItem {
            tier,
            name: "fly".to_string(),
            description: String::new(),
            item_id: "fly_item".to_string(),
        }
    }

    #[test]
    fn test_zero_distance_common_without_bait() {
        let config = CatchProbabilityConfig::default();
        assert_eq!(scaled_probability(5, 0.0, 5.0), 1);
        assert!(is_bite(1, &config, None, 0.0));
        assert!(!is_bite(2, &config, None, 0.0));
    }

    #[test]
    fn test_bait_uses_its_own_tier() {
        let config = CatchProbabilityConfig::default();
        let epic = bait(BaitTier::Epic);
        // at the safe distance the base value applies: 35
        assert!(is_bite(35, &config, Some(&epic), 5.0));
        assert!(!is_bite(36, &config, Some(&epic), 5.0));
        assert_eq!(bite_tier(Some(&epic)), LootTier::Epic);
        assert_eq!(bite_tier(None), LootTier::Common);
    }

    #[test]
    fn test_scale_clamps_past_safe_distance() {
        let config = CatchProbabilityConfig::default();
        assert_eq!(scaled_table(&config, 50.0), [5, 12, 22, 35, 45]);
        assert_eq!(scaled_table(&config, 0.0), [1, 3, 6, 10, 13]);
    }

    #[test]
    fn test_bite_check_waits_for_interval() {
        let config = CatchProbabilityConfig {
            common: 100,
            ..Default::default()
        };
        let mut rng = RngSeed::new(1).to_rng();
        let mut check = BiteCheck::new(1.0);

        assert!(!check.step(0.5, &mut rng, &config, None, 10.0));
        assert!(check.step(0.5, &mut rng, &config, None, 10.0));
        assert_eq!(check.remaining(), 1.0);
        assert!(!check.step(0.25, &mut rng, &config, None, 10.0));
    }

    #[test]
    fn test_zero_percent_never_bites() {
        let config = CatchProbabilityConfig {
            common: 0,
            ..Default::default()
        };
        let mut rng = RngSeed::new(9).to_rng();
        let mut check = BiteCheck::new(0.1);
        for _ in 0..200 {
            assert!(!check.step(0.1, &mut rng, &config, None, 10.0));
        }
    }

    proptest! {
        #[test]
        fn prop_scaled_monotonic_in_distance(base in 0u32..=100, a in 0.0f32..20.0, b in 0.0f32..20.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(scaled_probability(base, near, 5.0) <= scaled_probability(base, far, 5.0));
            if far >= 5.0 {
                prop_assert_eq!(scaled_probability(base, far, 5.0), base);
            }
        }
    }
}

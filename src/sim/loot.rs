//! Loot and bait data plus weighted, tier-gated loot selection
//!
//! Selection works on percentage shares: each entry's rarity weight over the
//! pool total. One sample in [1, 100] walks the cumulative shares; the entry
//! it lands on is either taken or, if its tier is above what the bait allows,
//! the whole draw comes up empty.

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use crate::settings::ConfigError;

/// Rarity rank of a loot entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LootTier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl LootTier {
    pub const ALL: [LootTier; 5] = [
        LootTier::Common,
        LootTier::Uncommon,
        LootTier::Rare,
        LootTier::Epic,
        LootTier::Legendary,
    ];

    #[inline]
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Index into per-tier tables
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Rank of equipped bait (there is no common bait)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BaitTier {
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl BaitTier {
    /// The loot tier whose bite probability this bait uses
    pub fn loot_tier(self) -> LootTier {
        match self {
            BaitTier::Uncommon => LootTier::Uncommon,
            BaitTier::Rare => LootTier::Rare,
            BaitTier::Epic => LootTier::Epic,
            BaitTier::Legendary => LootTier::Legendary,
        }
    }
}

/// An equippable bait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaitItem {
    pub tier: BaitTier,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Spawnable item used when the bait is handed back to the angler
    pub item_id: String,
}

/// How hooked loot behaves in the water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LootKind {
    /// Swims along an evasive path
    #[default]
    Fish,
    /// Dead weight, only follows the line
    Item,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRange {
    pub min: f32,
    pub max: f32,
}

/// One entry of a liquid body's loot pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub id: String,
    #[serde(default)]
    pub kind: LootKind,
    pub tier: LootTier,
    /// Relative rarity weight (positive)
    pub rarity: f32,
    pub weight_range: WeightRange,
    /// Spawnable item handed to the angler on a catch
    #[serde(default)]
    pub item_id: Option<String>,
}

impl LootEntry {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rarity > 0.0) {
            return Err(ConfigError::NonPositiveRarity {
                id: self.id.clone(),
                rarity: self.rarity,
            });
        }
        if self.weight_range.min > self.weight_range.max {
            return Err(ConfigError::InvertedWeightRange {
                id: self.id.clone(),
                min: self.weight_range.min,
                max: self.weight_range.max,
            });
        }
        Ok(())
    }
}

/// Loot committed to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookedLoot {
    pub entry: LootEntry,
    pub weight: f32,
}

/// Highest loot tier ordinal the bait lets through.
///
/// Bait ranks on the loot scale (Uncommon = 1 .. Legendary = 4) and
/// allows one tier above itself; no bait allows only Common.
pub fn bait_gate(bait: Option<&BaitItem>) -> u32 {
    match bait {
        Some(bait) => bait.tier.loot_tier().ordinal() + 1,
        None => 0,
    }
}

/// Each entry's share of the pool in percent (sums to 100)
pub fn percentage_shares(pool: &[LootEntry]) -> Vec<f32> {
    let total: f32 = pool.iter().map(|e| e.rarity).sum();
    if total <= 0.0 {
        return vec![0.0; pool.len()];
    }
    pool.iter().map(|e| e.rarity / total * 100.0).collect()
}

/// Outcome of walking the cumulative shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// Index of the selected entry
    Selected(usize),
    /// The sample landed on an entry above the bait gate
    Gated(usize),
    /// Nothing to pick from
    Empty,
}

/// Walk the pool in its current order and resolve `sample` (in [1, 100])
pub fn pick_by_sample(pool: &[LootEntry], sample: f32, gate: u32) -> Pick {
    let shares = percentage_shares(pool);
    let last = shares.len().checked_sub(1);
    let mut cumulative = 0.0_f32;

    for (i, share) in shares.iter().enumerate() {
        cumulative += *share;
        if Some(i) == last {
            // float error must not leave a gap below 100
            cumulative = cumulative.max(100.0);
        }
        if sample <= cumulative {
            return if pool[i].tier.ordinal() <= gate {
                Pick::Selected(i)
            } else {
                Pick::Gated(i)
            };
        }
    }

    Pick::Empty
}

/// Weighted random loot selection
pub struct LootSelector;

impl LootSelector {
    /// One draw: shuffle, sample, gate, then roll the catch weight.
    /// The pool itself is never mutated.
    pub fn draw<R: RandomSource>(
        pool: &[LootEntry],
        bait: Option<&BaitItem>,
        rng: &mut R,
    ) -> Option<HookedLoot> {
        if pool.is_empty() {
            return None;
        }

        let mut order: Vec<&LootEntry> = pool.iter().collect();
        rng.shuffle(&mut order);
        let shuffled: Vec<LootEntry> = order.into_iter().cloned().collect();

        let sample = rng.range_f32(1.0, 100.0);
        match pick_by_sample(&shuffled, sample, bait_gate(bait)) {
            Pick::Selected(i) => {
                let entry = shuffled[i].clone();
                let weight = rng.range_f32(entry.weight_range.min, entry.weight_range.max);
                log::debug!("Loot draw {:.1} -> {} ({:.2})", sample, entry.id, weight);
                Some(HookedLoot { entry, weight })
            }
            Pick::Gated(i) => {
                log::debug!("Loot draw {:.1} -> {} gated by bait", sample, shuffled[i].id);
                None
            }
            Pick::Empty => None,
        }
    }

    /// Up to `max_draws` draws; returns the loot (if any) and draws used
    pub fn draw_bounded<R: RandomSource>(
        pool: &[LootEntry],
        bait: Option<&BaitItem>,
        rng: &mut R,
        max_draws: u32,
    ) -> (Option<HookedLoot>, u32) {
        for used in 1..=max_draws {
            if let Some(loot) = Self::draw(pool, bait, rng) {
                return (Some(loot), used);
            }
        }
        (None, max_draws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::RngSeed;
    use proptest::prelude::*;

    fn entry(id: &str, tier: LootTier, rarity: f32) -> LootEntry {
        LootEntry {
            id: id.to_string(),
            kind: LootKind::Fish,
            tier,
            rarity,
            weight_range: WeightRange { min: 1.0, max: 3.0 },
            item_id: Some(format!("{id}_item")),
        }
    }

    fn bait(tier: BaitTier) -> BaitItem {
        BaitItem {
            tier,
            name: "worm".to_string(),
            description: String::new(),
            item_id: "worm_item".to_string(),
        }
    }

    #[test]
    fn test_gate_values() {
        assert_eq!(bait_gate(None), 0);
        assert_eq!(bait_gate(Some(&bait(BaitTier::Uncommon))), 2);
        assert_eq!(bait_gate(Some(&bait(BaitTier::Legendary))), 5);
    }

    #[test]
    fn test_cumulative_pick_selects_rare_with_uncommon_bait() {
        let pool = vec![
            entry("carp", LootTier::Common, 70.0),
            entry("pike", LootTier::Rare, 30.0),
        ];
        let gate = bait_gate(Some(&bait(BaitTier::Uncommon)));
        assert_eq!(pick_by_sample(&pool, 75.0, gate), Pick::Selected(1));
        assert_eq!(pick_by_sample(&pool, 70.0, gate), Pick::Selected(0));
    }

    #[test]
    fn test_gated_pick_does_not_fall_through() {
        let pool = vec![
            entry("pike", LootTier::Rare, 30.0),
            entry("carp", LootTier::Common, 70.0),
        ];
        assert_eq!(pick_by_sample(&pool, 10.0, 0), Pick::Gated(0));
        assert_eq!(pick_by_sample(&pool, 50.0, 0), Pick::Selected(1));
    }

    #[test]
    fn test_last_entry_covers_sample_100() {
        let pool = vec![
            entry("a", LootTier::Common, 1.0),
            entry("b", LootTier::Common, 1.0),
            entry("c", LootTier::Common, 1.0),
        ];
        assert_eq!(pick_by_sample(&pool, 100.0, 0), Pick::Selected(2));
        assert_eq!(pick_by_sample(&[], 50.0, 4), Pick::Empty);
    }

    #[test]
    fn test_draw_rolls_weight_in_range() {
        let pool = vec![entry("carp", LootTier::Common, 1.0)];
        let mut rng = RngSeed::new(11).to_rng();
        let loot = LootSelector::draw(&pool, None, &mut rng).expect("single common entry");
        assert_eq!(loot.entry.id, "carp");
        assert!((1.0..=3.0).contains(&loot.weight));
    }

    #[test]
    fn test_draw_bounded_stops() {
        let pool = vec![entry("kraken", LootTier::Legendary, 1.0)];
        let mut rng = RngSeed::new(5).to_rng();
        let (loot, used) = LootSelector::draw_bounded(&pool, None, &mut rng, 8);
        assert!(loot.is_none());
        assert_eq!(used, 8);
    }

    #[test]
    fn test_entry_validation() {
        let mut bad = entry("x", LootTier::Common, 0.0);
        assert!(matches!(bad.validate(), Err(ConfigError::NonPositiveRarity { .. })));
        bad.rarity = 1.0;
        bad.weight_range = WeightRange { min: 5.0, max: 1.0 };
        assert!(matches!(bad.validate(), Err(ConfigError::InvertedWeightRange { .. })));
    }

    fn tier_strategy() -> impl Strategy<Value = LootTier> {
        (0usize..5).prop_map(|i| LootTier::ALL[i])
    }

    proptest! {
        #[test]
        fn prop_shares_sum_to_100(rarities in prop::collection::vec(0.01f32..1000.0, 1..20)) {
            let pool: Vec<LootEntry> = rarities
                .iter()
                .enumerate()
                .map(|(i, r)| entry(&format!("e{i}"), LootTier::Common, *r))
                .collect();
            let sum: f32 = percentage_shares(&pool).iter().sum();
            prop_assert!((sum - 100.0).abs() <= 1e-3);
        }

        #[test]
        fn prop_draw_respects_gate(
            tiers in prop::collection::vec(tier_strategy(), 1..10),
            bait_idx in 0usize..5,
            seed in any::<u64>(),
        ) {
            let pool: Vec<LootEntry> = tiers
                .iter()
                .enumerate()
                .map(|(i, t)| entry(&format!("e{i}"), *t, 1.0 + i as f32))
                .collect();
            let equipped = match bait_idx {
                0 => None,
                1 => Some(bait(BaitTier::Uncommon)),
                2 => Some(bait(BaitTier::Rare)),
                3 => Some(bait(BaitTier::Epic)),
                _ => Some(bait(BaitTier::Legendary)),
            };
            let gate = bait_gate(equipped.as_ref());
            let mut rng = RngSeed::new(seed).to_rng();
            for _ in 0..16 {
                if let Some(loot) = LootSelector::draw(&pool, equipped.as_ref(), &mut rng) {
                    prop_assert!(loot.entry.tier.ordinal() <= gate);
                }
            }
        }
    }
}

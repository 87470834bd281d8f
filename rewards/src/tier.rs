//! Reputation → reward tier table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Weights are stored in basis points; 10 000 bps = weight 1.0.
pub const WEIGHT_SCALE_BPS: u32 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TierName {
    Foundation,
    Established,
    Authority,
}

impl TierName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foundation => "Foundation",
            Self::Established => "Established",
            Self::Authority => "Authority",
        }
    }
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTier {
    pub name: TierName,
    pub min_reputation: i64,
    /// Inclusive upper bound; `None` for the unbounded top tier.
    pub max_reputation: Option<i64>,
    pub weight_bps: u32,
}

impl RewardTier {
    /// Multiplier applied in reward distribution (1.0, 1.25 or 1.5).
    pub fn reward_weight(&self) -> f64 {
        f64::from(self.weight_bps) / f64::from(WEIGHT_SCALE_BPS)
    }

    pub fn contains(&self, reputation: i64) -> bool {
        reputation >= self.min_reputation && self.max_reputation.map_or(true, |max| reputation <= max)
    }
}

/// Contiguous, non-overlapping, ordered by `min_reputation`.
pub static REWARD_TIERS: [RewardTier; 3] = [
    RewardTier {
        name: TierName::Foundation,
        min_reputation: 0,
        max_reputation: Some(999),
        weight_bps: 10_000,
    },
    RewardTier {
        name: TierName::Established,
        min_reputation: 1000,
        max_reputation: Some(1999),
        weight_bps: 12_500,
    },
    RewardTier {
        name: TierName::Authority,
        min_reputation: 2000,
        max_reputation: None,
        weight_bps: 15_000,
    },
];

/// The tier containing `reputation`. Negative reputation falls back to Foundation.
pub fn get_reward_tier(reputation: i64) -> &'static RewardTier {
    REWARD_TIERS
        .iter()
        .rev()
        .find(|t| reputation >= t.min_reputation)
        .unwrap_or(&REWARD_TIERS[0])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TierProgress {
    pub tier: &'static RewardTier,
    pub next_tier: Option<&'static RewardTier>,
    /// Percent of the current tier's range traversed, 0..=100.
    pub progress: u8,
}

/// Where `reputation` sits within its tier.
///
/// `progress = round(100 × (rep − min) / (max − min + 1))`, so the last value of
/// a bounded tier rounds up to 100. The unbounded top tier always reports 100.
pub fn get_reward_tier_progress(reputation: i64) -> TierProgress {
    let tier = get_reward_tier(reputation);
    let next_tier = REWARD_TIERS
        .iter()
        .find(|t| t.min_reputation > tier.min_reputation);

    let progress = match tier.max_reputation {
        None => 100,
        Some(max) => {
            let span = i128::from(max) - i128::from(tier.min_reputation) + 1;
            let into = (i128::from(reputation) - i128::from(tier.min_reputation)).clamp(0, span);
            // Round half up.
            let pct = (200 * into + span) / (2 * span);
            pct.clamp(0, 100) as u8
        }
    };

    TierProgress {
        tier,
        next_tier,
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(get_reward_tier(999).name, TierName::Foundation);
        assert_eq!(get_reward_tier(1000).name, TierName::Established);
        assert_eq!(get_reward_tier(1999).name, TierName::Established);
        assert_eq!(get_reward_tier(2000).name, TierName::Authority);
        assert_eq!(get_reward_tier(-10).name, TierName::Foundation);
        assert_eq!(get_reward_tier(i64::MAX).name, TierName::Authority);
        assert_eq!(get_reward_tier(i64::MIN).name, TierName::Foundation);
    }

    #[test]
    fn weights() {
        let weights: Vec<f64> = REWARD_TIERS.iter().map(|t| t.reward_weight()).collect();
        assert_eq!(weights, vec![1.0, 1.25, 1.5]);
    }

    #[test]
    fn table_is_contiguous() {
        for pair in REWARD_TIERS.windows(2) {
            assert_eq!(pair[1].min_reputation, pair[0].max_reputation.unwrap() + 1);
        }
        assert!(REWARD_TIERS.last().unwrap().max_reputation.is_none());
    }

    #[test]
    fn progress_values() {
        assert_eq!(get_reward_tier_progress(0).progress, 0);
        assert_eq!(get_reward_tier_progress(500).progress, 50);
        assert_eq!(get_reward_tier_progress(999).progress, 100);
        assert_eq!(get_reward_tier_progress(1000).progress, 0);
        assert_eq!(get_reward_tier_progress(1005).progress, 1);
        assert_eq!(get_reward_tier_progress(-50).progress, 0);

        let top = get_reward_tier_progress(2000);
        assert_eq!(top.next_tier, None);
        assert_eq!(top.progress, 100);

        let foundation = get_reward_tier_progress(10);
        assert_eq!(foundation.next_tier.map(|t| t.name), Some(TierName::Established));
    }

    #[test]
    fn tier_serializes_with_name() {
        let json = serde_json::to_value(get_reward_tier(1500)).unwrap();
        assert_eq!(json["name"], "Established");
        assert_eq!(json["max_reputation"], 1999);
        assert!(serde_json::to_value(get_reward_tier(2500)).unwrap()["max_reputation"].is_null());
    }
}

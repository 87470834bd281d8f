//! Reward tiers.
//!
//! Reputation places an expert in one of three tiers, each with a reward
//! weight. A reward pool is split in proportion to weight:
//!
//! `Reward_i = (weight_i / Σ weight_j) × Pool`

pub mod distribution;
pub mod error;
pub mod tier;

pub use distribution::{distribute, Distribution, RewardShare};
pub use error::RewardError;
pub use tier::{
    get_reward_tier, get_reward_tier_progress, RewardTier, TierName, TierProgress, REWARD_TIERS,
    WEIGHT_SCALE_BPS,
};

//! Weighted split of a reward pool across experts.
//!
//! All arithmetic is on raw stake units. Each share is rounded down and the
//! units lost to rounding are reported as `remainder`, so
//! `Σ shares + remainder == pool` always holds.

use crate::error::RewardError;
use crate::tier::{get_reward_tier, TierName};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use vetted_types::{ExpertId, StakeAmount};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardShare {
    pub expert_id: ExpertId,
    pub reputation: i64,
    pub tier: TierName,
    pub amount: StakeAmount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    /// One share per participant, in input order.
    pub shares: Vec<RewardShare>,
    /// Undistributed units left by rounding (the whole pool if nobody participated).
    pub remainder: StakeAmount,
}

impl Distribution {
    pub fn distributed(&self) -> StakeAmount {
        StakeAmount::new(self.shares.iter().map(|s| s.amount.raw()).sum())
    }
}

/// Split `pool` among `participants` (expert, reputation) by tier weight.
pub fn distribute(
    pool: StakeAmount,
    participants: &[(ExpertId, i64)],
) -> Result<Distribution, RewardError> {
    let mut seen = HashSet::new();
    for (expert, _) in participants {
        if !seen.insert(expert) {
            return Err(RewardError::DuplicateParticipant(expert.clone()));
        }
    }

    let total_weight: u128 = participants
        .iter()
        .map(|(_, rep)| u128::from(get_reward_tier(*rep).weight_bps))
        .sum();
    if total_weight == 0 {
        return Ok(Distribution {
            shares: Vec::new(),
            remainder: pool,
        });
    }

    let mut shares = Vec::with_capacity(participants.len());
    let mut paid: u128 = 0;
    for (expert, reputation) in participants {
        let tier = get_reward_tier(*reputation);
        let amount = pool
            .raw()
            .checked_mul(u128::from(tier.weight_bps))
            .ok_or(RewardError::Overflow)?
            / total_weight;
        paid += amount;
        shares.push(RewardShare {
            expert_id: expert.clone(),
            reputation: *reputation,
            tier: tier.name,
            amount: StakeAmount::new(amount),
        });
    }

    Ok(Distribution {
        shares,
        remainder: StakeAmount::new(pool.raw() - paid),
    })
}

//! Appeal settlement: what happens to the appealer's stake and who voted
//! with the outcome.
//!
//! - Overturned: stake returned in full, appealer gains reputation, the
//!   original reviewers lose reputation.
//! - Upheld: stake forfeited, appealer loses reputation.

use crate::appeal::{Appeal, OutcomeDecision};
use crate::error::AppealError;
use serde::{Deserialize, Serialize};
use vetted_types::{AppealId, ExpertId, StakeAmount};

/// Per-panelist result of a resolved appeal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelistOutcome {
    pub expert_id: ExpertId,
    /// Whether this panelist's ballot agreed with the final outcome.
    pub voted_with_outcome: bool,
}

/// Stake and reputation movements for a resolved appeal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealSettlement {
    pub appeal_id: AppealId,
    pub appealer: ExpertId,
    pub decision: OutcomeDecision,
    pub stake_returned: StakeAmount,
    pub stake_forfeited: StakeAmount,
    pub appealer_reputation_change: i32,
    pub original_reviewers_reputation_change: Option<i32>,
    /// Panelists who voted, in voting order. Panelists who never voted are absent.
    pub panelists: Vec<PanelistOutcome>,
}

/// Summarise the stake movement of a resolved appeal.
pub fn settlement(appeal: &Appeal) -> Result<AppealSettlement, AppealError> {
    let outcome = appeal.outcome.as_ref().ok_or(AppealError::WrongStatus {
        operation: "settle",
        status: appeal.status,
    })?;

    let (stake_returned, stake_forfeited) = if outcome.appealer_stake_returned {
        (appeal.stake_amount, StakeAmount::ZERO)
    } else {
        (StakeAmount::ZERO, appeal.stake_amount)
    };
    let agreeing = outcome.decision.agreeing_ballot();

    Ok(AppealSettlement {
        appeal_id: appeal.id.clone(),
        appealer: appeal.appealer_expert_id.clone(),
        decision: outcome.decision,
        stake_returned,
        stake_forfeited,
        appealer_reputation_change: outcome.appealer_reputation_change,
        original_reviewers_reputation_change: outcome.original_reviewers_reputation_change,
        panelists: appeal
            .votes
            .iter()
            .map(|v| PanelistOutcome {
                expert_id: v.expert_id.clone(),
                voted_with_outcome: v.decision == agreeing,
            })
            .collect(),
    })
}

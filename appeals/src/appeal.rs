//! Appeals against a rejection decision and the votes of their panel.

use serde::{Deserialize, Serialize};
use std::fmt;
use vetted_types::{
    AppealId, ApplicationId, ExpertId, GuildId, StakeAmount, Timestamp,
};

/// Lifecycle of an appeal: `pending → reviewing → {upheld | overturned}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppealStatus {
    /// Filed, waiting for a panel.
    Pending,
    /// Panel assigned; votes are being collected.
    Reviewing,
    /// The original rejection stands.
    Upheld,
    /// The original rejection was reversed.
    Overturned,
}

impl AppealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Upheld => "upheld",
            Self::Overturned => "overturned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Upheld | Self::Overturned)
    }
}

impl fmt::Display for AppealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A panel member's ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppealDecision {
    /// Keep the rejection.
    Uphold,
    /// Reverse the rejection.
    Overturn,
}

/// How an appeal was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeDecision {
    Upheld,
    Overturned,
}

impl OutcomeDecision {
    pub fn status(&self) -> AppealStatus {
        match self {
            Self::Upheld => AppealStatus::Upheld,
            Self::Overturned => AppealStatus::Overturned,
        }
    }

    /// The ballot that agrees with this outcome.
    pub fn agreeing_ballot(&self) -> AppealDecision {
        match self {
            Self::Upheld => AppealDecision::Uphold,
            Self::Overturned => AppealDecision::Overturn,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealVote {
    pub expert_id: ExpertId,
    pub expert_name: String,
    pub decision: AppealDecision,
    pub reasoning: String,
    pub voted_at: Timestamp,
}

/// Appealer reputation change when the rejection is overturned.
pub const OVERTURN_REPUTATION_DELTA: i32 = 3;

/// Appealer reputation change when the rejection is upheld.
pub const UPHELD_REPUTATION_DELTA: i32 = -5;

/// Reputation and stake consequences of a resolved appeal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealOutcome {
    pub decision: OutcomeDecision,
    pub appealer_reputation_change: i32,
    pub appealer_stake_returned: bool,
    /// Negative on overturn; absent when the rejection is upheld.
    pub original_reviewers_reputation_change: Option<i32>,
    pub resolved_at: Timestamp,
}

impl AppealOutcome {
    /// Build the outcome for `decision`.
    ///
    /// The reviewers' reputation change is supplied by whoever resolves the
    /// appeal and is only recorded for overturns; for an upheld appeal it is
    /// dropped.
    pub fn for_decision(
        decision: OutcomeDecision,
        reviewers_reputation_change: Option<i32>,
        resolved_at: Timestamp,
    ) -> Self {
        match decision {
            OutcomeDecision::Overturned => Self {
                decision,
                appealer_reputation_change: OVERTURN_REPUTATION_DELTA,
                appealer_stake_returned: true,
                original_reviewers_reputation_change: reviewers_reputation_change,
                resolved_at,
            },
            OutcomeDecision::Upheld => Self {
                decision,
                appealer_reputation_change: UPHELD_REPUTATION_DELTA,
                appealer_stake_returned: false,
                original_reviewers_reputation_change: None,
                resolved_at,
            },
        }
    }
}

/// Input for filing an appeal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAppealRequest {
    pub application_id: ApplicationId,
    pub guild_id: GuildId,
    pub appealer_expert_id: ExpertId,
    pub justification: String,
    pub stake_amount: StakeAmount,
}

/// An appeal and everything recorded about it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appeal {
    pub id: AppealId,
    pub application_id: ApplicationId,
    pub guild_id: GuildId,
    pub appealer_expert_id: ExpertId,
    pub justification: String,
    pub stake_amount: StakeAmount,
    pub status: AppealStatus,
    /// Assigned panel members; empty until a panel is assigned.
    #[serde(default)]
    pub panel: Vec<ExpertId>,
    pub panel_size: u32,
    /// Cast votes only, in casting order.
    pub votes: Vec<AppealVote>,
    pub votes_uphold: u32,
    pub votes_overturn: u32,
    pub outcome: Option<AppealOutcome>,
    pub created_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

impl Appeal {
    pub fn is_resolved(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_panelist(&self, expert: &ExpertId) -> bool {
        self.panel.contains(expert)
    }

    pub fn has_voted(&self, expert: &ExpertId) -> bool {
        self.votes.iter().any(|v| &v.expert_id == expert)
    }

    /// Panel members who have not voted yet.
    pub fn pending_panelists(&self) -> impl Iterator<Item = &ExpertId> + '_ {
        self.panel.iter().filter(|p| !self.has_voted(p))
    }
}

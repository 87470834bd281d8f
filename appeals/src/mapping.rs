//! Backend appeal responses and their translation into [`Appeal`].
//!
//! The backend speaks snake_case status strings. They are closed enums here and
//! this module holds the only translation tables:
//!
//! | backend status                 | appeal status |
//! |--------------------------------|---------------|
//! | `open`, `panel_assigned`       | `pending`     |
//! | `under_review`                 | `reviewing`   |
//! | `approved`                     | `overturned`  |
//! | `dismissed`, `expired`         | `upheld`      |
//!
//! | backend vote        | ballot     |
//! |---------------------|------------|
//! | `uphold_rejection`  | `uphold`   |
//! | `approve_appeal`    | `overturn` |
//!
//! Any other backend value fails deserialization.

use crate::appeal::{Appeal, AppealDecision, AppealOutcome, AppealStatus, AppealVote, OutcomeDecision};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vetted_types::{
    AppealId, ApplicationId, ExpertId, GuildId, ReviewParams, StakeAmount, Timestamp,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendAppealStatus {
    Open,
    PanelAssigned,
    UnderReview,
    Approved,
    Dismissed,
    Expired,
}

impl BackendAppealStatus {
    pub fn status(&self) -> AppealStatus {
        match self {
            Self::Open | Self::PanelAssigned => AppealStatus::Pending,
            Self::UnderReview => AppealStatus::Reviewing,
            Self::Approved => AppealStatus::Overturned,
            Self::Dismissed | Self::Expired => AppealStatus::Upheld,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendVote {
    UpholdRejection,
    ApproveAppeal,
}

impl BackendVote {
    pub fn decision(&self) -> AppealDecision {
        match self {
            Self::UpholdRejection => AppealDecision::Uphold,
            Self::ApproveAppeal => AppealDecision::Overturn,
        }
    }
}

impl From<AppealDecision> for BackendVote {
    fn from(decision: AppealDecision) -> Self {
        match decision {
            AppealDecision::Uphold => Self::UpholdRejection,
            AppealDecision::Overturn => Self::ApproveAppeal,
        }
    }
}

/// A panel seat as reported by the backend; `vote` is null until cast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelMemberResponse {
    pub expert_id: ExpertId,
    #[serde(default)]
    pub expert_name: String,
    pub vote: Option<BackendVote>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub voted_at: Option<Timestamp>,
}

/// Appeal record as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealResponse {
    pub id: AppealId,
    pub application_id: ApplicationId,
    pub guild_id: GuildId,
    pub appealer_id: ExpertId,
    pub justification: String,
    /// Decimal string, e.g. `"50"` or `"62.5"`.
    pub stake_amount: String,
    pub status: BackendAppealStatus,
    #[serde(default)]
    pub panel_members: Vec<PanelMemberResponse>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub resolved_at: Option<Timestamp>,
    #[serde(default)]
    pub reviewers_reputation_change: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("invalid stake amount {value:?}: {reason}")]
    InvalidStake { value: String, reason: String },

    #[error("panel member {0} has a vote but no vote time")]
    IncompleteVote(ExpertId),
}

/// Map a backend response using the platform's default parameters.
pub fn map_appeal_response(response: &AppealResponse) -> Result<Appeal, MappingError> {
    map_appeal_response_with(response, &ReviewParams::default())
}

/// Map a backend response; `params` supplies the default panel size and the
/// appealer reputation deltas.
pub fn map_appeal_response_with(
    response: &AppealResponse,
    params: &ReviewParams,
) -> Result<Appeal, MappingError> {
    let stake_amount: StakeAmount =
        response
            .stake_amount
            .parse()
            .map_err(|e: vetted_types::TypeError| MappingError::InvalidStake {
                value: response.stake_amount.clone(),
                reason: e.to_string(),
            })?;

    let votes = response
        .panel_members
        .iter()
        .filter_map(|member| member.vote.map(|vote| (member, vote)))
        .map(|(member, vote)| {
            Ok(AppealVote {
                expert_id: member.expert_id.clone(),
                expert_name: member.expert_name.clone(),
                decision: vote.decision(),
                reasoning: member.reasoning.clone().unwrap_or_default(),
                voted_at: member
                    .voted_at
                    .ok_or_else(|| MappingError::IncompleteVote(member.expert_id.clone()))?,
            })
        })
        .collect::<Result<Vec<_>, MappingError>>()?;

    let votes_uphold = votes
        .iter()
        .filter(|v| v.decision == AppealDecision::Uphold)
        .count() as u32;
    let votes_overturn = votes.len() as u32 - votes_uphold;

    let status = response.status.status();
    let decision = match status {
        AppealStatus::Overturned => Some(OutcomeDecision::Overturned),
        AppealStatus::Upheld => Some(OutcomeDecision::Upheld),
        AppealStatus::Pending | AppealStatus::Reviewing => None,
    };
    let outcome = decision.zip(response.resolved_at).map(|(decision, resolved_at)| {
        AppealOutcome::for_decision(
            decision,
            response.reviewers_reputation_change,
            resolved_at,
        )
    });

    let panel: Vec<ExpertId> = response
        .panel_members
        .iter()
        .map(|m| m.expert_id.clone())
        .collect();
    let panel_size = if panel.is_empty() {
        params.default_panel_size
    } else {
        panel.len() as u32
    };

    Ok(Appeal {
        id: response.id.clone(),
        application_id: response.application_id.clone(),
        guild_id: response.guild_id.clone(),
        appealer_expert_id: response.appealer_id.clone(),
        justification: response.justification.clone(),
        stake_amount,
        status,
        panel,
        panel_size,
        votes,
        votes_uphold,
        votes_overturn,
        outcome,
        created_at: response.created_at,
        resolved_at: response.resolved_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appeal::{OVERTURN_REPUTATION_DELTA, UPHELD_REPUTATION_DELTA};
    use serde_json::json;

    fn response(status: &str) -> serde_json::Value {
        json!({
            "id": "ap-7",
            "application_id": "app-3",
            "guild_id": "frontend",
            "appealer_id": "cand-1",
            "justification": "portfolio was not reviewed",
            "stake_amount": "50",
            "status": status,
            "panel_members": [],
            "created_at": 1_700_000_000u64,
        })
    }

    fn map(value: serde_json::Value) -> Appeal {
        let parsed: AppealResponse = serde_json::from_value(value).unwrap();
        map_appeal_response(&parsed).unwrap()
    }

    #[test]
    fn status_table() {
        assert_eq!(map(response("open")).status, AppealStatus::Pending);
        assert_eq!(map(response("panel_assigned")).status, AppealStatus::Pending);
        assert_eq!(map(response("under_review")).status, AppealStatus::Reviewing);
        assert_eq!(map(response("approved")).status, AppealStatus::Overturned);
        assert_eq!(map(response("dismissed")).status, AppealStatus::Upheld);
        assert_eq!(map(response("expired")).status, AppealStatus::Upheld);
    }

    #[test]
    fn unknown_status_rejected() {
        let result = serde_json::from_value::<AppealResponse>(response("withdrawn"));
        assert!(result.is_err());
    }

    #[test]
    fn approved_outcome() {
        let mut value = response("approved");
        value["resolved_at"] = json!(1_700_000_500u64);
        value["reviewers_reputation_change"] = json!(-2);
        let appeal = map(value);
        let outcome = appeal.outcome.unwrap();
        assert_eq!(outcome.decision, OutcomeDecision::Overturned);
        assert_eq!(outcome.appealer_reputation_change, 3);
        assert!(outcome.appealer_stake_returned);
        assert_eq!(outcome.original_reviewers_reputation_change, Some(-2));
        assert_eq!(outcome.resolved_at, Timestamp::new(1_700_000_500));
    }

    #[test]
    fn dismissed_and_expired_outcome() {
        for status in ["dismissed", "expired"] {
            let mut value = response(status);
            value["resolved_at"] = json!(1_700_000_500u64);
            value["reviewers_reputation_change"] = json!(-2);
            let outcome = map(value).outcome.unwrap();
            assert_eq!(outcome.decision, OutcomeDecision::Upheld);
            assert_eq!(outcome.appealer_reputation_change, -5);
            assert!(!outcome.appealer_stake_returned);
            assert_eq!(outcome.original_reviewers_reputation_change, None);
        }
    }

    #[test]
    fn no_outcome_without_resolution_time() {
        assert!(map(response("approved")).outcome.is_none());
        let mut value = response("under_review");
        value["resolved_at"] = json!(5);
        assert!(map(value).outcome.is_none());
    }

    #[test]
    fn null_votes_filtered() {
        let mut value = response("under_review");
        value["panel_members"] = json!([
            { "expert_id": "p1", "expert_name": "Ada", "vote": "approve_appeal",
              "reasoning": "strong work", "voted_at": 10 },
            { "expert_id": "p2", "expert_name": "Bo", "vote": null },
            { "expert_id": "p3", "expert_name": "Cy", "vote": "uphold_rejection", "voted_at": 11 },
        ]);
        let appeal = map(value);
        assert_eq!(appeal.votes.len(), 2);
        assert_eq!(appeal.votes[0].decision, AppealDecision::Overturn);
        assert_eq!(appeal.votes[1].decision, AppealDecision::Uphold);
        assert_eq!(appeal.votes[1].reasoning, "");
        assert_eq!(appeal.votes_overturn, 1);
        assert_eq!(appeal.votes_uphold, 1);
        assert_eq!(appeal.panel_size, 3);
        assert_eq!(appeal.panel.len(), 3);
    }

    #[test]
    fn default_panel_size() {
        let appeal = map(response("open"));
        assert!(appeal.panel.is_empty());
        assert_eq!(appeal.panel_size, 3);
    }

    #[test]
    fn bad_stake_and_incomplete_vote() {
        let mut value = response("open");
        value["stake_amount"] = json!("fifty");
        let parsed: AppealResponse = serde_json::from_value(value).unwrap();
        assert!(matches!(
            map_appeal_response(&parsed),
            Err(MappingError::InvalidStake { .. })
        ));

        let mut value = response("under_review");
        value["panel_members"] = json!([{ "expert_id": "p1", "vote": "approve_appeal" }]);
        let parsed: AppealResponse = serde_json::from_value(value).unwrap();
        assert_eq!(
            map_appeal_response(&parsed),
            Err(MappingError::IncompleteVote(ExpertId::new("p1").unwrap()))
        );
    }

    #[test]
    fn reputation_deltas_ignore_configured_params() {
        let params: ReviewParams = serde_json::from_value(json!({
            "required_commit_stake": "10",
            "commit_duration_secs": 60,
            "reveal_duration_secs": 60,
            "min_appeal_stake": "5",
            "default_panel_size": 5,
            "overturn_reputation_delta": 99,
            "upheld_reputation_delta": 0,
        }))
        .unwrap();

        let mut value = response("approved");
        value["resolved_at"] = json!(1_700_000_500u64);
        value["reviewers_reputation_change"] = json!(-2);
        let parsed: AppealResponse = serde_json::from_value(value).unwrap();
        let appeal = map_appeal_response_with(&parsed, &params).unwrap();
        assert_eq!(appeal.panel_size, 5);
        assert_eq!(
            appeal.outcome.unwrap().appealer_reputation_change,
            OVERTURN_REPUTATION_DELTA
        );

        let mut value = response("dismissed");
        value["resolved_at"] = json!(1_700_000_500u64);
        let parsed: AppealResponse = serde_json::from_value(value).unwrap();
        let appeal = map_appeal_response_with(&parsed, &params).unwrap();
        assert_eq!(
            appeal.outcome.unwrap().appealer_reputation_change,
            UPHELD_REPUTATION_DELTA
        );
    }

    #[test]
    fn fractional_stake() {
        let mut value = response("open");
        value["stake_amount"] = json!("62.5");
        assert_eq!(map(value).stake_amount, StakeAmount::new(62_500_000));
    }
}

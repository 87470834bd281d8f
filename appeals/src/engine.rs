//! Appeal lifecycle engine: filing, panel assignment, panel votes, resolution.

use crate::appeal::{
    Appeal, AppealDecision, AppealOutcome, AppealStatus, AppealVote, FileAppealRequest,
    OutcomeDecision,
};
use crate::error::AppealError;
use std::collections::HashSet;
use tracing::{debug, info};
use vetted_types::{AppealId, ExpertId, ReviewParams, Timestamp};

/// Drives appeals through `pending → reviewing → {upheld | overturned}`.
///
/// The engine holds no appeals itself; callers own the records and pass them
/// in. Every method validates before mutating, so a rejected call leaves the
/// appeal unchanged.
#[derive(Clone, Debug, Default)]
pub struct AppealEngine {
    params: ReviewParams,
}

impl AppealEngine {
    pub fn new(params: ReviewParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ReviewParams {
        &self.params
    }

    /// File an appeal against a rejection. The appeal starts `pending`.
    pub fn file(
        &self,
        id: AppealId,
        request: FileAppealRequest,
        now: Timestamp,
    ) -> Result<Appeal, AppealError> {
        if request.stake_amount < self.params.min_appeal_stake {
            return Err(AppealError::InsufficientStake {
                needed: self.params.min_appeal_stake,
                provided: request.stake_amount,
            });
        }
        let justification = request.justification.trim();
        if justification.is_empty() {
            return Err(AppealError::EmptyJustification);
        }

        info!(
            appeal = %id,
            application = %request.application_id,
            appealer = %request.appealer_expert_id,
            stake = %request.stake_amount,
            "appeal filed"
        );
        Ok(Appeal {
            id,
            application_id: request.application_id,
            guild_id: request.guild_id,
            appealer_expert_id: request.appealer_expert_id,
            justification: justification.to_string(),
            stake_amount: request.stake_amount,
            status: AppealStatus::Pending,
            panel: Vec::new(),
            panel_size: self.params.default_panel_size,
            votes: Vec::new(),
            votes_uphold: 0,
            votes_overturn: 0,
            outcome: None,
            created_at: now,
            resolved_at: None,
        })
    }

    /// Assign the arbitration panel and move the appeal to `reviewing`.
    pub fn assign_panel(&self, appeal: &mut Appeal, panel: Vec<ExpertId>) -> Result<(), AppealError> {
        require_status(appeal, AppealStatus::Pending, "assign a panel")?;
        if panel.is_empty() {
            return Err(AppealError::InvalidPanel("panel is empty".into()));
        }
        let mut seen = HashSet::new();
        for member in &panel {
            if !seen.insert(member) {
                return Err(AppealError::InvalidPanel(format!("{member} appears twice")));
            }
            if member == &appeal.appealer_expert_id {
                return Err(AppealError::InvalidPanel(format!(
                    "appealer {member} cannot sit on their own panel"
                )));
            }
        }

        appeal.panel_size = panel.len() as u32;
        appeal.panel = panel;
        appeal.status = AppealStatus::Reviewing;
        info!(appeal = %appeal.id, panel_size = appeal.panel_size, "appeal panel assigned");
        Ok(())
    }

    /// Record one panel member's ballot.
    pub fn cast_vote(&self, appeal: &mut Appeal, vote: AppealVote) -> Result<(), AppealError> {
        require_status(appeal, AppealStatus::Reviewing, "vote")?;
        if !appeal.is_panelist(&vote.expert_id) {
            return Err(AppealError::NotOnPanel(vote.expert_id));
        }
        if appeal.has_voted(&vote.expert_id) {
            return Err(AppealError::AlreadyVoted(vote.expert_id));
        }

        match vote.decision {
            AppealDecision::Uphold => appeal.votes_uphold += 1,
            AppealDecision::Overturn => appeal.votes_overturn += 1,
        }
        debug!(
            appeal = %appeal.id,
            panelist = %vote.expert_id,
            uphold = appeal.votes_uphold,
            overturn = appeal.votes_overturn,
            "appeal vote recorded"
        );
        appeal.votes.push(vote);
        Ok(())
    }

    /// Resolve the appeal with an externally decided outcome.
    ///
    /// An overturn must carry a negative reputation change for the original
    /// reviewers. The appeal is terminal afterwards.
    pub fn resolve(
        &self,
        appeal: &mut Appeal,
        decision: OutcomeDecision,
        reviewers_reputation_change: Option<i32>,
        now: Timestamp,
    ) -> Result<AppealOutcome, AppealError> {
        require_status(appeal, AppealStatus::Reviewing, "resolve")?;
        if decision == OutcomeDecision::Overturned
            && !reviewers_reputation_change.is_some_and(|c| c < 0)
        {
            return Err(AppealError::InvalidReviewerPenalty(reviewers_reputation_change));
        }

        let outcome =
            AppealOutcome::for_decision(decision, reviewers_reputation_change, now);
        appeal.status = decision.status();
        appeal.resolved_at = Some(now);
        appeal.outcome = Some(outcome.clone());
        info!(
            appeal = %appeal.id,
            status = %appeal.status,
            appealer_reputation = outcome.appealer_reputation_change,
            stake_returned = outcome.appealer_stake_returned,
            "appeal resolved"
        );
        Ok(outcome)
    }

    /// Resolve from the panel's ballots: overturn only on a strict majority
    /// of overturn votes; a tie upholds the rejection.
    pub fn resolve_by_majority(
        &self,
        appeal: &mut Appeal,
        reviewers_reputation_change: Option<i32>,
        now: Timestamp,
    ) -> Result<AppealOutcome, AppealError> {
        require_status(appeal, AppealStatus::Reviewing, "resolve")?;
        if appeal.votes.is_empty() {
            return Err(AppealError::NoMajority);
        }
        let decision = if appeal.votes_overturn > appeal.votes_uphold {
            OutcomeDecision::Overturned
        } else {
            OutcomeDecision::Upheld
        };
        self.resolve(appeal, decision, reviewers_reputation_change, now)
    }
}

fn require_status(
    appeal: &Appeal,
    expected: AppealStatus,
    operation: &'static str,
) -> Result<(), AppealError> {
    if appeal.status == expected {
        return Ok(());
    }
    if appeal.status.is_terminal() {
        return Err(AppealError::AlreadyResolved(appeal.id.clone()));
    }
    Err(AppealError::WrongStatus {
        operation,
        status: appeal.status,
    })
}

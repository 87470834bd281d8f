use crate::phase::ReviewPhase;
use thiserror::Error;
use vetted_types::{ApplicationId, ExpertId, StakeAmount};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VotingError {
    #[error("cannot {operation} during the {phase} phase")]
    PhaseViolation {
        operation: &'static str,
        phase: ReviewPhase,
    },

    #[error("expert {0} has already committed a vote for this application")]
    DuplicateCommitment(ExpertId),

    #[error("expert {0} has already revealed their vote")]
    AlreadyRevealed(ExpertId),

    #[error("expert {0} has already voted on this application")]
    DuplicateVote(ExpertId),

    #[error("score and nonce do not match the commitment of expert {0}; check your saved nonce")]
    HashMismatch(ExpertId),

    #[error("insufficient stake: needed {needed}, provided {provided}")]
    InsufficientStake {
        needed: StakeAmount,
        provided: StakeAmount,
    },

    #[error("score {0} is outside the range 0..=100")]
    InvalidScore(i64),

    #[error("expert {0} never committed a vote for this application")]
    NotCommitted(ExpertId),

    #[error("all {0} assigned reviewers have already voted")]
    ReviewerLimitReached(u32),

    #[error("invalid review schedule: {0}")]
    InvalidSchedule(String),

    #[error("no review round for application {0}")]
    UnknownApplication(ApplicationId),

    #[error("a review round for application {0} already exists")]
    RoundExists(ApplicationId),
}

impl VotingError {
    /// Whether the same caller can succeed by retrying with corrected input
    /// (before the relevant deadline).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::HashMismatch(_) | Self::InsufficientStake { .. } | Self::InvalidScore(_)
        )
    }
}

use crate::appeal::AppealStatus;
use thiserror::Error;
use vetted_types::{AppealId, ExpertId, StakeAmount};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppealError {
    #[error("insufficient appeal stake: needed {needed}, provided {provided}")]
    InsufficientStake {
        needed: StakeAmount,
        provided: StakeAmount,
    },

    #[error("an appeal needs a non-empty justification")]
    EmptyJustification,

    #[error("invalid panel: {0}")]
    InvalidPanel(String),

    #[error("cannot {operation} while the appeal is {status}")]
    WrongStatus {
        operation: &'static str,
        status: AppealStatus,
    },

    #[error("expert {0} is not on the appeal panel")]
    NotOnPanel(ExpertId),

    #[error("panel member {0} has already voted")]
    AlreadyVoted(ExpertId),

    #[error("overturning requires a negative reputation change for the original reviewers, got {0:?}")]
    InvalidReviewerPenalty(Option<i32>),

    #[error("appeal {0} is already resolved")]
    AlreadyResolved(AppealId),

    #[error("no panel votes have been cast")]
    NoMajority,
}

impl AppealError {
    /// Whether the same caller can succeed by retrying with corrected input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientStake { .. } | Self::EmptyJustification | Self::InvalidPanel(_)
        )
    }
}

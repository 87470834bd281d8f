use thiserror::Error;
use vetted_types::ExpertId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewardError {
    #[error("expert {0} appears more than once in the distribution")]
    DuplicateParticipant(ExpertId),

    #[error("arithmetic overflow")]
    Overflow,
}

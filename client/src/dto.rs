//! Request and response bodies exchanged with the review backend.

use serde::{Deserialize, Serialize};
use std::fmt;
use vetted_appeals::BackendVote;
use vetted_types::{CommitmentHash, ExpertId, GuildId, Score, StakeAmount};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentHashRequest {
    pub score: Score,
    pub nonce: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentHashResponse {
    pub commitment_hash: CommitmentHash,
}

/// `submitCommitment` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentSubmission {
    pub expert_id: ExpertId,
    pub commitment_hash: CommitmentHash,
    pub stake_amount: StakeAmount,
}

/// `revealVote` body. The score is sent as entered; range checks happen on
/// both sides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealSubmission {
    pub expert_id: ExpertId,
    pub score: i64,
    pub nonce: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppealVoteSubmission {
    pub expert_id: ExpertId,
    #[serde(default)]
    pub expert_name: String,
    pub vote: BackendVote,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: GuildId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Machine-readable rejection codes returned in backend error bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendErrorCode {
    PhaseViolation,
    DuplicateCommitment,
    AlreadyRevealed,
    HashMismatch,
    InsufficientStake,
    InvalidScore,
    NotCommitted,
    NotFound,
    #[serde(other)]
    Unknown,
}

impl BackendErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhaseViolation => "phase_violation",
            Self::DuplicateCommitment => "duplicate_commitment",
            Self::AlreadyRevealed => "already_revealed",
            Self::HashMismatch => "hash_mismatch",
            Self::InsufficientStake => "insufficient_stake",
            Self::InvalidScore => "invalid_score",
            Self::NotCommitted => "not_committed",
            Self::NotFound => "not_found",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::HashMismatch | Self::InsufficientStake | Self::InvalidScore
        )
    }
}

impl fmt::Display for BackendErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error body: `{"code": "...", "message": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: BackendErrorCode,
    #[serde(default)]
    pub message: String,
}

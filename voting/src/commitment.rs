//! Persisted vote commitments and tally records.

use serde::{Deserialize, Serialize};
use vetted_types::{ApplicationId, CommitmentHash, ExpertId, Score, StakeAmount, Timestamp};

/// One expert's commitment for one application.
///
/// The hash is fixed at commit time. The record is mutated exactly once, on a
/// successful reveal, and is never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCommitment {
    pub application_id: ApplicationId,
    pub expert_id: ExpertId,
    pub commitment_hash: CommitmentHash,
    pub stake_amount: StakeAmount,
    pub committed_at: Timestamp,
    /// Present only after a reveal that matched `commitment_hash`.
    pub revealed_score: Option<Score>,
    pub revealed_at: Option<Timestamp>,
}

impl VoteCommitment {
    pub fn is_revealed(&self) -> bool {
        self.revealed_score.is_some()
    }
}

/// A score that counts toward the final result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalliedVote {
    pub expert_id: ExpertId,
    pub score: Score,
}

/// Stake lost by an expert who committed but never revealed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forfeiture {
    pub expert_id: ExpertId,
    pub stake_amount: StakeAmount,
}

/// Aggregate view of a tally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TallySummary {
    pub votes: Vec<TalliedVote>,
    /// Mean of counted scores; `None` when nothing was counted.
    pub mean_score: Option<f64>,
    pub total_expected: u32,
}

impl TallySummary {
    pub fn from_votes(votes: Vec<TalliedVote>, total_expected: u32) -> Self {
        let mean_score = if votes.is_empty() {
            None
        } else {
            let sum: u32 = votes.iter().map(|v| u32::from(v.score.value())).sum();
            Some(f64::from(sum) / votes.len() as f64)
        };
        Self {
            votes,
            mean_score,
            total_expected,
        }
    }

    /// Counted votes as a fraction of assigned reviewers, in basis points.
    pub fn participation_bps(&self) -> u32 {
        if self.total_expected == 0 {
            return 0;
        }
        (self.votes.len() as u32 * 10_000) / self.total_expected
    }
}

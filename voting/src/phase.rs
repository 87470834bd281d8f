//! Review phases and the per-application phase snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;
use vetted_types::{ApplicationId, Timestamp};

/// Phase of an application's review. Phases only ever move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPhase {
    /// No secrecy: scores are submitted openly and counted immediately.
    Direct,
    /// Experts submit only commitment hashes.
    Commit,
    /// Experts disclose score and nonce; commitments are verified.
    Reveal,
    /// Terminal. Results are immutable.
    Finalized,
}

impl ReviewPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Commit => "commit",
            Self::Reveal => "reveal",
            Self::Finalized => "finalized",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl fmt::Display for ReviewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one application's commit-reveal progress.
///
/// Invariant: `reveal_count <= commit_count <= total_expected`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStatus {
    pub application_id: ApplicationId,
    pub phase: ReviewPhase,
    /// Absent only for direct reviews.
    pub commit_deadline: Option<Timestamp>,
    /// Absent only for direct reviews.
    pub reveal_deadline: Option<Timestamp>,
    pub commit_count: u32,
    pub reveal_count: u32,
    /// Openly submitted scores (direct reviews only).
    #[serde(default)]
    pub direct_vote_count: u32,
    /// Number of assigned reviewers.
    pub total_expected: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReviewPhase::Finalized).unwrap(),
            "\"finalized\""
        );
        let p: ReviewPhase = serde_json::from_str("\"reveal\"").unwrap();
        assert_eq!(p, ReviewPhase::Reveal);
    }

    #[test]
    fn only_finalized_is_terminal() {
        assert!(ReviewPhase::Finalized.is_terminal());
        assert!(!ReviewPhase::Direct.is_terminal());
        assert!(!ReviewPhase::Reveal.is_terminal());
    }
}

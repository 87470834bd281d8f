//! Per-application review round: the commit-reveal state machine.

use crate::commitment::{Forfeiture, TalliedVote, TallySummary, VoteCommitment};
use crate::error::VotingError;
use crate::phase::{PhaseStatus, ReviewPhase};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use vetted_crypto::verify_commitment;
use vetted_types::{
    ApplicationId, CommitmentHash, ExpertId, ReviewParams, Score, StakeAmount, Timestamp,
};

/// State of one application's review.
///
/// Every mutating method validates fully before touching state, so a failed
/// call leaves the round exactly as it was.
#[derive(Clone, Debug)]
pub struct ReviewRound {
    application_id: ApplicationId,
    phase: ReviewPhase,
    /// Set for rounds that started in `direct`; survives finalization.
    direct: bool,
    total_expected: u32,
    required_stake: StakeAmount,
    commit_deadline: Option<Timestamp>,
    reveal_deadline: Option<Timestamp>,
    /// Commitments in commit order.
    commitments: Vec<VoteCommitment>,
    index: HashMap<ExpertId, usize>,
    reveal_count: u32,
    direct_votes: Vec<TalliedVote>,
}

impl ReviewRound {
    /// A secret-ballot round that starts in `commit`.
    pub fn commit_reveal(
        application_id: ApplicationId,
        total_expected: u32,
        required_stake: StakeAmount,
        commit_deadline: Timestamp,
        reveal_deadline: Timestamp,
    ) -> Result<Self, VotingError> {
        if total_expected == 0 {
            return Err(VotingError::InvalidSchedule(
                "a review needs at least one assigned reviewer".into(),
            ));
        }
        if reveal_deadline <= commit_deadline {
            return Err(VotingError::InvalidSchedule(format!(
                "reveal deadline {reveal_deadline} must be after commit deadline {commit_deadline}"
            )));
        }
        Ok(Self {
            application_id,
            phase: ReviewPhase::Commit,
            direct: false,
            total_expected,
            required_stake,
            commit_deadline: Some(commit_deadline),
            reveal_deadline: Some(reveal_deadline),
            commitments: Vec::new(),
            index: HashMap::new(),
            reveal_count: 0,
            direct_votes: Vec::new(),
        })
    }

    /// A secret-ballot round with windows taken from `params`, opening at `opened_at`.
    pub fn from_params(
        application_id: ApplicationId,
        total_expected: u32,
        params: &ReviewParams,
        opened_at: Timestamp,
    ) -> Result<Self, VotingError> {
        let commit_deadline = opened_at.plus_secs(params.commit_duration_secs);
        let reveal_deadline = commit_deadline.plus_secs(params.reveal_duration_secs);
        Self::commit_reveal(
            application_id,
            total_expected,
            params.required_commit_stake,
            commit_deadline,
            reveal_deadline,
        )
    }

    /// An open round: scores are counted as soon as they are submitted.
    pub fn direct(application_id: ApplicationId, total_expected: u32) -> Result<Self, VotingError> {
        if total_expected == 0 {
            return Err(VotingError::InvalidSchedule(
                "a review needs at least one assigned reviewer".into(),
            ));
        }
        Ok(Self {
            application_id,
            phase: ReviewPhase::Direct,
            direct: true,
            total_expected,
            required_stake: StakeAmount::ZERO,
            commit_deadline: None,
            reveal_deadline: None,
            commitments: Vec::new(),
            index: HashMap::new(),
            reveal_count: 0,
            direct_votes: Vec::new(),
        })
    }

    pub fn application_id(&self) -> &ApplicationId {
        &self.application_id
    }

    pub fn current_phase(&self) -> ReviewPhase {
        self.phase
    }

    pub fn required_stake(&self) -> StakeAmount {
        self.required_stake
    }

    pub fn status(&self) -> PhaseStatus {
        PhaseStatus {
            application_id: self.application_id.clone(),
            phase: self.phase,
            commit_deadline: self.commit_deadline,
            reveal_deadline: self.reveal_deadline,
            commit_count: self.commitments.len() as u32,
            reveal_count: self.reveal_count,
            direct_vote_count: self.direct_votes.len() as u32,
            total_expected: self.total_expected,
        }
    }

    pub fn commitment(&self, expert: &ExpertId) -> Option<&VoteCommitment> {
        self.index.get(expert).map(|&i| &self.commitments[i])
    }

    pub fn commitments(&self) -> &[VoteCommitment] {
        &self.commitments
    }

    fn require_phase(&self, expected: ReviewPhase, operation: &'static str) -> Result<(), VotingError> {
        if self.phase != expected {
            return Err(VotingError::PhaseViolation {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    /// Record an expert's commitment hash and stake.
    pub fn record_commit(
        &mut self,
        expert: ExpertId,
        hash: CommitmentHash,
        stake: StakeAmount,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        self.require_phase(ReviewPhase::Commit, "commit")?;
        if self.index.contains_key(&expert) {
            return Err(VotingError::DuplicateCommitment(expert));
        }
        if stake < self.required_stake {
            return Err(VotingError::InsufficientStake {
                needed: self.required_stake,
                provided: stake,
            });
        }
        if self.commitments.len() as u32 >= self.total_expected {
            return Err(VotingError::ReviewerLimitReached(self.total_expected));
        }

        debug!(
            application = %self.application_id,
            expert = %expert,
            stake = %stake,
            "commitment recorded"
        );
        self.index.insert(expert.clone(), self.commitments.len());
        self.commitments.push(VoteCommitment {
            application_id: self.application_id.clone(),
            expert_id: expert,
            commitment_hash: hash,
            stake_amount: stake,
            committed_at: now,
            revealed_score: None,
            revealed_at: None,
        });
        Ok(())
    }

    /// Verify and record an expert's reveal.
    ///
    /// On `HashMismatch` the commitment stays unrevealed and the expert may try
    /// again. Once every assigned reviewer has revealed, the round finalizes.
    pub fn record_reveal(
        &mut self,
        expert: &ExpertId,
        score: i64,
        nonce: &str,
        now: Timestamp,
    ) -> Result<Score, VotingError> {
        self.require_phase(ReviewPhase::Reveal, "reveal")?;
        let score = Score::new(score).map_err(|_| VotingError::InvalidScore(score))?;
        let &i = self
            .index
            .get(expert)
            .ok_or_else(|| VotingError::NotCommitted(expert.clone()))?;
        let record = &mut self.commitments[i];
        if record.is_revealed() {
            return Err(VotingError::AlreadyRevealed(expert.clone()));
        }
        if !verify_commitment(&record.commitment_hash, score, nonce) {
            warn!(
                application = %self.application_id,
                expert = %expert,
                "reveal rejected: hash mismatch"
            );
            return Err(VotingError::HashMismatch(expert.clone()));
        }

        record.revealed_score = Some(score);
        record.revealed_at = Some(now);
        self.reveal_count += 1;
        debug!(
            application = %self.application_id,
            expert = %expert,
            reveals = self.reveal_count,
            "vote revealed"
        );

        if self.reveal_count == self.total_expected {
            self.phase = ReviewPhase::Finalized;
            info!(
                application = %self.application_id,
                "all reviewers revealed, round finalized"
            );
        }
        Ok(score)
    }

    /// Count an openly submitted score (direct rounds only).
    pub fn record_direct_vote(
        &mut self,
        expert: ExpertId,
        score: i64,
        _now: Timestamp,
    ) -> Result<Score, VotingError> {
        self.require_phase(ReviewPhase::Direct, "submit a direct vote")?;
        let score = Score::new(score).map_err(|_| VotingError::InvalidScore(score))?;
        if self.direct_votes.iter().any(|v| v.expert_id == expert) {
            return Err(VotingError::DuplicateVote(expert));
        }
        if self.direct_votes.len() as u32 >= self.total_expected {
            return Err(VotingError::ReviewerLimitReached(self.total_expected));
        }
        debug!(application = %self.application_id, expert = %expert, "direct vote counted");
        self.direct_votes.push(TalliedVote {
            expert_id: expert,
            score,
        });
        Ok(score)
    }

    /// Close the commit window and open reveals.
    pub fn open_reveal(&mut self) -> Result<(), VotingError> {
        self.require_phase(ReviewPhase::Commit, "open reveal")?;
        self.phase = ReviewPhase::Reveal;
        info!(
            application = %self.application_id,
            commits = self.commitments.len(),
            "reveal phase opened"
        );
        Ok(())
    }

    /// Freeze the round. Allowed from `reveal` and from `direct`.
    pub fn finalize(&mut self) -> Result<(), VotingError> {
        match self.phase {
            ReviewPhase::Reveal | ReviewPhase::Direct => {
                self.phase = ReviewPhase::Finalized;
                info!(
                    application = %self.application_id,
                    reveals = self.reveal_count,
                    unrevealed = self.commitments.len() as u32 - self.reveal_count,
                    "round finalized"
                );
                Ok(())
            }
            phase => Err(VotingError::PhaseViolation {
                operation: "finalize",
                phase,
            }),
        }
    }

    /// Apply any deadline-driven transitions due at `now` and return the resulting phase.
    pub fn advance(&mut self, now: Timestamp) -> ReviewPhase {
        if self.phase == ReviewPhase::Commit
            && self.commit_deadline.is_some_and(|d| d.has_passed(now))
        {
            self.phase = ReviewPhase::Reveal;
            info!(application = %self.application_id, "commit deadline passed, reveal phase opened");
        }
        if self.phase == ReviewPhase::Reveal
            && self.reveal_deadline.is_some_and(|d| d.has_passed(now))
        {
            self.phase = ReviewPhase::Finalized;
            info!(application = %self.application_id, "reveal deadline passed, round finalized");
        }
        self.phase
    }

    /// Scores that count: revealed scores in commit order once finalized, or
    /// direct votes (counted immediately) for direct rounds.
    pub fn tally(&self) -> Result<Vec<TalliedVote>, VotingError> {
        match self.phase {
            ReviewPhase::Direct => Ok(self.direct_votes.clone()),
            ReviewPhase::Finalized if self.direct => Ok(self.direct_votes.clone()),
            ReviewPhase::Finalized => Ok(self
                .commitments
                .iter()
                .filter_map(|c| {
                    c.revealed_score.map(|score| TalliedVote {
                        expert_id: c.expert_id.clone(),
                        score,
                    })
                })
                .collect()),
            phase => Err(VotingError::PhaseViolation {
                operation: "tally",
                phase,
            }),
        }
    }

    pub fn summary(&self) -> Result<TallySummary, VotingError> {
        Ok(TallySummary::from_votes(self.tally()?, self.total_expected))
    }

    /// Stakes lost by experts who committed but never revealed (finalized rounds only).
    pub fn forfeitures(&self) -> Result<Vec<Forfeiture>, VotingError> {
        self.require_phase(ReviewPhase::Finalized, "compute forfeitures")?;
        Ok(self
            .commitments
            .iter()
            .filter(|c| !c.is_revealed())
            .map(|c| Forfeiture {
                expert_id: c.expert_id.clone(),
                stake_amount: c.stake_amount,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vetted_crypto::commitment_hash;

    fn app() -> ApplicationId {
        ApplicationId::new("app-1").unwrap()
    }

    fn expert(name: &str) -> ExpertId {
        ExpertId::new(name).unwrap()
    }

    fn hash(score: i64, nonce: &str) -> CommitmentHash {
        commitment_hash(Score::new(score).unwrap(), nonce)
    }

    fn round(total: u32) -> ReviewRound {
        ReviewRound::commit_reveal(
            app(),
            total,
            StakeAmount::from_tokens(10),
            Timestamp::new(100),
            Timestamp::new(200),
        )
        .unwrap()
    }

    fn ten() -> StakeAmount {
        StakeAmount::from_tokens(10)
    }

    #[test]
    fn schedule_validation() {
        assert!(ReviewRound::commit_reveal(app(), 3, ten(), Timestamp::new(200), Timestamp::new(200)).is_err());
        assert!(ReviewRound::commit_reveal(app(), 0, ten(), Timestamp::new(1), Timestamp::new(2)).is_err());
        assert!(ReviewRound::direct(app(), 0).is_err());
    }

    #[test]
    fn from_params_derives_deadlines() {
        let params = ReviewParams::default();
        let r = ReviewRound::from_params(app(), 3, &params, Timestamp::new(1_000)).unwrap();
        let status = r.status();
        assert_eq!(status.commit_deadline, Some(Timestamp::new(1_000 + 48 * 3600)));
        assert_eq!(status.reveal_deadline, Some(Timestamp::new(1_000 + 72 * 3600)));
        assert_eq!(r.required_stake(), params.required_commit_stake);
    }

    #[test]
    fn commit_only_in_commit_phase() {
        let mut r = round(3);
        r.open_reveal().unwrap();
        let err = r
            .record_commit(expert("a"), hash(1, "n"), ten(), Timestamp::new(1))
            .unwrap_err();
        assert_eq!(
            err,
            VotingError::PhaseViolation {
                operation: "commit",
                phase: ReviewPhase::Reveal
            }
        );
    }

    #[test]
    fn duplicate_commit_rejected_and_hash_unchanged() {
        let mut r = round(3);
        r.record_commit(expert("a"), hash(80, "n1"), ten(), Timestamp::new(1)).unwrap();
        let err = r
            .record_commit(expert("a"), hash(20, "n2"), ten(), Timestamp::new(2))
            .unwrap_err();
        assert_eq!(err, VotingError::DuplicateCommitment(expert("a")));
        assert_eq!(r.commitment(&expert("a")).unwrap().commitment_hash, hash(80, "n1"));
        assert_eq!(r.status().commit_count, 1);
    }

    #[test]
    fn insufficient_stake_rejected() {
        let mut r = round(3);
        let err = r
            .record_commit(expert("a"), hash(1, "n"), StakeAmount::new(9_999_999), Timestamp::new(1))
            .unwrap_err();
        assert!(matches!(err, VotingError::InsufficientStake { .. }));
        assert_eq!(r.status().commit_count, 0);
    }

    #[test]
    fn commits_capped_at_total_expected() {
        let mut r = round(1);
        r.record_commit(expert("a"), hash(1, "n"), ten(), Timestamp::new(1)).unwrap();
        let err = r
            .record_commit(expert("b"), hash(1, "n"), ten(), Timestamp::new(1))
            .unwrap_err();
        assert_eq!(err, VotingError::ReviewerLimitReached(1));
    }

    #[test]
    fn reveal_errors() {
        let mut r = round(3);
        r.record_commit(expert("a"), hash(80, "nonceA"), ten(), Timestamp::new(1)).unwrap();

        assert!(matches!(
            r.record_reveal(&expert("a"), 80, "nonceA", Timestamp::new(2)),
            Err(VotingError::PhaseViolation { .. })
        ));

        r.open_reveal().unwrap();
        assert_eq!(
            r.record_reveal(&expert("a"), 101, "nonceA", Timestamp::new(150)),
            Err(VotingError::InvalidScore(101))
        );
        assert_eq!(
            r.record_reveal(&expert("zed"), 80, "nonceA", Timestamp::new(150)),
            Err(VotingError::NotCommitted(expert("zed")))
        );
        assert_eq!(
            r.record_reveal(&expert("a"), 80, "nonceX", Timestamp::new(150)),
            Err(VotingError::HashMismatch(expert("a")))
        );
        assert!(!r.commitment(&expert("a")).unwrap().is_revealed());

        // Retry with the right nonce succeeds.
        let score = r.record_reveal(&expert("a"), 80, "nonceA", Timestamp::new(160)).unwrap();
        assert_eq!(score.value(), 80);
        assert_eq!(
            r.record_reveal(&expert("a"), 80, "nonceA", Timestamp::new(161)),
            Err(VotingError::AlreadyRevealed(expert("a")))
        );
        let record = r.commitment(&expert("a")).unwrap();
        assert_eq!(record.revealed_at, Some(Timestamp::new(160)));
        assert_eq!(r.status().reveal_count, 1);
    }

    #[test]
    fn finalizes_when_everyone_revealed() {
        let mut r = round(2);
        r.record_commit(expert("a"), hash(10, "x"), ten(), Timestamp::new(1)).unwrap();
        r.record_commit(expert("b"), hash(20, "y"), ten(), Timestamp::new(1)).unwrap();
        r.open_reveal().unwrap();
        r.record_reveal(&expert("a"), 10, "x", Timestamp::new(150)).unwrap();
        assert_eq!(r.current_phase(), ReviewPhase::Reveal);
        r.record_reveal(&expert("b"), 20, "y", Timestamp::new(151)).unwrap();
        assert_eq!(r.current_phase(), ReviewPhase::Finalized);
        assert_eq!(r.tally().unwrap().len(), 2);
        assert!(r.forfeitures().unwrap().is_empty());
    }

    #[test]
    fn phases_never_move_backward_or_skip() {
        let mut r = round(3);
        assert!(r.finalize().is_err()); // commit → finalized skips reveal
        r.open_reveal().unwrap();
        assert!(r.open_reveal().is_err());
        r.finalize().unwrap();
        assert!(r.finalize().is_err());
        assert!(r.open_reveal().is_err());
        assert_eq!(r.advance(Timestamp::new(0)), ReviewPhase::Finalized);
    }

    #[test]
    fn advance_follows_deadlines() {
        let mut r = round(3);
        assert_eq!(r.advance(Timestamp::new(99)), ReviewPhase::Commit);
        assert_eq!(r.advance(Timestamp::new(100)), ReviewPhase::Reveal);
        assert_eq!(r.advance(Timestamp::new(199)), ReviewPhase::Reveal);
        assert_eq!(r.advance(Timestamp::new(200)), ReviewPhase::Finalized);

        let mut late = round(3);
        assert_eq!(late.advance(Timestamp::new(10_000)), ReviewPhase::Finalized);
    }

    #[test]
    fn tally_only_after_finalization() {
        let mut r = round(3);
        assert!(matches!(r.tally(), Err(VotingError::PhaseViolation { operation: "tally", .. })));
        r.open_reveal().unwrap();
        assert!(r.tally().is_err());
        r.finalize().unwrap();
        assert!(r.tally().unwrap().is_empty());
    }

    #[test]
    fn unrevealed_commitments_forfeit() {
        let mut r = round(3);
        r.record_commit(expert("a"), hash(80, "nonceA"), ten(), Timestamp::new(1)).unwrap();
        r.record_commit(expert("b"), hash(40, "nonceB"), StakeAmount::from_tokens(15), Timestamp::new(1))
            .unwrap();
        r.open_reveal().unwrap();
        r.record_reveal(&expert("a"), 80, "nonceA", Timestamp::new(150)).unwrap();
        assert!(r.forfeitures().is_err());
        r.finalize().unwrap();

        let forfeits = r.forfeitures().unwrap();
        assert_eq!(forfeits.len(), 1);
        assert_eq!(forfeits[0].expert_id, expert("b"));
        assert_eq!(forfeits[0].stake_amount, StakeAmount::from_tokens(15));
    }

    #[test]
    fn direct_round_counts_immediately() {
        let mut r = ReviewRound::direct(app(), 2).unwrap();
        assert_eq!(r.status().commit_deadline, None);
        r.record_direct_vote(expert("a"), 70, Timestamp::new(1)).unwrap();
        assert_eq!(r.tally().unwrap().len(), 1);
        assert_eq!(
            r.record_direct_vote(expert("a"), 75, Timestamp::new(2)),
            Err(VotingError::DuplicateVote(expert("a")))
        );
        assert!(matches!(
            r.record_commit(expert("b"), hash(1, "n"), ten(), Timestamp::new(1)),
            Err(VotingError::PhaseViolation { .. })
        ));
        r.record_direct_vote(expert("b"), 90, Timestamp::new(3)).unwrap();
        assert_eq!(r.status().direct_vote_count, 2);

        r.finalize().unwrap();
        let summary = r.summary().unwrap();
        assert_eq!(summary.mean_score, Some(80.0));
        assert!(r.forfeitures().unwrap().is_empty());
        assert!(r.record_direct_vote(expert("c"), 1, Timestamp::new(4)).is_err());
    }
}

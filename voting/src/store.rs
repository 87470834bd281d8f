//! Thread-safe store of review rounds keyed by application.
//!
//! Each round sits behind its own mutex, so every commit and reveal for an
//! application is serialized: of two racing commits by the same expert exactly
//! one succeeds and the other sees `DuplicateCommitment`; of two racing reveals
//! exactly one is recorded and the other sees `AlreadyRevealed`.

use crate::commitment::{Forfeiture, TalliedVote, TallySummary, VoteCommitment};
use crate::error::VotingError;
use crate::phase::{PhaseStatus, ReviewPhase};
use crate::round::ReviewRound;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use vetted_types::{ApplicationId, CommitmentHash, ExpertId, Score, StakeAmount, Timestamp};

#[derive(Default)]
pub struct VoteCommitmentStore {
    rounds: RwLock<HashMap<ApplicationId, Arc<Mutex<ReviewRound>>>>,
}

// Round methods validate before mutating, so a round behind a poisoned lock is
// still consistent and safe to keep using.
fn lock(round: &Mutex<ReviewRound>) -> MutexGuard<'_, ReviewRound> {
    round.lock().unwrap_or_else(|e| e.into_inner())
}

impl VoteCommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new round. Each application has at most one.
    pub fn open_round(&self, round: ReviewRound) -> Result<(), VotingError> {
        let mut rounds = self.rounds.write().unwrap_or_else(|e| e.into_inner());
        let id = round.application_id().clone();
        if rounds.contains_key(&id) {
            return Err(VotingError::RoundExists(id));
        }
        rounds.insert(id, Arc::new(Mutex::new(round)));
        Ok(())
    }

    fn round(&self, application: &ApplicationId) -> Result<Arc<Mutex<ReviewRound>>, VotingError> {
        self.rounds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(application)
            .cloned()
            .ok_or_else(|| VotingError::UnknownApplication(application.clone()))
    }

    fn with_round<T>(
        &self,
        application: &ApplicationId,
        f: impl FnOnce(&mut ReviewRound) -> Result<T, VotingError>,
    ) -> Result<T, VotingError> {
        let round = self.round(application)?;
        let mut guard = lock(&round);
        f(&mut guard)
    }

    pub fn application_ids(&self) -> Vec<ApplicationId> {
        self.rounds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    /// Persist a commitment. Requires `stake >= required stake` for the application.
    pub fn commit(
        &self,
        application: &ApplicationId,
        expert: ExpertId,
        hash: CommitmentHash,
        stake: StakeAmount,
        now: Timestamp,
    ) -> Result<(), VotingError> {
        self.with_round(application, |r| r.record_commit(expert, hash, stake, now))
    }

    /// Verify and persist a reveal.
    pub fn reveal(
        &self,
        application: &ApplicationId,
        expert: &ExpertId,
        score: i64,
        nonce: &str,
        now: Timestamp,
    ) -> Result<Score, VotingError> {
        self.with_round(application, |r| r.record_reveal(expert, score, nonce, now))
    }

    pub fn submit_direct(
        &self,
        application: &ApplicationId,
        expert: ExpertId,
        score: i64,
        now: Timestamp,
    ) -> Result<Score, VotingError> {
        self.with_round(application, |r| r.record_direct_vote(expert, score, now))
    }

    pub fn phase_status(&self, application: &ApplicationId) -> Result<PhaseStatus, VotingError> {
        self.with_round(application, |r| Ok(r.status()))
    }

    pub fn commitment(
        &self,
        application: &ApplicationId,
        expert: &ExpertId,
    ) -> Result<Option<VoteCommitment>, VotingError> {
        self.with_round(application, |r| Ok(r.commitment(expert).cloned()))
    }

    pub fn open_reveal(&self, application: &ApplicationId) -> Result<(), VotingError> {
        self.with_round(application, |r| r.open_reveal())
    }

    pub fn finalize(&self, application: &ApplicationId) -> Result<(), VotingError> {
        self.with_round(application, |r| r.finalize())
    }

    pub fn advance(
        &self,
        application: &ApplicationId,
        now: Timestamp,
    ) -> Result<ReviewPhase, VotingError> {
        self.with_round(application, |r| Ok(r.advance(now)))
    }

    /// Apply deadline transitions to every round; returns the rounds whose phase changed.
    pub fn advance_all(&self, now: Timestamp) -> Vec<(ApplicationId, ReviewPhase)> {
        let rounds: Vec<_> = self
            .rounds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        rounds
            .iter()
            .filter_map(|round| {
                let mut guard = lock(round);
                let before = guard.current_phase();
                let after = guard.advance(now);
                (before != after).then(|| (guard.application_id().clone(), after))
            })
            .collect()
    }

    pub fn tally(&self, application: &ApplicationId) -> Result<Vec<TalliedVote>, VotingError> {
        self.with_round(application, |r| r.tally())
    }

    pub fn summary(&self, application: &ApplicationId) -> Result<TallySummary, VotingError> {
        self.with_round(application, |r| r.summary())
    }

    pub fn forfeitures(&self, application: &ApplicationId) -> Result<Vec<Forfeiture>, VotingError> {
        self.with_round(application, |r| r.forfeitures())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str) -> ApplicationId {
        ApplicationId::new(id).unwrap()
    }

    fn round(id: &str) -> ReviewRound {
        ReviewRound::commit_reveal(
            app(id),
            3,
            StakeAmount::from_tokens(10),
            Timestamp::new(100),
            Timestamp::new(200),
        )
        .unwrap()
    }

    #[test]
    fn unknown_application() {
        let store = VoteCommitmentStore::new();
        assert_eq!(
            store.phase_status(&app("nope")),
            Err(VotingError::UnknownApplication(app("nope")))
        );
    }

    #[test]
    fn one_round_per_application() {
        let store = VoteCommitmentStore::new();
        store.open_round(round("a")).unwrap();
        assert_eq!(
            store.open_round(round("a")),
            Err(VotingError::RoundExists(app("a")))
        );
        assert_eq!(store.application_ids(), vec![app("a")]);
    }

    #[test]
    fn advance_all_reports_changes_only() {
        let store = VoteCommitmentStore::new();
        store.open_round(round("a")).unwrap();
        store
            .open_round(
                ReviewRound::commit_reveal(
                    app("b"),
                    3,
                    StakeAmount::ZERO,
                    Timestamp::new(500),
                    Timestamp::new(600),
                )
                .unwrap(),
            )
            .unwrap();

        let changed = store.advance_all(Timestamp::new(150));
        assert_eq!(changed, vec![(app("a"), ReviewPhase::Reveal)]);
        assert!(store.advance_all(Timestamp::new(150)).is_empty());
        assert_eq!(store.advance(&app("b"), Timestamp::new(700)).unwrap(), ReviewPhase::Finalized);
    }
}

//! A reviewer's commit and reveal flow against the backend.
//!
//! Commit: validate the score, draw a nonce, hash locally and cross-check the
//! backend's hash, cache `(score, nonce)` so the same client can fill in the
//! reveal, then submit. Reveal: take the cached values (or explicit ones), send
//! them, and clear the cache entry once the backend accepts.

use crate::api::ReviewApi;
use crate::dto::{CommitmentSubmission, RevealSubmission};
use crate::error::ClientError;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};
use vetted_crypto::{commitment_hash, Nonce, NonceSource};
use vetted_types::{ApplicationId, CommitmentHash, ExpertId, Score, StakeAmount, Timestamp};
use vetted_voting::{CachedVote, PhaseStatus, RevealCache, VotingError};

/// Result of a successful commit. Keep the nonce: without it the vote cannot
/// be revealed if the local cache is lost.
#[derive(Clone, Debug)]
pub struct CommitReceipt {
    pub application_id: ApplicationId,
    pub commitment_hash: CommitmentHash,
    pub score: Score,
    pub nonce: Nonce,
    pub committed_at: Timestamp,
    /// Whether `(score, nonce)` made it into the local reveal cache.
    pub cached: bool,
}

/// Explicit reveal values typed in by the reviewer.
#[derive(Clone, Debug)]
pub struct ManualReveal {
    pub score: i64,
    pub nonce: String,
}

pub struct ReviewerSession<A, N> {
    api: Arc<A>,
    nonces: N,
    expert: ExpertId,
    cache: Mutex<RevealCache>,
}

impl<A: ReviewApi, N: NonceSource> ReviewerSession<A, N> {
    pub fn new(api: Arc<A>, nonces: N, expert: ExpertId, cache: RevealCache) -> Self {
        Self {
            api,
            nonces,
            expert,
            cache: Mutex::new(cache),
        }
    }

    pub fn expert(&self) -> &ExpertId {
        &self.expert
    }

    fn cache(&self) -> MutexGuard<'_, RevealCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn cached_vote(&self, application: &ApplicationId) -> Option<CachedVote> {
        self.cache().recall(application, &self.expert).cloned()
    }

    pub async fn phase(&self, application: &ApplicationId) -> Result<PhaseStatus, ClientError> {
        self.api.get_phase_status(application).await
    }

    /// Commit a score for `application` with `stake` behind it.
    ///
    /// The `(score, nonce)` pair is cached before the commitment is sent, so
    /// an accepted commitment whose acknowledgement is lost stays revealable.
    /// A definite rejection drops the pair again; an unconfirmed send keeps it
    /// and returns [`ClientError::CommitUnconfirmed`]. Retrying with the same
    /// score reuses the cached nonce, so the retry carries the same hash.
    pub async fn commit_vote(
        &self,
        application: &ApplicationId,
        score: i64,
        stake: StakeAmount,
        now: Timestamp,
    ) -> Result<CommitReceipt, ClientError> {
        let score = Score::new(score).map_err(|_| VotingError::InvalidScore(score))?;
        let pending = self.cached_vote(application);
        let fresh_entry = pending.is_none();
        let retrying = pending.as_ref().is_some_and(|p| p.score == score);
        let nonce = match pending {
            Some(p) if retrying => p.nonce,
            _ => self.nonces.generate()?,
        };

        let local = commitment_hash(score, nonce.as_str());
        let remote = self.api.generate_commitment_hash(score, nonce.as_str()).await?;
        if local != remote {
            return Err(ClientError::HashDisagreement { local, remote });
        }

        let vote = CachedVote {
            score,
            nonce: nonce.clone(),
            committed_at: now,
        };
        // An entry for a different score may belong to an accepted commitment;
        // it is only replaced once this one is confirmed.
        let mut cached = retrying || (fresh_entry && self.cache_vote(application, vote.clone()));

        let submitted = self
            .api
            .submit_commitment(
                application,
                &CommitmentSubmission {
                    expert_id: self.expert.clone(),
                    commitment_hash: local,
                    stake_amount: stake,
                },
            )
            .await;

        if let Err(e) = submitted {
            if e.outcome_unknown() {
                warn!(application = %application, cached, error = %e, "commitment not confirmed");
                return Err(ClientError::CommitUnconfirmed {
                    application: application.clone(),
                    score,
                    nonce,
                    cached,
                    reason: e.to_string(),
                });
            }
            if fresh_entry {
                if let Err(ce) = self.cache().forget(application, &self.expert) {
                    warn!(application = %application, error = %ce, "failed to drop rejected vote from cache");
                }
            }
            return Err(e);
        }

        if !retrying && !fresh_entry {
            cached = self.cache_vote(application, vote);
        }

        info!(application = %application, expert = %self.expert, hash = %local, "vote committed");
        Ok(CommitReceipt {
            application_id: application.clone(),
            commitment_hash: local,
            score,
            nonce,
            committed_at: now,
            cached,
        })
    }

    fn cache_vote(&self, application: &ApplicationId, vote: CachedVote) -> bool {
        match self
            .cache()
            .remember(application.clone(), self.expert.clone(), vote)
        {
            Ok(()) => true,
            Err(e) => {
                warn!(application = %application, error = %e, "vote not cached; keep the nonce");
                false
            }
        }
    }

    /// Reveal a committed vote, from the cache unless `manual` values are given.
    ///
    /// A [`ClientError::HashMismatch`] leaves the cache untouched so the
    /// reviewer can retry.
    pub async fn reveal_vote(
        &self,
        application: &ApplicationId,
        manual: Option<ManualReveal>,
        comment: Option<String>,
    ) -> Result<Score, ClientError> {
        let (score, nonce) = match manual {
            Some(m) => (m.score, m.nonce),
            None => {
                let cached = self
                    .cached_vote(application)
                    .ok_or(ClientError::NothingCached)?;
                (i64::from(cached.score.value()), cached.nonce.as_str().to_string())
            }
        };
        let checked = Score::new(score).map_err(|_| VotingError::InvalidScore(score))?;

        self.api
            .reveal_vote(
                application,
                &RevealSubmission {
                    expert_id: self.expert.clone(),
                    score,
                    nonce,
                    comment,
                },
            )
            .await?;

        if let Err(e) = self.cache().forget(application, &self.expert) {
            warn!(application = %application, error = %e, "failed to clear revealed vote from cache");
        }
        info!(application = %application, expert = %self.expert, "vote revealed");
        Ok(checked)
    }
}

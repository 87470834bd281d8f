//! Nullable review backend: the full [`ReviewApi`] in memory.
//!
//! Backed by the real [`VoteCommitmentStore`] and [`AppealEngine`], so tests
//! exercise the same rules a live backend enforces. Extra controls let tests
//! open rounds, drive phases, assign panels, take the backend offline, lose
//! commit acknowledgements and count requests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;
use vetted_appeals::{
    check_eligibility, Appeal, AppealEngine, AppealVote, ApplicationDecision, Eligibility,
    EligibilityContext, FileAppealRequest,
};
use vetted_client::{
    AppealVoteSubmission, BackendErrorCode, ClientError, CommitmentSubmission, Guild, ReviewApi,
    RevealSubmission,
};
use vetted_crypto::commitment_hash;
use vetted_types::{
    AppealId, ApplicationId, CommitmentHash, ExpertId, GuildId, ReviewParams, Score, StakeAmount,
};
use vetted_voting::{PhaseStatus, ReviewPhase, ReviewRound, TalliedVote, VoteCommitmentStore, VotingError};

use crate::clock::NullClock;

/// What the backend knows about an application for eligibility checks.
#[derive(Clone, Debug)]
pub struct ApplicationRecord {
    pub candidate: ExpertId,
    pub sponsor: Option<ExpertId>,
    pub decision: ApplicationDecision,
}

#[derive(Default)]
struct AppealBook {
    appeals: HashMap<AppealId, Appeal>,
    next_id: u64,
}

pub struct NullReviewBackend {
    clock: NullClock,
    votes: VoteCommitmentStore,
    engine: AppealEngine,
    book: Mutex<AppealBook>,
    applications: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
    balances: Mutex<HashMap<ExpertId, StakeAmount>>,
    guilds: Mutex<Vec<Guild>>,
    offline: AtomicBool,
    corrupt_hashes: AtomicBool,
    drop_commit_acks: AtomicBool,
    guild_fetches: AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl NullReviewBackend {
    pub fn new(initial_secs: u64) -> Self {
        Self::with_params(initial_secs, ReviewParams::default())
    }

    pub fn with_params(initial_secs: u64, params: ReviewParams) -> Self {
        Self {
            clock: NullClock::new(initial_secs),
            votes: VoteCommitmentStore::new(),
            engine: AppealEngine::new(params),
            book: Mutex::new(AppealBook::default()),
            applications: Mutex::new(HashMap::new()),
            balances: Mutex::new(HashMap::new()),
            guilds: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            corrupt_hashes: AtomicBool::new(false),
            drop_commit_acks: AtomicBool::new(false),
            guild_fetches: AtomicUsize::new(0),
        }
    }

    pub fn clock(&self) -> &NullClock {
        &self.clock
    }

    pub fn votes(&self) -> &VoteCommitmentStore {
        &self.votes
    }

    // ── Test controls ──────────────────────────────────────────────────

    /// Open a commit-reveal round using the backend's review parameters.
    pub fn open_review(&self, application: &ApplicationId, reviewers: u32) -> Result<(), VotingError> {
        self.votes.open_round(ReviewRound::from_params(
            application.clone(),
            reviewers,
            self.engine.params(),
            self.clock.now(),
        )?)
    }

    pub fn open_round(&self, round: ReviewRound) -> Result<(), VotingError> {
        self.votes.open_round(round)
    }

    /// Apply deadline transitions at the current clock time.
    pub fn advance(&self, application: &ApplicationId) -> Result<ReviewPhase, VotingError> {
        self.votes.advance(application, self.clock.now())
    }

    pub fn tally(&self, application: &ApplicationId) -> Result<Vec<TalliedVote>, VotingError> {
        self.votes.tally(application)
    }

    pub fn register_application(&self, application: ApplicationId, record: ApplicationRecord) {
        lock(&self.applications).insert(application, record);
    }

    pub fn set_balance(&self, expert: ExpertId, stake: StakeAmount) {
        lock(&self.balances).insert(expert, stake);
    }

    pub fn add_guild(&self, guild: Guild) {
        lock(&self.guilds).push(guild);
    }

    pub fn assign_panel(&self, appeal: &AppealId, panel: Vec<ExpertId>) -> Result<(), ClientError> {
        let mut book = lock(&self.book);
        let appeal = find_mut(&mut book, appeal)?;
        Ok(self.engine.assign_panel(appeal, panel)?)
    }

    pub fn resolve_by_majority(
        &self,
        appeal: &AppealId,
        reviewers_reputation_change: Option<i32>,
    ) -> Result<Appeal, ClientError> {
        let mut book = lock(&self.book);
        let appeal = find_mut(&mut book, appeal)?;
        self.engine
            .resolve_by_majority(appeal, reviewers_reputation_change, self.clock.now())?;
        Ok(appeal.clone())
    }

    /// While offline every request fails with `Unreachable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make `generate_commitment_hash` return a wrong hash.
    pub fn corrupt_hashes(&self, corrupt: bool) {
        self.corrupt_hashes.store(corrupt, Ordering::SeqCst);
    }

    /// Accept commitments but answer `Unreachable`, as when the response is lost.
    pub fn drop_commit_acks(&self, drop: bool) {
        self.drop_commit_acks.store(drop, Ordering::SeqCst);
    }

    /// How many times `list_guilds` was served.
    pub fn guild_fetches(&self) -> usize {
        self.guild_fetches.load(Ordering::SeqCst)
    }

    fn reachable(&self) -> Result<(), ClientError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::Unreachable("null backend is offline".into()));
        }
        Ok(())
    }
}

fn find_mut<'a>(book: &'a mut AppealBook, id: &AppealId) -> Result<&'a mut Appeal, ClientError> {
    book.appeals
        .get_mut(id)
        .ok_or_else(|| ClientError::NotFound(format!("appeal {id}")))
}

#[async_trait]
impl ReviewApi for NullReviewBackend {
    async fn generate_commitment_hash(
        &self,
        score: Score,
        nonce: &str,
    ) -> Result<CommitmentHash, ClientError> {
        self.reachable()?;
        if self.corrupt_hashes.load(Ordering::SeqCst) {
            return Ok(CommitmentHash::new([0; 32]));
        }
        Ok(commitment_hash(score, nonce))
    }

    async fn submit_commitment(
        &self,
        application: &ApplicationId,
        commitment: &CommitmentSubmission,
    ) -> Result<(), ClientError> {
        self.reachable()?;
        self.votes.commit(
            application,
            commitment.expert_id.clone(),
            commitment.commitment_hash,
            commitment.stake_amount,
            self.clock.now(),
        )?;
        if self.drop_commit_acks.load(Ordering::SeqCst) {
            debug!(application = %application, "commitment stored, acknowledgement dropped");
            return Err(ClientError::Unreachable("request timed out".into()));
        }
        Ok(())
    }

    async fn reveal_vote(
        &self,
        application: &ApplicationId,
        reveal: &RevealSubmission,
    ) -> Result<(), ClientError> {
        self.reachable()?;
        self.votes.reveal(
            application,
            &reveal.expert_id,
            reveal.score,
            &reveal.nonce,
            self.clock.now(),
        )?;
        Ok(())
    }

    async fn get_phase_status(
        &self,
        application: &ApplicationId,
    ) -> Result<PhaseStatus, ClientError> {
        self.reachable()?;
        Ok(self.votes.phase_status(application)?)
    }

    async fn file_appeal(&self, request: &FileAppealRequest) -> Result<Appeal, ClientError> {
        self.reachable()?;
        let mut book = lock(&self.book);
        let open = book
            .appeals
            .values()
            .any(|a| a.application_id == request.application_id && !a.is_resolved());
        if open {
            return Err(ClientError::Rejected {
                code: BackendErrorCode::Unknown,
                message: format!("application {} already has an open appeal", request.application_id),
            });
        }
        book.next_id += 1;
        let id = AppealId::new(format!("appeal-{}", book.next_id))
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let appeal = self.engine.file(id.clone(), request.clone(), self.clock.now())?;
        debug!(appeal = %id, "null backend stored appeal");
        book.appeals.insert(id, appeal.clone());
        Ok(appeal)
    }

    async fn get_appeal_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Appeal>, ClientError> {
        self.reachable()?;
        let book = lock(&self.book);
        // Latest appeal wins when an application was appealed more than once.
        Ok(book
            .appeals
            .values()
            .filter(|a| &a.application_id == application)
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    async fn get_appeal(&self, appeal: &AppealId) -> Result<Appeal, ClientError> {
        self.reachable()?;
        lock(&self.book)
            .appeals
            .get(appeal)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("appeal {appeal}")))
    }

    async fn get_guild_appeals(&self, guild: &GuildId) -> Result<Vec<Appeal>, ClientError> {
        self.reachable()?;
        let mut appeals: Vec<Appeal> = lock(&self.book)
            .appeals
            .values()
            .filter(|a| &a.guild_id == guild)
            .cloned()
            .collect();
        appeals.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(appeals)
    }

    async fn vote_on_appeal(
        &self,
        appeal: &AppealId,
        vote: &AppealVoteSubmission,
    ) -> Result<Appeal, ClientError> {
        self.reachable()?;
        let mut book = lock(&self.book);
        let record = find_mut(&mut book, appeal)?;
        self.engine.cast_vote(
            record,
            AppealVote {
                expert_id: vote.expert_id.clone(),
                expert_name: vote.expert_name.clone(),
                decision: vote.vote.decision(),
                reasoning: vote.reasoning.clone(),
                voted_at: self.clock.now(),
            },
        )?;
        Ok(record.clone())
    }

    async fn check_appeal_eligibility(
        &self,
        application: &ApplicationId,
        expert: &ExpertId,
    ) -> Result<Eligibility, ClientError> {
        self.reachable()?;
        let record = lock(&self.applications)
            .get(application)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("application {application}")))?;
        let has_open_appeal = lock(&self.book)
            .appeals
            .values()
            .any(|a| &a.application_id == application && !a.is_resolved());
        let available_stake = lock(&self.balances)
            .get(expert)
            .copied()
            .unwrap_or(StakeAmount::ZERO);
        Ok(check_eligibility(
            &EligibilityContext {
                decision: record.decision,
                has_open_appeal,
                appealer: expert.clone(),
                candidate: record.candidate,
                sponsor: record.sponsor,
                available_stake,
            },
            self.engine.params(),
        ))
    }

    async fn list_guilds(&self) -> Result<Vec<Guild>, ClientError> {
        self.reachable()?;
        self.guild_fetches.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent callers really overlap with this fetch.
        tokio::task::yield_now().await;
        Ok(lock(&self.guilds).clone())
    }
}

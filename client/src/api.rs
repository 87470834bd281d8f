//! The review backend as seen from this core.

use crate::dto::{AppealVoteSubmission, CommitmentSubmission, Guild, RevealSubmission};
use crate::error::ClientError;
use async_trait::async_trait;
use vetted_appeals::{Appeal, Eligibility, FileAppealRequest};
use vetted_types::{AppealId, ApplicationId, CommitmentHash, ExpertId, GuildId, Score};
use vetted_voting::PhaseStatus;

/// Operations the review backend provides.
///
/// Implemented over HTTP by [`crate::HttpReviewClient`] and in memory by the
/// nullable backend used in tests.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Remote counterpart of `vetted_crypto::commitment_hash`.
    async fn generate_commitment_hash(
        &self,
        score: Score,
        nonce: &str,
    ) -> Result<CommitmentHash, ClientError>;

    async fn submit_commitment(
        &self,
        application: &ApplicationId,
        commitment: &CommitmentSubmission,
    ) -> Result<(), ClientError>;

    /// Fails with [`ClientError::HashMismatch`] when score and nonce do not
    /// match the stored commitment.
    async fn reveal_vote(
        &self,
        application: &ApplicationId,
        reveal: &RevealSubmission,
    ) -> Result<(), ClientError>;

    async fn get_phase_status(&self, application: &ApplicationId)
        -> Result<PhaseStatus, ClientError>;

    async fn file_appeal(&self, request: &FileAppealRequest) -> Result<Appeal, ClientError>;

    /// `None` when no appeal was filed for the application.
    async fn get_appeal_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Appeal>, ClientError>;

    async fn get_appeal(&self, appeal: &AppealId) -> Result<Appeal, ClientError>;

    async fn get_guild_appeals(&self, guild: &GuildId) -> Result<Vec<Appeal>, ClientError>;

    async fn vote_on_appeal(
        &self,
        appeal: &AppealId,
        vote: &AppealVoteSubmission,
    ) -> Result<Appeal, ClientError>;

    async fn check_appeal_eligibility(
        &self,
        application: &ApplicationId,
        expert: &ExpertId,
    ) -> Result<Eligibility, ClientError>;

    async fn list_guilds(&self) -> Result<Vec<Guild>, ClientError>;
}

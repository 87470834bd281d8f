//! HTTP implementation of [`ReviewApi`] against the review backend.

use crate::api::ReviewApi;
use crate::config::ClientConfig;
use crate::dto::{
    AppealVoteSubmission, BackendErrorCode, CommitmentHashRequest, CommitmentHashResponse,
    CommitmentSubmission, ErrorBody, Guild, RevealSubmission,
};
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use vetted_appeals::{map_appeal_response, Appeal, AppealResponse, Eligibility, FileAppealRequest};
use vetted_types::{AppealId, ApplicationId, CommitmentHash, ExpertId, GuildId, Score};
use vetted_voting::PhaseStatus;

/// Default timeout for backend requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest error body echoed back in [`ClientError::RequestFailed`].
const MAX_ERROR_BODY: usize = 256;

/// Client for the review backend's REST API.
///
/// Timeouts and connection failures surface as the retryable
/// [`ClientError::Unreachable`]; they never imply a phase change.
pub struct HttpReviewClient {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpReviewClient {
    /// Create a client with default timeouts.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeouts(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::with_timeouts(
            &config.backend_url,
            config.request_timeout(),
            config.connect_timeout(),
        )
    }

    pub fn with_timeouts(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode a JSON body. `revealing` names the expert
    /// whose reveal this is, so a hash mismatch can be reported for them.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        revealing: Option<&ExpertId>,
    ) -> Result<T, ClientError> {
        let response = self.execute(request, revealing).await?;
        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("failed to decode response: {e}")))
    }

    async fn send_empty(
        &self,
        request: RequestBuilder,
        revealing: Option<&ExpertId>,
    ) -> Result<(), ClientError> {
        self.execute(request, revealing).await.map(|_| ())
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        revealing: Option<&ExpertId>,
    ) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "backend response");
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.map_err(transport_error)?;
        Err(classify_rejection(status, &body, revealing))
    }
}

fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        warn!(error = %e, "review backend timed out");
        ClientError::Unreachable(format!("request timed out: {e}"))
    } else if e.is_connect() {
        warn!(error = %e, "review backend connection failed");
        ClientError::Unreachable(format!("connection failed: {e}"))
    } else if e.is_body() || e.is_decode() {
        warn!(error = %e, "review backend response cut short");
        ClientError::Unreachable(format!("response interrupted: {e}"))
    } else {
        ClientError::RequestFailed {
            status: 0,
            message: e.to_string(),
        }
    }
}

/// Turn a non-success response into a typed error.
fn classify_rejection(status: StatusCode, body: &str, revealing: Option<&ExpertId>) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => match (err.code, revealing) {
            (BackendErrorCode::HashMismatch, Some(expert)) => {
                ClientError::HashMismatch(expert.clone())
            }
            (BackendErrorCode::NotFound, _) => ClientError::NotFound(err.message),
            (_, _) if status == StatusCode::NOT_FOUND => ClientError::NotFound(err.message),
            (code, _) => ClientError::Rejected {
                code,
                message: err.message,
            },
        },
        Err(_) if status == StatusCode::NOT_FOUND => ClientError::NotFound(body.to_string()),
        Err(_) => ClientError::RequestFailed {
            status: status.as_u16(),
            message: body.chars().take(MAX_ERROR_BODY).collect(),
        },
    }
}

#[async_trait]
impl ReviewApi for HttpReviewClient {
    async fn generate_commitment_hash(
        &self,
        score: Score,
        nonce: &str,
    ) -> Result<CommitmentHash, ClientError> {
        let body = CommitmentHashRequest {
            score,
            nonce: nonce.to_string(),
        };
        let response: CommitmentHashResponse = self
            .send(self.http_client.post(self.url("commitments/hash")).json(&body), None)
            .await?;
        Ok(response.commitment_hash)
    }

    async fn submit_commitment(
        &self,
        application: &ApplicationId,
        commitment: &CommitmentSubmission,
    ) -> Result<(), ClientError> {
        let url = self.url(&format!("applications/{application}/commitments"));
        self.send_empty(self.http_client.post(url).json(commitment), None)
            .await
    }

    async fn reveal_vote(
        &self,
        application: &ApplicationId,
        reveal: &RevealSubmission,
    ) -> Result<(), ClientError> {
        let url = self.url(&format!("applications/{application}/reveal"));
        self.send_empty(self.http_client.post(url).json(reveal), Some(&reveal.expert_id))
            .await
    }

    async fn get_phase_status(
        &self,
        application: &ApplicationId,
    ) -> Result<PhaseStatus, ClientError> {
        let url = self.url(&format!("applications/{application}/phase"));
        self.send(self.http_client.get(url), None).await
    }

    async fn file_appeal(&self, request: &FileAppealRequest) -> Result<Appeal, ClientError> {
        let response: AppealResponse = self
            .send(self.http_client.post(self.url("appeals")).json(request), None)
            .await?;
        Ok(map_appeal_response(&response)?)
    }

    async fn get_appeal_by_application(
        &self,
        application: &ApplicationId,
    ) -> Result<Option<Appeal>, ClientError> {
        let url = self.url(&format!("applications/{application}/appeal"));
        match self.send::<AppealResponse>(self.http_client.get(url), None).await {
            Ok(response) => Ok(Some(map_appeal_response(&response)?)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_appeal(&self, appeal: &AppealId) -> Result<Appeal, ClientError> {
        let url = self.url(&format!("appeals/{appeal}"));
        let response: AppealResponse = self.send(self.http_client.get(url), None).await?;
        Ok(map_appeal_response(&response)?)
    }

    async fn get_guild_appeals(&self, guild: &GuildId) -> Result<Vec<Appeal>, ClientError> {
        let url = self.url(&format!("guilds/{guild}/appeals"));
        let responses: Vec<AppealResponse> = self.send(self.http_client.get(url), None).await?;
        responses
            .iter()
            .map(|r| map_appeal_response(r).map_err(ClientError::from))
            .collect()
    }

    async fn vote_on_appeal(
        &self,
        appeal: &AppealId,
        vote: &AppealVoteSubmission,
    ) -> Result<Appeal, ClientError> {
        let url = self.url(&format!("appeals/{appeal}/votes"));
        let response: AppealResponse = self.send(self.http_client.post(url).json(vote), None).await?;
        Ok(map_appeal_response(&response)?)
    }

    async fn check_appeal_eligibility(
        &self,
        application: &ApplicationId,
        expert: &ExpertId,
    ) -> Result<Eligibility, ClientError> {
        let url = self.url(&format!("applications/{application}/appeal-eligibility"));
        let request = self
            .http_client
            .get(url)
            .query(&[("expert_id", expert.as_str())]);
        self.send(request, None).await
    }

    async fn list_guilds(&self) -> Result<Vec<Guild>, ClientError> {
        self.send(self.http_client.get(self.url("guilds")), None).await
    }
}

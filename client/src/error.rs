use crate::dto::BackendErrorCode;
use thiserror::Error;
use vetted_appeals::{AppealError, MappingError};
use vetted_crypto::{CryptoError, Nonce};
use vetted_types::{ApplicationId, CommitmentHash, ExpertId, Score};
use vetted_voting::VotingError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("review backend unreachable: {0}")]
    Unreachable(String),

    #[error("score and nonce do not match the commitment of expert {0}; check your saved nonce")]
    HashMismatch(ExpertId),

    #[error("backend rejected the request ({code}): {message}")]
    Rejected {
        code: BackendErrorCode,
        message: String,
    },

    #[error("HTTP request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("backend hash {remote} disagrees with locally computed {local}")]
    HashDisagreement {
        local: CommitmentHash,
        remote: CommitmentHash,
    },

    /// The commitment was sent but the backend never confirmed it, so it may
    /// have been recorded. The values needed to reveal it travel with the error.
    #[error(
        "commitment for {application} may have been recorded but was not confirmed ({reason}); \
         retry with the same score or check the phase status"
    )]
    CommitUnconfirmed {
        application: ApplicationId,
        score: Score,
        nonce: Nonce,
        /// Whether the score and nonce are in the local reveal cache.
        cached: bool,
        reason: String,
    },

    #[error("no saved score and nonce for this vote; enter them manually")]
    NothingCached,

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Voting(VotingError),

    #[error(transparent)]
    Appeal(#[from] AppealError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<VotingError> for ClientError {
    fn from(err: VotingError) -> Self {
        match err {
            VotingError::HashMismatch(expert) => Self::HashMismatch(expert),
            other => Self::Voting(other),
        }
    }
}

impl ClientError {
    pub fn is_hash_mismatch(&self) -> bool {
        matches!(self, Self::HashMismatch(_))
    }

    /// Whether the request may have been applied even though no success came
    /// back: transport failures and server errors, but not typed rejections.
    pub fn outcome_unknown(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::RequestFailed { status, .. } => *status == 0 || *status >= 500,
            _ => false,
        }
    }

    /// Whether retrying (later, or with corrected input) can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unreachable(_) | Self::HashMismatch(_) | Self::CommitUnconfirmed { .. } => true,
            Self::Rejected { code, .. } => code.is_retryable(),
            Self::RequestFailed { status, .. } => *status >= 500,
            Self::Voting(e) => e.is_retryable(),
            Self::Appeal(e) => e.is_retryable(),
            _ => false,
        }
    }
}

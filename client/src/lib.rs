//! Boundary between the review core and the backend that stores commitments
//! and appeals.
//!
//! [`ReviewApi`] is the backend surface. [`HttpReviewClient`] implements it over
//! REST; [`ReviewerSession`] runs a reviewer's commit and reveal flow on top of
//! any implementation, and [`GuildDirectory`] memoizes the guild list.

pub mod api;
pub mod config;
pub mod dto;
pub mod error;
pub mod guilds;
pub mod http;
pub mod session;

pub use api::ReviewApi;
pub use config::ClientConfig;
pub use dto::{
    AppealVoteSubmission, BackendErrorCode, CommitmentSubmission, ErrorBody, Guild,
    RevealSubmission,
};
pub use error::ClientError;
pub use guilds::GuildDirectory;
pub use http::HttpReviewClient;
pub use session::{CommitReceipt, ManualReveal, ReviewerSession};

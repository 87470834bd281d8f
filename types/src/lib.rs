//! Fundamental types for the Vetted review core.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers, stake amounts, review scores, commitment hashes, timestamps and
//! the tunable review parameters.

pub mod amount;
pub mod error;
pub mod hash;
pub mod ids;
pub mod params;
pub mod score;
pub mod time;

pub use amount::{StakeAmount, STAKE_DECIMALS, STAKE_UNIT};
pub use error::TypeError;
pub use hash::CommitmentHash;
pub use ids::{AppealId, ApplicationId, ExpertId, GuildId};
pub use params::ReviewParams;
pub use score::Score;
pub use time::Timestamp;

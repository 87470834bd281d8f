//! Commit-reveal voting for expert application reviews.
//!
//! A review round moves through `commit → reveal → finalized`:
//! 1. **Commit**: each assigned expert submits only `hash(score, nonce)` plus a stake.
//! 2. **Reveal**: experts disclose `(score, nonce)`; the hash is recomputed and must match.
//! 3. **Finalized**: the tally is frozen. Experts who committed but never revealed
//!    forfeit their stake and contribute nothing.
//!
//! Rounds flagged `direct` skip secrecy altogether: scores are counted as they arrive.
//! Phase changes are driven by an external scheduler; this crate only enforces
//! which operations each phase allows.

pub mod commitment;
pub mod error;
pub mod phase;
pub mod reveal_cache;
pub mod round;
pub mod store;

pub use commitment::{Forfeiture, TalliedVote, TallySummary, VoteCommitment};
pub use error::VotingError;
pub use phase::{PhaseStatus, ReviewPhase};
pub use reveal_cache::{CacheError, CachedVote, RevealCache};
pub use round::ReviewRound;
pub use store::VoteCommitmentStore;

//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (clock, entropy, the review backend) sit behind
//! traits or small types. This crate provides test-friendly implementations
//! that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod backend;
pub mod clock;
pub mod nonce;

pub use backend::{ApplicationRecord, NullReviewBackend};
pub use clock::NullClock;
pub use nonce::NullNonceSource;

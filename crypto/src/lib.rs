//! Cryptographic primitives for commit-reveal voting.
//!
//! - **Nonces**: 32 bytes from the operating system CSPRNG, lowercase hex
//! - **Commitments**: Blake2b-256 over a domain-separated `(score, nonce)` encoding
//!
//! The same commitment function runs on the reviewer's side (to produce the
//! hash it submits) and on the verifying side at reveal time, so the two can
//! never disagree about the algorithm.

pub mod commitment;
pub mod error;
pub mod nonce;

pub use commitment::{commitment_hash, verify_commitment, COMMITMENT_DOMAIN};
pub use error::CryptoError;
pub use nonce::{generate_nonce, Nonce, NonceSource, OsNonceSource, NONCE_BYTES};

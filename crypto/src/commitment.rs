//! Blake2b-256 vote commitments.
//!
//! `hash = Blake2b-256(COMMITMENT_DOMAIN ‖ score as u32 BE ‖ nonce UTF-8)`.
//! The score field is fixed width and the nonce is last, so the encoding is
//! unambiguous without a length prefix.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use vetted_types::{CommitmentHash, Score};

type Blake2b256 = Blake2b<U32>;

/// Domain tag prepended to every commitment preimage.
pub const COMMITMENT_DOMAIN: &[u8] = b"vetted/commit/v1";

/// Compute the commitment for a `(score, nonce)` pair.
pub fn commitment_hash(score: Score, nonce: &str) -> CommitmentHash {
    let mut hasher = Blake2b256::new();
    hasher.update(COMMITMENT_DOMAIN);
    hasher.update(u32::from(score.value()).to_be_bytes());
    hasher.update(nonce.as_bytes());
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    CommitmentHash::new(output)
}

/// Check a revealed `(score, nonce)` against a stored commitment.
///
/// The comparison touches every byte regardless of where the first difference is.
pub fn verify_commitment(expected: &CommitmentHash, score: Score, nonce: &str) -> bool {
    let actual = commitment_hash(score, nonce);
    actual
        .as_bytes()
        .iter()
        .zip(expected.as_bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

//! Secret nonces that blind a committed vote.

use crate::error::CryptoError;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bytes of entropy in a generated nonce (hex-encoded to twice as many characters).
pub const NONCE_BYTES: usize = 32;

/// A vote-blinding secret.
///
/// Generated nonces are lowercase hex, but any string a reviewer types back in
/// at reveal time is accepted, since the commitment only has to match. The
/// buffer is wiped on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Nonce(String);

impl Nonce {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Nonce {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Nonce(<redacted>)")
    }
}

/// Draw a fresh nonce from the operating system CSPRNG.
///
/// Never falls back to a weaker generator; an unavailable OS source is an error.
pub fn generate_nonce() -> Result<Nonce, CryptoError> {
    let mut bytes = [0u8; NONCE_BYTES];
    getrandom::getrandom(&mut bytes).map_err(|e| CryptoError::EntropyUnavailable(e.to_string()))?;
    let nonce = Nonce(hex::encode(bytes));
    bytes.zeroize();
    Ok(nonce)
}

/// Source of nonces, so tests can swap in deterministic values.
pub trait NonceSource: Send + Sync {
    fn generate(&self) -> Result<Nonce, CryptoError>;
}

/// The production nonce source backed by [`generate_nonce`].
#[derive(Clone, Copy, Debug, Default)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn generate(&self) -> Result<Nonce, CryptoError> {
        generate_nonce()
    }
}

//! Nullable nonce source: deterministic nonces.

use std::sync::Mutex;
use vetted_crypto::{CryptoError, Nonce, NonceSource};

/// A nonce source for testing.
///
/// Returns pre-configured values in order, cycling when exhausted. An empty
/// sequence behaves like an unavailable entropy source.
pub struct NullNonceSource {
    nonces: Vec<String>,
    index: Mutex<usize>,
}

impl NullNonceSource {
    /// Create with a sequence of deterministic nonces.
    pub fn new<I, S>(nonces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nonces: nonces.into_iter().map(Into::into).collect(),
            index: Mutex::new(0),
        }
    }

    /// Create with a single nonce that will be returned for every call.
    pub fn constant(nonce: &str) -> Self {
        Self::new([nonce])
    }

    /// A source that always fails, as if the OS had no entropy.
    pub fn unavailable() -> Self {
        Self::new(Vec::<String>::new())
    }

    /// Number of nonces handed out so far.
    pub fn calls(&self) -> usize {
        *self.index.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl NonceSource for NullNonceSource {
    fn generate(&self) -> Result<Nonce, CryptoError> {
        if self.nonces.is_empty() {
            return Err(CryptoError::EntropyUnavailable("null nonce source is empty".into()));
        }
        let mut idx = self.index.lock().unwrap_or_else(|e| e.into_inner());
        let nonce = Nonce::new(self.nonces[*idx % self.nonces.len()].as_str());
        *idx += 1;
        Ok(nonce)
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("operating system entropy source unavailable: {0}")]
    EntropyUnavailable(String),
}

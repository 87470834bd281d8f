//! Validation errors raised when constructing or parsing core types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("{0} must not be empty")]
    EmptyId(&'static str),

    #[error("score {0} is outside the range 0..=100")]
    ScoreOutOfRange(i64),

    #[error("invalid stake amount {0:?}: {1}")]
    InvalidAmount(String, &'static str),

    #[error("invalid commitment hash: {0}")]
    InvalidHash(String),
}

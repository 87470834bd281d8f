//! Review scores.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reviewer's score for an application, always within `0..=100`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(100);

    /// Validate a raw integer score.
    pub fn new(value: i64) -> Result<Self, TypeError> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(TypeError::ScoreOutOfRange(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = TypeError;
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        score.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(Score::new(0).unwrap(), Score::MIN);
        assert_eq!(Score::new(100).unwrap(), Score::MAX);
        assert_eq!(Score::new(101), Err(TypeError::ScoreOutOfRange(101)));
        assert_eq!(Score::new(-1), Err(TypeError::ScoreOutOfRange(-1)));
    }

    #[test]
    fn deserialization_validates_range() {
        let s: Score = serde_json::from_str("80").unwrap();
        assert_eq!(s.value(), 80);
        assert!(serde_json::from_str::<Score>("250").is_err());
    }
}

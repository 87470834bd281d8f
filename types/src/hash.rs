//! Commitment hash type.

use crate::error::TypeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-byte vote commitment digest.
///
/// Rendered as 64 lowercase hex characters, which is also how the backend
/// stores and returns it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitmentHash([u8; 32]);

impl CommitmentHash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse a hex digest. An optional `0x` prefix and upper-case digits are accepted.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| TypeError::InvalidHash(format!("{s:?}: {e}")))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitmentHash({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for CommitmentHash {
    type Err = TypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for CommitmentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CommitmentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip_is_lowercase() {
        let h = CommitmentHash::new([0xAB; 32]);
        let text = h.to_string();
        assert_eq!(text.len(), 64);
        assert_eq!(text, "ab".repeat(32));
        assert_eq!(CommitmentHash::from_hex(&text.to_uppercase()).unwrap(), h);
        assert_eq!(CommitmentHash::from_hex(&format!("0x{text}")).unwrap(), h);
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(CommitmentHash::from_hex("abcd").is_err());
        assert!(CommitmentHash::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn debug_is_abbreviated() {
        let h = CommitmentHash::new([0x01; 32]);
        assert_eq!(format!("{h:?}"), "CommitmentHash(01010101)");
    }
}

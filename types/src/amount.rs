//! Stake amounts.
//!
//! Amounts are fixed-point integers (u128 raw units) to avoid floating-point errors.
//! One whole token is [`STAKE_UNIT`] raw units, giving six decimal places. The
//! backend exchanges stakes as decimal strings (`"50"`, `"12.5"`), so that is
//! also the serde representation.

use crate::error::TypeError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// Number of decimal places carried by a [`StakeAmount`].
pub const STAKE_DECIMALS: u32 = 6;

/// Raw units per whole token.
pub const STAKE_UNIT: u128 = 10u128.pow(STAKE_DECIMALS);

/// An amount of tokens put at risk by a reviewer or appealer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StakeAmount(u128);

impl StakeAmount {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// An amount of whole tokens.
    pub const fn from_tokens(tokens: u128) -> Self {
        Self(tokens * STAKE_UNIT)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Whole tokens, truncating any fractional part.
    pub fn whole_tokens(&self) -> u128 {
        self.0 / STAKE_UNIT
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl Add for StakeAmount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for StakeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / STAKE_UNIT;
        let frac = self.0 % STAKE_UNIT;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{:0width$}", frac, width = STAKE_DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl FromStr for StakeAmount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| TypeError::InvalidAmount(s.to_string(), reason);
        let trimmed = s.trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };
        if whole.is_empty() {
            return Err(invalid("missing integer part"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid("expected a non-negative decimal number"));
        }
        if frac.len() > STAKE_DECIMALS as usize {
            return Err(invalid("more than 6 decimal places"));
        }
        let whole: u128 = whole.parse().map_err(|_| invalid("integer part overflows"))?;
        let mut frac_raw: u128 = 0;
        for (i, b) in frac.bytes().enumerate() {
            frac_raw += u128::from(b - b'0') * 10u128.pow(STAKE_DECIMALS - 1 - i as u32);
        }
        whole
            .checked_mul(STAKE_UNIT)
            .and_then(|w| w.checked_add(frac_raw))
            .map(Self)
            .ok_or_else(|| invalid("amount overflows"))
    }
}

impl Serialize for StakeAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StakeAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = StakeAmount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or a whole number of tokens")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StakeAmount, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<StakeAmount, E> {
                Ok(StakeAmount::from_tokens(u128::from(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<StakeAmount, E> {
                u64::try_from(v)
                    .map(|v| StakeAmount::from_tokens(u128::from(v)))
                    .map_err(|_| E::custom("stake amount must not be negative"))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

//! Opaque identifiers issued by the backend.
//!
//! The core never interprets these beyond equality and ordering; they only have
//! to be non-empty. All of them serialize as plain JSON strings.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting empty or whitespace-only input.
            pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
                let s = raw.into();
                if s.trim().is_empty() {
                    return Err(TypeError::EmptyId($label));
                }
                Ok(Self(s))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

string_id!(
    /// A job application under review.
    ApplicationId,
    "application id"
);

string_id!(
    /// An expert reviewer (also used for appealers and panel members).
    ExpertId,
    "expert id"
);

string_id!(
    /// The guild whose experts review an application.
    GuildId,
    "guild id"
);

string_id!(
    /// A filed appeal.
    AppealId,
    "appeal id"
);

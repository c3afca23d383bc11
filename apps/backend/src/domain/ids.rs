//! Opaque identifiers.
//!
//! Player ids come from the auth collaborator (token `sub`); invite and match
//! ids are ULIDs minted here so they sort by creation time.

use std::fmt;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
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

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Stable player identity supplied by the auth collaborator.
    PlayerId
);
string_id!(
    /// Skate spot / park; scoping unit for presence and invites.
    VenueId
);
string_id!(InviteId);
string_id!(MatchId);

impl InviteId {
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }
}

impl MatchId {
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }
}

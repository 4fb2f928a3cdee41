//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for example,
//! a [`ClientId`] with a [`Mailbox`] even though both are `String` under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies the client a submission came from, for rate-limiting purposes.
    ///
    /// Derived from proxy headers (see [`ClientId::from_headers`]). The value is
    /// whatever the network edge reported; it is not verified and must not be
    /// treated as a security boundary.
    ClientId
}

/// Identifier used when no usable address header is present.
pub const UNKNOWN_CLIENT: &str = "0.0.0.0";

impl ClientId {
    /// Derives the client identifier from the forwarded-for and real-IP headers.
    ///
    /// Takes the first comma-separated entry of `forwarded_for` (trimmed) when it
    /// is non-empty, else `real_ip` when non-empty, else [`UNKNOWN_CLIENT`].
    pub fn from_headers(forwarded_for: Option<&str>, real_ip: Option<&str>) -> Self {
        let forwarded = forwarded_for
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|first| !first.is_empty());

        forwarded
            .or_else(|| real_ip.filter(|ip| !ip.is_empty()))
            .and_then(Self::new)
            .unwrap_or_else(Self::unknown)
    }

    /// Returns the fallback identifier shared by every unidentifiable client.
    pub fn unknown() -> Self {
        Self(UNKNOWN_CLIENT.to_string())
    }
}

string_id! {
    /// A mailbox accepted by the email-delivery service in a `from` or `to`
    /// field (e.g. `"hello@budmeet.app"` or `"BudMeet <hello@budmeet.app>"`).
    Mailbox
}

// ---------------------------------------------------------------------------
// Identifiers — UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies the handling of a single submission.
///
/// Generated fresh for every request; recorded on the submission span so all
/// log activity from one request can be correlated. Never sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Generates a new random submission identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

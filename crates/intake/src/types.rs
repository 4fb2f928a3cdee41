//! Shared value types for the waitlist intake domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! request and message content and participate in the dispatch flow.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{ClientId, Mailbox};

// ---------------------------------------------------------------------------
// Inbound request
// ---------------------------------------------------------------------------

/// The request headers the intake gate consumes.
///
/// Transport crates copy these out of whatever request type they receive so
/// the domain never depends on an HTTP library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    /// Value of `x-forwarded-for`, if present.
    pub forwarded_for: Option<String>,
    /// Value of `x-real-ip`, if present.
    pub real_ip: Option<String>,
    /// Value of `user-agent`, if present. Only used for message content.
    pub user_agent: Option<String>,
}

impl RequestHeaders {
    /// Resolves the rate-limiting identity for these headers.
    pub fn client_id(&self) -> ClientId {
        ClientId::from_headers(self.forwarded_for.as_deref(), self.real_ip.as_deref())
    }
}

/// One raw submission as received from the transport.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    pub headers: RequestHeaders,
    /// Unparsed request body. Expected to be a JSON object.
    pub body: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Validated submission
// ---------------------------------------------------------------------------

/// A signup that has passed [`crate::validator::validate`].
///
/// Transient: built per request and dropped once dispatch finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupSubmission {
    /// Address that passed the loose `\S+@\S+\.\S+` shape check.
    pub email: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub referrer: Option<String>,
}

// ---------------------------------------------------------------------------
// Outbound message
// ---------------------------------------------------------------------------

/// The subject and bodies of a waitlist notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Everything the email-delivery collaborator needs to send one message.
///
/// Serialises to the `{ from, to, subject, text, html }` shape the delivery
/// service accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingEmail {
    /// Addresses a composed message.
    pub fn new(from: Mailbox, to: Mailbox, message: NotificationMessage) -> Self {
        Self {
            from,
            to,
            subject: message.subject,
            text: message.text,
            html: message.html,
        }
    }
}

/// Acknowledgement returned by the delivery service for an accepted message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider-assigned message identifier, when the provider returns one.
    pub id: Option<String>,
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Terminal result of handling one submission.
///
/// Every path through the dispatcher ends in exactly one of these; nothing is
/// propagated past the dispatcher boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The notification was handed to the delivery service.
    Accepted,
    /// The client exceeded its fixed-window quota.
    Throttled,
    /// The email field was missing or failed the shape check.
    InvalidEmail,
    /// Composition or delivery failed, including missing configuration.
    Failed {
        /// Message surfaced to the caller.
        message: String,
    },
}

impl SubmissionOutcome {
    /// HTTP status code that represents this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Accepted => 200,
            Self::Throttled => 429,
            Self::InvalidEmail => 400,
            Self::Failed { .. } => 500,
        }
    }

    /// Error text returned to the caller, or `None` on success.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Accepted => None,
            Self::Throttled => Some("Too many requests"),
            Self::InvalidEmail => Some("Invalid email"),
            Self::Failed { message } => Some(message),
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// ISO-8601 form with millisecond precision and a `Z` suffix,
    /// e.g. `2025-10-18T09:30:00.000Z`.
    pub fn to_iso8601(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_iso8601())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_outcome_status_codes() {
        assert_eq!(SubmissionOutcome::Accepted.status_code(), 200);
        assert_eq!(SubmissionOutcome::Throttled.status_code(), 429);
        assert_eq!(SubmissionOutcome::InvalidEmail.status_code(), 400);
        let failed = SubmissionOutcome::Failed {
            message: "boom".into(),
        };
        assert_eq!(failed.status_code(), 500);
        assert_eq!(failed.error_message(), Some("boom"));
        assert_eq!(SubmissionOutcome::Accepted.error_message(), None);
    }

    #[test]
    fn test_timestamp_iso8601_millis() {
        let dt = Utc.with_ymd_and_hms(2025, 10, 18, 9, 30, 5).unwrap();
        let ts = Timestamp::from_utc(dt);
        assert_eq!(ts.to_iso8601(), "2025-10-18T09:30:05.000Z");
    }

    #[test]
    fn test_headers_resolve_client_id() {
        let headers = RequestHeaders {
            forwarded_for: Some("1.2.3.4, 5.6.7.8".into()),
            real_ip: None,
            user_agent: None,
        };
        assert_eq!(headers.client_id().as_str(), "1.2.3.4");
    }
}

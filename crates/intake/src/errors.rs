//! Error types for the waitlist intake domain.
//!
//! [`ValidationError`] rejects a submission before any external call.
//! [`DeliveryError`] is the tagged result of the email-delivery collaborator.
//! [`DispatchError`] covers everything that can fail after validation, and is
//! what the dispatcher turns into a 500 outcome.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// The submitted payload is structurally unacceptable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `email` was absent, not a string, or failed the loose shape check.
    #[error("Invalid email")]
    InvalidEmail,
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// Failure reported by an [`crate::EmailSender`] implementation.
///
/// Every variant's display text is safe to return to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// No API credential was configured for the delivery service.
    #[error("{credential} is missing. Add it to the environment before sending.")]
    MissingCredential {
        /// Name of the environment variable that should hold the credential.
        credential: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("{message}")]
    Transport { message: String },

    /// The service answered with a non-success status.
    #[error("{message}")]
    Rejected {
        /// HTTP status code returned by the service.
        status: u16,
        /// Message extracted from the response body, or the status text.
        message: String,
    },

    /// Any other failure raised by a sender implementation.
    #[error("{message}")]
    Service { message: String },
}

impl DeliveryError {
    /// Builds a [`DeliveryError::Service`] from any message.
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Fallback text for failures that carry no message of their own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Server error";

/// Failures between a successful validation and a delivered notification.
///
/// Configuration absence and delivery failure are deliberately
/// indistinguishable to the caller: both become a 500 outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A required setting (destination or sender address) was not configured.
    #[error("{key} is missing. Add it to the environment before sending.")]
    MissingConfiguration {
        /// Name of the environment variable that should hold the value.
        key: &'static str,
    },

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl DispatchError {
    /// Message surfaced in the 500 response body.
    ///
    /// Falls back to [`GENERIC_FAILURE_MESSAGE`] when the underlying error has
    /// no text.
    pub fn caller_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

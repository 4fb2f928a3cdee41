//! BudMeet email-delivery infrastructure adapter.
//!
//! Implements the [`intake::EmailSender`] trait for the Resend HTTP API.
//! Another provider would be added as a new type in this crate without any
//! changes to the `intake` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, authentication, request formatting and
//! response decoding all live here. The [`intake`] crate sees only
//! [`intake::EmailSender`] and the tagged [`intake::DeliveryError`].
//!
//! Sends are attempted exactly once: no timeout beyond the HTTP client's
//! defaults, no retry, no back-off.

pub mod resend;

pub use resend::{MailerError, ResendMailer, ResendSettings, API_KEY_VAR, DEFAULT_BASE_URL};

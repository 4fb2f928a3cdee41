//! Core domain of the BudMeet waitlist intake gate.
//!
//! This crate contains the rate limiter, the submission validator, message
//! composition, and the dispatcher that sequences them, together with the
//! port traits infrastructure crates implement. It sees no HTTP types and
//! performs no I/O of its own.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** It defines *what* is needed;
//! infrastructure crates (`mailer`, `listener`) define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ClientId`, `Mailbox`, `SubmissionId`) |
//! | [`types`] | Request, submission, message and outcome types |
//! | [`errors`] | Validation, delivery and dispatch errors |
//! | [`ports`] | `Clock` and `EmailSender` traits |
//! | [`limiter`] | Per-client fixed-window rate limiter |
//! | [`validator`] | Body parsing and email shape check |
//! | [`message`] | Notification subject and body composition |
//! | [`dispatcher`] | End-to-end handling of one submission |

pub mod dispatcher;
pub mod errors;
pub mod identifiers;
pub mod limiter;
pub mod message;
pub mod ports;
pub mod types;
pub mod validator;

#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use dispatcher::{NotificationDispatcher, NotificationRouting, NOTIFY_FROM_KEY, NOTIFY_TO_KEY};
pub use errors::{DeliveryError, DispatchError, ValidationError, GENERIC_FAILURE_MESSAGE};
pub use identifiers::{ClientId, Mailbox, SubmissionId, UNKNOWN_CLIENT};
pub use limiter::{
    ClientWindowCounter, FixedWindowLimiter, LimiterPolicy, RateDecision, SystemClock,
    DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW,
};
pub use ports::{Clock, EmailSender};
pub use types::{
    DeliveryReceipt, NotificationMessage, OutgoingEmail, RequestHeaders, SignupSubmission,
    SubmissionOutcome, SubmissionRequest, Timestamp,
};

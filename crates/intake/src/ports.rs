//! Port traits implemented by infrastructure crates.
//!
//! The domain defines *what* it needs (time, email delivery); adapters in
//! other crates define *how* to supply it.

use std::fmt::Debug;
use std::time::Instant;

use async_trait::async_trait;

use crate::{DeliveryError, DeliveryReceipt, OutgoingEmail};

/// Source of monotonic time for the rate limiter.
///
/// Production uses [`crate::SystemClock`]; tests advance a mock clock
/// explicitly to cross window boundaries.
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// The external email-delivery collaborator.
///
/// Implementations send one message and report the outcome as a tagged
/// result. They must not retry: a failure is surfaced to the dispatcher
/// immediately.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Checks that the sender is configured well enough to attempt a send.
    ///
    /// The dispatcher calls this before resolving addresses, so a missing
    /// credential is reported ahead of any other missing setting.
    fn ensure_ready(&self) -> Result<(), DeliveryError> {
        Ok(())
    }

    /// Sends `email`, returning the provider's receipt on success.
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, DeliveryError>;
}

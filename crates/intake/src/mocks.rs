//! Test doubles for the intake ports.
//!
//! Available in this crate's tests and, with the `test-helpers` feature, to
//! downstream test suites.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::{Clock, DeliveryError, DeliveryReceipt, EmailSender, OutgoingEmail};

/// Clock whose time only moves when told to.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone)]
pub struct MockClock {
    current_time: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Create a mock clock starting at a specific instant.
    pub fn new(start: Instant) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time += duration;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self
            .current_time
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}

/// [`EmailSender`] that records every message instead of sending it.
///
/// Clones share the same record. Built with [`RecordingEmailSender::failing`]
/// it records the attempt and then returns the configured error.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    failure: Option<DeliveryError>,
    readiness: Option<DeliveryError>,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every call fails with `error`.
    pub fn failing(error: DeliveryError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// A sender that reports `error` from [`EmailSender::ensure_ready`] and
    /// is never asked to send.
    pub fn unready(error: DeliveryError) -> Self {
        Self {
            readiness: Some(error),
            ..Self::default()
        }
    }

    /// Messages handed to this sender so far, in call order.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .expect("RecordingEmailSender mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    fn ensure_ready(&self) -> Result<(), DeliveryError> {
        match &self.readiness {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, DeliveryError> {
        let count = {
            let mut sent = self.sent.lock().expect("RecordingEmailSender mutex poisoned");
            sent.push(email.clone());
            sent.len()
        };

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(DeliveryReceipt {
                id: Some(format!("recorded-{count}")),
            }),
        }
    }
}

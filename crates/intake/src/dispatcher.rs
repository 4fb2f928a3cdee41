//! End-to-end handling of one waitlist submission.
//!
//! Order of operations is fixed: identify the client, consume rate-limit
//! quota, validate, compose, send. Quota is consumed before validation, so
//! malformed submissions still count against the client.

use std::sync::Arc;

use tracing::{error, info, info_span, warn, Instrument};

use crate::message::{self, MessageContext};
use crate::validator;
use crate::{
    DispatchError, EmailSender, FixedWindowLimiter, Mailbox, OutgoingEmail, RateDecision,
    SignupSubmission, SubmissionId, SubmissionOutcome, SubmissionRequest, Timestamp,
};

/// Environment variable that holds the destination mailbox.
pub const NOTIFY_TO_KEY: &str = "NOTIFY_TO";

/// Environment variable that holds the sender mailbox.
pub const NOTIFY_FROM_KEY: &str = "NOTIFY_FROM";

/// Addresses used for every notification.
///
/// Either may be absent at start-up; a submission that reaches the send step
/// without them fails with a 500 rather than preventing the server from
/// starting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationRouting {
    pub to: Option<Mailbox>,
    pub from: Option<Mailbox>,
}

/// Orchestrates limiter, validator and delivery for each submission.
pub struct NotificationDispatcher {
    limiter: Arc<FixedWindowLimiter>,
    sender: Arc<dyn EmailSender>,
    routing: NotificationRouting,
}

impl NotificationDispatcher {
    /// Creates a dispatcher over a shared limiter, a delivery port and the
    /// configured addresses.
    pub fn new(
        limiter: Arc<FixedWindowLimiter>,
        sender: Arc<dyn EmailSender>,
        routing: NotificationRouting,
    ) -> Self {
        Self {
            limiter,
            sender,
            routing,
        }
    }

    /// The limiter this dispatcher consults; shared with the sweep task.
    pub fn limiter(&self) -> &Arc<FixedWindowLimiter> {
        &self.limiter
    }

    /// Handles one submission. Every failure is folded into the outcome.
    pub async fn handle_submission(&self, request: SubmissionRequest) -> SubmissionOutcome {
        let submission_id = SubmissionId::new_random();
        let client_id = request.headers.client_id();
        let span = info_span!(
            "submission",
            submission_id = %submission_id,
            client_id = %client_id,
        );

        async move {
            if self.limiter.check_and_record(&client_id) == RateDecision::Rejected {
                warn!("Rate limit exceeded");
                return SubmissionOutcome::Throttled;
            }

            let submission = match validator::validate(&validator::parse_body(&request.body)) {
                Ok(submission) => submission,
                Err(err) => {
                    warn!(error = %err, "Rejected submission");
                    return SubmissionOutcome::InvalidEmail;
                }
            };

            let context = MessageContext {
                client_id: &client_id,
                user_agent: request.headers.user_agent.as_deref(),
                received_at: Timestamp::now(),
            };

            match self.deliver(&submission, &context).await {
                Ok(()) => {
                    info!("Waitlist notification sent");
                    SubmissionOutcome::Accepted
                }
                Err(err) => {
                    error!(error = %err, "Waitlist notification failed");
                    SubmissionOutcome::Failed {
                        message: err.caller_message(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn deliver(
        &self,
        submission: &SignupSubmission,
        context: &MessageContext<'_>,
    ) -> Result<(), DispatchError> {
        self.sender.ensure_ready()?;

        let to = self
            .routing
            .to
            .clone()
            .ok_or(DispatchError::MissingConfiguration { key: NOTIFY_TO_KEY })?;
        let from = self
            .routing
            .from
            .clone()
            .ok_or(DispatchError::MissingConfiguration {
                key: NOTIFY_FROM_KEY,
            })?;

        let email = OutgoingEmail::new(from, to, message::compose(submission, context));
        let receipt = self.sender.send(&email).await?;

        info!(message_id = receipt.id.as_deref().unwrap_or("-"), "Delivery accepted");
        Ok(())
    }
}

//! Resend (`https://resend.com`) client.

use async_trait::async_trait;
use intake::{DeliveryError, DeliveryReceipt, EmailSender, OutgoingEmail, GENERIC_FAILURE_MESSAGE};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Environment variable that holds the Resend API key.
pub const API_KEY_VAR: &str = "RESEND_API_KEY";

/// Production Resend endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// Errors raised while constructing the mailer.
#[derive(Debug, Error)]
pub enum MailerError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for [`ResendMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendSettings {
    /// API key. When absent the mailer still constructs, and every send
    /// fails with [`DeliveryError::MissingCredential`].
    pub api_key: Option<String>,
    /// Base URL without the `/emails` path.
    pub base_url: String,
}

impl Default for ResendSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// [`EmailSender`] backed by `POST {base_url}/emails`.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl ResendMailer {
    /// Builds the HTTP client. Fails only if the TLS backend cannot start.
    pub fn new(settings: ResendSettings) -> Result<Self, MailerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("budmeet-waitlist/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: settings.api_key.filter(|key| !key.is_empty()),
            endpoint: format!("{}/emails", settings.base_url.trim_end_matches('/')),
        })
    }

    /// Full URL messages are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    fn ensure_ready(&self) -> Result<(), DeliveryError> {
        self.api_key().map(|_| ())
    }

    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, DeliveryError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| DeliveryError::Transport {
            message: e.to_string(),
        })?;
        debug!(status = status.as_u16(), bytes = body.len(), "Resend responded");

        if status.is_success() {
            let parsed: SendResponse = serde_json::from_slice(&body).unwrap_or_default();
            return Ok(DeliveryReceipt { id: parsed.id });
        }

        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            message: rejection_message(status, &body),
        })
    }
}

impl ResendMailer {
    fn api_key(&self) -> Result<&str, DeliveryError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| DeliveryError::MissingCredential {
                credential: API_KEY_VAR.to_string(),
            })
    }
}

// Prefer the service's own message, then the status reason phrase.
fn rejection_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(body)
        .ok()
        .and_then(|err| err.message)
        .filter(|message| !message.trim().is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

//! The `POST /api/notify` route and its JSON response mapping.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use intake::{NotificationDispatcher, RequestHeaders, SubmissionOutcome, SubmissionRequest};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Path of the waitlist notification endpoint.
pub const NOTIFY_PATH: &str = "/api/notify";

/// Largest body read from a submission. Anything bigger is treated like a
/// malformed body: it still consumes quota and ends in a 400.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

/// Builds the router serving [`NOTIFY_PATH`] on top of `dispatcher`.
pub fn router(dispatcher: Arc<NotificationDispatcher>) -> Router {
    Router::new()
        .route(NOTIFY_PATH, post(notify_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

/// Handles one submission.
///
/// The body is read here rather than through an extractor so an oversized
/// or truncated body never short-circuits the rate limiter with a 413.
pub async fn notify_handler(
    State(dispatcher): State<Arc<NotificationDispatcher>>,
    headers: HeaderMap,
    body: Body,
) -> NotifyResponse {
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            warn!(error = %e, limit = MAX_BODY_BYTES, "Unreadable request body, treating as empty");
            Vec::new()
        }
    };

    let request = SubmissionRequest {
        headers: request_headers(&headers),
        body,
    };

    NotifyResponse(dispatcher.handle_submission(request).await)
}

fn request_headers(headers: &HeaderMap) -> RequestHeaders {
    let text = |name: &HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    RequestHeaders {
        forwarded_for: text(&X_FORWARDED_FOR),
        real_ip: text(&X_REAL_IP),
        user_agent: text(&axum::http::header::USER_AGENT),
    }
}

#[derive(Serialize)]
struct OkBody {
    ok: bool,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

/// JSON rendering of a [`SubmissionOutcome`].
#[derive(Debug)]
pub struct NotifyResponse(pub SubmissionOutcome);

impl IntoResponse for NotifyResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self.0.error_message() {
            None => (status, Json(OkBody { ok: true })).into_response(),
            Some(error) => (status, Json(ErrorBody { error })).into_response(),
        }
    }
}

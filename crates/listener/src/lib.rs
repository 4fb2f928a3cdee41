//! BudMeet waitlist HTTP listener.
//!
//! Exposes the intake gate over HTTP:
//!
//! - [`routes::router`] builds the axum [`axum::Router`] serving
//!   `POST /api/notify`, translating headers and body into an
//!   [`intake::SubmissionRequest`] and the resulting
//!   [`intake::SubmissionOutcome`] into a JSON response.
//! - [`sweep::spawn_sweeper`] periodically drops expired rate-limit counters.
//! - [`server::serve`] binds the socket and runs until Ctrl+C or SIGTERM.
//!
//! ## Response Mapping
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | Accepted | 200 | `{"ok":true}` |
//! | InvalidEmail | 400 | `{"error":"Invalid email"}` |
//! | Throttled | 429 | `{"error":"Too many requests"}` |
//! | Failed | 500 | `{"error":"<message>"}` |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport details live here. The [`intake`] crate
//! sees only [`intake::RequestHeaders`] and raw body bytes.

pub mod error;
pub mod routes;
pub mod server;
pub mod sweep;

pub use error::ListenerError;
pub use routes::{router, MAX_BODY_BYTES, NOTIFY_PATH};
pub use server::{serve, ListenerConfig};
pub use sweep::spawn_sweeper;

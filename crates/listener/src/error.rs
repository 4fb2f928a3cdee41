//! Errors that stop the listener before or while serving.

use std::net::SocketAddr;

use thiserror::Error;

/// Failures that stop the HTTP listener itself.
///
/// Per-request failures never surface here; they are outcomes.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

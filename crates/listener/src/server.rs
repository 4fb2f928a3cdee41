//! Binding, serving and graceful shutdown of the HTTP listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use intake::NotificationDispatcher;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use crate::{router, spawn_sweeper, ListenerError};

/// How the listener binds and maintains itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerConfig {
    pub addr: SocketAddr,
    /// Interval between limiter sweeps; `None` disables sweeping.
    pub sweep_interval: Option<Duration>,
}

/// Serves the notify endpoint until Ctrl+C or SIGTERM.
pub async fn serve(
    config: ListenerConfig,
    dispatcher: Arc<NotificationDispatcher>,
) -> Result<(), ListenerError> {
    let sweeper = config
        .sweep_interval
        .map(|every| spawn_sweeper(Arc::clone(dispatcher.limiter()), every));

    let app = router(dispatcher);

    info!(addr = %config.addr, "Binding listener");
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| ListenerError::Bind {
            addr: config.addr,
            source,
        })?;
    info!(addr = %config.addr, "Server running");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("Server shut down");

    result.map_err(ListenerError::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

//! HTTP server startup and graceful shutdown.

/// Tracing target for server startup events.
pub const TRACING_TARGET_STARTUP: &str = "keypage_cli::server::startup";

/// Tracing target for server shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "keypage_cli::server::shutdown";

mod error;

use std::future::{IntoFuture, pending};

use axum::Router;
pub use error::{ServerError, ServerResult};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;

use crate::config::ServerConfig;

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// After the signal, in-flight requests get `shutdown_timeout` to finish;
/// connections still open after that are dropped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    let address = config.server_addr();
    let listener = TcpListener::bind(address).await.map_err(|source| {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            addr = %address,
            error = %source,
            "Failed to bind to address"
        );
        ServerError::Bind { address, source }
    })?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        addr = %address,
        "Server is ready and listening for connections"
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            "Server is bound to all interfaces, ensure firewall rules are configured"
        );
    }

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let mut drain_rx = stop_tx.subscribe();

    tokio::spawn(async move {
        let signal = shutdown_signal().await;
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            signal,
            "Shutdown signal received, no longer accepting connections"
        );
        let _ = stop_tx.send(true);
    });

    let graceful = async move {
        if stop_rx.wait_for(|stop| *stop).await.is_err() {
            pending::<()>().await;
        }
    };

    let timeout = config.shutdown_timeout();
    let deadline = async move {
        if drain_rx.wait_for(|stop| *stop).await.is_err() {
            pending::<()>().await;
        }
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            timeout_secs = timeout.as_secs(),
            "Draining in-flight requests"
        );
        tokio::time::sleep(timeout).await;
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|err| {
                tracing::error!(
                    target: TRACING_TARGET_SHUTDOWN,
                    error = %err,
                    "Server encountered an error"
                );
                ServerError::Runtime(err)
            })?;
            tracing::info!(target: TRACING_TARGET_SHUTDOWN, "Server shut down gracefully");
        }
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SHUTDOWN,
                "Shutdown timeout elapsed, dropping open connections"
            );
        }
    }

    Ok(())
}

/// Resolves with the signal name once SIGINT or, on Unix, SIGTERM arrives.
///
/// A handler that fails to install is logged and never resolves, so the other
/// signal still works.
async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(target: TRACING_TARGET_SHUTDOWN, %error, "Cannot listen for SIGINT");
            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!(target: TRACING_TARGET_SHUTDOWN, %error, "Cannot listen for SIGTERM");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    }
}

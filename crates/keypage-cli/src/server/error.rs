//! Server error types.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Errors raised while binding or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("Runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// Returns a hint for resolving the error, if one applies.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Bind { source, .. } => match source.kind() {
                io::ErrorKind::AddrInUse => {
                    Some("Another process is using the port, pick another with --port")
                }
                io::ErrorKind::AddrNotAvailable => {
                    Some("The host address is not assigned to this machine, check --host")
                }
                io::ErrorKind::PermissionDenied => {
                    Some("Binding this address requires elevated privileges")
                }
                _ => None,
            },
            Self::Runtime(_) => None,
        }
    }
}

//! Server error types.

use std::net::SocketAddr;

use conclave_wire::{MessageKind, WireError};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur during server operations.
///
/// Connection-local errors (`Wire`, `Io`, `Handler`) are fatal to one
/// connection and never take down the service; `BindFailed` and a fatal
/// accept error out of the serve loop are process-fatal for the replica.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Wire protocol error on a peer stream.
    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    /// I/O error outside the framed stream (accept, stream split).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Bind failed; fatal, not retried.
    #[error("failed to bind to {addr}: {source}")]
    BindFailed {
        /// The address the replica tried to listen on.
        addr: SocketAddr,
        /// The underlying bind error.
        source: std::io::Error,
    },

    /// A handler failed; fatal to the connection it occurred on.
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    /// The replica configuration is invalid.
    #[error("invalid replica config: {0}")]
    Config(String),
}

/// Errors returned by message handlers.
///
/// Any handler error tears down the connection it occurred on; there is no
/// partial-failure or retry path at this layer. A rejected proposal is NOT
/// a handler error -- it travels in the reply payload.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No handler is registered for this message kind.
    #[error("message type '{0}' handler is not implemented")]
    Unimplemented(MessageKind),

    /// The handler itself failed.
    #[error("{0}")]
    Failed(String),
}

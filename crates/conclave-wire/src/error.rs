//! Wire protocol error types.

use thiserror::Error;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while framing or decoding peer messages.
#[derive(Debug, Error)]
pub enum WireError {
    /// I/O error on the underlying stream.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload could not be encoded or decoded.
    #[error("malformed payload: {0}")]
    Codec(#[from] postcard::Error),

    /// Frame length prefix was zero.
    #[error("invalid frame: length prefix is zero")]
    EmptyFrame,

    /// Frame exceeds the negotiated maximum size.
    #[error("frame too large: {got} bytes exceeds maximum {max}")]
    FrameTooLarge {
        /// Declared or encoded frame size.
        got: usize,
        /// Maximum allowed frame size.
        max: usize,
    },
}

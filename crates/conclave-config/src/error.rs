//! Configuration validation errors.

use thiserror::Error;

/// Errors found while validating a merged configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The replica name is empty; peers would be unable to identify it.
    #[error("replica name must not be empty")]
    EmptyReplicaName,

    /// The listen address does not parse as `host:port`.
    #[error("invalid listen address '{addr}'")]
    InvalidListenAddr {
        /// The offending address string.
        addr: String,
    },
}

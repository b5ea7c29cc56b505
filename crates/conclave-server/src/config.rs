//! Replica configuration.

use std::net::SocketAddr;

use conclave_wire::DEFAULT_MAX_FRAME_BYTES;

use crate::error::{ServerError, ServerResult};

/// Identity and listen settings for one replica.
///
/// `name` and `listen_addr` are immutable after the [`Replica`] is built.
/// The name must be unique cluster-wide; that is a deployment concern and
/// is not enforced here.
///
/// [`Replica`]: crate::Replica
#[derive(Debug, Clone)]
pub struct ReplicaConfig {
    /// Unique name identifying the replica to peers; used as the sender
    /// identity in every reply.
    pub name: String,
    /// Address the replica listens on. An unspecified host (`0.0.0.0`,
    /// `::`) binds all local addresses.
    pub listen_addr: SocketAddr,
    /// Maximum frame size accepted on peer streams.
    pub max_frame_bytes: usize,
}

impl ReplicaConfig {
    /// Creates a configuration with the default frame limit.
    pub fn new(name: impl Into<String>, listen_addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            listen_addr,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }

    /// Sets the maximum frame size accepted on peer streams.
    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    pub(crate) fn validate(&self) -> ServerResult<()> {
        if self.name.is_empty() {
            return Err(ServerError::Config("replica name must not be empty".to_string()));
        }
        if self.max_frame_bytes == 0 {
            return Err(ServerError::Config("max_frame_bytes must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:9432".parse().unwrap()
    }

    #[test]
    fn default_frame_limit_applies() {
        let config = ReplicaConfig::new("r1", addr());
        assert_eq!(config.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        let config = ReplicaConfig::new("", addr());
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }

    #[test]
    fn zero_frame_limit_is_rejected() {
        let config = ReplicaConfig::new("r1", addr()).with_max_frame_bytes(0);
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }
}

//! # conclave-config: replica configuration
//!
//! Layered configuration for a Conclave replica, merged in precedence
//! order: built-in defaults, then `conclave.toml` in the project
//! directory, then `CONCLAVE_*` environment variables.

mod error;
mod loader;

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use loader::ConfigLoader;

/// Complete replica configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConclaveConfig {
    /// Identity and listen settings.
    pub replica: ReplicaSection,
    /// Metrics export settings.
    pub metrics: MetricsSection,
}

/// `[replica]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplicaSection {
    /// Unique name identifying this replica to its peers.
    pub name: String,
    /// Address to listen on; an unspecified host binds all local
    /// addresses.
    pub listen_addr: String,
    /// Maximum frame size accepted on peer streams.
    pub max_frame_bytes: usize,
}

impl Default for ReplicaSection {
    fn default() -> Self {
        Self {
            name: "replica-1".to_string(),
            listen_addr: "0.0.0.0:9432".to_string(),
            max_frame_bytes: 1 << 20,
        }
    }
}

/// `[metrics]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSection {
    /// JSON Lines file metrics snapshots are appended to.
    pub dump_path: PathBuf,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            dump_path: PathBuf::from("metrics.jsonl"),
        }
    }
}

impl ConclaveConfig {
    /// Validates the merged configuration and parses the listen address.
    pub fn validated_listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.replica.name.is_empty() {
            return Err(ConfigError::EmptyReplicaName);
        }
        self.replica
            .listen_addr
            .parse()
            .map_err(|_| ConfigError::InvalidListenAddr {
                addr: self.replica.listen_addr.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConclaveConfig::default();
        let addr = config.validated_listen_addr().unwrap();
        assert_eq!(addr.port(), 9432);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut config = ConclaveConfig::default();
        config.replica.name.clear();
        assert!(matches!(
            config.validated_listen_addr(),
            Err(ConfigError::EmptyReplicaName)
        ));
    }

    #[test]
    fn unparseable_address_is_rejected() {
        let mut config = ConclaveConfig::default();
        config.replica.listen_addr = "not-an-address".to_string();
        assert!(matches!(
            config.validated_listen_addr(),
            Err(ConfigError::InvalidListenAddr { .. })
        ));
    }
}

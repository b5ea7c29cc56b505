//! Start command - runs a Conclave replica.

use anyhow::{Context, Result};
use conclave_config::ConfigLoader;
use conclave_server::{Replica, ReplicaConfig};
use serde_json::{Map, json};
use tracing::{info, warn};

use super::parse_address;

pub fn run(name: Option<String>, address: Option<String>) -> Result<()> {
    let mut config = ConfigLoader::new().load()?;

    // Flag overrides beat file and environment values.
    if let Some(name) = name {
        config.replica.name = name;
    }
    if let Some(address) = address {
        config.replica.listen_addr = parse_address(&address)?.to_string();
    }

    let listen_addr = config.validated_listen_addr()?;

    println!();
    println!("Conclave - peer communication for consensus quorums");
    println!();
    println!("  Replica name:  {}", config.replica.name);
    println!("  Bind address:  {listen_addr}");
    println!("  Metrics file:  {}", config.metrics.dump_path.display());
    println!();
    println!("Replica is ready. Press Ctrl+C to stop.");
    println!();

    let replica_config = ReplicaConfig::new(config.replica.name.clone(), listen_addr)
        .with_max_frame_bytes(config.replica.max_frame_bytes);
    let replica = Replica::new(replica_config).context("Failed to create replica")?;

    info!(replica = %config.replica.name, "starting replica");
    let served = replica.listen();

    // The serve loop only returns on a fatal error; record what was
    // measured before surfacing it.
    let mut extra = Map::new();
    extra.insert("name".to_string(), json!(config.replica.name));
    if let Err(e) = replica.metrics().dump(&config.metrics.dump_path, &extra) {
        warn!("could not dump metrics: {e}");
    }
    println!("{}", replica.metrics().summary());

    served.context("Replica error during operation")
}

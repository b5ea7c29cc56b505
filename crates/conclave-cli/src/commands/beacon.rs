//! Beacon command - probes a replica's liveness.

use anyhow::{Context, Result};
use conclave_client::PeerClient;

use super::parse_address;

pub fn run(server: &str) -> Result<()> {
    let addr = parse_address(server)?;
    let mut client = PeerClient::connect(addr).context("Failed to connect")?;

    let reply = client.beacon().context("Beacon failed")?;
    println!("replica at {addr} is alive ({})", reply.timestamp);
    Ok(())
}

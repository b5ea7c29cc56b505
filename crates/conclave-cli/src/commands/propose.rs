//! Propose command - submits a command to a replica.

use anyhow::{Context, Result};
use bytes::Bytes;
use conclave_client::PeerClient;

use super::parse_address;

pub fn run(command: &str, server: &str, identity: &str) -> Result<()> {
    let addr = parse_address(server)?;
    let mut client = PeerClient::connect(addr).context("Failed to connect")?;

    let reply = client
        .propose(identity, Bytes::from(command.as_bytes().to_vec()))
        .context("Propose failed")?;

    // A rejected proposal is a business outcome, not a transport failure:
    // report it and exit cleanly either way.
    if reply.success {
        println!("proposal committed");
    } else {
        let reason = reply.error.unwrap_or_else(|| "no reason given".to_string());
        println!("proposal dropped: {reason}");
    }
    Ok(())
}

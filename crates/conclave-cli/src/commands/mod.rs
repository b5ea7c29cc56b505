//! CLI subcommand implementations.

pub mod beacon;
pub mod propose;
pub mod start;
pub mod version;

use std::net::SocketAddr;

use anyhow::{Result, bail};

/// Parses an address string into a `SocketAddr`.
///
/// Accepts:
/// - Port only: "9432" -> "127.0.0.1:9432"
/// - Full address: "127.0.0.1:9432"
/// - IPv6: `[::1]:9432`
pub fn parse_address(address: &str) -> Result<SocketAddr> {
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(port) = address.parse::<u16>() {
        return Ok(SocketAddr::from(([127, 0, 0, 1], port)));
    }

    bail!(
        "Invalid address '{address}'. Use a port (e.g., '9432') or full address (e.g., '127.0.0.1:9432')"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_port() {
        let addr = parse_address("9432").unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:9432");
    }

    #[test]
    fn parses_full_address() {
        let addr = parse_address("0.0.0.0:4100").unwrap();
        assert_eq!(addr.port(), 4100);
        assert!(addr.ip().is_unspecified());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_address("not-an-address").is_err());
    }
}

//! Version command.

use anyhow::Result;

pub fn run() -> Result<()> {
    println!("conclave {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

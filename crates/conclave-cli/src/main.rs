//! Conclave unified CLI.
//!
//! A communication framework for consensus quorums.
//!
//! # Quick Start
//!
//! ```bash
//! # Start a replica
//! conclave start --name r1 --address 9432
//!
//! # Probe it (new terminal)
//! conclave beacon --server 127.0.0.1:9432
//!
//! # Propose a command
//! conclave propose --server 127.0.0.1:9432 --identity clientA "set x=1"
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Conclave - peer communication for consensus quorums.
#[derive(Parser)]
#[command(name = "conclave")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Start a replica and serve peer connections until terminated.
    Start {
        /// Replica name; overrides the configuration file.
        #[arg(short, long)]
        name: Option<String>,

        /// Address to bind (port only: 9432, or full: 127.0.0.1:9432);
        /// overrides the configuration file.
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Probe a replica's liveness.
    Beacon {
        /// Replica address to connect to.
        #[arg(short, long, default_value = "127.0.0.1:9432")]
        server: String,
    },

    /// Propose a command to a replica.
    Propose {
        /// The command to propose.
        command: String,

        /// Replica address to connect to.
        #[arg(short, long, default_value = "127.0.0.1:9432")]
        server: String,

        /// Client identity to propose under.
        #[arg(short, long, default_value = "conclave-cli")]
        identity: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Version => commands::version::run(),
        Commands::Start { name, address } => commands::start::run(name, address),
        Commands::Beacon { server } => commands::beacon::run(&server),
        Commands::Propose {
            command,
            server,
            identity,
        } => commands::propose::run(&command, &server, &identity),
    }
}

//! # conclave-server: the replica service
//!
//! This crate provides the network service a consensus algorithm is built
//! on: a TCP server that accepts one long-lived bidirectional message
//! stream per peer connection and dispatches each inbound message to a
//! type-specific handler, preserving strict per-connection request/response
//! ordering.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     conclave-server                      │
//! │  ┌──────────┐   ┌────────────────────┐   ┌────────────┐  │
//! │  │ Listener │ → │  StreamDispatcher  │ → │  Consensus │  │
//! │  │  (TCP)   │   │ (thread per conn)  │   │  (handler) │  │
//! │  └──────────┘   └────────────────────┘   └────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each accepted connection runs its dispatcher loop on its own OS thread
//! with explicit, synchronous control flow -- no async runtime. Within one
//! connection there is exactly one outstanding request at a time; replies
//! are sent in arrival order. Cross-connection parallelism comes only from
//! the thread per connection.
//!
//! ## Usage
//!
//! ```ignore
//! use conclave_server::{Replica, ReplicaConfig};
//!
//! let config = ReplicaConfig::new("r1", "0.0.0.0:9432".parse()?);
//! let replica = Replica::new(config)?;
//! replica.listen()?;
//! ```

mod config;
mod dispatch;
mod error;
mod handler;
mod replica;

pub use config::ReplicaConfig;
pub use error::{HandlerError, ServerError, ServerResult};
pub use handler::{Consensus, Placeholder};
pub use replica::Replica;

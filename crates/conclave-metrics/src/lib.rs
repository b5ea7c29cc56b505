//! # conclave-metrics: replica request accounting
//!
//! Tracks the measurable statistics of a replica over time -- how many
//! requests arrived, how many committed or dropped, how many distinct
//! clients were seen -- for post-hoc analysis of consensus experiments.
//!
//! [`MetricsStore`] is the only shared-mutable state in the Conclave core.
//! It is handed to every connection as an explicit `Arc` handle and all
//! access goes through its internal reader/writer lock: mutators take the
//! write lock, [`MetricsStore::snapshot`] and friends take the read lock so
//! the commit/drop/request counters are always observed together.
//!
//! Exported records are JSON Lines: each [`MetricsStore::dump`] call appends
//! exactly one self-contained JSON object to the destination file, so the
//! file accumulates a log of snapshots over time.

mod snapshot;
mod store;

pub use snapshot::MetricsSnapshot;
pub use store::{MetricsError, MetricsResult, MetricsStore};

/// Version tag stamped into every exported metrics record.
pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

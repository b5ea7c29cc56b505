//! The shared metrics store and its JSON Lines export.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::debug;

use crate::PACKAGE_VERSION;
use crate::snapshot::MetricsSnapshot;

/// Result type for metrics operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Errors that can occur while exporting metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The destination file could not be opened or written.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Thread-safe request/commit accounting for one replica.
///
/// Safe under unbounded concurrent callers: every operation goes through
/// the internal reader/writer lock, so readers observe all counters
/// atomically and `commits + drops <= requests` holds at every observation
/// point (given the service discipline of one [`complete`] per prior
/// [`request`]).
///
/// [`request`]: MetricsStore::request
/// [`complete`]: MetricsStore::complete
#[derive(Debug, Default)]
pub struct MetricsStore {
    inner: RwLock<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    started: Option<DateTime<Utc>>,
    finished: Option<DateTime<Utc>>,
    requests: u64,
    commits: u64,
    drops: u64,
    clients: HashSet<String>,
}

impl MetricsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // Counter updates never panic mid-write, so a poisoned lock still holds
    // consistent values; recover the guard instead of propagating.
    fn read(&self) -> RwLockReadGuard<'_, Counters> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Counters> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one inbound request from `client`.
    ///
    /// Adds `client` to the distinct-client set (idempotent), increments the
    /// request count, and latches `started` on the first call -- it is never
    /// overwritten afterwards, even under concurrent callers.
    pub fn request(&self, client: &str) {
        let mut counters = self.write();

        if !counters.clients.contains(client) {
            counters.clients.insert(client.to_string());
        }
        counters.requests += 1;

        if counters.started.is_none() {
            counters.started = Some(Utc::now());
        }
    }

    /// Records the outcome of one prior [`request`](MetricsStore::request).
    ///
    /// Increments `commits` when `committed`, `drops` otherwise, and
    /// overwrites `finished` with the current time (last-writer-wins).
    /// The store does not pair a completion with a specific request; it is
    /// a bare counter increment, and callers are trusted to complete each
    /// request at most once.
    pub fn complete(&self, committed: bool) {
        let mut counters = self.write();

        if committed {
            counters.commits += 1;
        } else {
            counters.drops += 1;
        }
        counters.finished = Some(Utc::now());
    }

    /// Returns a consistent point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.read();
        MetricsSnapshot::derive(
            counters.started,
            counters.finished,
            counters.requests,
            counters.commits,
            counters.drops,
            counters.clients.len(),
        )
    }

    /// Appends one snapshot, merged with `extra` fields, as a single JSON
    /// line to `path`.
    ///
    /// The file is created if absent and never truncated; prior records are
    /// preserved. Standard record fields win over colliding `extra` keys.
    pub fn dump(&self, path: impl AsRef<Path>, extra: &Map<String, Value>) -> MetricsResult<()> {
        let snapshot = self.snapshot();

        let mut record = extra.clone();
        record.insert("metric".to_string(), json!("server"));
        record.insert("version".to_string(), json!(PACKAGE_VERSION));
        record.insert("started".to_string(), rfc3339_nanos(snapshot.started));
        record.insert("finished".to_string(), rfc3339_nanos(snapshot.finished));
        record.insert("requests".to_string(), json!(snapshot.requests));
        record.insert("commits".to_string(), json!(snapshot.commits));
        record.insert("drops".to_string(), json!(snapshot.drops));
        record.insert("clients".to_string(), json!(snapshot.clients));
        record.insert("throughput".to_string(), json!(snapshot.throughput));
        record.insert(
            "duration".to_string(),
            json!(format!("{:?}", snapshot.duration)),
        );

        let mut line = serde_json::to_vec(&Value::Object(record))?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path.as_ref())?;
        file.write_all(&line)?;

        debug!(path = %path.as_ref().display(), "metrics record appended");
        Ok(())
    }

    /// One-line human-readable summary of commits, drops, duration, and
    /// throughput, derived from the same snapshot logic as [`dump`].
    ///
    /// [`dump`]: MetricsStore::dump
    pub fn summary(&self) -> String {
        self.snapshot().summary()
    }
}

fn rfc3339_nanos(at: Option<DateTime<Utc>>) -> Value {
    match at {
        Some(at) => json!(at.to_rfc3339_opts(SecondsFormat::Nanos, true)),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn request_counts_distinct_clients_once() {
        let store = MetricsStore::new();
        store.request("clientA");
        store.request("clientA");
        store.request("clientB");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.requests, 3);
        assert_eq!(snapshot.clients, 2);
    }

    #[test]
    fn started_latches_on_first_request() {
        let store = MetricsStore::new();
        assert!(store.snapshot().started.is_none());

        store.request("clientA");
        let first = store.snapshot().started;
        assert!(first.is_some());

        thread::sleep(Duration::from_millis(5));
        store.request("clientB");
        assert_eq!(store.snapshot().started, first);
    }

    #[test]
    fn started_latch_is_race_free_under_concurrent_requests() {
        let store = Arc::new(MetricsStore::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        store.request(&format!("client{worker}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = store.snapshot();
        assert_eq!(snapshot.requests, 800);
        assert_eq!(snapshot.clients, 8);
        let started = snapshot.started.expect("started must be set");

        // No later request may have moved the latch.
        store.request("late");
        assert_eq!(store.snapshot().started, Some(started));
    }

    #[test]
    fn complete_updates_finished_every_time() {
        let store = MetricsStore::new();
        store.request("clientA");
        store.complete(true);
        let first = store.snapshot().finished;

        thread::sleep(Duration::from_millis(5));
        store.request("clientA");
        store.complete(false);
        let second = store.snapshot().finished;

        assert!(second > first);
    }

    #[test]
    fn throughput_is_zero_without_commits() {
        let store = MetricsStore::new();
        store.request("clientA");
        thread::sleep(Duration::from_millis(5));
        store.complete(false);

        let snapshot = store.snapshot();
        assert!(snapshot.duration > Duration::ZERO);
        assert_eq!(snapshot.throughput, 0.0);
    }

    #[test]
    fn throughput_is_zero_without_duration() {
        let snapshot = MetricsStore::new().snapshot();
        assert_eq!(snapshot.duration, Duration::ZERO);
        assert_eq!(snapshot.throughput, 0.0);
    }

    #[test]
    fn throughput_matches_commits_over_duration() {
        let store = MetricsStore::new();
        for _ in 0..3 {
            store.request("clientA");
        }
        thread::sleep(Duration::from_millis(20));
        for _ in 0..3 {
            store.complete(true);
        }

        let snapshot = store.snapshot();
        let expected = snapshot.commits as f64 / snapshot.duration.as_secs_f64();
        assert!((snapshot.throughput - expected).abs() < 1e-9);
        assert!(snapshot.throughput > 0.0);
    }

    #[test]
    fn summary_renders_counters() {
        let store = MetricsStore::new();
        store.request("clientA");
        store.complete(false);

        let summary = store.summary();
        assert!(summary.contains("0 commits"));
        assert!(summary.contains("1 drops"));
        assert!(summary.contains("commits/sec"));
    }

    #[test]
    fn dump_appends_one_line_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");

        let store = MetricsStore::new();
        store.request("clientA");
        store.complete(true);

        let extra = Map::new();
        store.dump(&path, &extra).unwrap();
        let first_pass = std::fs::read_to_string(&path).unwrap();

        store.request("clientB");
        store.complete(false);
        store.dump(&path, &extra).unwrap();
        let second_pass = std::fs::read_to_string(&path).unwrap();

        let lines: Vec<&str> = second_pass.lines().collect();
        assert_eq!(lines.len(), 2);
        // The first record is preserved byte-for-byte.
        assert!(second_pass.starts_with(&first_pass));

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first["metric"], "server");
        assert_eq!(first["commits"], 1);
        assert_eq!(first["clients"], 1);
        assert_eq!(second["requests"], 2);
        assert_eq!(second["drops"], 1);
        assert_eq!(second["clients"], 2);
    }

    #[test]
    fn dump_merges_extra_fields_without_clobbering_standard_ones() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");

        let store = MetricsStore::new();
        let mut extra = Map::new();
        extra.insert("name".to_string(), json!("r1"));
        extra.insert("metric".to_string(), json!("spoofed"));
        store.dump(&path, &extra).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let record: Value = serde_json::from_str(contents.trim()).unwrap();
        assert_eq!(record["name"], "r1");
        assert_eq!(record["metric"], "server");
        assert_eq!(record["version"], PACKAGE_VERSION);
        assert_eq!(record["started"], Value::Null);
        assert_eq!(record["duration"], "0ns");
    }

    #[test]
    fn dump_surfaces_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetricsStore::new();
        // A directory cannot be opened for appending.
        let result = store.dump(dir.path(), &Map::new());
        assert!(matches!(result, Err(MetricsError::Io(_))));
    }

    /// One step of the service discipline: a request, optionally followed
    /// later by a completion.
    #[derive(Debug, Clone)]
    enum Op {
        Request(u8),
        Complete(bool),
    }

    fn op_sequences() -> impl Strategy<Value = Vec<Op>> {
        prop::collection::vec(
            prop_oneof![
                (0u8..16).prop_map(Op::Request),
                any::<bool>().prop_map(Op::Complete),
            ],
            0..200,
        )
    }

    proptest! {
        /// After every call, `commits + drops <= requests` and all three
        /// counters are non-decreasing. Completions are only issued against
        /// outstanding requests, mirroring how the service brackets each
        /// handler invocation.
        #[test]
        fn counters_preserve_triangle_inequality(ops in op_sequences()) {
            let store = MetricsStore::new();
            let mut outstanding = 0u64;
            let mut prev = store.snapshot();

            for op in ops {
                match op {
                    Op::Request(client) => {
                        store.request(&format!("client{client}"));
                        outstanding += 1;
                    }
                    Op::Complete(committed) => {
                        if outstanding == 0 {
                            continue;
                        }
                        store.complete(committed);
                        outstanding -= 1;
                    }
                }

                let snapshot = store.snapshot();
                prop_assert!(snapshot.commits + snapshot.drops <= snapshot.requests);
                prop_assert!(snapshot.requests >= prev.requests);
                prop_assert!(snapshot.commits >= prev.commits);
                prop_assert!(snapshot.drops >= prev.drops);
                prev = snapshot;
            }
        }

        /// `finished >= started` whenever both are set.
        #[test]
        fn finished_never_precedes_started(completions in 1usize..8) {
            let store = MetricsStore::new();
            store.request("clientA");
            for i in 0..completions {
                if i > 0 {
                    store.request("clientA");
                }
                store.complete(i % 2 == 0);
            }

            let snapshot = store.snapshot();
            prop_assert!(snapshot.finished >= snapshot.started);
        }
    }
}

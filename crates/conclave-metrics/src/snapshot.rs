//! Point-in-time view of the metrics counters.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// A consistent copy of all counters, taken under the read lock.
///
/// `duration` and `throughput` are derived at snapshot time so that every
/// consumer (export, summary, assertions in tests) sees the same values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    /// Time of the first request, unset until one arrives.
    pub started: Option<DateTime<Utc>>,
    /// Time of the most recent completion, unset until one happens.
    pub finished: Option<DateTime<Utc>>,
    /// Total inbound client requests.
    pub requests: u64,
    /// Requests whose outcome was recorded as committed.
    pub commits: u64,
    /// Requests whose outcome was recorded as dropped.
    pub drops: u64,
    /// Number of distinct client identities seen.
    pub clients: usize,
    /// Elapsed time between `started` and `finished`; zero if either is unset.
    pub duration: Duration,
    /// Commits per second over `duration`; zero when `commits` or `duration`
    /// is zero.
    pub throughput: f64,
}

impl MetricsSnapshot {
    pub(crate) fn derive(
        started: Option<DateTime<Utc>>,
        finished: Option<DateTime<Utc>>,
        requests: u64,
        commits: u64,
        drops: u64,
        clients: usize,
    ) -> Self {
        let duration = match (started, finished) {
            (Some(start), Some(end)) => (end - start).to_std().unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        };

        let throughput = if duration.is_zero() || commits == 0 {
            0.0
        } else {
            commits as f64 / duration.as_secs_f64()
        };

        Self {
            started,
            finished,
            requests,
            commits,
            drops,
            clients,
            duration,
            throughput,
        }
    }

    /// One-line human rendering of the snapshot.
    pub fn summary(&self) -> String {
        format!(
            "{} commits, {} drops in {:?} -- {:.3} commits/sec",
            self.commits, self.drops, self.duration, self.throughput
        )
    }
}

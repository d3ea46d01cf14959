use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use mercato_types::PerformanceStat;

/// Success rate assumed for a platform that has never been attempted.
pub const NEUTRAL_SUCCESS_RATE: f64 = 0.5;
/// Average latency, in seconds, assumed for a platform that has never been attempted.
pub const NEUTRAL_LATENCY_SECS: f64 = 5.0;
/// Latency floor, in seconds, applied when scoring.
pub const MIN_LATENCY_SECS: f64 = 0.1;

/// Per-platform running counters.
///
/// Not synchronised on its own; the router keeps it behind its state lock.
#[derive(Debug, Clone, Default)]
pub struct PerformanceTracker {
    stats: HashMap<String, PerformanceStat>,
}

impl PerformanceTracker {
    /// Empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one attempt against `platform`.
    ///
    /// Every call increments exactly one platform's attempt counter; latency is
    /// only accumulated for successes.
    pub fn record(&mut self, platform: &str, success: bool, latency: Duration) {
        self.stats
            .entry(platform.to_string())
            .or_default()
            .record(success, latency);
    }

    /// Counters for `platform`, if it was ever attempted.
    #[must_use]
    pub fn stat(&self, platform: &str) -> Option<PerformanceStat> {
        self.stats.get(platform).copied()
    }

    /// Ranking signal: `success_rate / max(average_latency_secs, 0.1)`.
    ///
    /// Untested platforms score as 0.5 over 5 seconds so they are neither
    /// favoured nor starved; platforms that never succeeded score 0.
    #[must_use]
    pub fn score(&self, platform: &str) -> f64 {
        let (rate, latency) = match self.stats.get(platform) {
            None => (NEUTRAL_SUCCESS_RATE, NEUTRAL_LATENCY_SECS),
            Some(s) if s.total_requests == 0 => (NEUTRAL_SUCCESS_RATE, NEUTRAL_LATENCY_SECS),
            Some(s) => (
                s.success_rate(),
                s.average_latency().map_or(0.0, |d| d.as_secs_f64()),
            ),
        };
        rate / latency.max(MIN_LATENCY_SECS)
    }

    /// Sorted copy of every platform's counters.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, PerformanceStat> {
        self.stats
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Forget every counter.
    pub fn clear(&mut self) {
        self.stats.clear();
    }
}

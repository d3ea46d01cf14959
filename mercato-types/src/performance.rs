use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DataType;

/// Running counters for one platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceStat {
    /// Every attempt, successful or not.
    pub total_requests: u64,
    /// Attempts that returned a payload.
    pub successful_requests: u64,
    /// Summed latency of successful attempts only.
    pub total_latency: Duration,
}

impl PerformanceStat {
    /// Count one attempt. Latency is only accumulated for successes.
    pub fn record(&mut self, success: bool, latency: Duration) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
            self.total_latency += latency;
        }
    }

    /// Fraction of attempts that succeeded; 0 with no attempts.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }

    /// Mean latency of successful attempts; `None` until the first success.
    #[must_use]
    pub fn average_latency(&self) -> Option<Duration> {
        let n = u32::try_from(self.successful_requests).ok()?;
        if n == 0 {
            return None;
        }
        Some(self.total_latency / n)
    }
}

/// One routed request, as kept in the bounded history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// When the request finished.
    pub timestamp: DateTime<Utc>,
    /// Requested data type.
    pub data_type: DataType,
    /// Platforms attempted, in call order.
    pub platforms_tried: Vec<String>,
    /// Overall outcome.
    pub success: bool,
    /// Total wall time of the request.
    pub elapsed: Duration,
}

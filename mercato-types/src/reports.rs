//! Report envelopes produced by the router.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DataType, MercatoError, PerformanceStat, RequestRecord};

/// Diagnostics attached to every [`RoutingResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingMetadata {
    /// Requested data type.
    pub data_type: DataType,
    /// Platform whose payload was accepted; `Some` iff the request succeeded.
    pub platform_used: Option<String>,
    /// Platforms actually attempted, in call order. Never contains disabled platforms.
    pub platforms_tried: Vec<String>,
    /// Per-attempt failures, in call order.
    pub errors: Vec<MercatoError>,
    /// Latency of the attempt that produced `data`, if any.
    pub platform_elapsed: Option<Duration>,
    /// Total wall time of the request.
    pub elapsed: Duration,
    /// True when the accepted payload went through the quality gate and passed it.
    /// False when the gate was disabled for the call.
    pub quality_passed: bool,
}

impl RoutingMetadata {
    /// Empty metadata for a request that has not attempted anything yet.
    #[must_use]
    pub const fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            platform_used: None,
            platforms_tried: Vec::new(),
            errors: Vec::new(),
            platform_elapsed: None,
            elapsed: Duration::ZERO,
            quality_passed: false,
        }
    }
}

/// Structured outcome of a routed request.
///
/// Provider exceptions and quality failures never surface as `Err`; they are
/// reported here with the full attempt trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingResult {
    /// Overall outcome.
    pub success: bool,
    /// Payload. On failure this may still carry a low-quality payload for inspection.
    pub data: Option<String>,
    /// Present iff `success` is false.
    pub error: Option<MercatoError>,
    /// Attempt trail and timings.
    pub metadata: RoutingMetadata,
}

impl RoutingResult {
    /// Successful outcome from `platform`.
    #[must_use]
    pub fn success(mut metadata: RoutingMetadata, platform: &str, data: String) -> Self {
        metadata.platform_used = Some(platform.to_string());
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata,
        }
    }

    /// Failed outcome, optionally carrying a rejected payload.
    #[must_use]
    pub fn failure(
        mut metadata: RoutingMetadata,
        error: MercatoError,
        data: Option<String>,
    ) -> Self {
        metadata.platform_used = None;
        Self {
            success: false,
            data,
            error: Some(error),
            metadata,
        }
    }

    /// Accepted payload, only when the request succeeded.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        if self.success {
            self.data.as_deref()
        } else {
            None
        }
    }
}

/// Snapshot of router performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Per-platform counters.
    pub platforms: BTreeMap<String, PerformanceStat>,
    /// Number of requests currently held in history.
    pub total_requests: usize,
    /// Most recent history entries, oldest first.
    pub recent_requests: Vec<RequestRecord>,
    /// Current ranked candidate list per configured data type.
    pub rankings: BTreeMap<DataType, Vec<String>>,
}

/// Pipeline-level aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetadata {
    /// Number of tasks submitted.
    pub total_tasks: usize,
    /// Number of tasks whose result succeeded.
    pub successful_tasks: usize,
    /// `successful_tasks / total_tasks`, 0 for an empty pipeline.
    pub success_rate: f64,
    /// Wall time of the whole pipeline.
    pub elapsed: Duration,
}

/// Results of a pipeline run keyed by task name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Task name -> routing result.
    pub results: HashMap<String, RoutingResult>,
    /// Task names in execution order.
    pub order: Vec<String>,
    /// Pipeline-level aggregates.
    pub metadata: PipelineMetadata,
}

impl PipelineReport {
    /// Result for the named task.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RoutingResult> {
        self.results.get(name)
    }

    /// Results in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RoutingResult)> {
        self.order
            .iter()
            .filter_map(|name| self.results.get(name).map(|r| (name.as_str(), r)))
    }
}

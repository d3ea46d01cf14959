//! Mercato routes data requests across multiple data platforms.
//!
//! Overview
//! - Platforms are provider adapters implementing [`DataConnector`]; each serves a
//!   fixed set of [`DataType`]s recorded in the [`CapabilityRegistry`].
//! - A persisted [`ConfigStore`] holds per-platform settings (enabled flag, static
//!   priority, default parameters), per-data-type preference lists, quality rules
//!   and the process-wide [`FallbackStrategy`].
//! - The [`Mercato`] router orders candidates, attempts them with fallback,
//!   quality-gates payloads and records per-platform performance.
//!
//! Key behaviors and trade-offs
//! - Ordering: static priority is the primary key so operators keep override
//!   power; the live performance score (success rate over average latency) only
//!   breaks ties within a priority tier.
//! - Fallback: the per-call flag and the configured strategy must both allow it;
//!   `fail` aborts on the first failure whatever the caller asked.
//! - Quality gate: syntactic only. It rejects blank payloads, known failure
//!   phrases, too few lines and missing fields; it cannot spot wrong but
//!   well-formed data. Extra checks can be registered per data type.
//! - Timeouts: every provider call is bounded; a timeout is a failed attempt.
//! - Errors: provider and quality failures come back as a structured
//!   [`RoutingResult`] with the full attempt trail. Only configuration mistakes
//!   are returned as `Err`.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use mercato::{ConfigStore, DataType, Mercato, PipelineTask, RouteOptions};
//!
//! let store = Arc::new(ConfigStore::open("config/data_config.json")?);
//! let mercato = Mercato::builder()
//!     .with_connector(akshare)
//!     .with_connector(tushare)
//!     .config_store(store)
//!     .build()?;
//!
//! let bars = mercato.route(DataType::StockData, &params).await;
//! if let Some(text) = bars.payload() {
//!     println!("{} via {:?}", text, bars.metadata.platform_used);
//! }
//!
//! let side_by_side = mercato.multi_platform(DataType::News, &params, None).await;
//!
//! let report = mercato
//!     .run_pipeline(&[
//!         PipelineTask::new(DataType::StockData).named("bars"),
//!         PipelineTask::new(DataType::News).named("news").enable_fallback(false),
//!     ])
//!     .await?;
//! println!("{:.0}% tasks succeeded", report.metadata.success_rate * 100.0);
//!
//! mercato.optimize_preferences()?;
//! ```
#![warn(missing_docs)]

mod core;
mod router;

pub use crate::core::{Mercato, MercatoBuilder};
pub use router::pipeline::PipelineBuilder;

pub use mercato_core::{
    CapabilityRegistry, ConfigStore, DataConnector, FailureIndicators, FnConnector, QualityCheck,
    QualityGate, QualityIssue, merge_params,
};
pub use mercato_types::{
    CacheSettings, DataConfig, DataType, FallbackStrategy, MercatoError, Params,
    PerformanceReport, PerformanceStat, PipelineMetadata, PipelineReport, PipelineTask,
    PlannedTask, PlatformSettings, QualityRule, RequestRecord, RouteOptions, RouterConfig,
    RoutingMetadata, RoutingResult, TaskRequest,
};

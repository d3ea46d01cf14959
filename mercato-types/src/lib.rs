//! Mercato-specific data transfer objects and configuration primitives.
//!
//! Everything in this crate is plain data: the closed set of [`DataType`]s, the
//! persisted configuration document ([`DataConfig`]), runtime router tuning
//! ([`RouterConfig`]), per-platform [`PerformanceStat`]s, [`RequestRecord`]s and
//! the structured [`RoutingResult`] handed back to callers.
#![warn(missing_docs)]

mod config;
mod data_type;
mod error;
mod performance;
mod reports;
mod request;

pub use config::{
    CacheSettings, DataConfig, FallbackStrategy, PlatformSettings, QualityRule, RouterConfig,
    DEFAULT_PRIORITY,
};
pub use data_type::DataType;
pub use error::MercatoError;
pub use performance::{PerformanceStat, RequestRecord};
pub use reports::{
    PerformanceReport, PipelineMetadata, PipelineReport, RoutingMetadata, RoutingResult,
};
pub use request::{PipelineTask, PlannedTask, RouteOptions, TaskRequest};

/// Flat set of named request parameters handed to provider adapters.
///
/// Platform defaults and caller values are merged into one map before dispatch;
/// caller values win on key collision.
pub type Params = serde_json::Map<String, serde_json::Value>;

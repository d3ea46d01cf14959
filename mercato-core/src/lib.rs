//! mercato-core
//!
//! Building blocks shared by the mercato router and its connectors.
//!
//! - `connector`: the `DataConnector` trait every provider adapter implements,
//!   plus `FnConnector` for building one out of per-data-type handlers.
//! - `registry`: the immutable `(platform, data type) -> connector` table.
//! - `config_store`: the persisted routing configuration document.
//! - `quality`: the syntactic quality gate applied to provider payloads.
//! - `performance` / `history`: per-platform counters and the bounded request log.
//!
//! Nothing in this crate performs routing decisions; see the `mercato` crate.
#![warn(missing_docs)]

/// Provider adapter contract.
pub mod connector;
/// Persisted routing configuration.
pub mod config_store;
/// Bounded request history.
pub mod history;
/// Per-platform performance counters and scoring.
pub mod performance;
/// Payload quality gate.
pub mod quality;
/// Capability registry.
pub mod registry;

pub use config_store::ConfigStore;
pub use connector::{DataConnector, FnConnector};
pub use history::RequestHistory;
pub use performance::PerformanceTracker;
pub use quality::{FailureIndicators, QualityCheck, QualityGate, QualityIssue};
pub use registry::CapabilityRegistry;

pub use mercato_types::*;

/// Merge platform defaults with caller parameters; caller values win on collision.
#[must_use]
pub fn merge_params(defaults: &Params, overrides: &Params) -> Params {
    let mut merged = defaults.clone();
    for (k, v) in overrides {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

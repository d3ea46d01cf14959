//! Request descriptors accepted by the router and the configuration planner.

use serde::{Deserialize, Serialize};

use crate::{DataType, Params};

/// Per-call routing options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Explicit candidate list, used verbatim instead of the configured preferences.
    pub platforms: Option<Vec<String>>,
    /// Move on to the next candidate after a failure.
    pub enable_fallback: bool,
    /// Run payloads through the quality gate.
    pub quality_check: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            platforms: None,
            enable_fallback: true,
            quality_check: true,
        }
    }
}

impl RouteOptions {
    /// Restrict routing to the given candidates.
    #[must_use]
    pub fn platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = Some(platforms.into_iter().map(Into::into).collect());
        self
    }

    /// Toggle fallback to the next candidate.
    #[must_use]
    pub const fn enable_fallback(mut self, yes: bool) -> Self {
        self.enable_fallback = yes;
        self
    }

    /// Toggle the quality gate.
    #[must_use]
    pub const fn quality_check(mut self, yes: bool) -> Self {
        self.quality_check = yes;
        self
    }
}

/// One task of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTask {
    /// Result key; defaults to `task_{index}`.
    #[serde(default)]
    pub name: Option<String>,
    /// Requested data type.
    pub data_type: DataType,
    /// Caller parameters.
    #[serde(default)]
    pub params: Params,
    /// Explicit candidate list.
    #[serde(default)]
    pub platforms: Option<Vec<String>>,
    /// Defaults to true.
    #[serde(default)]
    pub enable_fallback: Option<bool>,
    /// Defaults to true.
    #[serde(default)]
    pub quality_check: Option<bool>,
}

impl PipelineTask {
    /// Task for `data_type` with no parameters and default options.
    #[must_use]
    pub fn new(data_type: DataType) -> Self {
        Self {
            name: None,
            data_type,
            params: Params::new(),
            platforms: None,
            enable_fallback: None,
            quality_check: None,
        }
    }

    /// Set the result key.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the caller parameters.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Restrict routing to the given candidates.
    #[must_use]
    pub fn platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = Some(platforms.into_iter().map(Into::into).collect());
        self
    }

    /// Toggle fallback for this task.
    #[must_use]
    pub const fn enable_fallback(mut self, yes: bool) -> Self {
        self.enable_fallback = Some(yes);
        self
    }

    /// Toggle the quality gate for this task.
    #[must_use]
    pub const fn quality_check(mut self, yes: bool) -> Self {
        self.quality_check = Some(yes);
        self
    }

    /// Routing options this task resolves to.
    #[must_use]
    pub fn options(&self) -> RouteOptions {
        RouteOptions {
            platforms: self.platforms.clone(),
            enable_fallback: self.enable_fallback.unwrap_or(true),
            quality_check: self.quality_check.unwrap_or(true),
        }
    }
}

/// Input to configuration-driven task planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Requested data type.
    pub data_type: DataType,
    /// Caller parameters.
    #[serde(default)]
    pub params: Params,
}

/// A planned dispatch: platform chosen from configuration plus merged parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    /// Selected platform.
    pub platform: String,
    /// Requested data type.
    pub data_type: DataType,
    /// Platform defaults merged with caller parameters (caller wins).
    pub params: Params,
}

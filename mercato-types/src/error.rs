use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DataType;

/// Unified error type for the mercato workspace.
///
/// Configuration-validation problems are returned to callers as `Err`. Provider
/// failures, timeouts and quality rejections are folded by the router into a
/// [`RoutingResult`](crate::RoutingResult) and only appear here as entries of
/// its attempt trail.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MercatoError {
    /// A configuration setter received a value outside its allowed domain.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Dispatch targeted a platform that has no registered connector.
    #[error("unknown platform: {platform}")]
    UnknownPlatform {
        /// Platform identifier that was requested.
        platform: String,
    },

    /// The platform is registered but does not serve the requested data type.
    #[error("platform {platform} does not support {data_type}")]
    UnknownCapability {
        /// Platform identifier that was requested.
        platform: String,
        /// Requested data type.
        data_type: DataType,
    },

    /// The platform is disabled in configuration.
    #[error("platform {platform} is disabled")]
    PlatformDisabled {
        /// Disabled platform identifier.
        platform: String,
    },

    /// A provider adapter returned an error.
    #[error("{platform} failed: {msg}")]
    Provider {
        /// Platform that failed.
        platform: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A provider adapter exceeded the configured timeout.
    #[error("provider timed out: {data_type} via {platform}")]
    ProviderTimeout {
        /// Platform that timed out.
        platform: String,
        /// Data type being fetched.
        data_type: DataType,
    },

    /// A payload was obtained but rejected by the quality gate.
    #[error("{platform} returned data below quality requirements: {reason}")]
    DataQuality {
        /// Platform that produced the payload.
        platform: String,
        /// Why the payload was rejected.
        reason: String,
    },

    /// No enabled platform is configured for the data type.
    #[error("no platform available for data type {data_type}")]
    NoPlatform {
        /// Requested data type.
        data_type: DataType,
    },

    /// Every candidate was attempted without a quality-passing success.
    #[error("all platforms failed for {data_type}: {}", join_messages(.errors))]
    AllPlatformsFailed {
        /// Requested data type.
        data_type: DataType,
        /// Individual attempt failures in call order.
        errors: Vec<MercatoError>,
    },

    /// Reading or writing the configuration document failed.
    #[error("configuration persistence failed: {0}")]
    Persistence(String),
}

fn join_messages(errors: &[MercatoError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl MercatoError {
    /// Helper: build a `Provider` error with the platform name and message.
    pub fn provider(platform: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Provider {
            platform: platform.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `UnknownPlatform` error.
    pub fn unknown_platform(platform: impl Into<String>) -> Self {
        Self::UnknownPlatform {
            platform: platform.into(),
        }
    }

    /// Helper: build an `UnknownCapability` error.
    pub fn unknown_capability(platform: impl Into<String>, data_type: DataType) -> Self {
        Self::UnknownCapability {
            platform: platform.into(),
            data_type,
        }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(platform: impl Into<String>, data_type: DataType) -> Self {
        Self::ProviderTimeout {
            platform: platform.into(),
            data_type,
        }
    }

    /// Helper: build a `DataQuality` error.
    pub fn data_quality(platform: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataQuality {
            platform: platform.into(),
            reason: reason.into(),
        }
    }

    /// Helper: build a `Persistence` error from any displayable cause.
    pub fn persistence(cause: impl core::fmt::Display) -> Self {
        Self::Persistence(cause.to_string())
    }

    /// Returns true for soft quality rejections (payload obtained, but rejected).
    #[must_use]
    pub const fn is_quality(&self) -> bool {
        matches!(self, Self::DataQuality { .. })
    }

    /// Flatten nested `AllPlatformsFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllPlatformsFailed { errors, .. } => {
                errors.into_iter().flat_map(Self::flatten).collect()
            }
            other => vec![other],
        }
    }
}

impl From<serde_json::Error> for MercatoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

impl From<std::io::Error> for MercatoError {
    fn from(e: std::io::Error) -> Self {
        Self::Persistence(e.to_string())
    }
}

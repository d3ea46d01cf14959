//! Configuration types: the persisted routing document and runtime router tuning.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{DataType, MercatoError, Params};

/// Priority assigned to platforms without an explicit setting; sorts them last.
pub const DEFAULT_PRIORITY: i64 = 999;

/// Process-wide policy for moving on to the next candidate after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Try the configured candidates in order until one succeeds.
    #[default]
    NextAvailable,
    /// Like `NextAvailable`, but extend configured candidates with every other
    /// enabled platform able to serve the data type.
    AllPlatforms,
    /// Abort on the first invocation or quality failure, whatever the caller asked.
    Fail,
}

impl FallbackStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: &'static [Self] = &[Self::NextAvailable, Self::AllPlatforms, Self::Fail];

    /// Stable identifier used in the configuration document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NextAvailable => "next_available",
            Self::AllPlatforms => "all_platforms",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for FallbackStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FallbackStrategy {
    type Err = MercatoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|st| st.as_str()).collect();
                MercatoError::InvalidConfiguration(format!(
                    "invalid fallback strategy '{s}', expected one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

const fn enabled_default() -> bool {
    true
}

const fn priority_default() -> i64 {
    DEFAULT_PRIORITY
}

const fn min_data_points_default() -> usize {
    1
}

const fn ttl_hours_default() -> u32 {
    24
}

/// Per-platform settings: enabled flag, static priority and default parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// Disabled platforms are never attempted. Missing means enabled.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Lower is more preferred.
    #[serde(default = "priority_default")]
    pub priority: i64,
    /// Parameters merged under the caller's parameters on every dispatch.
    #[serde(default)]
    pub default_params: Params,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: DEFAULT_PRIORITY,
            default_params: Params::new(),
        }
    }
}

impl PlatformSettings {
    /// Enabled settings with the given priority and default parameters.
    #[must_use]
    pub fn new(priority: i64, default_params: Params) -> Self {
        Self {
            enabled: true,
            priority,
            default_params,
        }
    }
}

/// Syntactic acceptance rule for payloads of one data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityRule {
    /// Minimum number of non-blank lines.
    #[serde(default = "min_data_points_default")]
    pub min_data_points: usize,
    /// Substrings that must all be present.
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Reject payloads containing a known failure phrase.
    #[serde(default = "enabled_default")]
    pub scan_failure_indicators: bool,
}

impl Default for QualityRule {
    fn default() -> Self {
        Self {
            min_data_points: 1,
            required_fields: Vec::new(),
            scan_failure_indicators: true,
        }
    }
}

/// Advisory cache settings; carried in the document but not enforced by the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Whether callers should cache results.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    /// Suggested time-to-live in hours.
    #[serde(default = "ttl_hours_default")]
    pub ttl_hours: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: 24,
        }
    }
}

/// The persisted routing configuration document.
///
/// `Default` is an empty document; [`DataConfig::builtin`] is the bootstrap
/// configuration written when no document exists yet. Missing top-level keys
/// deserialize to their empty defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Data type -> ordered platform identifiers (static preference).
    pub platform_preferences: BTreeMap<DataType, Vec<String>>,
    /// Platform identifier -> settings.
    pub platform_settings: BTreeMap<String, PlatformSettings>,
    /// Data type -> quality rule.
    pub data_quality_rules: BTreeMap<DataType, QualityRule>,
    /// Process-wide fallback strategy.
    pub fallback_strategy: FallbackStrategy,
    /// Advisory cache settings.
    pub cache_settings: CacheSettings,
}

fn params(value: serde_json::Value) -> Params {
    match value {
        serde_json::Value::Object(map) => map,
        _ => Params::new(),
    }
}

fn platforms(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| (*p).to_string()).collect()
}

impl DataConfig {
    /// Built-in bootstrap configuration.
    #[must_use]
    pub fn builtin() -> Self {
        let platform_preferences = BTreeMap::from([
            (DataType::StockData, platforms(&["akshare", "tushare"])),
            (
                DataType::FinancialData,
                platforms(&["akshare", "tushare", "simfin"]),
            ),
            (
                DataType::FinancialIndicators,
                platforms(&["akshare", "tushare"]),
            ),
            (DataType::News, platforms(&["akshare", "google", "finnhub"])),
            (
                DataType::TechnicalIndicators,
                platforms(&["stockstats", "myquant"]),
            ),
            (DataType::MarketData, platforms(&["akshare", "myquant"])),
            (DataType::MacroData, platforms(&["akshare"])),
            (DataType::Sentiment, platforms(&["myquant"])),
            (DataType::Backtest, platforms(&["myquant"])),
        ]);

        let platform_settings = BTreeMap::from([
            (
                "akshare".to_string(),
                PlatformSettings::new(1, params(json!({"period": "daily", "adjust": "qfq"}))),
            ),
            ("tushare".to_string(), PlatformSettings::new(2, Params::new())),
            (
                "myquant".to_string(),
                PlatformSettings::new(3, params(json!({"frequency": "1d"}))),
            ),
            ("finnhub".to_string(), PlatformSettings::new(4, Params::new())),
            ("yfinance".to_string(), PlatformSettings::new(5, Params::new())),
            ("google".to_string(), PlatformSettings::new(6, Params::new())),
            (
                "reddit".to_string(),
                PlatformSettings::new(7, params(json!({"max_limit_per_day": 10}))),
            ),
            (
                "simfin".to_string(),
                PlatformSettings::new(8, params(json!({"freq": "annual"}))),
            ),
            (
                "stockstats".to_string(),
                PlatformSettings::new(9, params(json!({"online": false}))),
            ),
        ]);

        let data_quality_rules = BTreeMap::from([
            (
                DataType::StockData,
                QualityRule {
                    min_data_points: 10,
                    required_fields: platforms(&["date", "open", "high", "low", "close", "volume"]),
                    scan_failure_indicators: true,
                },
            ),
            (
                DataType::FinancialData,
                QualityRule {
                    min_data_points: 1,
                    required_fields: platforms(&["period"]),
                    scan_failure_indicators: true,
                },
            ),
        ]);

        Self {
            platform_preferences,
            platform_settings,
            data_quality_rules,
            fallback_strategy: FallbackStrategy::NextAvailable,
            cache_settings: CacheSettings::default(),
        }
    }

    /// Settings for `platform`, or permissive defaults when unconfigured.
    #[must_use]
    pub fn settings(&self, platform: &str) -> PlatformSettings {
        self.platform_settings
            .get(platform)
            .cloned()
            .unwrap_or_default()
    }

    /// Enabled flag for `platform`; unknown platforms are enabled.
    #[must_use]
    pub fn is_enabled(&self, platform: &str) -> bool {
        self.platform_settings
            .get(platform)
            .is_none_or(|s| s.enabled)
    }

    /// Static priority for `platform`; unknown platforms get [`DEFAULT_PRIORITY`].
    #[must_use]
    pub fn priority(&self, platform: &str) -> i64 {
        self.platform_settings
            .get(platform)
            .map_or(DEFAULT_PRIORITY, |s| s.priority)
    }
}

impl fmt::Display for DataConfig {
    /// Human-readable summary: platform states, preferences, fallback and cache.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "platforms:")?;
        for (platform, s) in &self.platform_settings {
            let state = if s.enabled { "enabled" } else { "disabled" };
            writeln!(f, "  {platform}: {state} (priority {})", s.priority)?;
        }
        writeln!(f, "preferences:")?;
        for (data_type, list) in &self.platform_preferences {
            let enabled: Vec<&str> = list
                .iter()
                .filter(|p| self.is_enabled(p))
                .map(String::as_str)
                .collect();
            writeln!(f, "  {data_type}: {}", enabled.join(" -> "))?;
        }
        writeln!(f, "fallback strategy: {}", self.fallback_strategy)?;
        let cache = if self.cache_settings.enabled {
            "enabled"
        } else {
            "disabled"
        };
        write!(
            f,
            "cache: {cache} (ttl {}h)",
            self.cache_settings.ttl_hours
        )
    }
}

/// Runtime tuning for the router. Not persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Upper bound on a single provider call; exceeding it counts as a failed attempt.
    pub provider_timeout: Duration,
    /// Maximum number of concurrent provider calls in multi-platform fan-out.
    pub max_concurrency: usize,
    /// History length that triggers truncation.
    pub history_capacity: usize,
    /// Number of most recent records kept when truncating.
    pub history_retain: usize,
    /// Number of history entries included in performance reports.
    pub recent_history: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(30),
            max_concurrency: 4,
            history_capacity: 1000,
            history_retain: 500,
            recent_history: 10,
        }
    }
}

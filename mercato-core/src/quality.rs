//! Syntactic quality gate for provider payloads.
//!
//! A gate is an ordered list of [`QualityCheck`]s; the first failing check
//! rejects the payload. [`QualityGate::from_rule`] builds the standard chain from
//! a configured [`QualityRule`]: non-blank, failure-phrase scan, minimum line
//! count, required fields. Callers can append their own checks per data type.
//!
//! The gate cannot tell wrong-but-well-formed data from correct data.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use mercato_types::QualityRule;

/// Why a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QualityIssue {
    /// Payload is empty or whitespace only.
    #[error("payload is empty")]
    Empty,
    /// Payload contains a phrase providers use to report failure.
    #[error("payload contains failure indicator '{token}' ({language})")]
    FailureIndicator {
        /// The matched phrase.
        token: &'static str,
        /// Language tag of the indicator set that matched.
        language: &'static str,
    },
    /// Fewer non-blank lines than required.
    #[error("payload has {found} non-blank lines, {required} required")]
    TooFewLines {
        /// Non-blank lines found.
        found: usize,
        /// Configured minimum.
        required: usize,
    },
    /// A required field name is absent.
    #[error("payload is missing required field '{0}'")]
    MissingField(String),
    /// Rejected by a caller-supplied check.
    #[error("{0}")]
    Custom(String),
}

/// One acceptance rule over a payload.
pub trait QualityCheck: Send + Sync {
    /// Accept or reject `payload`.
    ///
    /// # Errors
    /// Returns the reason the payload is rejected.
    fn check(&self, payload: &str) -> Result<(), QualityIssue>;
}

impl<F> QualityCheck for F
where
    F: Fn(&str) -> Result<(), QualityIssue> + Send + Sync,
{
    fn check(&self, payload: &str) -> Result<(), QualityIssue> {
        self(payload)
    }
}

/// Rejects empty and whitespace-only payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonBlank;

impl QualityCheck for NonBlank {
    fn check(&self, payload: &str) -> Result<(), QualityIssue> {
        if payload.trim().is_empty() {
            Err(QualityIssue::Empty)
        } else {
            Ok(())
        }
    }
}

/// Language-tagged set of phrases providers emit instead of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureIndicators {
    language: &'static str,
    tokens: &'static [&'static str],
}

impl FailureIndicators {
    /// Chinese provider messages: "error", "failed", "not obtained".
    pub const CHINESE: Self = Self {
        language: "zh",
        tokens: &["错误", "失败", "未获取到"],
    };

    /// English provider messages.
    pub const ENGLISH: Self = Self {
        language: "en",
        tokens: &["Error", "Failed", "No data"],
    };

    /// Every built-in set.
    pub const BUILTIN: &'static [Self] = &[Self::CHINESE, Self::ENGLISH];

    /// Custom indicator set.
    #[must_use]
    pub const fn new(language: &'static str, tokens: &'static [&'static str]) -> Self {
        Self { language, tokens }
    }

    /// Language tag.
    #[must_use]
    pub const fn language(&self) -> &'static str {
        self.language
    }
}

impl QualityCheck for FailureIndicators {
    fn check(&self, payload: &str) -> Result<(), QualityIssue> {
        match self.tokens.iter().find(|t| payload.contains(**t)) {
            Some(token) => Err(QualityIssue::FailureIndicator {
                token: *token,
                language: self.language,
            }),
            None => Ok(()),
        }
    }
}

/// Requires a minimum number of non-blank lines.
#[derive(Debug, Clone, Copy)]
pub struct MinLines(pub usize);

impl QualityCheck for MinLines {
    fn check(&self, payload: &str) -> Result<(), QualityIssue> {
        let found = payload.lines().filter(|l| !l.trim().is_empty()).count();
        if found < self.0 {
            Err(QualityIssue::TooFewLines {
                found,
                required: self.0,
            })
        } else {
            Ok(())
        }
    }
}

/// Requires every listed substring to be present.
#[derive(Debug, Clone, Default)]
pub struct RequiredFields(pub Vec<String>);

impl QualityCheck for RequiredFields {
    fn check(&self, payload: &str) -> Result<(), QualityIssue> {
        match self.0.iter().find(|f| !payload.contains(f.as_str())) {
            Some(missing) => Err(QualityIssue::MissingField(missing.clone())),
            None => Ok(()),
        }
    }
}

/// Ordered chain of checks.
#[derive(Clone, Default)]
pub struct QualityGate {
    checks: Vec<Arc<dyn QualityCheck>>,
}

impl fmt::Debug for QualityGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QualityGate")
            .field("checks", &self.checks.len())
            .finish()
    }
}

impl QualityGate {
    /// Standard chain for a configured rule.
    #[must_use]
    pub fn from_rule(rule: &QualityRule) -> Self {
        let mut gate = Self::default().with_check(Arc::new(NonBlank));
        if rule.scan_failure_indicators {
            for set in FailureIndicators::BUILTIN {
                gate = gate.with_check(Arc::new(*set));
            }
        }
        gate.with_check(Arc::new(MinLines(rule.min_data_points)))
            .with_check(Arc::new(RequiredFields(rule.required_fields.clone())))
    }

    /// Append a check; it runs after the existing ones.
    #[must_use]
    pub fn with_check(mut self, check: Arc<dyn QualityCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Run every check in order.
    ///
    /// # Errors
    /// Returns the first rejection.
    pub fn validate(&self, payload: &str) -> Result<(), QualityIssue> {
        self.checks.iter().try_for_each(|c| c.check(payload))
    }
}

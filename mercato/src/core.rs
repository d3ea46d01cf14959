use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use mercato_core::{
    CapabilityRegistry, ConfigStore, DataConfig, DataConnector, DataType, FallbackStrategy,
    MercatoError, PerformanceTracker, QualityCheck, QualityGate, RequestHistory, RouterConfig,
};

/// Mutable routing state shared by every caller of one [`Mercato`].
///
/// Held under a single lock that is never kept across a provider call.
pub(crate) struct RouterState {
    pub(crate) tracker: PerformanceTracker,
    pub(crate) history: RequestHistory,
}

/// Router that selects, orders and falls back across data platforms.
pub struct Mercato {
    pub(crate) registry: CapabilityRegistry,
    pub(crate) config: Arc<ConfigStore>,
    pub(crate) cfg: RouterConfig,
    pub(crate) validators: HashMap<DataType, Vec<Arc<dyn QualityCheck>>>,
    pub(crate) state: Mutex<RouterState>,
}

/// Builder for constructing a [`Mercato`] router.
pub struct MercatoBuilder {
    connectors: Vec<Arc<dyn DataConnector>>,
    config: Option<Arc<ConfigStore>>,
    cfg: RouterConfig,
    validators: HashMap<DataType, Vec<Arc<dyn QualityCheck>>>,
}

impl Default for MercatoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MercatoBuilder {
    /// Create a new builder with default tuning.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no connectors; you must register at least one via [`with_connector`](Self::with_connector).
    /// - Without an explicit [`config_store`](Self::config_store) the router uses an
    ///   in-memory copy of the built-in configuration; nothing is persisted.
    /// - Defaults: 30s provider timeout, 4 concurrent calls for fan-out, history
    ///   truncated from 1000 to 500 entries.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            config: None,
            cfg: RouterConfig::default(),
            validators: HashMap::new(),
        }
    }

    /// Register a provider connector. Its `name()` is the platform identifier
    /// used by the configuration document.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn DataConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Use a shared configuration store.
    ///
    /// The store outlives the router and can be mutated by other holders; the
    /// router reads it on every request.
    #[must_use]
    pub fn config_store(mut self, store: Arc<ConfigStore>) -> Self {
        self.config = Some(store);
        self
    }

    /// Replace every runtime tuning knob at once.
    #[must_use]
    pub fn router_config(mut self, cfg: RouterConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the per-provider call timeout.
    ///
    /// A call that exceeds it counts as a failed attempt and is eligible for fallback.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Bound the number of concurrent provider calls in multi-platform fan-out.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.cfg.max_concurrency = n;
        self
    }

    /// Set the history truncation policy: once longer than `capacity`, keep the
    /// `retain` most recent records.
    #[must_use]
    pub const fn history_limits(mut self, capacity: usize, retain: usize) -> Self {
        self.cfg.history_capacity = capacity;
        self.cfg.history_retain = retain;
        self
    }

    /// Append a quality check for `data_type`. It runs after the configured rule.
    #[must_use]
    pub fn validator(mut self, data_type: DataType, check: Arc<dyn QualityCheck>) -> Self {
        self.validators.entry(data_type).or_default().push(check);
        self
    }

    /// Build the router.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connectors were registered, two connectors share
    /// a name, or `max_concurrency` is zero.
    pub fn build(self) -> Result<Mercato, MercatoError> {
        if self.connectors.is_empty() {
            return Err(MercatoError::InvalidArg(
                "no connectors registered; add at least one via with_connector(...)".to_string(),
            ));
        }
        if self.cfg.max_concurrency == 0 {
            return Err(MercatoError::InvalidArg(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        let registry = CapabilityRegistry::new(self.connectors)?;
        let config = self
            .config
            .unwrap_or_else(|| Arc::new(ConfigStore::in_memory(DataConfig::builtin())));
        let history = RequestHistory::new(self.cfg.history_capacity, self.cfg.history_retain);

        Ok(Mercato {
            registry,
            config,
            cfg: self.cfg,
            validators: self.validators,
            state: Mutex::new(RouterState {
                tracker: PerformanceTracker::new(),
                history,
            }),
        })
    }
}

/// Attribute a connector error to `platform`.
///
/// Errors that already name their platform pass through; anything else is
/// wrapped as a `Provider` failure.
pub fn tag_err(platform: &str, e: MercatoError) -> MercatoError {
    match e {
        e @ (MercatoError::Provider { .. }
        | MercatoError::ProviderTimeout { .. }
        | MercatoError::UnknownPlatform { .. }
        | MercatoError::UnknownCapability { .. }
        | MercatoError::PlatformDisabled { .. }
        | MercatoError::DataQuality { .. }) => e,
        other => MercatoError::provider(platform, other.to_string()),
    }
}

impl Mercato {
    /// Start building a new router.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use mercato::{ConfigStore, DataType, Mercato};
    ///
    /// let store = Arc::new(ConfigStore::open("config/data_config.json")?);
    /// let mercato = Mercato::builder()
    ///     .with_connector(akshare.clone())
    ///     .with_connector(tushare.clone())
    ///     .config_store(store)
    ///     .provider_timeout(std::time::Duration::from_secs(10))
    ///     .build()?;
    ///
    /// let result = mercato.route(DataType::StockData, &params).await;
    /// ```
    #[must_use]
    pub fn builder() -> MercatoBuilder {
        MercatoBuilder::new()
    }

    /// Wrap a provider future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mercato::core::provider_call_with_timeout",
            skip(fut),
            fields(
                platform = platform,
                data_type = %data_type,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        platform: &str,
        data_type: DataType,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, MercatoError>
    where
        Fut: core::future::Future<Output = Result<T, MercatoError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(MercatoError::provider_timeout(platform, data_type)))
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Order `platforms` by (static priority ascending, performance score
    /// descending). The sort is stable, so ties keep their source order.
    pub(crate) fn ordered(&self, platforms: Vec<String>) -> Vec<String> {
        let scores: Vec<f64> = {
            let st = self.state();
            platforms.iter().map(|p| st.tracker.score(p)).collect()
        };
        let mut keyed: Vec<(i64, f64, String)> = platforms
            .into_iter()
            .zip(scores)
            .map(|(p, s)| (self.config.platform_priority(&p), s, p))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.total_cmp(&a.1)));
        keyed.into_iter().map(|(_, _, p)| p).collect()
    }

    /// Ordered candidates for `data_type`.
    ///
    /// An explicit list is the whole candidate set. Otherwise the enabled
    /// preference list is used and, under [`FallbackStrategy::AllPlatforms`],
    /// extended with every other enabled registered platform serving the data
    /// type, ranked among themselves and placed after the configured ones.
    pub(crate) fn candidates(&self, data_type: DataType, explicit: Option<&[String]>) -> Vec<String> {
        if let Some(list) = explicit {
            return self.ordered(list.to_vec());
        }
        let configured = self.config.enabled_platforms(Some(data_type));
        let mut out = self.ordered(configured.clone());
        if self.config.fallback_strategy() == FallbackStrategy::AllPlatforms {
            let extra: Vec<String> = self
                .registry
                .platforms_for(data_type)
                .into_iter()
                .filter(|p| !configured.iter().any(|c| c == p))
                .filter(|p| self.config.is_platform_enabled(p))
                .map(str::to_string)
                .collect();
            out.extend(self.ordered(extra));
        }
        out
    }

    /// Quality gate for `data_type`: the configured rule followed by any
    /// validators registered on the builder.
    pub(crate) fn gate(&self, data_type: DataType) -> QualityGate {
        let gate = QualityGate::from_rule(&self.config.quality_rule(data_type));
        self.validators
            .get(&data_type)
            .into_iter()
            .flatten()
            .fold(gate, |g, v| g.with_check(Arc::clone(v)))
    }

    /// The capability table.
    #[must_use]
    pub const fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// The configuration store this router reads.
    #[must_use]
    pub const fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    /// Runtime tuning in effect.
    #[must_use]
    pub const fn router_config(&self) -> &RouterConfig {
        &self.cfg
    }
}

use std::time::Duration;

use mercato_core::{
    DataType, FallbackStrategy, MercatoError, Params, RequestRecord, RouteOptions, RoutingMetadata,
    RoutingResult, merge_params,
};
use tokio::time::Instant;

use crate::Mercato;
use crate::router::util::collapse_errors;

impl Mercato {
    /// Route a request with default options: configured candidates, fallback and
    /// quality gate enabled.
    pub async fn route(&self, data_type: DataType, params: &Params) -> RoutingResult {
        self.route_with(data_type, params, &RouteOptions::default())
            .await
    }

    /// Route a request to the best available platform.
    ///
    /// Behavior:
    /// - Candidates are `opts.platforms` when given, otherwise the enabled
    ///   preference list for `data_type` (see [`FallbackStrategy::AllPlatforms`]).
    ///   They are ordered by static priority, then by live performance score.
    /// - Candidates disabled at call time are skipped and never appear in
    ///   `platforms_tried`.
    /// - Each attempt merges the platform's default parameters under `params`
    ///   and is bounded by the provider timeout.
    /// - The first payload that passes the quality gate (or any payload when
    ///   `opts.quality_check` is false) wins.
    /// - Fallback to the next candidate happens only when `opts.enable_fallback`
    ///   is true and the configured strategy is not [`FallbackStrategy::Fail`].
    ///   Without fallback a rejected payload is still returned in `data`.
    ///
    /// Provider and quality failures never surface as `Err`; the attempt trail is
    /// in the result's metadata. Every call appends one record to the history.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mercato::core::route",
            skip(self, params, opts),
            fields(
                data_type = %data_type,
                fallback = opts.enable_fallback,
                quality_check = opts.quality_check,
            ),
        )
    )]
    pub async fn route_with(
        &self,
        data_type: DataType,
        params: &Params,
        opts: &RouteOptions,
    ) -> RoutingResult {
        let started = Instant::now();
        let candidates = self.candidates(data_type, opts.platforms.as_deref());
        let result = if candidates.is_empty() {
            RoutingResult::failure(
                RoutingMetadata::new(data_type),
                MercatoError::NoPlatform { data_type },
                None,
            )
        } else {
            let fallback = opts.enable_fallback
                && self.config.fallback_strategy() != FallbackStrategy::Fail;
            self.try_platforms(data_type, params, &candidates, fallback, opts.quality_check)
                .await
        };
        self.finish(started, result)
    }

    async fn try_platforms(
        &self,
        data_type: DataType,
        params: &Params,
        candidates: &[String],
        fallback: bool,
        quality_check: bool,
    ) -> RoutingResult {
        let mut meta = RoutingMetadata::new(data_type);

        for platform in candidates {
            if !self.config.is_platform_enabled(platform) {
                continue;
            }
            meta.platforms_tried.push(platform.clone());

            let merged = merge_params(&self.config.default_params(platform), params);
            let attempt_started = Instant::now();
            let res = Self::provider_call_with_timeout(
                platform,
                data_type,
                self.cfg.provider_timeout,
                self.registry.dispatch(platform, data_type, &merged),
            )
            .await;
            let latency = attempt_started.elapsed();

            let payload = match res {
                Ok(payload) => {
                    self.record_attempt(platform, true, latency);
                    meta.platform_elapsed = Some(latency);
                    payload
                }
                Err(e) => {
                    let e = crate::core::tag_err(platform, e);
                    #[cfg(feature = "tracing")]
                    tracing::error!(platform = %platform, error = %e, "platform attempt failed");
                    self.record_attempt(platform, false, Duration::ZERO);
                    meta.errors.push(e.clone());
                    if !fallback {
                        return RoutingResult::failure(meta, e, None);
                    }
                    continue;
                }
            };

            if quality_check && let Err(issue) = self.gate(data_type).validate(&payload) {
                let e = MercatoError::data_quality(platform.as_str(), issue.to_string());
                #[cfg(feature = "tracing")]
                tracing::warn!(platform = %platform, reason = %issue, "payload rejected by quality gate");
                meta.errors.push(e.clone());
                if !fallback {
                    return RoutingResult::failure(meta, e, Some(payload));
                }
                continue;
            }

            meta.quality_passed = quality_check;
            return RoutingResult::success(meta, platform, payload);
        }

        let error = collapse_errors(data_type, &meta.platforms_tried, meta.errors.clone());
        RoutingResult::failure(meta, error, None)
    }

    fn record_attempt(&self, platform: &str, success: bool, latency: Duration) {
        self.state().tracker.record(platform, success, latency);
    }

    fn finish(&self, started: Instant, mut result: RoutingResult) -> RoutingResult {
        let elapsed = started.elapsed();
        result.metadata.elapsed = elapsed;
        let record = RequestRecord {
            timestamp: chrono::Utc::now(),
            data_type: result.metadata.data_type,
            platforms_tried: result.metadata.platforms_tried.clone(),
            success: result.success,
            elapsed,
        };
        self.state().history.push(record);
        result
    }
}

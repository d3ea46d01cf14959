use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use mercato_core::{DataType, MercatoError, Params, RouteOptions, RoutingMetadata, RoutingResult};

use crate::Mercato;

impl Mercato {
    /// Fetch the same data type from several platforms for comparison.
    ///
    /// Behavior and trade-offs:
    /// - Candidates are `platforms` when given, otherwise the enabled preference
    ///   list for `data_type`. Duplicate names collapse into one entry.
    /// - Each platform is routed on its own with fallback disabled and the
    ///   quality gate enabled, so results are independent of each other.
    /// - Calls run concurrently, at most `max_concurrency` at a time.
    /// - A disabled platform yields a `PlatformDisabled` failure without being
    ///   called and without a history record.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mercato::core::multi_platform",
            skip(self, params, platforms),
            fields(data_type = %data_type),
        )
    )]
    pub async fn multi_platform(
        &self,
        data_type: DataType,
        params: &Params,
        platforms: Option<&[String]>,
    ) -> BTreeMap<String, RoutingResult> {
        let candidates = platforms.map_or_else(
            || self.config.enabled_platforms(Some(data_type)),
            <[String]>::to_vec,
        );

        let mut results = BTreeMap::new();
        let mut enabled = Vec::new();
        for p in candidates {
            if results.contains_key(&p) || enabled.contains(&p) {
                continue;
            }
            if self.config.is_platform_enabled(&p) {
                enabled.push(p);
            } else {
                let err = MercatoError::PlatformDisabled {
                    platform: p.clone(),
                };
                results.insert(
                    p,
                    RoutingResult::failure(RoutingMetadata::new(data_type), err, None),
                );
            }
        }

        let routed: Vec<(String, RoutingResult)> = stream::iter(enabled)
            .map(|p| async move {
                let opts = RouteOptions::default()
                    .platforms([p.clone()])
                    .enable_fallback(false)
                    .quality_check(true);
                let res = self.route_with(data_type, params, &opts).await;
                (p, res)
            })
            .buffer_unordered(self.cfg.max_concurrency)
            .collect()
            .await;

        results.extend(routed);
        results
    }
}

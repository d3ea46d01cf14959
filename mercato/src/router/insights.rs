use std::collections::BTreeMap;

use mercato_core::{DataType, MercatoError, PerformanceReport, PerformanceStat};

use crate::Mercato;

impl Mercato {
    /// Platform a default `route` call would try first, without issuing a request.
    #[must_use]
    pub fn best_platform(&self, data_type: DataType) -> Option<String> {
        self.candidates(data_type, None).into_iter().next()
    }

    /// Full ordered candidate list a default `route` call would use.
    #[must_use]
    pub fn rankings(&self, data_type: DataType) -> Vec<String> {
        self.candidates(data_type, None)
    }

    /// Rewrite configured preference lists to match the live ordering.
    ///
    /// For every data type with more than one enabled platform, the enabled
    /// platforms are re-ranked and stored first; disabled platforms keep their
    /// relative order after them. A list is written only when its enabled order
    /// changes, so a second call with unchanged statistics writes nothing.
    ///
    /// Returns the data types whose preferences were rewritten.
    ///
    /// # Errors
    /// Returns `Persistence` if the configuration document cannot be written.
    /// Lists rewritten before the failure stay rewritten.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "mercato::core::optimize_preferences", skip(self))
    )]
    pub fn optimize_preferences(&self) -> Result<Vec<DataType>, MercatoError> {
        let doc = self.config.snapshot();
        let mut changed = Vec::new();
        for (data_type, current) in doc.platform_preferences {
            let (enabled, disabled): (Vec<String>, Vec<String>) = current
                .into_iter()
                .partition(|p| self.config.is_platform_enabled(p));
            if enabled.len() <= 1 {
                continue;
            }
            let optimized = self.ordered(enabled.clone());
            if optimized == enabled {
                continue;
            }
            #[cfg(feature = "tracing")]
            tracing::info!(data_type = %data_type, order = %optimized.join(" -> "), "optimized platform preferences");
            self.config
                .set_platform_preferences(data_type, optimized.into_iter().chain(disabled))?;
            changed.push(data_type);
        }
        Ok(changed)
    }

    /// Snapshot of counters, history and current rankings.
    #[must_use]
    pub fn performance_report(&self) -> PerformanceReport {
        let (platforms, total_requests, recent_requests) = {
            let st = self.state();
            (
                st.tracker.snapshot(),
                st.history.len(),
                st.history.recent(self.cfg.recent_history).to_vec(),
            )
        };
        let rankings: BTreeMap<DataType, Vec<String>> = self
            .config
            .snapshot()
            .platform_preferences
            .into_keys()
            .map(|dt| (dt, self.rankings(dt)))
            .collect();
        PerformanceReport {
            platforms,
            total_requests,
            recent_requests,
            rankings,
        }
    }

    /// Forget every performance counter and history record.
    pub fn reset_performance(&self) {
        let mut st = self.state();
        st.tracker.clear();
        st.history.clear();
        #[cfg(feature = "tracing")]
        tracing::info!("reset platform performance statistics");
    }

    /// Counters for `platform`, if it was ever attempted.
    #[must_use]
    pub fn performance_stat(&self, platform: &str) -> Option<PerformanceStat> {
        self.state().tracker.stat(platform)
    }

    /// Ranking score of `platform` under the current counters.
    #[must_use]
    pub fn performance_score(&self, platform: &str) -> f64 {
        self.state().tracker.score(platform)
    }

    /// Number of requests held in history.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.state().history.len()
    }
}

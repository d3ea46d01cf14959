use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use mercato_types::{
    CacheSettings, DataConfig, DataType, FallbackStrategy, MercatoError, Params, PlannedTask,
    PlatformSettings, QualityRule, TaskRequest,
};

use crate::merge_params;

/// Owner of the routing configuration document.
///
/// Reads are served from memory. Every setter validates its input, applies it to
/// a copy of the document, writes the copy to disk and only then commits it, so
/// a failed write leaves the in-memory state untouched. Setters are serialised
/// by one lock; the document is always rewritten whole.
#[derive(Debug)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    doc: Mutex<DataConfig>,
    revision: AtomicU64,
}

impl ConfigStore {
    /// Load the document at `path`.
    ///
    /// A missing (or empty) file is bootstrapped with [`DataConfig::builtin`],
    /// which is persisted immediately.
    ///
    /// # Errors
    /// Returns `Persistence` if the file cannot be read, cannot be parsed, or the
    /// bootstrap document cannot be written. A corrupt document is never
    /// silently replaced.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MercatoError> {
        let path = path.into();
        let existing = match std::fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => Some(
                serde_json::from_str::<DataConfig>(&text).map_err(|e| {
                    MercatoError::Persistence(format!(
                        "failed to parse {}: {e}",
                        path.display()
                    ))
                })?,
            ),
            Ok(_) => None,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(MercatoError::Persistence(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let doc = match existing {
            Some(doc) => doc,
            None => {
                let doc = DataConfig::builtin();
                write_document(&path, &doc)?;
                #[cfg(feature = "tracing")]
                tracing::info!(path = %path.display(), "bootstrapped default routing configuration");
                doc
            }
        };

        Ok(Self {
            path: Some(path),
            doc: Mutex::new(doc),
            revision: AtomicU64::new(0),
        })
    }

    /// Process-local store that never touches the filesystem.
    #[must_use]
    pub fn in_memory(doc: DataConfig) -> Self {
        Self {
            path: None,
            doc: Mutex::new(doc),
            revision: AtomicU64::new(0),
        }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of committed mutations since this store was opened.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, DataConfig> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T>(&self, f: impl FnOnce(&DataConfig) -> T) -> T {
        f(&self.lock())
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut DataConfig) -> Result<(), MercatoError>,
    ) -> Result<(), MercatoError> {
        let mut guard = self.lock();
        let mut next = guard.clone();
        f(&mut next)?;
        if let Some(path) = &self.path {
            write_document(path, &next)?;
        }
        *guard = next;
        self.revision.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Copy of the whole document.
    #[must_use]
    pub fn snapshot(&self) -> DataConfig {
        self.read(Clone::clone)
    }

    /// Human-readable summary of platform states, preferences, fallback and cache.
    #[must_use]
    pub fn summary(&self) -> String {
        self.read(ToString::to_string)
    }

    /// Configured preference list for `data_type`; empty when none is configured.
    #[must_use]
    pub fn platform_preferences(&self, data_type: DataType) -> Vec<String> {
        self.read(|d| {
            d.platform_preferences
                .get(&data_type)
                .cloned()
                .unwrap_or_default()
        })
    }

    /// Replace the preference list for `data_type`.
    ///
    /// # Errors
    /// `InvalidConfiguration` when the list names a platform twice;
    /// `Persistence` when the document cannot be written.
    pub fn set_platform_preferences<I, S>(
        &self,
        data_type: DataType,
        platforms: I,
    ) -> Result<(), MercatoError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = platforms.into_iter().map(Into::into).collect();
        for (i, p) in list.iter().enumerate() {
            if list[..i].contains(p) {
                return Err(MercatoError::InvalidConfiguration(format!(
                    "platform '{p}' listed twice for {data_type}"
                )));
            }
        }
        self.mutate(|d| {
            d.platform_preferences.insert(data_type, list);
            Ok(())
        })
    }

    /// Whether `platform` may be attempted. Unconfigured platforms are enabled.
    #[must_use]
    pub fn is_platform_enabled(&self, platform: &str) -> bool {
        self.read(|d| d.is_enabled(platform))
    }

    /// Default parameters for `platform`; empty when unconfigured.
    #[must_use]
    pub fn default_params(&self, platform: &str) -> Params {
        self.read(|d| {
            d.platform_settings
                .get(platform)
                .map(|s| s.default_params.clone())
                .unwrap_or_default()
        })
    }

    /// Static priority of `platform`; unconfigured platforms get 999.
    #[must_use]
    pub fn platform_priority(&self, platform: &str) -> i64 {
        self.read(|d| d.priority(platform))
    }

    /// Settings for `platform`, if any are configured.
    #[must_use]
    pub fn platform_settings(&self, platform: &str) -> Option<PlatformSettings> {
        self.read(|d| d.platform_settings.get(platform).cloned())
    }

    /// Enabled platforms.
    ///
    /// With a data type: its preference list filtered to enabled platforms, in
    /// configured order. Without: every enabled platform in `platform_settings`,
    /// ordered by priority then name.
    #[must_use]
    pub fn enabled_platforms(&self, data_type: Option<DataType>) -> Vec<String> {
        self.read(|d| match data_type {
            Some(dt) => d
                .platform_preferences
                .get(&dt)
                .map(|list| list.iter().filter(|p| d.is_enabled(p)).cloned().collect())
                .unwrap_or_default(),
            None => {
                let mut all: Vec<(&String, i64)> = d
                    .platform_settings
                    .iter()
                    .filter(|(_, s)| s.enabled)
                    .map(|(p, s)| (p, s.priority))
                    .collect();
                all.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
                all.into_iter().map(|(p, _)| p.clone()).collect()
            }
        })
    }

    /// Replace the settings of `platform`.
    ///
    /// # Errors
    /// `Persistence` when the document cannot be written.
    pub fn set_platform_settings(
        &self,
        platform: &str,
        settings: PlatformSettings,
    ) -> Result<(), MercatoError> {
        self.mutate(|d| {
            d.platform_settings.insert(platform.to_string(), settings);
            Ok(())
        })
    }

    fn update_settings(
        &self,
        platform: &str,
        f: impl FnOnce(&mut PlatformSettings),
    ) -> Result<(), MercatoError> {
        self.mutate(|d| {
            f(d.platform_settings.entry(platform.to_string()).or_default());
            Ok(())
        })
    }

    /// Allow `platform` to be attempted again.
    ///
    /// # Errors
    /// `Persistence` when the document cannot be written.
    pub fn enable_platform(&self, platform: &str) -> Result<(), MercatoError> {
        self.update_settings(platform, |s| s.enabled = true)
    }

    /// Stop attempting `platform`. It stays in every preference list.
    ///
    /// # Errors
    /// `Persistence` when the document cannot be written.
    pub fn disable_platform(&self, platform: &str) -> Result<(), MercatoError> {
        self.update_settings(platform, |s| s.enabled = false)
    }

    /// Set the static priority of `platform` (lower is preferred).
    ///
    /// # Errors
    /// `Persistence` when the document cannot be written.
    pub fn set_platform_priority(&self, platform: &str, priority: i64) -> Result<(), MercatoError> {
        self.update_settings(platform, |s| s.priority = priority)
    }

    /// Replace the default parameters of `platform`.
    ///
    /// # Errors
    /// `Persistence` when the document cannot be written.
    pub fn set_default_params(&self, platform: &str, params: Params) -> Result<(), MercatoError> {
        self.update_settings(platform, |s| s.default_params = params)
    }

    /// Current fallback strategy.
    #[must_use]
    pub fn fallback_strategy(&self) -> FallbackStrategy {
        self.read(|d| d.fallback_strategy)
    }

    /// Parse and store a fallback strategy.
    ///
    /// # Errors
    /// `InvalidConfiguration` for anything but `next_available`, `all_platforms`
    /// or `fail`; the stored strategy is left unchanged.
    pub fn set_fallback_strategy(&self, strategy: &str) -> Result<(), MercatoError> {
        let parsed: FallbackStrategy = strategy.parse()?;
        self.set_fallback(parsed)
    }

    /// Store a fallback strategy.
    ///
    /// # Errors
    /// `Persistence` when the document cannot be written.
    pub fn set_fallback(&self, strategy: FallbackStrategy) -> Result<(), MercatoError> {
        self.mutate(|d| {
            d.fallback_strategy = strategy;
            Ok(())
        })
    }

    /// Quality rule for `data_type`; the permissive default when none is configured.
    #[must_use]
    pub fn quality_rule(&self, data_type: DataType) -> QualityRule {
        self.read(|d| {
            d.data_quality_rules
                .get(&data_type)
                .cloned()
                .unwrap_or_default()
        })
    }

    /// Replace the quality rule for `data_type`.
    ///
    /// # Errors
    /// `Persistence` when the document cannot be written.
    pub fn set_quality_rule(&self, data_type: DataType, rule: QualityRule) -> Result<(), MercatoError> {
        self.mutate(|d| {
            d.data_quality_rules.insert(data_type, rule);
            Ok(())
        })
    }

    /// Advisory cache settings.
    #[must_use]
    pub fn cache_settings(&self) -> CacheSettings {
        self.read(|d| d.cache_settings.clone())
    }

    /// Write the current document to `path`.
    ///
    /// # Errors
    /// `Persistence` when the file cannot be written.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<(), MercatoError> {
        let doc = self.snapshot();
        write_document(path.as_ref(), &doc)
    }

    /// Merge the document at `path` into the current one and persist.
    ///
    /// Top-level keys present in the imported file replace the current ones
    /// wholesale; absent keys are kept.
    ///
    /// # Errors
    /// `Persistence` when the file cannot be read, is not a JSON object, or the
    /// merged document is invalid or cannot be written.
    pub fn import_from(&self, path: impl AsRef<Path>) -> Result<(), MercatoError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MercatoError::Persistence(format!("failed to read {}: {e}", path.display()))
        })?;
        let serde_json::Value::Object(imported) = serde_json::from_str::<serde_json::Value>(&text)? else {
            return Err(MercatoError::Persistence(format!(
                "{} does not contain a JSON object",
                path.display()
            )));
        };
        self.mutate(|d| {
            let serde_json::Value::Object(mut current) = serde_json::to_value(&*d)? else {
                return Err(MercatoError::Persistence(
                    "configuration did not serialize to an object".into(),
                ));
            };
            current.extend(imported);
            *d = serde_json::from_value(serde_json::Value::Object(current))?;
            Ok(())
        })
    }

    /// Replace the document with [`DataConfig::builtin`] and persist.
    ///
    /// # Errors
    /// `Persistence` when the document cannot be written.
    pub fn reset_to_default(&self) -> Result<(), MercatoError> {
        self.mutate(|d| {
            *d = DataConfig::builtin();
            Ok(())
        })
    }

    /// Plan one dispatch per request against its top enabled platform.
    ///
    /// Keys are `{task_name}_{data_type}_{index}`. Requests whose data type has
    /// no enabled platform are skipped.
    #[must_use]
    pub fn plan_tasks(&self, task_name: &str, requests: &[TaskRequest]) -> Vec<(String, PlannedTask)> {
        self.read(|d| {
            requests
                .iter()
                .enumerate()
                .filter_map(|(i, req)| {
                    let platform = d
                        .platform_preferences
                        .get(&req.data_type)?
                        .iter()
                        .find(|p| d.is_enabled(p))?;
                    let task = PlannedTask {
                        platform: platform.clone(),
                        data_type: req.data_type,
                        params: merge_params(&d.settings(platform).default_params, &req.params),
                    };
                    Some((format!("{task_name}_{}_{i}", req.data_type), task))
                })
                .collect()
        })
    }

    /// Plan the same request against several platforms for comparison.
    ///
    /// Uses `platforms` when given, otherwise the enabled preference list.
    /// Disabled platforms are skipped. Keys are `{task_name}_{platform}`.
    #[must_use]
    pub fn plan_multi_platform(
        &self,
        task_name: &str,
        data_type: DataType,
        params: &Params,
        platforms: Option<&[String]>,
    ) -> Vec<(String, PlannedTask)> {
        let candidates = match platforms {
            Some(list) => list.to_vec(),
            None => self.enabled_platforms(Some(data_type)),
        };
        self.read(|d| {
            candidates
                .iter()
                .filter(|p| d.is_enabled(p))
                .map(|p| {
                    let task = PlannedTask {
                        platform: p.clone(),
                        data_type,
                        params: merge_params(&d.settings(p).default_params, params),
                    };
                    (format!("{task_name}_{p}"), task)
                })
                .collect()
        })
    }
}

fn write_document(path: &Path, doc: &DataConfig) -> Result<(), MercatoError> {
    let result = (|| {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(doc)?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, path)?;
        Ok::<(), MercatoError>(())
    })();
    #[cfg(feature = "tracing")]
    if let Err(e) = &result {
        tracing::error!(path = %path.display(), error = %e, "failed to persist routing configuration");
    }
    result
}

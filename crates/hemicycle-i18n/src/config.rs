//! Runtime configuration loaded from environment variables.

use std::{env, path::PathBuf, time::Duration};

use anyhow::Result;

use crate::{locale::detect_default_locale, paths::default_root};

const DEFAULT_LOCALE_ENV_KEY: &str = "HEMICYCLE_DEFAULT_LOCALE";
const WATCH_INTERVAL_ENV_KEY: &str = "HEMICYCLE_WATCH_INTERVAL_MS";
const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I18nConfig {
    /// Origin root; every context opened on it shares the locale preference.
    pub root: PathBuf,
    /// Locale used when no preference is stored. Detected when unset.
    pub default_locale: Option<String>,
    /// How often the watcher checks for writes from other processes.
    pub watch_interval: Duration,
}

impl I18nConfig {
    pub fn new(root: PathBuf) -> Self {
        Self { root, default_locale: None, watch_interval: DEFAULT_WATCH_INTERVAL }
    }

    /// Load from the environment; the root honours `HEMICYCLE_ROOT`.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_env_with_root(default_root()?))
    }

    /// Load from the environment with an explicitly chosen root.
    pub fn from_env_with_root(root: PathBuf) -> Self {
        let default_locale = env::var(DEFAULT_LOCALE_ENV_KEY)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let watch_interval = env::var(WATCH_INTERVAL_ENV_KEY)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_WATCH_INTERVAL);

        Self { root, default_locale, watch_interval }
    }

    /// Configured default, or one detected from the environment among
    /// `available`.
    pub fn resolve_default_locale(&self, available: &[&str]) -> String {
        match &self.default_locale {
            Some(locale) => locale.clone(),
            None => detect_default_locale(available),
        }
    }
}

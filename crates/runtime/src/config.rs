//! Runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

use advisor_core::{EngineConfig, FocusTable};

/// Settings of the async service layer.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    /// Upper bound for a single repository call.
    pub persistence_timeout: Duration,
    /// Focus label used when a request names none.
    pub default_focus: String,
    /// Persist anchor/pivot transitions computed during `get_suggestions`.
    pub persist_state: bool,
    /// Root of the file repository; `None` uses the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl RuntimeConfig {
    pub const DEFAULT_PERSISTENCE_TIMEOUT: Duration = Duration::from_millis(250);

    pub const ENV_PERSISTENCE_TIMEOUT_MS: &'static str = "ADVISOR_PERSISTENCE_TIMEOUT_MS";
    pub const ENV_MAX_REASONS: &'static str = "ADVISOR_MAX_REASONS";
    pub const ENV_DEFAULT_FOCUS: &'static str = "ADVISOR_DEFAULT_FOCUS";
    pub const ENV_DATA_DIR: &'static str = "ADVISOR_DATA_DIR";

    /// Defaults overridden by `ADVISOR_*` environment variables. Unparsable
    /// values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, Self::ENV_PERSISTENCE_TIMEOUT_MS) {
            config.persistence_timeout = Duration::from_millis(ms);
        }
        if let Some(max) = parse_var::<usize>(&lookup, Self::ENV_MAX_REASONS) {
            config.engine.max_display_reasons = max;
        }
        if let Some(focus) = lookup(Self::ENV_DEFAULT_FOCUS).filter(|f| !f.trim().is_empty()) {
            config.default_focus = focus.trim().to_string();
        }
        if let Some(dir) = lookup(Self::ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        config
    }

    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn with_persistence_timeout(mut self, timeout: Duration) -> Self {
        self.persistence_timeout = timeout;
        self
    }

    /// Repository root: the configured dir, else the platform data dir.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "build-advisor")
                .map(|dirs| dirs.data_dir().join("characters"))
        })
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            persistence_timeout: Self::DEFAULT_PERSISTENCE_TIMEOUT,
            default_focus: FocusTable::BALANCED.to_string(),
            persist_state: true,
            data_dir: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = key, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

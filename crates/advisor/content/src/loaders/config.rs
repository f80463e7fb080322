//! Engine configuration loader.

use std::path::Path;

use advisor_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.anchor_window == 0 || config.pivot_window == 0 {
            anyhow::bail!("Config windows must be at least 1 entry");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("max_display_reasons = 5\ncost_min_level = 4\n").unwrap();
        assert_eq!(config.max_display_reasons, 5);
        assert_eq!(config.cost_min_level, 4);
        assert_eq!(config.anchor_window, EngineConfig::DEFAULT_ANCHOR_WINDOW);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(ConfigLoader::parse("pivot_window = 0\n").is_err());
    }
}

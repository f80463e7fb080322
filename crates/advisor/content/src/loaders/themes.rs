//! Theme table loader.

use std::collections::BTreeMap;
use std::path::Path;

use advisor_core::ThemeTable;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Theme table structure for TOML files.
///
/// ```toml
/// replace_defaults = false
///
/// [themes]
/// piloting = "ace"
/// melee = "warrior"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeFile {
    /// Start from an empty table instead of the built-in mapping.
    #[serde(default)]
    pub replace_defaults: bool,
    #[serde(default)]
    pub themes: BTreeMap<String, String>,
}

/// Loader for theme -> archetype tables from TOML files.
pub struct ThemeTableLoader;

impl ThemeTableLoader {
    pub fn load(path: &Path) -> LoadResult<ThemeTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<ThemeTable> {
        let file: ThemeFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse theme table TOML: {}", e))?;

        let mut table = if file.replace_defaults {
            ThemeTable::empty()
        } else {
            ThemeTable::default()
        };
        for (theme, archetype) in file.themes {
            if theme.trim().is_empty() || archetype.trim().is_empty() {
                anyhow::bail!("Theme table entry '{}' = '{}' is empty", theme, archetype);
            }
            table.insert(theme.as_str(), archetype.as_str());
        }
        Ok(table)
    }
}

//! Content factory for building the advisor from data files.

use std::path::{Path, PathBuf};

use advisor_core::{Advisor, CandidateOption, EngineConfig, FocusTable, ThemeTable};

use crate::loaders::{CatalogLoader, ConfigLoader, FocusLoader, LoadResult, ThemeTableLoader};

/// Content factory that loads all advisor content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml   (optional)
/// ├── themes.toml   (optional)
/// ├── focus.toml    (optional)
/// └── catalog.ron
/// ```
///
/// Optional files fall back to the built-in defaults when absent.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        self.optional("config.toml", ConfigLoader::load)
    }

    /// Load the theme table from `themes.toml`.
    pub fn load_themes(&self) -> LoadResult<ThemeTable> {
        self.optional("themes.toml", ThemeTableLoader::load)
    }

    /// Load the focus table from `focus.toml`.
    pub fn load_focus(&self) -> LoadResult<FocusTable> {
        self.optional("focus.toml", FocusLoader::load)
    }

    /// Load the option catalog from `catalog.ron`.
    pub fn load_catalog(&self) -> LoadResult<Vec<CandidateOption>> {
        CatalogLoader::load(&self.data_dir.join("catalog.ron"))
    }

    /// Builds an [`Advisor`] from config, themes and focus.
    pub fn build_advisor(&self) -> LoadResult<Advisor> {
        Ok(Advisor::new(
            self.load_config()?,
            self.load_themes()?,
            self.load_focus()?,
        ))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn optional<T: Default>(
        &self,
        file: &str,
        load: impl FnOnce(&Path) -> LoadResult<T>,
    ) -> LoadResult<T> {
        let path = self.data_dir.join(file);
        if path.exists() {
            load(&path)
        } else {
            tracing::debug!(path = %path.display(), "content file absent, using defaults");
            Ok(T::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use advisor_core::{Archetype, Prerequisite, Theme};

    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn absent_optional_files_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), EngineConfig::default());
        assert_eq!(factory.load_themes().unwrap(), ThemeTable::default());
        assert!(factory.load_catalog().is_err());
    }

    #[test]
    fn builds_advisor_from_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "max_display_reasons = 2\n").unwrap();
        let advisor = ContentFactory::new(dir.path()).build_advisor().unwrap();
        assert_eq!(advisor.config().max_display_reasons, 2);
    }

    #[test]
    fn bundled_sample_content_loads() {
        let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        let catalog = factory.load_catalog().unwrap();
        assert_eq!(catalog.len(), 15);

        let precise = catalog.iter().find(|o| o.id == "precise_shot").unwrap();
        assert!(precise.prerequisites.contains(&Prerequisite::Option {
            id: "point_blank_shot".into()
        }));
        assert!(precise.prerequisites.contains(&Prerequisite::Level { min: 3 }));

        let themes = factory.load_themes().unwrap();
        assert_eq!(
            themes.archetype_for(&Theme::new("piloting")),
            Some(&Archetype::new("ace"))
        );
        assert!(factory.load_focus().unwrap().get("roleplay").is_some());
        assert_eq!(factory.load_config().unwrap(), EngineConfig::default());
    }
}

//! Shared arguments and service assembly.

use std::path::{Path, PathBuf};

use advisor_content::{CatalogLoader, ConfigLoader, ContentFactory};
use advisor_core::{CandidateOption, CharacterState, FocusTable, ThemeTable};
use advisor_runtime::{FileRepository, RuntimeConfig, StaticCatalogProvider, SuggestionService};
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args)]
pub struct GlobalArgs {
    /// Directory holding identity records (overrides ADVISOR_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Content directory with catalog.ron and optional themes/focus/config files
    #[arg(long, global = true, value_name = "DIR")]
    pub content: Option<PathBuf>,

    /// Engine configuration TOML (overrides the content directory's config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write logs to the platform cache directory
    #[arg(long, global = true)]
    pub log_file: bool,
}

impl GlobalArgs {
    /// Environment first, then the content directory's config, then `--config`.
    pub fn runtime_config(&self) -> Result<RuntimeConfig> {
        let mut config = RuntimeConfig::from_env();

        if let Some(factory) = self.content_factory() {
            let engine = factory.load_config().with_context(|| {
                format!("Failed to load config from {}", factory.data_dir().display())
            })?;
            config = config.with_engine(engine);
        }
        if let Some(path) = &self.config {
            let engine = ConfigLoader::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?;
            config = config.with_engine(engine);
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        Ok(config)
    }

    pub fn content_factory(&self) -> Option<ContentFactory> {
        self.content.as_ref().map(ContentFactory::new)
    }

    /// Catalog from an explicit RON file, else from the content directory.
    pub fn catalog(&self, path: Option<&Path>) -> Result<Vec<CandidateOption>> {
        match (path, self.content_factory()) {
            (Some(path), _) => CatalogLoader::load(path)
                .with_context(|| format!("Failed to load catalog: {}", path.display())),
            (None, Some(factory)) => factory.load_catalog().with_context(|| {
                format!("Failed to load catalog from {}", factory.data_dir().display())
            }),
            (None, None) => anyhow::bail!("No catalog given; pass --catalog <FILE> or --content <DIR>"),
        }
    }

    pub fn repository(&self, config: &RuntimeConfig) -> Result<FileRepository> {
        let dir = config
            .resolve_data_dir()
            .context("Could not determine a data directory; set ADVISOR_DATA_DIR or --data-dir")?;
        FileRepository::new(&dir)
            .with_context(|| format!("Failed to open data directory: {}", dir.display()))
    }

    /// Service over the file repository and the given catalog.
    pub fn service(&self, catalog: Vec<CandidateOption>) -> Result<SuggestionService> {
        let config = self.runtime_config()?;
        let repository = self.repository(&config)?;
        let (themes, focus) = match self.content_factory() {
            Some(factory) => (
                factory.load_themes().context("Failed to load theme table")?,
                factory.load_focus().context("Failed to load focus table")?,
            ),
            None => (ThemeTable::default(), FocusTable::default()),
        };

        tracing::debug!(
            data_dir = ?config.resolve_data_dir(),
            options = catalog.len(),
            "assembling suggestion service"
        );
        Ok(SuggestionService::builder()
            .config(config)
            .themes(themes)
            .focus(focus)
            .catalog(StaticCatalogProvider::new(catalog))
            .repository(repository)
            .build())
    }
}

/// Reads a character state from a JSON file.
pub fn read_character(path: &Path) -> Result<CharacterState> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read character file: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse character file: {}", path.display()))
}

//! Loaders for advisor content files.
//!
//! Catalogs are RON; theme, focus and engine tables are TOML merged onto
//! the built-in defaults.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod focus;
pub mod prerequisites;
pub mod themes;

pub use catalog::{CatalogEntry, CatalogLoader, PrerequisiteSpec};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use focus::FocusLoader;
pub use prerequisites::{ParsedPrerequisites, PrerequisiteParser};
pub use themes::ThemeTableLoader;

use std::path::Path;

use anyhow::Context;

/// Loader result; failures carry the offending file path as context.
pub type LoadResult<T> = anyhow::Result<T>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

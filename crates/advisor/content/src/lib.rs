//! Data-driven advisor content and loaders.
//!
//! This crate reads the content the advisory engine consumes but never
//! defines itself:
//! - Option catalogs (RON)
//! - Theme -> archetype tables (TOML)
//! - Progression focus tables (TOML)
//! - Engine configuration (TOML)
//!
//! Catalog entries without structured prerequisites are run through a
//! free-text migration shim ([`PrerequisiteParser`]).

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogEntry, CatalogLoader, ConfigLoader, ContentFactory, FocusLoader, LoadResult,
    ParsedPrerequisites, PrerequisiteParser, PrerequisiteSpec, ThemeTableLoader,
};

//! Async orchestration for the build advisor.
//!
//! This crate wires the pure `advisor-core` pipeline to its collaborators:
//! catalog and character-state providers, per-character repositories, and
//! the suggestion cache. Hosts embed [`SuggestionService`].
//!
//! Modules are organized by responsibility:
//! - [`service`] hosts the orchestrator and its builder
//! - [`api`] exposes errors, provider traits and request/response types
//! - [`repository`] persists history, anchor, pivot and advice records
//! - [`cache`] holds computed advice keyed by snapshot hash
//! - [`config`] reads runtime settings from the environment
pub mod api;
pub mod cache;
pub mod config;
pub mod repository;
pub mod service;

mod locks;

pub use api::{
    CatalogProvider, CharacterStateProvider, RepositoryError, ResponseSource, Result,
    RuntimeError, StaticCatalogProvider, StaticStateProvider, SuggestionRequest,
    SuggestionResponse,
};
pub use cache::{CacheKey, SuggestionCache};
pub use config::RuntimeConfig;
pub use repository::{
    AdviceRecord, AdviceRepository, AdvisorRepository, FileLog, FileRepository,
    HistoryRepository, IdentityRepository, InMemoryRepository, LastShown,
};
pub use service::{CharacterRecords, SuggestionService, SuggestionServiceBuilder};

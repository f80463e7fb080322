//! Public API types: errors, collaborator traits, and request/response shapes.
mod errors;
mod providers;
mod request;

pub use errors::{RepositoryError, Result, RuntimeError};
pub use providers::{CatalogProvider, CharacterStateProvider, StaticCatalogProvider, StaticStateProvider};
pub use request::{ResponseSource, SuggestionRequest, SuggestionResponse};

//! Repository layer for per-character advisor records.
//!
//! Repositories hold data that CHANGES as a character levels:
//! - Choice history
//! - Anchor and pivot state
//! - Decision-step advice and last-shown ids
//!
//! Static content (catalog, theme table, focus table) comes from providers
//! and loaders, not repositories.

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::{FileLog, FileRepository};
pub use memory::InMemoryRepository;
pub use traits::{AdviceRepository, AdvisorRepository, HistoryRepository, IdentityRepository};
pub use types::{AdviceRecord, LastShown};

//! Repository contracts for the per-character records.
//!
//! Each record is persisted independently:
//! - History log (append-only choices)
//! - Anchor record ([`AnchorPair`])
//! - Pivot record ([`PivotState`])
//! - Decision-step advice and last-shown ids
//!
//! Implementations are synchronous; the service drives them from blocking
//! tasks with a timeout.

use advisor_core::{AnchorPair, CharacterId, HistoryEntry, PivotState};

pub use super::types::{AdviceRecord, LastShown};
use crate::repository::Result;

/// Append-only choice history.
pub trait HistoryRepository: Send + Sync {
    fn append(&self, character: &CharacterId, entry: &HistoryEntry) -> Result<()>;

    /// Every entry, oldest first. Unknown characters have an empty history.
    fn load(&self, character: &CharacterId) -> Result<Vec<HistoryEntry>>;
}

/// Anchor and pivot records.
pub trait IdentityRepository: Send + Sync {
    fn load_anchors(&self, character: &CharacterId) -> Result<Option<AnchorPair>>;

    fn save_anchors(&self, character: &CharacterId, anchors: &AnchorPair) -> Result<()>;

    fn load_pivot(&self, character: &CharacterId) -> Result<Option<PivotState>>;

    fn save_pivot(&self, character: &CharacterId, pivot: &PivotState) -> Result<()>;
}

/// Decision-step memory and last-shown suggestion ids.
pub trait AdviceRepository: Send + Sync {
    fn load_advice(&self, character: &CharacterId, step: &str) -> Result<Option<AdviceRecord>>;

    fn save_advice(&self, character: &CharacterId, record: &AdviceRecord) -> Result<()>;

    fn load_last_shown(&self, character: &CharacterId, context: &str) -> Result<Option<LastShown>>;

    fn save_last_shown(&self, character: &CharacterId, shown: &LastShown) -> Result<()>;
}

/// Everything the service persists.
pub trait AdvisorRepository: HistoryRepository + IdentityRepository + AdviceRepository {}

impl<T> AdvisorRepository for T where T: HistoryRepository + IdentityRepository + AdviceRepository {}

//! In-memory repository for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use advisor_core::{AnchorPair, CharacterId, HistoryEntry, PivotState};

use crate::repository::{
    AdviceRecord, AdviceRepository, HistoryRepository, IdentityRepository, LastShown,
    RepositoryError, Result,
};

/// In-memory implementation of every advisor repository.
#[derive(Default)]
pub struct InMemoryRepository {
    history: RwLock<HashMap<CharacterId, Vec<HistoryEntry>>>,
    anchors: RwLock<HashMap<CharacterId, AnchorPair>>,
    pivots: RwLock<HashMap<CharacterId, PivotState>>,
    advice: RwLock<HashMap<(CharacterId, String), AdviceRecord>>,
    last_shown: RwLock<HashMap<(CharacterId, String), LastShown>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a pre-recorded history for one character.
    pub fn with_history(character: CharacterId, entries: Vec<HistoryEntry>) -> Self {
        let repo = Self::new();
        if let Ok(mut history) = repo.history.write() {
            history.insert(character, entries);
        }
        repo
    }
}

fn read<K, V, F, T>(map: &RwLock<HashMap<K, V>>, f: F) -> Result<T>
where
    F: FnOnce(&HashMap<K, V>) -> T,
{
    let guard = map.read().map_err(|_| RepositoryError::LockPoisoned)?;
    Ok(f(&guard))
}

fn write<K, V, F, T>(map: &RwLock<HashMap<K, V>>, f: F) -> Result<T>
where
    F: FnOnce(&mut HashMap<K, V>) -> T,
{
    let mut guard = map.write().map_err(|_| RepositoryError::LockPoisoned)?;
    Ok(f(&mut guard))
}

impl HistoryRepository for InMemoryRepository {
    fn append(&self, character: &CharacterId, entry: &HistoryEntry) -> Result<()> {
        write(&self.history, |history| {
            history
                .entry(character.clone())
                .or_default()
                .push(entry.clone())
        })
    }

    fn load(&self, character: &CharacterId) -> Result<Vec<HistoryEntry>> {
        read(&self.history, |history| {
            history.get(character).cloned().unwrap_or_default()
        })
    }
}

impl IdentityRepository for InMemoryRepository {
    fn load_anchors(&self, character: &CharacterId) -> Result<Option<AnchorPair>> {
        read(&self.anchors, |anchors| anchors.get(character).cloned())
    }

    fn save_anchors(&self, character: &CharacterId, anchors: &AnchorPair) -> Result<()> {
        write(&self.anchors, |map| {
            map.insert(character.clone(), anchors.clone());
        })
    }

    fn load_pivot(&self, character: &CharacterId) -> Result<Option<PivotState>> {
        read(&self.pivots, |pivots| pivots.get(character).cloned())
    }

    fn save_pivot(&self, character: &CharacterId, pivot: &PivotState) -> Result<()> {
        write(&self.pivots, |map| {
            map.insert(character.clone(), pivot.clone());
        })
    }
}

impl AdviceRepository for InMemoryRepository {
    fn load_advice(&self, character: &CharacterId, step: &str) -> Result<Option<AdviceRecord>> {
        read(&self.advice, |advice| {
            advice.get(&(character.clone(), step.to_string())).cloned()
        })
    }

    fn save_advice(&self, character: &CharacterId, record: &AdviceRecord) -> Result<()> {
        write(&self.advice, |advice| {
            advice.insert((character.clone(), record.step.clone()), record.clone());
        })
    }

    fn load_last_shown(&self, character: &CharacterId, context: &str) -> Result<Option<LastShown>> {
        read(&self.last_shown, |shown| {
            shown.get(&(character.clone(), context.to_string())).cloned()
        })
    }

    fn save_last_shown(&self, character: &CharacterId, shown: &LastShown) -> Result<()> {
        write(&self.last_shown, |map| {
            map.insert((character.clone(), shown.context.clone()), shown.clone());
        })
    }
}

//! Asynchronous collaborators the service reads from.
//!
//! Hosts plug in [`CharacterStateProvider`] and [`CatalogProvider`]
//! implementations so the advisor can run against a live game document,
//! a content directory, or test fixtures.
use std::collections::HashMap;
use std::sync::RwLock;

use advisor_core::{CandidateOption, CharacterId, CharacterState};
use async_trait::async_trait;

use super::errors::{Result, RuntimeError};

/// Read-only source of character state.
#[async_trait]
pub trait CharacterStateProvider: Send + Sync {
    async fn character_state(&self, id: &CharacterId) -> Result<CharacterState>;
}

/// Lookup of option definitions.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// All options in a domain (`"feat"`, `"talent"`, ...). An empty domain
    /// means every option.
    async fn candidates(&self, domain: &str) -> Result<Vec<CandidateOption>>;

    /// One option by id, `None` if the catalog has no such option.
    async fn lookup(&self, id: &str) -> Result<Option<CandidateOption>>;
}

/// Catalog held in memory, typically loaded once from a content directory.
pub struct StaticCatalogProvider {
    options: Vec<CandidateOption>,
}

impl StaticCatalogProvider {
    pub fn new(options: Vec<CandidateOption>) -> Self {
        Self { options }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalogProvider {
    async fn candidates(&self, domain: &str) -> Result<Vec<CandidateOption>> {
        let domain = domain.trim();
        Ok(self
            .options
            .iter()
            .filter(|option| domain.is_empty() || option.kind.as_ref().eq_ignore_ascii_case(domain))
            .cloned()
            .collect())
    }

    async fn lookup(&self, id: &str) -> Result<Option<CandidateOption>> {
        Ok(self.options.iter().find(|option| option.id == id).cloned())
    }
}

/// Character states held in memory.
#[derive(Default)]
pub struct StaticStateProvider {
    states: RwLock<HashMap<CharacterId, CharacterState>>,
}

impl StaticStateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, state: CharacterState) {
        if let Ok(mut states) = self.states.write() {
            states.insert(state.id.clone(), state);
        }
    }
}

#[async_trait]
impl CharacterStateProvider for StaticStateProvider {
    async fn character_state(&self, id: &CharacterId) -> Result<CharacterState> {
        let states = self
            .states
            .read()
            .map_err(|_| RuntimeError::StateUnavailable("state provider lock was poisoned".into()))?;
        states
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::StateUnavailable(format!("unknown character {id}")))
    }
}

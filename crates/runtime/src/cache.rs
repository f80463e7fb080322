//! Suggestion cache keyed by (character, context, domain, selection).
//!
//! An entry is valid only for the snapshot hash it was computed under. A
//! lookup with a different hash misses but leaves the entry in place as the
//! last-known-good result; the next insert for the key replaces it. Anything
//! that changes identity state without changing the snapshot (anchor
//! commands, recorded choices) must call [`SuggestionCache::invalidate`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use advisor_core::{Advice, CharacterId};

use crate::api::SuggestionRequest;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub character: CharacterId,
    pub context: String,
    pub domain: String,
    /// [`crate::SuggestionRequest::selection`] of the request.
    pub selection: String,
}

impl CacheKey {
    pub fn new(character: CharacterId, context: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            character,
            context: context.into(),
            domain: domain.into(),
            selection: String::new(),
        }
    }

    /// Key for one request: explicit candidate lists and future scoring get
    /// entries of their own.
    pub fn for_request(character: CharacterId, request: &SuggestionRequest) -> Self {
        Self {
            selection: request.selection(),
            ..Self::new(character, &request.context, &request.domain)
        }
    }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    hash: String,
    advice: Advice,
}

#[derive(Default)]
pub struct SuggestionCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl SuggestionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached advice for `key`, only if it was computed under `hash`.
    pub fn get(&self, key: &CacheKey, hash: &str) -> Option<Advice> {
        self.entries()
            .get(key)
            .filter(|entry| entry.hash == hash)
            .map(|entry| entry.advice.clone())
    }

    /// Whatever is cached for `key`, regardless of hash.
    pub fn last_known_good(&self, key: &CacheKey) -> Option<Advice> {
        self.entries().get(key).map(|entry| entry.advice.clone())
    }

    pub fn insert(&self, key: CacheKey, hash: impl Into<String>, advice: Advice) {
        self.entries().insert(
            key,
            CacheEntry {
                hash: hash.into(),
                advice,
            },
        );
    }

    /// Drops every entry of one character. Returns how many were removed.
    pub fn invalidate(&self, character: &CharacterId) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|key, _| &key.character != character);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

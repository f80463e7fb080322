//! File-based repository.
//!
//! # Directory Structure
//!
//! ```text
//! base_dir/
//! └── <hex(character id)>/
//!     ├── history.log            [u32 len][bincode HistoryEntry]...
//!     ├── anchors.json
//!     ├── pivot.json
//!     ├── advice/<hex(step)>.json
//!     └── shown/<hex(context)>.json
//! ```
//!
//! Ids are hex-encoded so any character id, step or context maps to a
//! distinct, portable file name. JSON records are written to a temp file and
//! renamed into place.

mod log;

pub use log::FileLog;

use std::fs;
use std::path::{Path, PathBuf};

use advisor_core::{AnchorPair, CharacterId, HistoryEntry, PivotState};
use serde::{Serialize, de::DeserializeOwned};

use crate::repository::{
    AdviceRecord, AdviceRepository, HistoryRepository, IdentityRepository, LastShown,
    RepositoryError, Result,
};

pub struct FileRepository {
    base_dir: PathBuf,
}

impl FileRepository {
    /// Create a new file-based repository rooted at `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn character_dir(&self, character: &CharacterId) -> PathBuf {
        self.base_dir.join(hex::encode(character.as_str()))
    }

    fn history_path(&self, character: &CharacterId) -> PathBuf {
        self.character_dir(character).join("history.log")
    }

    fn record_path(&self, character: &CharacterId, name: &str) -> PathBuf {
        self.character_dir(character).join(name)
    }

    fn keyed_path(&self, character: &CharacterId, kind: &str, key: &str) -> PathBuf {
        self.character_dir(character)
            .join(kind)
            .join(format!("{}.json", hex::encode(key)))
    }

    /// Character ids with a directory under the base dir.
    pub fn list_characters(&self) -> Result<Vec<CharacterId>> {
        let mut characters = Vec::new();
        for entry in fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)? {
            let entry = entry.map_err(RepositoryError::Io)?;
            if let Some(name) = entry.file_name().to_str()
                && let Ok(bytes) = hex::decode(name)
                && let Ok(id) = String::from_utf8(bytes)
            {
                characters.push(CharacterId::new(id));
            }
        }
        characters.sort();
        Ok(characters)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(RepositoryError::Io)?;
    }
    let temp_path = path.with_extension("json.tmp");

    let bytes = serde_json::to_vec_pretty(value).map_err(|e| RepositoryError::Record {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;

    // Same directory, so the rename replaces the record atomically.
    fs::rename(&temp_path, path).map_err(RepositoryError::Io)?;

    tracing::debug!("Saved record to {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(path).map_err(RepositoryError::Io)?;
    let value = serde_json::from_slice(&bytes)
        .map_err(|e| RepositoryError::Record {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(Some(value))
}

impl HistoryRepository for FileRepository {
    fn append(&self, character: &CharacterId, entry: &HistoryEntry) -> Result<()> {
        let mut log = FileLog::open_or_create(self.history_path(character))?;
        log.append(entry)?;
        log.flush()
    }

    fn load(&self, character: &CharacterId) -> Result<Vec<HistoryEntry>> {
        FileLog::read_all(self.history_path(character))
    }
}

impl IdentityRepository for FileRepository {
    fn load_anchors(&self, character: &CharacterId) -> Result<Option<AnchorPair>> {
        read_json(&self.record_path(character, "anchors.json"))
    }

    fn save_anchors(&self, character: &CharacterId, anchors: &AnchorPair) -> Result<()> {
        write_json(&self.record_path(character, "anchors.json"), anchors)
    }

    fn load_pivot(&self, character: &CharacterId) -> Result<Option<PivotState>> {
        read_json(&self.record_path(character, "pivot.json"))
    }

    fn save_pivot(&self, character: &CharacterId, pivot: &PivotState) -> Result<()> {
        write_json(&self.record_path(character, "pivot.json"), pivot)
    }
}

impl AdviceRepository for FileRepository {
    fn load_advice(&self, character: &CharacterId, step: &str) -> Result<Option<AdviceRecord>> {
        read_json(&self.keyed_path(character, "advice", step))
    }

    fn save_advice(&self, character: &CharacterId, record: &AdviceRecord) -> Result<()> {
        write_json(&self.keyed_path(character, "advice", &record.step), record)
    }

    fn load_last_shown(&self, character: &CharacterId, context: &str) -> Result<Option<LastShown>> {
        read_json(&self.keyed_path(character, "shown", context))
    }

    fn save_last_shown(&self, character: &CharacterId, shown: &LastShown) -> Result<()> {
        write_json(&self.keyed_path(character, "shown", &shown.context), shown)
    }
}

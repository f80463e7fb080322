//! Failures of the history log and the per-character record stores.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("in-memory store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode history entry: {0}")]
    Encode(String),

    #[error("history log {} is corrupt at offset {offset}: {reason}", path.display())]
    CorruptLog {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("record {} is unreadable: {reason}", path.display())]
    Record { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

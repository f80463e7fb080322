//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from repositories, providers, and anchor commands so
//! clients can bubble them up with consistent context.
use advisor_core::{AnchorError, Diagnostic, ErrorKind};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("{operation} did not finish within {timeout_ms} ms")]
    PersistenceTimeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("persistence worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("character state unavailable: {0}")]
    StateUnavailable(String),

    #[error(transparent)]
    Anchor(#[from] AnchorError),
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Repository(_) | Self::PersistenceTimeout { .. } | Self::WorkerJoin(_) => {
                ErrorKind::PersistenceFailure
            }
            Self::CatalogUnavailable(_) => ErrorKind::DataUnavailable,
            Self::StateUnavailable(_) | Self::Anchor(_) => ErrorKind::InvalidState,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.kind(), self.to_string())
    }
}

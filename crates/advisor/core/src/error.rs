//! Error classification and diagnostics for the advisory engine.
//!
//! Advisory calls never fail as a whole. Failures are isolated to the
//! smallest unit they affect (one candidate, one state write) and surfaced to
//! the caller as [`Diagnostic`] records instead of being swallowed.
//!
//! # Error kinds
//!
//! - **DataUnavailable**: a catalog or history lookup failed; affected
//!   candidates degrade to the tier-0 fallback
//! - **InvalidState**: malformed character state; documented defaults are
//!   substituted
//! - **ComputationError**: evaluating one candidate failed; only that
//!   candidate is skipped
//! - **PersistenceFailure**: a state write failed; the advisory result is
//!   unaffected

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::AnchorState;
use crate::state::CharacterId;

/// Category of an isolated failure.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    DataUnavailable,
    InvalidState,
    ComputationError,
    PersistenceFailure,
}

impl ErrorKind {
    /// Returns true if the failure changed what the caller sees.
    pub const fn degrades_result(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable | Self::InvalidState | Self::ComputationError
        )
    }
}

/// One isolated failure, reported alongside a (possibly degraded) result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub character_id: Option<CharacterId>,
    pub candidate_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            character_id: None,
            candidate_id: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn for_character(mut self, character_id: CharacterId) -> Self {
        self.character_id = Some(character_id);
        self
    }

    #[must_use]
    pub fn for_candidate(mut self, candidate_id: impl Into<String>) -> Self {
        self.candidate_id = Some(candidate_id.into());
        self
    }
}

/// Failure while evaluating a single candidate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("candidate has an empty id")]
    EmptyCandidateId,

    #[error("candidate {0} appears more than once in the batch")]
    DuplicateCandidate(String),

    #[error("candidate {id} produced a non-finite {what}")]
    NonFinite { id: String, what: &'static str },

    #[error("definition for candidate {0} is unavailable")]
    DefinitionUnavailable(String),
}

impl EvaluationError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DefinitionUnavailable(_) => ErrorKind::DataUnavailable,
            Self::EmptyCandidateId | Self::DuplicateCandidate(_) | Self::NonFinite { .. } => {
                ErrorKind::ComputationError
            }
        }
    }

    pub fn candidate_id(&self) -> Option<&str> {
        match self {
            Self::EmptyCandidateId => None,
            Self::DuplicateCandidate(id)
            | Self::NonFinite { id, .. }
            | Self::DefinitionUnavailable(id) => Some(id),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::new(self.kind(), self.to_string());
        match self.candidate_id() {
            Some(id) => diagnostic.for_candidate(id),
            None => diagnostic,
        }
    }
}

/// Rejected anchor lifecycle command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    #[error("anchor is {state}; only a proposed anchor can be {action}")]
    NotProposed {
        state: AnchorState,
        action: &'static str,
    },

    #[error("archetype {0} has no theme in the theme table")]
    UnknownArchetype(String),
}

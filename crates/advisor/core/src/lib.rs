//! Deterministic character-build advisory engine.
//!
//! `advisor-core` ranks candidate build options for a character, explains
//! each ranking, and tracks the character's emerging build identity. Every
//! API here is pure: no I/O, no async, no global state. Identical inputs
//! always produce identical ordering, hashes, and explanations.
//!
//! The pieces, in pipeline order:
//!
//! - [`snapshot`]: canonical state snapshot and its cache hash
//! - [`suggestion`]: the tier cascade ([`SuggestionEngine`])
//! - [`identity`]: the anchor and pivot state machines
//! - [`cost`]: gated opportunity-cost warnings
//! - [`explain`]: final confidence, buckets, and explanations
//! - [`advisor`]: runs all of the above for one request
pub mod advisor;
pub mod candidate;
pub mod config;
pub mod cost;
pub mod error;
pub mod explain;
pub mod focus;
pub mod history;
pub mod identity;
pub mod snapshot;
pub mod state;
pub mod suggestion;

pub use advisor::{Advice, AdviseOptions, Advisor, IdentityView};
pub use candidate::{CandidateOption, OptionKind, Prerequisite};
pub use config::EngineConfig;
pub use cost::{GoalSignals, OpportunityCost, OpportunityCostAnalyzer};
pub use error::{AnchorError, Diagnostic, ErrorKind, EvaluationError};
pub use explain::{
    AdvisedSuggestion, ConfidenceBreakdown, ConfidenceBucket, ConfidenceScorer, ExplainContext,
    Explainer, LevelBracket, ScoreInput, confidence_bucket,
};
pub use focus::{FocusProfile, FocusTable};
pub use history::{HistoryEntry, Outcome};
pub use identity::{
    AnchorDetection, AnchorEvidence, AnchorPair, AnchorResult, AnchorState, AnchorTransition,
    Archetype, IdentityAnchor, PivotPhase, PivotResult, PivotState, PivotTransition, Theme,
    ThemeAlignment, ThemeTable,
};
pub use snapshot::CharacterSnapshot;
pub use state::{
    AdvisorBias, Attribute, Attributes, BuildGoal, CharacterId, CharacterState,
    PendingSelections, WishlistEntry,
};
pub use suggestion::{
    EvaluateOptions, Evaluation, ReasonAtom, ReasonCode, ReasonDomain, Suggestion,
    SuggestionEngine, Tier, TierWeight, curate_reasons, sort_suggestions,
};

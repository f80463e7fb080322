//! Request and response shapes of [`crate::SuggestionService::get_suggestions`].
use advisor_core::snapshot::fnv1a64;
use advisor_core::{AdvisedSuggestion, Advice, Diagnostic, PendingSelections, Suggestion};
use serde::{Deserialize, Serialize};

/// What the host is asking advice for.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionRequest {
    /// Decision surface the advice is for (`"level_up"`, `"chargen"`, ...).
    pub context: String,
    /// Option domain (`"feat"`, `"talent"`, ...); empty means every option.
    pub domain: String,
    /// Progression focus label; `None` uses the configured default.
    pub focus: Option<String>,
    /// Decision step id. Revisiting an unchanged step replays its advice.
    pub step: Option<String>,
    /// Explicit candidate ids; empty means the whole domain.
    pub candidate_ids: Vec<String>,
    pub pending: PendingSelections,
    /// Also return options that are not yet qualified, with `levels_away`.
    pub include_unqualified: bool,
}

impl SuggestionRequest {
    pub fn new(context: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = Some(focus.into());
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    #[must_use]
    pub fn with_candidates<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_pending(mut self, pending: PendingSelections) -> Self {
        self.pending = pending;
        self
    }

    #[must_use]
    pub fn with_unqualified(mut self, include: bool) -> Self {
        self.include_unqualified = include;
        self
    }

    /// Digest of which options are asked for: the explicit candidate ids
    /// (order-insensitive) and whether unqualified options are scored.
    /// Empty for the plain whole-domain request.
    pub fn selection(&self) -> String {
        if self.candidate_ids.is_empty() && !self.include_unqualified {
            return String::new();
        }
        let mut ids: Vec<&str> = self.candidate_ids.iter().map(String::as_str).collect();
        ids.sort_unstable();
        let canonical = format!("{}\u{1f}{}", ids.join("\u{1f}"), self.include_unqualified);
        format!("{:016x}", fnv1a64(canonical.as_bytes()))
    }
}

/// Where a response came from.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseSource {
    /// Freshly computed.
    Computed,
    /// Cache hit on an unchanged snapshot hash.
    Cached,
    /// Stored advice for an unchanged decision step.
    Replayed,
    /// Persistence failed; the last cached result for the key was reused.
    LastKnownGood,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<Suggestion>,
    pub future: Vec<Suggestion>,
    pub snapshot_hash: String,
    pub source: ResponseSource,
    pub diagnostics: Vec<Diagnostic>,
}

impl SuggestionResponse {
    pub(crate) fn from_advice(advice: Advice, snapshot_hash: String, source: ResponseSource) -> Self {
        Self {
            suggestions: advice.suggestions,
            future: advice.future,
            snapshot_hash,
            source,
            diagnostics: advice.diagnostics,
        }
    }

    pub fn presented(&self) -> Vec<AdvisedSuggestion> {
        self.suggestions.iter().map(AdvisedSuggestion::from).collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.suggestions.iter().map(|s| s.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_ignores_candidate_order() {
        let a = SuggestionRequest::new("level_up", "feat").with_candidates(["cleave", "persuasive"]);
        let b = SuggestionRequest::new("level_up", "feat").with_candidates(["persuasive", "cleave"]);
        assert_eq!(a.selection(), b.selection());
        assert_eq!(a.selection().len(), 16);
    }

    #[test]
    fn selection_tracks_ids_and_future_scoring() {
        let whole = SuggestionRequest::new("level_up", "feat");
        let cleave = whole.clone().with_candidates(["cleave"]);
        let persuasive = whole.clone().with_candidates(["persuasive"]);
        let future = whole.clone().with_unqualified(true);

        assert!(whole.selection().is_empty());
        assert_ne!(cleave.selection(), persuasive.selection());
        assert!(!future.selection().is_empty());
        assert_ne!(cleave.selection(), cleave.clone().with_unqualified(true).selection());
    }
}

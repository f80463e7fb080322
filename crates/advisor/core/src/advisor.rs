//! Synchronous advisory pipeline.
//!
//! [`Advisor::advise`] runs every pure stage for one request:
//! evaluate -> opportunity cost -> final confidence -> explanation ->
//! reason curation -> ordering. Identity state is an input here; updating
//! it is the caller's job.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateOption;
use crate::config::EngineConfig;
use crate::cost::{OpportunityCost, OpportunityCostAnalyzer};
use crate::error::Diagnostic;
use crate::explain::{AdvisedSuggestion, ConfidenceScorer, ExplainContext, Explainer, ScoreInput};
use crate::focus::{FocusProfile, FocusTable};
use crate::identity::{AnchorPair, PivotState, ThemeTable};
use crate::state::{CharacterState, PendingSelections};
use crate::suggestion::{
    EvaluateOptions, ReasonAtom, ReasonCode, Suggestion, SuggestionEngine, curate_reasons,
    sort_suggestions,
};

/// Per-request knobs.
#[derive(Clone, Debug, Default)]
pub struct AdviseOptions {
    pub focus: String,
    pub include_unqualified: bool,
}

/// Ranked, explained output of one request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub suggestions: Vec<Suggestion>,
    pub future: Vec<Suggestion>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Advice {
    pub fn presented(&self) -> Vec<AdvisedSuggestion> {
        self.suggestions.iter().map(AdvisedSuggestion::from).collect()
    }
}

/// Identity state the request is evaluated against.
#[derive(Clone, Copy, Debug)]
pub struct IdentityView<'a> {
    pub anchors: &'a AnchorPair,
    pub pivot: &'a PivotState,
}

pub struct Advisor {
    engine: SuggestionEngine,
    analyzer: OpportunityCostAnalyzer,
    scorer: ConfidenceScorer,
    explainer: Explainer,
    focus: FocusTable,
}

impl Advisor {
    pub fn new(config: EngineConfig, themes: ThemeTable, focus: FocusTable) -> Self {
        Self {
            analyzer: OpportunityCostAnalyzer::new(&config),
            explainer: Explainer::new(config.caveat_min_level),
            scorer: ConfidenceScorer,
            engine: SuggestionEngine::new(config, themes),
            focus,
        }
    }

    pub fn engine(&self) -> &SuggestionEngine {
        &self.engine
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    pub fn themes(&self) -> &ThemeTable {
        self.engine.themes()
    }

    pub fn focus_table(&self) -> &FocusTable {
        &self.focus
    }

    pub fn analyzer(&self) -> &OpportunityCostAnalyzer {
        &self.analyzer
    }

    pub fn explainer(&self) -> &Explainer {
        &self.explainer
    }

    pub fn advise(
        &self,
        candidates: &[CandidateOption],
        state: &CharacterState,
        pending: &PendingSelections,
        identity: IdentityView<'_>,
        options: &AdviseOptions,
    ) -> Advice {
        let evaluation = self.engine.evaluate_with(
            candidates,
            state,
            pending,
            &EvaluateOptions {
                anchor: Some(&identity.anchors.primary),
                include_unqualified: options.include_unqualified,
            },
        );
        // Same substitutions the engine applied; diagnostics already recorded.
        let (state, _) = state.sanitized();
        let profile = self.focus.resolve(&options.focus);
        let by_id: HashMap<&str, &CandidateOption> =
            candidates.iter().map(|c| (c.id.as_str(), c)).collect();

        let mut suggestions: Vec<Suggestion> = evaluation
            .suggestions
            .into_iter()
            .map(|s| {
                let cost = by_id
                    .get(s.id.as_str())
                    .map(|c| self.analyzer.compute(c, &state, &identity.anchors.primary))
                    .unwrap_or_default();
                self.finish(s, cost, &state, identity, &profile)
            })
            .collect();
        let mut future: Vec<Suggestion> = evaluation
            .future
            .into_iter()
            .map(|s| self.finish(s, OpportunityCost::none(), &state, identity, &profile))
            .collect();

        sort_suggestions(&mut suggestions);
        sort_suggestions(&mut future);

        tracing::debug!(
            character = %state.id,
            focus = %options.focus,
            suggestions = suggestions.len(),
            future = future.len(),
            "advice assembled"
        );

        Advice {
            suggestions,
            future,
            diagnostics: evaluation.diagnostics,
        }
    }

    /// Final confidence, explanation and curated reasons for one suggestion.
    pub fn finish(
        &self,
        suggestion: Suggestion,
        cost: OpportunityCost,
        state: &CharacterState,
        identity: IdentityView<'_>,
        profile: &FocusProfile,
    ) -> Suggestion {
        let themes = self.engine.themes();
        let breakdown = self.scorer.score(ScoreInput {
            engine_confidence: suggestion.confidence,
            theme: suggestion.theme.as_ref(),
            anchor: &identity.anchors.primary,
            pivot: identity.pivot,
            themes,
            cost: cost.cost,
        });

        let explanation = self.explainer.explain(
            &suggestion,
            state,
            &ExplainContext {
                anchor: &identity.anchors.primary,
                pivot: identity.pivot,
                themes,
            },
            &cost.reasons,
        );

        let mut reasons = suggestion.reasons.clone();
        if breakdown.was_nudged() {
            reasons.push(ReasonAtom::new(
                ReasonCode::PivotNudge,
                "Worth a look while your build explores new directions.",
                0.3,
            ));
        }
        for reason in &cost.reasons {
            reasons.push(ReasonAtom::new(
                ReasonCode::OpportunityCost,
                format!("Keep in mind that {reason}."),
                0.5,
            ));
        }
        reasons.push(ReasonAtom::trace(format!(
            "engine {:.3} anchored {:.3} nudged {:.3} cost {:.3} final {:.3}",
            breakdown.engine, breakdown.anchored, breakdown.nudged, breakdown.cost, breakdown.value
        )));
        let reasons = curate_reasons(&reasons, profile, self.config().max_display_reasons);

        Suggestion {
            confidence: breakdown.value,
            reasons,
            cost: (!cost.is_silent()).then_some(cost),
            explanation,
            ..suggestion
        }
    }
}

//! Confidence scoring, explanations, and the presentation DTO.

mod confidence;
mod explainer;

pub use confidence::{
    ConfidenceBreakdown, ConfidenceBucket, ConfidenceScorer, ScoreInput, confidence_bucket,
};
pub use explainer::{ExplainContext, Explainer, LevelBracket, soften};

use serde::{Deserialize, Serialize};

use crate::suggestion::{ReasonCode, Suggestion};

/// What the presentation layer receives for one suggestion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisedSuggestion {
    pub target_ref: String,
    pub name: String,
    pub tier: u8,
    pub reason_code: ReasonCode,
    pub confidence: f32,
    pub bucket: ConfidenceBucket,
    /// Curated, player-safe reason texts.
    pub reasons: Vec<String>,
    pub explanation: String,
    pub cost_reasons: Vec<String>,
    pub levels_away: Option<u32>,
}

impl From<&Suggestion> for AdvisedSuggestion {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            target_ref: suggestion.id.clone(),
            name: suggestion.name.clone(),
            tier: suggestion.tier.value(),
            reason_code: suggestion.reason_code,
            confidence: suggestion.confidence,
            bucket: confidence_bucket(suggestion.confidence),
            reasons: suggestion
                .reasons
                .iter()
                .filter(|r| r.safe)
                .map(|r| r.text.clone())
                .collect(),
            explanation: suggestion.explanation.clone(),
            cost_reasons: suggestion.cost_reasons().to_vec(),
            levels_away: suggestion.levels_away,
        }
    }
}

//! Final confidence: engine score, then identity and pivot adjustments, then
//! the opportunity-cost discount.

use serde::{Deserialize, Serialize};

use crate::identity::{IdentityAnchor, PivotState, Theme, ThemeTable};

/// Display bucket for a final confidence.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBucket {
    Possible,
    Suggested,
    Strong,
}

impl ConfidenceBucket {
    pub const STRONG_AT: f32 = 0.7;
    pub const SUGGESTED_AT: f32 = 0.4;
}

pub fn confidence_bucket(confidence: f32) -> ConfidenceBucket {
    if confidence >= ConfidenceBucket::STRONG_AT {
        ConfidenceBucket::Strong
    } else if confidence >= ConfidenceBucket::SUGGESTED_AT {
        ConfidenceBucket::Suggested
    } else {
        ConfidenceBucket::Possible
    }
}

/// Inputs for one candidate.
#[derive(Clone, Copy, Debug)]
pub struct ScoreInput<'a> {
    pub engine_confidence: f32,
    pub theme: Option<&'a Theme>,
    pub anchor: &'a IdentityAnchor,
    pub pivot: &'a PivotState,
    pub themes: &'a ThemeTable,
    pub cost: f32,
}

/// Every intermediate value, kept for traces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub engine: f32,
    pub anchored: f32,
    pub nudged: f32,
    pub cost: f32,
    pub value: f32,
}

impl ConfidenceBreakdown {
    /// True if the pivot detector lifted this score.
    pub fn was_nudged(&self) -> bool {
        self.nudged > self.anchored
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn score(&self, input: ScoreInput<'_>) -> ConfidenceBreakdown {
        let engine = input.engine_confidence;
        let anchored = input
            .anchor
            .adjust_confidence(input.theme, input.themes, engine);
        let nudged = input.pivot.nudge(anchored);
        // NaN costs count as zero.
        let cost = input.cost.max(0.0);
        let value = (nudged - cost).clamp(0.0, 1.0);
        ConfidenceBreakdown {
            engine,
            anchored,
            nudged,
            cost,
            value,
        }
    }
}

//! Tiered suggestion engine.
//!
//! Each candidate is classified by a strict priority cascade (see
//! [`engine`]) into a [`Tier`], a primary [`ReasonCode`] and a base
//! confidence. The service layer later adds anchor, pivot and cost
//! adjustments, an explanation, and curated display reasons.

pub mod curate;
pub mod engine;
mod future;
pub mod ordering;
mod reason;
mod tier;

pub use curate::curate_reasons;
pub use engine::{EvaluateOptions, Evaluation, SuggestionEngine};
pub use future::levels_away;
pub use ordering::sort_suggestions;
pub use reason::{ReasonAtom, ReasonCode, ReasonDomain};
pub use tier::{Tier, TierWeight};

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateOption;
use crate::cost::OpportunityCost;
use crate::identity::Theme;

/// A scored recommendation for one candidate.
///
/// Produced fresh per evaluation. Later pipeline stages build a new value
/// with `..` struct update rather than mutating a shared one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Candidate id; also the target reference handed to presentation.
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub tier_weight: TierWeight,
    pub reason_code: ReasonCode,
    /// The goal, wishlist item, owned option or attribute that triggered
    /// the primary reason.
    pub source_id: Option<String>,
    pub confidence: f32,
    pub reasons: Vec<ReasonAtom>,
    pub theme: Option<Theme>,
    /// Levels until an unqualified candidate becomes available.
    pub levels_away: Option<u32>,
    pub cost: Option<OpportunityCost>,
    pub explanation: String,
}

impl Suggestion {
    pub(crate) fn new(candidate: &CandidateOption, tier: Tier, reason_code: ReasonCode) -> Self {
        Self {
            id: candidate.id.clone(),
            name: candidate.display_name().to_string(),
            tier,
            tier_weight: TierWeight::of(tier),
            reason_code,
            source_id: None,
            confidence: tier.base_confidence(),
            reasons: Vec::new(),
            theme: candidate.theme.clone(),
            levels_away: None,
            cost: None,
            explanation: String::new(),
        }
    }

    /// Tier-0 stand-in for a candidate whose definition could not be loaded.
    pub fn fallback(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            reasons: vec![ReasonAtom::new(
                ReasonCode::Fallback,
                "Available, though details could not be loaded right now.",
                0.2,
            )],
            ..Self::new(
                &CandidateOption {
                    id,
                    ..CandidateOption::default()
                },
                Tier::FALLBACK,
                ReasonCode::Fallback,
            )
        }
    }

    /// The first player-presentable reason.
    pub fn primary_reason(&self) -> Option<&ReasonAtom> {
        self.reasons.iter().find(|r| r.safe)
    }

    pub fn cost_reasons(&self) -> &[String] {
        self.cost.as_ref().map_or(&[], |c| c.reasons.as_slice())
    }
}

/// Display form of an id: `"power_attack"` -> `"Power Attack"`.
pub(crate) fn humanize(id: &str) -> String {
    id.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

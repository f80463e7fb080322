//! Reason atoms: the individual justifications attached to a suggestion.

use serde::{Deserialize, Serialize};

/// Broad area a reason speaks to. Progression foci show or hide whole domains.
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
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReasonDomain {
    Goal,
    Wishlist,
    Synergy,
    Heritage,
    Chain,
    Archetype,
    Skill,
    Attribute,
    Class,
    Cost,
    Pivot,
    General,
}

/// Why a suggestion was made. The primary code of a suggestion also names
/// the rule that decided its tier.
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
pub enum ReasonCode {
    GoalPrerequisite,
    WishlistPrerequisite,
    StrongSynergy,
    HeritageAligned,
    ChainContinuation,
    ArchetypeMatch,
    InferredGoalMatch,
    AdvisorBiasMatch,
    TrainedSkillMatch,
    HighestAttribute,
    ClassTheme,
    Legal,
    FutureAvailability,
    Fallback,
    OpportunityCost,
    PivotNudge,
    /// Internal scoring trace; never shown.
    ScoreTrace,
}

impl ReasonCode {
    pub const fn domain(self) -> ReasonDomain {
        match self {
            Self::GoalPrerequisite | Self::InferredGoalMatch => ReasonDomain::Goal,
            Self::WishlistPrerequisite => ReasonDomain::Wishlist,
            Self::StrongSynergy | Self::AdvisorBiasMatch => ReasonDomain::Synergy,
            Self::HeritageAligned => ReasonDomain::Heritage,
            Self::ChainContinuation => ReasonDomain::Chain,
            Self::ArchetypeMatch => ReasonDomain::Archetype,
            Self::TrainedSkillMatch => ReasonDomain::Skill,
            Self::HighestAttribute => ReasonDomain::Attribute,
            Self::ClassTheme => ReasonDomain::Class,
            Self::OpportunityCost => ReasonDomain::Cost,
            Self::PivotNudge => ReasonDomain::Pivot,
            Self::Legal | Self::FutureAvailability | Self::Fallback | Self::ScoreTrace => {
                ReasonDomain::General
            }
        }
    }
}

/// A single justification.
///
/// `safe` atoms may be shown to the player; unsafe ones are internal traces
/// and are dropped before display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReasonAtom {
    pub domain: ReasonDomain,
    pub code: ReasonCode,
    pub text: String,
    pub safe: bool,
    /// Relative weight in `[0, 1]` used when ranking reasons for display.
    pub strength: f32,
}

impl ReasonAtom {
    /// A player-presentable reason in the code's own domain.
    pub fn new(code: ReasonCode, text: impl Into<String>, strength: f32) -> Self {
        Self {
            domain: code.domain(),
            code,
            text: text.into(),
            safe: true,
            strength: strength.clamp(0.0, 1.0),
        }
    }

    /// An internal-only trace.
    pub fn trace(text: impl Into<String>) -> Self {
        Self {
            safe: false,
            ..Self::new(ReasonCode::ScoreTrace, text, 0.0)
        }
    }
}

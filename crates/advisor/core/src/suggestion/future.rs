//! Future-availability scoring for candidates the character cannot take yet.

use super::{ReasonAtom, ReasonCode, Suggestion, Tier};
use crate::candidate::CandidateOption;
use crate::state::{CharacterState, PendingSelections};

const BASE: f32 = 0.30;
const PER_LEVEL: f32 = 0.05;
const FLOOR: f32 = 0.05;

/// Levels until every unmet prerequisite could be satisfied; the slowest
/// requirement decides. `None` if no amount of levelling qualifies.
pub fn levels_away(
    candidate: &CandidateOption,
    state: &CharacterState,
    pending: &PendingSelections,
) -> Option<u32> {
    candidate
        .unmet(state, pending)
        .map(|p| p.levels_until_met(state, pending))
        .try_fold(0, |slowest, levels| levels.map(|l| slowest.max(l)))
}

/// Tier-0 suggestion carrying `levels_away`. Never a synergy tier.
pub(super) fn future_suggestion(candidate: &CandidateOption, levels: u32) -> Suggestion {
    let confidence = (BASE - PER_LEVEL * levels as f32).max(FLOOR);
    let text = match levels {
        0 | 1 => "Within reach after your next level.".to_string(),
        n => format!("Within reach in about {n} levels."),
    };
    Suggestion {
        confidence,
        levels_away: Some(levels),
        reasons: vec![ReasonAtom::new(ReasonCode::FutureAvailability, text, 0.3)],
        ..Suggestion::new(candidate, Tier::FALLBACK, ReasonCode::FutureAvailability)
    }
}

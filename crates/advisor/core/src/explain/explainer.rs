//! Template-based explanations.
//!
//! An explanation is the suggestion's lead reason, followed by a sentence
//! chosen by (anchor state × theme alignment × level bracket), softened while
//! the pivot detector is exploring, plus at most one cost caveat. Scores and
//! internal codes never appear in the text.

use crate::identity::{AnchorState, Archetype, IdentityAnchor, PivotState, ThemeAlignment, ThemeTable};
use crate::state::CharacterState;
use crate::suggestion::Suggestion;

/// Level bracket used to pick template wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LevelBracket {
    /// Levels 1-5.
    Early,
    /// Levels 6-12.
    Mid,
    /// Level 13 and up.
    Late,
}

impl LevelBracket {
    pub const fn of(level: u32) -> Self {
        match level {
            0..=5 => Self::Early,
            6..=12 => Self::Mid,
            _ => Self::Late,
        }
    }
}

/// Anchor state as seen by templates. A released anchor reads as none.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AnchorView {
    NoAnchor,
    Proposed,
    Locked,
    Weakening,
}

impl From<AnchorState> for AnchorView {
    fn from(state: AnchorState) -> Self {
        match state {
            AnchorState::Proposed => Self::Proposed,
            AnchorState::Locked => Self::Locked,
            AnchorState::Weakening => Self::Weakening,
            AnchorState::None | AnchorState::Released => Self::NoAnchor,
        }
    }
}

/// Absolute phrasing and its tentative replacement.
const SOFTENING: &[(&str, &str)] = &[
    ("is a natural fit for", "could work well for"),
    ("is exactly what", "may be what"),
    ("would reinforce", "might reinforce"),
    ("steps away from", "may step away from"),
    ("is still a solid option", "could still be worth a look"),
    ("continues your move away from", "may continue your move away from"),
    ("will help define", "can help shape"),
    ("rounds out", "could round out"),
];

const FALLBACK_LEAD: &str = "A legal option for your build.";

/// Identity state an explanation is written against.
#[derive(Clone, Copy, Debug)]
pub struct ExplainContext<'a> {
    pub anchor: &'a IdentityAnchor,
    pub pivot: &'a PivotState,
    pub themes: &'a ThemeTable,
}

pub struct Explainer {
    caveat_min_level: u32,
}

impl Explainer {
    pub fn new(caveat_min_level: u32) -> Self {
        Self { caveat_min_level }
    }

    pub fn explain(
        &self,
        suggestion: &Suggestion,
        state: &CharacterState,
        context: &ExplainContext<'_>,
        cost_reasons: &[String],
    ) -> String {
        let mut sentences: Vec<String> = Vec::with_capacity(3);
        sentences.push(
            suggestion
                .primary_reason()
                .map_or_else(|| FALLBACK_LEAD.to_string(), |r| r.text.clone()),
        );

        let view = AnchorView::from(context.anchor.state);
        let alignment = context
            .anchor
            .alignment(suggestion.theme.as_ref(), context.themes);
        let bracket = LevelBracket::of(state.level);
        let archetype = context.anchor.archetype.as_ref();

        if let Some(sentence) = template(view, alignment, bracket, archetype) {
            let sentence = if context.pivot.phase.is_exploring() {
                soften(&sentence)
            } else {
                sentence
            };
            sentences.push(sentence);
        }

        if state.level >= self.caveat_min_level && !cost_reasons.is_empty() {
            sentences.push(caveat(cost_reasons));
        }

        sentences.join(" ")
    }
}

/// Replaces absolute phrasing with tentative phrasing.
pub fn soften(text: &str) -> String {
    SOFTENING
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// One sentence covering every cost reason.
fn caveat(reasons: &[String]) -> String {
    let body = match reasons {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    };
    format!("Worth noting: {body}.")
}

fn template(
    view: AnchorView,
    alignment: ThemeAlignment,
    bracket: LevelBracket,
    archetype: Option<&Archetype>,
) -> Option<String> {
    use AnchorView::*;
    use LevelBracket::*;
    use ThemeAlignment::*;

    let label = archetype.map(Archetype::label);
    let name = label.as_deref().unwrap_or("chosen");

    let text = match (view, alignment, bracket) {
        (NoAnchor, _, Early) => "Choices like this one will help define what your character becomes.".to_string(),
        (NoAnchor, _, Mid) => "It keeps your options open while your style takes shape.".to_string(),
        (NoAnchor, _, Late) => "It rounds out a varied build.".to_string(),

        (Proposed, Match, _) => format!("It is exactly what the {name} direction of your recent picks calls for."),
        (Proposed, Mismatch, _) => format!("It differs from the {name} direction your recent picks suggest."),
        (Proposed, Neutral, _) => return None,

        (Locked, Match, Early) => format!("It is a natural fit for your {name} build."),
        (Locked, Match, Mid) => format!("It is a natural fit for the {name} you have been building."),
        (Locked, Match, Late) => format!("It is a natural fit for a seasoned {name}."),
        (Locked, Mismatch, Early | Mid) => {
            format!("It steps away from your {name} focus, but is still a solid option.")
        }
        (Locked, Mismatch, Late) => {
            format!("It steps away from your established {name} identity, but is still a solid option.")
        }
        (Locked, Neutral, _) => format!("It works alongside your {name} build."),

        (Weakening, Match, _) => format!("It would reinforce your {name} identity."),
        (Weakening, Mismatch, _) => format!("It continues your move away from the {name} build."),
        (Weakening, Neutral, _) => return None,
    };
    Some(text)
}

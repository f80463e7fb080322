//! Character state as supplied by the host application.
//!
//! This is the read-only input of every advisory request. The engine never
//! mutates it; [`CharacterState::sanitized`] produces a corrected copy plus
//! diagnostics when the host sends something malformed.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::attributes::{Attribute, Attributes};
use crate::error::{Diagnostic, ErrorKind};
use crate::identity::Theme;

/// Stable identifier of a character across requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CharacterId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A long-range goal the player is actively pursuing (a prestige class,
/// a capstone talent, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildGoal {
    pub id: String,
    pub name: String,
    /// Option ids that must be owned before the goal can be taken.
    pub required_options: Vec<String>,
    /// Specializations and talent trees that cluster around this goal.
    pub related_options: Vec<String>,
    /// Attributes the goal typically scales from.
    pub typical_attributes: Vec<Attribute>,
}

impl BuildGoal {
    /// Required options the character does not own yet.
    pub fn remaining<'a>(&'a self, state: &'a CharacterState) -> impl Iterator<Item = &'a String> {
        self.required_options.iter().filter(|id| !state.owns(id))
    }

    pub fn owned_count(&self, state: &CharacterState) -> usize {
        self.required_options
            .iter()
            .filter(|id| state.owns(id))
            .count()
    }

    pub fn requires(&self, option_id: &str) -> bool {
        self.required_options.iter().any(|id| id == option_id)
    }
}

/// An item the player saved for later.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WishlistEntry {
    pub id: String,
    pub name: String,
    pub required_options: Vec<String>,
}

/// A standing preference expressed through the host's advisor persona.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdvisorBias {
    pub theme: Theme,
    /// How strongly the bias should weigh, in `[0, 1]`.
    #[serde(default)]
    pub conviction: f32,
}

/// Selections made during the current decision step that are not yet
/// committed to the character.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingSelections {
    pub selections: Vec<String>,
}

impl PendingSelections {
    pub fn new<I, S>(selections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selections: selections.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selections.iter().any(|s| s == id)
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Mechanical state of a character plus the player's declared intentions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterState {
    pub id: CharacterId,
    pub level: u32,
    pub species_id: String,
    pub class_ids: Vec<String>,
    pub attributes: Attributes,
    pub trained_skills: Vec<String>,
    pub skill_ranks: BTreeMap<String, u32>,
    pub feats: Vec<String>,
    pub talents: Vec<String>,
    pub powers: Vec<String>,
    pub proficiencies: Vec<String>,
    pub goals: Vec<BuildGoal>,
    pub wishlist: Vec<WishlistEntry>,
    pub inferred_goals: Vec<String>,
    pub advisor_bias: Option<AdvisorBias>,
}

impl Default for CharacterState {
    /// Documented fallback: level 1, zero attributes, empty collections.
    fn default() -> Self {
        Self {
            id: CharacterId::default(),
            level: 1,
            species_id: String::new(),
            class_ids: Vec::new(),
            attributes: Attributes::default(),
            trained_skills: Vec::new(),
            skill_ranks: BTreeMap::new(),
            feats: Vec::new(),
            talents: Vec::new(),
            powers: Vec::new(),
            proficiencies: Vec::new(),
            goals: Vec::new(),
            wishlist: Vec::new(),
            inferred_goals: Vec::new(),
            advisor_bias: None,
        }
    }
}

impl CharacterState {
    pub fn new(id: impl Into<String>, level: u32) -> Self {
        Self {
            id: CharacterId::new(id),
            level,
            ..Self::default()
        }
    }

    /// True if the character already has the option (feat, talent, power,
    /// proficiency, or class).
    pub fn owns(&self, option_id: &str) -> bool {
        self.owned_ids().any(|id| id == option_id)
    }

    /// True if owned, or selected earlier in the current decision step.
    pub fn owns_or_pending(&self, option_id: &str, pending: &PendingSelections) -> bool {
        self.owns(option_id) || pending.contains(option_id)
    }

    pub fn owned_ids(&self) -> impl Iterator<Item = &String> {
        self.feats
            .iter()
            .chain(self.talents.iter())
            .chain(self.powers.iter())
            .chain(self.proficiencies.iter())
            .chain(self.class_ids.iter())
    }

    pub fn is_trained(&self, skill: &str) -> bool {
        self.trained_skills
            .iter()
            .any(|s| s.eq_ignore_ascii_case(skill))
    }

    /// Rank in a skill; a trained skill without explicit ranks counts as 1.
    pub fn rank(&self, skill: &str) -> u32 {
        self.skill_ranks
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(skill))
            .map(|(_, rank)| *rank)
            .unwrap_or_else(|| u32::from(self.is_trained(skill)))
    }

    pub fn has_class(&self, class_id: &str) -> bool {
        self.class_ids
            .iter()
            .any(|c| c.eq_ignore_ascii_case(class_id))
    }

    /// Returns a copy with documented defaults substituted for malformed
    /// fields, and one diagnostic per substitution.
    pub fn sanitized(&self) -> (CharacterState, Vec<Diagnostic>) {
        let mut state = self.clone();
        let mut diagnostics = Vec::new();
        let mut invalid = |message: String| {
            diagnostics.push(Diagnostic::new(ErrorKind::InvalidState, message));
        };

        if state.level == 0 {
            invalid("level 0 replaced with level 1".to_string());
            state.level = 1;
        }

        for attribute in state.attributes.clamp_scores() {
            invalid(format!("{attribute} score clamped into range"));
        }

        let lists: [(&str, &mut Vec<String>); 7] = [
            ("class_ids", &mut state.class_ids),
            ("trained_skills", &mut state.trained_skills),
            ("feats", &mut state.feats),
            ("talents", &mut state.talents),
            ("powers", &mut state.powers),
            ("proficiencies", &mut state.proficiencies),
            ("inferred_goals", &mut state.inferred_goals),
        ];
        for (field, list) in lists {
            let before = list.len();
            list.retain(|id| !id.trim().is_empty());
            if list.len() != before {
                invalid(format!("{} blank entries dropped from {field}", before - list.len()));
            }
        }

        if let Some(bias) = state.advisor_bias.as_mut() {
            if !bias.conviction.is_finite() {
                invalid("non-finite advisor conviction replaced with 0".to_string());
                bias.conviction = 0.0;
            } else if !(0.0..=1.0).contains(&bias.conviction) {
                invalid("advisor conviction clamped into [0, 1]".to_string());
                bias.conviction = bias.conviction.clamp(0.0, 1.0);
            }
        }

        let character = state.id.clone();
        let diagnostics = diagnostics
            .into_iter()
            .map(|d| d.for_character(character.clone()))
            .collect();

        (state, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_documented_defaults() {
        let state: CharacterState = serde_json::from_str(r#"{"id": "pc-1"}"#).unwrap();
        assert_eq!(state.level, 1);
        assert_eq!(state.attributes, Attributes::default());
        assert!(state.feats.is_empty());
        assert!(state.advisor_bias.is_none());
    }

    #[test]
    fn sanitize_repairs_malformed_state() {
        let mut state = CharacterState::new("pc-1", 0);
        state.attributes.charisma = 250;
        state.feats = vec!["power_attack".into(), "  ".into()];
        state.advisor_bias = Some(AdvisorBias {
            theme: Theme::new("melee"),
            conviction: f32::NAN,
        });

        let (clean, diagnostics) = state.sanitized();

        assert_eq!(clean.level, 1);
        assert_eq!(clean.attributes.charisma, Attributes::MAX_SCORE);
        assert_eq!(clean.feats, vec!["power_attack".to_string()]);
        assert_eq!(clean.advisor_bias.map(|b| b.conviction), Some(0.0));
        assert_eq!(diagnostics.len(), 4);
        assert!(diagnostics.iter().all(|d| d.kind == ErrorKind::InvalidState));
    }

    #[test]
    fn ownership_spans_all_selection_lists() {
        let mut state = CharacterState::new("pc-1", 3);
        state.talents.push("block".into());
        state.class_ids.push("soldier".into());
        let pending = PendingSelections::new(["deflect"]);

        assert!(state.owns("block"));
        assert!(state.owns("soldier"));
        assert!(!state.owns("deflect"));
        assert!(state.owns_or_pending("deflect", &pending));
    }

    #[test]
    fn trained_skill_without_ranks_counts_as_rank_one() {
        let mut state = CharacterState::new("pc-1", 3);
        state.trained_skills.push("Stealth".into());
        state.skill_ranks.insert("mechanics".into(), 4);

        assert_eq!(state.rank("stealth"), 1);
        assert_eq!(state.rank("Mechanics"), 4);
        assert_eq!(state.rank("persuasion"), 0);
    }
}

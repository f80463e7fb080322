//! Candidate build options and their structured prerequisites.
//!
//! Options come from an external catalog and are read-only to the engine.
//! Prerequisites are structured at ingestion time; the free-text
//! `prerequisite_description` is kept for display only.

use serde::{Deserialize, Serialize};

use crate::identity::Theme;
use crate::state::{Attribute, CharacterState, PendingSelections};

/// What kind of selection an option is.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OptionKind {
    #[default]
    Feat,
    Talent,
    Power,
    Class,
    Specialization,
    Proficiency,
    Skill,
}

/// A single hard requirement of an option.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Prerequisite {
    /// Minimum attribute score.
    Attribute { attribute: Attribute, min: i32 },
    /// Skill must be trained.
    Skill { skill: String },
    /// Minimum rank in a skill.
    Rank { skill: String, min: u32 },
    /// Minimum character level.
    Level { min: u32 },
    /// Another option must be owned.
    Option { id: String },
    /// Character must have the class.
    Class { id: String },
    /// Character must be of the species.
    Species { id: String },
}

impl Prerequisite {
    pub fn is_met(&self, state: &CharacterState, pending: &PendingSelections) -> bool {
        match self {
            Prerequisite::Attribute { attribute, min } => state.attributes.get(*attribute) >= *min,
            Prerequisite::Skill { skill } => state.is_trained(skill),
            Prerequisite::Rank { skill, min } => state.rank(skill) >= *min,
            Prerequisite::Level { min } => state.level >= *min,
            Prerequisite::Option { id } => state.owns_or_pending(id, pending),
            Prerequisite::Class { id } => state.has_class(id),
            Prerequisite::Species { id } => state.species_id.eq_ignore_ascii_case(id),
        }
    }

    /// Levels until the requirement could be met, or `None` if levelling up
    /// never satisfies it.
    ///
    /// Attribute increases arrive every [`Self::LEVELS_PER_ATTRIBUTE_POINT`]
    /// levels; ranks, trained skills, and owned options can be picked up one
    /// per level.
    pub fn levels_until_met(&self, state: &CharacterState, pending: &PendingSelections) -> Option<u32> {
        if self.is_met(state, pending) {
            return Some(0);
        }
        match self {
            Prerequisite::Attribute { attribute, min } => {
                let gap = min.saturating_sub(state.attributes.get(*attribute)).max(0) as u32;
                Some(gap.saturating_mul(Self::LEVELS_PER_ATTRIBUTE_POINT))
            }
            Prerequisite::Rank { skill, min } => Some(min.saturating_sub(state.rank(skill))),
            Prerequisite::Level { min } => Some(min.saturating_sub(state.level)),
            Prerequisite::Skill { .. } | Prerequisite::Option { .. } => Some(1),
            Prerequisite::Class { .. } | Prerequisite::Species { .. } => None,
        }
    }

    pub const LEVELS_PER_ATTRIBUTE_POINT: u32 = 4;
}

/// An evaluable build option supplied by the catalog.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateOption {
    pub id: String,
    pub name: String,
    pub kind: OptionKind,
    pub prerequisite_description: String,
    pub prerequisites: Vec<Prerequisite>,
    pub tags: Vec<String>,
    pub category: String,
    pub theme: Option<Theme>,
    /// Attributes the option scales from.
    pub scaling_attributes: Vec<Attribute>,
    /// Option ids this one combines strongly with.
    pub synergies: Vec<String>,
    /// Option ids this one is mutually exclusive with.
    pub exclusive_with: Vec<String>,
    /// Species ids for which this is a heritage option.
    pub heritage: Vec<String>,
}

impl CandidateOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<Theme>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    #[must_use]
    pub fn with_prerequisite(mut self, prerequisite: Prerequisite) -> Self {
        self.prerequisites.push(prerequisite);
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_scaling(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.scaling_attributes.extend(attributes);
        self
    }

    #[must_use]
    pub fn with_synergies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synergies.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_exclusions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusive_with.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_heritage<I, S>(mut self, species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.heritage.extend(species.into_iter().map(Into::into));
        self
    }

    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    pub fn unmet<'a>(
        &'a self,
        state: &'a CharacterState,
        pending: &'a PendingSelections,
    ) -> impl Iterator<Item = &'a Prerequisite> {
        self.prerequisites
            .iter()
            .filter(move |p| !p.is_met(state, pending))
    }

    pub fn qualifies(&self, state: &CharacterState, pending: &PendingSelections) -> bool {
        self.unmet(state, pending).next().is_none()
    }

    /// Attributes the option depends on: scaling attributes plus attribute
    /// prerequisites, deduplicated in first-seen order.
    pub fn required_attributes(&self) -> Vec<Attribute> {
        let mut attributes = self.scaling_attributes.clone();
        for prerequisite in &self.prerequisites {
            if let Prerequisite::Attribute { attribute, .. } = prerequisite
                && !attributes.contains(attribute)
            {
                attributes.push(*attribute);
            }
        }
        attributes
    }

    /// Owned options this one builds on directly.
    pub fn chained_from<'a>(
        &'a self,
        state: &'a CharacterState,
    ) -> impl Iterator<Item = &'a String> {
        self.prerequisites.iter().filter_map(move |p| match p {
            Prerequisite::Option { id } if state.owns(id) => Some(id),
            _ => None,
        })
    }
}

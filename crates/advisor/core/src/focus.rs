//! Progression focus: which reason domains are visible under a focus label.
//!
//! Focus is visibility gating only. It decides which reasons are shown and
//! how they are ranked; it never changes a tier or a confidence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::suggestion::ReasonDomain;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FocusProfile {
    /// Domains shown under this focus.
    pub visible: Vec<ReasonDomain>,
    /// Visible domains ranked ahead of the rest.
    #[serde(default)]
    pub emphasis: Vec<ReasonDomain>,
}

impl FocusProfile {
    pub const EMPHASIS_WEIGHT: f32 = 1.5;
    pub const COST_WEIGHT: f32 = 0.8;

    /// Every domain visible, nothing emphasized.
    pub fn all() -> Self {
        Self {
            visible: ReasonDomain::iter().collect(),
            emphasis: Vec::new(),
        }
    }

    pub fn is_visible(&self, domain: ReasonDomain) -> bool {
        self.visible.contains(&domain)
    }

    /// Multiplier applied to a reason's strength when ranking reasons.
    pub fn domain_weight(&self, domain: ReasonDomain) -> f32 {
        if domain == ReasonDomain::Cost {
            Self::COST_WEIGHT
        } else if self.emphasis.contains(&domain) {
            Self::EMPHASIS_WEIGHT
        } else {
            1.0
        }
    }
}

/// Focus label -> profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FocusTable {
    profiles: BTreeMap<String, FocusProfile>,
}

impl FocusTable {
    pub const BALANCED: &'static str = "balanced";

    pub fn empty() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, label: impl AsRef<str>, profile: FocusProfile) {
        self.profiles
            .insert(label.as_ref().trim().to_ascii_lowercase(), profile);
    }

    pub fn get(&self, label: &str) -> Option<&FocusProfile> {
        self.profiles.get(&label.trim().to_ascii_lowercase())
    }

    /// Profile for `label`; unknown labels fall back to `balanced`, and a
    /// table without `balanced` falls back to showing everything.
    pub fn resolve(&self, label: &str) -> FocusProfile {
        self.get(label)
            .or_else(|| self.get(Self::BALANCED))
            .cloned()
            .unwrap_or_else(FocusProfile::all)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}

impl Default for FocusTable {
    fn default() -> Self {
        use ReasonDomain::*;

        let mut table = Self::empty();
        table.insert(Self::BALANCED, FocusProfile::all());
        table.insert(
            "combat",
            FocusProfile {
                visible: vec![Goal, Synergy, Chain, Attribute, Archetype, Class],
                emphasis: vec![Synergy, Attribute],
            },
        );
        table.insert(
            "roleplay",
            FocusProfile {
                visible: vec![Heritage, Archetype, Class, Skill, General],
                emphasis: vec![Heritage, Archetype],
            },
        );
        table.insert(
            "optimization",
            FocusProfile {
                visible: vec![Goal, Wishlist, Synergy, Chain, Attribute, Cost],
                emphasis: vec![Goal, Wishlist],
            },
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_foci_are_present() {
        let table = FocusTable::default();
        let labels: Vec<_> = table.labels().collect();
        assert_eq!(labels, vec!["balanced", "combat", "optimization", "roleplay"]);
        assert!(table.resolve("Combat").is_visible(ReasonDomain::Chain));
        assert!(!table.resolve("combat").is_visible(ReasonDomain::Heritage));
    }

    #[test]
    fn unknown_focus_falls_back_to_balanced() {
        let table = FocusTable::default();
        assert_eq!(table.resolve("speedrun"), FocusProfile::all());
        assert_eq!(FocusTable::empty().resolve("combat"), FocusProfile::all());
    }

    #[test]
    fn cost_is_down_weighted_and_emphasis_up_weighted() {
        let profile = FocusTable::default().resolve("optimization");
        assert_eq!(profile.domain_weight(ReasonDomain::Cost), 0.8);
        assert_eq!(profile.domain_weight(ReasonDomain::Goal), 1.5);
        assert_eq!(profile.domain_weight(ReasonDomain::Chain), 1.0);
    }
}

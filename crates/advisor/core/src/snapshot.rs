//! Canonical character snapshots for cache keys.
//!
//! A snapshot flattens the parts of [`CharacterState`] that influence advice
//! into an order-independent record. Two logically identical states produce
//! byte-identical [`CharacterSnapshot::serialize`] output and the same
//! [`CharacterSnapshot::hash`], regardless of how the host ordered lists or
//! object keys.
//!
//! # Canonical form
//!
//! - every list is sorted and deduplicated
//! - object keys are written in ascending order at every nesting level
//! - no insignificant whitespace
//!
//! Declared intentions (goals, wishlist, inferred goals, advisor bias) are
//! part of the snapshot under a nested `intent` key: they decide tiers as
//! much as owned options do.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::state::{
    AdvisorBias, Attribute, Attributes, BuildGoal, CharacterState, PendingSelections, WishlistEntry,
};

/// Flat, canonical view of character state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CharacterSnapshot {
    pub level: u32,
    pub species_id: String,
    pub class_ids: Vec<String>,
    pub attributes: Attributes,
    pub trained_skills: Vec<String>,
    pub skill_ranks: BTreeMap<String, u32>,
    pub selected_feats: Vec<String>,
    pub selected_talents: Vec<String>,
    pub selected_powers: Vec<String>,
    pub proficiencies: Vec<String>,
    pub focus: String,
    pub pending_selections: Vec<String>,
    pub goals: Vec<BuildGoal>,
    pub wishlist: Vec<WishlistEntry>,
    pub inferred_goals: Vec<String>,
    pub advisor_bias: Option<AdvisorBias>,
}

impl CharacterSnapshot {
    /// Builds a snapshot. Pure; no I/O.
    pub fn build(state: &CharacterState, focus: &str, pending: &PendingSelections) -> Self {
        Self {
            level: state.level,
            species_id: state.species_id.clone(),
            class_ids: canonical_list(&state.class_ids),
            attributes: state.attributes.clone(),
            trained_skills: canonical_list(&state.trained_skills),
            skill_ranks: state.skill_ranks.clone(),
            selected_feats: canonical_list(&state.feats),
            selected_talents: canonical_list(&state.talents),
            selected_powers: canonical_list(&state.powers),
            proficiencies: canonical_list(&state.proficiencies),
            focus: focus.to_string(),
            pending_selections: canonical_list(&pending.selections),
            goals: canonical_goals(&state.goals),
            wishlist: canonical_wishlist(&state.wishlist),
            inferred_goals: canonical_list(&state.inferred_goals),
            advisor_bias: state.advisor_bias.clone(),
        }
    }

    /// Canonical JSON value; keys are inserted through a sorted map.
    pub fn to_value(&self) -> Value {
        let attributes: Map<String, Value> = Attribute::ALL
            .iter()
            .map(|a| (a.key().to_string(), json!(self.attributes.get(*a))))
            .collect();

        json!({
            "attributes": attributes,
            "class_ids": self.class_ids,
            "focus": self.focus,
            "intent": {
                "advisor_bias": self.advisor_bias,
                "goals": self.goals,
                "inferred_goals": self.inferred_goals,
                "wishlist": self.wishlist,
            },
            "level": self.level,
            "pending_selections": self.pending_selections,
            "proficiencies": self.proficiencies,
            "selected_feats": self.selected_feats,
            "selected_powers": self.selected_powers,
            "selected_talents": self.selected_talents,
            "skill_ranks": self.skill_ranks,
            "species_id": self.species_id,
            "trained_skills": self.trained_skills,
        })
    }

    /// Canonical serialization. Object keys are sorted while writing, so the
    /// output does not depend on serde_json map features.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        write_canonical(&self.to_value(), &mut out);
        out
    }

    /// Stable 64-bit FNV-1a hash of [`Self::serialize`], as 16 hex chars.
    pub fn hash(&self) -> String {
        format!("{:016x}", fnv1a64(self.serialize().as_bytes()))
    }

    /// Top-level keys whose canonical values differ. Debugging aid only.
    pub fn diff(a: &CharacterSnapshot, b: &CharacterSnapshot) -> Vec<String> {
        let (Value::Object(left), Value::Object(right)) = (a.to_value(), b.to_value()) else {
            return Vec::new();
        };
        let mut keys: Vec<&String> = left.keys().chain(right.keys()).collect();
        keys.sort();
        keys.dedup();
        keys.into_iter()
            .filter(|key| left.get(*key) != right.get(*key))
            .cloned()
            .collect()
    }
}

fn canonical_list(items: &[String]) -> Vec<String> {
    let mut list = items.to_vec();
    list.sort();
    list.dedup();
    list
}

fn canonical_goals(goals: &[BuildGoal]) -> Vec<BuildGoal> {
    let mut goals: Vec<BuildGoal> = goals
        .iter()
        .map(|goal| {
            let mut typical_attributes = goal.typical_attributes.clone();
            typical_attributes.sort();
            typical_attributes.dedup();
            BuildGoal {
                id: goal.id.clone(),
                name: goal.name.clone(),
                required_options: canonical_list(&goal.required_options),
                related_options: canonical_list(&goal.related_options),
                typical_attributes,
            }
        })
        .collect();
    goals.sort_by(|a, b| (&a.id, &a.name).cmp(&(&b.id, &b.name)));
    goals
}

fn canonical_wishlist(wishlist: &[WishlistEntry]) -> Vec<WishlistEntry> {
    let mut entries: Vec<WishlistEntry> = wishlist
        .iter()
        .map(|entry| WishlistEntry {
            id: entry.id.clone(),
            name: entry.name.clone(),
            required_options: canonical_list(&entry.required_options),
        })
        .collect();
    entries.sort_by(|a, b| (&a.id, &a.name).cmp(&(&b.id, &b.name)));
    entries
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, value)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        // Numbers, booleans and null already have a single textual form.
        other => {
            let _ = write!(out, "{other}");
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    // Value's Display applies JSON escaping.
    let _ = write!(out, "{}", Value::String(s.to_string()));
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a. Stable across platforms and releases, unlike `DefaultHasher`.
pub fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

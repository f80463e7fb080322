//! The six ability scores and the rankings derived from them.

use serde::{Deserialize, Serialize};

/// The six core attributes that define a character.
///
/// - **STR** (Strength): melee power, carrying capacity
/// - **DEX** (Dexterity): accuracy, evasion, finesse
/// - **CON** (Constitution): health, endurance
/// - **INT** (Intelligence): training, technical aptitude
/// - **WIS** (Wisdom): perception, intuition, mystic sensitivity
/// - **CHA** (Charisma): presence, leadership, persuasion
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Attribute {
    #[serde(alias = "str")]
    #[strum(to_string = "strength", serialize = "str")]
    Strength,
    #[serde(alias = "dex")]
    #[strum(to_string = "dexterity", serialize = "dex")]
    Dexterity,
    #[serde(alias = "con")]
    #[strum(to_string = "constitution", serialize = "con")]
    Constitution,
    #[serde(alias = "int")]
    #[strum(to_string = "intelligence", serialize = "int")]
    Intelligence,
    #[serde(alias = "wis")]
    #[strum(to_string = "wisdom", serialize = "wis")]
    Wisdom,
    #[serde(alias = "cha")]
    #[strum(to_string = "charisma", serialize = "cha")]
    Charisma,
}

impl Attribute {
    pub const COUNT: usize = 6;

    /// Canonical order, used as the tie-breaker whenever scores are equal.
    pub const ALL: [Attribute; Self::COUNT] = [
        Attribute::Strength,
        Attribute::Dexterity,
        Attribute::Constitution,
        Attribute::Intelligence,
        Attribute::Wisdom,
        Attribute::Charisma,
    ];

    /// Short three-letter key used in canonical snapshots.
    pub const fn key(self) -> &'static str {
        match self {
            Attribute::Strength => "str",
            Attribute::Dexterity => "dex",
            Attribute::Constitution => "con",
            Attribute::Intelligence => "int",
            Attribute::Wisdom => "wis",
            Attribute::Charisma => "cha",
        }
    }
}

/// Attribute scores for a character.
///
/// Scores are plain integers; the engine only ever compares them, so no
/// modifier math lives here.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    #[serde(alias = "str")]
    pub strength: i32,
    #[serde(alias = "dex")]
    pub dexterity: i32,
    #[serde(alias = "con")]
    pub constitution: i32,
    #[serde(alias = "int")]
    pub intelligence: i32,
    #[serde(alias = "wis")]
    pub wisdom: i32,
    #[serde(alias = "cha")]
    pub charisma: i32,
}

impl Attributes {
    pub const MIN_SCORE: i32 = 0;
    pub const MAX_SCORE: i32 = 99;

    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
        }
    }

    #[inline]
    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    fn get_mut(&mut self, attribute: Attribute) -> &mut i32 {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Constitution => &mut self.constitution,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Wisdom => &mut self.wisdom,
            Attribute::Charisma => &mut self.charisma,
        }
    }

    /// Attributes ordered from highest to lowest score.
    ///
    /// Equal scores keep canonical order, so the ranking is fully deterministic.
    pub fn ranked(&self) -> [Attribute; Attribute::COUNT] {
        let mut ranked = Attribute::ALL;
        // Stable sort keeps canonical order on ties.
        ranked.sort_by(|a, b| self.get(*b).cmp(&self.get(*a)));
        ranked
    }

    /// The single highest attribute (ties resolved by canonical order).
    pub fn highest(&self) -> Attribute {
        self.ranked()[0]
    }

    /// The single lowest attribute (ties resolved by canonical order).
    pub fn lowest(&self) -> Attribute {
        let mut lowest = Attribute::Strength;
        for attribute in Attribute::ALL {
            if self.get(attribute) < self.get(lowest) {
                lowest = attribute;
            }
        }
        lowest
    }

    /// The `n` highest attributes.
    pub fn top(&self, n: usize) -> Vec<Attribute> {
        self.ranked().into_iter().take(n).collect()
    }

    /// Clamps every score into `[MIN_SCORE, MAX_SCORE]`.
    ///
    /// Returns the attributes that were out of range.
    pub fn clamp_scores(&mut self) -> Vec<Attribute> {
        let mut clamped = Vec::new();
        for attribute in Attribute::ALL {
            let value = self.get_mut(attribute);
            let bounded = (*value).clamp(Self::MIN_SCORE, Self::MAX_SCORE);
            if bounded != *value {
                *value = bounded;
                clamped.push(attribute);
            }
        }
        clamped
    }
}

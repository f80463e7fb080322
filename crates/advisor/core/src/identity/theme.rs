//! Themes, archetypes, and the many-to-one table between them.
//!
//! A [`Theme`] is a coarse tag attached to options and history entries
//! (`melee`, `social`, `technical`, ...). An [`Archetype`] is the build
//! identity a cluster of themes points at. The [`ThemeTable`] is the only
//! place the two meet; the built-in default can be replaced by a data file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse tag describing what an option or a past choice is about.
///
/// Always stored trimmed and lowercase so comparisons are exact.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Theme(String);

impl Theme {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Theme {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Theme {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Theme> for String {
    fn from(value: Theme) -> Self {
        value.0
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labeled build identity (e.g. `warrior`, `face`, `specialist`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Archetype(String);

impl Archetype {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-facing label (`"specialist"` -> `"Specialist"`).
    pub fn label(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<String> for Archetype {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Archetype {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Archetype> for String {
    fn from(value: Archetype) -> Self {
        value.0
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a theme relates to a given archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeAlignment {
    /// The theme maps to the archetype.
    Match,
    /// The theme maps to a different archetype, or to none at all.
    Mismatch,
    /// No theme to judge.
    Neutral,
}

/// Many-to-one mapping from themes to archetypes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeTable {
    entries: BTreeMap<Theme, Archetype>,
}

impl ThemeTable {
    /// Built-in mapping used when no table file is configured.
    const DEFAULT_ENTRIES: &'static [(&'static str, &'static str)] = &[
        ("melee", "warrior"),
        ("weapons", "warrior"),
        ("armor", "warrior"),
        ("ranged", "skirmisher"),
        ("stealth", "skirmisher"),
        ("social", "face"),
        ("leadership", "face"),
        ("technical", "specialist"),
        ("mechanics", "specialist"),
        ("slicing", "specialist"),
        ("force", "mystic"),
        ("mystic", "mystic"),
        ("medical", "support"),
        ("support", "support"),
    ];

    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_pairs<I, T, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, A)>,
        T: Into<Theme>,
        A: Into<Archetype>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(theme, archetype)| (theme.into(), archetype.into()))
                .filter(|(theme, _)| !theme.is_empty())
                .collect(),
        }
    }

    pub fn insert(&mut self, theme: impl Into<Theme>, archetype: impl Into<Archetype>) {
        self.entries.insert(theme.into(), archetype.into());
    }

    pub fn archetype_for(&self, theme: &Theme) -> Option<&Archetype> {
        self.entries.get(theme)
    }

    /// All themes that map to `archetype`, in sorted order.
    pub fn themes_for<'a>(&'a self, archetype: &'a Archetype) -> impl Iterator<Item = &'a Theme> {
        self.entries
            .iter()
            .filter(move |(_, mapped)| *mapped == archetype)
            .map(|(theme, _)| theme)
    }

    pub fn alignment(&self, theme: Option<&Theme>, archetype: &Archetype) -> ThemeAlignment {
        match theme {
            None => ThemeAlignment::Neutral,
            Some(theme) if self.archetype_for(theme) == Some(archetype) => ThemeAlignment::Match,
            Some(_) => ThemeAlignment::Mismatch,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ThemeTable {
    fn default() -> Self {
        Self::from_pairs(Self::DEFAULT_ENTRIES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_many_to_one() {
        let table = ThemeTable::default();
        let warrior = Archetype::new("warrior");
        assert_eq!(table.archetype_for(&Theme::new("melee")), Some(&warrior));
        assert_eq!(table.archetype_for(&Theme::new("Armor ")), Some(&warrior));
        let themes: Vec<_> = table.themes_for(&warrior).map(Theme::as_str).collect();
        assert_eq!(themes, vec!["armor", "melee", "weapons"]);
    }

    #[test]
    fn alignment_distinguishes_match_mismatch_neutral() {
        let table = ThemeTable::default();
        let warrior = Archetype::new("warrior");
        assert_eq!(
            table.alignment(Some(&Theme::new("weapons")), &warrior),
            ThemeAlignment::Match
        );
        assert_eq!(
            table.alignment(Some(&Theme::new("social")), &warrior),
            ThemeAlignment::Mismatch
        );
        assert_eq!(
            table.alignment(Some(&Theme::new("gardening")), &warrior),
            ThemeAlignment::Mismatch
        );
        assert_eq!(table.alignment(None, &warrior), ThemeAlignment::Neutral);
    }

    #[test]
    fn archetype_label_capitalizes() {
        assert_eq!(Archetype::new("specialist").label(), "Specialist");
    }
}

//! Free-text prerequisite migration shim.
//!
//! Older catalogs only carry a display string such as
//! `"Str 13, Trained in Stealth, Power Attack"`. This parser turns the
//! recognizable clauses into structured [`Prerequisite`]s at load time.
//! Clauses it cannot read are reported back, never guessed at silently.

use std::str::FromStr;

use advisor_core::{Attribute, Prerequisite};
use regex::Regex;

use crate::loaders::LoadResult;

/// Structured prerequisites plus the clauses that were not understood.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPrerequisites {
    pub prerequisites: Vec<Prerequisite>,
    pub unrecognized: Vec<String>,
}

pub struct PrerequisiteParser {
    attribute: Regex,
    trained: Regex,
    rank: Regex,
    level: Regex,
    ordinal_level: Regex,
    species: Regex,
    class: Regex,
    option_name: Regex,
    separator: Regex,
}

impl PrerequisiteParser {
    pub fn new() -> LoadResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| anyhow::anyhow!("Invalid prerequisite pattern: {}", e))
        };
        Ok(Self {
            attribute: compile(
                r"(?i)^(str|dex|con|int|wis|cha|strength|dexterity|constitution|intelligence|wisdom|charisma)\s+(\d+)\+?$",
            )?,
            trained: compile(r"(?i)^trained\s+in\s+(.+)$")?,
            rank: compile(r"(?i)^(\d+)\s+ranks?\s+in\s+(.+)$")?,
            level: compile(r"(?i)^(?:character\s+)?level\s+(\d+)$")?,
            ordinal_level: compile(r"(?i)^(\d+)(?:st|nd|rd|th)\s+level$")?,
            species: compile(r"(?i)^species:\s*(.+)$")?,
            class: compile(r"(?i)^class:\s*(.+)$")?,
            option_name: compile(r"^[A-Z][A-Za-z'()\- ]*$")?,
            separator: compile(r"\s*(?:[,;]|\band\b)\s*")?,
        })
    }

    pub fn parse(&self, description: &str) -> ParsedPrerequisites {
        let mut parsed = ParsedPrerequisites::default();
        for clause in self.separator.split(description.trim().trim_end_matches('.')) {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            match self.parse_clause(clause) {
                Some(prerequisite) => {
                    if !parsed.prerequisites.contains(&prerequisite) {
                        parsed.prerequisites.push(prerequisite);
                    }
                }
                None => parsed.unrecognized.push(clause.to_string()),
            }
        }
        parsed
    }

    fn parse_clause(&self, clause: &str) -> Option<Prerequisite> {
        if let Some(caps) = self.attribute.captures(clause) {
            let attribute = Attribute::from_str(&caps[1]).ok()?;
            let min = caps[2].parse().ok()?;
            return Some(Prerequisite::Attribute { attribute, min });
        }
        if let Some(caps) = self.rank.captures(clause) {
            return Some(Prerequisite::Rank {
                min: caps[1].parse().ok()?,
                skill: slug(&caps[2]),
            });
        }
        if let Some(caps) = self.trained.captures(clause) {
            return Some(Prerequisite::Skill {
                skill: slug(&caps[1]),
            });
        }
        if let Some(caps) = self
            .level
            .captures(clause)
            .or_else(|| self.ordinal_level.captures(clause))
        {
            return Some(Prerequisite::Level {
                min: caps[1].parse().ok()?,
            });
        }
        if let Some(caps) = self.species.captures(clause) {
            return Some(Prerequisite::Species { id: slug(&caps[1]) });
        }
        if let Some(caps) = self.class.captures(clause) {
            return Some(Prerequisite::Class { id: slug(&caps[1]) });
        }
        if self.option_name.is_match(clause) {
            return Some(Prerequisite::Option { id: slug(clause) });
        }
        None
    }
}

/// `"Weapon Focus (Rifles)"` -> `"weapon_focus_rifles"`.
pub fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> PrerequisiteParser {
        PrerequisiteParser::new().unwrap()
    }

    #[test]
    fn parses_common_clauses() {
        let parsed = parser().parse("Str 13, Trained in Stealth; level 7, Power Attack.");
        assert_eq!(
            parsed.prerequisites,
            vec![
                Prerequisite::Attribute {
                    attribute: Attribute::Strength,
                    min: 13
                },
                Prerequisite::Skill {
                    skill: "stealth".into()
                },
                Prerequisite::Level { min: 7 },
                Prerequisite::Option {
                    id: "power_attack".into()
                },
            ]
        );
        assert!(parsed.unrecognized.is_empty());
    }

    #[test]
    fn parses_ranks_ordinals_species_and_class() {
        let parsed = parser().parse("4 ranks in Use Computer, 3rd level, Species: Twi'lek, Class: Scout");
        assert_eq!(
            parsed.prerequisites,
            vec![
                Prerequisite::Rank {
                    skill: "use_computer".into(),
                    min: 4
                },
                Prerequisite::Level { min: 3 },
                Prerequisite::Species { id: "twi_lek".into() },
                Prerequisite::Class { id: "scout".into() },
            ]
        );
    }

    #[test]
    fn full_attribute_names_and_and_separator() {
        let parsed = parser().parse("Dexterity 15 and Weapon Focus (Rifles)");
        assert_eq!(parsed.prerequisites.len(), 2);
        assert_eq!(
            parsed.prerequisites[1],
            Prerequisite::Option {
                id: "weapon_focus_rifles".into()
            }
        );
    }

    #[test]
    fn unknown_clauses_are_reported() {
        let parsed = parser().parse("base attack bonus +5, Cleave");
        assert_eq!(parsed.unrecognized, vec!["base attack bonus +5".to_string()]);
        assert_eq!(parsed.prerequisites.len(), 1);
    }

    #[test]
    fn empty_description_yields_nothing() {
        assert_eq!(parser().parse("  "), ParsedPrerequisites::default());
    }
}

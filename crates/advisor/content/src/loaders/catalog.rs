//! Option catalog loader.

use std::path::Path;

use advisor_core::{Attribute, CandidateOption, OptionKind, Prerequisite, Theme};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, PrerequisiteParser, read_file};

/// Prerequisite as written in RON catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrerequisiteSpec {
    Attribute { attribute: Attribute, min: i32 },
    Trained(String),
    Rank { skill: String, min: u32 },
    Level(u32),
    Option(String),
    Class(String),
    Species(String),
}

impl From<PrerequisiteSpec> for Prerequisite {
    fn from(spec: PrerequisiteSpec) -> Self {
        match spec {
            PrerequisiteSpec::Attribute { attribute, min } => Prerequisite::Attribute { attribute, min },
            PrerequisiteSpec::Trained(skill) => Prerequisite::Skill { skill },
            PrerequisiteSpec::Rank { skill, min } => Prerequisite::Rank { skill, min },
            PrerequisiteSpec::Level(min) => Prerequisite::Level { min },
            PrerequisiteSpec::Option(id) => Prerequisite::Option { id },
            PrerequisiteSpec::Class(id) => Prerequisite::Class { id },
            PrerequisiteSpec::Species(id) => Prerequisite::Species { id },
        }
    }
}

/// One option entry in a RON catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub kind: OptionKind,
    /// Display text; parsed into `requires` when that list is empty.
    pub description: String,
    pub requires: Vec<PrerequisiteSpec>,
    pub tags: Vec<String>,
    pub category: String,
    pub theme: Option<Theme>,
    pub scaling: Vec<Attribute>,
    pub synergies: Vec<String>,
    pub exclusive_with: Vec<String>,
    pub heritage: Vec<String>,
}

/// Option catalog structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub options: Vec<CatalogEntry>,
}

/// Loader for option catalogs from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load an option catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<CandidateOption>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<CandidateOption>> {
        let catalog: Catalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse option catalog RON: {}", e))?;
        let parser = PrerequisiteParser::new()?;

        Ok(catalog
            .options
            .into_iter()
            .map(|entry| Self::structure(entry, &parser))
            .collect())
    }

    fn structure(entry: CatalogEntry, parser: &PrerequisiteParser) -> CandidateOption {
        let prerequisites = if entry.requires.is_empty() && !entry.description.trim().is_empty() {
            let parsed = parser.parse(&entry.description);
            if !parsed.unrecognized.is_empty() {
                tracing::warn!(
                    option = %entry.id,
                    unrecognized = ?parsed.unrecognized,
                    "prerequisite text only partially understood"
                );
            }
            parsed.prerequisites
        } else {
            entry.requires.into_iter().map(Prerequisite::from).collect()
        };

        CandidateOption {
            id: entry.id,
            name: entry.name,
            kind: entry.kind,
            prerequisite_description: entry.description,
            prerequisites,
            tags: entry.tags,
            category: entry.category,
            theme: entry.theme,
            scaling_attributes: entry.scaling,
            synergies: entry.synergies,
            exclusive_with: entry.exclusive_with,
            heritage: entry.heritage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
(
    options: [
        (
            id: "cleave",
            name: "Cleave",
            kind: feat,
            description: "Str 13, Power Attack",
            theme: Some("melee"),
            scaling: [strength],
        ),
        (
            id: "deadeye",
            name: "Deadeye",
            kind: talent,
            description: "free text kept for display",
            requires: [Level(3), Trained("perception"), Attribute(attribute: dexterity, min: 15)],
            synergies: ["careful_shot"],
        ),
    ],
)
"#;

    #[test]
    fn structured_requirements_win_over_description() {
        let options = CatalogLoader::parse(CATALOG).unwrap();
        let deadeye = &options[1];
        assert_eq!(deadeye.kind, OptionKind::Talent);
        assert_eq!(deadeye.prerequisite_description, "free text kept for display");
        assert_eq!(
            deadeye.prerequisites,
            vec![
                Prerequisite::Level { min: 3 },
                Prerequisite::Skill {
                    skill: "perception".into()
                },
                Prerequisite::Attribute {
                    attribute: Attribute::Dexterity,
                    min: 15
                },
            ]
        );
        assert_eq!(deadeye.synergies, vec!["careful_shot".to_string()]);
    }

    #[test]
    fn description_only_entries_are_migrated() {
        let options = CatalogLoader::parse(CATALOG).unwrap();
        let cleave = &options[0];
        assert_eq!(cleave.theme, Some(Theme::new("melee")));
        assert_eq!(cleave.scaling_attributes, vec![Attribute::Strength]);
        assert_eq!(
            cleave.prerequisites,
            vec![
                Prerequisite::Attribute {
                    attribute: Attribute::Strength,
                    min: 13
                },
                Prerequisite::Option {
                    id: "power_attack".into()
                },
            ]
        );
    }

    #[test]
    fn malformed_catalog_is_an_error() {
        let err = CatalogLoader::parse("(options: [ (id: ) ])").unwrap_err();
        assert!(err.to_string().contains("option catalog"));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.ron");
        std::fs::write(&path, CATALOG).unwrap();
        assert_eq!(CatalogLoader::load(&path).unwrap().len(), 2);

        let missing = CatalogLoader::load(&dir.path().join("nope.ron")).unwrap_err();
        assert!(missing.to_string().contains("Failed to read"));
    }
}

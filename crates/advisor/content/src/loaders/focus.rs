//! Progression focus table loader.

use std::collections::BTreeMap;
use std::path::Path;

use advisor_core::{FocusProfile, FocusTable};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Focus table structure for TOML files.
///
/// ```toml
/// [focus.stealthy]
/// visible = ["skill", "attribute", "archetype"]
/// emphasis = ["skill"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FocusFile {
    #[serde(default)]
    pub replace_defaults: bool,
    #[serde(default)]
    pub focus: BTreeMap<String, FocusProfile>,
}

/// Loader for focus tables from TOML files.
pub struct FocusLoader;

impl FocusLoader {
    pub fn load(path: &Path) -> LoadResult<FocusTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<FocusTable> {
        let file: FocusFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse focus table TOML: {}", e))?;

        let mut table = if file.replace_defaults {
            FocusTable::empty()
        } else {
            FocusTable::default()
        };
        for (label, profile) in file.focus {
            if let Some(domain) = profile.emphasis.iter().find(|d| !profile.is_visible(**d)) {
                tracing::warn!(focus = %label, %domain, "emphasized domain is not visible");
            }
            table.insert(&label, profile);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use advisor_core::ReasonDomain;

    use super::*;

    #[test]
    fn custom_profile_is_added() {
        let table = FocusLoader::parse(
            "[focus.Stealthy]\nvisible = [\"skill\", \"attribute\"]\nemphasis = [\"skill\"]\n",
        )
        .unwrap();
        let profile = table.resolve("stealthy");
        assert_eq!(profile.visible, vec![ReasonDomain::Skill, ReasonDomain::Attribute]);
        assert!(table.get("combat").is_some());
    }

    #[test]
    fn unknown_domain_is_an_error() {
        let err = FocusLoader::parse("[focus.x]\nvisible = [\"vibes\"]\n").unwrap_err();
        assert!(err.to_string().contains("focus table"));
    }

    #[test]
    fn replace_defaults_without_balanced_shows_everything() {
        let table = FocusLoader::parse("replace_defaults = true\n").unwrap();
        assert_eq!(table.resolve("anything"), FocusProfile::all());
    }
}

//! Auxiliary vocabularies loaded with the model artifacts

use crate::features::{KeywordGroups, DEFAULT_SKILLS};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Reference skill list and technology keyword groups
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    pub skills: Vec<String>,
    pub keyword_groups: KeywordGroups,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            skills: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            keyword_groups: KeywordGroups::default(),
        }
    }
}

impl Vocabulary {
    /// Load both files from `dir`, keeping built-in defaults for any that is absent or invalid
    pub fn load(dir: &Path, skills_file: &str, keyword_groups_file: &str) -> Self {
        let defaults = Self::default();

        let skills = match read_json::<Vec<String>>(&dir.join(skills_file)) {
            Ok(Some(skills)) if !skills.is_empty() => skills
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            Ok(Some(_)) => {
                warn!(file = %skills_file, "Skill vocabulary is empty, using built-in list");
                defaults.skills
            }
            Ok(None) => {
                debug!(file = %skills_file, "No skill vocabulary file, using built-in list");
                defaults.skills
            }
            Err(e) => {
                warn!(file = %skills_file, error = %format!("{:#}", e), "Invalid skill vocabulary, using built-in list");
                defaults.skills
            }
        };

        let keyword_groups = match read_json::<KeywordGroups>(&dir.join(keyword_groups_file)) {
            Ok(Some(groups)) => groups,
            Ok(None) => {
                debug!(file = %keyword_groups_file, "No keyword groups file, using built-in groups");
                defaults.keyword_groups
            }
            Err(e) => {
                warn!(file = %keyword_groups_file, error = %format!("{:#}", e), "Invalid keyword groups, using built-in groups");
                defaults.keyword_groups
            }
        };

        Self { skills, keyword_groups }
    }
}

/// `Ok(None)` when the file does not exist
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_use_defaults() {
        let dir = TempDir::new().unwrap();
        let vocab = Vocabulary::load(dir.path(), "skills.json", "groups.json");
        assert_eq!(vocab, Vocabulary::default());
    }

    #[test]
    fn test_files_override_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("skills.json"), r#"["Python", " SQL ", ""]"#).unwrap();
        std::fs::write(dir.path().join("groups.json"), r#"{"cloud": ["aws"]}"#).unwrap();

        let vocab = Vocabulary::load(dir.path(), "skills.json", "groups.json");
        assert_eq!(vocab.skills, vec!["python", "sql"]);
        assert_eq!(vocab.keyword_groups.cloud, vec!["aws"]);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("skills.json"), "{not json").unwrap();
        let vocab = Vocabulary::load(dir.path(), "skills.json", "groups.json");
        assert_eq!(vocab.skills.len(), DEFAULT_SKILLS.len());
    }
}

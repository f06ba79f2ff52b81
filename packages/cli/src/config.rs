use quire_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "quire.config.json";

/// Quire configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Project that imported documents are moved into
    #[serde(default = "default_project")]
    pub project: String,

    /// Default addition number for `renumber`
    #[serde(default)]
    pub addition: i64,

    /// Mutation policies
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_project() -> String {
    "site".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: default_project(),
            addition: 0,
            editor: EditorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_editor::{NamePolicy, PlaceholderPolicy};

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "project": "docs",
            "addition": 500,
            "editor": { "namePolicy": "reject", "placeholderPolicy": "reject" }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.project, "docs");
        assert_eq!(config.addition, 500);
        assert_eq!(config.editor.name_policy, NamePolicy::Reject);
        assert_eq!(config.editor.placeholder_policy, PlaceholderPolicy::Reject);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.project, "site");
        assert_eq!(config.addition, 0);
        assert_eq!(config.editor, EditorConfig::default());
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert_eq!(config.project, "site");
    }
}

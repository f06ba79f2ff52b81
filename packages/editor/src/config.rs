use serde::{Deserialize, Serialize};

/// What to do when inserted content claims a name already in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamePolicy {
    /// Append `_<n>` until the name is free
    #[default]
    Rename,
    /// Fail with `NameCollision`
    Reject,
}

/// What to do with section placeholders inserted into a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceholderPolicy {
    /// Replace each placeholder with an inert text marker
    #[default]
    ReplaceWithMarker,
    /// Fail with `PlaceholderInSection`
    Reject,
}

/// Editing engine options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default)]
    pub name_policy: NamePolicy,

    #[serde(default)]
    pub placeholder_policy: PlaceholderPolicy,

    /// Text of the marker left where a placeholder was removed
    #[serde(default = "default_placeholder_marker")]
    pub placeholder_marker: String,
}

fn default_placeholder_marker() -> String {
    "[section placeholder removed]".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            name_policy: NamePolicy::default(),
            placeholder_policy: PlaceholderPolicy::default(),
            placeholder_marker: default_placeholder_marker(),
        }
    }
}

impl EditorConfig {
    pub fn with_name_policy(mut self, policy: NamePolicy) -> Self {
        self.name_policy = policy;
        self
    }

    pub fn with_placeholder_policy(mut self, policy: PlaceholderPolicy) -> Self {
        self.placeholder_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "namePolicy": "reject",
            "placeholderPolicy": "replaceWithMarker",
            "placeholderMarker": "(removed)"
        }"#;

        let config: EditorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name_policy, NamePolicy::Reject);
        assert_eq!(config.placeholder_policy, PlaceholderPolicy::ReplaceWithMarker);
        assert_eq!(config.placeholder_marker, "(removed)");
    }

    #[test]
    fn test_default_config() {
        let config: EditorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.name_policy, NamePolicy::Rename);
    }
}

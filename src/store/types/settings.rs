use serde::{Deserialize, Serialize};

/// Model used when a user has never saved settings
pub const DEFAULT_PREFERRED_MODEL: &str = "gemini-pro";

/// Per-user generation preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub preferred_model: String,
    pub use_builtin_key: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            preferred_model: DEFAULT_PREFERRED_MODEL.to_string(),
            use_builtin_key: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_serialization() {
        let value = serde_json::to_value(UserSettings::default()).unwrap();
        assert_eq!(value["preferredModel"], "gemini-pro");
        assert_eq!(value["useBuiltinKey"], true);
    }
}

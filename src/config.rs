use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// How empty tokens in a select `options` list (e.g. `Wedding|`) are treated.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyOptionPolicy {
    /// Any empty token makes the option list invalid.
    #[default]
    Reject,
    /// Empty tokens are dropped.
    Skip,
    /// Empty tokens become a selectable `""` option.
    Keep,
}

/// Settings shared by the parser and the form runtime.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub empty_option_policy: EmptyOptionPolicy,
    /// Clear the form after a successful submit so it can take a new entry.
    pub reset_on_submit: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            empty_option_policy: EmptyOptionPolicy::default(),
            reset_on_submit: true,
        }
    }
}

impl FormConfig {
    /// # Errors
    /// Returns a `ConfigError` if the input is not a valid configuration.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// # Errors
    /// Returns a `ConfigError` if the input is not a valid configuration.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormConfig::default();
        assert_eq!(config.empty_option_policy, EmptyOptionPolicy::Reject);
        assert!(config.reset_on_submit);
    }

    #[test]
    fn test_from_json_partial() {
        let config = FormConfig::from_json(r#"{ "empty_option_policy": "skip" }"#).unwrap();
        assert_eq!(config.empty_option_policy, EmptyOptionPolicy::Skip);
        assert!(config.reset_on_submit);
    }

    #[test]
    fn test_from_yaml() {
        let config =
            FormConfig::from_yaml("empty_option_policy: keep\nreset_on_submit: false\n").unwrap();
        assert_eq!(config.empty_option_policy, EmptyOptionPolicy::Keep);
        assert!(!config.reset_on_submit);
    }

    #[test]
    fn test_invalid_policy() {
        let result = FormConfig::from_yaml("empty_option_policy: maybe\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }
}

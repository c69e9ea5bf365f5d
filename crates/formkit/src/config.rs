// File: src/config.rs
// Purpose: Form options, loadable from TOML

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::FormError;
use crate::FormValues;

/// What to do with a field whose type has no renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Render the field without a control and log a warning
    #[default]
    Ignore,
    /// Fail the render with [`FormError::UnknownFieldType`]
    Reject,
}

/// Per-form options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormOptions {
    /// Initial values, keyed by field name
    #[serde(default)]
    pub default_values: FormValues,

    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,
}

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_values.insert(name.into(), value.into());
        self
    }

    pub fn unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, FormError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Load options from a TOML file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| FormError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_options() {
        let options = FormOptions::default();
        assert!(options.default_values.is_empty());
        assert_eq!(options.unknown_fields, UnknownFieldPolicy::Ignore);
    }

    #[test]
    fn test_empty_toml() {
        assert_eq!(FormOptions::from_toml_str("").unwrap(), FormOptions::default());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            unknown_fields = "reject"

            [default_values]
            name = "Ada"
            subscribe = true
        "#;
        let options = FormOptions::from_toml_str(toml).unwrap();

        assert_eq!(options.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(options.default_values["name"], json!("Ada"));
        assert_eq!(options.default_values["subscribe"], json!(true));
    }

    #[test]
    fn test_invalid_policy_is_an_error() {
        let err = FormOptions::from_toml_str(r#"unknown_fields = "explode""#).unwrap_err();
        assert!(matches!(err, FormError::Config(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let options = FormOptions::load("does-not-exist/formkit.toml").unwrap();
        assert_eq!(options, FormOptions::default());
    }
}

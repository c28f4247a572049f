//! Configuration management for the record factory
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (jsxn.toml)
//! - Environment variables (JSXN__*)
//!
//! ## Example config file (jsxn.toml):
//! ```toml
//! [registry]
//! unknown_fields = "reject"
//! on_redefine = "keep"
//!
//! [output]
//! format = "compact"
//! ```
//!
//! Environment overrides use `__` after the prefix and between section and
//! key, e.g. `JSXN__REGISTRY__ON_REDEFINE=replace`.

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsxnConfig {
    /// Registry behavior
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Text rendering
    #[serde(default)]
    pub output: OutputConfig,
}

/// Registry policies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// What `populate` does with keys a schema does not declare
    #[serde(default)]
    pub unknown_fields: UnknownFields,

    /// What plain creation does when the name exists with a different field set
    #[serde(default)]
    pub on_redefine: Redefine,
}

/// Handling of undeclared keys during population
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    /// Fail with `UnknownField`
    #[default]
    Reject,
    /// Drop the key
    Ignore,
}

/// Handling of plain re-registration under an existing name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Redefine {
    /// Return the cached schema unchanged
    #[default]
    Keep,
    /// Replace the cached schema
    Replace,
    /// Fail with `AlreadyExists`
    Reject,
}

/// Output configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Compact,
    Pretty,
}

impl JsxnConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering a specific file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["jsxn.toml", ".jsxn.toml", "config/jsxn.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("cx", "shawcx", "jsxn") {
            let xdg_config = config_dir.config_dir().join("jsxn.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("JSXN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> std::io::Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = JsxnConfig::default();
        assert_eq!(config.registry.unknown_fields, UnknownFields::Reject);
        assert_eq!(config.registry.on_redefine, Redefine::Keep);
        assert_eq!(config.output.format, OutputFormat::Compact);
    }

    #[test]
    fn test_serialize_config() {
        let toml_str = JsxnConfig::default().to_toml().unwrap();
        assert!(toml_str.contains("[registry]"));
        assert!(toml_str.contains("unknown_fields = \"reject\""));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            concat!(
                "[registry]\nunknown_fields = \"ignore\"\non_redefine = \"replace\"\n\n",
                "[output]\nformat = \"pretty\"\n",
            ),
        )
        .unwrap();

        let config = JsxnConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.registry.unknown_fields, UnknownFields::Ignore);
        assert_eq!(config.registry.on_redefine, Redefine::Replace);
        assert_eq!(config.output.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = JsxnConfig::default();
        config.registry.on_redefine = Redefine::Reject;
        config.save(&path).unwrap();

        let loaded = JsxnConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.registry.on_redefine, Redefine::Reject);
    }

    #[test]
    fn test_environment_override() {
        // Only [output] is overridden so the file-based tests running
        // alongside keep their [registry] values.
        std::env::set_var("JSXN__OUTPUT__FORMAT", "pretty");
        let config = JsxnConfig::load();
        std::env::remove_var("JSXN__OUTPUT__FORMAT");

        assert_eq!(config.unwrap().output.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempdir().unwrap();
        assert!(JsxnConfig::load_from(Some(&dir.path().join("absent.toml"))).is_err());
    }
}

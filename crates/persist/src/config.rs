//! Session configuration.
//!
//! ```toml
//! [graph]
//! dangling_parents = "reject"
//!
//! [storage]
//! directory = "./concept-modules"
//!
//! [logging]
//! level = "warn"
//! format = "compact"
//! ```
//!
//! Every section and field is optional.

use crate::tracing::{LogLevel, TracingFormat};
use crate::{Error, Result};
use conceptdag_graph::DanglingParentPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default directory for [`JsonFileRepository`](crate::JsonFileRepository).
pub const DEFAULT_STORAGE_DIR: &str = "concept-modules";

/// Top-level configuration for editing sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Graph reconstruction behaviour.
    pub graph: GraphSettings,
    /// Where module files live.
    pub storage: StorageSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Graph reconstruction behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphSettings {
    /// How to treat records naming parents that were never introduced.
    pub dangling_parents: DanglingParentPolicy,
}

/// Storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSettings {
    /// Directory holding one JSON file per module.
    pub directory: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Minimum level.
    pub level: LogLevel,
    /// Output format.
    pub format: TracingFormat,
    /// Explicit `EnvFilter` directive, overriding `level`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: TracingFormat::Compact,
            filter: None,
        }
    }
}

impl SessionConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not valid TOML or contains
    /// unknown keys.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse session config: {e}")))
    }

    /// Load configuration from a TOML file.
    ///
    /// Returns `None` if the file doesn't exist.
    /// Returns an error if the file exists but is invalid.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        Self::from_toml_str(&content).map(Some)
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::serialization(format!("Failed to serialize session config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.graph.dangling_parents, DanglingParentPolicy::Reject);
        assert_eq!(config.storage.directory, PathBuf::from(DEFAULT_STORAGE_DIR));
    }

    #[test]
    fn test_parse_full_config() {
        let config = SessionConfig::from_toml_str(
            r#"
            [graph]
            dangling_parents = "skip"

            [storage]
            directory = "/var/lib/concepts"

            [logging]
            level = "debug"
            format = "json"
            filter = "conceptdag_graph=trace"
            "#,
        )
        .unwrap();

        assert_eq!(config.graph.dangling_parents, DanglingParentPolicy::Skip);
        assert_eq!(config.storage.directory, PathBuf::from("/var/lib/concepts"));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, TracingFormat::Json);
        assert_eq!(
            config.logging.filter.as_deref(),
            Some("conceptdag_graph=trace")
        );
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let error = SessionConfig::from_toml_str("[graph]\ncycles = true\n").unwrap_err();
        assert!(error.to_string().starts_with("Configuration error"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = SessionConfig::load(&dir.path().join("conceptdag.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conceptdag.toml");

        let mut config = SessionConfig::default();
        config.graph.dangling_parents = DanglingParentPolicy::Skip;
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        assert_eq!(SessionConfig::load(&path).unwrap(), Some(config));
    }
}

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid session config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// SessionConfig
///
/// Session policy, usually loaded from a flat TOML document:
///
/// ```toml
/// debug = true
/// strict_delete = false
/// metrics = true
/// ```
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Log every issued statement at debug level.
    pub debug: bool,
    /// Default mode for `Manager::delete`.
    pub strict_delete: bool,
    /// Record events into the process-wide metrics sink.
    pub metrics: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debug: false,
            strict_delete: false,
            metrics: true,
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(
            SessionConfig::from_toml_str("").unwrap(),
            SessionConfig::default()
        );
    }

    #[test]
    fn fields_override_defaults() {
        let config = SessionConfig::from_toml_str("debug = true\nstrict_delete = true\n").unwrap();

        assert!(config.debug);
        assert!(config.strict_delete);
        assert!(config.metrics);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SessionConfig::from_toml_str("retries = 3").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = SessionConfig::from_file("/nonexistent/tqlmap.toml").unwrap_err();

        assert!(err.to_string().contains("/nonexistent/tqlmap.toml"));
    }
}

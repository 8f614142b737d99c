//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! The engine has a single configuration scope. It only affects what
//! [`EntityGraph`](crate::entities::graph::EntityGraph) does after decoding;
//! importers and exporters are not configurable.
//!
//! # Precedence
//!
//! 1. Default values
//! 2. The file named by `$MODEL_DESCRIPTION_CONFIG`, or an explicit path
//!
//! # Example
//!
//! ```
//! use model_description::core::config::{Config, ReferencePolicy};
//!
//! let config = Config::parse("reference_policy = \"warn\"").unwrap();
//! assert_eq!(config.reference_policy(), ReferencePolicy::Warn);
//! assert!(!config.validate_on_import());
//! ```

pub mod schema;

pub use schema::{EngineConfig, REFERENCE_POLICIES};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "MODEL_DESCRIPTION_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// How dangling principal/subordinate references are treated by
/// graph validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Not checked.
    #[default]
    Ignore,
    /// Logged at warn level.
    Warn,
    /// Reported as a validation error.
    Error,
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Raw configuration values
    pub engine: EngineConfig,
    /// Path the configuration was read from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `$MODEL_DESCRIPTION_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable names a file that cannot be read or
    /// parsed, including one that does not exist. An unset or empty variable
    /// yields the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let engine: EngineConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        engine.validate()?;

        Ok(Self {
            engine,
            path: Some(path.to_path_buf()),
        })
    }

    /// Parse configuration from an in-memory TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let engine: EngineConfig =
            toml::from_str(contents).map_err(|e| ConfigError::ParseError {
                path: PathBuf::from("<inline>"),
                message: e.to_string(),
            })?;
        engine.validate()?;
        Ok(Self { engine, path: None })
    }

    /// Path the configuration was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Dangling reference handling.
    ///
    /// Defaults to [`ReferencePolicy::Ignore`].
    pub fn reference_policy(&self) -> ReferencePolicy {
        match self.engine.reference_policy.as_deref() {
            Some("warn") => ReferencePolicy::Warn,
            Some("error") => ReferencePolicy::Error,
            _ => ReferencePolicy::Ignore,
        }
    }

    /// Whether graph import validates its result.
    ///
    /// Defaults to `false`.
    pub fn validate_on_import(&self) -> bool {
        self.engine.validate_on_import.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.reference_policy(), ReferencePolicy::Ignore);
        assert!(!config.validate_on_import());
        assert!(config.path().is_none());
    }

    #[test]
    fn parse_all_fields() {
        let config =
            Config::parse("reference_policy = \"error\"\nvalidate_on_import = true\n").unwrap();
        assert_eq!(config.reference_policy(), ReferencePolicy::Error);
        assert!(config.validate_on_import());
    }

    #[test]
    fn parse_rejects_bad_policy() {
        assert!(matches!(
            Config::parse("reference_policy = \"loud\""),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn parse_rejects_bad_toml() {
        assert!(matches!(
            Config::parse("reference_policy = "),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/model-description.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}

//! `colpack` Configuration Module
//!
//! Provides configuration file support via `colpack.toml`, environment
//! variables, and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (API)
//! 2. Environment variables (`COLPACK_*`)
//! 3. Configuration file (`colpack.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// How the run-length codec treats neighbouring runs with equal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMerge {
    /// Merge equal neighbours after every update and remove.
    #[default]
    Eager,
    /// Never merge; runs stay logically correct but may fragment.
    Lazy,
}

/// Run-length codec configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RleConfig {
    /// Merge policy for adjacent equal runs.
    pub merge: RunMerge,
}

/// Persistence configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Suffix appended to the column name for the dictionary table stream.
    pub dictionary_suffix: String,
    /// Suffix appended to the column name for the run-length stream.
    pub run_length_suffix: String,
    /// Verify the CRC32 of every stream on load.
    pub verify_checksums: bool,
}

impl PersistenceConfig {
    /// Checks that every stream of a column gets its own file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty suffix, a suffix
    /// containing a path separator, or two identical suffixes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let suffixes = [
            ("persistence.dictionary_suffix", &self.dictionary_suffix),
            ("persistence.run_length_suffix", &self.run_length_suffix),
        ];
        for (key, suffix) in suffixes {
            if suffix.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "suffix must not be empty".to_string(),
                });
            }
            if suffix.contains(&['/', '\\', '\0'][..]) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("suffix '{suffix}' must not contain a path separator"),
                });
            }
        }

        if self.dictionary_suffix == self.run_length_suffix {
            return Err(ConfigError::InvalidValue {
                key: "persistence.run_length_suffix".to_string(),
                message: "must differ from persistence.dictionary_suffix".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            dictionary_suffix: "dictpath".to_string(),
            run_length_suffix: "newpath".to_string(),
            verify_checksums: true,
        }
    }
}

/// Logging configuration section.
///
/// The library only emits `tracing` events and never installs a subscriber.
/// `level` is read by whoever embeds it when building their filter, e.g.
/// `EnvFilter::new(&config.logging.level)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main `colpack` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CodecConfig {
    /// Run-length codec configuration.
    pub rle: RleConfig,
    /// Persistence configuration.
    pub persistence: PersistenceConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("colpack.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("COLPACK_").split("__").lowercase(true));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.persistence.validate()?;

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

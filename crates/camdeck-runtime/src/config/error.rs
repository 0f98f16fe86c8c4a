//! Configuration errors.

use camdeck_types::{ErrorClass, ErrorCode};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config file '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid environment variable value.
    #[error("invalid value for environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },

    /// A configured base URL does not parse or cannot carry a path.
    #[error("invalid url for '{key}': '{value}' ({message})")]
    InvalidUrl {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl ConfigError {
    /// Creates a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a parse TOML error.
    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid env var error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid url error.
    pub fn invalid_url(
        key: &'static str,
        value: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidUrl {
            key,
            value: value.into(),
            message: message.to_string(),
        }
    }
}

impl ErrorCode for ConfigError {
    fn code(&self) -> &'static str {
        match self {
            Self::ReadFile { .. } => "CONFIG_READ_FAILED",
            Self::ParseToml { .. } => "CONFIG_PARSE_FAILED",
            Self::InvalidEnvVar { .. } => "CONFIG_INVALID_ENV_VAR",
            Self::InvalidUrl { .. } => "CONFIG_INVALID_URL",
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            Self::ReadFile { .. } => ErrorClass::Unavailable,
            _ => ErrorClass::Invalid,
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camdeck_types::assert_error_codes;

    #[test]
    fn error_display() {
        let err = ConfigError::invalid_env_var("CAMDECK_URL_TTL_SECS", "expected integer");
        assert!(err.to_string().contains("CAMDECK_URL_TTL_SECS"));
        assert!(err.to_string().contains("expected integer"));
    }

    #[test]
    fn codes_follow_convention() {
        assert_error_codes(
            &[
                ConfigError::read_file("/x", std::io::Error::other("boom")),
                ConfigError::invalid_env_var("X", "bad"),
                ConfigError::invalid_url("playback.stream_base_url", "nope", "relative url"),
            ],
            "CONFIG_",
        );
    }
}

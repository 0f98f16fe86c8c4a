//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Main configuration structure.
///
/// This is the unified configuration after merging all layers.
///
/// # Example
///
/// ```
/// use camdeck_runtime::config::CamdeckConfig;
///
/// let config = CamdeckConfig::default();
/// assert_eq!(config.playback.url_ttl_secs, 300);
/// assert!(config.audit.path.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CamdeckConfig {
    /// Playback URL issuing.
    pub playback: PlaybackConfig,

    /// Playback audit sink.
    pub audit: AuditConfig,

    /// Event lifecycle settings.
    pub lifecycle: LifecycleConfig,
}

impl CamdeckConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values in `other` override values in `self` when they differ from
    /// the defaults.
    pub fn merge(&mut self, other: &Self) {
        self.playback.merge(&other.playback);
        self.audit.merge(&other.audit);
        self.lifecycle.merge(&other.lifecycle);
    }
}

/// Playback URL configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Base URL for stream links.
    pub stream_base_url: String,

    /// Base URL for download links.
    pub download_base_url: String,

    /// Lifetime of an issued URL in seconds.
    pub url_ttl_secs: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            stream_base_url: "http://localhost:8080/stream".into(),
            download_base_url: "http://localhost:8080/download".into(),
            url_ttl_secs: 300,
        }
    }
}

impl PlaybackConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.stream_base_url != default.stream_base_url {
            self.stream_base_url = other.stream_base_url.clone();
        }
        if other.download_base_url != default.download_base_url {
            self.download_base_url = other.download_base_url.clone();
        }
        if other.url_ttl_secs != default.url_ttl_secs {
            self.url_ttl_secs = other.url_ttl_secs;
        }
    }

    /// Parses the stream base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the value is not an absolute
    /// URL that can carry a path.
    pub fn stream_base(&self) -> Result<Url, ConfigError> {
        parse_base("playback.stream_base_url", &self.stream_base_url)
    }

    /// Parses the download base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the value is not an absolute
    /// URL that can carry a path.
    pub fn download_base(&self) -> Result<Url, ConfigError> {
        parse_base("playback.download_base_url", &self.download_base_url)
    }
}

fn parse_base(key: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::invalid_url(key, value, e))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::invalid_url(key, value, "cannot be a base"));
    }
    Ok(url)
}

/// Audit sink configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuditConfig {
    /// JSONL file for playback audit records.
    ///
    /// `None` keeps records in memory only.
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    fn merge(&mut self, other: &Self) {
        if other.path.is_some() {
            self.path.clone_from(&other.path);
        }
    }
}

/// Event lifecycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Number of lifecycle transitions kept in memory.
    pub history_capacity: usize,

    /// Auto-delete days applied to new events that specify no policy.
    pub default_auto_delete_days: Option<u32>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            history_capacity: 256,
            default_auto_delete_days: None,
        }
    }
}

impl LifecycleConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.history_capacity != default.history_capacity {
            self.history_capacity = other.history_capacity;
        }
        if other.default_auto_delete_days.is_some() {
            self.default_auto_delete_days = other.default_auto_delete_days;
        }
    }
}

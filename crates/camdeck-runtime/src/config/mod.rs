//! Configuration with hierarchical layering.
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌────────────────────────────────────────────┐
//! │  1. Environment Variables (CAMDECK_*)      │  Deployment override
//! ├────────────────────────────────────────────┤
//! │  2. Project Config (.camdeck/config.toml)  │  Site-specific
//! ├────────────────────────────────────────────┤
//! │  3. Global Config (~/.camdeck/config.toml) │  Host defaults
//! ├────────────────────────────────────────────┤
//! │  4. Default Values (compile-time)          │  Fallback
//! └────────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `CAMDECK_STREAM_BASE_URL` | `playback.stream_base_url` | URL |
//! | `CAMDECK_DOWNLOAD_BASE_URL` | `playback.download_base_url` | URL |
//! | `CAMDECK_URL_TTL_SECS` | `playback.url_ttl_secs` | u64 |
//! | `CAMDECK_AUDIT_PATH` | `audit.path` | PathBuf |
//! | `CAMDECK_HISTORY_CAPACITY` | `lifecycle.history_capacity` | usize |
//!
//! # Example Configuration
//!
//! ```toml
//! # ~/.camdeck/config.toml
//!
//! [playback]
//! stream_base_url = "https://media.example.org/stream"
//! download_base_url = "https://media.example.org/download"
//! url_ttl_secs = 600
//!
//! [audit]
//! path = "/var/lib/camdeck/playback-audit.jsonl"
//!
//! [lifecycle]
//! history_capacity = 512
//! default_auto_delete_days = 90
//! ```

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{AuditConfig, CamdeckConfig, LifecycleConfig, PlaybackConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".camdeck")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".camdeck";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";

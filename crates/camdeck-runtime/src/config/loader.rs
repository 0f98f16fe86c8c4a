//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.camdeck/config.toml`)
//! 3. Project config (`.camdeck/config.toml`)
//! 4. Environment variables (`CAMDECK_*`)
//!
//! Each layer overrides the previous.

use super::{
    default_config_path, CamdeckConfig, ConfigError, PROJECT_CONFIG_DIR, PROJECT_CONFIG_FILE,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Parses a numeric environment variable into `$field`.
macro_rules! parse_env_number {
    ($lookup:expr, $field:expr, $var:literal) => {
        if let Some(val) = $lookup($var) {
            $field = parse_number(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected non-negative integer"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```no_run
/// use camdeck_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/srv/dashboard")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), camdeck_runtime::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Global config file path (defaults to ~/.camdeck/config.toml).
    global_config_path: Option<PathBuf>,

    /// Project root directory.
    project_root: Option<PathBuf>,

    /// Skip environment variable loading.
    skip_env: bool,

    /// Skip global config loading.
    skip_global: bool,

    /// Skip project config loading.
    skip_project: bool,
}

impl ConfigLoader {
    /// Creates a new loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root directory.
    ///
    /// Project config will be loaded from `<project_root>/.camdeck/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Skips project config loading.
    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file exists but cannot be parsed,
    /// if an environment variable holds an invalid value, or if a resulting
    /// base URL is invalid. Missing config files are silently ignored.
    pub fn load(&self) -> Result<CamdeckConfig, ConfigError> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Like [`load`](Self::load) but reads environment overrides through
    /// `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with_env<F>(&self, lookup: F) -> Result<CamdeckConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CamdeckConfig::default();

        // Layer 1: Global config
        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_config) = self.load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global_config);
            }
        }

        // Layer 2: Project config
        if !self.skip_project {
            if let Some(ref project_root) = self.project_root {
                let project_config_path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(project_config) = self.load_file(&project_config_path)? {
                    debug!(
                        path = %project_config_path.display(),
                        project = %project_root.display(),
                        "Loaded project config"
                    );
                    config.merge(&project_config);
                }
            }
        }

        // Layer 3: Environment variables
        if !self.skip_env {
            apply_env(&mut config, &lookup)?;
        }

        config.playback.stream_base()?;
        config.playback.download_base()?;

        Ok(config)
    }

    /// Loads a config file, returning None if it doesn't exist.
    fn load_file(&self, path: &Path) -> Result<Option<CamdeckConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

        let config =
            CamdeckConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

        Ok(Some(config))
    }
}

/// Applies environment variable overrides.
fn apply_env<F>(config: &mut CamdeckConfig, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("CAMDECK_STREAM_BASE_URL") {
        config.playback.stream_base_url = val;
    }
    if let Some(val) = lookup("CAMDECK_DOWNLOAD_BASE_URL") {
        config.playback.download_base_url = val;
    }

    parse_env_number!(lookup, config.playback.url_ttl_secs, "CAMDECK_URL_TTL_SECS");
    parse_env_number!(lookup, config.lifecycle.history_capacity, "CAMDECK_HISTORY_CAPACITY");

    if let Some(val) = lookup("CAMDECK_AUDIT_PATH") {
        config.audit.path = Some(PathBuf::from(val));
    }

    Ok(())
}

/// Parses a non-negative integer, tolerating surrounding whitespace.
fn parse_number<T: FromStr>(s: &str) -> Option<T> {
    s.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, content).expect("write config");
        path
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn load_defaults_only() {
        let config = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .skip_env_vars()
            .load()
            .expect("load");

        assert_eq!(config, CamdeckConfig::default());
    }

    #[test]
    fn load_global_config() {
        let temp = TempDir::new().expect("tempdir");
        let config_path = create_config_file(
            temp.path(),
            r#"
[playback]
url_ttl_secs = 120

[lifecycle]
history_capacity = 16
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&config_path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .expect("load");

        assert_eq!(config.playback.url_ttl_secs, 120);
        assert_eq!(config.lifecycle.history_capacity, 16);
    }

    #[test]
    fn load_project_overrides_global() {
        let global_temp = TempDir::new().expect("tempdir");
        let project_temp = TempDir::new().expect("tempdir");

        let project_dir = project_temp.path().join(".camdeck");
        std::fs::create_dir_all(&project_dir).expect("mkdir");

        let global_path = create_config_file(
            global_temp.path(),
            r#"
[playback]
url_ttl_secs = 120
stream_base_url = "https://global.example.org/stream"
"#,
        );
        create_config_file(
            &project_dir,
            r#"
[playback]
stream_base_url = "https://site.example.org/stream"
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&global_path)
            .with_project_root(project_temp.path())
            .skip_env_vars()
            .load()
            .expect("load");

        // ttl from global (not overridden in project)
        assert_eq!(config.playback.url_ttl_secs, 120);
        // base url from project
        assert_eq!(
            config.playback.stream_base_url,
            "https://site.example.org/stream"
        );
    }

    #[test]
    fn env_overrides_files() {
        let temp = TempDir::new().expect("tempdir");
        let config_path = create_config_file(
            temp.path(),
            r#"
[playback]
url_ttl_secs = 120
"#,
        );

        let config = ConfigLoader::new()
            .with_global_config(&config_path)
            .skip_project_config()
            .load_with_env(env(&[
                ("CAMDECK_URL_TTL_SECS", " 45 "),
                ("CAMDECK_AUDIT_PATH", "/tmp/audit.jsonl"),
                ("CAMDECK_HISTORY_CAPACITY", "8"),
                ("CAMDECK_DOWNLOAD_BASE_URL", "https://dl.example.org/files"),
            ]))
            .expect("load");

        assert_eq!(config.playback.url_ttl_secs, 45);
        assert_eq!(config.lifecycle.history_capacity, 8);
        assert_eq!(config.audit.path, Some(PathBuf::from("/tmp/audit.jsonl")));
        assert_eq!(
            config.playback.download_base_url,
            "https://dl.example.org/files"
        );
    }

    #[test]
    fn invalid_env_number_is_rejected() {
        let err = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .load_with_env(env(&[("CAMDECK_URL_TTL_SECS", "soon")]))
            .expect_err("should reject");

        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar { ref name, .. } if name == "CAMDECK_URL_TTL_SECS"
        ));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ConfigLoader::new()
            .skip_global_config()
            .skip_project_config()
            .load_with_env(env(&[("CAMDECK_STREAM_BASE_URL", "::nope::")]))
            .expect_err("should reject");

        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().expect("tempdir");
        let path = create_config_file(temp.path(), "[playback\nurl_ttl_secs = ");

        let err = ConfigLoader::new()
            .with_global_config(&path)
            .skip_project_config()
            .skip_env_vars()
            .load()
            .expect_err("should reject");

        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn missing_config_files_ok() {
        let config = ConfigLoader::new()
            .with_global_config("/nonexistent/path/config.toml")
            .with_project_root("/nonexistent/project")
            .skip_env_vars()
            .load()
            .expect("load");

        assert_eq!(config, CamdeckConfig::default());
    }

    #[test]
    fn parse_number_values() {
        assert_eq!(parse_number::<u64>("300"), Some(300));
        assert_eq!(parse_number::<u64>(" 7\n"), Some(7));
        assert_eq!(parse_number::<u64>("-1"), None);
        assert_eq!(parse_number::<usize>("ten"), None);
    }
}

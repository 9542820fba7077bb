//! Configuration loading and resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: the client starts with compiled
//! defaults and logs a warning.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const ENV_SERVICE_URL: &str = "NCML_SERVICE_URL";
pub const ENV_TIMEOUT_SECS: &str = "NCML_TIMEOUT_SECS";
pub const ENV_DEMO_MODE: &str = "NCML_DEMO_MODE";
pub const ENV_USER: &str = "NCML_USER";

/// Configuration file as stored on disk
///
/// Every field is optional so a partial file only overrides what it names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the training service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,

    /// Path of the prediction endpoint, relative to `service_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_path: Option<String>,

    /// Caller-side timeout applied to every HTTP request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Interval between training status checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_poll_interval_secs: Option<u64>,

    /// Serve canned responses instead of calling the training service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<bool>,

    /// Identity of the signed-in user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_display_name: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Built-in defaults used when no other source provides a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub service_url: String,
    pub prediction_path: String,
    pub request_timeout_secs: u64,
    pub status_poll_interval_secs: u64,
    pub demo_mode: bool,
    pub user_email: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:8000".to_string(),
            prediction_path: "/predict".to_string(),
            request_timeout_secs: 30,
            status_poll_interval_secs: 5,
            demo_mode: false,
            user_email: "local@ncml".to_string(),
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub service_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub demo_mode: Option<bool>,
    pub user_email: Option<String>,
}

/// Fully resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub service_url: String,
    pub prediction_path: String,
    pub request_timeout: Duration,
    pub status_poll_interval: Duration,
    pub demo_mode: bool,
    pub user_email: String,
    pub user_display_name: Option<String>,
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Resolve configuration from CLI overrides, environment and TOML
    pub fn resolve(overrides: &ConfigOverrides, toml: &TomlConfig) -> Result<Self> {
        let defaults = CompiledDefaults::default();

        let service_url = pick(
            "service_url",
            overrides.service_url.clone(),
            env_string(ENV_SERVICE_URL),
            toml.service_url.clone(),
        )
        .unwrap_or(defaults.service_url);
        let service_url = normalize_service_url(&service_url)?;

        let timeout_secs = pick(
            "request_timeout_secs",
            overrides.request_timeout_secs,
            env_parsed(ENV_TIMEOUT_SECS, parse_u64)?,
            toml.request_timeout_secs,
        )
        .unwrap_or(defaults.request_timeout_secs);
        if timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        let demo_mode = pick(
            "demo_mode",
            overrides.demo_mode,
            env_parsed(ENV_DEMO_MODE, parse_bool)?,
            toml.demo_mode,
        )
        .unwrap_or(defaults.demo_mode);

        let user_email = pick(
            "user_email",
            overrides.user_email.clone(),
            env_string(ENV_USER),
            toml.user_email.clone(),
        )
        .unwrap_or(defaults.user_email);

        let prediction_path = toml
            .prediction_path
            .clone()
            .unwrap_or(defaults.prediction_path);
        let prediction_path = if prediction_path.starts_with('/') {
            prediction_path
        } else {
            format!("/{}", prediction_path)
        };

        let poll_secs = toml
            .status_poll_interval_secs
            .unwrap_or(defaults.status_poll_interval_secs)
            .max(1);

        Ok(Self {
            service_url,
            prediction_path,
            request_timeout: Duration::from_secs(timeout_secs),
            status_poll_interval: Duration::from_secs(poll_secs),
            demo_mode,
            user_email,
            user_display_name: toml.user_display_name.clone(),
            logging: toml.logging.clone(),
        })
    }

    /// Training submission endpoint
    pub fn training_url(&self) -> String {
        format!("{}/send_training", self.service_url)
    }

    pub fn status_url(&self, training_id: &str) -> Result<String> {
        self.endpoint(&["training_status", training_id])
    }

    pub fn model_url(&self, model_id: &str) -> Result<String> {
        self.endpoint(&["model", model_id])
    }

    pub fn prediction_url(&self) -> String {
        format!("{}{}", self.service_url, self.prediction_path)
    }

    /// Service URL with each segment appended and percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<String> {
        let mut url = Url::parse(&self.service_url).map_err(|e| {
            Error::Config(format!("invalid service_url '{}': {}", self.service_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                Error::Config(format!("service_url '{}' cannot take a path", self.service_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        let defaults = CompiledDefaults::default();
        Self {
            service_url: defaults.service_url,
            prediction_path: defaults.prediction_path,
            request_timeout: Duration::from_secs(defaults.request_timeout_secs),
            status_poll_interval: Duration::from_secs(defaults.status_poll_interval_secs),
            demo_mode: defaults.demo_mode,
            user_email: defaults.user_email,
            user_display_name: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Pick the highest-priority value, warning when several sources disagree
fn pick<T: PartialEq>(name: &str, cli: Option<T>, env: Option<T>, toml: Option<T>) -> Option<T> {
    let sources: Vec<&str> = [
        cli.as_ref().map(|_| "command line"),
        env.as_ref().map(|_| "environment"),
        toml.as_ref().map(|_| "TOML"),
    ]
    .into_iter()
    .flatten()
    .collect();

    if sources.len() > 1 {
        debug!(
            setting = name,
            "Setting found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    cli.or(env).or(toml)
}

fn env_string(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn env_parsed<T>(var: &str, parse: fn(&str) -> Option<T>) -> Result<Option<T>> {
    match env_string(var) {
        None => Ok(None),
        Some(raw) => parse(raw.trim())
            .map(Some)
            .ok_or_else(|| Error::Config(format!("Invalid value for {}: '{}'", var, raw))),
    }
}

fn parse_u64(s: &str) -> Option<u64> {
    s.parse().ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn normalize_service_url(raw: &str) -> Result<String> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(Error::Config(format!(
            "service_url must start with http:// or https:// (got '{}')",
            raw
        )));
    }
    Ok(url.to_string())
}

/// Default configuration file location (`<config_dir>/ncml/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ncml").join("config.toml"))
}

/// Load TOML configuration, falling back to defaults when the file is missing
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(
            "Config file not found: {}. Using compiled defaults.",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Write TOML configuration atomically (temp file + rename)
///
/// On Unix the file is restricted to the owner (0600).
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    std::fs::write(&temp_path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }

    debug!("Config written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_normalize_service_url_strips_trailing_slash() {
        assert_eq!(
            normalize_service_url("http://localhost:8000/").unwrap(),
            "http://localhost:8000"
        );
        assert!(normalize_service_url("localhost:8000").is_err());
    }

    #[test]
    fn test_endpoint_urls() {
        let config = ClientConfig::default();
        assert_eq!(config.training_url(), "http://127.0.0.1:8000/send_training");
        assert_eq!(
            config.status_url("t1").unwrap(),
            "http://127.0.0.1:8000/training_status/t1"
        );
        assert_eq!(config.model_url("m1").unwrap(), "http://127.0.0.1:8000/model/m1");
        assert_eq!(config.prediction_url(), "http://127.0.0.1:8000/predict");
    }

    #[test]
    fn test_ids_are_escaped_in_paths() {
        let config = ClientConfig {
            service_url: "http://127.0.0.1:8000/api".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.model_url("team/a#1").unwrap(),
            "http://127.0.0.1:8000/api/model/team%2Fa%231"
        );
        assert_eq!(
            config.status_url("t 1?x").unwrap(),
            "http://127.0.0.1:8000/api/training_status/t%201%3Fx"
        );

        let broken = ClientConfig {
            service_url: "not a url".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(broken.model_url("m1"), Err(Error::Config(_))));
    }

    #[test]
    fn test_pick_priority() {
        assert_eq!(pick("x", Some(1), Some(2), Some(3)), Some(1));
        assert_eq!(pick("x", None, Some(2), Some(3)), Some(2));
        assert_eq!(pick("x", None, None, Some(3)), Some(3));
        assert_eq!(pick::<u8>("x", None, None, None), None);
    }
}

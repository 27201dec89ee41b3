//! Configuration module for armctl
//!
//! Handles loading and merging configuration from multiple sources:
//! - Default values
//! - System configuration (/etc/armctl/armctl.toml)
//! - User configuration (~/.armctl.toml)
//! - Project configuration (./armctl.toml)
//! - An explicit path (`--config` or `ARMCTL_CONFIG`), which replaces the above
//! - Environment variables
//!
//! Files are TOML, YAML or JSON, chosen by extension.

use crate::arm::DEFAULT_ENDPOINT;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Control-plane connection settings
    pub azure: AzureConfig,

    /// Long-running operation polling
    pub polling: PollingConfig,

    /// Info module listing
    pub listing: ListingConfig,

    /// Colors and output settings
    pub colors: ColorsConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// ARM connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    /// ARM endpoint
    pub endpoint: String,

    /// Subscription used when a task does not name one
    pub subscription_id: Option<String>,

    /// Pre-acquired bearer token
    pub access_token: Option<String>,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            subscription_id: None,
            access_token: None,
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Polling settings for accepted operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between provisioning-state reads
    #[serde(with = "humantime_serde")]
    pub interval: Duration,

    /// Give up after this long
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Listing settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Stop after this many pages and report the continuation link
    pub max_pages: Option<usize>,
}

/// Colors configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    /// Enable colors
    pub enabled: bool,

    /// OK color
    pub ok: String,

    /// Changed color
    pub changed: String,

    /// Error color
    pub error: String,

    /// Diff add color
    pub diff_add: String,

    /// Diff remove color
    pub diff_remove: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ok: "green".to_string(),
            changed: "yellow".to_string(),
            error: "red".to_string(),
            diff_add: "green".to_string(),
            diff_remove: "red".to_string(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!(
                "unknown log format '{}' (expected text or json)",
                other
            ))),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when neither `-v` nor `RUST_LOG` is given
    pub log_level: String,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from all sources
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        for path in Self::get_config_paths(config_path) {
            if path.exists() {
                debug!("Loading configuration from {}", path.display());
                config = config.merge(Self::from_file(&path)?);
            } else if config_path.is_some() {
                return Err(Error::ConfigLoad {
                    path,
                    message: "file does not exist".to_string(),
                });
            }
        }

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Get the list of configuration file paths to check
    fn get_config_paths(explicit_path: Option<&Path>) -> Vec<PathBuf> {
        // Explicit path takes priority
        if let Some(path) = explicit_path {
            return vec![path.to_path_buf()];
        }
        if let Ok(env_config) = std::env::var("ARMCTL_CONFIG") {
            return vec![PathBuf::from(env_config)];
        }

        let mut paths = vec![PathBuf::from("/etc/armctl/armctl.toml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".armctl.toml"));
        }
        paths.push(PathBuf::from("armctl.toml"));
        paths
    }

    /// Parse one configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_err = |message: String| Error::ConfigLoad {
            path: path.to_path_buf(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;

        // Determine format based on extension
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&content).map_err(|e| load_err(e.to_string())),
            "json" => serde_json::from_str(&content).map_err(|e| load_err(e.to_string())),
            _ => toml::from_str(&content).map_err(|e| load_err(e.to_string())),
        }
    }

    /// Merge another config into this one; `other` wins where it departs from
    /// the defaults.
    fn merge(&self, other: Config) -> Config {
        let azure_defaults = AzureConfig::default();
        Config {
            azure: AzureConfig {
                endpoint: if other.azure.endpoint != azure_defaults.endpoint {
                    other.azure.endpoint
                } else {
                    self.azure.endpoint.clone()
                },
                subscription_id: other
                    .azure
                    .subscription_id
                    .or_else(|| self.azure.subscription_id.clone()),
                access_token: other
                    .azure
                    .access_token
                    .or_else(|| self.azure.access_token.clone()),
                request_timeout: if other.azure.request_timeout != azure_defaults.request_timeout {
                    other.azure.request_timeout
                } else {
                    self.azure.request_timeout
                },
            },
            polling: if other.polling != PollingConfig::default() {
                other.polling
            } else {
                self.polling.clone()
            },
            listing: ListingConfig {
                max_pages: other.listing.max_pages.or(self.listing.max_pages),
            },
            colors: other.colors,
            logging: other.logging,
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(subscription) = std::env::var("AZURE_SUBSCRIPTION_ID") {
            self.azure.subscription_id = Some(subscription);
        }

        if let Ok(token) = std::env::var("AZURE_ACCESS_TOKEN") {
            self.azure.access_token = Some(token);
        }

        if let Ok(endpoint) = std::env::var("ARMCTL_ENDPOINT") {
            self.azure.endpoint = endpoint;
        }

        if let Ok(timeout) = std::env::var("ARMCTL_POLL_TIMEOUT") {
            self.polling.timeout = humantime_serde::re::humantime::parse_duration(&timeout).map_err(|e| {
                Error::Config(format!("invalid ARMCTL_POLL_TIMEOUT '{}': {}", timeout, e))
            })?;
        }

        if let Ok(format) = std::env::var("ARMCTL_LOG_FORMAT") {
            self.logging.log_format = format.parse()?;
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.colors.enabled = false;
        }

        Ok(())
    }

    /// Subscription used when a task does not name one
    pub fn subscription_id(&self) -> Option<&str> {
        self.azure.subscription_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for key in [
            "ARMCTL_CONFIG",
            "AZURE_SUBSCRIPTION_ID",
            "AZURE_ACCESS_TOKEN",
            "ARMCTL_ENDPOINT",
            "ARMCTL_POLL_TIMEOUT",
            "ARMCTL_LOG_FORMAT",
            "NO_COLOR",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.azure.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.polling.timeout, Duration::from_secs(1800));
        assert_eq!(config.logging.log_format, LogFormat::Text);
        assert!(config.colors.enabled);
    }

    #[test]
    fn test_config_merge() {
        let base = Config {
            azure: AzureConfig {
                subscription_id: Some("base-sub".to_string()),
                ..AzureConfig::default()
            },
            ..Config::default()
        };
        let other = Config {
            listing: ListingConfig { max_pages: Some(3) },
            ..Config::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.subscription_id(), Some("base-sub"));
        assert_eq!(merged.listing.max_pages, Some(3));
    }

    #[test]
    #[serial]
    fn test_load_toml_file() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[azure]
subscription_id = "00000000-0000-0000-0000-000000000001"
request_timeout = "2m"

[polling]
interval = "1s"
timeout = "10m"

[logging]
log_format = "json"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(
            config.subscription_id(),
            Some("00000000-0000-0000-0000-000000000001")
        );
        assert_eq!(config.azure.request_timeout, Duration::from_secs(120));
        assert_eq!(config.polling.interval, Duration::from_secs(1));
        assert_eq!(config.polling.timeout, Duration::from_secs(600));
        assert_eq!(config.logging.log_format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn test_load_yaml_file() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "listing:\n  max_pages: 2\ncolors:\n  enabled: false").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.listing.max_pages, Some(2));
        assert!(!config.colors.enabled);
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file_is_an_error() {
        clear_env();
        let err = Config::load(Some(Path::new("/nonexistent/armctl.toml"))).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad { .. }));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    #[serial]
    fn test_malformed_file_names_path() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[azure\nendpoint = ").unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        clear_env();
        std::env::set_var("AZURE_SUBSCRIPTION_ID", "env-sub");
        std::env::set_var("ARMCTL_POLL_TIMEOUT", "90s");
        std::env::set_var("ARMCTL_LOG_FORMAT", "JSON");
        std::env::set_var("NO_COLOR", "1");

        let mut config = Config::default();
        config.apply_env_overrides().unwrap();
        assert_eq!(config.subscription_id(), Some("env-sub"));
        assert_eq!(config.polling.timeout, Duration::from_secs(90));
        assert_eq!(config.logging.log_format, LogFormat::Json);
        assert!(!config.colors.enabled);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_duration() {
        clear_env();
        std::env::set_var("ARMCTL_POLL_TIMEOUT", "soon");
        let mut config = Config::default();
        assert!(matches!(
            config.apply_env_overrides(),
            Err(Error::Config(_))
        ));
        clear_env();
    }
}

//! Configuration system for the video generation client
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (VIDGEN_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

/// Placeholder shown instead of the API key when printing configuration
const MASKED_KEY: &str = "********";

/// Main client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote service settings
    pub service: ServiceSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Remote service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// WebSocket URL of the video generation service
    pub url: String,

    /// API key embedded in every outbound message
    pub api_key: String,

    /// Connection timeout in milliseconds (0 = wait for the OS)
    pub connect_timeout_ms: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            url: "wss://50fa8sjxo9.execute-api.us-west-2.amazonaws.com/production".to_string(),
            api_key: String::new(),
            connect_timeout_ms: 0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

/// Endpoint and credential handed to a client at construction time
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSettings {
    url: String,
    api_key: String,
    connect_timeout: Option<Duration>,
}

impl ClientSettings {
    /// Create settings for an endpoint, rejecting an empty credential
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let api_key = api_key.into();

        validate_url(&url)?;
        if api_key.trim().is_empty() {
            return Err(Error::MissingCredential { url });
        }

        Ok(Self {
            url,
            api_key,
            connect_timeout: None,
        })
    }

    /// Bound the WebSocket handshake
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

// The credential must never reach logs through `{:?}`.
impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("url", &self.url)
            .field("api_key", &MASKED_KEY)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| {
                Error::config_parse(format!("{}: invalid TOML", path.display()), e)
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // An explicit path must exist
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        let search_paths = [
            PathBuf::from("vidgen-client.toml"),
            dirs::config_dir()
                .map(|p| p.join("vidgen").join("client.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".vidgen").join("client.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/vidgen/client.toml"),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("VIDGEN_SERVICE_URL") {
            self.service.url = val;
        }
        if let Ok(val) = std::env::var("VIDGEN_API_KEY") {
            self.service.api_key = val;
        }
        if let Ok(val) = std::env::var("VIDGEN_CONNECT_TIMEOUT_MS") {
            if let Ok(n) = val.parse() {
                self.service.connect_timeout_ms = n;
            }
        }

        if let Ok(val) = std::env::var("VIDGEN_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("VIDGEN_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("VIDGEN_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_url(&self.service.url)?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Build the endpoint/credential pair a client is constructed with
    pub fn client_settings(&self) -> Result<ClientSettings> {
        let settings = ClientSettings::new(&self.service.url, &self.service.api_key)?;
        if self.service.connect_timeout_ms > 0 {
            return Ok(settings
                .with_connect_timeout(Duration::from_millis(self.service.connect_timeout_ms)));
        }
        Ok(settings)
    }

    /// Render the effective configuration as TOML with the API key masked
    pub fn to_display_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if !shown.service.api_key.is_empty() {
            shown.service.api_key = MASKED_KEY.to_string();
        }
        Ok(toml::to_string_pretty(&shown)?)
    }
}

/// Check that a service URL is a parseable ws:// or wss:// URL
fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::config_field_invalid("service.url", "Service URL cannot be empty"));
    }
    if !url.starts_with("ws://") && !url.starts_with("wss://") {
        return Err(Error::config_field_invalid(
            "service.url",
            "Service URL must start with ws:// or wss://",
        ));
    }
    Url::parse(url).map_err(|e| {
        Error::config_field_invalid("service.url", format!("Invalid service URL '{}': {}", url, e))
    })?;
    Ok(())
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".vidgen")
                .join("client.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# Video generation client configuration

[service]
# WebSocket URL of the video generation service
url = "wss://50fa8sjxo9.execute-api.us-west-2.amazonaws.com/production"

# API key sent with every task (or export VIDGEN_API_KEY)
api_key = ""

# Connection timeout in milliseconds (0 = wait for the OS)
connect_timeout_ms = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.vidgen/logs/client.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

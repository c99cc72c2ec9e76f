use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use toml_edit::{DocumentMut, Item, Table};

use crate::config::ConfigError;
use crate::player::StepSpeed;
use crate::util::paths::{config_path, exports_dir};

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the simulation backend
    pub server_url: String,
    /// Per-request timeout for backend calls
    pub timeout: Duration,
    /// Step interval the player starts with
    pub default_interval: StepSpeed,
    /// Where workflow exports land (None = the data directory's exports/)
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_interval: StepSpeed::default(),
            export_dir: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    server: Option<TomlServerConfig>,
    player: Option<TomlPlayerConfig>,
    export: Option<TomlExportConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlServerConfig {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlPlayerConfig {
    default_interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlExportConfig {
    dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the data directory, merging with defaults
    pub fn load() -> Self {
        let config_file = config_path();

        // Create example config on first run
        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from `path`. A missing or unreadable file yields
    /// the defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "No config file");
                return Self::default();
            }
        };
        match Self::parse(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid config file");
                Self::default()
            }
        }
    }

    /// Parse TOML contents on top of the defaults.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Config::default();

        if let Some(server) = toml_config.server {
            if let Some(url) = server.url {
                config.server_url = url;
            }
            if let Some(secs) = server.timeout_secs {
                config.timeout = Duration::from_secs(secs);
            }
        }

        if let Some(ms) = toml_config.player.and_then(|p| p.default_interval_ms) {
            match StepSpeed::try_from(ms) {
                Ok(speed) => config.default_interval = speed,
                Err(e) => tracing::warn!(error = %e, "Ignoring player.default_interval_ms"),
            }
        }

        if let Some(export) = toml_config.export {
            config.export_dir = export.dir;
        }

        Ok(config)
    }

    /// Create the default config file from the bundled example
    fn create_default_config(path: &Path) {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    tracing::warn!(error = %e, "Failed to create config directory");
                    return;
                }
            }
        }

        if let Err(e) = fs::write(path, EXAMPLE_CONFIG) {
            tracing::warn!(error = %e, "Failed to write default config");
        }
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Configured export directory, or `exports/` under the data directory.
    pub fn resolved_export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(exports_dir)
    }
}

/// Save the backend URL to the config file in the data directory.
pub fn save_server_url(url: &str) -> Result<(), ConfigError> {
    save_server_url_to(&config_path(), url)
}

/// Set `server.url` in the config file at `config_file`, preserving all
/// other content.
pub fn save_server_url_to(config_file: &Path, url: &str) -> Result<(), ConfigError> {
    // Read existing config or start with empty document
    let contents = if config_file.exists() {
        fs::read_to_string(config_file)?
    } else {
        String::new()
    };

    let mut doc: DocumentMut = contents.parse()?;

    if !doc.contains_key("server") {
        doc["server"] = Item::Table(Table::new());
    }
    doc["server"]["url"] = toml_edit::value(url);

    if let Some(parent) = config_file.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(config_file, doc.to_string())?;
    tracing::info!(url, path = %config_file.display(), "Saved server url");

    Ok(())
}

mod settings;

use thiserror::Error;

pub use settings::{save_server_url, save_server_url_to, Config, DEFAULT_SERVER_URL, EXAMPLE_CONFIG};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file cannot be edited: {0}")]
    Edit(#[from] toml_edit::TomlError),
}

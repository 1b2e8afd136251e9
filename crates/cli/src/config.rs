use proto::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level studychat configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relay endpoint settings.
    pub relay: RelayConfig,
    /// Chat client settings.
    pub client: ClientConfig,
}

/// Relay endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address the relay binds to.
    pub bind: String,
    /// API key for the upstream completion provider.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible upstream API.
    pub api_base: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3210".to_string(),
            api_key: String::new(),
            api_base: "https://api.groq.com/openai/v1".to_string(),
        }
    }
}

/// Chat client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Relay chat endpoint URL the TUI talks to.
    pub endpoint: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3210/api/chat".to_string(),
        }
    }
}

impl Config {
    /// Default on-disk config path: `~/.studychat/config.toml`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".studychat").join("config.toml")
    }

    /// Loads the config from the given path, or the default path.
    ///
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Toml(e.to_string()))
    }
}

//! Client configuration
//!
//! Values are layered: built-in defaults, then `config.toml` from the
//! platform config directory, then the `TERMCHAT_SERVER` environment
//! variable. Command-line flags are applied last by the binary.

use crate::{ChatError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default server address (the reference chat server listens on 8081)
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8081";

/// Default number of message records kept in scrollback
pub const DEFAULT_HISTORY_SIZE: usize = 1000;

/// Environment variable that overrides the server address
pub const SERVER_ENV_VAR: &str = "TERMCHAT_SERVER";

/// Configuration for a Termchat session
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// WebSocket URL of the chat service
    pub server_url: String,

    /// Path to the stored login credentials
    pub credentials_file: PathBuf,

    /// Scrollback capacity in message records
    pub history_size: usize,

    /// Minimum time between two redraws when nothing changed
    pub refresh_interval: Duration,

    /// Input poll timeout per tick
    pub poll_interval: Duration,

    /// Where tracing output goes (stdout belongs to the TUI)
    pub log_file: PathBuf,
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    server_url: Option<String>,
    credentials_file: Option<PathBuf>,
    history_size: Option<usize>,
    refresh_interval_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
    log_file: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            credentials_file: PathBuf::from("login.json"),
            history_size: DEFAULT_HISTORY_SIZE,
            refresh_interval: Duration::from_millis(10),
            poll_interval: Duration::from_millis(10),
            log_file: default_log_file(),
        }
    }
}

impl ChatConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = path.is_some();
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_file(),
        };

        if let Some(path) = path {
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                config = config.merge_toml(&content)?;
                debug!("Loaded config from {:?}", path);
            } else if explicit {
                return Err(ChatError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }

        if let Ok(url) = std::env::var(SERVER_ENV_VAR) {
            if !url.trim().is_empty() {
                config.server_url = url;
            }
        }

        Ok(config)
    }

    /// Apply the keys present in a TOML document on top of `self`.
    pub fn merge_toml(mut self, content: &str) -> Result<Self> {
        let parsed: ConfigToml =
            toml::from_str(content).map_err(|e| ChatError::Config(e.to_string()))?;

        if let Some(url) = parsed.server_url {
            self.server_url = url;
        }
        if let Some(path) = parsed.credentials_file {
            self.credentials_file = path;
        }
        if let Some(size) = parsed.history_size {
            if size == 0 {
                return Err(ChatError::Config("history_size must be at least 1".into()));
            }
            self.history_size = size;
        }
        if let Some(ms) = parsed.refresh_interval_ms {
            self.refresh_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parsed.poll_interval_ms {
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(path) = parsed.log_file {
            self.log_file = path;
        }
        Ok(self)
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn with_credentials_file(mut self, path: PathBuf) -> Self {
        self.credentials_file = path;
        self
    }

    pub fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size.max(1);
        self
    }

    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = path;
        self
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("termchat").join("config.toml"))
}

fn default_log_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("termchat")
        .join("termchat.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.history_size, 1000);
        assert_eq!(config.poll_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_merge_toml_overrides_only_present_keys() {
        let config = ChatConfig::default()
            .merge_toml("server_url = \"wss://chat.example.org\"\nhistory_size = 50\n")
            .unwrap();
        assert_eq!(config.server_url, "wss://chat.example.org");
        assert_eq!(config.history_size, 50);
        assert_eq!(config.credentials_file, PathBuf::from("login.json"));
    }

    #[test]
    fn test_merge_toml_rejects_zero_history() {
        let result = ChatConfig::default().merge_toml("history_size = 0");
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_toml_rejects_unknown_keys() {
        let result = ChatConfig::default().merge_toml("colour = \"red\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(ChatConfig::load(Some(&missing)).is_err());
    }
}

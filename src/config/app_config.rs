use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapters::http::http_fetcher::DEFAULT_USER_AGENT;
use crate::core::errors::{DirectoryError, Result};

/// Config file looked up in the working directory when `--config` is absent.
pub const LOCAL_CONFIG_FILE: &str = "webkey.toml";

/// Top-level configuration, read from TOML. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub storage: StorageSection,
    pub sync: SyncSection,
    pub server: ServerSection,
}

impl AppConfig {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, `webkey.toml` in the
    /// working directory and then the user config directory are tried, and
    /// defaults apply when neither exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(DirectoryError::InvalidConfig {
                    detail: format!("config file {} not found", path.display()),
                });
            }
            return Self::from_file(path);
        }

        let candidates = [Some(PathBuf::from(LOCAL_CONFIG_FILE)), user_config_path()];
        match candidates.into_iter().flatten().find(|p| p.is_file()) {
            Some(found) => Self::from_file(&found),
            None => Ok(Self::default()),
        }
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            DirectoryError::InvalidConfig { detail } => DirectoryError::InvalidConfig {
                detail: format!("{}: {detail}", path.display()),
            },
            other => other,
        })
    }

    /// Parse TOML content and validate it.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| DirectoryError::InvalidConfig {
            detail: format!("failed to parse TOML: {e}"),
        })?;

        if config.sync.timeout_secs == 0 {
            return Err(DirectoryError::InvalidConfig {
                detail: "sync.timeout_secs must be greater than 0".into(),
            });
        }
        if config.sync.user_agent.trim().is_empty() {
            return Err(DirectoryError::InvalidConfig {
                detail: "sync.user_agent must not be empty".into(),
            });
        }

        Ok(config)
    }
}

/// `~/.config/webkey-directory/config.toml` (platform equivalent).
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("webkey-directory").join("config.toml"))
}

/// The `[app]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    /// Extension of downloaded key files.
    pub key_extension: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: "Webkey Directory".into(),
            key_extension: ".asc".into(),
        }
    }
}

/// The `[storage]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub root: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            root: PathBuf::from("storage"),
        }
    }
}

/// The `[sync]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl SyncSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.into(),
            timeout_secs: 30,
        }
    }
}

/// The `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".into(),
        }
    }
}

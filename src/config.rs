//! Settings: CLI flags over an optional TOML file over built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::response::StatusPolicy;

pub const DEFAULT_URL: &str = "http://mattermost.exemple.com";
pub const DEFAULT_PAGE_SIZE: u32 = 60;
/// Largest page the users endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_DIR: &str = "mattermost-utils";
const CONFIG_FILE: &str = "config.toml";

/// Contents of the configuration file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub page_size: Option<u32>,
    pub status_policy: Option<StatusPolicy>,
}

/// `<config dir>/mattermost-utils/config.toml`, when the platform has one.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

impl FileConfig {
    /// Loads `explicit` (which must exist) or the default file (which may not).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::read(&path),
                _ => Ok(FileConfig::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: FileConfig = toml::from_str(text)?;
        if let Some(size) = config.page_size {
            if size == 0 || size > MAX_PAGE_SIZE {
                bail!("page_size must be between 1 and {MAX_PAGE_SIZE}, got {size}");
            }
        }
        Ok(config)
    }
}

/// Connection and client settings for one invocation. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub url: String,
    pub token: String,
    pub timeout: Duration,
    pub page_size: u32,
    pub status_policy: StatusPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::resolve(&FileConfig::default(), None, None)
    }
}

impl Settings {
    pub fn resolve(file: &FileConfig, url: Option<&str>, token: Option<&str>) -> Self {
        Settings {
            url: url
                .map(str::to_string)
                .or_else(|| file.url.clone())
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
            token: token
                .map(str::to_string)
                .or_else(|| file.token.clone())
                .unwrap_or_default(),
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            page_size: file.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            status_policy: file.status_policy.unwrap_or_default(),
        }
    }
}

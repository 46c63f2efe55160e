//! Bot configuration loaded from `config.toml`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Directory name under the user config dir.
const CONFIG_DIR: &str = "mergebot";

/// Filename for the bot configuration.
const CONFIG_FILE: &str = "config.toml";

/// Bot configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Name of the bot; its status checks live under `<bot_name>/`
    pub bot_name: String,
    /// Approvals required when no scope key matches
    pub default_required_approvals: u32,
    /// Scope key (`repo@branch`, `repo`, `@branch`, `default`) to required approvals
    pub required_approvals: HashMap<String, u32>,
    /// Mergeability polling settings
    pub refresh: RefreshConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bot_name: "mergebot".to_string(),
            default_required_approvals: 1,
            required_approvals: HashMap::new(),
            refresh: RefreshConfig::default(),
        }
    }
}

/// Mergeability polling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Maximum number of re-fetches before giving up
    pub max_attempts: u32,
    /// Pause between re-fetches, in milliseconds
    pub interval_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval_ms: 420,
        }
    }
}

impl RefreshConfig {
    /// Pause between re-fetches
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// The bot's own status namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    name: String,
}

impl BotIdentity {
    /// Create an identity for the given bot name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Bot name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a status context belongs to this bot
    pub fn owns_context(&self, context: &str) -> bool {
        context
            .strip_prefix(self.name.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Context used for the approval status check
    pub fn reviewers_context(&self) -> String {
        format!("{}/reviewers", self.name)
    }
}

impl BotConfig {
    /// Identity derived from `bot_name`
    pub fn identity(&self) -> BotIdentity {
        BotIdentity::new(self.bot_name.clone())
    }
}

/// Default location of the config file, if a config dir exists on this system.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Parse a configuration from TOML text.
pub fn parse_config(content: &str) -> Result<BotConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("invalid config: {e}")))
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the default location is tried
/// and a missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<BotConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                debug!("no config file found, using defaults");
                return Ok(BotConfig::default());
            }
        },
    };

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

//! Configuration for gate.
//!
//! Config file resolution order:
//! 1. Explicit path passed to Config::load_from()
//! 2. GATE_CONFIG environment variable
//! 3. config.toml in the platform config directory
//! 4. Built-in defaults when no file exists

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::check::DEFAULT_FLAVOR;
use crate::reasons::{ReasonRegistry, DEFAULT_ISSUE_URL_BASE};
use crate::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "GATE_CONFIG";

/// gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Flavor name shown in skip messages.
    #[serde(default = "default_flavor")]
    pub flavor: String,

    /// Base URL the issue number is appended to.
    #[serde(default = "default_issue_url_base")]
    pub issue_url_base: String,

    /// Extra reason keywords mapped to issue numbers.
    #[serde(default)]
    pub reasons: BTreeMap<String, u32>,
}

fn default_flavor() -> String {
    DEFAULT_FLAVOR.to_string()
}

fn default_issue_url_base() -> String {
    DEFAULT_ISSUE_URL_BASE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flavor: default_flavor(),
            issue_url_base: default_issue_url_base(),
            reasons: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load config using the standard resolution order.
    pub fn load() -> Result<Self> {
        match resolve_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) if std::env::var_os(CONFIG_ENV_VAR).is_some() => {
                Err(Error::ConfigNotFound(path))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Load config from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse config from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save config as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reason registry with this config's URL base and extra reasons.
    pub fn reason_registry(&self) -> ReasonRegistry {
        ReasonRegistry::builtin()
            .with_issue_url_base(self.issue_url_base.clone())
            .with_reasons(self.reasons.clone())
    }
}

/// Resolve the config file path using the standard resolution order.
fn resolve_config_path() -> Option<PathBuf> {
    // 1. Environment variable
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    // 2. XDG config directory (via directories crate)
    ProjectDirs::from("", "", "gate").map(|dirs| dirs.config_dir().join("config.toml"))
}

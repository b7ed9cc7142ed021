//! Configuration management for debforge
//!
//! Settings live in a TOML file, by default `~/.debforge/config.toml`
//! (`%LOCALAPPDATA%\debforge\config.toml` on Windows). The location can be
//! overridden with `--config` or the `DEBFORGE_CONFIG` environment variable. A
//! missing file yields the defaults.
//!
//! ```toml
//! index = "https://example.org/groovy/index.yaml"
//! platform = "quantal"
//! workspace = "~/debforge/workspace"
//! cache_path = "~/.debforge/metadata_cache.json"
//! fetch_delay_ms = 1000
//! use_sudo = true
//!
//! [[raw_hosts]]
//! prefix = "https://github.com/"
//! template = "https://raw.githubusercontent.com/{owner}/{repo}/{rev}/{path}"
//! ```
//!
//! # Precedence
//!
//! 1. Command-line flags
//! 2. Environment variables (`DEBFORGE_INDEX`, `DEBFORGE_CACHE_PATH`)
//! 3. The configuration file
//! 4. Built-in defaults

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    DEFAULT_DESCRIPTOR_PATH, DEFAULT_DESCRIPTOR_REF, DEFAULT_FETCH_DELAY_MS, DEFAULT_PLATFORM,
    DEFAULT_WORKSPACE,
};
use crate::core::DebforgeError;
use crate::utils::resolve_path;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "DEBFORGE_CONFIG";
/// Environment variable overriding the distribution index location.
pub const INDEX_ENV: &str = "DEBFORGE_INDEX";
/// Environment variable overriding the metadata cache file.
pub const CACHE_PATH_ENV: &str = "DEBFORGE_CACHE_PATH";

/// A hosting service whose repositories serve raw files over plain HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHost {
    /// Repository URLs starting with this prefix are rewritten.
    pub prefix: String,
    /// Raw URL template with `{owner}`, `{repo}`, `{rev}` and `{path}` placeholders.
    pub template: String,
}

impl RawHost {
    pub fn github() -> Self {
        Self {
            prefix: "https://github.com/".to_string(),
            template: "https://raw.githubusercontent.com/{owner}/{repo}/{rev}/{path}".to_string(),
        }
    }
}

/// Settings for a resolve or build run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Distribution index, a local path or an http(s) URL.
    pub index: Option<String>,

    /// Target platform codename appended to installed versions.
    pub platform: String,

    /// Metadata cache file.
    pub cache_path: Option<String>,

    /// Directory holding one checkout per release repository.
    pub workspace: String,

    /// Descriptor location inside a release repository.
    pub descriptor_path: String,

    /// Ref the descriptor is read at; `{version}` and `{package}` are substituted.
    pub descriptor_ref: String,

    /// Pause before repeated fetches against the same repository URL.
    pub fetch_delay_ms: u64,

    /// Prefix installer commands with `sudo`.
    pub use_sudo: bool,

    pub raw_hosts: Vec<RawHost>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            index: None,
            platform: DEFAULT_PLATFORM.to_string(),
            cache_path: None,
            workspace: DEFAULT_WORKSPACE.to_string(),
            descriptor_path: DEFAULT_DESCRIPTOR_PATH.to_string(),
            descriptor_ref: DEFAULT_DESCRIPTOR_REF.to_string(),
            fetch_delay_ms: DEFAULT_FETCH_DELAY_MS,
            use_sudo: true,
            raw_hosts: vec![RawHost::github()],
        }
    }
}

impl BuildConfig {
    /// Load from `path`, the `DEBFORGE_CONFIG` location, or the default location,
    /// then apply environment overrides.
    pub async fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path),
            None => match std::env::var(CONFIG_ENV) {
                Ok(value) => Some(resolve_path(&value)?),
                Err(_) => Self::default_path().ok(),
            },
        };

        let mut config = match path {
            Some(path) if path.exists() => Self::load_from(&path).await?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            DebforgeError::ConfigError {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(index) = lookup(INDEX_ENV) {
            self.index = Some(index);
        }
        if let Some(cache_path) = lookup(CACHE_PATH_ENV) {
            self.cache_path = Some(cache_path);
        }
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    fn config_dir() -> Result<PathBuf> {
        let dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("debforge")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".debforge")
        };
        Ok(dir)
    }

    /// Resolved metadata cache file.
    pub fn cache_file(&self) -> Result<PathBuf> {
        match &self.cache_path {
            Some(path) => resolve_path(path),
            None => Ok(Self::config_dir()?.join("metadata_cache.json")),
        }
    }

    /// Resolved workspace directory.
    pub fn workspace_dir(&self) -> Result<PathBuf> {
        resolve_path(&self.workspace)
    }
}

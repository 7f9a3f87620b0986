//! Application configuration management.
//!
//! This module resolves where the trash holding directory lives and handles
//! the small persistent config file. Resolution order for the trash
//! directory:
//!
//! 1. `--trash-dir` CLI flag (also settable via `RUSTBIN_TRASH_DIR`)
//! 2. `trash_dir` in the config file
//! 3. Platform data directory (via `directories::ProjectDirs`)

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the ledger file kept inside the trash holding directory.
pub const LEDGER_FILE_NAME: &str = "ledger.json";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Overrides the platform-default trash holding directory.
    #[serde(default)]
    pub trash_dir: Option<PathBuf>,
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    ///
    /// Any failure (missing file, unreadable, malformed) falls back to the
    /// defaults; a trash tool must keep working even with a broken config.
    pub fn load() -> Self {
        match Self::load_internal() {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Failed to load config, using defaults: {e}");
                Self::default()
            }
        }
    }

    fn load_internal() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration to the default platform-specific path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    fn config_path() -> Result<PathBuf> {
        let project_dirs = project_dirs()?;
        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Resolve the trash holding directory, giving a CLI override priority
    /// over the config file, and the config file priority over the platform
    /// default.
    pub fn resolve_trash_dir(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = cli_override {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.trash_dir {
            return Ok(dir.clone());
        }
        let project_dirs = project_dirs()?;
        Ok(project_dirs.data_local_dir().join("trash"))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "rustbin", "rustbin")
        .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))
}

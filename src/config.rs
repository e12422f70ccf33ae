//! Configuration management for gt-hook.
//!
//! This module handles the `.gt/hook-config.yaml` file at the workspace
//! root. Every field is optional; a missing file means defaults.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file path relative to the workspace root.
pub const CONFIG_FILE_PATH: &str = ".gt/hook-config.yaml";

/// Project configuration for the hook command.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Program used for bead queries and mutations; empty means `bd`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bd_program: String,

    /// Identity used when the environment names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,

    /// Append every hook decision to `.gt/hook-events.jsonl`.
    #[serde(default)]
    pub debug_logging: bool,
}

impl ProjectConfig {
    /// Default program when `bd_program` is unset.
    pub const DEFAULT_BD_PROGRAM: &'static str = "bd";

    /// The program to invoke for bead operations.
    #[must_use]
    pub fn bd_program(&self) -> &str {
        if self.bd_program.trim().is_empty() {
            Self::DEFAULT_BD_PROGRAM
        } else {
            &self.bd_program
        }
    }

    /// Load config from a workspace root, returning defaults if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(base_dir: &Path) -> Result<Self> {
        let config_path = Self::config_path(base_dir);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Save config under a workspace root.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, base_dir: &Path) -> Result<()> {
        let config_path = Self::config_path(base_dir);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Get the config file path for a workspace root.
    pub fn config_path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_PATH)
    }
}

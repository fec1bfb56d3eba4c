//! Settings remembered between runs.
//!
//! Only the vault root and the output directory are persisted. They live in
//! `config.json` inside the platform configuration directory unless another
//! location is given explicitly.

use crate::config::normalize_path;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SETTINGS_FILENAME: &str = "config.json";

/// Persisted settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Vault root as entered by the user
    #[serde(default = "current_dir_string")]
    pub vault_path: String,

    /// Output directory as entered by the user
    #[serde(default = "current_dir_string")]
    pub output_directory: String,
}

fn current_dir_string() -> String {
    ".".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: current_dir_string(),
            output_directory: current_dir_string(),
        }
    }
}

impl Settings {
    /// Location of the settings file in the platform configuration directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "bottleneck")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILENAME))
            .ok_or_else(|| Error::settings(SETTINGS_FILENAME, "cannot determine config directory"))
    }

    /// Loads settings from `path`, creating the file with defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, created or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            debug!("Creating settings file {}", path.display());
            let settings = Self::default();
            settings.save(path)?;
            return Ok(settings);
        }

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| Error::settings(path, e))
    }

    /// Saves settings to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| Error::settings(path, e))?;
        fs::write(path, content).map_err(|e| Error::io(path, e))
    }

    /// Normalized vault root.
    #[must_use]
    pub fn vault(&self) -> PathBuf {
        normalize_path(Path::new(&self.vault_path))
    }

    /// Normalized output directory.
    #[must_use]
    pub fn output(&self) -> PathBuf {
        normalize_path(Path::new(&self.output_directory))
    }

    /// Stores `path` as the vault root.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not valid UTF-8.
    pub fn set_vault(&mut self, path: &Path) -> Result<()> {
        self.vault_path = path_string(path)?;
        Ok(())
    }

    /// Stores `path` as the output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not valid UTF-8.
    pub fn set_output(&mut self, path: &Path) -> Result<()> {
        self.output_directory = path_string(path)?;
        Ok(())
    }

    /// Replaces the stored paths by their normalized form.
    ///
    /// # Errors
    ///
    /// Returns an error if a normalized path is not valid UTF-8, which can
    /// happen when a relative path is resolved against the working directory.
    pub fn update(&mut self) -> Result<()> {
        self.vault_path = path_string(&self.vault())?;
        self.output_directory = path_string(&self.output())?;
        Ok(())
    }
}

// Settings are stored as JSON strings, so lossy conversion would persist a
// different path than the one given.
fn path_string(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| Error::settings(path, "path is not valid UTF-8"))
}

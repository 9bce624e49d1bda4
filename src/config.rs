//! Configuration persistence for the flashcards app.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::intervals::{IntervalTable, DEFAULT_INTERVALS};
use crate::models::InteractionMode;

/// Application configuration that persists between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Whose progress to review.
    #[serde(default = "default_user")]
    pub user: String,

    /// How answers are revealed.
    #[serde(default)]
    pub mode: InteractionMode,

    /// Review interval ladder in days.
    #[serde(default = "default_intervals")]
    pub intervals: Vec<u32>,

    /// Where the collection is stored. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_user() -> String {
    "local".to_string()
}

fn default_intervals() -> Vec<u32> {
    DEFAULT_INTERVALS.to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: default_user(),
            mode: InteractionMode::default(),
            intervals: default_intervals(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordcards")
            .join("config.toml")
    }

    /// Load config from `path`, writing the defaults there on first run so
    /// the user has a file to edit.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::default();
        config.save_to(path)?;
        log::info!("Wrote default config to {:?}", path);
        Ok(config)
    }

    /// Load config from disk, returning default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// The configured interval ladder, validated.
    pub fn interval_table(&self) -> crate::Result<IntervalTable> {
        IntervalTable::new(self.intervals.clone())
    }
}

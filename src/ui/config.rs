//! # Configuration Persistence
//!
//! Manages user defaults stored in `~/.config/tdialog/config.json`.
//!
//! ## Overview
//!
//! The [`Config`] struct is serialized to / deserialized from a JSON file in
//! the user's XDG config directory. It holds the defaults that a script
//! rarely wants to repeat on every invocation: theme, shadow, line glyphs,
//! tab length and the Escape policy. Command line flags override them.
//!
//! ## File Location
//!
//! ```text
//! ~/.config/tdialog/config.json
//! ```
//!
//! The `directories` crate is used to resolve the platform-appropriate config
//! directory.

use crate::dialog::{EscapeMode, Options};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The name of the selected theme (must match a built-in theme name).
    #[serde(default = "default_theme_name")]
    pub theme: String,

    #[serde(default = "default_true")]
    pub shadow: bool,

    #[serde(default)]
    pub ascii_lines: bool,

    #[serde(default = "default_tab_len")]
    pub tab_len: usize,

    #[serde(default)]
    pub escape: EscapeMode,
}

fn default_theme_name() -> String {
    "Classic".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tab_len() -> usize {
    8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme_name(),
            shadow: true,
            ascii_lines: false,
            tab_len: default_tab_len(),
            escape: EscapeMode::Distinct,
        }
    }
}

impl Config {
    /// Load configuration from disk. Returns `Config::default()` if the file
    /// does not exist or cannot be parsed.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring config: {e:#}");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save the current configuration to disk.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the current configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Copy the persisted defaults into per-call options.
    pub fn apply(&self, opts: &mut Options) {
        opts.shadow = self.shadow;
        opts.ascii_lines = self.ascii_lines;
        opts.text.tab_len = self.tab_len.max(1);
        opts.escape = self.escape;
    }

    /// Return the path to the config file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "tdialog")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }
}

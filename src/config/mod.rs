// SPDX-License-Identifier: MPL-2.0
//! This module handles the preview configuration: the host-set presentation
//! flags and the tuning constants in [`defaults`].
//!
//! The flags can be kept in a `preview.toml` file so a host (or the demo
//! binary) can persist them between runs.
//!
//! # Examples
//!
//! ```no_run
//! use iced_preview::config::{self, PreviewConfig};
//! use std::path::PathBuf;
//!
//! // Load existing configuration
//! let mut config = config::load().unwrap_or_default();
//!
//! // Modify a setting
//! config.show_index_label = true;
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//!
//! // To load/save from a specific path (e.g., for testing)
//! let temp_dir = PathBuf::from("./temp_config_dir");
//! std::fs::create_dir_all(&temp_dir).unwrap();
//! let temp_file = temp_dir.join("preview.toml");
//! config::save_to_path(&config, &temp_file).expect("Failed to save to path");
//! let loaded_config = config::load_from_path(&temp_file).expect("Failed to load from path");
//! assert!(loaded_config.show_index_label);
//! std::fs::remove_dir_all(&temp_dir).unwrap();
//! ```

pub mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "preview.toml";
const APP_NAME: &str = "IcedPreview";

/// Flags the host sets before calling `show`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Show the "current/total" counter overlay.
    #[serde(default)]
    pub show_index_label: bool,
    /// Show the save affordance.
    #[serde(default)]
    pub support_save_image: bool,
    /// Page shown first. Ignored when outside `0..page_count`.
    #[serde(default)]
    pub default_display_index: usize,
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<PreviewConfig> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(PreviewConfig::default())
}

pub fn save(config: &PreviewConfig) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<PreviewConfig> {
    let content = fs::read_to_string(path)?;
    match toml::from_str(&content) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), "ignoring invalid preview config: {err}");
            Ok(PreviewConfig::default())
        }
    }
}

pub fn save_to_path(config: &PreviewConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

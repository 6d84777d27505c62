//! Application configuration.
//!
//! The configuration is loaded from a JSON file, by default
//! `$XDG_CONFIG_HOME/monsplit/config.json` (override with
//! `--config <path>`).  It is read again whenever Hyprland reports a config
//! reload, so edits take effect without restarting the daemon.
//!
//! # Example
//!
//! ```json
//! {
//!   "count": 5,
//!   "keep_focused": true,
//!   "enable_notifications": false,
//!   "enable_persistent_workspaces": true,
//!   "enable_wrapping": false,
//!   "default_monitor": "DP-1",
//!   "rules_file": "/home/me/.config/hypr/monsplit-rules.conf"
//! }
//! ```

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// Every field is optional: a minimal `{}` file is valid and all fields
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspaces per monitor.  Negative values count as 0.
    pub count: i64,
    /// Leave focus alone when monitors are remapped (except on startup).
    pub keep_focused: bool,
    /// Show a Hyprland notification for remaps, reloads and warnings.
    pub enable_notifications: bool,
    /// Create every workspace up front and keep it alive while empty.
    pub enable_persistent_workspaces: bool,
    /// Wrap around at the ends of a block instead of stopping.
    pub enable_wrapping: bool,
    /// Monitor that receives focus after a remap.  Empty means Hyprland's
    /// `cursor:default_monitor`, then the monitor with the lowest id.
    pub default_monitor: String,
    /// Where to write Hyprland `workspace = …` rules after each remap.
    pub rules_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count: 10,
            keep_focused: false,
            enable_notifications: false,
            enable_persistent_workspaces: true,
            enable_wrapping: true,
            default_monitor: String::new(),
            rules_file: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Block length to map with.
    pub fn workspace_count(&self) -> u32 {
        match u32::try_from(self.count) {
            Ok(n) => n,
            Err(_) if self.count < 0 => {
                warn!("count {} is negative, using 0", self.count);
                0
            }
            Err(_) => {
                warn!("count {} is too large, using {}", self.count, u32::MAX);
                u32::MAX
            }
        }
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

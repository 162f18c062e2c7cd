//! Sync engine configuration: feature flags and sync root location.

use std::path::PathBuf;

use fieldsync_core::enums::SyncPathMode;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_themes_dir() -> String {
    "themes".to_string()
}

fn default_active_theme() -> String {
    "default".to_string()
}

fn default_dir_name() -> String {
    "fieldsync".to_string()
}

fn default_snapshot_file() -> String {
    "fieldsync-export.json".to_string()
}

fn default_module_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Default write-lock wait, in milliseconds.
const fn default_lock_timeout_ms() -> u64 {
    5_000
}

/// Clock-skew window for the whole-store timestamp comparison.
const fn default_timestamp_tolerance_secs() -> i64 {
    2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Master switch. When off, status reports `disabled` and nothing is exported.
    #[serde(default)]
    pub enabled: bool,

    /// Compare the aggregate file with the store at the start of each run.
    #[serde(default)]
    pub auto_sync_enabled: bool,

    /// Export the whole store once at the end of a run that mutated it.
    #[serde(default)]
    pub auto_sync_on_save: bool,

    #[serde(default)]
    pub path_mode: SyncPathMode,

    /// Used when `path_mode = "custom"`.
    #[serde(default)]
    pub custom_path: String,

    #[serde(default = "default_themes_dir")]
    pub themes_dir: String,

    #[serde(default = "default_active_theme")]
    pub active_theme: String,

    /// Used when `path_mode = "parent_theme"`. Empty falls back to the active theme.
    #[serde(default)]
    pub parent_theme: String,

    /// Directory created inside the theme for sync files.
    #[serde(default = "default_dir_name")]
    pub dir_name: String,

    /// Aggregate whole-store file name inside the sync root.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default = "default_timestamp_tolerance_secs")]
    pub timestamp_tolerance_secs: i64,

    /// Written into every exported document.
    #[serde(default = "default_module_version")]
    pub module_version: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            auto_sync_enabled: false,
            auto_sync_on_save: false,
            path_mode: SyncPathMode::default(),
            custom_path: String::new(),
            themes_dir: default_themes_dir(),
            active_theme: default_active_theme(),
            parent_theme: String::new(),
            dir_name: default_dir_name(),
            snapshot_file: default_snapshot_file(),
            lock_timeout_ms: default_lock_timeout_ms(),
            timestamp_tolerance_secs: default_timestamp_tolerance_secs(),
            module_version: default_module_version(),
        }
    }
}

impl SyncConfig {
    /// Whether the end-of-run export should be scheduled on mutation.
    pub const fn export_on_save(&self) -> bool {
        self.enabled && self.auto_sync_on_save
    }

    /// Whether the start-of-run whole-store comparison should run.
    pub const fn auto_sync(&self) -> bool {
        self.enabled && self.auto_sync_enabled
    }

    /// `parent_theme` mode was requested but no parent theme is configured.
    pub fn uses_parent_fallback(&self) -> bool {
        self.path_mode == SyncPathMode::ParentTheme && self.parent_theme.trim().is_empty()
    }

    /// Resolve the sync root directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if custom mode has no path or the
    /// theme-relative modes have no active theme.
    pub fn resolve_root(&self) -> Result<PathBuf, ConfigError> {
        match self.path_mode {
            SyncPathMode::Custom => {
                let custom = self.custom_path.trim();
                if custom.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "sync.custom_path".into(),
                        reason: "path_mode is 'custom' but custom_path is empty".into(),
                    });
                }
                Ok(PathBuf::from(custom))
            }
            SyncPathMode::ParentTheme if !self.uses_parent_fallback() => {
                Ok(self.theme_root(self.parent_theme.trim()))
            }
            SyncPathMode::ActiveTheme | SyncPathMode::ParentTheme => {
                let theme = self.active_theme.trim();
                if theme.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "sync.active_theme".into(),
                        reason: "no active theme configured".into(),
                    });
                }
                Ok(self.theme_root(theme))
            }
        }
    }

    fn theme_root(&self, theme: &str) -> PathBuf {
        PathBuf::from(&self.themes_dir)
            .join(theme)
            .join(&self.dir_name)
    }
}

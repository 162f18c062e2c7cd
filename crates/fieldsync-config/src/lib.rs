//! # fieldsync-config
//!
//! Layered configuration loading for fieldsync using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FIELDSYNC_*` prefix, `__` as separator)
//! 2. Project-level `.fieldsync/config.toml`
//! 3. User-level `~/.config/fieldsync/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FIELDSYNC_SYNC__ENABLED` -> `sync.enabled`,
//! `FIELDSYNC_SYNC__PATH_MODE` -> `sync.path_mode`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use fieldsync_config::FieldSyncConfig;
//!
//! let config = FieldSyncConfig::load_with_dotenv().expect("config");
//!
//! if config.sync.enabled {
//!     println!("sync root: {}", config.sync.resolve_root().unwrap().display());
//! }
//! ```

mod error;
mod general;
mod sync;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use sync::SyncConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FieldSyncConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl FieldSyncConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Load configuration for the project rooted at `project_root`, whose
    /// `.fieldsync/config.toml` replaces the one in the working directory.
    pub fn load_in(project_root: &Path) -> Result<Self, ConfigError> {
        Self::figment_in(project_root)
            .extract()
            .map_err(ConfigError::from)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        Self::figment_in(Path::new(""))
    }

    /// Provider chain with the project-level file looked up under `project_root`.
    pub fn figment_in(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = project_root.join(".fieldsync/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("FIELDSYNC_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fieldsync").join("config.toml"))
    }
}

//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_db_path() -> String {
    ".fieldsync/fieldsync.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Path to the libSQL store, relative to the project root unless absolute.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use fieldsync_config::FieldSyncConfig;

use crate::cli::GlobalFlags;
use crate::context::{PROJECT_DIR, find_project_root};

/// Load `.env` from the project root, then the layered configuration.
pub fn load_config(project_root: &Path) -> anyhow::Result<FieldSyncConfig> {
    load_project_dotenv(project_root)?;
    FieldSyncConfig::load_in(project_root).context("failed to load fieldsync configuration")
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}

/// The directory holding `.fieldsync`: `--project` when given, otherwise the
/// nearest ancestor of the working directory that has one, otherwise the
/// working directory itself.
pub fn resolve_project_root(flags: &GlobalFlags) -> anyhow::Result<PathBuf> {
    if let Some(path) = &flags.project {
        let explicit = PathBuf::from(path);

        if explicit
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name == PROJECT_DIR)
        {
            return explicit
                .parent()
                .map(Path::to_path_buf)
                .context("invalid --project path: '.fieldsync' directory has no parent");
        }

        if explicit.is_dir() {
            return Ok(explicit);
        }

        anyhow::bail!(
            "invalid --project '{}': directory does not exist",
            explicit.display()
        );
    }

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(find_project_root(&cwd).unwrap_or(cwd))
}

//! Filesystem gateway for the sync root.
//!
//! Layout:
//!
//! ```text
//! <root>/
//!   .htaccess, index.php          written once, when the directory is created
//!   <snapshot_file>               whole-store aggregate (manual and auto-sync)
//!   groups/
//!     .htaccess, index.php
//!     <slug>.json                 one group per file (checksum flow)
//! ```
//!
//! Writes hold the file's lock and go through a temp file plus rename, so a
//! reader sees the old document or the new one, never a mix. Reads do not
//! lock.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fieldsync_config::SyncConfig;
use fieldsync_core::document::{StoreSnapshot, SyncRecord};
use fieldsync_core::ids::is_valid_slug;

use crate::canonical::render;
use crate::error::SyncError;
use crate::lock;

const GROUPS_DIR: &str = "groups";

const HTACCESS: &str = "\
# fieldsync: deny web access and script execution
<IfModule mod_authz_core.c>
    Require all denied
</IfModule>
<IfModule !mod_authz_core.c>
    Order deny,allow
    Deny from all
</IfModule>
<IfModule mod_php.c>
    php_flag engine off
</IfModule>
";

const INDEX_PHP: &str = "<?php\nheader('HTTP/1.1 403 Forbidden');\nexit;\n";

#[derive(Debug, Clone)]
pub struct SyncGateway {
    root: PathBuf,
    snapshot_file: String,
    lock_timeout: Duration,
}

impl SyncGateway {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, snapshot_file: impl Into<String>, lock_timeout: Duration) -> Self {
        Self {
            root: root.into(),
            snapshot_file: snapshot_file.into(),
            lock_timeout,
        }
    }

    /// Gateway rooted where the configuration points.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the root cannot be resolved.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        Self::from_config_in(config, Path::new(""))
    }

    /// Like [`Self::from_config`], with a relative root resolved against `base`.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Config` if the root cannot be resolved.
    pub fn from_config_in(config: &SyncConfig, base: &Path) -> Result<Self, SyncError> {
        if config.uses_parent_fallback() {
            tracing::warn!("sync.path_mode is parent_theme but no parent theme is set; using the active theme");
        }
        Ok(Self::new(
            base.join(config.resolve_root()?),
            config.snapshot_file.clone(),
            Duration::from_millis(config.lock_timeout_ms),
        ))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn groups_dir(&self) -> PathBuf {
        self.root.join(GROUPS_DIR)
    }

    #[must_use]
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(&self.snapshot_file)
    }

    /// File for one group.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidSlug` for slugs that are not safe file names.
    pub fn group_path(&self, slug: &str) -> Result<PathBuf, SyncError> {
        if !is_valid_slug(slug) {
            return Err(SyncError::InvalidSlug(slug.to_string()));
        }
        Ok(self.groups_dir().join(format!("{slug}.json")))
    }

    /// Create `dir` if missing, protecting it on creation.
    fn ensure_protected_dir(dir: &Path) -> Result<(), SyncError> {
        if dir.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(dir).map_err(|e| SyncError::fs(dir, e))?;
        for (name, body) in [(".htaccess", HTACCESS), ("index.php", INDEX_PHP)] {
            let path = dir.join(name);
            std::fs::write(&path, body).map_err(|e| SyncError::fs(&path, e))?;
        }
        tracing::info!(dir = %dir.display(), "created sync directory");
        Ok(())
    }

    /// Write `contents` to `path` under its lock, atomically.
    fn write_locked(&self, path: &Path, contents: &str) -> Result<(), SyncError> {
        let _guard = lock::acquire(path, self.lock_timeout)?;
        let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        std::fs::write(&tmp, contents).map_err(|e| SyncError::fs(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(SyncError::fs(path, e));
        }
        Ok(())
    }

    fn read_optional(path: &Path) -> Result<Option<String>, SyncError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::fs(path, e)),
        }
    }

    // -----------------------------------------------------------------------
    // Per-group files
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `SyncError` if the directory or file cannot be written.
    pub fn write_record(&self, record: &SyncRecord) -> Result<PathBuf, SyncError> {
        let path = self.group_path(&record.group.slug)?;
        Self::ensure_protected_dir(&self.root)?;
        Self::ensure_protected_dir(&self.groups_dir())?;
        self.write_locked(&path, &render(record)?)?;
        tracing::debug!(slug = %record.group.slug, path = %path.display(), "wrote group file");
        Ok(path)
    }

    /// Raw text of a group file, `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for invalid slugs or read failures.
    pub fn read_record_text(&self, slug: &str) -> Result<Option<String>, SyncError> {
        Self::read_optional(&self.group_path(slug)?)
    }

    /// A group file parsed as a record, `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` for invalid slugs, read failures, or unparsable files.
    pub fn read_record(&self, slug: &str) -> Result<Option<SyncRecord>, SyncError> {
        match self.read_record_text(slug)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Slugs that have a group file, sorted. Files whose stem is not a valid
    /// slug are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Filesystem` if the directory cannot be listed.
    pub fn list_slugs(&self) -> Result<Vec<String>, SyncError> {
        let dir = self.groups_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SyncError::fs(&dir, e)),
        };

        let mut slugs = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| SyncError::fs(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_slug(stem) {
                    slugs.push(stem.to_string());
                }
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    // -----------------------------------------------------------------------
    // Aggregate file
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns `SyncError` if the directory or file cannot be written.
    pub fn write_snapshot(&self, snapshot: &StoreSnapshot) -> Result<PathBuf, SyncError> {
        let path = self.snapshot_path();
        Self::ensure_protected_dir(&self.root)?;
        self.write_locked(&path, &render(snapshot)?)?;
        tracing::debug!(path = %path.display(), groups = snapshot.groups.len(), "wrote snapshot");
        Ok(path)
    }

    /// # Errors
    ///
    /// Returns `SyncError::Filesystem` on read failures.
    pub fn read_snapshot_text(&self) -> Result<Option<String>, SyncError> {
        Self::read_optional(&self.snapshot_path())
    }

    /// # Errors
    ///
    /// Returns `SyncError` on read failures or an unparsable file.
    pub fn read_snapshot(&self) -> Result<Option<StoreSnapshot>, SyncError> {
        match self.read_snapshot_text()? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Number of groups the aggregate file describes. A missing or
    /// unparsable file counts as zero.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Filesystem` on read failures.
    pub fn snapshot_group_count(&self) -> Result<usize, SyncError> {
        let Some(text) = self.read_snapshot_text()? else {
            return Ok(0);
        };
        Ok(serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("groups").and_then(|g| g.as_array()).map(Vec::len))
            .unwrap_or(0))
    }

    /// Last modification time of the aggregate file.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Filesystem` if metadata cannot be read.
    pub fn snapshot_modified_at(&self) -> Result<Option<DateTime<Utc>>, SyncError> {
        let path = self.snapshot_path();
        match std::fs::metadata(&path) {
            Ok(meta) => {
                let modified = meta.modified().map_err(|e| SyncError::fs(&path, e))?;
                Ok(Some(DateTime::<Utc>::from(modified)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::fs(&path, e)),
        }
    }
}

/// Read any document from an explicit path (manual import).
///
/// # Errors
///
/// Returns `SyncError::Filesystem` if the file cannot be read.
pub fn read_document(path: &Path) -> Result<String, SyncError> {
    std::fs::read_to_string(path).map_err(|e| SyncError::fs(path, e))
}

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::SyncError;

const LOCK_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Exclusive lock on a sync file, held as `<file>.lock` containing our pid.
/// Released when dropped.
#[derive(Debug)]
pub struct WriteLockGuard {
    path: PathBuf,
}

impl Drop for WriteLockGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Lock file path guarding `target`.
#[must_use]
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    target.with_file_name(name)
}

/// Take the lock for `target`, waiting up to `timeout` for another writer.
///
/// A lock left behind by a process that no longer exists is removed and
/// taken over.
///
/// # Errors
///
/// Returns `SyncError::Lock` if the lock is still held when `timeout`
/// expires, or if a stale lock cannot be removed.
pub fn acquire(target: &Path, timeout: Duration) -> Result<WriteLockGuard, SyncError> {
    let lock_path = lock_path_for(target);
    let started = Instant::now();

    loop {
        let holder = match create_lock_file(&lock_path)? {
            Some(guard) => return Ok(guard),
            None => read_holder(&lock_path),
        };

        let reason = match holder {
            Holder::Gone => continue,
            Holder::Dead(pid) => {
                tracing::warn!(path = %lock_path.display(), pid, "removing stale sync lock");
                match std::fs::remove_file(&lock_path) {
                    Ok(()) => continue,
                    Err(e) if e.kind() == ErrorKind::NotFound => continue,
                    Err(e) => {
                        return Err(SyncError::Lock {
                            path: lock_path,
                            reason: format!("stale lock from pid {pid} could not be removed: {e}"),
                        });
                    }
                }
            }
            Holder::Alive(pid) => format!("another writer is running (pid {pid})"),
            Holder::Unreadable(detail) => format!(
                "lock file unreadable ({detail}); remove it if no fldsync process is running"
            ),
        };

        if started.elapsed() >= timeout {
            return Err(SyncError::Lock {
                path: lock_path,
                reason,
            });
        }
        std::thread::sleep(LOCK_RETRY_DELAY);
    }
}

/// Who holds an existing lock file.
#[derive(Debug, PartialEq, Eq)]
enum Holder {
    Alive(u32),
    Dead(u32),
    /// Released between our create attempt and the read.
    Gone,
    Unreadable(String),
}

/// `Some(guard)` when the lock file was created, `None` when one exists.
fn create_lock_file(lock_path: &Path) -> Result<Option<WriteLockGuard>, SyncError> {
    match OpenOptions::new().create_new(true).write(true).open(lock_path) {
        Ok(mut file) => {
            let guard = WriteLockGuard {
                path: lock_path.to_path_buf(),
            };
            writeln!(file, "{}", std::process::id()).map_err(|source| SyncError::Filesystem {
                path: lock_path.to_path_buf(),
                source,
            })?;
            Ok(Some(guard))
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(source) => Err(SyncError::Filesystem {
            path: lock_path.to_path_buf(),
            source,
        }),
    }
}

fn read_holder(lock_path: &Path) -> Holder {
    let contents = match std::fs::read_to_string(lock_path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Holder::Gone,
        Err(e) => return Holder::Unreadable(e.to_string()),
    };
    match contents.trim().parse::<u32>() {
        Ok(pid) if process_alive(pid) => Holder::Alive(pid),
        Ok(pid) => Holder::Dead(pid),
        Err(_) => Holder::Unreadable(format!("no pid in {:?}", contents.trim())),
    }
}

fn process_alive(pid: u32) -> bool {
    let proc_root = Path::new("/proc");
    if proc_root.is_dir() {
        return proc_root.join(pid.to_string()).exists();
    }
    std::process::Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .status()
        .is_ok_and(|status| status.success())
}

//! Coalesces store mutations into one export per unit of work.
//!
//! The owner (one CLI invocation) calls [`DirtyDebouncer::mark_dirty`] after
//! every mutation and [`DirtyDebouncer::flush`] once at the end.

use fieldsync_core::responses::ExportSummary;

use crate::error::SyncError;
use crate::export::SnapshotExporter;

#[derive(Debug, Default)]
pub struct DirtyDebouncer {
    enabled: bool,
    dirty: bool,
    registered: bool,
}

impl DirtyDebouncer {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            dirty: false,
            registered: false,
        }
    }

    /// Enabled when sync and export-on-save are both on.
    #[must_use]
    pub const fn from_config(config: &fieldsync_config::SyncConfig) -> Self {
        Self::new(config.export_on_save())
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether an end-of-work export is scheduled.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.registered
    }

    /// Record a mutation. Idempotent; a no-op when disabled.
    pub fn mark_dirty(&mut self) {
        if !self.enabled {
            return;
        }
        self.dirty = true;
        if !self.registered {
            self.registered = true;
            tracing::debug!("store marked dirty; export scheduled for end of run");
        }
    }

    /// Run the scheduled export, if any.
    ///
    /// On failure the dirty flag stays set and the registration is cleared,
    /// so the next `mark_dirty` schedules a fresh attempt.
    ///
    /// # Errors
    ///
    /// Returns whatever the exporter returned.
    pub async fn flush<E: SnapshotExporter>(
        &mut self,
        exporter: &E,
    ) -> Result<Option<ExportSummary>, SyncError> {
        if !self.registered {
            return Ok(None);
        }
        self.registered = false;

        match exporter.export_snapshot().await {
            Ok(summary) => {
                self.dirty = false;
                Ok(Some(summary))
            }
            Err(e) => {
                tracing::warn!(error = %e, "end-of-run export failed; store stays dirty");
                Err(e)
            }
        }
    }

    /// Forget all state between independent runs in a test harness.
    #[cfg(any(test, feature = "test-support"))]
    pub fn reset(&mut self) {
        self.dirty = false;
        self.registered = false;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Default)]
    struct CountingExporter {
        calls: Cell<u32>,
        fail: bool,
    }

    impl SnapshotExporter for CountingExporter {
        async fn export_snapshot(&self) -> Result<ExportSummary, SyncError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(SyncError::EmptySourceGuard {
                    target: "the sync file",
                    existing_groups: 1,
                });
            }
            Ok(ExportSummary {
                path: "fieldsync-export.json".into(),
                exported_at: "2026-01-01T00:00:00Z".into(),
                groups: 1,
                fields: 1,
                values: 0,
            })
        }
    }

    #[tokio::test]
    async fn many_marks_one_export() {
        let exporter = CountingExporter::default();
        let mut debouncer = DirtyDebouncer::new(true);
        for _ in 0..5 {
            debouncer.mark_dirty();
        }
        assert!(debouncer.is_dirty());

        let summary = debouncer.flush(&exporter).await.unwrap();
        assert!(summary.is_some());
        assert_eq!(exporter.calls.get(), 1);
        assert!(!debouncer.is_dirty());

        // Nothing new since the flush.
        assert!(debouncer.flush(&exporter).await.unwrap().is_none());
        assert_eq!(exporter.calls.get(), 1);
    }

    #[tokio::test]
    async fn disabled_never_exports() {
        let exporter = CountingExporter::default();
        let mut debouncer = DirtyDebouncer::new(false);
        debouncer.mark_dirty();
        debouncer.mark_dirty();
        assert!(!debouncer.is_registered());
        assert!(debouncer.flush(&exporter).await.unwrap().is_none());
        assert_eq!(exporter.calls.get(), 0);
    }

    #[tokio::test]
    async fn failed_export_keeps_dirty_flag() {
        let exporter = CountingExporter {
            fail: true,
            ..CountingExporter::default()
        };
        let mut debouncer = DirtyDebouncer::new(true);
        debouncer.mark_dirty();

        let err = debouncer.flush(&exporter).await.unwrap_err();
        assert!(matches!(err, SyncError::EmptySourceGuard { .. }));
        assert!(debouncer.is_dirty());
        assert!(!debouncer.is_registered());

        debouncer.mark_dirty();
        assert!(debouncer.is_registered());
    }

    #[test]
    fn reset_clears_state() {
        let mut debouncer = DirtyDebouncer::new(true);
        debouncer.mark_dirty();
        debouncer.reset();
        assert!(!debouncer.is_dirty());
        assert!(!debouncer.is_registered());
    }
}

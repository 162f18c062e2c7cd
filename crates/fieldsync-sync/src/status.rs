//! Sync status classifiers.
//!
//! Two classifiers, two signals:
//!
//! ```text
//! per group  (groups/<slug>.json)   content checksum   synced | modified | need_push | theme_only | no_file | disabled
//! whole store (aggregate file)      wall-clock + count  file_newer | db_newer | synced | no_file
//! ```
//!
//! `conflict` is never produced here: neither classifier knows a common
//! ancestor.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use fieldsync_core::enums::{AutoSyncState, SyncState};
use fieldsync_core::responses::{GlobalStatus, GroupStatus};
use fieldsync_db::store::SchemaStore;

use crate::canonical::{load_body, parse_document};
use crate::checksum::checksum_body;
use crate::error::SyncError;
use crate::gateway::SyncGateway;

/// Decision rule for one group, given whichever checksums exist.
#[must_use]
pub fn classify(enabled: bool, store: Option<&str>, file: Option<&str>) -> SyncState {
    if !enabled {
        return SyncState::Disabled;
    }
    match (store, file) {
        (None, None) => SyncState::NoFile,
        (Some(_), None) => SyncState::NeedPush,
        (None, Some(_)) => SyncState::ThemeOnly,
        (Some(s), Some(f)) if s == f => SyncState::Synced,
        (Some(_), Some(_)) => SyncState::Modified,
    }
}

/// Whole-store comparison with a clock-skew window.
///
/// A side with zero groups is never newer than a side with groups.
#[must_use]
pub fn classify_timestamps(
    store_at: Option<DateTime<Utc>>,
    store_groups: usize,
    file_at: Option<DateTime<Utc>>,
    file_groups: usize,
    tolerance: Duration,
) -> AutoSyncState {
    let Some(file_at) = file_at else {
        return AutoSyncState::NoFile;
    };
    match (store_groups, file_groups) {
        (0, 0) => return AutoSyncState::Synced,
        (_, 0) => return AutoSyncState::DbNewer,
        (0, _) => return AutoSyncState::FileNewer,
        _ => {}
    }
    let Some(store_at) = store_at else {
        return AutoSyncState::FileNewer;
    };

    if file_at > store_at + tolerance {
        AutoSyncState::FileNewer
    } else if store_at > file_at + tolerance {
        AutoSyncState::DbNewer
    } else {
        AutoSyncState::Synced
    }
}

/// Checksum of what the group file actually contains, plus whether the
/// checksum recorded in it disagrees. An unparsable file has no checksum.
fn file_checksum(gateway: &SyncGateway, slug: &str) -> Result<(Option<String>, bool), SyncError> {
    let Some(text) = gateway.read_record_text(slug)? else {
        return Ok((None, false));
    };
    let document = match parse_document(&text) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(slug, error = %e, "group file is unreadable; treating it as absent");
            return Ok((None, false));
        }
    };
    let Some(body) = document.groups.first() else {
        return Ok((None, false));
    };

    let actual = checksum_body(&body.group, &body.fields)?;
    let stale = body
        .checksum
        .as_deref()
        .is_some_and(|recorded| recorded != actual);
    if stale {
        tracing::warn!(slug, "group file was edited by hand; recorded checksum is stale");
    }
    Ok((Some(actual), stale))
}

/// Classify one group by slug.
///
/// # Errors
///
/// Returns `SyncError` on store reads, invalid slugs, or filesystem failures.
pub async fn group_status<S: SchemaStore>(
    store: &S,
    gateway: &SyncGateway,
    enabled: bool,
    slug: &str,
) -> Result<GroupStatus, SyncError> {
    if !enabled {
        return Ok(GroupStatus::new(slug, SyncState::Disabled));
    }

    let store_checksum = match store.find_group_by_slug(slug).await? {
        Some(group) => load_body(store, &group).await?.checksum,
        None => None,
    };
    let (file_checksum, stale) = file_checksum(gateway, slug)?;

    let mut status = GroupStatus::new(
        slug,
        classify(enabled, store_checksum.as_deref(), file_checksum.as_deref()),
    );
    status.store_checksum = store_checksum;
    status.file_checksum = file_checksum;
    status.recorded_checksum_stale = stale;
    Ok(status)
}

/// Classify every group in the store and every file-only slug.
///
/// # Errors
///
/// Returns `SyncError` on store reads or filesystem failures.
pub async fn global_status<S: SchemaStore>(
    store: &S,
    gateway: &SyncGateway,
    enabled: bool,
) -> Result<GlobalStatus, SyncError> {
    if !enabled {
        return Ok(GlobalStatus::disabled());
    }

    let mut slugs: BTreeSet<String> = store
        .find_all_groups()
        .await?
        .into_iter()
        .map(|g| g.slug)
        .collect();
    slugs.extend(gateway.list_slugs()?);

    let mut groups = Vec::with_capacity(slugs.len());
    for slug in &slugs {
        groups.push(group_status(store, gateway, enabled, slug).await?);
    }
    Ok(GlobalStatus::from_groups(groups))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(false, Some("a"), Some("a"), SyncState::Disabled)]
    #[case(true, None, None, SyncState::NoFile)]
    #[case(true, Some("a"), None, SyncState::NeedPush)]
    #[case(true, None, Some("a"), SyncState::ThemeOnly)]
    #[case(true, Some("a"), Some("a"), SyncState::Synced)]
    #[case(true, Some("a"), Some("b"), SyncState::Modified)]
    fn checksum_decision_table(
        #[case] enabled: bool,
        #[case] store: Option<&str>,
        #[case] file: Option<&str>,
        #[case] expected: SyncState,
    ) {
        assert_eq!(classify(enabled, store, file), expected);
    }

    fn at(secs: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).single()
    }

    #[rstest]
    #[case(at(0), 3, None, 0, AutoSyncState::NoFile)]
    #[case(at(0), 0, at(100), 0, AutoSyncState::Synced)]
    #[case(at(100), 2, at(0), 0, AutoSyncState::DbNewer)]
    #[case(at(0), 2, at(-100), 0, AutoSyncState::DbNewer)]
    #[case(at(100), 0, at(0), 2, AutoSyncState::FileNewer)]
    #[case(at(0), 2, at(10), 2, AutoSyncState::FileNewer)]
    #[case(at(10), 2, at(0), 2, AutoSyncState::DbNewer)]
    #[case(at(0), 2, at(2), 2, AutoSyncState::Synced)]
    #[case(at(2), 2, at(0), 2, AutoSyncState::Synced)]
    #[case(None, 2, at(0), 2, AutoSyncState::FileNewer)]
    fn timestamp_decision_table(
        #[case] store_at: Option<DateTime<Utc>>,
        #[case] store_groups: usize,
        #[case] file_at: Option<DateTime<Utc>>,
        #[case] file_groups: usize,
        #[case] expected: AutoSyncState,
    ) {
        assert_eq!(
            classify_timestamps(
                store_at,
                store_groups,
                file_at,
                file_groups,
                Duration::seconds(2)
            ),
            expected
        );
    }
}

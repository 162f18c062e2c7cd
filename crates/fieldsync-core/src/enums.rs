//! Field type tags, sync state vocabularies, and mode switches for fieldsync.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage and log output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// FieldType
// ---------------------------------------------------------------------------

/// Closed set of field type tags.
///
/// Rendering and validation per type belong to external collaborators; the
/// sync engine only needs the tag to round-trip and to recognise `Repeater`,
/// the one type allowed to own child fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Richtext,
    Number,
    Email,
    Url,
    Select,
    Checkbox,
    Radio,
    Boolean,
    Date,
    Datetime,
    Time,
    Color,
    Image,
    File,
    Gallery,
    Video,
    Relation,
    Repeater,
}

impl FieldType {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 20] = [
        Self::Text,
        Self::Textarea,
        Self::Richtext,
        Self::Number,
        Self::Email,
        Self::Url,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
        Self::Boolean,
        Self::Date,
        Self::Datetime,
        Self::Time,
        Self::Color,
        Self::Image,
        Self::File,
        Self::Gallery,
        Self::Video,
        Self::Relation,
        Self::Repeater,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Richtext => "richtext",
            Self::Number => "number",
            Self::Email => "email",
            Self::Url => "url",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Time => "time",
            Self::Color => "color",
            Self::Image => "image",
            Self::File => "file",
            Self::Gallery => "gallery",
            Self::Video => "video",
            Self::Relation => "relation",
            Self::Repeater => "repeater",
        }
    }

    /// Whether fields of this type may own nested child fields.
    #[must_use]
    pub const fn accepts_children(self) -> bool {
        matches!(self, Self::Repeater)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownFieldType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// SyncState
// ---------------------------------------------------------------------------

/// Per-group classification produced by the checksum comparator.
///
/// `Conflict` is part of the vocabulary but is never produced: the comparator
/// only sees presence and equality, not a common ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Synced,
    Modified,
    NeedPush,
    #[serde(alias = "need_pull")]
    ThemeOnly,
    Conflict,
    NoFile,
    Disabled,
}

impl SyncState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Modified => "modified",
            Self::NeedPush => "need_push",
            Self::ThemeOnly => "theme_only",
            Self::Conflict => "conflict",
            Self::NoFile => "no_file",
            Self::Disabled => "disabled",
        }
    }

    /// The action an operator should take for this state.
    #[must_use]
    pub const fn recommended_action(self) -> SyncAction {
        match self {
            Self::Synced | Self::NoFile => SyncAction::None,
            Self::Modified | Self::Conflict => SyncAction::PushOrPull,
            Self::NeedPush => SyncAction::Push,
            Self::ThemeOnly => SyncAction::Pull,
            Self::Disabled => SyncAction::EnableSync,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SyncAction
// ---------------------------------------------------------------------------

/// Recommended operator action attached to a [`SyncState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Nothing to do.
    None,
    /// Store → file.
    Push,
    /// File → store.
    Pull,
    /// Both sides hold data that differs; the operator picks the authority.
    PushOrPull,
    /// The sync feature flag is off.
    EnableSync,
}

impl SyncAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Push => "push",
            Self::Pull => "pull",
            Self::PushOrPull => "push_or_pull",
            Self::EnableSync => "enable_sync",
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AutoSyncState
// ---------------------------------------------------------------------------

/// Whole-store vs whole-file classification produced by the timestamp
/// comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AutoSyncState {
    FileNewer,
    DbNewer,
    Synced,
    NoFile,
}

impl AutoSyncState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileNewer => "file_newer",
            Self::DbNewer => "db_newer",
            Self::Synced => "synced",
            Self::NoFile => "no_file",
        }
    }
}

impl fmt::Display for AutoSyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ImportMode
// ---------------------------------------------------------------------------

/// How an import document is applied to the store.
///
/// ```text
/// replace: delete every group, then create everything in the document
/// merge:   upsert groups by slug, recreate their fields, keep the rest
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    Replace,
    #[default]
    Merge,
}

impl ImportMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SyncPathMode
// ---------------------------------------------------------------------------

/// Where the sync root directory lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncPathMode {
    #[default]
    ActiveTheme,
    ParentTheme,
    Custom,
}

impl SyncPathMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActiveTheme => "active_theme",
            Self::ParentTheme => "parent_theme",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for SyncPathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_roundtrips_through_str() {
        for t in FieldType::ALL {
            assert_eq!(t.as_str().parse::<FieldType>().unwrap(), t);
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        let err = "hologram".parse::<FieldType>().unwrap_err();
        assert!(err.to_string().contains("hologram"));
    }

    #[test]
    fn only_repeater_accepts_children() {
        let parents: Vec<_> = FieldType::ALL
            .into_iter()
            .filter(|t| t.accepts_children())
            .collect();
        assert_eq!(parents, vec![FieldType::Repeater]);
    }

    #[test]
    fn theme_only_accepts_need_pull_alias() {
        let state: SyncState = serde_json::from_str("\"need_pull\"").unwrap();
        assert_eq!(state, SyncState::ThemeOnly);
        assert_eq!(serde_json::to_string(&state).unwrap(), "\"theme_only\"");
    }

    #[test]
    fn recommended_actions() {
        assert_eq!(SyncState::Synced.recommended_action(), SyncAction::None);
        assert_eq!(SyncState::NeedPush.recommended_action(), SyncAction::Push);
        assert_eq!(SyncState::ThemeOnly.recommended_action(), SyncAction::Pull);
        assert_eq!(
            SyncState::Modified.recommended_action(),
            SyncAction::PushOrPull
        );
        assert_eq!(
            SyncState::Disabled.recommended_action(),
            SyncAction::EnableSync
        );
    }

    #[test]
    fn import_mode_defaults_to_merge() {
        assert_eq!(ImportMode::default(), ImportMode::Merge);
        let mode: ImportMode = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(mode, ImportMode::Replace);
    }
}

use clap::{Args, Subcommand, ValueEnum};
use fieldsync_core::enums::ImportMode;

use crate::cli::subcommands::{FieldCommands, GroupCommands, ValueCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Compare store groups with their group files.
    Status {
        /// One group; all groups and file-only slugs when omitted.
        slug: Option<String>,
    },
    /// Write group files from the store.
    Push {
        /// One group; every store group when omitted.
        slug: Option<String>,
    },
    /// Load group files into the store.
    Pull {
        /// One group (always merged); every group file when omitted.
        slug: Option<String>,
        #[arg(long, value_enum, default_value = "merge")]
        mode: ModeArg,
    },
    /// Write the whole store to the aggregate file.
    Export,
    /// Import a group file or a whole-store file.
    Import(ImportArgs),
    /// Reconcile the store and the aggregate file by modification time.
    AutoSync,
    /// Groups.
    Group {
        #[command(subcommand)]
        action: GroupCommands,
    },
    /// Fields.
    Field {
        #[command(subcommand)]
        action: FieldCommands,
    },
    /// Field values.
    Value {
        #[command(subcommand)]
        action: ValueCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    /// Upsert groups by slug; other groups are kept.
    Merge,
    /// Delete every group first.
    Replace,
}

impl From<ModeArg> for ImportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Merge => Self::Merge,
            ModeArg::Replace => Self::Replace,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// Document to import.
    pub file: String,
    #[arg(long, value_enum, default_value = "merge")]
    pub mode: ModeArg,
    /// Also check the document against its JSON schema (findings are logged).
    #[arg(long)]
    pub strict: bool,
    /// Keep nothing unless every group imports.
    #[arg(long)]
    pub atomic: bool,
}

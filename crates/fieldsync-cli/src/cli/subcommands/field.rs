use clap::{Args, Subcommand};
use fieldsync_core::enums::FieldType;

/// Field commands.
#[derive(Clone, Debug, Subcommand)]
pub enum FieldCommands {
    /// Add a field to a group.
    Add(FieldAddArgs),
}

#[derive(Clone, Debug, Args)]
pub struct FieldAddArgs {
    /// Group slug.
    pub group: String,
    /// Field slug, unique across all groups.
    pub slug: String,
    #[arg(long = "type")]
    pub field_type: FieldType,
    #[arg(long)]
    pub title: String,
    /// Slug of the repeater that owns this field.
    #[arg(long)]
    pub parent: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub position: i64,
    #[arg(long)]
    pub instructions: Option<String>,
    /// Type-specific options as JSON.
    #[arg(long)]
    pub config: Option<String>,
    /// Validation rules as JSON.
    #[arg(long)]
    pub validation: Option<String>,
    #[arg(long)]
    pub translatable: bool,
}

use clap::{Args, Subcommand};

/// Group commands.
#[derive(Clone, Debug, Subcommand)]
pub enum GroupCommands {
    /// Create a group.
    Add(GroupAddArgs),
    /// List groups in priority order.
    List,
    /// Delete a group with its fields and values.
    Delete { slug: String },
}

#[derive(Clone, Debug, Args)]
pub struct GroupAddArgs {
    pub slug: String,
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub priority: i64,
    /// Location rules as JSON.
    #[arg(long)]
    pub location_rules: Option<String>,
    #[arg(long)]
    pub placement_tab: Option<String>,
    #[arg(long)]
    pub placement_position: Option<String>,
    /// Shop ids the group is attached to.
    #[arg(long = "shop")]
    pub shops: Vec<i64>,
    #[arg(long)]
    pub inactive: bool,
}

use clap::{Args, Subcommand};

/// Value commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ValueCommands {
    /// Store the value an entity holds for a field.
    Set(ValueSetArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ValueSetArgs {
    /// Field slug.
    pub field: String,
    #[arg(long)]
    pub entity_type: String,
    #[arg(long)]
    pub entity_id: i64,
    #[arg(long)]
    pub value: String,
    #[arg(long, default_value_t = 1)]
    pub shop: i64,
    /// Language id, for translatable fields.
    #[arg(long)]
    pub lang: Option<i64>,
}

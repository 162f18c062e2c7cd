use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `fldsync` binary.
#[derive(Debug, Parser)]
#[command(
    name = "fldsync",
    version,
    about = "fieldsync - keep field schemas in sync between the store and JSON files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .fieldsync)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use fieldsync_core::enums::FieldType;

    use super::{Cli, Commands, OutputFormat};
    use crate::cli::root_commands::ModeArg;
    use crate::cli::subcommands::{FieldCommands, GroupCommands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_and_after_subcommand() {
        let cli = Cli::try_parse_from(["fldsync", "--format", "raw", "--verbose", "status"])
            .expect("cli should parse");
        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Status { slug: None }));

        let cli = Cli::try_parse_from(["fldsync", "status", "specs", "--quiet"])
            .expect("cli should parse");
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Status { slug: Some(ref s) } if s == "specs"));
    }

    #[test]
    fn output_format_rejects_table() {
        assert!(Cli::try_parse_from(["fldsync", "--format", "table", "status"]).is_err());
    }

    #[test]
    fn import_parses_mode_and_strict() {
        let cli = Cli::try_parse_from([
            "fldsync", "import", "dump.json", "--mode", "replace", "--strict",
        ])
        .expect("cli should parse");
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.file, "dump.json");
        assert_eq!(args.mode, ModeArg::Replace);
        assert!(args.strict);
        assert!(!args.atomic);
    }

    #[test]
    fn import_parses_atomic() {
        let cli = Cli::try_parse_from(["fldsync", "import", "dump.json", "--atomic"])
            .expect("cli should parse");
        let Commands::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert!(args.atomic);
        assert_eq!(args.mode, ModeArg::Merge);
    }

    #[test]
    fn pull_defaults_to_merge() {
        let cli = Cli::try_parse_from(["fldsync", "pull"]).expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Pull {
                slug: None,
                mode: ModeArg::Merge
            }
        ));
    }

    #[test]
    fn field_add_parses_type() {
        let cli = Cli::try_parse_from([
            "fldsync", "field", "add", "specs", "material", "--type", "select", "--title",
            "Material",
        ])
        .expect("cli should parse");
        let Commands::Field {
            action: FieldCommands::Add(args),
        } = cli.command
        else {
            panic!("expected field add");
        };
        assert_eq!(args.field_type, FieldType::Select);
        assert_eq!(args.group, "specs");
        assert!(args.parent.is_none());

        assert!(
            Cli::try_parse_from([
                "fldsync", "field", "add", "specs", "x", "--type", "hologram", "--title", "X",
            ])
            .is_err()
        );
    }

    #[test]
    fn group_delete_takes_slug() {
        let cli = Cli::try_parse_from(["fldsync", "group", "delete", "specs"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Group {
                action: GroupCommands::Delete { ref slug }
            } if slug == "specs"
        ));
    }
}

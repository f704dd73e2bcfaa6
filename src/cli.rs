use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use reconcile::{LogLevel, Mode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deferred")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Reconcile deferred resource policy into a compiled catalog", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile the policy into a catalog
    Apply(ApplyArgs),

    /// Show what enforcing the policy would change, without writing
    Plan(PlanArgs),

    /// Check the policy file for configuration errors
    Validate(ValidateArgs),

    /// List catalog entries
    Show(ShowArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Apply
// ============================================================================

#[derive(Parser)]
pub struct ApplyArgs {
    /// Catalog JSON file (defaults to `catalog` in the policy file)
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Policy file
    #[arg(long, env = "DEFERRED_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the reconciled catalog here instead of in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Override the policy's mode for every pass
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Override the policy's log level for every pass
    #[arg(short, long, value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Print a line diff of the catalog after enforcing
    #[arg(long)]
    pub diff: bool,
}

// ============================================================================
// Plan / Validate / Show
// ============================================================================

#[derive(Parser)]
pub struct PlanArgs {
    /// Catalog JSON file (defaults to `catalog` in the policy file)
    #[arg(short, long)]
    pub catalog: Option<PathBuf>,

    /// Policy file
    #[arg(long, env = "DEFERRED_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Policy file
    #[arg(long, env = "DEFERRED_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Catalog JSON file
    #[arg(short, long)]
    pub catalog: PathBuf,

    /// Only entries of this type (e.g. package, file)
    #[arg(short = 't', long = "type")]
    pub resource_type: Option<String>,

    /// Only the entry with this title
    pub name: Option<String>,
}

// ============================================================================
// Value enums
// ============================================================================

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Enforcing,
    Warning,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Enforcing => Self::Enforcing,
            ModeArg::Warning => Self::Warning,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Debug,
    Info,
    Notice,
    Warning,
    Err,
    Alert,
    Crit,
    Emerg,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Debug => Self::Debug,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Notice => Self::Notice,
            LogLevelArg::Warning => Self::Warning,
            LogLevelArg::Err => LogLevel::Err,
            LogLevelArg::Alert => Self::Alert,
            LogLevelArg::Crit => Self::Crit,
            LogLevelArg::Emerg => Self::Emerg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from([
            "deferred",
            "-vv",
            "apply",
            "--catalog",
            "catalog.json",
            "--mode",
            "enforcing",
            "--log-level",
            "notice",
            "--yes",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Command::Apply(args) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(args.catalog, Some(PathBuf::from("catalog.json")));
        assert_eq!(args.mode.map(Mode::from), Some(Mode::Enforcing));
        assert_eq!(args.log_level.map(LogLevel::from), Some(LogLevel::Notice));
        assert!(args.yes);
        assert!(!args.diff);
    }

    #[test]
    fn test_parse_show_with_type() {
        let cli =
            Cli::try_parse_from(["deferred", "show", "-c", "c.json", "-t", "package", "vim"])
                .unwrap();
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.resource_type.as_deref(), Some("package"));
        assert_eq!(args.name.as_deref(), Some("vim"));
    }
}

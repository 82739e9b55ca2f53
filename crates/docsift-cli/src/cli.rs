//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// docsift - turn a directory of documents into structured records.
#[derive(Debug, Parser)]
#[command(name = "docsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Env file with api_key, base_url and model (defaults to ./.env)
    #[arg(long, global = true, env = "DOCSIFT_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process every pending document and persist the results
    Run(RunArgs),

    /// Send a single prompt and print the reply
    Complete(CompleteArgs),

    /// Show ledger and result counts
    Status(StatusArgs),
}

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Run configuration (TOML, or JSON with a .json extension).
    /// Defaults to docsift.toml, then config.json
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to scan, overriding the configured input_dir
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// List pending documents without calling the service
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the complete command.
#[derive(Debug, Args)]
pub struct CompleteArgs {
    /// Prompt text
    pub prompt: String,

    /// System message
    #[arg(short, long)]
    pub system: Option<String>,

    /// Maximum tokens in the reply
    #[arg(short, long)]
    pub max_tokens: Option<u32>,

    /// Model, overriding the env file
    #[arg(long)]
    pub model: Option<String>,
}

/// Arguments for the status command.
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Run configuration (see `run --config`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::parse_from(["docsift", "run", "--input", "papers", "--dry-run"]);
        match cli.command {
            Command::Run(args) => {
                assert!(args.config.is_none());
                assert_eq!(args.input, Some(PathBuf::from("papers")));
                assert!(args.dry_run);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_complete_command() {
        let cli = Cli::parse_from([
            "docsift",
            "complete",
            "List three calculus topics.",
            "--system",
            "Be brief.",
            "--max-tokens",
            "50",
        ]);
        match cli.command {
            Command::Complete(args) => {
                assert_eq!(args.prompt, "List three calculus topics.");
                assert_eq!(args.system.as_deref(), Some("Be brief."));
                assert_eq!(args.max_tokens, Some(50));
            }
            _ => panic!("Expected Complete command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["docsift", "status", "-v", "--no-color", "--env-file", "prod.env"]);
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert_eq!(cli.env_file, Some(PathBuf::from("prod.env")));
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["docsift"]).is_err());
    }
}

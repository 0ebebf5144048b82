// trachub/src/cli.rs
//! This file defines the command-line interface (CLI) for the trachub application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "trachub",
    version = env!("CARGO_PKG_VERSION"),
    about = "Translate Trac wiki markup to GitHub markdown",
    long_about = "Trachub converts Trac wiki markup into GitHub-flavoured markdown and plans the migration of Trac tickets to GitHub issues. References between tickets are rewritten to the issue numbers the tickets will receive.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Explicitly disable debug logging, even if RUST_LOG is set to DEBUG
    #[arg(long = "disable-debug", global = true, help = "Disable debug logging, overriding RUST_LOG.")]
    pub disable_debug: bool,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `trachub` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translates a single text from Trac wiki markup to GitHub markdown.
    #[command(about = "Translates a file or stdin from Trac wiki markup to GitHub markdown.")]
    Translate(TranslateCommand),

    /// Writes the dry-run migration plan for a migration settings file.
    #[command(about = "Plans the migration described by a settings file and writes it as JSON.")]
    Plan(PlanCommand),

    /// Lists the markup rules in the order they are applied.
    #[command(about = "Lists the markup rules in the order they are applied.")]
    Rules(RulesCommand),
}

/// Arguments for the `translate` command.
#[derive(Parser, Debug)]
pub struct TranslateCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write translated output to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Destination repository as owner/name.
    #[arg(long, value_name = "OWNER/NAME", env = "TRACHUB_REPO", help = "Destination GitHub repository as owner/name.")]
    pub repo: String,

    /// Base URL of the Trac instance.
    #[arg(long = "trac-url", value_name = "URL", help = "Base URL of the Trac instance, used for blog, changeset and diff links.")]
    pub trac_url: Option<String>,

    /// URL prefix under which ticket attachments are published.
    #[arg(long = "attachments-prefix", value_name = "URL", help = "URL prefix under which ticket attachments are published.")]
    pub attachments_prefix: Option<String>,

    /// Ticket the text belongs to.
    #[arg(long = "ticket-id", value_name = "N", help = "Ticket the text belongs to; roots attachment and image links.")]
    pub ticket_id: Option<u64>,

    /// Trac ticket export used to resolve ticket:N references.
    #[arg(long = "tickets", value_name = "CSV", help = "Trac ticket export (CSV) used to resolve ticket:N references.")]
    pub tickets: Option<PathBuf>,

    /// Number of issues already present in the destination repository.
    #[arg(long = "existing-issues", value_name = "N", default_value_t = 0, help = "Number of issues already present in the destination repository.")]
    pub existing_issues: u64,

    /// Copy the text unchanged.
    #[arg(long = "no-convert", help = "Copy the text without translating the markup.")]
    pub no_convert: bool,

    /// Show a unified diff to highlight the changes made.
    #[arg(long, short = 'D', help = "Show a unified diff to highlight the changes made.")]
    pub diff: bool,

    /// Path to a custom markup rule table (YAML).
    #[arg(long = "rules", value_name = "FILE", help = "Path to a custom markup rule table (YAML).")]
    pub rules: Option<PathBuf>,

    /// Explicitly disable these rule names (comma-separated).
    #[arg(long, short = 'x', value_delimiter = ',', help = "Explicitly disable these rule names (comma-separated).")]
    pub disable: Vec<String>,

    /// Print which rules rewrote the text.
    #[arg(long = "summary", help = "Print which rules rewrote the text, to stderr.")]
    pub summary: bool,
}

/// Arguments for the `plan` command.
#[derive(Parser, Debug)]
pub struct PlanCommand {
    /// Migration settings file (YAML).
    #[arg(value_name = "CONFIG", help = "Migration settings file (YAML).")]
    pub config: PathBuf,

    /// Write the plan to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write the plan to a specified file instead of stdout.")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `rules` command.
#[derive(Parser, Debug)]
pub struct RulesCommand {
    /// Path to a custom markup rule table (YAML).
    #[arg(long = "rules", value_name = "FILE", help = "Path to a custom markup rule table (YAML).")]
    pub rules: Option<PathBuf>,
}

// trachub/src/main.rs
//! Entry point for the `trachub` binary.
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use trachub::cli::{Cli, Commands};
use trachub::commands::{self, plan, rules, translate};
use trachub::logger;
use trachub::ui::theme::{self, ThemeMap};

fn run(cli: &Cli, theme_map: &ThemeMap) -> Result<()> {
    match &cli.command {
        Commands::Translate(cmd) => translate::run_translate(cmd, cli.quiet, theme_map),
        Commands::Plan(cmd) => plan::run_plan(&cmd.config, cmd.output.as_deref(), cli.quiet, theme_map),
        Commands::Rules(cmd) => rules::run_rules(cmd.rules.as_deref(), theme_map),
    }
}

fn main() -> ExitCode {
    // A .env file may supply TRACHUB_REPO.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.quiet, cli.debug, cli.disable_debug));

    let theme_map = match theme::build_theme_map(cli.theme.as_ref()) {
        Ok(map) => map,
        Err(e) => {
            let fallback = theme::ThemeStyle::default_theme_map();
            commands::warn_msg(format!("{:#}. Falling back to the default theme.", e), &fallback);
            fallback
        }
    };

    match run(&cli, &theme_map) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::error_msg(format!("{:#}", e), &theme_map);
            ExitCode::FAILURE
        }
    }
}

// trachub/src/commands/translate.rs
//! `trachub translate`: converts one text from Trac wiki markup to GitHub markdown.
//!
//! Input comes from a file or stdin and output goes to a file or stdout, optionally as a
//! diff against the input. `ticket:N` references are resolved against the ticket export
//! given with `--tickets`; without one, any ticket reference is an error.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use trachub_core::{
    build_translator, github_repo_url, read_tickets, IssueNumbering, RuleHit, TicketToIssueMap,
    TranslatorKind, TranslatorOptions,
};

use crate::cli::TranslateCommand;
use crate::commands::info_msg;
use crate::commands::rules::load_rule_table;
use crate::ui::theme::ThemeMap;
use crate::ui::{diff_viewer, rule_summary};

/// Splits `owner/name` and builds the repository URL.
pub fn repo_url_from_slug(repo: &str) -> Result<String> {
    match repo.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(github_repo_url(owner, name))
        }
        _ => bail!("Repository must be given as \"owner/name\" but is {:?}", repo),
    }
}

fn read_input(input_file: Option<&Path>) -> Result<String> {
    match input_file {
        Some(path) => {
            info!("Reading input from file: {}", path.display());
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {}", path.display()))
        }
        None => {
            info!("Reading input from stdin.");
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

fn load_ticket_map(tickets: Option<&Path>, existing_issues: u64) -> Result<TicketToIssueMap> {
    let Some(path) = tickets else {
        debug!("No ticket export given, ticket references cannot be resolved.");
        return Ok(TicketToIssueMap::default());
    };
    let numbering = IssueNumbering {
        existing_issue_count: existing_issues,
        ..IssueNumbering::default()
    };
    let tickets = read_tickets(path)?;
    Ok(TicketToIssueMap::build(tickets.iter().map(|t| t.id), &numbering))
}

fn write_output<W: Write>(
    writer: &mut W,
    original: &str,
    translated: &str,
    diff: bool,
    theme: &ThemeMap,
    supports_color: bool,
) -> Result<()> {
    if diff {
        diff_viewer::print_diff(original, translated, writer, theme, supports_color)?;
    } else {
        write!(writer, "{}", translated)?;
        if !translated.ends_with('\n') {
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn run_translate(cmd: &TranslateCommand, quiet: bool, theme: &ThemeMap) -> Result<()> {
    let repo_url = repo_url_from_slug(&cmd.repo)?;
    let input = read_input(cmd.input_file.as_deref())?;

    let rules = if cmd.no_convert {
        None
    } else {
        let mut table = load_rule_table(cmd.rules.as_deref())?;
        table.set_active_rules(&cmd.disable);
        Some(table)
    };

    let options = TranslatorOptions {
        kind: TranslatorKind::from_convert_text(!cmd.no_convert),
        repo_url,
        trac_url: cmd.trac_url.as_ref().map(|url| url.trim_end_matches('/').to_string()),
        attachments_prefix: cmd
            .attachments_prefix
            .as_ref()
            .map(|prefix| prefix.trim_end_matches('/').to_string()),
        rules,
    };
    let ticket_map = load_ticket_map(cmd.tickets.as_deref(), cmd.existing_issues)?;
    let translator = build_translator(options, ticket_map)?;
    debug!("Using the {} translator.", translator.name());

    let (translated, hits): (String, Vec<RuleHit>) =
        translator.translate_with_summary(&input, cmd.ticket_id)?;

    match &cmd.output {
        Some(path) => {
            if !quiet {
                info_msg(format!("Writing translated content to file: {}", path.display()), theme);
            }
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_output(&mut file, &input, &translated, cmd.diff, theme, false)?;
        }
        None => {
            let stdout = io::stdout();
            let supports_color = stdout.is_terminal();
            let mut writer = stdout.lock();
            write_output(&mut writer, &input, &translated, cmd.diff, theme, supports_color)?;
        }
    }

    if cmd.summary {
        let stderr_supports_color = io::stderr().is_terminal();
        rule_summary::print_summary(&hits, &mut io::stderr(), theme, stderr_supports_color)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_slug_becomes_github_url() -> Result<()> {
        assert_eq!(repo_url_from_slug("octo/widgets")?, "https://github.com/octo/widgets");
        Ok(())
    }

    #[test]
    fn malformed_repo_slug_is_rejected() {
        assert!(repo_url_from_slug("widgets").is_err());
        assert!(repo_url_from_slug("/widgets").is_err());
        assert!(repo_url_from_slug("a/b/c").is_err());
    }

    #[test]
    fn plain_output_gets_a_trailing_newline() -> Result<()> {
        let theme = crate::ui::theme::ThemeStyle::default_theme_map();
        let mut buf = Vec::new();
        write_output(&mut buf, "x", "*x*", false, &theme, false)?;
        assert_eq!(buf, b"*x*\n");
        Ok(())
    }
}

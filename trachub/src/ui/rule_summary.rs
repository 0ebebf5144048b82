// trachub/src/ui/rule_summary.rs
//! Tables for the rule listing and the per-translation rule hit summary.
//! License: MIT OR APACHE 2.0

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::io::{self, Write};

use trachub_core::{RuleHit, RuleKind, TranslationRule};

use crate::ui::theme::{entry_color, ThemeEntry, ThemeMap};

fn styled(text: &str, entry: ThemeEntry, theme: &ThemeMap, supports_color: bool) -> String {
    if supports_color {
        text.color(entry_color(theme, entry)).to_string()
    } else {
        text.to_string()
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(*h)));
    table
}

/// Prints which rules rewrote the text and how often.
pub fn print_summary<W: Write>(
    hits: &[RuleHit],
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    writeln!(writer, "{}", styled("Rule Summary", ThemeEntry::Header, theme, supports_color))?;
    if hits.is_empty() {
        writeln!(writer, "No rules matched.")?;
        return Ok(());
    }

    let mut table = new_table(&["Rule", "Occurrences"]);
    for hit in hits {
        table.add_row(vec![
            Cell::new(styled(&hit.rule_name, ThemeEntry::SummaryRuleName, theme, supports_color)),
            Cell::new(styled(
                &hit.occurrences.to_string(),
                ThemeEntry::SummaryOccurrences,
                theme,
                supports_color,
            )),
        ]);
    }
    writeln!(writer, "{}", table)
}

/// Orders rules the way the translator applies them: context rules first.
pub fn application_order(rules: &[TranslationRule]) -> Vec<&TranslationRule> {
    let (context, rest): (Vec<&TranslationRule>, Vec<&TranslationRule>) =
        rules.iter().partition(|rule| rule.kind == RuleKind::Context);
    context.into_iter().chain(rest).collect()
}

/// Prints the rule table in application order.
pub fn print_rule_table<W: Write>(
    rules: &[TranslationRule],
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let mut table = new_table(&["#", "Rule", "Kind", "Enabled", "Description"]);
    for (position, rule) in application_order(rules).into_iter().enumerate() {
        table.add_row(vec![
            Cell::new(position + 1),
            Cell::new(styled(&rule.name, ThemeEntry::SummaryRuleName, theme, supports_color)),
            Cell::new(rule.kind),
            Cell::new(if rule.is_enabled() { "yes" } else { "no" }),
            Cell::new(rule.description.as_deref().unwrap_or("")),
        ]);
    }
    writeln!(writer, "{}", table)
}

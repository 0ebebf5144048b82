// trachub/src/commands/rules.rs
//! `trachub rules`: lists the markup rules in the order they are applied.
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use is_terminal::IsTerminal;
use log::info;
use std::io::{self, Write};
use std::path::Path;

use trachub_core::{validate_rules, RuleTable};

use crate::ui::rule_summary;
use crate::ui::theme::ThemeMap;

/// Loads `rules_path` (or the built-in table) and validates it.
pub fn load_rule_table(rules_path: Option<&Path>) -> Result<RuleTable> {
    let table = match rules_path {
        Some(path) => {
            info!("Loading markup rules from {}", path.display());
            RuleTable::load_from_file(path)?
        }
        None => RuleTable::load_default_rules()?,
    };
    validate_rules(&table.rules)?;
    Ok(table)
}

pub fn run_rules(rules_path: Option<&Path>, theme: &ThemeMap) -> Result<()> {
    let table = load_rule_table(rules_path)?;
    let stdout = io::stdout();
    let supports_color = stdout.is_terminal();
    let mut writer = stdout.lock();
    rule_summary::print_rule_table(&table.rules, &mut writer, theme, supports_color)?;
    writer.flush()?;
    Ok(())
}

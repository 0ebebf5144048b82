// trachub/src/ui/diff_viewer.rs
//! Line diff between the original Trac markup and its translation.
//! License: MIT OR APACHE 2.0

use diffy::{create_patch, Line as DiffLine};
use owo_colors::OwoColorize;
use std::io::{self, Write};

use crate::ui::theme::{entry_color, ThemeEntry, ThemeMap};

const DIFF_HEADER: &str = "--- Diff View ---";
const DIFF_FOOTER: &str = "-----------------";

fn write_styled<W: Write>(
    writer: &mut W,
    text: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    if supports_color {
        writeln!(writer, "{}", text.color(entry_color(theme, entry)))
    } else {
        writeln!(writer, "{}", text)
    }
}

/// Writes the changed lines of `original` → `translated`, prefixed with `-`/`+`.
///
/// Unchanged context lines are indented by two spaces.
pub fn print_diff<W: Write>(
    original: &str,
    translated: &str,
    writer: &mut W,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    write_styled(writer, DIFF_HEADER, ThemeEntry::DiffHeader, theme, supports_color)?;

    let patch = create_patch(original, translated);
    if patch.hunks().is_empty() {
        writeln!(writer, "No changes.")?;
    }
    for hunk in patch.hunks() {
        for line in hunk.lines() {
            match line {
                DiffLine::Delete(s) => {
                    let text = format!("- {}", s.trim_end_matches('\n'));
                    write_styled(writer, &text, ThemeEntry::DiffRemoved, theme, supports_color)?;
                }
                DiffLine::Insert(s) => {
                    let text = format!("+ {}", s.trim_end_matches('\n'));
                    write_styled(writer, &text, ThemeEntry::DiffAdded, theme, supports_color)?;
                }
                DiffLine::Context(s) => {
                    writeln!(writer, "  {}", s.trim_end_matches('\n'))?;
                }
            }
        }
    }

    write_styled(writer, DIFF_FOOTER, ThemeEntry::DiffHeader, theme, supports_color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeStyle;

    #[test]
    fn changed_lines_are_marked() -> io::Result<()> {
        let theme = ThemeStyle::default_theme_map();
        let mut buf = Vec::new();
        print_diff("== Title ==\nsame\n", "## Title\nsame\n", &mut buf, &theme, false)?;
        let out = String::from_utf8_lossy(&buf);
        assert!(out.contains("- == Title ==\n"));
        assert!(out.contains("+ ## Title\n"));
        assert!(out.contains("  same\n"));
        Ok(())
    }

    #[test]
    fn identical_texts_report_no_changes() -> io::Result<()> {
        let theme = ThemeStyle::default_theme_map();
        let mut buf = Vec::new();
        print_diff("plain\n", "plain\n", &mut buf, &theme, false)?;
        assert!(String::from_utf8_lossy(&buf).contains("No changes."));
        Ok(())
    }
}

// trachub/src/ui/output_format.rs
//! Status messages written to stderr, coloured according to the active theme.
//! License: MIT OR APACHE 2.0

use owo_colors::OwoColorize;
use std::io::{self, Write};

use crate::ui::theme::{entry_color, ThemeEntry, ThemeMap};

fn print_message<W: Write>(
    writer: &mut W,
    prefix: &str,
    message: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let line = format!("{}{}", prefix, message);
    if supports_color {
        writeln!(writer, "{}", line.color(entry_color(theme, entry)))
    } else {
        writeln!(writer, "{}", line)
    }
}

pub fn print_info_message<W: Write>(
    writer: &mut W,
    message: &str,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    print_message(writer, "", message, ThemeEntry::Info, theme, supports_color)
}

pub fn print_success_message<W: Write>(
    writer: &mut W,
    message: &str,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    print_message(writer, "", message, ThemeEntry::Success, theme, supports_color)
}

pub fn print_warn_message<W: Write>(
    writer: &mut W,
    message: &str,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    print_message(writer, "Warning: ", message, ThemeEntry::Warn, theme, supports_color)
}

pub fn print_error_message<W: Write>(
    writer: &mut W,
    message: &str,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    print_message(writer, "Error: ", message, ThemeEntry::Error, theme, supports_color)
}

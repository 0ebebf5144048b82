// File: trachub-core/src/escaping.rs
//! Small text helpers shared by the translator and the migration planner.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static CC_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^@\s,]+)(@[^,\s]+)?").expect("static cc address regex"));

/// Escapes `$` so the value survives as literal text inside a regex replacement template.
pub fn escape_replacement_value(value: &str) -> String {
    value.replace('$', "$$")
}

/// Replaces the domain of every address in a Trac `cc` field with `@...`.
///
/// Bare user names get the suffix as well, so the output never reveals whether an
/// entry was a full e-mail address.
pub fn strip_cc_domains(cc: &str) -> Cow<'_, str> {
    CC_ADDRESS.replace_all(cc, "$1@...")
}

/// Shortens `text` to at most 30 characters for log output.
pub fn shortened(text: &str) -> Cow<'_, str> {
    const THRESHOLD: usize = 30;
    match text.char_indices().nth(THRESHOLD) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_dollar_signs() {
        assert_eq!(escape_replacement_value("a$1b"), "a$$1b");
        assert_eq!(escape_replacement_value("plain"), "plain");
    }

    #[test]
    fn strips_cc_domains() {
        assert_eq!(
            strip_cc_domains("alice@example.com, bob"),
            "alice@..., bob@..."
        );
        assert_eq!(strip_cc_domains("carol@a.org dave@b.net"), "carol@... dave@...");
    }

    #[test]
    fn shortens_long_text_on_char_boundaries() {
        assert_eq!(shortened("short"), "short");
        let long = "é".repeat(40);
        let out = shortened(&long);
        assert_eq!(out.chars().count(), 33);
        assert!(out.ends_with("..."));
    }
}

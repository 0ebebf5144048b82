// File: trachub-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for using the translators in headless mode (non-UI).
//!
//! `build_translator` picks the translator variant from the `convert_text` setting, so
//! callers only ever deal with a `Box<dyn MarkupTranslator>`.

use anyhow::Result;
use log::debug;
use std::sync::Arc;

use crate::config::RuleTable;
use crate::engine::{MarkupTranslator, TicketId};
use crate::engines::null_translator::NullTranslator;
use crate::engines::wiki_translator::WikiTranslator;
use crate::errors::TrachubError;
use crate::issue_map::TicketToIssueMap;
use crate::rules::template::TemplateValues;

/// Which translator to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorKind {
    Wiki,
    Null,
}

impl TranslatorKind {
    pub fn from_convert_text(convert_text: bool) -> Self {
        if convert_text {
            TranslatorKind::Wiki
        } else {
            TranslatorKind::Null
        }
    }
}

/// Everything needed to construct a translator, apart from the ticket-to-issue map.
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    pub kind: TranslatorKind,
    /// Base URL of the destination repository, e.g. `https://github.com/owner/name`.
    pub repo_url: String,
    pub trac_url: Option<String>,
    pub attachments_prefix: Option<String>,
    /// Custom rule table; the built-in table is used when `None`.
    pub rules: Option<RuleTable>,
}

impl TranslatorOptions {
    pub fn new(convert_text: bool, repo_url: impl Into<String>) -> Self {
        Self {
            kind: TranslatorKind::from_convert_text(convert_text),
            repo_url: repo_url.into(),
            trac_url: None,
            attachments_prefix: None,
            rules: None,
        }
    }
}

/// Builds the translator selected by `options.kind`.
pub fn build_translator(
    options: TranslatorOptions,
    ticket_map: impl Into<Arc<TicketToIssueMap>>,
) -> Result<Box<dyn MarkupTranslator>, TrachubError> {
    debug!("Building {:?} translator for {}.", options.kind, options.repo_url);
    let translator: Box<dyn MarkupTranslator> = match options.kind {
        TranslatorKind::Null => Box::new(NullTranslator::new()),
        TranslatorKind::Wiki => {
            let table = match options.rules {
                Some(table) => table,
                None => RuleTable::load_default_rules()?,
            };
            let values = TemplateValues::new(
                options.repo_url,
                options.trac_url,
                options.attachments_prefix,
            );
            Box::new(WikiTranslator::with_rules(table, values, ticket_map)?)
        }
    };
    Ok(translator)
}

/// Translates a single text in one call.
pub fn headless_translate_string(
    options: TranslatorOptions,
    ticket_map: TicketToIssueMap,
    content: &str,
    ticket_id: Option<TicketId>,
) -> Result<String> {
    let translator = build_translator(options, ticket_map)?;
    Ok(translator.translate(content, ticket_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_headless_translate_string_wiki() -> Result<()> {
        let map: TicketToIssueMap = [(42, 7)].into_iter().collect();
        let options = TranslatorOptions::new(true, "https://github.com/o/r");
        let out = headless_translate_string(options, map, "== Plan ==\nsee ticket:42", None)?;
        assert_eq!(out, "## Plan\nsee issue #7");
        Ok(())
    }

    #[test]
    fn test_headless_translate_string_null() -> Result<()> {
        let options = TranslatorOptions::new(false, "https://github.com/o/r");
        let input = "see ticket:42 and '''bold'''";
        let out = headless_translate_string(options, TicketToIssueMap::default(), input, None)?;
        assert_eq!(out, input);
        Ok(())
    }

    #[test]
    fn null_translator_ignores_invalid_custom_rules() -> Result<()> {
        let mut options = TranslatorOptions::new(false, "u");
        options.rules = Some(RuleTable::default());
        let translator = build_translator(options, TicketToIssueMap::default())?;
        assert_eq!(translator.name(), "null");
        Ok(())
    }

    #[test]
    fn unresolved_reference_surfaces_as_error() {
        let options = TranslatorOptions::new(true, "https://github.com/o/r");
        let err = headless_translate_string(options, TicketToIssueMap::default(), "ticket:99", None)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrachubError>(),
            Some(TrachubError::UnresolvedTicketReference(99))
        ));
    }
}

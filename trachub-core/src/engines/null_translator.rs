// trachub-core/src/engines/null_translator.rs
//! The identity translator, used when text conversion is turned off.
//!
//! License: MIT OR APACHE 2.0

use crate::engine::{MarkupTranslator, RuleHit, TicketId};
use crate::errors::TrachubError;

/// Returns every text unchanged and never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTranslator;

impl NullTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupTranslator for NullTranslator {
    fn translate_with_summary(
        &self,
        text: &str,
        _ticket_id: Option<TicketId>,
    ) -> Result<(String, Vec<RuleHit>), TrachubError> {
        Ok((text.to_string(), Vec::new()))
    }

    fn name(&self) -> &str {
        "null"
    }
}

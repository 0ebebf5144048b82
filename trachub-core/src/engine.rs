// trachub-core/src/engine.rs
//! Defines the core MarkupTranslator trait and related data structures.
//!
//! The `MarkupTranslator` trait provides a pluggable interface for turning Trac wiki
//! markup into GitHub markdown. Callers hold a `Box<dyn MarkupTranslator>` and never
//! need to know whether conversion is actually enabled.
//!
//! License: MIT OR APACHE 2.0

use serde::Serialize;

use crate::errors::TrachubError;

/// A Trac ticket ID.
pub type TicketId = u64;

/// How often a single rule rewrote the text during one translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub rule_name: String,
    pub occurrences: usize,
}

/// A trait that defines the core functionality of a markup translator.
///
/// Implementations are immutable after construction and therefore safe to share
/// between threads.
pub trait MarkupTranslator: Send + Sync {
    /// Translates `text` (a ticket title, body or comment).
    ///
    /// `ticket_id` is the ticket the text belongs to; it roots attachment and image
    /// links and is unused otherwise. A failed translation never yields partial output.
    fn translate(&self, text: &str, ticket_id: Option<TicketId>) -> Result<String, TrachubError> {
        self.translate_with_summary(text, ticket_id).map(|(out, _)| out)
    }

    /// Translates `text` and reports which rules fired, in application order.
    fn translate_with_summary(
        &self,
        text: &str,
        ticket_id: Option<TicketId>,
    ) -> Result<(String, Vec<RuleHit>), TrachubError>;

    /// Short name of the implementation, used in logs.
    fn name(&self) -> &str;
}

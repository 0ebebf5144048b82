//! errors.rs - Custom error types for the trachub-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `trachub-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TrachubError {
    #[error("Failed to compile markup rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Rule '{0}': failed to render replacement template: {1}")]
    TemplateError(String, String),

    /// A `ticket:N` reference whose ticket is missing from the ticket-to-issue map.
    #[error("Cannot resolve reference to ticket #{0}: ticket is not part of the ticket-to-issue map")]
    UnresolvedTicketReference(u64),

    #[error("Cannot convert ticket #{ticket_id}: {source}")]
    TicketConversion {
        ticket_id: u64,
        #[source]
        source: Box<TrachubError>,
    },

    #[error("{file}:{row}: {message}")]
    CsvData {
        file: String,
        row: usize,
        message: String,
    },

    #[error("cannot process config option \"{option}\": {message}")]
    Config { option: String, message: String },

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

impl TrachubError {
    pub fn config(option: impl Into<String>, message: impl Into<String>) -> Self {
        TrachubError::Config {
            option: option.into(),
            message: message.into(),
        }
    }
}

// trachub-core/src/lib.rs
//! # Trachub Core Library
//!
//! `trachub-core` provides the platform-independent logic for moving Trac tickets to
//! GitHub issues. Its centre is the markup translator, which rewrites Trac wiki markup
//! into GitHub-flavoured markdown with an ordered table of regular expression rules and
//! turns `ticket:N` references into references to the issues the tickets will become.
//!
//! Nothing in this crate talks to GitHub. The migration planner produces the issues,
//! comments and milestones a migration would create, as plain data.
//!
//! ## Modules
//!
//! * `config`: `TranslationRule`s and the `RuleTable`, loaded from YAML.
//! * `rules`: compilation of the rule table and rendering of replacement templates.
//! * `engine`: the `MarkupTranslator` trait.
//! * `engines`: `WikiTranslator` and `NullTranslator`.
//! * `headless`: builds the translator selected by the `convert_text` setting.
//! * `issue_map`: the ticket-to-issue map.
//! * `tickets`: readers for the Trac CSV exports.
//! * `mapping`: label and login mapping.
//! * `settings`: the migration configuration file.
//! * `migration`: the dry-run migration planner.
//!
//! ## Usage Example
//!
//! ```rust
//! use trachub_core::{MarkupTranslator, TicketToIssueMap, WikiTranslator};
//!
//! fn main() -> Result<(), trachub_core::TrachubError> {
//!     let ticket_map: TicketToIssueMap = [(42, 7)].into_iter().collect();
//!     let translator = WikiTranslator::new(
//!         "https://github.com/owner/repo",
//!         ticket_map,
//!         None,
//!         Some("https://example.org/files".to_string()),
//!     )?;
//!
//!     let markdown = translator.translate("== Status ==\nsee ticket:42", Some(3))?;
//!     assert_eq!(markdown, "## Status\nsee issue #7");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Translation and planning return the typed [`TrachubError`]; loading functions that
//! touch the file system return `anyhow::Result` with context attached.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod escaping;
pub mod headless;
pub mod issue_map;
pub mod mapping;
pub mod migration;
pub mod rules;
pub mod settings;
pub mod tickets;

/// Re-exports the rule table types.
pub use config::{
    validate_rules, RuleKind, RuleNotFoundError, RuleTable, TranslationRule, MAX_PATTERN_LENGTH,
};

pub use errors::TrachubError;

pub use engine::{MarkupTranslator, RuleHit, TicketId};
pub use engines::null_translator::NullTranslator;
pub use engines::wiki_translator::{github_repo_url, WikiTranslator};

pub use headless::{build_translator, headless_translate_string, TranslatorKind, TranslatorOptions};

pub use issue_map::{IssueNumbering, TicketToIssueMap};
pub use mapping::{LabelMapping, LabelRule, LoginMapping};
pub use migration::{
    plan_from_settings, plan_migration, CommentDraft, IssueDraft, MigrationContext,
    MigrationPlan, MilestoneDraft,
};
pub use settings::MigrationSettings;
pub use tickets::{
    read_attachments, read_comments, read_tickets, Ticket, TicketAttachment, TicketComment,
};

pub use rules::compiler::{compile_rules, CompiledRule, CompiledRules};
pub use rules::template::TemplateValues;

//! Markup rule compilation.
//!
//! This module turns the declarative rule table from `config` into compiled regular
//! expressions with ready-to-use replacement templates. `template` renders the
//! configuration placeholders, `compiler` builds the ordered rule set.

pub mod compiler;
pub mod template;

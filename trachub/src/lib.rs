// trachub/src/lib.rs
//! # Trachub CLI Application
//!
//! Terminal front end for `trachub-core`: translates single texts from Trac wiki markup
//! to GitHub markdown, lists the active rule table and writes dry-run migration plans.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

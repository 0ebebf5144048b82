// trachub/src/ui/mod.rs
//! Terminal presentation: colour theme, status messages, diffs and rule hit summaries.
//! License: MIT OR APACHE 2.0

pub mod diff_viewer;
pub mod output_format;
pub mod rule_summary;
pub mod theme;

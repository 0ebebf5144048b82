// trachub-core/src/engines/mod.rs
//! Markup translator implementations.
//!
//! Each translator lives in its own file and implements the `MarkupTranslator` trait.
//! `headless::build_translator` picks one based on the `convert_text` setting.
//!
//! License: MIT OR APACHE 2.0

pub mod null_translator;
pub mod wiki_translator;

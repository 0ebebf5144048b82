// trachub/src/logger.rs
//! Logger setup for the `trachub` binary.
//!
//! Log records go to stderr so they never mix with translated output on stdout.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes `env_logger`.
///
/// `RUST_LOG` is honoured unless `level_override` is given, in which case it sets the
/// level for every target. Calling this more than once is harmless.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).target(Target::Stderr);
    // Already initialized by an earlier call or a test harness.
    let _ = builder.try_init();
}

/// Picks the level override for the global `--quiet`, `--debug` and `--disable-debug` flags.
pub fn level_from_flags(quiet: bool, debug: bool, disable_debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Error)
    } else if debug && !disable_debug {
        Some(LevelFilter::Debug)
    } else if disable_debug {
        Some(LevelFilter::Info)
    } else {
        None
    }
}

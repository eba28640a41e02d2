//! Logging setup.
//!
//! The status lines (startup, connect, `RECEIVED:`, `SENT:`, disconnect)
//! are emitted under the `console` target, which stays enabled at info
//! whatever level `RUST_LOG` or the config selects.

use std::io::IsTerminal;
use tracing_subscriber::filter::{Directive, EnvFilter, ParseError};

/// Target for the status lines that are always printed.
pub const CONSOLE: &str = "console";

/// Build the filter from `RUST_LOG`, falling back to the configured level.
pub fn filter(log_level: &str) -> Result<EnvFilter, ParseError> {
    let base =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    with_console(base)
}

/// Force the console target on at info.
pub fn with_console(filter: EnvFilter) -> Result<EnvFilter, ParseError> {
    let directive: Directive = format!("{CONSOLE}=info").parse()?;
    Ok(filter.add_directive(directive))
}

/// Install the global subscriber writing to stdout.
pub fn init(log_level: &str) -> Result<(), ParseError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(log_level)?)
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .init();
    Ok(())
}

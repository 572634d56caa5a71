//! Tracing subscriber bootstrap for the CLI.
//!
//! User-facing narration goes to stdout with plain `println!`; the tracing
//! output here is diagnostics, off by default and enabled with `RUST_LOG`.

use std::io::IsTerminal;

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Initialize the global subscriber.
pub fn init() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .init();
}

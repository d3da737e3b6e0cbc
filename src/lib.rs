//! Dicefront rules engine library.
//!
//! Exposes the board model, placement rules, playable-position search,
//! capture and elimination, the turn state machine, and the text protocol
//! for use by integration tests and the binary entry points.

pub mod board;
pub mod engine;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod resolve;
pub mod rules;
pub mod simulate;

/// Environment variable holding the log filter for the binaries.
pub const LOG_ENV: &str = "DICEFRONT_LOG";

/// Installs a stderr log subscriber filtered by `DICEFRONT_LOG`
/// (default `warn`). Stdout is left to the protocol.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // Ignore the error when a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

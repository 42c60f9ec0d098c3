//! Stderr tracing for diagnosing the tool itself.
//!
//! Tracing events (spawned shell commands, git lookups, discovery counts) are
//! developer diagnostics selected with `RUST_LOG`. They never reach stdout,
//! which belongs to the dry-run command, the `--list` output, the `--debug`
//! narration, and the test command's own output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber: `RUST_LOG` filter (default `warn`),
/// compact lines on stderr.
///
/// ```bash
/// RUST_LOG=a_test_runner=debug a-test-runner --changed-only --list
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

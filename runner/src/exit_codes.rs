//! Stable exit codes for the CLI.
//!
//! In execute mode the test command's own exit code is propagated instead.

/// Dry-run or list completed, or the test command passed.
pub const OK: i32 = 0;
/// The tool itself failed (bad config file, failed git lookup, spawn error).
pub const INVALID: i32 = 1;
/// Base added to a signal number when the test command was killed by a signal.
pub const SIGNAL_BASE: i32 = 128;

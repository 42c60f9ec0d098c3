//! Test command composition for a project's test suite.
//!
//! The crate decides which test files run, with what command and environment,
//! and in what mode:
//!
//! - **[`config`]**: Resolved settings, the output sink, and debug/bench narration.
//! - **[`runner`]**: File resolution, command building, and mode dispatch.
//! - **[`io`]**: Side-effecting operations (shell processes, git, filesystem scans,
//!   the constants file). Isolated behind [`io::process::Shell`] so tests can
//!   substitute a recording fake.

pub mod config;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod runner;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

//! I/O helpers: shell processes, git, filesystem scans, and the constants file.

pub mod config;
pub mod discovery;
pub mod git;
pub mod process;

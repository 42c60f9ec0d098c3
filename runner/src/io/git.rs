//! Changed test file lookup for `--changed-only`.
//!
//! One shell query lists files that differ from the configured ref plus files
//! git does not track yet. A failed query is an error: running zero tests
//! would read as a passing run.

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::io::process::Shell;

/// Result of a changed-files lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedResult {
    /// Exact shell command that was executed.
    pub cmd: String,
    /// Changed paths in git's output order, without duplicates.
    pub files: Vec<String>,
}

/// Changed test file lookup via `git diff` and `git ls-files`.
pub struct GitChangedFiles;

impl GitChangedFiles {
    /// Build the lookup command. `changed_ref` is inserted verbatim.
    pub fn cmd(config: &Config, paths: &[String]) -> String {
        let paths = paths.join(" ");
        format!(
            "git diff --no-ext-diff --name-only {} -- {paths} && \
             git ls-files --others --exclude-standard -- {paths}",
            config.changed_ref()
        )
    }

    /// Run the lookup command through `shell`.
    #[instrument(skip_all, fields(changed_ref = config.changed_ref()))]
    pub fn lookup(config: &Config, paths: &[String], shell: &dyn Shell) -> Result<ChangedResult> {
        let cmd = Self::cmd(config, paths);
        let output = shell
            .capture(&cmd)
            .with_context(|| format!("run `{cmd}`"))?;
        if !output.success() {
            warn!(exit_code = output.exit_code, "changed files lookup failed");
            bail!(
                "`{cmd}` failed (exit {}): {}",
                output.exit_code,
                output.stderr_lossy().trim()
            );
        }
        let files = parse_changed_files(&output.stdout_lossy());
        debug!(count = files.len(), "changed files resolved");
        Ok(ChangedResult { cmd, files })
    }
}

fn parse_changed_files(stdout: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

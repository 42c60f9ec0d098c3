//! Shell adapter for running the git query and the test command.
//!
//! Both are composed as single shell strings (`&&` chains, `KEY=VALUE`
//! prefixes), so they go through `sh -c` rather than `Command` argument lists.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{Context, Result};
use tracing::{debug, error, instrument};

use crate::exit_codes;

/// Captured child process output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == exit_codes::OK
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Synchronous shell capability. Calls block until the child exits.
pub trait Shell {
    /// Directory commands run in and relative paths resolve against.
    fn workdir(&self) -> &Path;

    /// Run `command` with piped output and return what it printed.
    fn capture(&self, command: &str) -> Result<CommandOutput>;

    /// Run `command` with this process's stdio and return its exit code.
    fn run_inherited(&self, command: &str) -> Result<i32>;
}

/// [`Shell`] backed by `sh -c` in a fixed working directory.
#[derive(Debug, Clone)]
pub struct SystemShell {
    workdir: PathBuf,
}

impl SystemShell {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn sh(&self, command: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).current_dir(&self.workdir);
        cmd
    }
}

impl Shell for SystemShell {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    #[instrument(skip_all)]
    fn capture(&self, command: &str) -> Result<CommandOutput> {
        debug!(command, "capturing shell command");
        let output = self
            .sh(command)
            .stdin(Stdio::null())
            .output()
            .inspect_err(|e| error!(err = %e, "failed to spawn sh"))
            .with_context(|| format!("spawn sh -c `{command}`"))?;
        let exit_code = exit_code(output.status);
        debug!(exit_code, "shell command finished");
        Ok(CommandOutput {
            exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    #[instrument(skip_all)]
    fn run_inherited(&self, command: &str) -> Result<i32> {
        debug!(command, "running shell command with inherited stdio");
        let status = self
            .sh(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .inspect_err(|e| error!(err = %e, "failed to spawn sh"))
            .with_context(|| format!("spawn sh -c `{command}`"))?;
        let exit_code = exit_code(status);
        debug!(exit_code, "shell command finished");
        Ok(exit_code)
    }
}

/// Map a child's status to the code this process should exit with.
///
/// A child killed by a signal maps to `128 + signal`, as shells report it.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return exit_codes::SIGNAL_BASE + signal;
        }
    }
    exit_codes::INVALID
}

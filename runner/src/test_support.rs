//! Test-only helpers: an in-memory output sink, a scripted shell, and a
//! throwaway git repository.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow, bail};
use tempfile::TempDir;

use crate::config::Config;
use crate::io::config::Constants;
use crate::io::process::{CommandOutput, Shell};

/// Clonable in-memory sink; clones share the same bytes.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Build a config whose output lands in the returned buffer.
pub fn config_with_buffer(constants: Constants) -> (Config, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let config = Config::with_stdout(constants, Box::new(buffer.clone()));
    (config, buffer)
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
}

/// One call observed by [`RecordingShell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCall {
    Capture(String),
    Inherit(String),
}

/// [`Shell`] that records every command and replays scripted results.
///
/// `capture` pops queued outputs in order and errors once the queue is empty.
/// `run_inherited` always returns the configured exit code.
#[derive(Debug)]
pub struct RecordingShell {
    workdir: PathBuf,
    captures: RefCell<VecDeque<CommandOutput>>,
    exit_code: i32,
    calls: RefCell<Vec<ShellCall>>,
}

impl RecordingShell {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            captures: RefCell::new(VecDeque::new()),
            exit_code: 0,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_capture(self, output: CommandOutput) -> Self {
        self.captures.borrow_mut().push_back(output);
        self
    }

    /// Queue a successful capture printing `stdout`.
    pub fn with_capture_stdout(self, stdout: &str) -> Self {
        self.with_capture(CommandOutput {
            exit_code: 0,
            stdout: stdout.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn calls(&self) -> Vec<ShellCall> {
        self.calls.borrow().clone()
    }
}

impl Shell for RecordingShell {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn capture(&self, command: &str) -> Result<CommandOutput> {
        self.calls
            .borrow_mut()
            .push(ShellCall::Capture(command.to_string()));
        self.captures
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected capture: {command}"))
    }

    fn run_inherited(&self, command: &str) -> Result<i32> {
        self.calls
            .borrow_mut()
            .push(ShellCall::Inherit(command.to_string()));
        Ok(self.exit_code)
    }
}

/// Git repository in a temp directory, removed on drop.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp repo dir")?;
        let repo = Self { dir };
        repo.git(&["init", "-q"])?;
        repo.git(&["config", "user.email", "tests@example.com"])?;
        repo.git(&["config", "user.name", "Tests"])?;
        repo.git(&["config", "commit.gpgsign", "false"])?;
        Ok(repo)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, rel: &str, contents: &str) -> Result<()> {
        write_file(self.path(), rel, contents)
    }

    /// Stage everything and commit.
    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.git(&["add", "-A"])?;
        self.git(&["commit", "-q", "-m", message])
    }

    fn git(&self, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .with_context(|| format!("spawn git {}", args.join(" ")))?;
        if !output.status.success() {
            bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

//! Test run orchestration.
//!
//! A [`Runner`] is built once per invocation: construction resolves the test
//! files and builds the command string, [`Runner::run`] then prints, lists, or
//! executes it.

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::exit_codes;
use crate::io::discovery::find_test_files;
use crate::io::git::GitChangedFiles;
use crate::io::process::Shell;

/// What [`Runner::run`] does with the built command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print the command without running it.
    DryRun,
    /// Print the resolved test files, one per line.
    List,
    /// Run the command with inherited stdio.
    Execute,
}

type ModePredicate = fn(&Config) -> bool;

/// Checked top to bottom; the first predicate that holds picks the mode.
/// Falls through to [`Mode::Execute`].
const MODE_PRECEDENCE: &[(ModePredicate, Mode)] = &[
    (Config::dry_run, Mode::DryRun),
    (Config::list, Mode::List),
];

pub fn select_mode(config: &Config) -> Mode {
    MODE_PRECEDENCE
        .iter()
        .find(|(applies, _)| applies(config))
        .map_or(Mode::Execute, |(_, mode)| *mode)
}

pub struct Runner<'a> {
    paths: Vec<String>,
    config: &'a Config,
    shell: &'a dyn Shell,
    test_files: Vec<String>,
    cmd_str: String,
}

impl<'a> Runner<'a> {
    /// Resolve the test files for `paths` and build the test command.
    ///
    /// In changed-only mode the files come from [`GitChangedFiles`]; a failed
    /// git query fails construction.
    #[instrument(skip_all, fields(paths = paths.len(), changed_only = config.changed_only()))]
    pub fn new(paths: Vec<String>, config: &'a Config, shell: &'a dyn Shell) -> Result<Self> {
        let test_files = if config.changed_only() {
            let (lookup, _) = config.bench("Lookup changed test files", || {
                GitChangedFiles::lookup(config, &paths, shell)
            })?;
            let changed = lookup.context("lookup changed test files")?;
            config.debug_puts(&format!("  `{}`", changed.cmd))?;
            changed.files
        } else {
            let (lookup, _) = config.bench("Lookup test files", || {
                find_test_files(shell.workdir(), &paths, config.test_file_suffixes())
            })?;
            lookup.context("lookup test files")?
        };

        config.debug_puts(&format!("{} Test files:", test_files.len()))?;
        for file in &test_files {
            config.debug_puts(&format!("  {file}"))?;
        }

        let cmd_str = build_cmd_str(config, &test_files);
        debug!(cmd = %cmd_str, "test command built");
        config.debug_puts("Test command:")?;
        config.debug_puts(&format!("  {cmd_str}"))?;

        Ok(Self {
            paths,
            config,
            shell,
            test_files,
            cmd_str,
        })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn test_files(&self) -> &[String] {
        &self.test_files
    }

    pub fn cmd_str(&self) -> &str {
        &self.cmd_str
    }

    pub fn mode(&self) -> Mode {
        select_mode(self.config)
    }

    /// Dispatch on the configured mode and return the exit code for this run.
    ///
    /// Dry-run and list never spawn anything and can be repeated.
    #[instrument(skip_all)]
    pub fn run(&self) -> Result<i32> {
        match self.mode() {
            Mode::DryRun => {
                self.config.puts(&self.cmd_str)?;
                Ok(exit_codes::OK)
            }
            Mode::List => {
                for file in &self.test_files {
                    self.config.puts(file)?;
                }
                Ok(exit_codes::OK)
            }
            Mode::Execute => {
                info!(files = self.test_files.len(), "running test command");
                let exit_code = self
                    .shell
                    .run_inherited(&self.cmd_str)
                    .context("run test command")?;
                debug!(exit_code, "test command finished");
                Ok(exit_code)
            }
        }
    }
}

/// `<env_vars> <SEED_VAR>=<seed> <template> <files...>`, skipping empty parts.
pub fn build_cmd_str(config: &Config, test_files: &[String]) -> String {
    let template = if config.verbose() {
        config.verbose_test_cmd()
    } else {
        config.default_test_cmd()
    };
    let seed = format!("{}={}", config.seed_env_var_name(), config.seed_value());

    let mut parts = Vec::with_capacity(test_files.len() + 3);
    if !config.env_vars().is_empty() {
        parts.push(config.env_vars());
    }
    parts.push(seed.as_str());
    parts.push(template);
    parts.extend(test_files.iter().map(String::as_str));
    parts.join(" ")
}

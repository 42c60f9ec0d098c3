//! Compose and run a project's test command.
//!
//! Resolves test files (a directory scan, or only files changed since a git
//! ref), prefixes the test command with the seed and extra env vars, then runs
//! it, prints it (`--dry-run`), or lists the files (`--list`).

use std::path::PathBuf;

use a_test_runner::config::{BIN_NAME, Config, Settings, VERSION};
use a_test_runner::exit_codes;
use a_test_runner::io::config::{DEFAULT_CONFIG_FILE, load_constants};
use a_test_runner::io::process::SystemShell;
use a_test_runner::logging;
use a_test_runner::runner::Runner;
use anyhow::{Context, Result, bail};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = BIN_NAME,
    version = VERSION,
    about = "Compose and run a project's test command"
)]
struct Cli {
    /// Test files or directories to search (defaults to the configured test dir).
    paths: Vec<String>,

    /// Seed exported to the test command.
    #[arg(short, long)]
    seed: Option<u32>,

    /// Only run test files changed since the changed ref (plus untracked ones).
    #[arg(short, long)]
    changed_only: bool,

    /// Git ref to diff against in changed-only mode.
    #[arg(short = 'r', long, value_name = "REF")]
    changed_ref: Option<String>,

    /// Use the verbose test command.
    #[arg(short, long)]
    verbose: bool,

    /// Print the test command instead of running it.
    #[arg(long)]
    dry_run: bool,

    /// Print the test files instead of running them.
    #[arg(short, long)]
    list: bool,

    /// Narrate lookups, timings, and the final command.
    #[arg(short, long)]
    debug: bool,

    /// Constants file (default: `.a-test-runner.toml` in the working directory).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Only flags given on the command line become settings, so defaults survive.
    fn settings(&self) -> Settings {
        Settings {
            seed_value: self.seed,
            changed_only: self.changed_only.then_some(true),
            changed_ref: self.changed_ref.clone(),
            verbose: self.verbose.then_some(true),
            dry_run: self.dry_run.then_some(true),
            list: self.list.then_some(true),
            debug: self.debug.then_some(true),
        }
    }
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let workdir = std::env::current_dir().context("resolve working directory")?;

    let config_path = match &cli.config {
        Some(path) if !path.exists() => bail!("config file {} not found", path.display()),
        Some(path) => path.clone(),
        None => workdir.join(DEFAULT_CONFIG_FILE),
    };
    let constants = load_constants(&config_path)?;

    let mut config = Config::new(constants);
    config.apply(cli.settings());

    let paths = if cli.paths.is_empty() {
        vec![config.test_dir().to_string()]
    } else {
        cli.paths
    };

    let shell = SystemShell::new(workdir);
    let runner = Runner::new(paths, &config, &shell)?;
    runner.run()
}

//! Resolved run settings and the output sink every mode writes to.
//!
//! A [`Config`] is built once per invocation from the project [`Constants`],
//! receives the command-line [`Settings`] through a single [`Config::apply`],
//! and is then only read. All product output (dry-run command, file lists,
//! `[DEBUG]` narration) goes through its sink, never straight to stdout.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;

use crate::io::config::Constants;

pub const BIN_NAME: &str = "a-test-runner";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEBUG_PREFIX: &str = "[DEBUG] ";
/// Column the bench start message is padded to, so finish times line up.
const BENCH_START_WIDTH: usize = 30;
const SEED_MAX: u32 = 0xFFFF;

/// Settings overrides applied on top of the defaults.
///
/// A `None` field leaves the current value in place. Deserializing from a
/// mapping ignores unknown keys.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub seed_value: Option<u32>,
    pub changed_only: Option<bool>,
    pub changed_ref: Option<String>,
    pub verbose: Option<bool>,
    pub dry_run: Option<bool>,
    pub list: Option<bool>,
    pub debug: Option<bool>,
}

pub struct Config {
    constants: Constants,
    seed_value: u32,
    changed_only: bool,
    changed_ref: String,
    verbose: bool,
    dry_run: bool,
    list: bool,
    debug: bool,
    stdout: RefCell<Box<dyn Write>>,
}

impl Config {
    /// Config writing to the process's stdout.
    pub fn new(constants: Constants) -> Self {
        Self::with_stdout(constants, Box::new(io::stdout()))
    }

    pub fn with_stdout(constants: Constants, stdout: Box<dyn Write>) -> Self {
        Self {
            constants,
            seed_value: generate_seed(),
            changed_only: false,
            changed_ref: String::new(),
            verbose: false,
            dry_run: false,
            list: false,
            debug: false,
            stdout: RefCell::new(stdout),
        }
    }

    /// Overwrite every setting present in `settings`; absent ones are kept.
    pub fn apply(&mut self, settings: Settings) {
        if let Some(seed_value) = settings.seed_value {
            self.seed_value = seed_value;
        }
        if let Some(changed_only) = settings.changed_only {
            self.changed_only = changed_only;
        }
        if let Some(changed_ref) = settings.changed_ref {
            self.changed_ref = changed_ref;
        }
        if let Some(verbose) = settings.verbose {
            self.verbose = verbose;
        }
        if let Some(dry_run) = settings.dry_run {
            self.dry_run = dry_run;
        }
        if let Some(list) = settings.list {
            self.list = list;
        }
        if let Some(debug) = settings.debug {
            self.debug = debug;
        }
    }

    pub fn bin_name(&self) -> &'static str {
        BIN_NAME
    }

    pub fn version(&self) -> &'static str {
        VERSION
    }

    pub fn test_dir(&self) -> &str {
        &self.constants.test_dir
    }

    pub fn test_file_suffixes(&self) -> &[String] {
        &self.constants.test_file_suffixes
    }

    pub fn default_test_cmd(&self) -> &str {
        &self.constants.default_test_cmd
    }

    pub fn verbose_test_cmd(&self) -> &str {
        &self.constants.verbose_test_cmd
    }

    pub fn seed_env_var_name(&self) -> &str {
        &self.constants.seed_env_var_name
    }

    pub fn env_vars(&self) -> &str {
        &self.constants.env_vars
    }

    pub fn seed_value(&self) -> u32 {
        self.seed_value
    }

    pub fn changed_only(&self) -> bool {
        self.changed_only
    }

    pub fn changed_ref(&self) -> &str {
        &self.changed_ref
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn list(&self) -> bool {
        self.list
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Write `text` and a newline to the sink.
    pub fn puts(&self, text: &str) -> Result<()> {
        self.write_out(&format!("{text}\n"))
    }

    /// Write `[DEBUG] <text>` and a newline, only in debug mode.
    pub fn debug_puts(&self, text: &str) -> Result<()> {
        if !self.debug {
            return Ok(());
        }
        self.puts(&debug_msg(text))
    }

    /// Run `block`, returning its value and the elapsed wall-clock milliseconds.
    ///
    /// In debug mode the start message is written before the block runs and
    /// the finish message after it, so together they form a single line.
    pub fn bench<T>(&self, label: &str, block: impl FnOnce() -> T) -> Result<(T, f64)> {
        if self.debug {
            self.write_out(&bench_start_msg(label))?;
        }
        let started = Instant::now();
        let value = block();
        let elapsed_ms = round_ms(started.elapsed().as_secs_f64() * 1000.0);
        if self.debug {
            self.write_out(&format!("{}\n", bench_finish_msg(elapsed_ms)))?;
        }
        Ok((value, elapsed_ms))
    }

    fn write_out(&self, text: &str) -> Result<()> {
        let mut stdout = self.stdout.borrow_mut();
        stdout.write_all(text.as_bytes()).context("write output")?;
        stdout.flush().context("flush output")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("constants", &self.constants)
            .field("seed_value", &self.seed_value)
            .field("changed_only", &self.changed_only)
            .field("changed_ref", &self.changed_ref)
            .field("verbose", &self.verbose)
            .field("dry_run", &self.dry_run)
            .field("list", &self.list)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

pub fn debug_msg(text: &str) -> String {
    format!("{DEBUG_PREFIX}{text}")
}

/// `text...` padded to a fixed width; longer labels are never truncated.
pub fn bench_start_msg(text: &str) -> String {
    debug_msg(&format!("{:<width$}", format!("{text}..."), width = BENCH_START_WIDTH))
}

pub fn bench_finish_msg(elapsed_ms: f64) -> String {
    format!(" ({elapsed_ms:?} ms)")
}

fn generate_seed() -> u32 {
    rand::thread_rng().gen_range(1..=SEED_MAX)
}

fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::test_support::{SharedBuffer, config_with_buffer};

    fn debug_config() -> (Config, SharedBuffer) {
        let (mut config, buffer) = config_with_buffer(Constants::default());
        config.apply(Settings {
            debug: Some(true),
            ..Settings::default()
        });
        (config, buffer)
    }

    #[test]
    fn constants_come_from_the_constants_value() {
        let constants = Constants {
            test_dir: "spec".to_string(),
            test_file_suffixes: vec!["_spec.rb".to_string()],
            default_test_cmd: "rspec".to_string(),
            verbose_test_cmd: "rspec --format doc".to_string(),
            seed_env_var_name: "RSPEC_SEED".to_string(),
            env_vars: "RAILS_ENV=test".to_string(),
        };
        let (config, _buffer) = config_with_buffer(constants);

        assert_eq!(config.bin_name(), "a-test-runner");
        assert_eq!(config.version(), env!("CARGO_PKG_VERSION"));
        assert_eq!(config.test_dir(), "spec");
        assert_eq!(config.test_file_suffixes(), ["_spec.rb".to_string()]);
        assert_eq!(config.default_test_cmd(), "rspec");
        assert_eq!(config.verbose_test_cmd(), "rspec --format doc");
        assert_eq!(config.seed_env_var_name(), "RSPEC_SEED");
        assert_eq!(config.env_vars(), "RAILS_ENV=test");
    }

    #[test]
    fn settings_default_to_off() {
        let (config, _buffer) = config_with_buffer(Constants::default());

        assert!(config.seed_value() >= 1);
        assert!(!config.changed_only());
        assert!(config.changed_ref().is_empty());
        assert!(!config.verbose());
        assert!(!config.dry_run());
        assert!(!config.list());
        assert!(!config.debug());
    }

    #[test]
    fn apply_overwrites_every_given_setting() {
        let (mut config, _buffer) = config_with_buffer(Constants::default());
        config.apply(Settings {
            seed_value: Some(4242),
            changed_only: Some(true),
            changed_ref: Some("origin/main".to_string()),
            verbose: Some(true),
            dry_run: Some(true),
            list: Some(true),
            debug: Some(true),
        });

        assert_eq!(config.seed_value(), 4242);
        assert!(config.changed_only());
        assert_eq!(config.changed_ref(), "origin/main");
        assert!(config.verbose());
        assert!(config.dry_run());
        assert!(config.list());
        assert!(config.debug());
    }

    #[test]
    fn apply_keeps_absent_settings() {
        let (mut config, _buffer) = config_with_buffer(Constants::default());
        let seed = config.seed_value();
        config.apply(Settings {
            list: Some(true),
            ..Settings::default()
        });

        assert!(config.list());
        assert_eq!(config.seed_value(), seed);
        assert!(!config.dry_run());
        assert!(config.changed_ref().is_empty());
    }

    #[test]
    fn settings_mapping_ignores_unknown_keys() {
        let settings: Settings =
            toml::from_str("debug = true\nchanged_ref = \"main\"\nshuffle = 3\n").expect("parse");
        assert_eq!(
            settings,
            Settings {
                debug: Some(true),
                changed_ref: Some("main".to_string()),
                ..Settings::default()
            }
        );
    }

    #[test]
    fn builds_debug_messages() {
        assert_eq!(debug_msg("hello"), "[DEBUG] hello");
    }

    #[test]
    fn bench_start_msg_pads_short_labels() {
        let msg = bench_start_msg("Lookup");
        assert_eq!(msg, format!("[DEBUG] {:<30}", "Lookup..."));
        assert_eq!(msg.len(), DEBUG_PREFIX.len() + 30);
    }

    #[test]
    fn bench_start_msg_never_truncates_long_labels() {
        let label = "a".repeat(35);
        assert_eq!(bench_start_msg(&label), format!("[DEBUG] {label}..."));

        let boundary = "b".repeat(27);
        assert_eq!(bench_start_msg(&boundary), format!("[DEBUG] {boundary}..."));
    }

    #[test]
    fn builds_bench_finish_messages() {
        assert_eq!(bench_finish_msg(1.25), " (1.25 ms)");
        assert_eq!(bench_finish_msg(3.0), " (3.0 ms)");
    }

    #[test]
    fn debug_puts_is_silent_unless_debugging() {
        let (config, buffer) = config_with_buffer(Constants::default());
        config.debug_puts("hidden").expect("debug_puts");
        assert_eq!(buffer.contents(), "");

        let (config, buffer) = debug_config();
        config.debug_puts("shown").expect("debug_puts");
        assert_eq!(buffer.contents(), "[DEBUG] shown\n");
    }

    #[test]
    fn bench_writes_nothing_unless_debugging() {
        let (config, buffer) = config_with_buffer(Constants::default());
        let (value, elapsed_ms) = config
            .bench("Quiet work", || {
                thread::sleep(Duration::from_millis(5));
                7
            })
            .expect("bench");

        assert_eq!(value, 7);
        assert!(elapsed_ms >= 5.0, "elapsed {elapsed_ms}");
        assert_eq!(buffer.contents(), "");
    }

    #[test]
    fn bench_writes_one_line_when_debugging() {
        let (config, buffer) = debug_config();
        let ((), elapsed_ms) = config.bench("Loud work", || ()).expect("bench");

        let expected = format!(
            "{}{}\n",
            bench_start_msg("Loud work"),
            bench_finish_msg(elapsed_ms)
        );
        assert_eq!(buffer.contents(), expected);
    }
}

//! Project constants stored in `.a-test-runner.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File name looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".a-test-runner.toml";

/// Per-project constants (TOML).
///
/// Intended to be edited by humans. Missing fields fall back to defaults
/// suited to a Ruby project driven by `./bin/rake test`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Constants {
    /// Directory searched when no paths are given on the command line.
    pub test_dir: String,

    /// A file is a test file when its name ends with one of these.
    pub test_file_suffixes: Vec<String>,

    pub default_test_cmd: String,

    /// Used instead of `default_test_cmd` when `--verbose` is given.
    pub verbose_test_cmd: String,

    /// Environment variable the seed is exported as.
    pub seed_env_var_name: String,

    /// Pre-formatted `KEY=VALUE` pairs placed in front of the command.
    pub env_vars: String,
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            test_dir: "test".to_string(),
            test_file_suffixes: vec!["_test.rb".to_string()],
            default_test_cmd: "./bin/rake test".to_string(),
            verbose_test_cmd: "./bin/rake test".to_string(),
            seed_env_var_name: "SEED".to_string(),
            env_vars: String::new(),
        }
    }
}

impl Constants {
    pub fn validate(&self) -> Result<()> {
        if self.test_file_suffixes.is_empty()
            || self.test_file_suffixes.iter().any(|s| s.trim().is_empty())
        {
            return Err(anyhow!("test_file_suffixes must be a non-empty array of non-empty strings"));
        }
        if self.default_test_cmd.trim().is_empty() {
            return Err(anyhow!("default_test_cmd must not be blank"));
        }
        if self.verbose_test_cmd.trim().is_empty() {
            return Err(anyhow!("verbose_test_cmd must not be blank"));
        }
        if self.seed_env_var_name.trim().is_empty() {
            return Err(anyhow!("seed_env_var_name must not be blank"));
        }
        Ok(())
    }
}

/// Load constants from a TOML file.
///
/// If the file is missing, returns `Constants::default()`.
pub fn load_constants(path: &Path) -> Result<Constants> {
    if !path.exists() {
        debug!(path = %path.display(), "no constants file, using defaults");
        return Ok(Constants::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let constants: Constants =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    constants
        .validate()
        .with_context(|| format!("validate {}", path.display()))?;
    debug!(path = %path.display(), "loaded constants file");
    Ok(constants)
}

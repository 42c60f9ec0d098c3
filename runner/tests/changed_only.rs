//! Changed-only scenarios against a real git repository.

use std::path::Path;
use std::process::{Command, Output};

use a_test_runner::config::{Config, Settings};
use a_test_runner::exit_codes;
use a_test_runner::io::config::Constants;
use a_test_runner::io::git::GitChangedFiles;
use a_test_runner::io::process::SystemShell;
use a_test_runner::test_support::TestRepo;

/// Repo with two committed tests, one of them modified, plus an untracked one.
fn repo_with_changes() -> TestRepo {
    let repo = TestRepo::new().expect("repo");
    repo.write("test/a_test.rb", "a\n").expect("write a");
    repo.write("test/b_test.rb", "b\n").expect("write b");
    repo.commit_all("initial").expect("commit");

    repo.write("test/b_test.rb", "b changed\n").expect("modify b");
    repo.write("test/c_test.rb", "c\n").expect("write c");
    repo
}

fn run_cli(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_a-test-runner"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run a-test-runner")
}

#[test]
fn lookup_finds_modified_and_untracked_files() {
    let repo = repo_with_changes();
    let mut config = Config::new(Constants::default());
    config.apply(Settings {
        changed_ref: Some("HEAD".to_string()),
        ..Settings::default()
    });
    let shell = SystemShell::new(repo.path());

    let result =
        GitChangedFiles::lookup(&config, &["test".to_string()], &shell).expect("lookup");
    assert_eq!(result.files, vec!["test/b_test.rb", "test/c_test.rb"]);
    assert!(result.cmd.starts_with("git diff --no-ext-diff --name-only HEAD -- test"));
}

#[test]
fn cli_lists_only_changed_files() {
    let repo = repo_with_changes();
    let output = run_cli(repo.path(), &["--changed-only", "--changed-ref", "HEAD", "--list"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "test/b_test.rb\ntest/c_test.rb\n"
    );
}

#[test]
fn cli_fails_on_unknown_ref() {
    let repo = repo_with_changes();
    let output = run_cli(
        repo.path(),
        &["-c", "-r", "no-such-ref", "--dry-run"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no-such-ref"));
}

//! Static test file discovery.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};
use walkdir::{DirEntry, WalkDir};

/// Collect test files under `paths`, resolved against `workdir`.
///
/// A path naming a file is kept regardless of suffix. A directory is walked
/// recursively in file-name order, keeping files whose name ends with one of
/// `suffixes` and skipping hidden entries. An empty path means `workdir` itself. Results are
/// relative to `workdir` when they live under it, and de-duplicated in
/// discovery order.
#[instrument(skip_all, fields(workdir = %workdir.display(), paths = paths.len()))]
pub fn find_test_files(workdir: &Path, paths: &[String], suffixes: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for path in paths {
        let root = if path.is_empty() {
            workdir.to_path_buf()
        } else {
            workdir.join(path)
        };
        if root.is_file() {
            let shown = shown_path(workdir, &root);
            if seen.insert(shown.clone()) {
                files.push(shown);
            }
            continue;
        }
        if !root.is_dir() {
            warn!(path = %path, "search path does not exist");
            continue;
        }
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in walker {
            let entry = entry.with_context(|| format!("walk {}", root.display()))?;
            if !entry.file_type().is_file() || !has_suffix(&entry, suffixes) {
                continue;
            }
            let shown = shown_path(workdir, entry.path());
            if seen.insert(shown.clone()) {
                files.push(shown);
            }
        }
    }
    debug!(count = files.len(), "test files found");
    Ok(files)
}

/// Path relative to `workdir` when under it, with `.` components dropped, so
/// one file spelled two ways yields one key.
fn shown_path(workdir: &Path, path: &Path) -> String {
    path.strip_prefix(workdir)
        .unwrap_or(path)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect::<PathBuf>()
        .to_string_lossy()
        .to_string()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn has_suffix(entry: &DirEntry, suffixes: &[String]) -> bool {
    let name = entry.file_name().to_string_lossy();
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

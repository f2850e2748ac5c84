//! Directory walk feeding the documentation tool.

use ignore::{DirEntry, WalkBuilder};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ToolError, ToolResult};

const IGNORE_DIRS: [&str; 10] = [
    ".git",
    "__pycache__",
    "venv",
    "node_modules",
    "dist",
    "build",
    ".idea",
    ".vscode",
    ".pytest_cache",
    "target",
];
const IGNORE_EXTENSIONS: [&str; 6] = ["pyc", "log", "lock", "env", "sqlite3", "db"];
const IGNORE_FILES: [&str; 3] = ["requirements.lock", ".env", "secrets.json"];

/// Read every documentable text file under `base`, keyed by relative path.
///
/// Paths in `exclude` (files or whole directories) are never read. `.gitignore`
/// rules apply whenever `base` sits inside a git checkout, including ones
/// declared above `base`. Unreadable and non-UTF-8 files are skipped with a
/// warning.
pub fn read_sources(base: &Path, exclude: &[PathBuf]) -> ToolResult<BTreeMap<String, String>> {
    let not_a_dir = |path: &Path| ToolError::ReadInput {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
    };
    if !base.is_dir() {
        return Err(not_a_dir(base));
    }
    let base = base.canonicalize().map_err(|_| not_a_dir(base))?;
    // Entries are compared against canonical paths; missing ones cannot match anyway.
    let excluded: Vec<PathBuf> = exclude.iter().filter_map(|p| p.canonicalize().ok()).collect();
    let mut files = BTreeMap::new();

    for result in WalkBuilder::new(&base)
        .hidden(false)
        .git_global(false)
        .git_exclude(false)
        .filter_entry(move |entry| {
            !is_ignored_dir(entry) && !excluded.iter().any(|p| p == entry.path())
        })
        .build()
    {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || is_ignored_file(path) {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                let rel = path.strip_prefix(&base).unwrap_or(path);
                let key = rel.to_string_lossy().replace('\\', "/");
                debug!(file = %key, bytes = content.len(), "Collected source file");
                files.insert(key, content);
            }
            Err(err) => warn!(path = %path.display(), error = %err, "Skipping unreadable file"),
        }
    }

    Ok(files)
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|t| t.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORE_DIRS.contains(&name))
}

fn is_ignored_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if IGNORE_FILES.contains(&name) {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IGNORE_EXTENSIONS.contains(&ext))
}

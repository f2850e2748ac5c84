//! Reading tool inputs and persisting artifacts.
//!
//! Every artifact is written to a temporary file next to its destination and
//! then renamed over it, so a reader sees either the previous file or the
//! complete new one. An overwritten file keeps its mode; a new one gets the
//! usual `0o666` minus umask.

use chrono::NaiveDateTime;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::PathsConfig;
use crate::error::{ToolError, ToolResult};

const DEFAULT_GENERATED_NAME: &str = "generated_code";
const REVIEW_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o666;

/// Map a type hint to a file extension.
///
/// Known hints are normalized; anything else is used verbatim (lower-cased).
pub fn extension_for(hint: &str) -> String {
    let hint = hint.trim().to_lowercase();
    match hint.as_str() {
        "python" | "py" => "py".to_string(),
        "java" => "java".to_string(),
        "c" => "c".to_string(),
        "cpp" => "cpp".to_string(),
        "js" => "js".to_string(),
        "html" => "html".to_string(),
        _ => hint,
    }
}

/// Read a UTF-8 source file, rejecting whitespace-only content.
pub fn read_source(path: &Path) -> ToolResult<String> {
    let code = std::fs::read_to_string(path).map_err(|source| ToolError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    if code.trim().is_empty() {
        return Err(ToolError::EmptyInput(path.to_path_buf()));
    }
    Ok(code)
}

/// Resolved output locations for one invocation.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    generated: PathBuf,
    optimized: PathBuf,
    reviews: PathBuf,
    logs: PathBuf,
}

impl Workspace {
    /// A workspace rooted at `root` using the default folder names.
    #[cfg(test)]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let paths = PathsConfig {
            root: root.into(),
            ..PathsConfig::default()
        };
        Self::from_config(&paths)
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        let root = paths.root.clone();
        Self {
            generated: root.join(&paths.generated),
            optimized: root.join(&paths.optimized),
            reviews: root.join(&paths.reviews),
            logs: root.join(&paths.logs),
            root,
        }
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs
    }

    /// Resolve `path` against the workspace root unless it is absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Save generated code as `<name>.<ext>` in the generated folder.
    pub fn save_generated(&self, content: &str, hint: &str, name: Option<&str>) -> ToolResult<PathBuf> {
        let ext = extension_for(hint);
        let stem = name
            .and_then(|n| Path::new(n).file_name())
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_GENERATED_NAME);
        // `--filename reverse.py` with a python block should not become reverse.py.py
        let stem = stem
            .strip_suffix(&format!(".{}", ext))
            .filter(|s| !s.is_empty())
            .unwrap_or(stem);

        let path = self.generated.join(format!("{}.{}", stem, ext));
        write_atomic(&path, content)?;
        Ok(path)
    }

    /// Save optimized code under the source file's own name.
    pub fn save_optimized(&self, content: &str, source: &Path) -> ToolResult<PathBuf> {
        let name = source
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "optimized_code".into());
        let path = self.optimized.join(name);
        write_atomic(&path, content)?;
        Ok(path)
    }

    /// Save a review report as `<source name>_review_<timestamp>.txt`.
    pub fn save_review(&self, text: &str, source: &Path, now: NaiveDateTime) -> ToolResult<PathBuf> {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "code".to_string());
        let path = self.reviews.join(format!(
            "{}_review_{}.txt",
            name,
            now.format(REVIEW_TIMESTAMP_FORMAT)
        ));
        write_atomic(&path, text)?;
        Ok(path)
    }

    /// Save generated documentation at `output`.
    pub fn save_document(&self, text: &str, output: &Path) -> ToolResult<PathBuf> {
        let path = self.resolve(output);
        write_atomic(&path, text)?;
        Ok(path)
    }
}

fn write_atomic(path: &Path, content: &str) -> ToolResult<()> {
    let write_err = |source| ToolError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(NEW_FILE_MODE));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(write_err)?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?;
    }
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), bytes = content.len(), "Artifact written");
    Ok(())
}

//! Content-gated atomic file writer.
//!
//! ## `write_file` protocol
//!
//! 1. Normalise line endings to LF.
//! 2. Read the current file, if any; identical content ⇒ `Unchanged`.
//! 3. Dry run ⇒ `WouldWrite`, nothing touched.
//! 4. Create parent directories, write `<path>.djinit.tmp`.
//! 5. Rename onto the final path (atomic on POSIX); drop the tmp on failure.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, ScaffoldError};

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File already had exactly this content.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// write_file
// ---------------------------------------------------------------------------

/// Write `content` to `path` unless it is already there.
pub fn write_file(path: &Path, content: &str, dry_run: bool) -> Result<WriteResult, ScaffoldError> {
    let tmp = PathBuf::from(format!("{}.djinit.tmp", path.display()));
    write_file_with_tmp(path, content, dry_run, &tmp)
}

fn write_file_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, ScaffoldError> {
    let normalized = normalize_line_endings(content);
    let content = normalized.as_str();

    if read_existing(path)?.as_deref() == Some(content) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Current file content with LF line endings; `None` when absent.
pub fn read_existing(path: &Path) -> Result<Option<String>, ScaffoldError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(normalize_line_endings(&content))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

pub(crate) fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

/// `chmod 0755`; a no-op off unix.
#[cfg(unix)]
pub fn make_executable(path: &Path) -> Result<(), ScaffoldError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> Result<(), ScaffoldError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

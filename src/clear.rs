//! Guarded directory clearing.
//!
//! Publishing recompiles into a directory that already holds the previous
//! build, so the target is emptied first. [`clear_directory`] removes every
//! entry under a directory and keeps the directory itself:
//!
//! ```text
//! before                 after
//! wiki/                  wiki/
//! ├── toc.html
//! ├── main.css
//! └── tools/
//!     └── editor.html
//! ```
//!
//! Paths that name a whole filesystem or home directory are refused before
//! anything is touched: an empty string, `/`, `~`, and `*` (after trimming
//! whitespace), plus any path that canonicalizes to `/`.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const REFUSED_PATHS: &[&str] = &["", "/", "~", "*"];

#[derive(Error, Debug)]
pub enum ClearError {
    #[error("Refusing to clear '{0}'")]
    Refused(String),
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Remove everything under `path`, keeping `path` itself.
///
/// Returns the number of top-level entries removed.
pub fn clear_directory(path: &Path) -> Result<usize, ClearError> {
    let raw = path.to_string_lossy();
    let trimmed = raw.trim();
    if REFUSED_PATHS.contains(&trimmed) {
        return Err(ClearError::Refused(trimmed.to_string()));
    }

    let target = Path::new(trimmed);
    if !target.is_dir() {
        return Err(ClearError::NotADirectory(target.to_path_buf()));
    }
    if fs::canonicalize(target)?.parent().is_none() {
        return Err(ClearError::Refused(trimmed.to_string()));
    }

    let mut removed = 0;
    for entry in fs::read_dir(target)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&entry_path)?;
        } else {
            fs::remove_file(&entry_path)?;
        }
        removed += 1;
    }
    Ok(removed)
}

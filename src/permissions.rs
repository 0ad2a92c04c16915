//! Shared-write permission fixup.
//!
//! The wiki is compiled by whichever user happens to publish, and the next
//! publisher has to be able to clear and overwrite the result. Every path the
//! compiler creates is opened up:
//!
//! | Created | Mode |
//! |---------|------|
//! | file | `0o666` |
//! | directory | `0o777` |
//!
//! A path that cannot be changed does not stop the build. The failure is
//! kept and can be reported once compilation is done. On non-Unix platforms
//! nothing is changed.

use crate::compile::CreateObserver;
use std::io;
use std::path::{Path, PathBuf};

pub const FILE_MODE: u32 = 0o666;
pub const DIR_MODE: u32 = 0o777;

/// A path whose permissions could not be changed.
#[derive(Debug)]
pub struct PermissionFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

/// [`CreateObserver`] that makes every created path group/world writable.
#[derive(Debug, Default)]
pub struct PermissionFixup {
    failures: Vec<PermissionFailure>,
}

impl PermissionFixup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> &[PermissionFailure] {
        &self.failures
    }
}

impl CreateObserver for PermissionFixup {
    fn created(&mut self, path: &Path) {
        if let Err(error) = open_up(path) {
            self.failures.push(PermissionFailure {
                path: path.to_path_buf(),
                error,
            });
        }
    }
}

#[cfg(unix)]
fn open_up(path: &Path) -> io::Result<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let mode = if fs::metadata(path)?.is_dir() {
        DIR_MODE
    } else {
        FILE_MODE
    };
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn open_up(_path: &Path) -> io::Result<()> {
    Ok(())
}

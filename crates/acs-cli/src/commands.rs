pub mod inspect;
pub mod new;
pub mod promote;
pub mod script;
pub mod split;
pub mod validate;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Resolves `path` against the working directory.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Directory containing `file`, `.` for a bare file name.
pub(crate) fn parent_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Split `path` into `(dir, base)`.
///
/// A path without a directory component lives in `.`, never in `""`. The base
/// is `None` when the path names no file component (`""`, `/`, `..`, or
/// anything ending in a separator, which names the directory itself).
pub fn split_path(path: &Path) -> (PathBuf, Option<OsString>) {
    if path
        .as_os_str()
        .to_string_lossy()
        .ends_with(std::path::is_separator)
    {
        return (path.to_path_buf(), None);
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        // "" parent for bare names; None for "" and roots.
        Some(_) => PathBuf::from("."),
        None if path.has_root() => path.to_path_buf(),
        None => PathBuf::from("."),
    };
    let base = path.file_name().map(|b| b.to_os_string());
    (dir, base)
}

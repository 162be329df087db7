//! Path normalization for paths written inside project files.

use std::path::{Component, Path, PathBuf};

/// Turn a path as written in a project file into an absolute path.
///
/// Backslashes are treated as directory separators, a relative path is
/// joined onto `base`, and `.` / `..` components are folded lexically.
/// The filesystem is never consulted, so a path that does not exist
/// normalizes without error.
pub fn normalize(raw: &str, base: &Path) -> PathBuf {
    fold(&base.join(raw.replace('\\', "/")))
}

/// [`normalize`] for a path that may not be valid UTF-8. Such a path is
/// made absolute and folded with its bytes untouched.
pub fn normalize_path(raw: &Path, base: &Path) -> PathBuf {
    match raw.to_str() {
        Some(s) => normalize(s, base),
        None => fold(&base.join(raw)),
    }
}

fn fold(joined: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            // `pop` on a bare root is a no-op, so `..` never climbs past it.
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

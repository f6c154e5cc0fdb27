//! Lexical path helpers and multi-root resolution.
use std::path::{Component, Path, PathBuf};

use crate::operations::FileSystemOps;

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component where possible. Does not touch the filesystem.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }
    if components.is_empty() {
        return PathBuf::from(".");
    }
    components.iter().collect()
}

/// Join `relative` onto `base` and normalize the result.
#[must_use]
pub fn combine(base: &Path, relative: &Path) -> PathBuf {
    normalize(&base.join(relative))
}

/// Make `path` absolute against `base` (when relative) and normalize it.
#[must_use]
pub fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        combine(base, path)
    }
}

/// Split a `;`-separated root list.
///
/// Entries are trimmed, empty entries skipped and relative entries resolved
/// against `base`. `base` itself is appended last as the lowest-priority
/// fallback.
#[must_use]
pub fn split_roots(list: Option<&str>, base: &Path) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = list
        .unwrap_or_default()
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| make_absolute(Path::new(entry), base))
        .collect();
    roots.push(normalize(base));
    roots
}

/// Return the first `root/relative` that exists, in root order.
#[must_use]
pub fn resolve(relative: &Path, roots: &[PathBuf], fs: &dyn FileSystemOps) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| combine(root, relative))
        .find(|candidate| fs.exists(candidate))
}

/// Whether an attribute value can be used as a path.
#[must_use]
pub fn is_valid(value: &str) -> bool {
    !value.trim().is_empty() && !value.contains('\0')
}

/// Case-insensitive key for comparing install destinations.
#[must_use]
pub fn destination_key(path: &Path) -> String {
    normalize(path)
        .to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

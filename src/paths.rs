//! Path identity helpers.
//!
//! Graph keys are canonical paths. Targets that do not exist cannot be
//! canonicalized, so they are normalized lexically instead.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonical path when the target exists, lexical normalization otherwise.
///
/// For missing files the nearest existing ancestor is canonicalized so a
/// dangling target under a symlinked directory still shares its prefix with
/// canonical graph nodes.
pub fn canonical_or_normalized(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    let normalized = normalize(path);
    let mut existing = normalized.as_path();
    let mut rest: Vec<&std::ffi::OsStr> = Vec::new();
    while let Some(parent) = existing.parent() {
        if let Some(name) = existing.file_name() {
            rest.push(name);
        }
        existing = parent;
        if let Ok(mut canonical) = existing.canonicalize() {
            for name in rest.iter().rev() {
                canonical.push(name);
            }
            return canonical;
        }
    }
    normalized
}

/// Resolve a link path written in `source` to a graph key.
///
/// Relative paths resolve against the source file's directory; paths
/// starting with `/` resolve against the scope root.
pub fn resolve_target(source: &Path, raw: &str, scope_root: &Path) -> PathBuf {
    let joined = match raw.strip_prefix('/') {
        Some(rooted) => scope_root.join(rooted),
        None => source.parent().unwrap_or(Path::new("")).join(raw),
    };
    canonical_or_normalized(&joined)
}

/// Deepest directory containing every given directory.
pub fn common_ancestor(dirs: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = dirs.split_first()?;
    let mut prefix: Vec<Component<'_>> = first.components().collect();
    for dir in rest {
        let shared = prefix
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| *a == b)
            .count();
        prefix.truncate(shared);
    }
    if prefix.is_empty() {
        return None;
    }
    Some(prefix.iter().map(|c| c.as_os_str()).collect())
}

/// `path` relative to `base` when it lies below it, unchanged otherwise.
pub fn display_relative(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

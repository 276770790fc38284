//! Relative path helpers
//!
//! Snapshot keys are slash-separated paths relative to the tree root, with no
//! leading or trailing slash. The empty string denotes the root itself.

/// Join a relative directory path and an entry name.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Number of components in a relative path (`"a/b"` has depth 2).
pub fn depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.matches('/').count() + 1
    }
}

/// Whether `path` lies strictly below the directory `dir`.
pub fn is_within(path: &str, dir: &str) -> bool {
    path.len() > dir.len() + 1 && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/'
}

/// Normalize a remote root: trailing slashes removed, `/` preserved.
pub fn normalize_remote_root(root: &str) -> String {
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() && root.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Absolute (or login-relative) remote path for a relative snapshot path.
pub fn remote_path(root: &str, relative: &str) -> String {
    let root = normalize_remote_root(root);
    match (root.as_str(), relative.is_empty()) {
        (_, true) => root,
        ("", false) => relative.to_string(),
        ("/", false) => format!("/{}", relative),
        (root, false) => format!("{}/{}", root, relative),
    }
}

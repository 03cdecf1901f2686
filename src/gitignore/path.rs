//! Root-relative, slash-separated paths for pattern matching

use std::path::{Component, Path, PathBuf};

/// Express `path` relative to `root` using `/` separators.
///
/// Both paths are cleaned lexically first, so `.` roots, `./` prefixes and
/// `dir/..` segments compare as expected. Returns `None` when `path` is
/// not below `root`, climbs out of it with `..`, or is the root itself.
/// Relative and absolute paths never match each other.
pub fn normalize(root: &Path, path: &Path) -> Option<String> {
    let root = clean(root);
    let path = clean(path);
    let relative = path.strip_prefix(&root).ok()?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Resolve `.` and `name/..` without touching the filesystem. A `..`
/// directly under the root is dropped; leading `..` of a relative path are
/// kept. `.` cleans to an empty path.
fn clean(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }
    parts.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_nested_path() {
        let root = Path::new("/repo");
        let path = root.join("src").join("sub").join("main.go");
        assert_eq!(normalize(root, &path).as_deref(), Some("src/sub/main.go"));
    }

    #[test]
    fn test_trailing_separator_on_root() {
        let root = PathBuf::from("/repo/");
        assert_eq!(
            normalize(&root, Path::new("/repo/a.txt")).as_deref(),
            Some("a.txt")
        );
    }

    #[test]
    fn test_current_dir_components_dropped() {
        let root = Path::new("/repo");
        assert_eq!(
            normalize(root, Path::new("/repo/./src/./lib.rs")).as_deref(),
            Some("src/lib.rs")
        );
    }

    #[test]
    fn test_outside_root() {
        let root = Path::new("/repo");
        assert_eq!(normalize(root, Path::new("/elsewhere/a.txt")), None);
        assert_eq!(normalize(root, Path::new("relative/a.txt")), None);
    }

    #[test]
    fn test_escaping_root() {
        let root = Path::new("/repo");
        assert_eq!(normalize(root, Path::new("/repo/../etc/passwd")), None);
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Path::new(".")), PathBuf::new());
        assert_eq!(clean(Path::new("./a/./b")), PathBuf::from("a/b"));
        assert_eq!(clean(Path::new("/repo/sub/../a")), PathBuf::from("/repo/a"));
        assert_eq!(clean(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(clean(Path::new("../x/../y")), PathBuf::from("../y"));
    }

    #[test]
    fn test_current_dir_root() {
        let root = Path::new(".");
        assert_eq!(normalize(root, Path::new("a.log")).as_deref(), Some("a.log"));
        assert_eq!(normalize(root, Path::new("./a.log")).as_deref(), Some("a.log"));
        assert_eq!(
            normalize(root, Path::new("src/../lib/x.rs")).as_deref(),
            Some("lib/x.rs")
        );
        assert_eq!(normalize(root, Path::new("../a.log")), None);
        assert_eq!(normalize(root, Path::new("/abs/a.log")), None);
    }

    #[test]
    fn test_uncleaned_root() {
        let root = Path::new("/repo/sub/..");
        assert_eq!(
            normalize(root, Path::new("/repo/a.log")).as_deref(),
            Some("a.log")
        );
        assert_eq!(normalize(root, Path::new("/repo/sub")).as_deref(), Some("sub"));
    }

    #[test]
    fn test_root_itself() {
        let root = Path::new("/repo");
        assert_eq!(normalize(root, root), None);
    }
}

//! Root containment for client-supplied paths.
//!
//! This is the only gate in front of filesystem access: nothing is opened
//! or stat'ed for a request path until [`PathResolver::resolve`] accepted it.

use std::path::{Component, Path, PathBuf};

use crate::errors::ListingError;

/// Maps request paths onto absolute paths inside a fixed root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// `root` is expected to be absolute; it is normalised lexically here.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: normalize_lexically(root.as_ref()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `request` relative to the root.
    ///
    /// Leading separators are ignored, so `/a/b` and `a/b` name the same
    /// directory. An empty request resolves to the root itself. A request
    /// that normalises outside the root yields [`ListingError::Forbidden`].
    pub fn resolve(&self, request: &str) -> Result<PathBuf, ListingError> {
        let mut relative = PathBuf::new();
        for component in Path::new(request).components() {
            match component {
                Component::Prefix(_) => {
                    return Err(ListingError::Forbidden(request.to_string()));
                }
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir => relative.push(".."),
                Component::Normal(part) => relative.push(part),
            }
        }

        let candidate = normalize_lexically(&self.root.join(relative));
        if !is_within_root(&candidate, &self.root) {
            return Err(ListingError::Forbidden(request.to_string()));
        }
        Ok(candidate)
    }
}

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// `..` at the root of an absolute path stays at the root; leading `..`
/// segments of a relative path are kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Segment-aware containment: `/data` contains `/data` and `/data/x` but
/// not `/data-other`.
pub fn is_within_root(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/data")
    }

    #[test]
    fn empty_request_is_root() {
        assert_eq!(resolver().resolve("").unwrap(), PathBuf::from("/data"));
        assert_eq!(resolver().resolve("/").unwrap(), PathBuf::from("/data"));
        assert_eq!(resolver().resolve(".").unwrap(), PathBuf::from("/data"));
    }

    #[test]
    fn nested_request_resolves_inside_root() {
        assert_eq!(
            resolver().resolve("/docs/2024").unwrap(),
            PathBuf::from("/data/docs/2024")
        );
        assert_eq!(
            resolver().resolve("docs/./2024/").unwrap(),
            PathBuf::from("/data/docs/2024")
        );
    }

    #[test]
    fn parent_segments_inside_root_are_collapsed() {
        assert_eq!(
            resolver().resolve("/docs/../photos").unwrap(),
            PathBuf::from("/data/photos")
        );
        assert_eq!(resolver().resolve("/docs/..").unwrap(), PathBuf::from("/data"));
    }

    #[test]
    fn escaping_the_root_is_forbidden() {
        for request in ["/../../etc", "..", "/..", "docs/../../etc/passwd", "../data-evil"] {
            let err = resolver().resolve(request).unwrap_err();
            assert!(err.is_forbidden(), "{request} should be forbidden");
        }
    }

    #[test]
    fn sibling_prefix_is_forbidden() {
        let err = resolver().resolve("/../data-other").unwrap_err();
        assert!(matches!(err, ListingError::Forbidden(p) if p == "/../data-other"));
        assert!(!is_within_root(Path::new("/data-other"), Path::new("/data")));
        assert!(!is_within_root(Path::new("/database"), Path::new("/data")));
    }

    #[test]
    fn reentering_the_root_is_allowed() {
        assert_eq!(
            resolver().resolve("/../data/inbox").unwrap(),
            PathBuf::from("/data/inbox")
        );
    }

    #[test]
    fn root_with_trailing_segments_is_normalized() {
        let r = PathResolver::new("/srv/./data/");
        assert_eq!(r.root(), Path::new("/srv/data"));
        assert_eq!(r.resolve("x").unwrap(), PathBuf::from("/srv/data/x"));
    }

    #[test]
    fn filesystem_root_contains_everything() {
        let r = PathResolver::new("/");
        assert_eq!(r.resolve("/../etc").unwrap(), PathBuf::from("/etc"));
    }

    #[test]
    fn within_root_exact_and_child() {
        assert!(is_within_root(Path::new("/data"), Path::new("/data")));
        assert!(is_within_root(Path::new("/data/a/b"), Path::new("/data")));
        assert!(!is_within_root(Path::new("/"), Path::new("/data")));
    }

    #[test]
    fn normalize_keeps_leading_parent_of_relative_path() {
        assert_eq!(normalize_lexically(Path::new("../a/./b/..")), PathBuf::from("../a"));
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
    }
}

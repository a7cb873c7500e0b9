//! Path Key Helpers
//!
//! Keys are slash-delimited paths (`/services/svcA`). The separator is
//! fixed; a `/` inside what should be a single segment is
//! indistinguishable from a path boundary.

/// Path separator for hierarchical keys
pub const SEPARATOR: &str = "/";

/// Split a key into its non-empty path segments.
///
/// Leading, trailing, and doubled separators collapse away, so
/// `"//a//b/"` yields `["a", "b"]` and `"/"` yields an empty list.
pub fn segments(key: &str) -> Vec<&str> {
    key.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// The last path segment of a key: everything after the final separator.
///
/// A key without a separator is its own leaf name.
pub fn leaf_name(key: &str) -> &str {
    match key.rfind(SEPARATOR) {
        Some(idx) => &key[idx + SEPARATOR.len()..],
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_simple_path() {
        assert_eq!(segments("/a/b/c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_segments_collapse_empty() {
        assert_eq!(segments("//a//b/"), vec!["a", "b"]);
        assert_eq!(segments("a/b"), vec!["a", "b"]);
    }

    #[test]
    fn test_segments_root_and_empty() {
        assert!(segments("/").is_empty());
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_leaf_name() {
        assert_eq!(leaf_name("/a/b/c"), "c");
        assert_eq!(leaf_name("/top"), "top");
        assert_eq!(leaf_name("bare"), "bare");
        assert_eq!(leaf_name("/a/"), "");
    }
}

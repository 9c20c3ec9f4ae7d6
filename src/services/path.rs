//! Path helpers that map folder paths onto object-key prefixes.
//!
//! Keys use `/` as the separator. A normalized prefix never has a leading,
//! trailing or doubled slash; the bucket root is the empty string.

pub const SEPARATOR: char = '/';

/// Canonicalize a user-supplied path into a key prefix.
///
/// `"/a//b/"` becomes `"a/b"`; both `""` and `"/"` become the root `""`.
pub fn normalize(path: &str) -> String {
    path.split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Append `name` to an already normalized prefix.
pub fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Last segment of a key, `None` when the key ends in a separator.
pub fn basename(key: &str) -> Option<&str> {
    key.rsplit(SEPARATOR).next().filter(|name| !name.is_empty())
}

/// Everything before the last separator; empty for keys at the root.
pub fn dirname(key: &str) -> &str {
    key.rfind(SEPARATOR).map_or("", |pos| &key[..pos])
}

/// Number of non-empty segments.
pub fn depth(prefix: &str) -> usize {
    prefix
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .count()
}

/// The listing prefix for a normalized folder path: `a/b` lists `a/b/`.
pub fn listing_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        String::new()
    } else {
        format!("{}/", prefix)
    }
}

/// Extension of a file name, ignoring leading dots (`.env` has none).
pub fn extension(name: &str) -> Option<&str> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize("/a//b/"), "a/b");
        assert_eq!(normalize("///a///b///c"), "a/b/c");
        assert_eq!(normalize("docs"), "docs");
    }

    #[test]
    fn normalize_root_forms() {
        assert_eq!(normalize("/"), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("////"), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["", "/", "/a//b/", "a/b", "//x/", "a b/ c", "é//ü/"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn join_at_root_and_below() {
        assert_eq!(join("", "a.txt"), "a.txt");
        assert_eq!(join("docs/2025", "a.txt"), "docs/2025/a.txt");
    }

    #[test]
    fn basename_and_dirname() {
        assert_eq!(basename("docs/report.pdf"), Some("report.pdf"));
        assert_eq!(basename("report.pdf"), Some("report.pdf"));
        assert_eq!(basename("docs/"), None);
        assert_eq!(basename(""), None);
        assert_eq!(dirname("docs/2025/report.pdf"), "docs/2025");
        assert_eq!(dirname("report.pdf"), "");
    }

    #[test]
    fn depth_counts_non_empty_segments() {
        assert_eq!(depth(""), 0);
        assert_eq!(depth("a/b"), 2);
        assert_eq!(depth("a/b/c/"), 3);
    }

    #[test]
    fn extension_skips_dotfiles() {
        assert_eq!(extension("photo.PNG"), Some("PNG"));
        assert_eq!(extension("archive.tar.gz"), Some("gz"));
        assert_eq!(extension(".env"), None);
        assert_eq!(extension("README"), None);
        assert_eq!(extension("trailing."), None);
    }
}

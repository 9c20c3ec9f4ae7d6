//! Represents an entry returned by an object store listing.

use chrono::{DateTime, Utc};

/// A single stored blob as reported by the object store.
///
/// Keys have no inherent hierarchy; folders are an overlay computed from
/// `/`-separated keys. An entry whose key ends in `/` is a directory marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Object key (path-like identifier within the bucket).
    pub key: String,

    /// Size in bytes.
    pub size: u64,

    /// Timestamp when the object was last written, if the store reported one.
    pub last_modified: Option<DateTime<Utc>>,

    /// Entity tag with surrounding quotes stripped.
    pub etag: Option<String>,

    /// Content type (MIME type); listings usually omit it.
    pub content_type: Option<String>,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
            etag: None,
            content_type: None,
        }
    }

    /// True for zero-byte placeholder objects that make a folder visible.
    pub fn is_directory_marker(&self) -> bool {
        self.key.ends_with('/')
    }
}

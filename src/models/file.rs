//! Represents a file as shown to the browser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a value was read back from a real listing or synthesized by a
/// mutation without consulting the store.
///
/// Never serialized: the wire format is the same either way, but callers in
/// this crate can tell approximations apart from store-reported values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Provenance {
    /// Every field was derived from a listing entry.
    #[default]
    Listed,
    /// Some fields (size, timestamps) are placeholders until the next listing.
    Provisional,
}

/// A file inside a pseudo-folder.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    /// Last path segment of `key`.
    pub name: String,

    /// Full object key.
    pub key: String,

    /// Size in bytes. Zero for provisional rename results.
    pub size: u64,

    pub last_modified: DateTime<Utc>,

    /// Public retrieval URL (CDN base + key).
    pub url: String,

    /// Directory component of `key`, `None` at the bucket root.
    pub folder_id: Option<String>,

    #[serde(skip)]
    pub provenance: Provenance,
}

/// One page of the paged file listing.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FilePage {
    pub files: Vec<FileItem>,

    /// Percent-encoded store token; absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_continuation_token: Option<String>,

    pub is_truncated: bool,
}

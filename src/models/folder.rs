//! Represents a pseudo-folder synthesized from a key prefix.

use super::file::{FileItem, Provenance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A folder has no storage record of its own: it is either a common prefix
/// in a delimited listing or a zero-byte directory marker.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// The `/`-terminated prefix, e.g. `photos/2025/`.
    pub id: String,

    /// Last non-empty segment of `id`.
    pub name: String,

    /// Prefixes carry no creation metadata, so this is always the time the
    /// folder was projected or created, not when it first appeared.
    pub created_at: DateTime<Utc>,

    /// Parent prefix without trailing slash, `None` at the bucket root.
    pub parent_id: Option<String>,

    #[serde(skip)]
    pub provenance: Provenance,
}

/// Files and folders that are direct children of one prefix.
#[derive(Debug, Default)]
pub struct FolderListing {
    pub files: Vec<FileItem>,
    pub folders: Vec<Folder>,
}

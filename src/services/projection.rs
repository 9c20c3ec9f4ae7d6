//! Folder projection: turns flat listing entries into the files and folders
//! visible at one level of the hierarchy.
//!
//! Everything here is a pure function of the listing and the requested
//! prefix, so the view is recomputed on every request instead of cached.

use super::path;
use crate::models::{
    file::{FileItem, Provenance},
    folder::Folder,
    object::ObjectEntry,
};
use chrono::{DateTime, Utc};

/// Public URL of a key under the CDN base.
pub fn public_url(cdn_url: &str, key: &str) -> String {
    format!("{}/{}", cdn_url.trim_end_matches('/'), key)
}

/// Build a `FileItem` for a listed object.
pub fn file_item(entry: &ObjectEntry, cdn_url: &str, now: DateTime<Utc>) -> FileItem {
    let folder = path::dirname(&entry.key);
    FileItem {
        name: path::basename(&entry.key).unwrap_or_default().to_string(),
        key: entry.key.clone(),
        size: entry.size,
        last_modified: entry.last_modified.unwrap_or(now),
        url: public_url(cdn_url, &entry.key),
        folder_id: (!folder.is_empty()).then(|| folder.to_string()),
        provenance: Provenance::Listed,
    }
}

/// Files directly inside `prefix` (normalized, root is `""`).
///
/// The delimiter already keeps deeper keys out; this only drops directory
/// markers (including the folder's own marker) and anything outside the
/// requested prefix.
pub fn project_files(
    prefix: &str,
    entries: &[ObjectEntry],
    cdn_url: &str,
    now: DateTime<Utc>,
) -> Vec<FileItem> {
    let scope = path::listing_prefix(prefix);
    entries
        .iter()
        .filter(|entry| !entry.is_directory_marker())
        .filter(|entry| entry.key != scope && entry.key.starts_with(&scope))
        .map(|entry| file_item(entry, cdn_url, now))
        .collect()
}

/// Folders one level below `prefix`.
///
/// A common prefix is accepted only at depth `depth(prefix) + 1`, which
/// rejects anything a misbehaving or cached listing returns at the wrong
/// level.
pub fn project_folders(prefix: &str, common_prefixes: &[String], now: DateTime<Utc>) -> Vec<Folder> {
    let expected_depth = path::depth(prefix) + 1;
    common_prefixes
        .iter()
        .filter_map(|common| {
            let segments: Vec<&str> = common.split('/').filter(|s| !s.is_empty()).collect();
            if segments.len() != expected_depth {
                return None;
            }
            let (name, parents) = segments.split_last()?;
            Some(Folder {
                id: common.clone(),
                name: name.to_string(),
                created_at: now,
                parent_id: (!parents.is_empty()).then(|| parents.join("/")),
                provenance: Provenance::Listed,
            })
        })
        .collect()
}

//! src/services/file_service.rs
//!
//! FileService — the pseudo-folder file manager. Every operation is a short
//! sequence of object store calls; nothing is cached between requests and no
//! sequence is atomic. Where a sequence can fail half-way, the order of calls
//! is chosen so that the failure leaves data behind rather than losing it.

use super::{
    content_type,
    object_store::{ListRequest, ObjectStore, StoreError},
    path, projection,
};
use crate::models::{
    file::{FileItem, FilePage, Provenance},
    folder::{Folder, FolderListing},
    object::ObjectEntry,
    statistics::Statistics,
};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Files per page of the paged listing.
pub const PAGE_SIZE: i32 = 10;

/// Folder that quick uploads land in.
pub const QUICK_UPLOAD_FOLDER: &str = "uploads";

#[derive(Debug, Error)]
pub enum FileServiceError {
    /// Missing or malformed input; the message is shown to the caller.
    #[error("{0}")]
    Validation(&'static str),
    #[error("source key `{0}` has no file name")]
    InvalidSourceKey(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type FileServiceResult<T> = Result<T, FileServiceError>;

/// Shared across all requests; cloning only bumps reference counts.
#[derive(Clone)]
pub struct FileService {
    store: Arc<dyn ObjectStore>,
    cdn_url: Arc<str>,
}

impl FileService {
    pub fn new(store: Arc<dyn ObjectStore>, cdn_url: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            cdn_url: cdn_url.into(),
        }
    }

    /// One page of files directly inside `prefix`.
    ///
    /// Folders are never part of this view. The continuation token is handed
    /// to the store exactly as received and returned exactly as the store
    /// produced it.
    pub async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> FileServiceResult<FilePage> {
        let prefix = path::normalize(prefix);
        let request = ListRequest::delimited(path::listing_prefix(&prefix))
            .with_max_keys(PAGE_SIZE)
            .with_continuation_token(continuation_token);

        let page = self.store.list_objects(&request).await?;
        let files = projection::project_files(&prefix, &page.objects, &self.cdn_url, Utc::now());

        Ok(FilePage {
            files,
            next_continuation_token: page.next_continuation_token,
            is_truncated: page.is_truncated,
        })
    }

    /// All files and folders directly inside `prefix`.
    ///
    /// Follows continuation tokens internally until the store stops
    /// truncating, so no token is exposed.
    pub async fn list_all(&self, prefix: &str) -> FileServiceResult<FolderListing> {
        let prefix = path::normalize(prefix);
        let mut request = ListRequest::delimited(path::listing_prefix(&prefix));
        let mut objects = Vec::new();
        let mut common_prefixes = Vec::new();

        loop {
            let page = self.store.list_objects(&request).await?;
            objects.extend(page.objects);
            common_prefixes.extend(page.common_prefixes);
            match page.next_continuation_token {
                Some(token) if page.is_truncated => request.continuation_token = Some(token),
                _ => break,
            }
        }

        let now = Utc::now();
        Ok(FolderListing {
            files: projection::project_files(&prefix, &objects, &self.cdn_url, now),
            folders: projection::project_folders(&prefix, &common_prefixes, now),
        })
    }

    /// Store `data` as `filename` inside `dest_path`, replacing any object
    /// already at that key.
    pub async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        dest_path: &str,
    ) -> FileServiceResult<FileItem> {
        let folder = path::normalize(dest_path);
        let key = path::join(&folder, filename);
        let content_type = content_type::for_filename(filename);
        let size = data.len() as u64;

        self.store.put_object(&key, data, content_type).await?;
        info!(%key, size, content_type, "uploaded file");

        Ok(FileItem {
            name: filename.to_string(),
            url: projection::public_url(&self.cdn_url, &key),
            key,
            size,
            last_modified: Utc::now(),
            folder_id: (!folder.is_empty()).then_some(folder),
            provenance: Provenance::Listed,
        })
    }

    /// Drop a file under `uploads/` with a millisecond timestamp in front of
    /// its name and return its public URL. The client's content type wins
    /// over the extension table.
    pub async fn quick_upload(
        &self,
        data: Bytes,
        filename: &str,
        content_type: Option<&str>,
    ) -> FileServiceResult<String> {
        let key = format!(
            "{}/{}-{}",
            QUICK_UPLOAD_FOLDER,
            Utc::now().timestamp_millis(),
            filename
        );
        let content_type = content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or(content_type::FALLBACK);
        let size = data.len();

        self.store.put_object(&key, data, content_type).await?;
        info!(%key, size, content_type, "quick upload");

        Ok(projection::public_url(&self.cdn_url, &key))
    }

    /// Delete one file. A missing key is not an error.
    pub async fn delete(&self, key: &str) -> FileServiceResult<()> {
        self.store.delete_object(key).await?;
        info!(key, "deleted file");
        Ok(())
    }

    /// Delete every key in `keys` as one logical batch.
    ///
    /// A single key goes through the plain delete call, anything more through
    /// the quiet batch call. Keys the store could not delete individually are
    /// not reported.
    pub async fn bulk_delete(&self, keys: &[String]) -> FileServiceResult<()> {
        match keys {
            [] => return Err(FileServiceError::Validation("No files to delete")),
            [key] => self.store.delete_object(key).await?,
            _ => self.store.delete_objects(keys).await?,
        }
        info!(count = keys.len(), "deleted files");
        Ok(())
    }

    /// Copy `source_key` into `destination_path`, keeping its file name.
    /// Returns the new key.
    pub async fn copy(&self, source_key: &str, destination_path: &str) -> FileServiceResult<String> {
        let name = path::basename(source_key)
            .ok_or_else(|| FileServiceError::InvalidSourceKey(source_key.to_string()))?;
        let destination_key = path::join(&path::normalize(destination_path), name);

        self.store.copy_object(source_key, &destination_key).await?;
        info!(source_key, %destination_key, "copied file");
        Ok(destination_key)
    }

    /// Rename a file inside its folder.
    ///
    /// The copy must succeed before the delete is attempted: if the delete
    /// then fails, both keys exist and the caller can retry it. When
    /// `new_name` has no extension the old one is kept.
    ///
    /// The result is provisional: the size is reported as 0 and the
    /// timestamp is the request time until the next listing.
    pub async fn rename(&self, old_key: &str, new_name: &str) -> FileServiceResult<FileItem> {
        let folder = path::dirname(old_key);
        let name = renamed_file_name(old_key, new_name);
        let new_key = path::join(folder, &name);

        if new_key != old_key {
            self.store.copy_object(old_key, &new_key).await?;
            if let Err(err) = self.store.delete_object(old_key).await {
                warn!(old_key, %new_key, error = %err, "renamed copy written but old key not deleted");
                return Err(err.into());
            }
            info!(old_key, %new_key, "renamed file");
        } else {
            debug!(old_key, "rename to the same key skipped");
        }

        Ok(FileItem {
            name,
            url: projection::public_url(&self.cdn_url, &new_key),
            key: new_key,
            size: 0,
            last_modified: Utc::now(),
            folder_id: (!folder.is_empty()).then(|| folder.to_string()),
            provenance: Provenance::Provisional,
        })
    }

    /// Make a folder visible by writing an empty directory marker.
    pub async fn create_folder(&self, name: &str) -> FileServiceResult<Folder> {
        let folder = path::normalize(name);
        let Some((folder_name, parent)) = split_folder(&folder) else {
            return Err(FileServiceError::Validation("Folder name is required"));
        };
        let marker = path::listing_prefix(&folder);

        self.store
            .put_object(&marker, Bytes::new(), content_type::FALLBACK)
            .await?;
        info!(%marker, "created folder");

        Ok(Folder {
            name: folder_name.to_string(),
            parent_id: parent.map(str::to_string),
            id: marker,
            created_at: Utc::now(),
            provenance: Provenance::Provisional,
        })
    }

    /// Delete a folder and everything below it.
    ///
    /// Lists the whole subtree, then issues one batch delete over the result.
    /// An empty or already removed folder issues no delete at all.
    pub async fn delete_folder(&self, folder_id: &str) -> FileServiceResult<()> {
        let folder = path::normalize(folder_id);
        if folder.is_empty() {
            return Err(FileServiceError::Validation("Folder ID is required"));
        }

        let keys: Vec<String> = self
            .list_subtree(&path::listing_prefix(&folder))
            .await?
            .into_iter()
            .map(|entry| entry.key)
            .collect();

        if keys.is_empty() {
            debug!(%folder, "folder already empty");
            return Ok(());
        }

        self.bulk_delete(&keys).await?;
        info!(%folder, count = keys.len(), "deleted folder");
        Ok(())
    }

    /// File and folder counts plus total file size for the direct children of
    /// `path`. Nothing is counted recursively.
    pub async fn statistics(&self, path: &str) -> FileServiceResult<Statistics> {
        let listing = self.list_all(path).await?;

        Ok(Statistics {
            total_files: listing.files.len(),
            total_folders: listing.folders.len(),
            total_size: listing.files.iter().map(|file| file.size).sum(),
        })
    }

    /// Whether the store answers at all.
    pub async fn health(&self) -> bool {
        match self.store.probe().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "object store health probe failed");
                false
            }
        }
    }

    /// Every object under `prefix` at any depth.
    async fn list_subtree(&self, prefix: &str) -> FileServiceResult<Vec<ObjectEntry>> {
        let mut request = ListRequest::recursive(prefix);
        let mut objects = Vec::new();

        loop {
            let page = self.store.list_objects(&request).await?;
            objects.extend(page.objects);
            match page.next_continuation_token {
                Some(token) if page.is_truncated => request.continuation_token = Some(token),
                _ => break,
            }
        }

        Ok(objects)
    }
}

/// The name a renamed file ends up with, inheriting the old extension when
/// the new name has none.
fn renamed_file_name(old_key: &str, new_name: &str) -> String {
    let old_extension = path::basename(old_key).and_then(path::extension);
    match (path::extension(new_name), old_extension) {
        (None, Some(ext)) => format!("{}.{}", new_name, ext),
        _ => new_name.to_string(),
    }
}

/// Split a normalized folder path into its name and parent path.
fn split_folder(folder: &str) -> Option<(&str, Option<&str>)> {
    if folder.is_empty() {
        return None;
    }
    let parent = path::dirname(folder);
    let name = path::basename(folder)?;
    Some((name, (!parent.is_empty()).then_some(parent)))
}

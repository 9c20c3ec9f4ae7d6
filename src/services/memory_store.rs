//! src/services/memory_store.rs
//!
//! MemoryObjectStore — a process-local object store with S3 ListObjectsV2
//! listing semantics (prefix filtering, delimiter grouping, max-keys and
//! continuation tokens). Used for local development without a bucket and as
//! the store behind the test suite.

use super::object_store::{ListPage, ListRequest, ObjectStore, StoreError, StoreResult};
use crate::models::object::ObjectEntry;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::Arc,
};
use tokio::sync::RwLock;
use tracing::debug;

const MAX_OBJECT_KEY_LEN: usize = 1024;
const DEFAULT_MAX_KEYS: i32 = 1000;

#[derive(Clone, Debug)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    etag: String,
    last_modified: DateTime<Utc>,
}

impl StoredObject {
    fn new(data: Bytes, content_type: Option<String>) -> Self {
        let etag = format!("{:x}", md5::compute(&data));
        Self {
            data,
            content_type,
            etag,
            last_modified: Utc::now(),
        }
    }

    fn entry(&self, key: &str) -> ObjectEntry {
        ObjectEntry {
            key: key.to_string(),
            size: self.data.len() as u64,
            last_modified: Some(self.last_modified),
            etag: Some(self.etag.clone()),
            content_type: self.content_type.clone(),
        }
    }
}

/// Keys are kept in a `BTreeMap` so listings come back in lexicographic
/// order, as S3 returns them.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata of a single object, if present.
    #[cfg(test)]
    pub async fn object(&self, key: &str) -> Option<ObjectEntry> {
        self.objects.read().await.get(key).map(|obj| obj.entry(key))
    }

    #[cfg(test)]
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

/// Reject keys S3 would refuse.
fn ensure_key_valid(key: &str) -> StoreResult<()> {
    if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
        return Err(StoreError::Service(format!("invalid object key `{}`", key)));
    }
    Ok(())
}

/// Tokens wrap the last key handed out, so raw keys never leave the store.
fn encode_continuation_token(key: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(key)
}

fn decode_continuation_token(token: &str) -> StoreResult<String> {
    general_purpose::URL_SAFE_NO_PAD
        .decode(token)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| StoreError::Service("invalid continuation token".to_string()))
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_objects(&self, request: &ListRequest) -> StoreResult<ListPage> {
        let max_keys = request
            .max_keys
            .unwrap_or(DEFAULT_MAX_KEYS)
            .clamp(1, DEFAULT_MAX_KEYS) as usize;
        let prefix = request.prefix.as_str();
        let start = match request.continuation_token.as_deref() {
            Some(token) => Bound::Excluded(decode_continuation_token(token)?),
            None => Bound::Unbounded,
        };

        let objects = self.objects.read().await;
        let mut page = ListPage::default();
        let mut entries = 0;
        let mut last_key: Option<&str> = None;

        // Keys sharing a prefix are contiguous in sorted order.
        let candidates = objects
            .range::<String, _>((start, Bound::Unbounded))
            .skip_while(|(key, _)| key.as_str() < prefix)
            .take_while(|(key, _)| key.starts_with(prefix));

        for (key, object) in candidates {
            let common = request
                .delimiter
                .as_deref()
                .and_then(|delim| compute_common_prefix(key, prefix, delim));

            match common {
                // Further keys under the prefix we just emitted.
                Some(common) if page.common_prefixes.last() == Some(&common) => {}
                Some(common) => {
                    if entries == max_keys {
                        page.is_truncated = true;
                        break;
                    }
                    page.common_prefixes.push(common);
                    entries += 1;
                }
                None => {
                    if entries == max_keys {
                        page.is_truncated = true;
                        break;
                    }
                    page.objects.push(object.entry(key));
                    entries += 1;
                }
            }
            last_key = Some(key.as_str());
        }

        if page.is_truncated {
            page.next_continuation_token = last_key.map(encode_continuation_token);
        }

        Ok(page)
    }

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StoreResult<()> {
        ensure_key_valid(key)?;
        let object = StoredObject::new(data, Some(content_type.to_string()));
        debug!(key, size = object.data.len(), "stored object in memory");
        self.objects.write().await.insert(key.to_string(), object);
        Ok(())
    }

    async fn copy_object(&self, source_key: &str, destination_key: &str) -> StoreResult<()> {
        ensure_key_valid(destination_key)?;
        let mut objects = self.objects.write().await;
        let source = objects
            .get(source_key)
            .ok_or_else(|| StoreError::Service(format!("NoSuchKey: {}", source_key)))?;
        // A copy is a new write: fresh timestamp, same payload and type.
        let copy = StoredObject::new(source.data.clone(), source.content_type.clone());
        objects.insert(destination_key.to_string(), copy);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        if self.objects.write().await.remove(key).is_none() {
            debug!(key, "delete of missing key ignored");
        }
        Ok(())
    }

    async fn delete_objects(&self, keys: &[String]) -> StoreResult<()> {
        let mut objects = self.objects.write().await;
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    async fn probe(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Compute a synthetic "common prefix" for S3 list semantics.
///
/// Returns Some(prefix) if the key has another `delimiter` after the
/// requested prefix, otherwise None.
fn compute_common_prefix(key: &str, requested_prefix: &str, delimiter: &str) -> Option<String> {
    let after_prefix = key.strip_prefix(requested_prefix)?;
    after_prefix.find(delimiter).map(|pos| {
        let mut combined = String::from(requested_prefix);
        combined.push_str(&after_prefix[..pos + delimiter.len()]);
        combined
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with(keys: &[&str]) -> MemoryObjectStore {
        let store = MemoryObjectStore::new();
        for key in keys {
            store
                .put_object(key, Bytes::from_static(b"x"), "text/plain")
                .await
                .unwrap();
        }
        store
    }

    fn keys_of(page: &ListPage) -> Vec<&str> {
        page.objects.iter().map(|o| o.key.as_str()).collect()
    }

    #[test]
    fn common_prefix_only_one_level_down() {
        assert_eq!(
            compute_common_prefix("a/b/c/d.txt", "a/", "/"),
            Some("a/b/".to_string())
        );
        assert_eq!(compute_common_prefix("a/file.txt", "a/", "/"), None);
        assert_eq!(compute_common_prefix("b/file.txt", "a/", "/"), None);
    }

    #[tokio::test]
    async fn delimited_listing_groups_subfolders() {
        let store = store_with(&["a/1.txt", "a/b/2.txt", "a/b/c/3.txt", "a/d/", "z.txt"]).await;

        let page = store
            .list_objects(&ListRequest::delimited("a/"))
            .await
            .unwrap();

        assert_eq!(keys_of(&page), vec!["a/1.txt"]);
        assert_eq!(page.common_prefixes, vec!["a/b/", "a/d/"]);
        assert!(!page.is_truncated);
        assert!(page.next_continuation_token.is_none());
    }

    #[tokio::test]
    async fn directory_marker_is_listed_as_content_of_its_own_prefix() {
        let store = store_with(&["docs/", "docs/a.txt"]).await;

        let page = store
            .list_objects(&ListRequest::delimited("docs/"))
            .await
            .unwrap();

        assert_eq!(keys_of(&page), vec!["docs/", "docs/a.txt"]);
    }

    #[tokio::test]
    async fn recursive_listing_stays_inside_prefix() {
        let store = store_with(&["docs/a", "docs/x/y", "docs2/b", "doc"]).await;

        let page = store
            .list_objects(&ListRequest::recursive("docs/"))
            .await
            .unwrap();

        assert_eq!(keys_of(&page), vec!["docs/a", "docs/x/y"]);
    }

    #[tokio::test]
    async fn pages_resume_after_token() {
        let store = store_with(&["k1", "k2", "k3", "k4", "k5"]).await;

        let first = store
            .list_objects(&ListRequest::delimited("").with_max_keys(2))
            .await
            .unwrap();
        assert_eq!(keys_of(&first), vec!["k1", "k2"]);
        assert!(first.is_truncated);

        let mut seen = keys_of(&first)
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();
        let mut token = first.next_continuation_token.clone();
        while let Some(current) = token.take() {
            let page = store
                .list_objects(
                    &ListRequest::delimited("")
                        .with_max_keys(2)
                        .with_continuation_token(Some(current)),
                )
                .await
                .unwrap();
            seen.extend(keys_of(&page).into_iter().map(String::from));
            token = page.next_continuation_token;
        }

        assert_eq!(seen, vec!["k1", "k2", "k3", "k4", "k5"]);
    }

    #[tokio::test]
    async fn tokens_are_opaque_and_survive_percent_sequences() {
        let store = store_with(&["f0", "f1%41", "f1-x", "f2"]).await;

        let first = store
            .list_objects(&ListRequest::delimited("").with_max_keys(2))
            .await
            .unwrap();
        assert_eq!(keys_of(&first), vec!["f0", "f1%41"]);
        let token = first.next_continuation_token.clone().unwrap();
        assert!(!token.contains("f1") && !token.contains('%'));

        let second = store
            .list_objects(
                &ListRequest::delimited("")
                    .with_max_keys(2)
                    .with_continuation_token(Some(token)),
            )
            .await
            .unwrap();
        assert_eq!(keys_of(&second), vec!["f1-x", "f2"]);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let store = store_with(&["a"]).await;
        let err = store
            .list_objects(&ListRequest::delimited("").with_continuation_token(Some("%%%".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Service(_)));
    }

    #[tokio::test]
    async fn common_prefix_counts_once_towards_page_size() {
        let store = store_with(&["a/1", "a/2", "a/3", "b", "c"]).await;

        let first = store
            .list_objects(&ListRequest::delimited("").with_max_keys(2))
            .await
            .unwrap();
        assert_eq!(first.common_prefixes, vec!["a/"]);
        assert_eq!(keys_of(&first), vec!["b"]);
        assert!(first.is_truncated);

        let second = store
            .list_objects(
                &ListRequest::delimited("")
                    .with_max_keys(2)
                    .with_continuation_token(first.next_continuation_token),
            )
            .await
            .unwrap();
        assert!(second.common_prefixes.is_empty());
        assert_eq!(keys_of(&second), vec!["c"]);
        assert!(!second.is_truncated);
    }

    #[tokio::test]
    async fn copy_keeps_payload_and_type() {
        let store = MemoryObjectStore::new();
        store
            .put_object("a.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await
            .unwrap();

        store.copy_object("a.pdf", "b/a.pdf").await.unwrap();

        let copy = store.object("b/a.pdf").await.unwrap();
        assert_eq!(copy.size, 4);
        assert_eq!(copy.content_type.as_deref(), Some("application/pdf"));
        assert!(store.object("a.pdf").await.is_some());
    }

    #[tokio::test]
    async fn copy_of_missing_source_fails() {
        let store = MemoryObjectStore::new();
        let err = store.copy_object("missing", "dest").await.unwrap_err();
        assert!(matches!(err, StoreError::Service(_)));
    }

    #[tokio::test]
    async fn deletes_are_idempotent() {
        let store = store_with(&["a", "b"]).await;

        store.delete_object("missing").await.unwrap();
        store
            .delete_objects(&["a".to_string(), "nope".to_string()])
            .await
            .unwrap();

        assert_eq!(store.keys().await, vec!["b"]);
    }

    #[tokio::test]
    async fn etag_is_md5_of_payload() {
        let store = MemoryObjectStore::new();
        store
            .put_object("hello.txt", Bytes::from_static(b"hello"), "text/plain")
            .await
            .unwrap();

        let entry = store.object("hello.txt").await.unwrap();
        assert_eq!(
            entry.etag.as_deref(),
            Some("5d41402abc4b2a76b9719d911017c592")
        );
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        let store = MemoryObjectStore::new();
        assert!(store
            .put_object("", Bytes::new(), "text/plain")
            .await
            .is_err());
    }
}

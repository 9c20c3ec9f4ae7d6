//! The gateway between the file manager and a flat key/blob store.
//!
//! Implementations talk to one bucket with fixed credentials. They add no
//! retries and no hierarchy: folders are computed by the callers from
//! delimiter-grouped listings.

use crate::models::object::ObjectEntry;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Parameters of a ListObjectsV2-style call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Only keys starting with this string are returned.
    pub prefix: String,
    /// When set, keys with a further delimiter after the prefix are rolled up
    /// into common prefixes instead of being returned as objects.
    pub delimiter: Option<String>,
    /// Page size; the store's default (1000 for S3) when `None`.
    pub max_keys: Option<i32>,
    /// Opaque token from a previous page, passed back unchanged.
    pub continuation_token: Option<String>,
}

impl ListRequest {
    /// One level below `prefix`, grouped on `/`.
    pub fn delimited(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            delimiter: Some("/".into()),
            ..Self::default()
        }
    }

    /// Every key below `prefix`, at any depth.
    pub fn recursive(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_max_keys(mut self, max_keys: i32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }

    pub fn with_continuation_token(mut self, token: Option<String>) -> Self {
        self.continuation_token = token;
        self
    }
}

/// One page of listing results.
#[derive(Clone, Debug, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectEntry>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a service response.
    #[error("network error: {0}")]
    Network(String),
    /// The store answered with an error.
    #[error("service error: {0}")]
    Service(String),
    #[error("{0}")]
    General(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List keys under `request.prefix`, one page at a time.
    async fn list_objects(&self, request: &ListRequest) -> StoreResult<ListPage>;

    /// Write `data` at `key`, replacing any existing object.
    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StoreResult<()>;

    /// Server-side copy; no bytes pass through this process.
    async fn copy_object(&self, source_key: &str, destination_key: &str) -> StoreResult<()>;

    /// Delete one key. Deleting a missing key succeeds.
    async fn delete_object(&self, key: &str) -> StoreResult<()>;

    /// Batch delete in quiet mode. Per-key failures are logged, not returned;
    /// only a failed request is an error.
    async fn delete_objects(&self, keys: &[String]) -> StoreResult<()>;

    /// Cheap round trip proving the store is reachable with our credentials.
    async fn probe(&self) -> StoreResult<()>;
}

//! Test double that records gateway calls and can be told to fail.

use super::{
    memory_store::MemoryObjectStore,
    object_store::{ListPage, ListRequest, ObjectStore, StoreError, StoreResult},
};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    ListObjects(ListRequest),
    PutObject(String),
    CopyObject(String, String),
    DeleteObject(String),
    DeleteObjects(Vec<String>),
    Probe,
}

/// Wraps a `MemoryObjectStore`, logging every call before delegating.
pub struct RecordingStore {
    inner: MemoryObjectStore,
    calls: Mutex<Vec<StoreCall>>,
    fail_deletes: bool,
    unreachable: bool,
}

impl RecordingStore {
    pub fn new(inner: MemoryObjectStore) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_deletes: false,
            unreachable: false,
        }
    }

    /// Every single or batch delete fails with a network error.
    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// The health probe fails.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    async fn record(&self, call: StoreCall) {
        self.calls.lock().await.push(call);
    }

    fn delete_result(&self) -> StoreResult<()> {
        if self.fail_deletes {
            Err(StoreError::Network("injected delete failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn list_objects(&self, request: &ListRequest) -> StoreResult<ListPage> {
        self.record(StoreCall::ListObjects(request.clone())).await;
        self.inner.list_objects(request).await
    }

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StoreResult<()> {
        self.record(StoreCall::PutObject(key.to_string())).await;
        self.inner.put_object(key, data, content_type).await
    }

    async fn copy_object(&self, source_key: &str, destination_key: &str) -> StoreResult<()> {
        self.record(StoreCall::CopyObject(
            source_key.to_string(),
            destination_key.to_string(),
        ))
        .await;
        self.inner.copy_object(source_key, destination_key).await
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        self.record(StoreCall::DeleteObject(key.to_string())).await;
        self.delete_result()?;
        self.inner.delete_object(key).await
    }

    async fn delete_objects(&self, keys: &[String]) -> StoreResult<()> {
        self.record(StoreCall::DeleteObjects(keys.to_vec())).await;
        self.delete_result()?;
        self.inner.delete_objects(keys).await
    }

    async fn probe(&self) -> StoreResult<()> {
        self.record(StoreCall::Probe).await;
        if self.unreachable {
            return Err(StoreError::Network("injected probe failure".into()));
        }
        self.inner.probe().await
    }
}

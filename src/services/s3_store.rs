//! S3 gateway
//!
//! Wraps aws-sdk-s3 and implements `ObjectStore` against a single bucket.

use super::object_store::{ListPage, ListRequest, ObjectStore, StoreError, StoreResult};
use crate::{config::S3Settings, models::object::ObjectEntry};
use async_trait::async_trait;
use aws_sdk_s3::{
    error::SdkError,
    primitives::ByteStream,
    types::{Delete, ObjectIdentifier},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// DeleteObjects accepts at most this many keys per request.
const MAX_DELETE_BATCH: usize = 1000;

/// S3 client bound to one bucket
pub struct S3ObjectStore {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build the client once from static credentials.
    pub async fn new(settings: &S3Settings) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None, // session token
            None, // expiry
            "prefix-drive-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(settings.region.clone()));
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(settings.force_path_style)
            .build();

        Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
        }
    }

    /// Turn an SDK failure into a `StoreError`, keeping the service error
    /// code when the store sent one.
    fn store_error<E: std::fmt::Display>(error: SdkError<E>) -> StoreError {
        match &error {
            SdkError::ServiceError(service_err) => {
                let mut msg = service_err.err().to_string();
                if let Some(code) = service_err.raw().headers().get("x-amz-error-code") {
                    msg.push_str(&format!(" (code: {})", code));
                }
                StoreError::Service(msg)
            }
            SdkError::TimeoutError(_) => StoreError::Network("request timeout".to_string()),
            SdkError::DispatchFailure(err) => {
                StoreError::Network(format!("dispatch failure: {:?}", err))
            }
            SdkError::ResponseError(err) => {
                StoreError::Network(format!("response error: {:?}", err))
            }
            SdkError::ConstructionFailure(err) => {
                StoreError::General(format!("request construction failed: {:?}", err))
            }
            _ => StoreError::General(error.to_string()),
        }
    }

    /// One quiet DeleteObjects request.
    async fn delete_batch(&self, chunk: &[String]) -> StoreResult<()> {
        let objects = chunk
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::General(e.to_string()))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| StoreError::General(e.to_string()))?;

        let response = self
            .inner
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(Self::store_error)?;

        // Quiet mode only reports failures; they are not propagated.
        if !response.errors().is_empty() {
            let error_keys: Vec<&str> = response
                .errors()
                .iter()
                .filter_map(|e| e.key())
                .collect();
            warn!(?error_keys, "failed to delete some objects");
        }
        Ok(())
    }
}

/// `CopySource` is `bucket/key` and must be URL-encoded; separators stay.
fn copy_source(bucket: &str, key: &str) -> String {
    let encoded = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", bucket, encoded)
}

/// Send `keys` in order, at most `MAX_DELETE_BATCH` per request. The first
/// failed request stops the rest.
async fn delete_in_batches<'a, F, Fut>(keys: &'a [String], mut send: F) -> StoreResult<()>
where
    F: FnMut(&'a [String]) -> Fut,
    Fut: Future<Output = StoreResult<()>>,
{
    for chunk in keys.chunks(MAX_DELETE_BATCH) {
        send(chunk).await?;
    }
    Ok(())
}

fn to_chrono(timestamp: &aws_sdk_s3::primitives::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_objects(&self, request: &ListRequest) -> StoreResult<ListPage> {
        let response = self
            .inner
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&request.prefix)
            .set_delimiter(request.delimiter.clone())
            .set_max_keys(request.max_keys)
            .set_continuation_token(request.continuation_token.clone())
            .send()
            .await
            .map_err(Self::store_error)?;

        let objects = response
            .contents()
            .iter()
            .map(|object| {
                let size = object.size().unwrap_or(0).max(0) as u64;
                let mut entry = ObjectEntry::new(object.key().unwrap_or_default(), size);
                entry.last_modified = object.last_modified().and_then(to_chrono);
                entry.etag = object.e_tag().map(|e| e.trim_matches('"').to_string());
                entry
            })
            .collect();

        let common_prefixes = response
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect();

        Ok(ListPage {
            objects,
            common_prefixes,
            is_truncated: response.is_truncated().unwrap_or(false),
            next_continuation_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> StoreResult<()> {
        let size = data.len();
        self.inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(Self::store_error)?;

        debug!(key, size, content_type, "put object");
        Ok(())
    }

    async fn copy_object(&self, source_key: &str, destination_key: &str) -> StoreResult<()> {
        self.inner
            .copy_object()
            .copy_source(copy_source(&self.bucket, source_key))
            .bucket(&self.bucket)
            .key(destination_key)
            .send()
            .await
            .map_err(Self::store_error)?;

        debug!(source_key, destination_key, "copied object");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> StoreResult<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::store_error)?;

        Ok(())
    }

    async fn delete_objects(&self, keys: &[String]) -> StoreResult<()> {
        delete_in_batches(keys, |chunk| self.delete_batch(chunk)).await
    }

    async fn probe(&self) -> StoreResult<()> {
        self.inner
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(Self::store_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_source_encodes_segments_not_separators() {
        assert_eq!(
            copy_source("files", "docs/Q1 report+final.pdf"),
            "files/docs/Q1%20report%2Bfinal.pdf"
        );
        assert_eq!(copy_source("files", "plain.txt"), "files/plain.txt");
    }

    fn keys(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("bulk/{i:05}.bin")).collect()
    }

    #[tokio::test]
    async fn batches_split_at_the_request_limit() {
        let keys = keys(MAX_DELETE_BATCH + 1);
        let mut sent: Vec<Vec<String>> = Vec::new();

        delete_in_batches(&keys, |chunk| {
            sent.push(chunk.to_vec());
            async { Ok(()) }
        })
        .await
        .unwrap();

        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].len(), MAX_DELETE_BATCH);
        assert_eq!(sent[1], vec!["bulk/01000.bin".to_string()]);
        assert_eq!(sent.concat(), keys);
    }

    #[tokio::test]
    async fn failed_batch_stops_the_rest() {
        let keys = keys(MAX_DELETE_BATCH + 1);
        let mut attempts = 0;

        let err = delete_in_batches(&keys, |_| {
            attempts += 1;
            async { Err(StoreError::Network("connection reset".into())) }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, StoreError::Network(_)));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn empty_key_list_sends_nothing() {
        let mut attempts = 0;
        delete_in_batches(&[], |_| {
            attempts += 1;
            async { Ok(()) }
        })
        .await
        .unwrap();
        assert_eq!(attempts, 0);
    }

    #[test]
    fn timestamps_convert_to_chrono() {
        let ts = aws_sdk_s3::primitives::DateTime::from_secs(1_700_000_000);
        let converted = to_chrono(&ts).unwrap();
        assert_eq!(converted.timestamp(), 1_700_000_000);
    }
}

//! HTTP handlers for file operations.
//! Delegates storage concerns to `FileService`.

use super::{MessageResponse, json_body, non_empty};
use crate::{
    errors::AppError,
    models::file::{FileItem, FilePage},
    services::file_service::FileService,
};
use axum::{
    Json,
    extract::{Multipart, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query params accepted by the paged file listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesQuery {
    pub continuation_token: Option<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFileReq {
    pub key: Option<String>,
}

/// `keys` stays untyped so a non-array answers 400 with our own message.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteReq {
    pub keys: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyFileReq {
    pub source_key: Option<String>,
    pub destination_path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyFileResp {
    pub success: bool,
    pub message: &'static str,
    pub destination_key: String,
}

#[derive(Debug, Serialize)]
pub struct QuickUploadResp {
    pub message: &'static str,
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFileReq {
    pub old_key: Option<String>,
    pub new_name: Option<String>,
}

/// GET `/api/files` — one page of files, ?prefix=&continuationToken=
pub async fn list_files(
    State(service): State<FileService>,
    Query(q): Query<ListFilesQuery>,
) -> Result<Json<FilePage>, AppError> {
    let prefix = q.prefix.unwrap_or_default();
    // Query has already undone the percent-encoding applied on the way out.
    let token = non_empty(q.continuation_token);

    let mut page = service
        .list_page(&prefix, token)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to list files"))?;
    page.next_continuation_token = page
        .next_continuation_token
        .as_deref()
        .map(encode_continuation_token);

    Ok(Json(page))
}

/// POST `/api/files/upload` — multipart form with `file` and `path`.
pub async fn upload_file(
    State(service): State<FileService>,
    mut multipart: Multipart,
) -> Result<Json<FileItem>, AppError> {
    let mut upload: Option<(String, Bytes)> = None;
    let mut path = String::from("/");

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                if let Some(filename) = non_empty(filename) {
                    upload = Some((filename, data));
                }
            }
            Some("path") => path = field.text().await.map_err(multipart_error)?,
            _ => {}
        }
    }

    let Some((filename, data)) = upload else {
        return Err(AppError::bad_request("No file provided"));
    };

    let item = service
        .upload(data, &filename, &path)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to upload file"))?;
    Ok(Json(item))
}

/// POST `/api/upload` — multipart form with `file` only, stored under
/// `uploads/`. Errors use `{message}` rather than `{error}`.
pub async fn quick_upload(
    State(service): State<FileService>,
    mut multipart: Multipart,
) -> Result<Json<QuickUploadResp>, (StatusCode, Json<MessageResponse>)> {
    let failed = |err: &dyn std::fmt::Display| {
        tracing::error!(error = %err, "quick upload failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            MessageResponse::new("Upload failed"),
        )
    };

    let mut upload: Option<(String, Option<String>, Bytes)> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| failed(&e))? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| failed(&e))?;
        if let Some(filename) = non_empty(filename) {
            upload = Some((filename, content_type, data));
        }
    }

    let Some((filename, content_type, data)) = upload else {
        return Err((
            StatusCode::BAD_REQUEST,
            MessageResponse::new("No file uploaded"),
        ));
    };

    let url = service
        .quick_upload(data, &filename, content_type.as_deref())
        .await
        .map_err(|e| failed(&e))?;

    Ok(Json(QuickUploadResp {
        message: "Upload successful",
        url,
    }))
}

/// POST `/api/files/delete` — `{key}`
pub async fn delete_file(
    State(service): State<FileService>,
    payload: Result<Json<DeleteFileReq>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    const REQUIRED: &str = "File key is required";
    let req = json_body(payload, REQUIRED)?;
    let key = non_empty(req.key).ok_or_else(|| AppError::bad_request(REQUIRED))?;

    service
        .delete(&key)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to delete file"))?;
    Ok(MessageResponse::new("File deleted successfully"))
}

/// POST `/api/files/bulk-delete` — `{keys: [...]}`, at least one key.
pub async fn bulk_delete_files(
    State(service): State<FileService>,
    payload: Result<Json<BulkDeleteReq>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    const NO_FILES: &str = "No files to delete";
    let req = json_body(payload, NO_FILES)?;
    let keys = req
        .keys
        .and_then(string_array)
        .filter(|keys| !keys.is_empty())
        .ok_or_else(|| AppError::bad_request(NO_FILES))?;

    service
        .bulk_delete(&keys)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to delete files"))?;
    Ok(MessageResponse::new("Files deleted successfully"))
}

/// POST `/api/files/copy` — `{sourceKey, destinationPath}`
pub async fn copy_file(
    State(service): State<FileService>,
    payload: Result<Json<CopyFileReq>, JsonRejection>,
) -> Result<Json<CopyFileResp>, AppError> {
    const REQUIRED: &str = "Source key is required";
    let req = json_body(payload, REQUIRED)?;
    let source_key = non_empty(req.source_key).ok_or_else(|| AppError::bad_request(REQUIRED))?;
    let destination = req.destination_path.unwrap_or_else(|| "/".into());

    let destination_key = service
        .copy(&source_key, &destination)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to copy file"))?;

    Ok(Json(CopyFileResp {
        success: true,
        message: "File copied successfully",
        destination_key,
    }))
}

/// POST `/api/files/rename` — `{oldKey, newName}`
pub async fn rename_file(
    State(service): State<FileService>,
    payload: Result<Json<RenameFileReq>, JsonRejection>,
) -> Result<Json<FileItem>, AppError> {
    const REQUIRED: &str = "Old key and new name are required";
    let req = json_body(payload, REQUIRED)?;
    let (Some(old_key), Some(new_name)) = (non_empty(req.old_key), non_empty(req.new_name)) else {
        return Err(AppError::bad_request(REQUIRED));
    };

    let item = service
        .rename(&old_key, &new_name)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to rename file"))?;
    Ok(Json(item))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    tracing::debug!(error = %err, "rejected multipart upload");
    AppError::new(err.status(), err.body_text())
}

/// Accept only a JSON array made entirely of strings.
fn string_array(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

/// Store tokens are opaque; they only get percent-encoded so they can be
/// placed in a query string as-is.
fn encode_continuation_token(token: &str) -> String {
    urlencoding::encode(token).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn continuation_tokens_are_query_safe() {
        for token in ["plain", "1/ab+cd==", "docs/a b&c.txt", "ünïcode%41"] {
            let encoded = encode_continuation_token(token);
            assert!(!encoded.contains(['/', '+', '&', ' ']));
            // What the query extractor hands back: one decode, no more.
            assert_eq!(urlencoding::decode(&encoded).unwrap(), token);
        }
    }

    #[test]
    fn string_array_accepts_only_strings() {
        assert_eq!(
            string_array(json!(["a", "b"])),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(string_array(json!([])), Some(vec![]));
        assert_eq!(string_array(json!(["a", 1])), None);
        assert_eq!(string_array(json!("a")), None);
    }
}

//! HTTP handlers for pseudo-folders.

use super::{MessageResponse, json_body, non_empty};
use crate::{errors::AppError, models::folder::Folder, services::file_service::FileService};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListFoldersQuery {
    pub prefix: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderReq {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderReq {
    pub folder_id: Option<String>,
}

/// GET `/api/folders` — direct subfolders of ?prefix=, unpaged.
pub async fn list_folders(
    State(service): State<FileService>,
    Query(q): Query<ListFoldersQuery>,
) -> Result<Json<Vec<Folder>>, AppError> {
    let listing = service
        .list_all(q.prefix.as_deref().unwrap_or_default())
        .await
        .map_err(|e| AppError::from_service(e, "Failed to list folders"))?;

    Ok(Json(listing.folders))
}

/// POST `/api/folders` — `{name}`, where name may be a nested path.
pub async fn create_folder(
    State(service): State<FileService>,
    payload: Result<Json<CreateFolderReq>, JsonRejection>,
) -> Result<Json<Folder>, AppError> {
    const REQUIRED: &str = "Folder name is required";
    let req = json_body(payload, REQUIRED)?;
    let name = non_empty(req.name).ok_or_else(|| AppError::bad_request(REQUIRED))?;

    let folder = service
        .create_folder(&name)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to create folder"))?;
    Ok(Json(folder))
}

/// POST `/api/folders/delete` — `{folderId}`; removes the whole subtree.
pub async fn delete_folder(
    State(service): State<FileService>,
    payload: Result<Json<DeleteFolderReq>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    const REQUIRED: &str = "Folder ID is required";
    let req = json_body(payload, REQUIRED)?;
    let folder_id = non_empty(req.folder_id).ok_or_else(|| AppError::bad_request(REQUIRED))?;

    service
        .delete_folder(&folder_id)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to delete folder"))?;
    Ok(MessageResponse::new("Folder deleted successfully"))
}

//! Defines routes for the file manager's JSON API.
//!
//! ## Structure
//! - **Files**
//!   - `GET  /api/files`              — paged listing (10 per page)
//!   - `POST /api/files/upload`       — multipart upload
//!   - `POST /api/files/delete`       — delete one file
//!   - `POST /api/files/bulk-delete`  — delete many files
//!   - `POST /api/files/copy`         — copy into another folder
//!   - `POST /api/files/rename`       — rename inside the same folder
//!   - `POST /api/upload`             — quick upload into `uploads/`
//!
//! - **Folders**
//!   - `GET  /api/folders`            — direct subfolders, unpaged
//!   - `POST /api/folders`            — create (directory marker)
//!   - `POST /api/folders/delete`     — delete recursively
//!
//! - **Other**
//!   - `GET  /api/statistics`         — counts and total size
//!   - `GET  /api/health`             — store connectivity
//!   - `GET  /healthz`                — liveness

use crate::{
    handlers::{
        file_handlers::{
            bulk_delete_files, copy_file, delete_file, list_files, quick_upload, rename_file,
            upload_file,
        },
        folder_handlers::{create_folder, delete_folder, list_folders},
        health_handlers::{health, healthz},
        statistics_handlers::get_statistics,
    },
    services::file_service::FileService,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for every endpoint.
///
/// The router carries shared state (`FileService`) to all handlers.
pub fn routes() -> Router<FileService> {
    Router::new()
        // liveness (mounted at root)
        .route("/healthz", get(healthz))
        // Files
        .route("/api/files", get(list_files))
        .route("/api/files/upload", post(upload_file))
        .route("/api/files/delete", post(delete_file))
        .route("/api/files/bulk-delete", post(bulk_delete_files))
        .route("/api/files/copy", post(copy_file))
        .route("/api/files/rename", post(rename_file))
        .route("/api/upload", post(quick_upload))
        // Folders
        .route("/api/folders", get(list_folders).post(create_folder))
        .route("/api/folders/delete", post(delete_folder))
        // Statistics & health
        .route("/api/statistics", get(get_statistics))
        .route("/api/health", get(health))
}

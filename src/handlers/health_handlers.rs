//! Health handlers.
//!
//! - GET /healthz     -> simple liveness ("ok")
//! - GET /api/health  -> store connectivity ("ok" or "error")

use crate::services::file_service::FileService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /healthz`
///
/// Liveness probe; always 200 and never touches the store.
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// `GET /api/health`
///
/// Probes the object store. HTTP 200 with `ok` when it answers, HTTP 500
/// with `error` otherwise.
pub async fn health(State(service): State<FileService>) -> impl IntoResponse {
    if service.health().await {
        (StatusCode::OK, Json(HealthResponse { status: "ok" }))
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(HealthResponse { status: "error" }),
        )
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

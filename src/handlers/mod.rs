//! HTTP handlers. Each one validates its input, calls `FileService` and maps
//! failures onto the fixed per-operation messages of the JSON contract.

pub mod file_handlers;
pub mod folder_handlers;
pub mod health_handlers;
pub mod statistics_handlers;

use crate::errors::AppError;
use axum::{Json, extract::rejection::JsonRejection};
use serde::Serialize;

/// `{"message": ...}` acknowledgement for mutations without a payload.
#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

/// Unwrap a JSON body, turning any rejection (bad syntax, wrong content
/// type, wrong shape) into a 400 with the operation's validation message.
pub(crate) fn json_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    invalid: &'static str,
) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(%rejection, "rejected request body");
        AppError::bad_request(invalid)
    })
}

/// Treat absent and empty strings alike.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

use crate::{errors::AppError, models::statistics::Statistics, services::file_service::FileService};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StatisticsQuery {
    pub path: Option<String>,
}

/// GET `/api/statistics` — counts for ?path= (default `/`).
pub async fn get_statistics(
    State(service): State<FileService>,
    Query(q): Query<StatisticsQuery>,
) -> Result<Json<Statistics>, AppError> {
    let path = q.path.unwrap_or_else(|| "/".into());
    let stats = service
        .statistics(&path)
        .await
        .map_err(|e| AppError::from_service(e, "Failed to fetch statistics"))?;

    Ok(Json(stats))
}

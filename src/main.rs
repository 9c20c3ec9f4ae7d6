use anyhow::Result;
use axum::{Router, extract::DefaultBodyLimit};
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

use config::{AppConfig, Backend};
use services::{
    file_service::FileService, memory_store::MemoryObjectStore, object_store::ObjectStore,
    s3_store::S3ObjectStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = AppConfig::from_env_and_args()?;

    tracing::info!("Starting prefix-drive with config: {:?}", cfg);

    // --- Initialize object store (one client per process) ---
    let store: Arc<dyn ObjectStore> = match (cfg.backend, &cfg.s3) {
        (Backend::S3, Some(settings)) => {
            tracing::info!(bucket = %settings.bucket, "using S3 backend");
            Arc::new(S3ObjectStore::new(settings).await)
        }
        (Backend::S3, None) => anyhow::bail!("s3 backend selected without S3 settings"),
        (Backend::Memory, _) => {
            tracing::warn!("using in-memory backend; files are lost on exit");
            Arc::new(MemoryObjectStore::new())
        }
    };

    // --- Initialize core service ---
    let service = FileService::new(store, cfg.cdn_url.as_str());
    if !service.health().await {
        tracing::warn!("object store is not reachable yet; serving anyway");
    }

    // --- Build router ---
    let app: Router = routes::routes::routes()
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

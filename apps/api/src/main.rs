//! Campus API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;

use campus_core::AppError;
use tracing::info;

use crate::api_config::{ApiConfig, StorageBackendConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        match &config.storage_backend {
            StorageBackendConfig::Postgres { database_url } => {
                api_services::connect_and_migrate(database_url).await?;
                info!("database migrations applied successfully");
            }
            StorageBackendConfig::Memory => {
                info!("in-memory storage has no migrations to apply");
            }
        }
        return Ok(());
    }

    let app_state = api_services::build_from_config(&config).await?;
    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "campus-api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

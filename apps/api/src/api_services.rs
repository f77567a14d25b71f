use std::sync::Arc;

use campus_application::{
    AuthService, AuthorizationService, BootstrapService, EntityRegistry, EntityRepository,
    EntityService, PasswordHasher, TestJobDispatcher, TestRunService,
};
use campus_core::AppError;
use campus_infrastructure::{
    Argon2PasswordHasher, ConsoleTestJobDispatcher, HttpTestJobDispatcher,
    InMemoryEntityRepository, MIGRATOR, PostgresEntityRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api_config::{
    ApiConfig, BootstrapAdminConfig, JobDispatcherConfig, StorageBackendConfig,
};
use crate::state::AppState;

pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    MIGRATOR
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}

async fn build_repository(
    storage_backend: &StorageBackendConfig,
) -> Result<Arc<dyn EntityRepository>, AppError> {
    match storage_backend {
        StorageBackendConfig::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            Ok(Arc::new(PostgresEntityRepository::new(pool)))
        }
        StorageBackendConfig::Memory => {
            info!("using the in-memory entity store; rows are lost on restart");
            Ok(Arc::new(InMemoryEntityRepository::new()))
        }
    }
}

fn build_dispatcher(config: &JobDispatcherConfig) -> Result<Arc<dyn TestJobDispatcher>, AppError> {
    match config {
        JobDispatcherConfig::Console => Ok(Arc::new(ConsoleTestJobDispatcher::new())),
        JobDispatcherConfig::Http { queue_url, timeout } => {
            let http_client = reqwest::Client::builder()
                .timeout(*timeout)
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build job queue client: {error}"))
                })?;
            Ok(Arc::new(HttpTestJobDispatcher::new(
                http_client,
                queue_url.as_str(),
            )))
        }
    }
}

/// Wires services over one repository and seeds the rows every deployment needs.
pub async fn build_app_state(
    repository: Arc<dyn EntityRepository>,
    dispatcher: Arc<dyn TestJobDispatcher>,
    password_hasher: Arc<dyn PasswordHasher>,
    bootstrap_admin: Option<&BootstrapAdminConfig>,
) -> Result<AppState, AppError> {
    let registry = Arc::new(EntityRegistry::new()?);
    let authorization_service = AuthorizationService::new(registry);

    let bootstrap_service = BootstrapService::new(repository.clone(), password_hasher.clone());
    bootstrap_service.seed_builtin_roles().await?;
    if let Some(admin) = bootstrap_admin {
        let user_id = bootstrap_service
            .ensure_admin(admin.username.as_str(), admin.password.as_str())
            .await?;
        info!(%user_id, username = %admin.username, "bootstrap admin ensured");
    }

    let entity_service = EntityService::new(authorization_service.clone(), repository.clone());
    let auth_service = AuthService::new(authorization_service, repository, password_hasher);
    let test_run_service = TestRunService::new(entity_service.clone(), dispatcher);

    Ok(AppState {
        entity_service,
        auth_service,
        test_run_service,
    })
}

/// Builds the state for a configured deployment.
pub async fn build_from_config(config: &ApiConfig) -> Result<AppState, AppError> {
    let repository = build_repository(&config.storage_backend).await?;
    let dispatcher = build_dispatcher(&config.job_dispatcher)?;

    build_app_state(
        repository,
        dispatcher,
        Arc::new(Argon2PasswordHasher::with_cost(config.password_hash_cost)?),
        config.bootstrap_admin.as_ref(),
    )
    .await
}

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use campus_core::AppError;
use campus_infrastructure::HashCost;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Where entity rows are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendConfig {
    Postgres { database_url: String },
    Memory,
}

/// Where test jobs are handed off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDispatcherConfig {
    Console,
    Http { queue_url: Url, timeout: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub storage_backend: StorageBackendConfig,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub job_dispatcher: JobDispatcherConfig,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
    pub password_hash_cost: HashCost,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(env::args().nth(1).as_deref() == Some("migrate"), |name| {
            env::var(name).ok()
        })
    }

    fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let storage_backend = match lookup("STORAGE_BACKEND")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => StorageBackendConfig::Postgres {
                database_url: required_non_empty(&lookup, "DATABASE_URL")?,
            },
            "memory" => StorageBackendConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "STORAGE_BACKEND must be either 'postgres' or 'memory', got '{other}'"
                )));
            }
        };

        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = match lookup("API_PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))?,
            None => 3001,
        };

        let job_dispatcher = match lookup("JOB_DISPATCHER")
            .unwrap_or_else(|| "console".to_owned())
            .as_str()
        {
            "console" => JobDispatcherConfig::Console,
            "http" => {
                let queue_url = Url::parse(&required_non_empty(&lookup, "JOB_QUEUE_URL")?)
                    .map_err(|error| {
                        AppError::Validation(format!("invalid JOB_QUEUE_URL: {error}"))
                    })?;
                let timeout_secs = match lookup("JOB_QUEUE_TIMEOUT_SECS") {
                    Some(value) => value.parse::<u64>().map_err(|error| {
                        AppError::Validation(format!("invalid JOB_QUEUE_TIMEOUT_SECS: {error}"))
                    })?,
                    None => 10,
                };
                JobDispatcherConfig::Http {
                    queue_url,
                    timeout: Duration::from_secs(timeout_secs.max(1)),
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "JOB_DISPATCHER must be either 'console' or 'http', got '{other}'"
                )));
            }
        };

        let bootstrap_admin = match (
            lookup("BOOTSTRAP_ADMIN_USERNAME"),
            lookup("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdminConfig { username, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "BOOTSTRAP_ADMIN_USERNAME and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .to_owned(),
                ));
            }
        };

        let default_cost = HashCost::default();
        let password_hash_cost = HashCost {
            memory_kib: parse_u32(&lookup, "ARGON2_MEMORY_KIB", default_cost.memory_kib)?,
            iterations: parse_u32(&lookup, "ARGON2_ITERATIONS", default_cost.iterations)?,
            lanes: parse_u32(&lookup, "ARGON2_LANES", default_cost.lanes)?,
        };

        Ok(Self {
            migrate_only,
            storage_backend,
            frontend_url,
            api_host,
            api_port,
            job_dispatcher,
            bootstrap_admin,
            password_hash_cost,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_u32(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u32,
) -> Result<u32, AppError> {
    match lookup(name) {
        Some(value) => value
            .parse::<u32>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(AppError::Validation(format!("{name} must not be empty"))),
        None => Err(AppError::Validation(format!("{name} is required"))),
    }
}

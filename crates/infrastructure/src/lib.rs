//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod console_test_job_dispatcher;
mod http_test_job_dispatcher;
mod in_memory_entity_repository;
mod postgres_entity_repository;

pub use argon2_password_hasher::{Argon2PasswordHasher, HashCost};
pub use console_test_job_dispatcher::ConsoleTestJobDispatcher;
pub use http_test_job_dispatcher::HttpTestJobDispatcher;
pub use in_memory_entity_repository::InMemoryEntityRepository;
pub use postgres_entity_repository::PostgresEntityRepository;

/// Embedded SQL migrations for the entity tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

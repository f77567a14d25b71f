pub mod auth;
pub mod entities;
pub mod health;
pub mod test_runs;

//! # Menu Infrastructure
//! 
//! PostgreSQL store adapter, connection bootstrap, and schema migrations.

pub mod database;

pub use database::{connect_with_retry, create_pool, run_migrations, ConnectError, PgMenuStore};

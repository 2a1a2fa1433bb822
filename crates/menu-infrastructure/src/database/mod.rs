//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod postgres;

pub use connection::{backoff_delay, connect_with_retry, create_pool, retry_with_backoff, run_migrations, ConnectError};
pub use postgres::PgMenuStore;

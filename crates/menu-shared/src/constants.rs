//! Application-wide constants

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_APP_NAME: &str = "menu-server";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 25;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;
pub const DEFAULT_MAX_LIFETIME_SECS: u64 = 300;
pub const DEFAULT_CONNECT_RETRIES: u32 = 6;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
pub const MAX_RETRY_DELAY_MS: u64 = 30_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 10_000;

//! Database connection pool

use std::future::Future;
use std::time::Duration;

use menu_shared::config::DatabaseSettings;
use menu_shared::constants::MAX_RETRY_DELAY_MS;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("could not connect to database after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout())
        .max_lifetime(settings.max_lifetime())
        .connect(&settings.url)
        .await?;

    // Test connection
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

/// Delay before retry number `attempt` (zero-based): doubles each time,
/// capped at `MAX_RETRY_DELAY_MS`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
        .min(Duration::from_millis(MAX_RETRY_DELAY_MS))
}

/// Run `op` up to `attempts` times, sleeping with exponential backoff between
/// failures. Returns the last error once attempts are exhausted.
pub async fn retry_with_backoff<T, E, F, Fut>(
    attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, (u32, E)>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 < attempts => {
                let delay = backoff_delay(base_delay, attempt);
                warn!(
                    "db connect attempt {} failed: {} - retrying in {:?}",
                    attempt + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!("db connect attempt {} failed: {} - giving up", attempt + 1, e);
                return Err((attempt + 1, e));
            }
        }
    }
}

pub async fn connect_with_retry(settings: &DatabaseSettings) -> Result<PgPool, ConnectError> {
    let pool = retry_with_backoff(settings.connect_retries, settings.retry_delay(), |_| {
        create_pool(settings)
    })
    .await
    .map_err(|(attempts, source)| ConnectError::Exhausted { attempts, source })?;

    info!("Database connection established.");
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), ConnectError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles_and_caps() {
        let base = Duration::from_millis(2000);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(2000));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(4000));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(8000));
        assert_eq!(backoff_delay(base, 10), Duration::from_millis(MAX_RETRY_DELAY_MS));
        assert_eq!(backoff_delay(base, 40), Duration::from_millis(MAX_RETRY_DELAY_MS));
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, (u32, String)> =
            retry_with_backoff(6, Duration::from_millis(1), |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(format!("refused #{attempt}"))
                    } else {
                        Ok("connected")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "connected");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_with_last_error() {
        let result: Result<(), (u32, String)> =
            retry_with_backoff(3, Duration::from_millis(1), |attempt| async move {
                Err(format!("refused #{attempt}"))
            })
            .await;

        let (attempts, last) = result.unwrap_err();
        assert_eq!(attempts, 3);
        assert_eq!(last, "refused #2");
    }
}

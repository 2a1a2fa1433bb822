use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;

use menu_api::{build_router, AppState};
use menu_core::{InMemoryMenuStore, MenuStore};
use menu_infrastructure::{connect_with_retry, run_migrations, PgMenuStore};
use menu_shared::config::{AppConfig, DatabaseBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize telemetry; the guard flushes buffered logs on exit
    let _log_guard = menu_shared::telemetry::init_telemetry(&config.log);

    info!("{} starting (env: {})...", config.app.name, config.app.env);

    let store = open_store(&config).await?;

    let state = AppState::new(store, config.clone());
    let app = build_router(state);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MenuStore>> {
    match config.database.backend {
        DatabaseBackend::Memory => {
            info!("Using in-memory menu store.");
            Ok(Arc::new(InMemoryMenuStore::new()))
        }
        DatabaseBackend::Postgres => {
            info!(
                "Connecting to database (up to {} attempts)...",
                config.database.connect_retries
            );
            let pool = connect_with_retry(&config.database).await?;
            if config.database.run_migrations {
                run_migrations(&pool).await?;
            }
            Ok(Arc::new(PgMenuStore::new(pool)))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

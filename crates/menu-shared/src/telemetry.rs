//! Telemetry setup

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LogSettings};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// The returned guard flushes the non-blocking writer on drop and must be
/// held for the lifetime of the process.
pub fn init_telemetry(settings: &LogSettings) -> WorkerGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let registry = tracing_subscriber::registry().with(env_filter);
    match settings.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(writer))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(writer))
            .init(),
    }

    guard
}

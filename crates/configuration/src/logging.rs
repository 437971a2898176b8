use crate::error::ConfigError;
use crate::settings::Settings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global tracing subscriber.
///
/// Logs go to stderr so they never mix with report output on stdout. When
/// `log_dir` is configured, a second, ANSI-free layer writes to a daily-rolling
/// file. `RUST_LOG` takes precedence over `Settings::log_level`.
///
/// The returned guard must be held for the lifetime of the program, otherwise
/// buffered file output is lost.
pub fn init_tracing(settings: &Settings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match &settings.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "varant.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    Ok(guard)
}

use once_cell::sync::OnceCell;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::filter::Directive;

use crate::config::{ConfigError, ConfigErrorCode, ConfigResult, LoggingConfig};

static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Installs the global file logger. Returns the log directory in use.
///
/// `RUST_LOG` still wins over the configured default directive. Calling this
/// twice fails because a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> ConfigResult<PathBuf> {
    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir).map_err(|e| {
        ConfigError::from_io_error(format!("Failed to create log dir {:?}", log_dir), e)
    })?;
    let directive = config.default_directive.parse::<Directive>().map_err(|e| {
        ConfigError::new(
            ConfigErrorCode::InvalidValue,
            format!("Invalid log directive {:?}: {e}", config.default_directive),
        )
    })?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &config.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_ansi(false)
        .with_writer(non_blocking);
    subscriber.try_init().map_err(|e| {
        ConfigError::new(
            ConfigErrorCode::LoggingUnavailable,
            format!("Failed to init tracing subscriber: {e}"),
        )
    })?;
    let _ = GUARD.set(guard);

    debug!(log_dir = ?log_dir, "logging initialized");
    Ok(log_dir)
}

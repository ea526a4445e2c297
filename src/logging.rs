use std::path::Path;

use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{Builder, InitError, RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::AppConfig;

const LOG_FILE_PREFIX: &str = "log";
const LOG_FILE_SUFFIX: &str = "txt";
const RETAINED_LOG_FILES: usize = 10;

/// One JSON file per day, the last ten kept.
pub fn rolling_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    Builder::new()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(RETAINED_LOG_FILES)
        .build(dir)
}

/// Console output always, JSON lines to the rolling files under `log_dir` when
/// one is configured. Keep the returned guard alive: dropping it flushes and
/// stops the file writer.
pub fn init_logging(config: &AppConfig) -> Result<Option<WorkerGuard>, InitError> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(rolling_appender(dir)?);
            (Some(fmt::layer().json().with_writer(writer).boxed()), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    tracing::info!(
        environment = ?config.environment,
        log_dir = ?config.log_dir,
        "Logging initialized"
    );
    Ok(guard)
}

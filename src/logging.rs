use std::path::PathBuf;

use anyhow::Context;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};

use crate::config;

/// Start file logging. The returned handle must stay alive until exit so the
/// file writer gets flushed.
pub fn init_logging() -> anyhow::Result<LoggerHandle> {
    let log_dir = log_dir()?;
    let spec = config::env_non_empty(config::env::LOG_SPEC)
        .unwrap_or_else(|| config::logging::DEFAULT_LOG_SPEC.to_string());

    // stdout carries the vector and stderr the one-line error, so nothing is
    // duplicated to the terminal.
    let handle = Logger::try_with_str(&spec)
        .with_context(|| format!("invalid log spec {spec:?}"))?
        .log_to_file(FileSpec::default().directory(&log_dir).basename(config::logging::LOG_FILE_NAME))
        .rotate(
            Criterion::Size(config::logging::LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config::logging::LOG_ROTATE_KEEP_FILES),
        )
        .duplicate_to_stderr(Duplicate::None)
        .format(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;

    log::info!("{}", "=".repeat(60));
    log::info!("generate_vectors starting");
    log::info!("Version: {}", config::VERSION);
    log::info!("Platform: {}", std::env::consts::OS);
    log::info!("Log dir: {}", log_dir.display());
    log::info!("{}", "=".repeat(60));

    Ok(handle)
}

fn log_dir() -> anyhow::Result<PathBuf> {
    let dir = match config::env_non_empty(config::env::LOG_DIR) {
        Some(v) => PathBuf::from(v),
        None => config::home_dir()
            .context("cannot determine home directory for logs")?
            .join(config::logging::LOG_DIR_REL),
    };
    std::fs::create_dir_all(&dir).with_context(|| format!("failed creating log dir {}", dir.display()))?;
    Ok(dir)
}

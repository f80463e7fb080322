//! Logging setup: stderr always, plus an optional log file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global subscriber. `RUST_LOG` refines the INFO default.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the whole run.
pub fn setup_logging(log_to_file: bool) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = if log_to_file {
        let log_dir = log_dir();
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let file_appender = tracing_appender::rolling::daily(&log_dir, "advisor.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_file)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if log_to_file {
        tracing::debug!("Log file directory: {}", log_dir().display());
    }
    Ok(guard)
}

/// Platform cache dir, e.g. `~/.cache/build-advisor/logs` on Linux.
fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "build-advisor")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("build-advisor").join("logs"))
}

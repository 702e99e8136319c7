use crate::{config::LoggingConfig, paths::AppDirs};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

/// Keeps the non-blocking log worker alive; dropping it flushes the file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Install the global subscriber: a daily-rolling file under the app's log
/// directory, mirrored to stdout when the config asks for it. `RUST_LOG`
/// overrides the configured level.
pub fn init_logging(config: &LoggingConfig, dirs: &AppDirs) -> Result<LoggingGuard, LoggingError> {
    let log_dir = dirs.log_dir().to_path_buf();
    fs::create_dir_all(&log_dir).map_err(|source| LoggingError::CreateDirectory {
        path: log_dir.clone(),
        source,
    })?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter_directive()));

    match prune_log_files(&log_dir, config.file_stem(), config.max_log_files.max(1)) {
        Ok(removed) if removed > 0 => tracing::debug!(removed, "pruned old log files"),
        Ok(_) => {}
        Err(err) => tracing::warn!(error = %err, "log pruning failed"),
    }

    let appender = tracing_appender::rolling::daily(&log_dir, config.file_stem());
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let writer = if config.stdout {
        BoxMakeWriter::new(
            std::io::stdout
                .with_max_level(tracing::Level::TRACE)
                .and(file_writer),
        )
    } else {
        BoxMakeWriter::new(file_writer)
    };

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(config.stdout)
        .with_writer(writer)
        .try_init()
        .map_err(LoggingError::SubscriberInstall)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Delete the oldest rolled log files, keeping `keep` of them. Best-effort:
/// a file that cannot be removed is skipped rather than failing startup.
fn prune_log_files(dir: &Path, file_stem: &str, keep: usize) -> std::io::Result<usize> {
    let mut logs: Vec<(PathBuf, std::time::SystemTime)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(file_stem))
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((entry.path(), modified))
        })
        .collect();
    if logs.len() <= keep {
        return Ok(0);
    }

    logs.sort_by_key(|(_, modified)| *modified);
    let excess = logs.len() - keep;
    let mut removed = 0;
    for (path, _) in logs.into_iter().take(excess) {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "could not remove log file"),
        }
    }
    Ok(removed)
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to install tracing subscriber: {0}")]
    SubscriberInstall(Box<dyn std::error::Error + Send + Sync>),
}

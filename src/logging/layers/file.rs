use crate::logging::config::LoggingConfig;
use crate::Result;
use anyhow::{anyhow, Context};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self as tracing_fmt, format, writer::BoxMakeWriter};
use tracing_subscriber::registry::LookupSpan;

pub const LOG_FILE_NAME: &str = "scsource.log";
/// Log directory relative to the config directory or `$HOME`.
const DEFAULT_LOG_SUBDIR: &str = ".scsource/logs";

pub type FileFmtLayer<S> =
    tracing_fmt::Layer<S, format::DefaultFields, format::Format<format::Full>, BoxMakeWriter>;

pub type FileLayerStack<S> = tracing_subscriber::layer::Layered<FileFmtLayer<S>, S>;

/// Where the log file lives.
///
/// An absolute `log_dir` is used as is. A relative one, like the default
/// `.scsource/logs`, hangs off the directory of the `--config` file, else `$HOME`.
pub fn log_file_path(config: &LoggingConfig, config_dir: Option<&Path>) -> Result<PathBuf> {
    let relative = match &config.log_dir {
        Some(dir) if dir.is_absolute() => return Ok(dir.join(LOG_FILE_NAME)),
        Some(dir) => dir.clone(),
        None => PathBuf::from(DEFAULT_LOG_SUBDIR),
    };
    let base = match config_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs_next::home_dir()
            .ok_or_else(|| anyhow!("cannot place log file: $HOME is not set"))?,
    };
    Ok(base.join(relative).join(LOG_FILE_NAME))
}

/// File sink writing through a non-blocking appender; `None` discards events.
///
/// The returned guard must outlive the subscriber or buffered lines are lost.
pub fn file_layer<S>(log_file: Option<&Path>) -> Result<(FileFmtLayer<S>, Option<WorkerGuard>)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let Some(path) = log_file else {
        return Ok((build(BoxMakeWriter::new(io::sink)), None));
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    Ok((build(BoxMakeWriter::new(writer)), Some(guard)))
}

fn build<S>(writer: BoxMakeWriter) -> FileFmtLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
}

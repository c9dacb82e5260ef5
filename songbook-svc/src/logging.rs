//! Tracing subscriber setup
//!
//! Logs go to stderr unless a log directory is configured, in which case
//! they go to `songbook.<YYYY-MM-DD>.log` files rotated daily.

use std::path::Path;

use anyhow::{Context, Result};
use songbook_common::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Prefix of every log file name
pub const LOG_FILE_PREFIX: &str = "songbook";

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level. The returned guard flushes
/// the file writer when dropped; hold it until shutdown.
pub fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{},tower_http=info", logging.level).into());

    let appender = logging.directory.as_deref().map(daily_appender).transpose()?;
    let (file_writer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = file_writer
        .is_none()
        .then(|| fmt::layer().with_writer(std::io::stderr));
    let file_layer = file_writer.map(|writer| fmt::layer().with_ansi(false).with_writer(writer));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

/// Daily-rotated appender writing into `dir`, created if missing
pub fn daily_appender(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("Failed to open log directory {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_daily_appender_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let mut appender = daily_appender(&log_dir).unwrap();
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        let names: Vec<String> = std::fs::read_dir(&log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);

        // UTC date, the appender's default clock
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let name = &names[0];
        assert!(name.starts_with(LOG_FILE_PREFIX), "{}", name);
        assert!(name.ends_with(".log"), "{}", name);
        assert!(name.contains(&today), "{}", name);

        let content = std::fs::read_to_string(log_dir.join(name)).unwrap();
        assert_eq!(content, "hello\n");
    }
}

//! Run logger: one instance per run, passed by reference to every stage.
//!
//! Events go through a `tracing` subscriber owned by the logger rather than a
//! global one. The file layer writes plain `[INFO]`, `[WARNING]` or `[ERROR]`
//! lines to `<log_dir>/<YYYY-MM-DD>.log`; the console layer styles the same
//! prefixes, INFO on stdout and WARN/ERROR on stderr.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use console::style;
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{filter_fn, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

use crate::error::{PipelineError, Result};

/// Line prefix for a level; WARN is spelled out as `[WARNING]`
pub fn level_prefix(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "[ERROR]",
        Level::WARN => "[WARNING]",
        Level::INFO => "[INFO]",
        Level::DEBUG => "[DEBUG]",
        Level::TRACE => "[TRACE]",
    }
}

/// `[LEVEL] message` formatter, optionally colouring the prefix
struct PrefixFormat {
    styled: bool,
}

impl<S, N> FormatEvent<S, N> for PrefixFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let level = event.metadata().level();
        let prefix = level_prefix(level);

        if self.styled {
            let styled = match *level {
                Level::ERROR => style(prefix).red().bold(),
                Level::WARN => style(prefix).yellow().bold(),
                _ => style(prefix).cyan(),
            };
            write!(writer, "{} ", styled)?;
        } else {
            write!(writer, "{} ", prefix)?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub struct Logger {
    dispatch: Dispatch,
    path: Option<PathBuf>,
    console: Arc<AtomicBool>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("path", &self.path)
            .field("quiet", &self.is_quiet())
            .finish()
    }
}

impl Logger {
    /// Append to today's log file under `log_dir`, creating the directory.
    pub fn new(log_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(log_dir).map_err(|e| PipelineError::io(log_dir, e))?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_suffix("log")
            .build(log_dir)
            .map_err(|e| PipelineError::io(log_dir, std::io::Error::other(e.to_string())))?;

        // The appender names daily files by UTC date
        let path = log_dir.join(format!("{}.log", Utc::now().format("%Y-%m-%d")));

        Ok(Self::build(Some(appender), Some(path)))
    }

    /// Console-only logger, used when no log directory is wanted.
    pub fn console_only() -> Self {
        Self::build(None, None)
    }

    /// Suppress console output; the log file is still written.
    pub fn quiet(self) -> Self {
        self.console.store(false, Ordering::Relaxed);
        self
    }

    fn build(file: Option<RollingFileAppender>, path: Option<PathBuf>) -> Self {
        let console = Arc::new(AtomicBool::new(true));

        let file_layer = file.map(|appender| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .event_format(PrefixFormat { styled: false })
                .with_writer(appender)
        });

        let enabled = Arc::clone(&console);
        let console_layer = tracing_subscriber::fmt::layer()
            .event_format(PrefixFormat { styled: true })
            .with_writer(std::io::stderr.with_max_level(Level::WARN).or_else(std::io::stdout))
            .with_filter(filter_fn(move |_| enabled.load(Ordering::Relaxed)));

        let subscriber = tracing_subscriber::registry()
            .with(LevelFilter::INFO)
            .with(file_layer)
            .with(console_layer);

        Self {
            dispatch: Dispatch::new(subscriber),
            path,
            console,
        }
    }

    /// Path of the log file, if one is open
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether console output (including progress bars) is suppressed
    pub fn is_quiet(&self) -> bool {
        !self.console.load(Ordering::Relaxed)
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Level::INFO, message.as_ref());
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(Level::WARN, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Level::ERROR, message.as_ref());
    }

    pub fn log(&self, level: Level, message: &str) {
        tracing::dispatcher::with_default(&self.dispatch, || match level {
            Level::ERROR => tracing::error!("{}", message),
            Level::WARN => tracing::warn!("{}", message),
            Level::INFO => tracing::info!("{}", message),
            Level::DEBUG => tracing::debug!("{}", message),
            Level::TRACE => tracing::trace!("{}", message),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_is_named_by_date() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(temp_dir.path()).unwrap().quiet();
        logger.info("started");

        let expected = format!("{}.log", Utc::now().format("%Y-%m-%d"));
        let name = logger.path().unwrap().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, expected);
        assert!(logger.path().unwrap().is_file());
    }

    #[test]
    fn test_lines_are_prefixed_by_level() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(temp_dir.path()).unwrap().quiet();

        logger.info("started");
        logger.warning("odd value");
        logger.error("failed");

        let content = std::fs::read_to_string(logger.path().unwrap()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["[INFO] started", "[WARNING] odd value", "[ERROR] failed"]);
    }

    #[test]
    fn test_debug_events_are_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let logger = Logger::new(temp_dir.path()).unwrap().quiet();

        logger.log(Level::DEBUG, "noise");
        logger.info("kept");

        let content = std::fs::read_to_string(logger.path().unwrap()).unwrap();
        assert_eq!(content.lines().collect::<Vec<_>>(), vec!["[INFO] kept"]);
    }

    #[test]
    fn test_appends_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        Logger::new(temp_dir.path()).unwrap().quiet().info("first");
        let logger = Logger::new(temp_dir.path()).unwrap().quiet();
        logger.info("second");

        let content = std::fs::read_to_string(logger.path().unwrap()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_loggers_do_not_share_a_subscriber() {
        let first_dir = TempDir::new().unwrap();
        let second_dir = TempDir::new().unwrap();
        let first = Logger::new(first_dir.path()).unwrap().quiet();
        let second = Logger::new(second_dir.path()).unwrap().quiet();

        first.info("only here");
        second.info("only there");

        let first_text = std::fs::read_to_string(first.path().unwrap()).unwrap();
        assert_eq!(first_text.trim_end(), "[INFO] only here");
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("logs");
        let logger = Logger::new(&nested).unwrap().quiet();
        assert!(logger.path().unwrap().starts_with(&nested));
    }

    #[test]
    fn test_quiet_flag() {
        assert!(!Logger::console_only().is_quiet());
        assert!(Logger::console_only().quiet().is_quiet());
    }

    #[test]
    fn test_level_prefixes() {
        assert_eq!(level_prefix(&Level::INFO), "[INFO]");
        assert_eq!(level_prefix(&Level::WARN), "[WARNING]");
        assert_eq!(level_prefix(&Level::ERROR), "[ERROR]");
    }
}

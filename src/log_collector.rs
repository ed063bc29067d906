//! Console logging pipeline for toolchain builds.
//!
//! A [`LogCollector`] is built once at process start and handed to every stage
//! explicitly. Each line is rendered as `[HH:MM:SS] [LEVEL] message` and sent to
//! up to three sinks:
//!
//! ```text
//! stage ──> [LogCollector] ──┬──> console (stdout)
//!                            ├──> <log_dir>/goliath-<ts>.log   (optional)
//!                            └──> in-memory history            (tests)
//! ```
//!
//! The collector also implements [`log::Log`], so records emitted through the
//! `log` macros, including by dependencies, share the same format. Records with
//! target `"success"` or `"fatal"` map onto the custom levels.

use chrono::Local;
use log::{Level, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Fatal,
    /// Pipeline completed.
    Success,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Fatal => "FATAL",
            LogLevel::Success => "SUCCESS",
        }
    }

    fn from_record(record: &Record) -> Self {
        match record.target() {
            "success" => LogLevel::Success,
            "fatal" => LogLevel::Fatal,
            _ => match record.level() {
                Level::Error => LogLevel::Fatal,
                Level::Warn => LogLevel::Warn,
                _ => LogLevel::Info,
            },
        }
    }
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: String,
}

impl LogLine {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        LogLine {
            level,
            message: message.into(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        }
    }

    /// Console/file representation.
    pub fn render(&self) -> String {
        format!("[{}] [{}] {}", self.timestamp, self.level.label(), self.message)
    }
}

struct Sinks {
    console: Option<Box<dyn Write + Send>>,
    file: Option<File>,
    history: Option<Vec<LogLine>>,
}

/// Cloneable handle to the process logger.
#[derive(Clone)]
pub struct LogCollector {
    sinks: Arc<Mutex<Sinks>>,
}

impl LogCollector {
    fn with_sinks(console: Option<Box<dyn Write + Send>>, history: bool) -> Self {
        LogCollector {
            sinks: Arc::new(Mutex::new(Sinks {
                console,
                file: None,
                history: history.then(Vec::new),
            })),
        }
    }

    /// Collector writing to stdout.
    pub fn console() -> Self {
        Self::with_sinks(Some(Box::new(std::io::stdout())), false)
    }

    /// Collector that only records lines in memory.
    pub fn memory() -> Self {
        Self::with_sinks(None, true)
    }

    /// Also append every later line to a fresh `goliath-<timestamp>.log`
    /// under `log_dir`. Applies to every clone of this collector.
    pub fn attach_log_dir(&self, log_dir: &Path) -> Result<PathBuf, String> {
        std::fs::create_dir_all(log_dir)
            .map_err(|e| format!("Failed to create logs directory: {}", e))?;
        let path = log_dir.join(format!(
            "goliath-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        ));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))?;

        if let Ok(mut sinks) = self.sinks.lock() {
            sinks.file = Some(file);
        }
        Ok(path)
    }

    /// Emit a line to every configured sink.
    pub fn log(&self, line: LogLine) {
        let Ok(mut sinks) = self.sinks.lock() else {
            return;
        };
        let rendered = line.render();
        if let Some(console) = sinks.console.as_mut() {
            let _ = writeln!(console, "{}", rendered);
            let _ = console.flush();
        }
        if let Some(file) = sinks.file.as_mut() {
            let _ = writeln!(file, "{}", rendered);
        }
        if let Some(history) = sinks.history.as_mut() {
            history.push(line);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLine::new(LogLevel::Info, message));
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLine::new(LogLevel::Warn, message));
    }

    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLine::new(LogLevel::Fatal, message));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(LogLine::new(LogLevel::Success, message));
    }

    /// Lines recorded so far (memory collectors only).
    pub fn lines(&self) -> Vec<LogLine> {
        self.sinks
            .lock()
            .ok()
            .and_then(|sinks| sinks.history.clone())
            .unwrap_or_default()
    }

    /// Recorded lines at `level`.
    pub fn lines_at(&self, level: LogLevel) -> Vec<LogLine> {
        self.lines().into_iter().filter(|l| l.level == level).collect()
    }
}

impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.log(LogLine::new(
                LogLevel::from_record(record),
                record.args().to_string(),
            ));
        }
    }

    fn flush(&self) {
        if let Ok(mut sinks) = self.sinks.lock() {
            if let Some(console) = sinks.console.as_mut() {
                let _ = console.flush();
            }
            if let Some(file) = sinks.file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

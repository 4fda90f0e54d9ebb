//! Session log sink and per-run loggers.
//!
//! A picker session owns one [`SessionLog`] that:
//! - Writes to an optional session log file
//! - Sends lines to a callback (if provided)
//! - Mirrors every line into `tracing`
//!
//! Each pipeline run gets a [`RunLogger`] tagged with the run id and keeping
//! a tail buffer that is replayed when the run fails.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LineCallback, LogConfig, LogLevel, MessagePrefix};

/// Shared output for all runs of a session.
pub struct SessionLog {
    /// Path to log file, if writing to one.
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Line callback.
    line_callback: Mutex<Option<LineCallback>>,
    /// Logging configuration.
    config: LogConfig,
}

impl SessionLog {
    /// Create a session log writing to `<log_dir>/<session>.log`.
    pub fn with_file(
        session: &str,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        line_callback: Option<LineCallback>,
    ) -> std::io::Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(session)));
        let file = File::create(&log_path)?;

        Ok(Self {
            log_path: Some(log_path),
            file_writer: Mutex::new(Some(BufWriter::new(file))),
            line_callback: Mutex::new(line_callback),
            config,
        })
    }

    /// Create a session log that only mirrors into `tracing` and the callback.
    pub fn new(config: LogConfig, line_callback: Option<LineCallback>) -> Self {
        Self {
            log_path: None,
            file_writer: Mutex::new(None),
            line_callback: Mutex::new(line_callback),
            config,
        }
    }

    /// Get the log file path.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Create a logger for one pipeline run.
    pub fn run_logger(self: &Arc<Self>, run_id: impl Into<String>) -> RunLogger {
        RunLogger {
            run_id: run_id.into(),
            sink: Arc::clone(self),
            tail_buffer: Mutex::new(VecDeque::with_capacity(self.config.error_tail)),
        }
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the file and release resources.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S%.3f");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }

        if let Some(ref callback) = *self.line_callback.lock() {
            callback(formatted);
        }
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        self.close();
    }
}

/// Logger for a single pipeline run.
pub struct RunLogger {
    run_id: String,
    sink: Arc<SessionLog>,
    /// Recent lines, replayed on failure.
    tail_buffer: Mutex<VecDeque<String>>,
}

impl RunLogger {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        let line = format!("[run {}] {}", self.run_id, message);
        self.remember(&line);

        match level {
            LogLevel::Trace => tracing::trace!(run_id = %self.run_id, "{}", message),
            LogLevel::Debug => tracing::debug!(run_id = %self.run_id, "{}", message),
            LogLevel::Info => tracing::info!(run_id = %self.run_id, "{}", message),
            LogLevel::Warn => tracing::warn!(run_id = %self.run_id, "{}", message),
            LogLevel::Error => tracing::error!(run_id = %self.run_id, "{}", message),
        }

        let config = &self.sink.config;
        if level < config.level {
            return;
        }
        // Compact mode keeps debug chatter in the tail only
        if config.compact && level <= LogLevel::Debug {
            return;
        }
        self.sink.output(&self.sink.format_message(&line));
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        let msg = MessagePrefix::Debug.format(message);
        self.log(LogLevel::Debug, &msg);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        let msg = MessagePrefix::Section.format(section_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Replay the tail buffer (typically after a failure).
    pub fn show_tail(&self, header: &str) {
        let lines = self.get_tail();
        if lines.is_empty() {
            return;
        }
        self.sink
            .output(&self.sink.format_message(&format!("[{}/tail]", header)));
        for line in lines {
            self.sink.output(&self.sink.format_message(&line));
        }
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    fn remember(&self, line: &str) {
        let limit = self.sink.config.error_tail;
        if limit == 0 {
            return;
        }
        let mut buffer = self.tail_buffer.lock();
        if buffer.len() >= limit {
            buffer.pop_front();
        }
        buffer.push_back(line.to_string());
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

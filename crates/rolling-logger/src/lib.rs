//! Rolling Logger
//!
//! A `tracing` layer that formats each event into one line, hands it to a
//! sink (the browser console, stderr, ...) and keeps the last N lines in
//! memory so they can be dumped when something goes wrong.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger not initialized")]
    NotInitialized,
    #[error("failed to write log dump: {0}")]
    Io(#[from] std::io::Error),
}

pub type Sink = Box<dyn Fn(Level, &str) + Send + Sync>;

static BUFFER: OnceLock<Arc<RollingBuffer>> = OnceLock::new();

/// Fixed-capacity line buffer; the oldest line is dropped first
#[derive(Debug)]
pub struct RollingBuffer {
    capacity: usize,
    lines: Mutex<VecDeque<String>>,
}

impl RollingBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn push(&self, line: String) {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every buffered line to `path`, returns the line count
    pub fn dump_to(&self, path: impl AsRef<Path>) -> Result<usize, LoggerError> {
        let lines = self.lines();
        let mut out = String::new();
        for line in &lines {
            out.push_str(line);
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(lines.len())
    }
}

/// The layer itself; usable directly with a scoped subscriber
pub struct RollingLayer {
    buffer: Arc<RollingBuffer>,
    sink: Sink,
}

impl RollingLayer {
    pub fn new(buffer: Arc<RollingBuffer>, sink: Sink) -> Self {
        Self { buffer, sink }
    }
}

impl<S: Subscriber> Layer<S> for RollingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let line = format!(
            "[{}] {:<5} {}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            meta.level(),
            meta.target(),
            visitor.finish()
        );
        (self.sink)(*meta.level(), &line);
        self.buffer.push(line);
    }
}

/// Collects `message` plus `key=value` pairs for the other fields
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Install the rolling layer as the global subscriber.
///
/// Events at `level` or more severe are kept. Can only be called once.
pub fn init_logger(capacity: usize, level: Level, sink: Sink) -> Result<(), LoggerError> {
    let buffer = Arc::new(RollingBuffer::new(capacity));
    BUFFER
        .set(buffer.clone())
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    tracing_subscriber::registry()
        .with(RollingLayer::new(buffer, sink).with_filter(LevelFilter::from_level(level)))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

/// Lines captured by the global logger, oldest first
pub fn recent_lines() -> Vec<String> {
    BUFFER.get().map(|b| b.lines()).unwrap_or_default()
}

pub fn dump_to(path: impl AsRef<Path>) -> Result<usize, LoggerError> {
    BUFFER.get().ok_or(LoggerError::NotInitialized)?.dump_to(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(capacity: usize) -> (Arc<RollingBuffer>, Arc<Mutex<Vec<String>>>, impl Subscriber + Send + Sync) {
        let buffer = Arc::new(RollingBuffer::new(capacity));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: Sink = Box::new(move |_level, line| sink_seen.lock().unwrap().push(line.to_string()));
        let subscriber = tracing_subscriber::registry().with(RollingLayer::new(buffer.clone(), sink));
        (buffer, seen, subscriber)
    }

    #[test]
    fn test_buffer_drops_oldest() {
        let buffer = RollingBuffer::new(2);
        buffer.push("a".into());
        buffer.push("b".into());
        buffer.push("c".into());
        assert_eq!(buffer.lines(), vec!["b", "c"]);
    }

    #[test]
    fn test_zero_capacity_keeps_one_line() {
        let buffer = RollingBuffer::new(0);
        buffer.push("a".into());
        buffer.push("b".into());
        assert_eq!(buffer.lines(), vec!["b"]);
    }

    #[test]
    fn test_layer_formats_message_and_fields() {
        let (buffer, seen, subscriber) = capture(10);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(project = "trip", entries = 3, "ledger opened");
            tracing::warn!("quota exceeded");
        });

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].ends_with("ledger opened project=trip entries=3"));
        assert!(lines[1].contains("WARN"));
        assert!(lines[1].ends_with("quota exceeded"));
        assert_eq!(*seen.lock().unwrap(), lines);
    }

    #[test]
    fn test_dump_to_file() {
        let (buffer, _seen, subscriber) = capture(3);
        tracing::subscriber::with_default(subscriber, || {
            for i in 0..5 {
                tracing::info!("line {}", i);
            }
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        assert_eq!(buffer.dump_to(&path).unwrap(), 3);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("line 2"));
        assert!(lines[2].ends_with("line 4"));
    }

    #[test]
    fn test_failed_dump_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = RollingBuffer::new(2);
        buffer.push("kept".into());

        let missing = dir.path().join("no-such-dir").join("app.log");
        assert!(matches!(buffer.dump_to(&missing), Err(LoggerError::Io(_))));
        assert_eq!(buffer.lines(), vec!["kept"]);
    }

    #[test]
    fn test_global_dump_requires_init() {
        let dir = tempfile::tempdir().unwrap();
        // Nothing in this test binary installs the global logger
        assert!(BUFFER.get().is_none());
        assert!(recent_lines().is_empty());
        assert!(matches!(dump_to(dir.path().join("x.log")), Err(LoggerError::NotInitialized)));
    }
}

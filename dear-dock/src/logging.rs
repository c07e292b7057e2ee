//! Log capture and the log window.
//!
//! [`init`] installs a `tracing` subscriber with two layers: the usual `fmt`
//! output on stderr and a [`LogCaptureLayer`] that copies every event into a
//! shared [`LogBuffer`]. [`log_gui`] draws that buffer inside a window, so any
//! `tracing::info!`/`warn!` issued by the application shows up in the UI.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt};

use crate::GuiCtx;

/// Lines kept by default before the oldest ones are dropped.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO ",
            LogLevel::Warning => "WARN ",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn color(self) -> [f32; 4] {
        match self {
            LogLevel::Trace => [0.6, 0.6, 0.6, 1.0],
            LogLevel::Debug => [0.7, 0.8, 1.0, 1.0],
            LogLevel::Info => [1.0, 1.0, 1.0, 1.0],
            LogLevel::Warning => [1.0, 1.0, 0.4, 1.0],
            LogLevel::Error => [1.0, 0.4, 0.4, 1.0],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            LogLevel::Error
        } else if level == tracing::Level::WARN {
            LogLevel::Warning
        } else if level == tracing::Level::INFO {
            LogLevel::Info
        } else if level == tracing::Level::DEBUG {
            LogLevel::Debug
        } else {
            LogLevel::Trace
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    /// Time since the buffer was created.
    pub elapsed: Duration,
}

impl LogEntry {
    pub fn format_line(&self) -> String {
        format!(
            "[{:>8.3}] [{}] {}",
            self.elapsed.as_secs_f64(),
            self.level.tag(),
            self.message
        )
    }
}

struct Inner {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    start: Instant,
}

/// Bounded, shareable list of captured log lines (oldest dropped first).
#[derive(Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<Inner>>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("LogBuffer")
            .field("len", &inner.entries.len())
            .field("capacity", &inner.capacity)
            .finish()
    }
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
                capacity,
                start: Instant::now(),
            })),
        }
    }

    pub fn push(&self, level: LogLevel, target: impl Into<String>, message: impl Into<String>) {
        let mut inner = self.inner.lock();
        let elapsed = inner.start.elapsed();
        if inner.entries.len() == inner.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(LogEntry {
            level,
            target: target.into(),
            message: message.into(),
            elapsed,
        });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Clone out the entries accepted by `keep`, oldest first.
    ///
    /// The lock is released before returning, so callers may log while
    /// drawing the result.
    pub fn collect(&self, mut keep: impl FnMut(&LogEntry) -> bool) -> Vec<LogEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| keep(e))
            .cloned()
            .collect()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.collect(|_| true)
    }
}

/// `tracing` layer that copies events into a [`LogBuffer`].
pub struct LogCaptureLayer {
    buffer: LogBuffer,
}

impl LogCaptureLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S: Subscriber> Layer<S> for LogCaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let meta = event.metadata();
        self.buffer
            .push(LogLevel::from(*meta.level()), meta.target(), visitor.finish());
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(mut self) -> String {
        if !self.fields.is_empty() {
            if !self.message.is_empty() {
                self.message.push(' ');
            }
            self.message.push_str(self.fields.trim_start());
        }
        self.message
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Install the global subscriber and return the buffer shown by [`log_gui`].
///
/// `RUST_LOG` takes precedence over `default_filter`. If a global subscriber
/// is already set, the returned buffer stays empty.
pub fn init(default_filter: &str, capacity: usize) -> LogBuffer {
    let buffer = LogBuffer::new(capacity);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = tracing_fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(LogCaptureLayer::new(buffer.clone()))
        .try_init();
    if let Err(e) = result {
        eprintln!("Logging already initialized: {e}");
    }
    buffer
}

/// Per-window state of the log GUI.
#[derive(Clone, Debug)]
pub struct LogView {
    pub show_levels: [bool; 5],
    pub filter: String,
    pub autoscroll: bool,
}

impl Default for LogView {
    fn default() -> Self {
        Self {
            show_levels: [false, true, true, true, true],
            filter: String::new(),
            autoscroll: true,
        }
    }
}

impl LogView {
    pub fn shows(&self, level: LogLevel) -> bool {
        self.show_levels[level.index()]
    }

    pub fn accepts(&self, entry: &LogEntry) -> bool {
        if !self.shows(entry.level) {
            return false;
        }
        if self.filter.is_empty() {
            return true;
        }
        let needle = self.filter.to_lowercase();
        entry.message.to_lowercase().contains(&needle)
            || entry.target.to_lowercase().contains(&needle)
    }
}

/// Draw the captured log: level toggles, text filter, clear and the lines.
pub fn log_gui(ctx: &mut GuiCtx<'_>) {
    let ui = ctx.ui();
    let (view, buffer) = ctx.log_parts();

    if ui.button("Clear") {
        buffer.clear();
    }
    ui.same_line();
    ui.checkbox("Auto-scroll", &mut view.autoscroll);
    for level in LogLevel::ALL {
        ui.same_line();
        ui.checkbox(level.label(), &mut view.show_levels[level.index()]);
    }
    ui.input_text("Filter", &mut view.filter)
        .hint("substring...")
        .build();
    ui.separator();

    let lines = buffer.collect(|e| view.accepts(e));
    let autoscroll = view.autoscroll;
    ui.child_window("##log_lines").build(ui, || {
        for entry in &lines {
            ui.text_colored(entry.level.color(), entry.format_line());
        }
        if autoscroll && ui.scroll_y() >= ui.scroll_max_y() {
            ui.set_scroll_here_y(1.0);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn buffer_drops_oldest_beyond_capacity() {
        let buffer = LogBuffer::new(3);
        for i in 0..5 {
            buffer.push(LogLevel::Info, "test", format!("line {i}"));
        }
        let messages: Vec<_> = buffer.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn zero_capacity_keeps_the_last_line() {
        let buffer = LogBuffer::new(0);
        buffer.push(LogLevel::Info, "test", "a");
        buffer.push(LogLevel::Info, "test", "b");
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.entries()[0].message, "b");
    }

    #[test]
    fn clones_share_the_same_lines() {
        let buffer = LogBuffer::new(10);
        let other = buffer.clone();
        other.push(LogLevel::Error, "test", "boom");
        assert_eq!(buffer.len(), 1);
        buffer.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn view_filters_by_level_and_text() {
        let mut view = LogView::default();
        let entry = |level, message: &str| LogEntry {
            level,
            target: "docking_demo".into(),
            message: message.into(),
            elapsed: Duration::ZERO,
        };

        assert!(!view.accepts(&entry(LogLevel::Trace, "noise")));
        assert!(view.accepts(&entry(LogLevel::Warning, "Rocket was launched")));

        view.filter = "ROCKET".into();
        assert!(view.accepts(&entry(LogLevel::Warning, "Rocket was launched")));
        assert!(!view.accepts(&entry(LogLevel::Info, "Button was pressed")));

        view.filter = "docking".into();
        assert!(view.accepts(&entry(LogLevel::Info, "Button was pressed")));

        view.filter.clear();
        view.show_levels[LogLevel::Warning as usize] = false;
        assert!(!view.accepts(&entry(LogLevel::Warning, "It works")));
    }

    #[test]
    fn format_line_has_level_tag() {
        let entry = LogEntry {
            level: LogLevel::Warning,
            target: "t".into(),
            message: "It works".into(),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(entry.format_line(), "[   1.500] [WARN ] It works");
    }

    #[test]
    fn capture_layer_records_message_and_fields() {
        let buffer = LogBuffer::new(16);
        let subscriber =
            tracing_subscriber::registry().with(LogCaptureLayer::new(buffer.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("state.f was changed to {:.3}", 0.5f32);
            tracing::info!(counter = 3, "Button was pressed");
            tracing::error!(target: "custom_target", "failure");
        });

        let entries = buffer.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].level, LogLevel::Warning);
        assert_eq!(entries[0].message, "state.f was changed to 0.500");
        assert_eq!(entries[1].level, LogLevel::Info);
        assert_eq!(entries[1].message, "Button was pressed counter=3");
        assert_eq!(entries[2].target, "custom_target");
        assert_eq!(entries[2].level, LogLevel::Error);
    }
}

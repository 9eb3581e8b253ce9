//! Progress reporting for exports.
//!
//! Pipeline steps report through one process-wide [`ProgressLog`]. Each event
//! is printed to stderr, since stdout carries exported CSV and paths, and is
//! also handed to any [`subscribe`]r. Tests subscribe to check that a partial
//! label match produced its warning.
//!
//! ```text
//! 📖 Fetching 'items' code list for domain QCL...
//!    ✓ 212 entries in code list
//!    ⚠️ 1 label(s) not found in QCL: Raw milk of yak
//!       📡 GET https://.../en/data/QCL
//! ```

use once_cell::sync::Lazy;
use tokio::sync::broadcast;

/// Buffered events per subscriber before the oldest are dropped.
const SUBSCRIBER_BUFFER: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Step,
    Done,
    Warning,
    Failure,
}

impl Level {
    fn marker(self) -> &'static str {
        match self {
            Level::Step => "",
            Level::Done => "✓ ",
            Level::Warning => "⚠️ ",
            Level::Failure => "❌ ",
        }
    }
}

/// One reported line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub level: Level,
    pub message: String,
    /// Sub-step depth; 0 for pipeline steps
    pub depth: u8,
}

impl ProgressEvent {
    fn render(&self) -> String {
        // Outcomes sit one level under the step they close
        let depth = match self.level {
            Level::Step | Level::Failure => self.depth,
            Level::Done | Level::Warning => self.depth + 1,
        };
        format!("{}{}{}", "   ".repeat(depth as usize), self.level.marker(), self.message)
    }
}

pub struct ProgressLog {
    events: broadcast::Sender<ProgressEvent>,
}

impl ProgressLog {
    fn new() -> Self {
        let (events, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self { events }
    }

    fn emit(&self, level: Level, message: String, depth: u8) {
        let event = ProgressEvent { level, message, depth };
        eprintln!("{}", event.render());
        // Err only means nobody is subscribed
        let _ = self.events.send(event);
    }
}

static PROGRESS: Lazy<ProgressLog> = Lazy::new(ProgressLog::new);

/// Receive every event reported from now on.
pub fn subscribe() -> broadcast::Receiver<ProgressEvent> {
    PROGRESS.events.subscribe()
}

/// Events buffered for `receiver`, skipping any it lagged past.
pub fn drain(receiver: &mut broadcast::Receiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => return events,
        }
    }
}

pub fn log_info(msg: impl Into<String>) {
    PROGRESS.emit(Level::Step, msg.into(), 0);
}

pub fn log_info_indent(msg: impl Into<String>, depth: u8) {
    PROGRESS.emit(Level::Step, msg.into(), depth);
}

pub fn log_success(msg: impl Into<String>) {
    PROGRESS.emit(Level::Done, msg.into(), 0);
}

pub fn log_warning(msg: impl Into<String>) {
    PROGRESS.emit(Level::Warning, msg.into(), 0);
}

/// Top-level failures; the CLI reports its fatal error through this.
pub fn log_error(msg: impl Into<String>) {
    PROGRESS.emit(Level::Failure, msg.into(), 0);
}

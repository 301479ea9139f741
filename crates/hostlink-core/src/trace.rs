//! Observable trace lines emitted by triggers and workers.
//!
//! These lines are the module's stdout contract and are written regardless
//! of the log level. Diagnostics beyond them go through `log`.

use parking_lot::Mutex;
use std::fmt;
use std::thread::{self, ThreadId};

/// A single trace line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// Worker is attached and still waiting for readiness
    Initialized,
    /// Trigger has raised readiness
    Runnable,
    /// Target class could not be resolved
    ClassMissing,
    /// Constructor could not be resolved
    ConstructorMissing,
    /// Target method (named) could not be resolved
    MethodMissing(String),
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Initialized => f.write_str("[native thread]INITIALIZED"),
            TraceEvent::Runnable => f.write_str("[native thread]RUNNABLE"),
            TraceEvent::ClassMissing => f.write_str("[jclass]error..."),
            TraceEvent::ConstructorMissing => f.write_str("[init]error..."),
            TraceEvent::MethodMissing(name) => write!(f, "[{}]error...", name),
        }
    }
}

/// Destination for trace lines.
pub trait TraceSink: Send + Sync {
    /// Record one event.
    fn emit(&self, event: TraceEvent);
}

/// Writes each event as a line on stdout.
pub struct StdoutSink;

impl TraceSink for StdoutSink {
    fn emit(&self, event: TraceEvent) {
        println!("{}", event);
    }
}

/// Keeps every event in memory along with the emitting thread.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(ThreadId, TraceEvent)>>,
}

impl RecordingSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events in emission order.
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().iter().map(|(_, e)| e.clone()).collect()
    }

    /// Events emitted from one thread.
    pub fn events_from(&self, thread: ThreadId) -> Vec<TraceEvent> {
        self.events
            .lock()
            .iter()
            .filter(|(t, _)| *t == thread)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Number of occurrences of `event`.
    pub fn count(&self, event: &TraceEvent) -> usize {
        self.events.lock().iter().filter(|(_, e)| e == event).count()
    }

    /// Rendered lines, as [`StdoutSink`] would print them.
    pub fn lines(&self) -> Vec<String> {
        self.events.lock().iter().map(|(_, e)| e.to_string()).collect()
    }
}

impl TraceSink for RecordingSink {
    fn emit(&self, event: TraceEvent) {
        self.events.lock().push((thread::current().id(), event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_lines() {
        assert_eq!(TraceEvent::Initialized.to_string(), "[native thread]INITIALIZED");
        assert_eq!(TraceEvent::Runnable.to_string(), "[native thread]RUNNABLE");
        assert_eq!(TraceEvent::ClassMissing.to_string(), "[jclass]error...");
        assert_eq!(TraceEvent::ConstructorMissing.to_string(), "[init]error...");
        assert_eq!(TraceEvent::MethodMissing("run".to_string()).to_string(), "[run]error...");
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.emit(TraceEvent::Initialized);
        sink.emit(TraceEvent::Initialized);
        sink.emit(TraceEvent::Runnable);

        assert_eq!(sink.count(&TraceEvent::Initialized), 2);
        assert_eq!(sink.events_from(thread::current().id()).len(), 3);
        assert_eq!(sink.lines().last().map(String::as_str), Some("[native thread]RUNNABLE"));
    }
}

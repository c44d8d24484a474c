//! Decision trace sinks

use std::sync::Mutex;
use crate::domain::traits::{TraceEvent, TraceSink};

/// Forwards decision traces to `tracing` when debug output is enabled
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    enabled: bool,
}

impl TracingSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl TraceSink for TracingSink {
    fn record(&self, event: TraceEvent) {
        if !self.enabled {
            return;
        }
        tracing::debug!(
            bot = %event.identity,
            message_id = %event.message_id,
            channel = %event.channel_id,
            user = %event.user_id,
            "{}",
            event.message
        );
    }
}

/// Drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {
    fn record(&self, _event: TraceEvent) {}
}

/// Keeps events in memory, used by `simulate --explain` and tests
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn drain(&self) -> Vec<TraceEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}

impl TraceSink for MemorySink {
    fn record(&self, event: TraceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

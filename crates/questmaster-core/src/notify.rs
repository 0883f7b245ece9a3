//! Notification sink: the outward edge for user-facing messages.
//!
//! The core only ever writes to a sink; nothing reads back from it.

use std::sync::Mutex;

use crate::events::{Event, Severity};

pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &Event);
}

/// Renders every event as a log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, event: &Event) {
        let message = event.message();
        match event.severity() {
            Severity::Error => tracing::error!(target: "questmaster::notify", "{message}"),
            Severity::Warning => tracing::warn!(target: "questmaster::notify", "{message}"),
            Severity::Success | Severity::Info => {
                tracing::info!(target: "questmaster::notify", "{message}")
            }
        }
    }
}

/// Keeps every event it receives. Useful for front ends that drain events
/// after each command, and for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, event: &Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<T: NotificationSink + ?Sized> NotificationSink for std::sync::Arc<T> {
    fn notify(&self, event: &Event) {
        (**self).notify(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    #[test]
    fn test_recording_sink_drain_empties() {
        let sink = Arc::new(RecordingSink::new());
        let shared: Arc<dyn NotificationSink> = sink.clone();
        shared.notify(&Event::DataCleared { at: Utc::now() });
        TracingSink.notify(&Event::DataCleared { at: Utc::now() });

        assert_eq!(sink.snapshot().len(), 1);
        assert_eq!(sink.drain().len(), 1);
        assert!(sink.drain().is_empty());
    }
}

//! Change notifications for the editor front end
//!
//! Events tell the UI (or any consumer) that something it displays or
//! persists has changed. Delivery failures never affect the editor state.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Receiver of editor change notifications
///
/// Implemented by whatever connects the editor to its front end: a UI
/// binding, a channel, or a collector in tests.
pub trait EventSink: Send + Sync {
    /// Deliver one event; an error means the receiver is gone
    fn send(&self, event: EditorEvent) -> Result<(), EventError>;
}

/// An event could not be delivered
#[derive(Debug, Clone, thiserror::Error)]
#[error("Event delivery failed: {message}")]
pub struct EventError {
    pub message: String,
}

impl EventError {
    pub fn channel_closed() -> Self {
        Self {
            message: "receiver closed".to_string(),
        }
    }
}

/// Events emitted by an editor session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorEvent {
    /// Nodes or edges changed
    #[serde(rename_all = "camelCase")]
    GraphChanged { node_count: usize, edge_count: usize },

    /// Undo/redo availability after a history change
    #[serde(rename_all = "camelCase")]
    HistoryChanged { can_undo: bool, can_redo: bool },

    /// The worker table changed
    #[serde(rename_all = "camelCase")]
    WorkersChanged { worker_count: usize },

    /// The clipboard now holds a new fragment
    #[serde(rename_all = "camelCase")]
    ClipboardChanged { node_count: usize },

    /// A workbook was compiled
    #[serde(rename_all = "camelCase")]
    Exported { row_count: usize },
}

/// Discards every event, for headless sessions
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: EditorEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// Keeps every event in memory, in delivery order
pub struct VecEventSink {
    events: Mutex<Vec<EditorEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Events received so far
    pub fn events(&self) -> Vec<EditorEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Default for VecEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: EditorEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .map_err(|_| EventError::channel_closed())?
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_event_sink_keeps_order() {
        let sink = VecEventSink::new();
        let history = EditorEvent::HistoryChanged {
            can_undo: true,
            can_redo: false,
        };
        let workers = EditorEvent::WorkersChanged { worker_count: 3 };

        sink.send(history.clone()).unwrap();
        sink.send(workers.clone()).unwrap();
        assert_eq!(sink.events(), vec![history, workers]);

        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_null_event_sink() {
        assert!(NullEventSink
            .send(EditorEvent::Exported { row_count: 0 })
            .is_ok());
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(EditorEvent::GraphChanged {
            node_count: 2,
            edge_count: 1,
        })
        .unwrap();
        assert_eq!(json["type"], "graphChanged");
        assert_eq!(json["nodeCount"], 2);
    }
}

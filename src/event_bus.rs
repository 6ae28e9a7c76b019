//! Lightweight event channel for node-scoped diagnostics.
//!
//! Nodes emit structured events through their [`NodeContext`](crate::node::NodeContext)
//! while a turn runs; the executor drains the channel after the turn and
//! forwards everything to `tracing`. This keeps node bodies free of direct
//! logging concerns and gives tests a way to observe node activity.

use chrono::{DateTime, Utc};
use flume::{Receiver, Sender};
use serde::{Deserialize, Serialize};

/// A diagnostic event emitted by a node during a turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// When the event was emitted.
    pub when: DateTime<Utc>,
    /// Identifier of the emitting node.
    pub node_id: String,
    /// Turn number at emit time.
    pub turn: u64,
    /// Short category, e.g. "classification" or "ad_creation".
    pub scope: String,
    /// Human-readable payload.
    pub message: String,
}

impl Event {
    /// Builds a node-scoped event with turn metadata attached.
    pub fn node_message_with_meta(
        node_id: impl Into<String>,
        turn: u64,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            when: Utc::now(),
            node_id: node_id.into(),
            turn,
            scope: scope.into(),
            message: message.into(),
        }
    }
}

/// Unbounded in-process event channel shared by all nodes of a graph.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<Event>,
    receiver: Receiver<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a new unbounded bus.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Sender handle for wiring into a [`NodeContext`](crate::node::NodeContext).
    #[must_use]
    pub fn sender(&self) -> Sender<Event> {
        self.sender.clone()
    }

    /// Drains all buffered events without blocking.
    #[must_use]
    pub fn drain(&self) -> Vec<Event> {
        self.receiver.try_iter().collect()
    }

    /// Drains buffered events, forwarding each to `tracing` at debug level.
    pub fn flush_to_tracing(&self) -> usize {
        let events = self.drain();
        for event in &events {
            tracing::debug!(
                node_id = %event.node_id,
                turn = event.turn,
                scope = %event.scope,
                "{}",
                event.message
            );
        }
        events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emitted_events_are_drained_in_order() {
        let bus = EventBus::new();
        let sender = bus.sender();
        sender
            .send(Event::node_message_with_meta("a", 1, "scope", "first"))
            .unwrap();
        sender
            .send(Event::node_message_with_meta("b", 1, "scope", "second"))
            .unwrap();

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "first");
        assert_eq!(events[1].node_id, "b");
        assert!(bus.drain().is_empty());
    }
}

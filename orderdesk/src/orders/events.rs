//! Fire-and-forget order notifications.
//!
//! Publication is at-most-once with no acknowledgment: a send with zero
//! subscribers is normal, and the HTTP response never waits on a listener.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::orders::types::Order;

/// Events published by the endpoint layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    #[serde(rename = "order.created")]
    Created(Order),
}

/// Broadcast publisher for order events.
#[derive(Debug, Clone)]
pub struct OrderEvents {
    tx: broadcast::Sender<OrderEvent>,
}

impl OrderEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Best-effort publish. Dropped silently when no subscriber listens.
    pub fn publish(&self, event: OrderEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.tx.subscribe()
    }
}

impl Default for OrderEvents {
    fn default() -> Self {
        Self::new(100)
    }
}

//! Event Bus - lifecycle notifications from the controller
//!
//! Design: enum events over a tokio broadcast channel. Publishing never
//! blocks and never fails; subscribers that lag simply miss events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Controller lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BrowserEvent {
    Connected { target_id: String },
    Disconnected,
    NavigationStarted { url: String },
    NavigationComplete { url: String },
}

/// Simple event bus using tokio broadcast channel
pub struct EventBus {
    tx: broadcast::Sender<BrowserEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1024);
        Self { tx }
    }

    /// Publish an event
    pub fn publish(&self, event: BrowserEvent) {
        let _ = self.tx.send(event); // Ignore error if no subscribers
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<BrowserEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(BrowserEvent::Connected {
            target_id: "t1".into(),
        });

        match rx.recv().await {
            Ok(BrowserEvent::Connected { target_id }) => assert_eq!(target_id, "t1"),
            _ => panic!("Expected Connected event"),
        }
    }
}

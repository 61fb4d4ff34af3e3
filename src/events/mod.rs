use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Events emitted by the indent pipeline after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    IndentCreated(Uuid),
    IndentUpdated(Uuid),
    IndentStatusChanged {
        indent_id: Uuid,
        old_status: String,
        new_status: String,
    },
    IndentItemsReconciled {
        indent_id: Uuid,
        created: usize,
        updated: usize,
        deleted: usize,
    },
}

/// Consumes pipeline events and logs them. Downstream integrations (ERP
/// sync, notifications) would hang off this loop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::IndentCreated(id) => info!(indent_id = %id, "indent created"),
            Event::IndentUpdated(id) => info!(indent_id = %id, "indent updated"),
            Event::IndentStatusChanged {
                indent_id,
                old_status,
                new_status,
            } => info!(
                indent_id = %indent_id,
                old_status = %old_status,
                new_status = %new_status,
                "indent status changed"
            ),
            Event::IndentItemsReconciled {
                indent_id,
                created,
                updated,
                deleted,
            } => {
                if *deleted > 0 {
                    warn!(
                        indent_id = %indent_id,
                        created, updated, deleted,
                        "indent items reconciled with removals"
                    );
                } else {
                    info!(
                        indent_id = %indent_id,
                        created, updated, deleted,
                        "indent items reconciled"
                    );
                }
            }
        }
    }
    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();

        sender.send(Event::IndentCreated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::IndentCreated(received)) => assert_eq!(received, id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_after_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::IndentUpdated(Uuid::new_v4())).await.is_err());
    }
}

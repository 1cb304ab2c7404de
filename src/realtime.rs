//! Real-time event hub.
//!
//! Each connected user gets a broadcast channel keyed by their account ID;
//! WebSocket sessions subscribe to their own channel and workflow code
//! publishes [`RealtimeEvent`]s into it. Delivery is best-effort: a user with
//! no open socket simply has no channel, and slow consumers lose the oldest
//! buffered events.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

/// Events pushed to connected users, mirroring the durable notification
/// kinds. Serialized as `{"event": "...", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum RealtimeEvent {
    NewIssue {
        issue_id: Uuid,
        dashboard_id: Uuid,
        subject: Option<String>,
    },
    IssueAssigned {
        issue_id: Uuid,
        assigned_team_id: Option<Uuid>,
        assigned_user_id: Option<Uuid>,
    },
    StatusUpdate {
        issue_id: Uuid,
        status: String,
    },
    NewReply {
        issue_id: Uuid,
        comment_id: Uuid,
        author_name: String,
    },
    NewAdminRequest {
        request_id: Uuid,
        request_type: String,
        subject: String,
    },
    AdminRequestUpdate {
        request_id: Uuid,
        status: String,
    },
}

/// Registry of per-user broadcast channels.
#[derive(Clone)]
pub struct Hub {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<RealtimeEvent>>>>,
    capacity: usize,
}

impl Hub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Subscribes to the given user's channel, creating it on first use.
    pub async fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<RealtimeEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Publishes an event to one user. Returns the number of live receivers.
    pub async fn publish(&self, user_id: Uuid, event: RealtimeEvent) -> usize {
        let mut stale = false;
        let delivered = {
            let channels = self.channels.read().await;
            match channels.get(&user_id) {
                Some(sender) => match sender.send(event) {
                    Ok(count) => count,
                    Err(_) => {
                        stale = true;
                        0
                    }
                },
                None => 0,
            }
        };

        // Drop the channel once its last receiver is gone.
        if stale {
            let mut channels = self.channels.write().await;
            if let Some(sender) = channels.get(&user_id) {
                if sender.receiver_count() == 0 {
                    channels.remove(&user_id);
                }
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let hub = Hub::new(8);
        let user_id = Uuid::new_v4();
        let mut rx = hub.subscribe(user_id).await;

        let event = RealtimeEvent::StatusUpdate {
            issue_id: Uuid::new_v4(),
            status: "in_progress".to_string(),
        };
        let delivered = hub.publish(user_id, event.clone()).await;
        assert_eq!(delivered, 1);
        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_noop() {
        let hub = Hub::new(8);
        let delivered = hub
            .publish(
                Uuid::new_v4(),
                RealtimeEvent::StatusUpdate {
                    issue_id: Uuid::new_v4(),
                    status: "complete".to_string(),
                },
            )
            .await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_events_are_per_user() {
        let hub = Hub::new(8);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let _alice_rx = hub.subscribe(alice).await;
        let mut bob_rx = hub.subscribe(bob).await;

        hub.publish(
            alice,
            RealtimeEvent::StatusUpdate {
                issue_id: Uuid::new_v4(),
                status: "pending".to_string(),
            },
        )
        .await;

        assert!(matches!(
            bob_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_event_wire_shape() {
        let event = RealtimeEvent::NewReply {
            issue_id: Uuid::nil(),
            comment_id: Uuid::nil(),
            author_name: "Dana".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "new-reply");
        assert_eq!(json["data"]["author_name"], "Dana");
    }
}

//! Notification emitter.
//!
//! Writes the durable notification row first, then pushes a real-time event
//! on a best-effort basis. Fan-out to many recipients never aborts the
//! triggering operation: individual failures are logged and skipped.

use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use uuid::Uuid;

use crate::models::notification;
use crate::realtime::{Hub, RealtimeEvent};

/// Notification kind vocabulary.
pub mod kind {
    pub const NEW_ISSUE: &str = "new_issue";
    pub const ASSIGNMENT: &str = "assignment";
    pub const STATUS_CHANGE: &str = "status_change";
    pub const REPLY: &str = "reply";
    pub const ADMIN_REQUEST: &str = "admin_request";
}

/// One pending notification for [`Notifier::notify`].
#[derive(Debug, Clone)]
pub struct Outgoing {
    pub recipient: Uuid,
    pub issue_id: Option<Uuid>,
    pub kind: &'static str,
    pub message: String,
    pub event: Option<RealtimeEvent>,
}

#[derive(Clone)]
pub struct Notifier {
    hub: Hub,
}

impl Notifier {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }

    /// Persists one notification and pushes its event if the recipient is
    /// connected. The row insert can fail; the push cannot fail the caller.
    pub async fn notify<C: ConnectionTrait>(
        &self,
        db: &C,
        outgoing: Outgoing,
    ) -> Result<(), sea_orm::DbErr> {
        let row = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(outgoing.recipient),
            issue_id: Set(outgoing.issue_id),
            kind: Set(outgoing.kind.to_string()),
            message: Set(outgoing.message),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };
        row.insert(db).await?;

        if let Some(event) = outgoing.event {
            let delivered = self.hub.publish(outgoing.recipient, event).await;
            tracing::debug!(
                recipient = %outgoing.recipient,
                kind = outgoing.kind,
                delivered,
                "pushed realtime event"
            );
        }

        Ok(())
    }

    /// Fan-out variant: each recipient is attempted independently and
    /// failures are swallowed after logging.
    pub async fn notify_many<C: ConnectionTrait>(&self, db: &C, batch: Vec<Outgoing>) {
        for outgoing in batch {
            let recipient = outgoing.recipient;
            let kind = outgoing.kind;
            if let Err(err) = self.notify(db, outgoing).await {
                tracing::warn!(
                    recipient = %recipient,
                    kind,
                    error = %err,
                    "failed to persist notification, skipping recipient"
                );
            }
        }
    }
}

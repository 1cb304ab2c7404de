//! Notification repository: the read side of the notification feed.

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::RepositoryError;
use crate::models::dashboard::{self, Entity as Dashboard};
use crate::models::issue::{self, Entity as Issue};
use crate::models::notification::{self, Entity as Notification};

const FEED_LIMIT: u64 = 50;

/// A notification hydrated with issue/dashboard context for the feed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationView {
    pub id: Uuid,
    pub issue_id: Option<Uuid>,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub dashboard_id: Option<Uuid>,
    pub dashboard_name: Option<String>,
    pub issue_status: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pub db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The caller's feed, newest first, capped at 50 entries.
    pub async fn list(
        &self,
        user: &CurrentUser,
        is_read: Option<bool>,
    ) -> Result<Vec<NotificationView>, RepositoryError> {
        let mut query = Notification::find().filter(notification::Column::UserId.eq(user.id));
        if let Some(is_read) = is_read {
            query = query.filter(notification::Column::IsRead.eq(is_read));
        }
        let rows = query
            .order_by_desc(notification::Column::CreatedAt)
            .limit(FEED_LIMIT)
            .all(self.db.as_ref())
            .await?;

        let issue_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.issue_id).collect();
        let issues: HashMap<Uuid, (Uuid, String)> = Issue::find()
            .filter(issue::Column::Id.is_in(issue_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|i| (i.id, (i.dashboard_id, i.status)))
            .collect();
        let dashboard_ids: Vec<Uuid> = issues.values().map(|(id, _)| *id).collect();
        let dashboards: HashMap<Uuid, String> = Dashboard::find()
            .filter(dashboard::Column::Id.is_in(dashboard_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let issue = row.issue_id.and_then(|id| issues.get(&id));
                NotificationView {
                    id: row.id,
                    issue_id: row.issue_id,
                    kind: row.kind,
                    message: row.message,
                    is_read: row.is_read,
                    dashboard_id: issue.map(|(dashboard_id, _)| *dashboard_id),
                    dashboard_name: issue
                        .and_then(|(dashboard_id, _)| dashboards.get(dashboard_id).cloned()),
                    issue_status: issue.map(|(_, status)| status.clone()),
                    created_at: row.created_at,
                }
            })
            .collect())
    }

    /// Marks one notification read; only the recipient can see it.
    pub async fn mark_read(
        &self,
        user: &CurrentUser,
        id: Uuid,
    ) -> Result<notification::Model, RepositoryError> {
        let row = Notification::find_by_id(id)
            .filter(notification::Column::UserId.eq(user.id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| RepositoryError::not_found("Notification not found"))?;

        let mut active: notification::ActiveModel = row.into();
        active.is_read = Set(true);
        Ok(active.update(self.db.as_ref()).await?)
    }

    pub async fn mark_all_read(&self, user: &CurrentUser) -> Result<(), RepositoryError> {
        Notification::update_many()
            .col_expr(
                notification::Column::IsRead,
                sea_orm::sea_query::Expr::value(true),
            )
            .filter(notification::Column::UserId.eq(user.id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    pub async fn unread_count(&self, user: &CurrentUser) -> Result<u64, RepositoryError> {
        Ok(Notification::find()
            .filter(notification::Column::UserId.eq(user.id))
            .filter(notification::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await?)
    }
}

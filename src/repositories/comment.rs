//! Comment repository.
//!
//! Replies on issue threads. Business users may only reply to threads they
//! raised; a data-science reply on a pending issue promotes it to in_progress
//! and earns a `responded` leaderboard row.

use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::RepositoryError;
use crate::models::comment::{self, Entity as Comment};
use crate::models::issue::{self, Entity as Issue};
use crate::models::leaderboard_activity;
use crate::models::user::{self, Entity as User};
use crate::notify::{Notifier, Outgoing, kind};
use crate::realtime::RealtimeEvent;
use crate::workflow::{IssueStatus, Role};

/// Payload for posting a comment.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewComment {
    pub issue_id: Uuid,
    pub body: String,
}

/// A comment with its author's name and role attached.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentView {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
    pub body: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Clone)]
pub struct CommentRepository {
    pub db: Arc<DatabaseConnection>,
    users: super::UserRepository,
    notifier: Notifier,
}

impl CommentRepository {
    pub fn new(db: Arc<DatabaseConnection>, users: super::UserRepository, notifier: Notifier) -> Self {
        Self { db, users, notifier }
    }

    /// Comments on an issue, oldest first.
    pub async fn list_for_issue(&self, issue_id: Uuid) -> Result<Vec<CommentView>, RepositoryError> {
        let rows = Comment::find()
            .filter(comment::Column::IssueId.eq(issue_id))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(User)
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(row, author)| CommentView {
                id: row.id,
                issue_id: row.issue_id,
                user_id: row.user_id,
                user_name: author.as_ref().map(|a| a.name.clone()),
                user_role: author.map(|a| a.role),
                body: row.body,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }

    pub async fn create(
        &self,
        user: &CurrentUser,
        input: NewComment,
    ) -> Result<CommentView, RepositoryError> {
        if input.body.trim().is_empty() {
            return Err(RepositoryError::validation(
                "Issue ID and comment text are required",
            ));
        }

        let txn = self.db.begin().await?;

        let issue = Issue::find_by_id(input.issue_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Issue not found"))?;

        if user.role == Role::Business && issue.submitted_by_user_id != user.id {
            return Err(RepositoryError::forbidden(
                "You can only reply to your own threads",
            ));
        }

        let promoted =
            user.role == Role::DataScience && issue.status == IssueStatus::Pending.as_str();
        if promoted {
            let mut active: issue::ActiveModel = issue.clone().into();
            active.status = Set(IssueStatus::InProgress.as_str().to_string());
            active.updated_at = Set(chrono::Utc::now().into());
            active.update(&txn).await?;
        }

        let posted_at = chrono::Utc::now().into();
        let inserted = comment::ActiveModel {
            id: Set(Uuid::new_v4()),
            issue_id: Set(issue.id),
            user_id: Set(user.id),
            body: Set(input.body),
            created_at: Set(posted_at),
            updated_at: Set(posted_at),
        }
        .insert(&txn)
        .await?;

        if user.role == Role::DataScience {
            leaderboard_activity::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                issue_id: Set(issue.id),
                action: Set("responded".to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        let mut batch = Vec::new();
        if user.role == Role::DataScience {
            batch.push(Outgoing {
                recipient: issue.submitted_by_user_id,
                issue_id: Some(issue.id),
                kind: kind::REPLY,
                message: format!("{} replied to your thread", user.name),
                event: Some(RealtimeEvent::NewReply {
                    issue_id: issue.id,
                    comment_id: inserted.id,
                    author_name: user.name.clone(),
                }),
            });
            if promoted {
                batch.push(Outgoing {
                    recipient: issue.submitted_by_user_id,
                    issue_id: Some(issue.id),
                    kind: kind::STATUS_CHANGE,
                    message: "Your thread status has been updated to in_progress".to_string(),
                    event: Some(RealtimeEvent::StatusUpdate {
                        issue_id: issue.id,
                        status: IssueStatus::InProgress.as_str().to_string(),
                    }),
                });
            }
        } else if let Some(team_id) = issue.assigned_team_id {
            let members = self.users.members_of_team(team_id).await?;
            for member in members {
                batch.push(Outgoing {
                    recipient: member.id,
                    issue_id: Some(issue.id),
                    kind: kind::REPLY,
                    message: format!("{} replied to a thread", user.name),
                    event: Some(RealtimeEvent::NewReply {
                        issue_id: issue.id,
                        comment_id: inserted.id,
                        author_name: user.name.clone(),
                    }),
                });
            }
        }
        self.notifier.notify_many(self.db.as_ref(), batch).await;

        Ok(CommentView {
            id: inserted.id,
            issue_id: inserted.issue_id,
            user_id: inserted.user_id,
            user_name: Some(user.name.clone()),
            user_role: Some(user.role.as_str().to_string()),
            body: inserted.body,
            created_at: inserted.created_at,
            updated_at: inserted.updated_at,
        })
    }

    /// Edits the body; authors only.
    pub async fn update(
        &self,
        user: &CurrentUser,
        id: Uuid,
        body: String,
    ) -> Result<CommentView, RepositoryError> {
        if body.trim().is_empty() {
            return Err(RepositoryError::validation("Comment text is required"));
        }

        let row = Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| RepositoryError::not_found("Comment not found"))?;
        if row.user_id != user.id {
            return Err(RepositoryError::forbidden(
                "You can only edit your own comments",
            ));
        }

        let mut active: comment::ActiveModel = row.into();
        active.body = Set(body);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = active.update(self.db.as_ref()).await?;

        Ok(CommentView {
            id: updated.id,
            issue_id: updated.issue_id,
            user_id: updated.user_id,
            user_name: Some(user.name.clone()),
            user_role: Some(user.role.as_str().to_string()),
            body: updated.body,
            created_at: updated.created_at,
            updated_at: updated.updated_at,
        })
    }

    /// Deletes a comment; authors only.
    pub async fn delete(&self, user: &CurrentUser, id: Uuid) -> Result<(), RepositoryError> {
        let row = Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| RepositoryError::not_found("Comment not found"))?;
        if row.user_id != user.id {
            return Err(RepositoryError::forbidden(
                "You can only delete your own comments",
            ));
        }

        Comment::delete_by_id(id).exec(self.db.as_ref()).await?;
        Ok(())
    }
}

//! Admin-request repository.
//!
//! Escalations raised by data-science users and worked by admins. The
//! transition rule is small: resolved and rejected are terminal except for a
//! reopen to in_progress.

use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::RepositoryError;
use crate::models::admin_request::{self, Entity as AdminRequest};
use crate::models::dashboard::{self, Entity as Dashboard};
use crate::models::team::{self, Entity as Team};
use crate::models::user::{self, Entity as User};
use crate::notify::{Notifier, Outgoing, kind};
use crate::realtime::RealtimeEvent;
use crate::workflow::{self, AdminRequestStatus, RequestType, Role};

/// Payload for raising an admin request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAdminRequest {
    pub request_type: String,
    pub dashboard_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub subject: String,
    pub description: String,
}

/// Query filters for the request list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct RequestFilters {
    pub status: Option<String>,
    pub request_type: Option<String>,
}

/// An admin request hydrated with related names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminRequestView {
    pub id: Uuid,
    pub submitted_by_user_id: Uuid,
    pub submitted_by_name: Option<String>,
    pub submitted_by_email: Option<String>,
    pub request_type: String,
    pub dashboard_id: Option<Uuid>,
    pub dashboard_name: Option<String>,
    pub team_id: Option<Uuid>,
    pub team_name: Option<String>,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub admin_response: Option<String>,
    pub resolved_by_admin_id: Option<Uuid>,
    pub resolved_by_name: Option<String>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Clone)]
pub struct AdminRequestRepository {
    pub db: Arc<DatabaseConnection>,
    users: super::UserRepository,
    notifier: Notifier,
}

impl AdminRequestRepository {
    pub fn new(
        db: Arc<DatabaseConnection>,
        users: super::UserRepository,
        notifier: Notifier,
    ) -> Self {
        Self { db, users, notifier }
    }

    /// Raises a request. The team context defaults to the submitter's team;
    /// every admin is notified.
    pub async fn create(
        &self,
        user: &CurrentUser,
        input: NewAdminRequest,
    ) -> Result<AdminRequestView, RepositoryError> {
        if input.subject.trim().is_empty() || input.description.trim().is_empty() {
            return Err(RepositoryError::validation(
                "Request type, subject, and description are required",
            ));
        }
        if RequestType::parse(&input.request_type).is_none() {
            return Err(RepositoryError::validation("Invalid request type"));
        }

        let created_at: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let inserted = admin_request::ActiveModel {
            id: Set(Uuid::new_v4()),
            submitted_by_user_id: Set(user.id),
            request_type: Set(input.request_type.clone()),
            dashboard_id: Set(input.dashboard_id),
            team_id: Set(input.team_id.or(user.team_id)),
            subject: Set(input.subject.clone()),
            description: Set(input.description),
            status: Set(AdminRequestStatus::Pending.as_str().to_string()),
            admin_response: Set(None),
            resolved_by_admin_id: Set(None),
            created_at: Set(created_at),
            updated_at: Set(created_at),
        }
        .insert(self.db.as_ref())
        .await?;

        let admins = self.users.admins().await?;
        let batch = admins
            .into_iter()
            .map(|admin| Outgoing {
                recipient: admin.id,
                issue_id: None,
                kind: kind::ADMIN_REQUEST,
                message: format!("New admin request: {} from {}", inserted.subject, user.name),
                event: Some(RealtimeEvent::NewAdminRequest {
                    request_id: inserted.id,
                    request_type: inserted.request_type.clone(),
                    subject: inserted.subject.clone(),
                }),
            })
            .collect();
        self.notifier.notify_many(self.db.as_ref(), batch).await;

        self.get(user, inserted.id).await
    }

    /// Lists requests: data-science callers see their own, admins see all.
    pub async fn list(
        &self,
        user: &CurrentUser,
        filters: RequestFilters,
    ) -> Result<Vec<AdminRequestView>, RepositoryError> {
        let mut query = AdminRequest::find();
        if user.role == Role::DataScience {
            query = query.filter(admin_request::Column::SubmittedByUserId.eq(user.id));
        }
        if let Some(status) = &filters.status {
            query = query.filter(admin_request::Column::Status.eq(status.as_str()));
        }
        if let Some(request_type) = &filters.request_type {
            query = query.filter(admin_request::Column::RequestType.eq(request_type.as_str()));
        }

        let rows = query
            .order_by_desc(admin_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        self.hydrate(rows).await
    }

    /// Single request; data-science callers may only read their own.
    pub async fn get(&self, user: &CurrentUser, id: Uuid) -> Result<AdminRequestView, RepositoryError> {
        let row = AdminRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| RepositoryError::not_found("Request not found"))?;

        if user.role == Role::DataScience && row.submitted_by_user_id != user.id {
            return Err(RepositoryError::forbidden("Access denied"));
        }

        let mut views = self.hydrate(vec![row]).await?;
        views
            .pop()
            .ok_or_else(|| RepositoryError::not_found("Request not found"))
    }

    /// Admin status update: records the resolving admin, keeps the previous
    /// response when none is supplied, and notifies the submitter.
    pub async fn update_status(
        &self,
        admin: &CurrentUser,
        id: Uuid,
        status: &str,
        admin_response: Option<String>,
    ) -> Result<AdminRequestView, RepositoryError> {
        let requested = AdminRequestStatus::parse(status)
            .ok_or_else(|| RepositoryError::validation("Invalid status"))?;

        let row = AdminRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| RepositoryError::not_found("Request not found"))?;
        let current = AdminRequestStatus::parse(&row.status)
            .ok_or_else(|| RepositoryError::validation("Invalid status"))?;

        workflow::authorize_request_status_change(current, requested)
            .map_err(RepositoryError::invalid_state)?;

        let submitter = row.submitted_by_user_id;
        let previous_response = row.admin_response.clone();
        let mut active: admin_request::ActiveModel = row.into();
        active.status = Set(requested.as_str().to_string());
        active.admin_response = Set(admin_response.or(previous_response));
        active.resolved_by_admin_id = Set(Some(admin.id));
        active.updated_at = Set(chrono::Utc::now().into());
        active.update(self.db.as_ref()).await?;

        self.notifier
            .notify_many(
                self.db.as_ref(),
                vec![Outgoing {
                    recipient: submitter,
                    issue_id: None,
                    kind: kind::ADMIN_REQUEST,
                    message: format!(
                        "Your admin request status has been updated to {}",
                        requested.as_str()
                    ),
                    event: Some(RealtimeEvent::AdminRequestUpdate {
                        request_id: id,
                        status: requested.as_str().to_string(),
                    }),
                }],
            )
            .await;

        self.get(admin, id).await
    }

    /// Deletes a request. Data-science callers may only delete their own
    /// pending requests; admins are unrestricted.
    pub async fn delete(&self, user: &CurrentUser, id: Uuid) -> Result<(), RepositoryError> {
        let row = AdminRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| RepositoryError::not_found("Request not found"))?;

        if user.role == Role::DataScience {
            if row.submitted_by_user_id != user.id {
                return Err(RepositoryError::forbidden(
                    "You can only delete your own requests",
                ));
            }
            if row.status != AdminRequestStatus::Pending.as_str() {
                return Err(RepositoryError::invalid_state(
                    "You can only delete pending requests",
                ));
            }
        }

        AdminRequest::delete_by_id(id).exec(self.db.as_ref()).await?;
        Ok(())
    }

    async fn hydrate(
        &self,
        rows: Vec<admin_request::Model>,
    ) -> Result<Vec<AdminRequestView>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids: Vec<Uuid> = rows
            .iter()
            .flat_map(|r| [Some(r.submitted_by_user_id), r.resolved_by_admin_id])
            .flatten()
            .collect();
        let dashboard_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.dashboard_id).collect();
        let team_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.team_id).collect();

        let users: HashMap<Uuid, (String, String)> = User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|u| (u.id, (u.name, u.email)))
            .collect();
        let dashboards: HashMap<Uuid, String> = Dashboard::find()
            .filter(dashboard::Column::Id.is_in(dashboard_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();
        let teams: HashMap<Uuid, String> = Team::find()
            .filter(team::Column::Id.is_in(team_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| AdminRequestView {
                submitted_by_name: users
                    .get(&row.submitted_by_user_id)
                    .map(|(name, _)| name.clone()),
                submitted_by_email: users
                    .get(&row.submitted_by_user_id)
                    .map(|(_, email)| email.clone()),
                dashboard_name: row
                    .dashboard_id
                    .and_then(|id| dashboards.get(&id).cloned()),
                team_name: row.team_id.and_then(|id| teams.get(&id).cloned()),
                resolved_by_name: row
                    .resolved_by_admin_id
                    .and_then(|id| users.get(&id).map(|(name, _)| name.clone())),
                id: row.id,
                submitted_by_user_id: row.submitted_by_user_id,
                request_type: row.request_type,
                dashboard_id: row.dashboard_id,
                team_id: row.team_id,
                subject: row.subject,
                description: row.description,
                status: row.status,
                admin_response: row.admin_response,
                resolved_by_admin_id: row.resolved_by_admin_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

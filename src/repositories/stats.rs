//! System-wide counts for the admin stats endpoint.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RepositoryError;
use crate::models::{admin_request, issue};
use crate::models::{AdminRequest, Dashboard, Issue, Team, User};
use crate::workflow::{AdminRequestStatus, IssueStatus};

/// Aggregate system counts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SystemStats {
    pub total_users: u64,
    pub total_teams: u64,
    pub total_dashboards: u64,
    pub total_issues: u64,
    pub pending_issues: u64,
    pub in_progress_issues: u64,
    pub complete_issues: u64,
    pub pending_admin_requests: u64,
}

pub async fn system_stats(db: &DatabaseConnection) -> Result<SystemStats, RepositoryError> {
    let total_users = User::find().count(db).await?;
    let total_teams = Team::find().count(db).await?;
    let total_dashboards = Dashboard::find().count(db).await?;
    let total_issues = Issue::find().count(db).await?;
    let pending_issues = Issue::find()
        .filter(issue::Column::Status.eq(IssueStatus::Pending.as_str()))
        .count(db)
        .await?;
    let in_progress_issues = Issue::find()
        .filter(issue::Column::Status.eq(IssueStatus::InProgress.as_str()))
        .count(db)
        .await?;
    let complete_issues = Issue::find()
        .filter(issue::Column::Status.eq(IssueStatus::Complete.as_str()))
        .count(db)
        .await?;
    let pending_admin_requests = AdminRequest::find()
        .filter(admin_request::Column::Status.eq(AdminRequestStatus::Pending.as_str()))
        .count(db)
        .await?;

    Ok(SystemStats {
        total_users,
        total_teams,
        total_dashboards,
        total_issues,
        pending_issues,
        in_progress_issues,
        complete_issues,
        pending_admin_requests,
    })
}

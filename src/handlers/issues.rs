//! # Issue Handlers
//!
//! Endpoints for the issue lifecycle: creation, listing, role-scoped views,
//! seconding, status changes, and deletion.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::repositories::issue::{
    IssueFilters, IssueView, NewIssue, TeamDashboard, TeamDashboardQuery,
};
use crate::server::AppState;
use crate::workflow::Role;

/// Response wrapper for a single issue.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueResponse {
    pub issue: IssueView,
}

/// Response wrapper for issue listings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssuesResponse {
    pub issues: Vec<IssueView>,
}

/// Acknowledgement message payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Query parameters shared by the my-threads view.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct MyThreadsQuery {
    pub status: Option<String>,
    pub sort_by: Option<String>,
}

/// Lists issues with optional filters
#[utoipa::path(
    get,
    path = "/issues",
    security(("bearer_auth" = [])),
    params(IssueFilters),
    responses(
        (status = 200, description = "Filtered issues", body = IssuesResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "issues"
)]
pub async fn list_issues(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filters): Query<IssueFilters>,
) -> Result<Json<IssuesResponse>, ApiError> {
    let issues = state.issues.list(&user, filters).await?;
    Ok(Json(IssuesResponse { issues }))
}

/// Issues the caller created or seconded (business users)
#[utoipa::path(
    get,
    path = "/issues/my-threads",
    security(("bearer_auth" = [])),
    params(MyThreadsQuery),
    responses(
        (status = 200, description = "The caller's threads", body = IssuesResponse),
        (status = 403, description = "Not a business user")
    ),
    tag = "issues"
)]
pub async fn my_threads(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<MyThreadsQuery>,
) -> Result<Json<IssuesResponse>, ApiError> {
    user.require_role(&[Role::Business])?;
    let issues = state
        .issues
        .my_threads(&user, query.status, query.sort_by)
        .await?;
    Ok(Json(IssuesResponse { issues }))
}

/// Team dashboard with summary counts (data-science users)
#[utoipa::path(
    get,
    path = "/issues/team/dashboard",
    security(("bearer_auth" = [])),
    params(TeamDashboardQuery),
    responses(
        (status = 200, description = "Team-filtered issues and summary", body = TeamDashboard),
        (status = 403, description = "Not a data-science user")
    ),
    tag = "issues"
)]
pub async fn team_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<TeamDashboardQuery>,
) -> Result<Json<TeamDashboard>, ApiError> {
    user.require_role(&[Role::DataScience])?;
    Ok(Json(state.issues.team_dashboard(&user, query).await?))
}

/// Fetches one issue
#[utoipa::path(
    get,
    path = "/issues/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Issue id")),
    responses(
        (status = 200, description = "The issue", body = IssueResponse),
        (status = 404, description = "Issue not found")
    ),
    tag = "issues"
)]
pub async fn get_issue(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<IssueResponse>, ApiError> {
    let issue = state.issues.view(&user, id).await?;
    Ok(Json(IssueResponse { issue }))
}

/// Raises a new issue (business users)
#[utoipa::path(
    post,
    path = "/issues",
    security(("bearer_auth" = [])),
    request_body = NewIssue,
    responses(
        (status = 201, description = "Issue created", body = IssueResponse),
        (status = 400, description = "Missing dashboard or description"),
        (status = 403, description = "Not a business user")
    ),
    tag = "issues"
)]
pub async fn create_issue(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewIssue>,
) -> Result<(StatusCode, Json<IssueResponse>), ApiError> {
    user.require_role(&[Role::Business])?;
    let issue = state.issues.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(IssueResponse { issue })))
}

/// Seconds an issue (business users)
#[utoipa::path(
    post,
    path = "/issues/{id}/second",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Issue id")),
    responses(
        (status = 200, description = "Second recorded", body = IssueResponse),
        (status = 403, description = "Caller owns the thread"),
        (status = 409, description = "Already seconded")
    ),
    tag = "issues"
)]
pub async fn second_issue(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<IssueResponse>, ApiError> {
    user.require_role(&[Role::Business])?;
    let issue = state.issues.second(&user, id).await?;
    Ok(Json(IssueResponse { issue }))
}

/// Changes an issue's status through the transition guard
#[utoipa::path(
    patch,
    path = "/issues/{id}/status",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Issue id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = IssueResponse),
        (status = 400, description = "Unknown status value"),
        (status = 403, description = "Transition denied by the guard table")
    ),
    tag = "issues"
)]
pub async fn update_issue_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<IssueResponse>, ApiError> {
    let issue = state.issues.update_status(&user, id, &body.status).await?;
    Ok(Json(IssueResponse { issue }))
}

/// Deletes an issue the caller owns (business users)
#[utoipa::path(
    delete,
    path = "/issues/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Issue id")),
    responses(
        (status = 200, description = "Issue deleted", body = MessageResponse),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Thread is in progress")
    ),
    tag = "issues"
)]
pub async fn delete_issue(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_role(&[Role::Business])?;
    state.issues.delete(&user, id).await?;
    Ok(Json(MessageResponse {
        message: "Thread deleted successfully".to_string(),
    }))
}

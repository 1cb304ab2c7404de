//! # Admin Handlers
//!
//! Admin-only plumbing: assignment of issues to teams and users, the field
//! patch override, system stats, and team deletion.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::issues::{IssueResponse, MessageResponse};
use crate::repositories::issue::AdminIssuePatch;
use crate::repositories::stats::{self, SystemStats};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTeamRequest {
    pub team_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignUserRequest {
    pub user_id: Uuid,
}

/// Distinguishes an absent field from an explicit `null`: absent fields stay
/// `None`, present fields (null included) become `Some(..)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Field patch for an issue. Nullable columns use explicit-null semantics:
/// omit the field to leave it alone, send `null` to clear it.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchIssueRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub subject: Option<Option<String>>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub chart_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub assigned_team_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub assigned_user_id: Option<Option<Uuid>>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub stats: SystemStats,
}

/// Assigns an issue to a team
#[utoipa::path(
    post,
    path = "/admin/issues/{id}/assign-team",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Issue id")),
    request_body = AssignTeamRequest,
    responses(
        (status = 200, description = "Issue assigned", body = IssueResponse),
        (status = 404, description = "Issue or team not found")
    ),
    tag = "admin"
)]
pub async fn assign_team(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignTeamRequest>,
) -> Result<Json<IssueResponse>, ApiError> {
    user.require_admin()?;
    let issue = state.issues.assign_team(&user, id, body.team_id).await?;
    Ok(Json(IssueResponse { issue }))
}

/// Assigns an issue to a user, backfilling the team from the assignee
#[utoipa::path(
    post,
    path = "/admin/issues/{id}/assign-user",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Issue id")),
    request_body = AssignUserRequest,
    responses(
        (status = 200, description = "Issue assigned", body = IssueResponse),
        (status = 404, description = "Issue or user not found")
    ),
    tag = "admin"
)]
pub async fn assign_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignUserRequest>,
) -> Result<Json<IssueResponse>, ApiError> {
    user.require_admin()?;
    let issue = state.issues.assign_user(&user, id, body.user_id).await?;
    Ok(Json(IssueResponse { issue }))
}

/// Patches issue fields; explicit nulls clear nullable columns
#[utoipa::path(
    patch,
    path = "/admin/issues/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Issue id")),
    request_body = PatchIssueRequest,
    responses(
        (status = 200, description = "Issue patched", body = IssueResponse),
        (status = 400, description = "Empty patch or invalid status"),
        (status = 403, description = "Status transition denied")
    ),
    tag = "admin"
)]
pub async fn patch_issue(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchIssueRequest>,
) -> Result<Json<IssueResponse>, ApiError> {
    user.require_admin()?;
    let patch = AdminIssuePatch {
        subject: body.subject,
        description: body.description,
        chart_id: body.chart_id,
        assigned_team_id: body.assigned_team_id,
        assigned_user_id: body.assigned_user_id,
        status: body.status,
    };
    let issue = state.issues.admin_update(&user, id, patch).await?;
    Ok(Json(IssueResponse { issue }))
}

/// System-wide counts
#[utoipa::path(
    get,
    path = "/admin/stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "System statistics", body = StatsResponse)
    ),
    tag = "admin"
)]
pub async fn system_stats(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<StatsResponse>, ApiError> {
    user.require_admin()?;
    let stats = stats::system_stats(state.db.as_ref()).await?;
    Ok(Json(StatsResponse { stats }))
}

/// Deletes a team, orphaning its members and dashboards first
#[utoipa::path(
    delete,
    path = "/admin/teams/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Team id")),
    responses(
        (status = 200, description = "Team deleted", body = MessageResponse),
        (status = 404, description = "Team not found")
    ),
    tag = "admin"
)]
pub async fn delete_team(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_admin()?;
    state.teams.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Team deleted successfully".to_string(),
    }))
}

//! # Admin Request Handlers

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
use crate::handlers::issues::MessageResponse;
use crate::repositories::admin_request::{AdminRequestView, NewAdminRequest, RequestFilters};
use crate::server::AppState;
use crate::workflow::Role;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestResponse {
    pub request: AdminRequestView,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RequestsResponse {
    pub requests: Vec<AdminRequestView>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRequestStatusRequest {
    pub status: String,
    pub admin_response: Option<String>,
}

/// Lists admin requests; data-science callers see their own, admins see all
#[utoipa::path(
    get,
    path = "/admin-requests",
    security(("bearer_auth" = [])),
    params(RequestFilters),
    responses(
        (status = 200, description = "Requests", body = RequestsResponse),
        (status = 403, description = "Business users have no requests")
    ),
    tag = "admin-requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(filters): Query<RequestFilters>,
) -> Result<Json<RequestsResponse>, ApiError> {
    user.require_role(&[Role::DataScience, Role::Admin])?;
    let requests = state.admin_requests.list(&user, filters).await?;
    Ok(Json(RequestsResponse { requests }))
}

/// Fetches one request; data-science callers may only read their own
#[utoipa::path(
    get,
    path = "/admin-requests/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "The request", body = RequestResponse),
        (status = 403, description = "Not the submitter"),
        (status = 404, description = "Request not found")
    ),
    tag = "admin-requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestResponse>, ApiError> {
    user.require_role(&[Role::DataScience, Role::Admin])?;
    let request = state.admin_requests.get(&user, id).await?;
    Ok(Json(RequestResponse { request }))
}

/// Raises an admin request (data-science users)
#[utoipa::path(
    post,
    path = "/admin-requests",
    security(("bearer_auth" = [])),
    request_body = NewAdminRequest,
    responses(
        (status = 201, description = "Request raised", body = RequestResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Not a data-science user")
    ),
    tag = "admin-requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewAdminRequest>,
) -> Result<(StatusCode, Json<RequestResponse>), ApiError> {
    user.require_role(&[Role::DataScience])?;
    let request = state.admin_requests.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(RequestResponse { request })))
}

/// Updates a request's status (admins)
#[utoipa::path(
    patch,
    path = "/admin-requests/{id}/status",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request id")),
    request_body = UpdateRequestStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = RequestResponse),
        (status = 409, description = "Terminal request can only reopen to in_progress")
    ),
    tag = "admin-requests"
)]
pub async fn update_request_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRequestStatusRequest>,
) -> Result<Json<RequestResponse>, ApiError> {
    user.require_admin()?;
    let request = state
        .admin_requests
        .update_status(&user, id, &body.status, body.admin_response)
        .await?;
    Ok(Json(RequestResponse { request }))
}

/// Deletes a request
#[utoipa::path(
    delete,
    path = "/admin-requests/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request deleted", body = MessageResponse),
        (status = 403, description = "Not the submitter"),
        (status = 409, description = "Non-pending request")
    ),
    tag = "admin-requests"
)]
pub async fn delete_request(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    user.require_role(&[Role::DataScience, Role::Admin])?;
    state.admin_requests.delete(&user, id).await?;
    Ok(Json(MessageResponse {
        message: "Request deleted successfully".to_string(),
    }))
}

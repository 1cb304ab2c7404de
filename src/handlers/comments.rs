//! # Comment Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::issues::MessageResponse;
use crate::repositories::comment::{CommentView, NewComment};
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub comment: CommentView,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentsResponse {
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditCommentRequest {
    pub body: String,
}

/// Lists an issue's comments, oldest first
#[utoipa::path(
    get,
    path = "/comments/issue/{issue_id}",
    security(("bearer_auth" = [])),
    params(("issue_id" = Uuid, Path, description = "Issue id")),
    responses(
        (status = 200, description = "Comments with author info", body = CommentsResponse)
    ),
    tag = "comments"
)]
pub async fn list_comments(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(issue_id): Path<Uuid>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let comments = state.comments.list_for_issue(issue_id).await?;
    Ok(Json(CommentsResponse { comments }))
}

/// Posts a comment on an issue
#[utoipa::path(
    post,
    path = "/comments",
    security(("bearer_auth" = [])),
    request_body = NewComment,
    responses(
        (status = 201, description = "Comment posted", body = CommentResponse),
        (status = 403, description = "Business caller replying to someone else's thread"),
        (status = 404, description = "Issue not found")
    ),
    tag = "comments"
)]
pub async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<NewComment>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let comment = state.comments.create(&user, input).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}

/// Edits a comment (author only)
#[utoipa::path(
    put,
    path = "/comments/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Comment id")),
    request_body = EditCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 403, description = "Not the author")
    ),
    tag = "comments"
)]
pub async fn update_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<EditCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = state.comments.update(&user, id, body.body).await?;
    Ok(Json(CommentResponse { comment }))
}

/// Deletes a comment (author only)
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 403, description = "Not the author")
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.comments.delete(&user, id).await?;
    Ok(Json(MessageResponse {
        message: "Comment deleted successfully".to_string(),
    }))
}

//! # Notification Handlers

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::handlers::issues::MessageResponse;
use crate::repositories::notification::NotificationView;
use crate::server::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct FeedQuery {
    pub is_read: Option<bool>,
}

/// The caller's notification feed, newest first (limit 50)
#[utoipa::path(
    get,
    path = "/notifications",
    security(("bearer_auth" = [])),
    params(FeedQuery),
    responses(
        (status = 200, description = "Notifications", body = NotificationsResponse)
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<FeedQuery>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let notifications = state.notifications.list(&user, query.is_read).await?;
    Ok(Json(NotificationsResponse { notifications }))
}

/// Marks one notification read (recipient only)
#[utoipa::path(
    patch,
    path = "/notifications/{id}/read",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read", body = MessageResponse),
        (status = 404, description = "Not the recipient or missing")
    ),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.notifications.mark_read(&user, id).await?;
    Ok(Json(MessageResponse {
        message: "Notification marked as read".to_string(),
    }))
}

/// Marks every unread notification read
#[utoipa::path(
    patch,
    path = "/notifications/read-all",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All marked read", body = MessageResponse)
    ),
    tag = "notifications"
)]
pub async fn mark_all_read(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.notifications.mark_all_read(&user).await?;
    Ok(Json(MessageResponse {
        message: "All notifications marked as read".to_string(),
    }))
}

/// Count of unread notifications
#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse)
    ),
    tag = "notifications"
)]
pub async fn unread_count(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let count = state.notifications.unread_count(&user).await?;
    Ok(Json(UnreadCountResponse { count }))
}

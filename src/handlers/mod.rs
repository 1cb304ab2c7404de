//! # API Handlers
//!
//! HTTP endpoint handlers for the FeedbackHub API.

use crate::models::ServiceInfo;
use axum::response::Json;

pub mod admin;
pub mod admin_requests;
pub mod comments;
pub mod issues;
pub mod notifications;
pub mod ws;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

#[cfg(test)]
mod tests;

//! # Data Models
//!
//! SeaORM entity models for every FeedbackHub table, plus the shared
//! service-info payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod admin_request;
pub mod chart;
pub mod comment;
pub mod dashboard;
pub mod issue;
pub mod leaderboard_activity;
pub mod notification;
pub mod team;
pub mod thread_second;
pub mod user;

pub use admin_request::Entity as AdminRequest;
pub use chart::Entity as Chart;
pub use comment::Entity as Comment;
pub use dashboard::Entity as Dashboard;
pub use issue::Entity as Issue;
pub use leaderboard_activity::Entity as LeaderboardActivity;
pub use notification::Entity as Notification;
pub use team::Entity as Team;
pub use thread_second::Entity as ThreadSecond;
pub use user::Entity as User;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "feedbackhub".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

//! Issue entity model
//!
//! The central feedback thread. Status is one of the
//! [`crate::workflow::IssueStatus`] vocabulary strings and only moves through
//! [`crate::workflow::authorize_status_change`]; priority is derived from the
//! second ledger and never written directly by callers.

use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "issues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub dashboard_id: Uuid,

    /// Optional chart the feedback points at.
    pub chart_id: Option<Uuid>,

    pub submitted_by_user_id: Uuid,

    pub subject: Option<String>,

    pub description: String,

    /// Status vocabulary: pending|in_progress|complete.
    pub status: String,

    /// Distinct seconder count with a floor of 1.
    pub priority: i32,

    /// Team on the hook for the issue; snapshotted from the dashboard at
    /// creation time.
    pub assigned_team_id: Option<Uuid>,

    pub assigned_user_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dashboard::Entity",
        from = "Column::DashboardId",
        to = "super::dashboard::Column::Id"
    )]
    Dashboard,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SubmittedByUserId",
        to = "super::user::Column::Id"
    )]
    SubmittedBy,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
    #[sea_orm(has_many = "super::thread_second::Entity")]
    Seconds,
}

impl Related<super::dashboard::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dashboard.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::thread_second::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seconds.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

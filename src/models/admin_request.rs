//! Admin-request entity model
//!
//! Escalations that sit outside the issue lifecycle: requests for new
//! dashboards, charts, team members, and the like, worked by admins.

use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub submitted_by_user_id: Uuid,

    /// Kind vocabulary from [`crate::workflow::RequestType`].
    pub request_type: String,

    /// Dashboard context, when the request concerns an existing dashboard.
    pub dashboard_id: Option<Uuid>,

    /// Team context, when the request concerns a team.
    pub team_id: Option<Uuid>,

    pub subject: String,

    pub description: String,

    /// Status vocabulary: pending|in_progress|resolved|rejected.
    pub status: String,

    /// Free-text response recorded by the resolving admin.
    pub admin_response: Option<String>,

    pub resolved_by_admin_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SubmittedByUserId",
        to = "super::user::Column::Id"
    )]
    SubmittedBy,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubmittedBy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

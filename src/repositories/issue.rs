//! Issue repository.
//!
//! The issue lifecycle lives here: creation, assignment, status transitions,
//! seconding, deletion, and the hydrated read views. Multi-step mutations run
//! in a transaction; the guard table in [`crate::workflow`] decides every
//! status transition, and notifications go out only after commit.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::RepositoryError;
use crate::models::chart::{self, Entity as Chart};
use crate::models::comment::{self, Entity as Comment};
use crate::models::dashboard::{self, Entity as Dashboard};
use crate::models::issue::{self, Entity as Issue};
use crate::models::leaderboard_activity;
use crate::models::notification::{self, Entity as Notification};
use crate::models::team::{self, Entity as Team};
use crate::models::thread_second::{self, Entity as ThreadSecond};
use crate::models::user::{self, Entity as User};
use crate::notify::{Notifier, Outgoing, kind};
use crate::realtime::RealtimeEvent;
use crate::workflow::{self, Actor, IssueFacts, IssueStatus, Role};

/// Payload for creating an issue.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewIssue {
    pub dashboard_id: Uuid,
    pub chart_id: Option<Uuid>,
    pub subject: Option<String>,
    pub description: String,
}

/// Query filters for the issue list.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct IssueFilters {
    pub dashboard_id: Option<Uuid>,
    pub status: Option<String>,
    /// Team id, or `unassigned` to select issues with no team.
    pub assigned_team_id: Option<String>,
    pub submitted_by: Option<Uuid>,
    /// One of created_at|updated_at|status|priority; default updated_at.
    pub sort_by: Option<String>,
}

/// Query parameters for the team dashboard view.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TeamDashboardQuery {
    /// One of all|my_team|other_teams; default all.
    pub team_filter: Option<String>,
    pub status: Option<String>,
    /// `critical` selects issues with more than one seconder.
    pub priority: Option<String>,
    pub sort_by: Option<String>,
}

/// Admin patch where each nullable column distinguishes "absent" (skip) from
/// an explicit null (clear).
#[derive(Debug, Clone, Default)]
pub struct AdminIssuePatch {
    pub subject: Option<Option<String>>,
    pub description: Option<String>,
    pub chart_id: Option<Option<Uuid>>,
    pub assigned_team_id: Option<Option<Uuid>>,
    pub assigned_user_id: Option<Option<Uuid>>,
    pub status: Option<String>,
}

impl AdminIssuePatch {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.description.is_none()
            && self.chart_id.is_none()
            && self.assigned_team_id.is_none()
            && self.assigned_user_id.is_none()
            && self.status.is_none()
    }
}

/// An issue hydrated with related names and the second ledger.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueView {
    pub id: Uuid,
    pub dashboard_id: Uuid,
    pub dashboard_name: Option<String>,
    pub chart_id: Option<Uuid>,
    pub chart_name: Option<String>,
    pub submitted_by_user_id: Uuid,
    pub submitted_by_name: Option<String>,
    pub subject: Option<String>,
    pub description: String,
    pub status: String,
    pub priority: i32,
    pub assigned_team_id: Option<Uuid>,
    pub assigned_team_name: Option<String>,
    pub assigned_user_id: Option<Uuid>,
    pub assigned_user_name: Option<String>,
    pub second_count: u64,
    /// Whether the viewer has seconded this issue.
    pub is_seconded: bool,
    /// Whether the issue is assigned to the viewer's team.
    pub is_my_team: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

/// Team dashboard response: filtered issues plus team-level summary counts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamDashboard {
    pub issues: Vec<IssueView>,
    pub summary: TeamSummary,
}

/// Summary computed over the team-filtered set, before status/priority
/// filters narrow the issue list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamSummary {
    pub pending: u64,
    pub in_progress: u64,
    pub critical: u64,
    pub total_dashboards: u64,
}

fn actor_of(user: &CurrentUser) -> Actor {
    Actor {
        id: user.id,
        role: user.role,
        team_id: user.team_id,
    }
}

fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().into()
}

#[derive(Clone)]
pub struct IssueRepository {
    pub db: Arc<DatabaseConnection>,
    users: super::UserRepository,
    notifier: Notifier,
}

impl IssueRepository {
    pub fn new(db: Arc<DatabaseConnection>, users: super::UserRepository, notifier: Notifier) -> Self {
        Self { db, users, notifier }
    }

    /// Creates an issue: status pending, priority 1, team snapshotted from
    /// the dashboard. Each member of that team gets a `new_issue`
    /// notification.
    pub async fn create(
        &self,
        user: &CurrentUser,
        input: NewIssue,
    ) -> Result<IssueView, RepositoryError> {
        if input.description.trim().is_empty() {
            return Err(RepositoryError::validation(
                "Dashboard ID and description are required",
            ));
        }

        let dashboard = Dashboard::find_by_id(input.dashboard_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| RepositoryError::not_found("Dashboard not found"))?;

        if let Some(chart_id) = input.chart_id {
            let chart = Chart::find_by_id(chart_id)
                .one(self.db.as_ref())
                .await?
                .ok_or_else(|| RepositoryError::not_found("Chart not found"))?;
            if chart.dashboard_id != dashboard.id {
                return Err(RepositoryError::validation(
                    "Chart does not belong to this dashboard",
                ));
            }
        }

        let created_at = now();
        let inserted = issue::ActiveModel {
            id: Set(Uuid::new_v4()),
            dashboard_id: Set(dashboard.id),
            chart_id: Set(input.chart_id),
            submitted_by_user_id: Set(user.id),
            subject: Set(input.subject.clone()),
            description: Set(input.description),
            status: Set(IssueStatus::Pending.as_str().to_string()),
            priority: Set(1),
            assigned_team_id: Set(dashboard.assigned_team_id),
            assigned_user_id: Set(None),
            created_at: Set(created_at),
            updated_at: Set(created_at),
        }
        .insert(self.db.as_ref())
        .await?;

        if let Some(team_id) = inserted.assigned_team_id {
            let members = self.users.members_of_team(team_id).await?;
            let subject_label = inserted.subject.as_deref().unwrap_or("No Subject");
            let batch = members
                .into_iter()
                .map(|member| Outgoing {
                    recipient: member.id,
                    issue_id: Some(inserted.id),
                    kind: kind::NEW_ISSUE,
                    message: format!("New thread assigned to your team: {}", subject_label),
                    event: Some(RealtimeEvent::NewIssue {
                        issue_id: inserted.id,
                        dashboard_id: inserted.dashboard_id,
                        subject: inserted.subject.clone(),
                    }),
                })
                .collect();
            self.notifier.notify_many(self.db.as_ref(), batch).await;
        }

        self.view(user, inserted.id).await
    }

    /// Lists issues with filters; every role sees everything.
    pub async fn list(
        &self,
        user: &CurrentUser,
        filters: IssueFilters,
    ) -> Result<Vec<IssueView>, RepositoryError> {
        let mut query = Issue::find();

        if let Some(dashboard_id) = filters.dashboard_id {
            query = query.filter(issue::Column::DashboardId.eq(dashboard_id));
        }
        if let Some(status) = &filters.status {
            query = query.filter(issue::Column::Status.eq(status.as_str()));
        }
        if let Some(team) = &filters.assigned_team_id {
            if team == "unassigned" || team == "null" {
                query = query.filter(issue::Column::AssignedTeamId.is_null());
            } else {
                let team_id: Uuid = team
                    .parse()
                    .map_err(|_| RepositoryError::validation("Invalid team id"))?;
                query = query.filter(issue::Column::AssignedTeamId.eq(team_id));
            }
        }
        if let Some(submitted_by) = filters.submitted_by {
            query = query.filter(issue::Column::SubmittedByUserId.eq(submitted_by));
        }

        let rows = apply_sort(query, filters.sort_by.as_deref())
            .all(self.db.as_ref())
            .await?;
        self.hydrate(user, rows).await
    }

    /// Issues the caller created or seconded.
    pub async fn my_threads(
        &self,
        user: &CurrentUser,
        status: Option<String>,
        sort_by: Option<String>,
    ) -> Result<Vec<IssueView>, RepositoryError> {
        let seconded_ids: Vec<Uuid> = ThreadSecond::find()
            .filter(thread_second::Column::UserId.eq(user.id))
            .select_only()
            .column(thread_second::Column::IssueId)
            .into_tuple()
            .all(self.db.as_ref())
            .await?;

        let mut query = Issue::find().filter(
            Condition::any()
                .add(issue::Column::SubmittedByUserId.eq(user.id))
                .add(issue::Column::Id.is_in(seconded_ids)),
        );
        if let Some(status) = &status {
            query = query.filter(issue::Column::Status.eq(status.as_str()));
        }

        let rows = apply_sort(query, sort_by.as_deref())
            .all(self.db.as_ref())
            .await?;
        self.hydrate(user, rows).await
    }

    /// The data-science home view: team-filtered issues plus summary counts.
    /// The summary covers the whole team-filtered set; the status and
    /// priority filters only narrow the returned list.
    pub async fn team_dashboard(
        &self,
        user: &CurrentUser,
        params: TeamDashboardQuery,
    ) -> Result<TeamDashboard, RepositoryError> {
        let mut query = Issue::find();
        match (params.team_filter.as_deref(), user.team_id) {
            (Some("my_team"), Some(team_id)) => {
                query = query.filter(issue::Column::AssignedTeamId.eq(team_id));
            }
            (Some("other_teams"), Some(team_id)) => {
                query = query.filter(
                    Condition::any()
                        .add(issue::Column::AssignedTeamId.is_null())
                        .add(issue::Column::AssignedTeamId.ne(team_id)),
                );
            }
            _ => {}
        }

        let rows = apply_sort(query, params.sort_by.as_deref())
            .all(self.db.as_ref())
            .await?;
        let views = self.hydrate(user, rows).await?;

        let summary = TeamSummary {
            pending: views
                .iter()
                .filter(|v| v.status == IssueStatus::Pending.as_str())
                .count() as u64,
            in_progress: views
                .iter()
                .filter(|v| v.status == IssueStatus::InProgress.as_str())
                .count() as u64,
            critical: views.iter().filter(|v| v.second_count > 1).count() as u64,
            total_dashboards: views
                .iter()
                .map(|v| v.dashboard_id)
                .collect::<HashSet<_>>()
                .len() as u64,
        };

        let issues = views
            .into_iter()
            .filter(|v| match &params.status {
                Some(status) => &v.status == status,
                None => true,
            })
            .filter(|v| match params.priority.as_deref() {
                Some("critical") => v.second_count > 1,
                _ => true,
            })
            .collect();

        Ok(TeamDashboard { issues, summary })
    }

    /// Single hydrated issue.
    pub async fn view(&self, user: &CurrentUser, id: Uuid) -> Result<IssueView, RepositoryError> {
        let row = Issue::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| RepositoryError::not_found("Issue not found"))?;
        let mut views = self.hydrate(user, vec![row]).await?;
        views
            .pop()
            .ok_or_else(|| RepositoryError::not_found("Issue not found"))
    }

    /// Applies the guard table and records the status change. Completion by a
    /// data-science actor writes a `resolved` leaderboard row; the submitter
    /// is notified after commit.
    pub async fn update_status(
        &self,
        user: &CurrentUser,
        id: Uuid,
        requested: &str,
    ) -> Result<IssueView, RepositoryError> {
        let requested = IssueStatus::parse(requested)
            .ok_or_else(|| RepositoryError::validation("Invalid status"))?;

        let txn = self.db.begin().await?;

        let current = Issue::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Issue not found"))?;
        let current_status = IssueStatus::parse(&current.status)
            .ok_or_else(|| RepositoryError::validation("Invalid status"))?;

        let data_science_replies = Comment::find()
            .filter(comment::Column::IssueId.eq(id))
            .join(JoinType::InnerJoin, comment::Relation::Author.def())
            .filter(user::Column::Role.eq(Role::DataScience.as_str()))
            .count(&txn)
            .await?;

        let facts = IssueFacts {
            status: current_status,
            assigned_team_id: current.assigned_team_id,
            has_data_science_reply: data_science_replies > 0,
        };
        workflow::authorize_status_change(&actor_of(user), &facts, requested)
            .map_err(RepositoryError::forbidden)?;

        let submitter = current.submitted_by_user_id;
        let mut active: issue::ActiveModel = current.into();
        active.status = Set(requested.as_str().to_string());
        active.updated_at = Set(now());
        active.update(&txn).await?;

        if requested == IssueStatus::Complete && user.role == Role::DataScience {
            leaderboard_activity::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                issue_id: Set(id),
                action: Set("resolved".to_string()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        self.notifier
            .notify_many(
                self.db.as_ref(),
                vec![Outgoing {
                    recipient: submitter,
                    issue_id: Some(id),
                    kind: kind::STATUS_CHANGE,
                    message: format!(
                        "Your thread status has been updated to {}",
                        requested.as_str()
                    ),
                    event: Some(RealtimeEvent::StatusUpdate {
                        issue_id: id,
                        status: requested.as_str().to_string(),
                    }),
                }],
            )
            .await;

        self.view(user, id).await
    }

    /// Assigns a team; a pending issue is auto-promoted to in_progress and
    /// the submitter is told their thread is being worked.
    pub async fn assign_team(
        &self,
        user: &CurrentUser,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<IssueView, RepositoryError> {
        let txn = self.db.begin().await?;

        let current = Issue::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Issue not found"))?;
        Team::find_by_id(team_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Team not found"))?;

        let promoted = current.status == IssueStatus::Pending.as_str();
        let submitter = current.submitted_by_user_id;

        let mut active: issue::ActiveModel = current.into();
        active.assigned_team_id = Set(Some(team_id));
        if promoted {
            active.status = Set(IssueStatus::InProgress.as_str().to_string());
        }
        active.updated_at = Set(now());
        active.update(&txn).await?;

        txn.commit().await?;

        let members = self.users.members_of_team(team_id).await?;
        let mut batch: Vec<Outgoing> = members
            .into_iter()
            .map(|member| Outgoing {
                recipient: member.id,
                issue_id: Some(id),
                kind: kind::ASSIGNMENT,
                message: "A thread has been assigned to your team".to_string(),
                event: Some(RealtimeEvent::IssueAssigned {
                    issue_id: id,
                    assigned_team_id: Some(team_id),
                    assigned_user_id: None,
                }),
            })
            .collect();
        if promoted {
            batch.push(Outgoing {
                recipient: submitter,
                issue_id: Some(id),
                kind: kind::ASSIGNMENT,
                message: "Your thread has been assigned to a team and is now in progress"
                    .to_string(),
                event: Some(RealtimeEvent::StatusUpdate {
                    issue_id: id,
                    status: IssueStatus::InProgress.as_str().to_string(),
                }),
            });
        }
        self.notifier.notify_many(self.db.as_ref(), batch).await;

        self.view(user, id).await
    }

    /// Assigns a user; the issue's team becomes the assignee's team when they
    /// have one, otherwise the existing team is kept.
    pub async fn assign_user(
        &self,
        user: &CurrentUser,
        id: Uuid,
        assignee_id: Uuid,
    ) -> Result<IssueView, RepositoryError> {
        let txn = self.db.begin().await?;

        let current = Issue::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Issue not found"))?;
        let assignee = User::find_by_id(assignee_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("User not found"))?;

        let promoted = current.status == IssueStatus::Pending.as_str();
        let submitter = current.submitted_by_user_id;
        let team_id = assignee.team_id.or(current.assigned_team_id);

        let mut active: issue::ActiveModel = current.into();
        active.assigned_user_id = Set(Some(assignee_id));
        active.assigned_team_id = Set(team_id);
        if promoted {
            active.status = Set(IssueStatus::InProgress.as_str().to_string());
        }
        active.updated_at = Set(now());
        active.update(&txn).await?;

        txn.commit().await?;

        let mut batch = vec![Outgoing {
            recipient: assignee_id,
            issue_id: Some(id),
            kind: kind::ASSIGNMENT,
            message: "You have been assigned a thread".to_string(),
            event: Some(RealtimeEvent::IssueAssigned {
                issue_id: id,
                assigned_team_id: team_id,
                assigned_user_id: Some(assignee_id),
            }),
        }];
        if promoted {
            batch.push(Outgoing {
                recipient: submitter,
                issue_id: Some(id),
                kind: kind::ASSIGNMENT,
                message: "Your thread has been assigned and is now in progress".to_string(),
                event: Some(RealtimeEvent::StatusUpdate {
                    issue_id: id,
                    status: IssueStatus::InProgress.as_str().to_string(),
                }),
            });
        }
        self.notifier.notify_many(self.db.as_ref(), batch).await;

        self.view(user, id).await
    }

    /// Seconds an issue and recomputes its priority from the distinct
    /// seconder count.
    pub async fn second(&self, user: &CurrentUser, id: Uuid) -> Result<IssueView, RepositoryError> {
        let txn = self.db.begin().await?;

        let current = Issue::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Issue not found"))?;

        if current.submitted_by_user_id == user.id {
            return Err(RepositoryError::forbidden(
                "You cannot second your own thread",
            ));
        }

        let existing = ThreadSecond::find()
            .filter(thread_second::Column::IssueId.eq(id))
            .filter(thread_second::Column::UserId.eq(user.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(RepositoryError::conflict(
                "You have already seconded this thread",
            ));
        }

        thread_second::ActiveModel {
            id: Set(Uuid::new_v4()),
            issue_id: Set(id),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // Rows are unique per (issue, user), so the count is the distinct
        // seconder count.
        let seconders = ThreadSecond::find()
            .filter(thread_second::Column::IssueId.eq(id))
            .count(&txn)
            .await?;

        let mut active: issue::ActiveModel = current.into();
        active.priority = Set(workflow::derived_priority(seconders));
        active.updated_at = Set(now());
        active.update(&txn).await?;

        txn.commit().await?;

        self.view(user, id).await
    }

    /// Deletes an issue the caller owns, along with its comments, seconds,
    /// notifications, and leaderboard rows.
    pub async fn delete(&self, user: &CurrentUser, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let current = Issue::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Issue not found"))?;

        if current.submitted_by_user_id != user.id {
            return Err(RepositoryError::forbidden(
                "You can only delete your own threads",
            ));
        }
        if current.status == IssueStatus::InProgress.as_str() {
            return Err(RepositoryError::invalid_state(
                "Cannot delete thread that is in progress",
            ));
        }

        Comment::delete_many()
            .filter(comment::Column::IssueId.eq(id))
            .exec(&txn)
            .await?;
        ThreadSecond::delete_many()
            .filter(thread_second::Column::IssueId.eq(id))
            .exec(&txn)
            .await?;
        Notification::delete_many()
            .filter(notification::Column::IssueId.eq(id))
            .exec(&txn)
            .await?;
        leaderboard_activity::Entity::delete_many()
            .filter(leaderboard_activity::Column::IssueId.eq(id))
            .exec(&txn)
            .await?;
        Issue::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Admin field patch. Status changes still go through the guard table;
    /// explicit nulls clear nullable columns.
    pub async fn admin_update(
        &self,
        user: &CurrentUser,
        id: Uuid,
        patch: AdminIssuePatch,
    ) -> Result<IssueView, RepositoryError> {
        if patch.is_empty() {
            return Err(RepositoryError::validation("No fields to update"));
        }

        let txn = self.db.begin().await?;

        let current = Issue::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Issue not found"))?;

        let requested_status = match &patch.status {
            Some(value) => {
                let requested = IssueStatus::parse(value)
                    .ok_or_else(|| RepositoryError::validation("Invalid status"))?;
                let current_status = IssueStatus::parse(&current.status)
                    .ok_or_else(|| RepositoryError::validation("Invalid status"))?;
                let facts = IssueFacts {
                    status: current_status,
                    assigned_team_id: current.assigned_team_id,
                    has_data_science_reply: false,
                };
                workflow::authorize_status_change(&actor_of(user), &facts, requested)
                    .map_err(RepositoryError::forbidden)?;
                Some(requested)
            }
            None => None,
        };

        let mut active: issue::ActiveModel = current.into();
        if let Some(subject) = patch.subject {
            active.subject = Set(subject);
        }
        if let Some(description) = patch.description {
            if description.trim().is_empty() {
                return Err(RepositoryError::validation("Description cannot be empty"));
            }
            active.description = Set(description);
        }
        if let Some(chart_id) = patch.chart_id {
            active.chart_id = Set(chart_id);
        }
        if let Some(team_id) = patch.assigned_team_id {
            active.assigned_team_id = Set(team_id);
        }
        if let Some(user_id) = patch.assigned_user_id {
            active.assigned_user_id = Set(user_id);
        }
        if let Some(status) = requested_status {
            active.status = Set(status.as_str().to_string());
        }
        active.updated_at = Set(now());
        active.update(&txn).await?;

        txn.commit().await?;
        self.view(user, id).await
    }

    /// Batch-hydrates issue rows with related names and the second ledger.
    async fn hydrate(
        &self,
        viewer: &CurrentUser,
        rows: Vec<issue::Model>,
    ) -> Result<Vec<IssueView>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let issue_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let dashboard_ids: HashSet<Uuid> = rows.iter().map(|r| r.dashboard_id).collect();
        let chart_ids: HashSet<Uuid> = rows.iter().filter_map(|r| r.chart_id).collect();
        let team_ids: HashSet<Uuid> = rows.iter().filter_map(|r| r.assigned_team_id).collect();
        let user_ids: HashSet<Uuid> = rows
            .iter()
            .flat_map(|r| [Some(r.submitted_by_user_id), r.assigned_user_id])
            .flatten()
            .collect();

        let dashboards: HashMap<Uuid, String> = Dashboard::find()
            .filter(dashboard::Column::Id.is_in(dashboard_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();
        let charts: HashMap<Uuid, String> = Chart::find()
            .filter(chart::Column::Id.is_in(chart_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let teams: HashMap<Uuid, String> = Team::find()
            .filter(team::Column::Id.is_in(team_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();
        let users: HashMap<Uuid, String> = User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|u| (u.id, u.name))
            .collect();

        let seconds = ThreadSecond::find()
            .filter(thread_second::Column::IssueId.is_in(issue_ids))
            .all(self.db.as_ref())
            .await?;
        let mut second_counts: HashMap<Uuid, u64> = HashMap::new();
        let mut seconded_by_viewer: HashSet<Uuid> = HashSet::new();
        for second in seconds {
            *second_counts.entry(second.issue_id).or_insert(0) += 1;
            if second.user_id == viewer.id {
                seconded_by_viewer.insert(second.issue_id);
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| IssueView {
                dashboard_name: dashboards.get(&row.dashboard_id).cloned(),
                chart_name: row.chart_id.and_then(|id| charts.get(&id).cloned()),
                submitted_by_name: users.get(&row.submitted_by_user_id).cloned(),
                assigned_team_name: row
                    .assigned_team_id
                    .and_then(|id| teams.get(&id).cloned()),
                assigned_user_name: row
                    .assigned_user_id
                    .and_then(|id| users.get(&id).cloned()),
                second_count: second_counts.get(&row.id).copied().unwrap_or(0),
                is_seconded: seconded_by_viewer.contains(&row.id),
                is_my_team: row.assigned_team_id.is_some()
                    && row.assigned_team_id == viewer.team_id,
                id: row.id,
                dashboard_id: row.dashboard_id,
                chart_id: row.chart_id,
                submitted_by_user_id: row.submitted_by_user_id,
                subject: row.subject,
                description: row.description,
                status: row.status,
                priority: row.priority,
                assigned_team_id: row.assigned_team_id,
                assigned_user_id: row.assigned_user_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

fn apply_sort(
    query: sea_orm::Select<Issue>,
    sort_by: Option<&str>,
) -> sea_orm::Select<Issue> {
    let column = match sort_by {
        Some("created_at") => issue::Column::CreatedAt,
        Some("status") => issue::Column::Status,
        Some("priority") => issue::Column::Priority,
        _ => issue::Column::UpdatedAt,
    };
    query.order_by_desc(column)
}

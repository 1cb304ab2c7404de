//! # Workflow Rules
//!
//! The pure state machine behind the issue and admin-request lifecycles:
//! role/status vocabularies, the role-gated status transition table, and
//! priority derivation from the second ledger. Everything here is free of I/O
//! so the guard table can be tested exhaustively.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Business,
    DataScience,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Business => "business",
            Role::DataScience => "data_science",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "business" => Some(Role::Business),
            "data_science" => Some(Role::DataScience),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Issue status. Forward-only in normal flow: pending -> in_progress -> complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Complete,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(IssueStatus::Pending),
            "in_progress" => Some(IssueStatus::InProgress),
            "complete" => Some(IssueStatus::Complete),
            _ => None,
        }
    }
}

/// Admin-request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRequestStatus {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

impl AdminRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRequestStatus::Pending => "pending",
            AdminRequestStatus::InProgress => "in_progress",
            AdminRequestStatus::Resolved => "resolved",
            AdminRequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(AdminRequestStatus::Pending),
            "in_progress" => Some(AdminRequestStatus::InProgress),
            "resolved" => Some(AdminRequestStatus::Resolved),
            "rejected" => Some(AdminRequestStatus::Rejected),
            _ => None,
        }
    }

    /// Resolved and rejected are terminal except for an admin reopening to
    /// in_progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AdminRequestStatus::Resolved | AdminRequestStatus::Rejected
        )
    }
}

/// Escalation request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    NewDashboard,
    AddChart,
    AddTeamMember,
    ModifyDashboard,
    Other,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::NewDashboard => "new_dashboard",
            RequestType::AddChart => "add_chart",
            RequestType::AddTeamMember => "add_team_member",
            RequestType::ModifyDashboard => "modify_dashboard",
            RequestType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new_dashboard" => Some(RequestType::NewDashboard),
            "add_chart" => Some(RequestType::AddChart),
            "add_team_member" => Some(RequestType::AddTeamMember),
            "modify_dashboard" => Some(RequestType::ModifyDashboard),
            "other" => Some(RequestType::Other),
            _ => None,
        }
    }
}

/// The acting user, as the guards need to see them.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub team_id: Option<Uuid>,
}

/// The facts about an issue that the status guard table consults.
#[derive(Debug, Clone, Copy)]
pub struct IssueFacts {
    pub status: IssueStatus,
    pub assigned_team_id: Option<Uuid>,
    /// Whether at least one comment authored by a data_science user exists.
    pub has_data_science_reply: bool,
}

pub const REASON_ADMIN_CANNOT_COMPLETE: &str =
    "Only the assigned team can mark threads as complete. Admin cannot mark threads as complete.";
pub const REASON_COMPLETE_NEEDS_TEAM: &str =
    "Thread must be assigned to a team before it can be marked complete";
pub const REASON_COMPLETE_WRONG_TEAM: &str =
    "You can only mark complete threads assigned to your team";
pub const REASON_COMPLETE_NEEDS_DATA_SCIENCE: &str =
    "Only data science team members can mark threads as complete";
pub const REASON_COMPLETE_NEEDS_REPLY: &str =
    "Thread needs at least one data science reply before it can be marked complete";
pub const REASON_STATUS_AUTOMATIC: &str =
    "You cannot change status to this value. Status changes are automatic on assignment.";
pub const REASON_BUSINESS_CANNOT_UPDATE: &str =
    "Only data science or admin users can update thread status";

/// The role-gated status transition table.
///
/// | Requested   | business  | data_science                        | admin     |
/// |-------------|-----------|-------------------------------------|-----------|
/// | pending     | forbidden | forbidden                           | allowed   |
/// | in_progress | forbidden | only if current = pending           | allowed   |
/// | complete    | forbidden | team set, actor's team, ds reply    | forbidden |
pub fn authorize_status_change(
    actor: &Actor,
    issue: &IssueFacts,
    requested: IssueStatus,
) -> Result<(), &'static str> {
    if actor.role == Role::Business {
        return Err(REASON_BUSINESS_CANNOT_UPDATE);
    }

    if requested == IssueStatus::Complete {
        if actor.role == Role::Admin {
            return Err(REASON_ADMIN_CANNOT_COMPLETE);
        }

        // actor.role == DataScience from here on
        let Some(assigned_team_id) = issue.assigned_team_id else {
            return Err(REASON_COMPLETE_NEEDS_TEAM);
        };

        if actor.team_id != Some(assigned_team_id) {
            return Err(REASON_COMPLETE_WRONG_TEAM);
        }

        if actor.role != Role::DataScience {
            return Err(REASON_COMPLETE_NEEDS_DATA_SCIENCE);
        }

        if !issue.has_data_science_reply {
            return Err(REASON_COMPLETE_NEEDS_REPLY);
        }

        return Ok(());
    }

    if actor.role == Role::DataScience {
        // pending is never reachable again, and in_progress is only a manual
        // recovery from pending; assignment normally drives it.
        if requested == IssueStatus::Pending
            || (requested == IssueStatus::InProgress && issue.status != IssueStatus::Pending)
        {
            return Err(REASON_STATUS_AUTOMATIC);
        }
    }

    Ok(())
}

pub const REASON_REQUEST_TERMINAL: &str =
    "Resolved or rejected requests can only be reopened to in progress";

/// Guard for admin-request status updates (actor is always an admin; the
/// route enforces the role).
pub fn authorize_request_status_change(
    current: AdminRequestStatus,
    requested: AdminRequestStatus,
) -> Result<(), &'static str> {
    if current.is_terminal() && requested != AdminRequestStatus::InProgress && requested != current {
        return Err(REASON_REQUEST_TERMINAL);
    }
    Ok(())
}

/// Issue priority derived from the second ledger: the distinct seconder
/// count, but never below the baseline of 1.
pub fn derived_priority(second_count: u64) -> i32 {
    second_count.max(1).min(i32::MAX as u64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, team_id: Option<Uuid>) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
            team_id,
        }
    }

    fn issue(status: IssueStatus, team: Option<Uuid>, has_reply: bool) -> IssueFacts {
        IssueFacts {
            status,
            assigned_team_id: team,
            has_data_science_reply: has_reply,
        }
    }

    #[test]
    fn test_business_cannot_update_status_at_all() {
        let team = Uuid::new_v4();
        let business = actor(Role::Business, None);
        for requested in [
            IssueStatus::Pending,
            IssueStatus::InProgress,
            IssueStatus::Complete,
        ] {
            let result = authorize_status_change(
                &business,
                &issue(IssueStatus::Pending, Some(team), true),
                requested,
            );
            assert_eq!(result, Err(REASON_BUSINESS_CANNOT_UPDATE));
        }
    }

    #[test]
    fn test_admin_can_set_pending_and_in_progress() {
        let admin = actor(Role::Admin, None);
        let current = issue(IssueStatus::InProgress, None, false);

        assert!(authorize_status_change(&admin, &current, IssueStatus::Pending).is_ok());
        assert!(authorize_status_change(&admin, &current, IssueStatus::InProgress).is_ok());
    }

    #[test]
    fn test_admin_can_never_complete() {
        let team = Uuid::new_v4();
        let admin = actor(Role::Admin, Some(team));
        let current = issue(IssueStatus::InProgress, Some(team), true);

        assert_eq!(
            authorize_status_change(&admin, &current, IssueStatus::Complete),
            Err(REASON_ADMIN_CANNOT_COMPLETE)
        );
    }

    #[test]
    fn test_data_science_cannot_reset_to_pending() {
        let team = Uuid::new_v4();
        let ds = actor(Role::DataScience, Some(team));
        let current = issue(IssueStatus::InProgress, Some(team), true);

        assert_eq!(
            authorize_status_change(&ds, &current, IssueStatus::Pending),
            Err(REASON_STATUS_AUTOMATIC)
        );
    }

    #[test]
    fn test_data_science_in_progress_only_from_pending() {
        let team = Uuid::new_v4();
        let ds = actor(Role::DataScience, Some(team));

        let pending = issue(IssueStatus::Pending, Some(team), false);
        assert!(authorize_status_change(&ds, &pending, IssueStatus::InProgress).is_ok());

        let in_progress = issue(IssueStatus::InProgress, Some(team), false);
        assert_eq!(
            authorize_status_change(&ds, &in_progress, IssueStatus::InProgress),
            Err(REASON_STATUS_AUTOMATIC)
        );

        let complete = issue(IssueStatus::Complete, Some(team), true);
        assert_eq!(
            authorize_status_change(&ds, &complete, IssueStatus::InProgress),
            Err(REASON_STATUS_AUTOMATIC)
        );
    }

    #[test]
    fn test_complete_requires_assignment() {
        let ds = actor(Role::DataScience, Some(Uuid::new_v4()));
        let unassigned = issue(IssueStatus::InProgress, None, true);

        assert_eq!(
            authorize_status_change(&ds, &unassigned, IssueStatus::Complete),
            Err(REASON_COMPLETE_NEEDS_TEAM)
        );
    }

    #[test]
    fn test_complete_requires_matching_team() {
        let ds = actor(Role::DataScience, Some(Uuid::new_v4()));
        let other_team = issue(IssueStatus::InProgress, Some(Uuid::new_v4()), true);

        assert_eq!(
            authorize_status_change(&ds, &other_team, IssueStatus::Complete),
            Err(REASON_COMPLETE_WRONG_TEAM)
        );

        // No team at all also cannot match.
        let teamless = actor(Role::DataScience, None);
        assert_eq!(
            authorize_status_change(&teamless, &other_team, IssueStatus::Complete),
            Err(REASON_COMPLETE_WRONG_TEAM)
        );
    }

    #[test]
    fn test_complete_requires_data_science_reply() {
        let team = Uuid::new_v4();
        let ds = actor(Role::DataScience, Some(team));
        let no_reply = issue(IssueStatus::InProgress, Some(team), false);

        assert_eq!(
            authorize_status_change(&ds, &no_reply, IssueStatus::Complete),
            Err(REASON_COMPLETE_NEEDS_REPLY)
        );

        let with_reply = issue(IssueStatus::InProgress, Some(team), true);
        assert!(authorize_status_change(&ds, &with_reply, IssueStatus::Complete).is_ok());
    }

    #[test]
    fn test_request_terminal_statuses_reopen_only_to_in_progress() {
        for terminal in [AdminRequestStatus::Resolved, AdminRequestStatus::Rejected] {
            assert!(
                authorize_request_status_change(terminal, AdminRequestStatus::InProgress).is_ok()
            );
            assert_eq!(
                authorize_request_status_change(terminal, AdminRequestStatus::Pending),
                Err(REASON_REQUEST_TERMINAL)
            );
        }

        assert!(
            authorize_request_status_change(
                AdminRequestStatus::Pending,
                AdminRequestStatus::Resolved
            )
            .is_ok()
        );
        assert!(
            authorize_request_status_change(
                AdminRequestStatus::InProgress,
                AdminRequestStatus::Rejected
            )
            .is_ok()
        );
    }

    #[test]
    fn test_priority_floor() {
        assert_eq!(derived_priority(0), 1);
        assert_eq!(derived_priority(1), 1);
        assert_eq!(derived_priority(2), 2);
        assert_eq!(derived_priority(7), 7);
    }

    #[test]
    fn test_vocabulary_round_trips() {
        for role in [Role::Business, Role::DataScience, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        for status in [
            IssueStatus::Pending,
            IssueStatus::InProgress,
            IssueStatus::Complete,
        ] {
            assert_eq!(IssueStatus::parse(status.as_str()), Some(status));
        }
        for status in [
            AdminRequestStatus::Pending,
            AdminRequestStatus::InProgress,
            AdminRequestStatus::Resolved,
            AdminRequestStatus::Rejected,
        ] {
            assert_eq!(AdminRequestStatus::parse(status.as_str()), Some(status));
        }
        for kind in [
            RequestType::NewDashboard,
            RequestType::AddChart,
            RequestType::AddTeamMember,
            RequestType::ModifyDashboard,
            RequestType::Other,
        ] {
            assert_eq!(RequestType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(IssueStatus::parse("done"), None);
    }
}

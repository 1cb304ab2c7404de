//! # Tests for Handlers
//!
//! End-to-end tests that drive the assembled router with real requests
//! against an in-memory database, one scenario per workflow rule.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth;
use crate::config::AppConfig;
use crate::models::{dashboard, team, user};
use crate::server::{AppState, create_app};

const SECRET: &str = "test-secret";

async fn setup() -> (Router, AppState) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let config = AppConfig {
        jwt_secret: SECRET.to_string(),
        ..Default::default()
    };
    let state = AppState::new(config, db);
    (create_app(state.clone()), state)
}

async fn seed_team(state: &AppState, name: &str) -> team::Model {
    team::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await
    .unwrap()
}

async fn seed_user(state: &AppState, role: &str, team_id: Option<Uuid>) -> user::Model {
    let id = Uuid::new_v4();
    user::ActiveModel {
        id: Set(id),
        name: Set(format!("{} user", role)),
        email: Set(format!("{}@example.com", id)),
        role: Set(role.to_string()),
        team_id: Set(team_id),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await
    .unwrap()
}

async fn seed_dashboard(state: &AppState, name: &str, team_id: Option<Uuid>) -> dashboard::Model {
    dashboard::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        assigned_team_id: Set(team_id),
        ..Default::default()
    }
    .insert(state.db.as_ref())
    .await
    .unwrap()
}

fn token_for(user: &user::Model) -> String {
    auth::issue_token(SECRET, 3600, user.id).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Creates an issue through the API and returns its JSON view.
async fn raise_issue(app: &Router, token: &str, dashboard_id: Uuid, subject: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/issues",
        Some(token),
        Some(json!({
            "dashboard_id": dashboard_id,
            "subject": subject,
            "description": "Numbers look wrong"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["issue"].clone()
}

#[tokio::test]
async fn test_root_is_public() {
    let (app, _state) = setup().await;

    let (status, body) = send(&app, "GET", "/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "feedbackhub");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _state) = setup().await;

    let (status, body) = send(&app, "GET", "/issues", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Missing bearer token");
    assert!(body["trace_id"].is_string());
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let (app, _state) = setup().await;

    let (status, body) = send(&app, "GET", "/issues", Some("not-a-jwt"), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_token_for_deleted_account_is_rejected() {
    let (app, _state) = setup().await;
    let token = auth::issue_token(SECRET, 3600, Uuid::new_v4()).unwrap();

    let (status, body) = send(&app, "GET", "/issues", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Account no longer exists");
}

#[tokio::test]
async fn test_create_issue_snapshots_team_and_notifies_members() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let ds = seed_user(&state, "data_science", Some(team.id)).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", Some(team.id)).await;

    let issue = raise_issue(&app, &token_for(&business), dash.id, "Revenue drop").await;

    assert_eq!(issue["status"], "pending");
    assert_eq!(issue["priority"], 1);
    assert_eq!(issue["assigned_team_id"], json!(team.id));
    assert_eq!(issue["dashboard_name"], "Revenue");
    assert_eq!(issue["second_count"], 0);

    let (status, body) = send(&app, "GET", "/notifications", Some(&token_for(&ds)), None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = body["notifications"].as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["kind"], "new_issue");
    assert_eq!(
        feed[0]["message"],
        "New thread assigned to your team: Revenue drop"
    );
}

#[tokio::test]
async fn test_create_issue_requires_description() {
    let (app, state) = setup().await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/issues",
        Some(&token_for(&business)),
        Some(json!({ "dashboard_id": dash.id, "description": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert_eq!(body["message"], "Dashboard ID and description are required");
}

#[tokio::test]
async fn test_create_issue_rejects_unknown_dashboard() {
    let (app, state) = setup().await;
    let business = seed_user(&state, "business", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/issues",
        Some(&token_for(&business)),
        Some(json!({ "dashboard_id": Uuid::new_v4(), "description": "broken" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Dashboard not found");
}

#[tokio::test]
async fn test_create_issue_requires_business_role() {
    let (app, state) = setup().await;
    let ds = seed_user(&state, "data_science", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/issues",
        Some(&token_for(&ds)),
        Some(json!({ "dashboard_id": dash.id, "description": "broken" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Insufficient permissions");
}

#[tokio::test]
async fn test_seconding_own_thread_is_forbidden() {
    let (app, state) = setup().await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;
    let token = token_for(&business);

    let issue = raise_issue(&app, &token, dash.id, "Mine").await;
    let uri = format!("/issues/{}/second", issue["id"].as_str().unwrap());

    let (status, body) = send(&app, "POST", &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You cannot second your own thread");
}

#[tokio::test]
async fn test_seconding_twice_conflicts_and_priority_tracks_count() {
    let (app, state) = setup().await;
    let owner = seed_user(&state, "business", None).await;
    let peer = seed_user(&state, "business", None).await;
    let other = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;

    let issue = raise_issue(&app, &token_for(&owner), dash.id, "Shared pain").await;
    let uri = format!("/issues/{}/second", issue["id"].as_str().unwrap());

    let peer_token = token_for(&peer);
    let (status, body) = send(&app, "POST", &uri, Some(&peer_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issue"]["second_count"], 1);
    assert_eq!(body["issue"]["priority"], 1);

    let (status, body) = send(&app, "POST", &uri, Some(&peer_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "You have already seconded this thread");

    let (status, body) = send(&app, "POST", &uri, Some(&token_for(&other)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issue"]["second_count"], 2);
    assert_eq!(body["issue"]["priority"], 2);
}

#[tokio::test]
async fn test_business_cannot_change_status() {
    let (app, state) = setup().await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;
    let token = token_for(&business);

    let issue = raise_issue(&app, &token, dash.id, "Mine").await;
    let uri = format!("/issues/{}/status", issue["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&token),
        Some(json!({ "status": "in_progress" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Only data science or admin users can update thread status"
    );
}

#[tokio::test]
async fn test_admin_cannot_mark_complete() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let admin = seed_user(&state, "admin", None).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", Some(team.id)).await;

    let issue = raise_issue(&app, &token_for(&business), dash.id, "Mine").await;
    let uri = format!("/issues/{}/status", issue["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&token_for(&admin)),
        Some(json!({ "status": "complete" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Only the assigned team can mark threads as complete. Admin cannot mark threads as complete."
    );
}

#[tokio::test]
async fn test_complete_requires_reply_then_succeeds() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let ds = seed_user(&state, "data_science", Some(team.id)).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", Some(team.id)).await;

    let issue = raise_issue(&app, &token_for(&business), dash.id, "Mine").await;
    let issue_id = issue["id"].as_str().unwrap().to_string();
    let status_uri = format!("/issues/{}/status", issue_id);
    let ds_token = token_for(&ds);

    let (status, body) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(&ds_token),
        Some(json!({ "status": "complete" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Thread needs at least one data science reply before it can be marked complete"
    );

    let (status, _body) = send(
        &app,
        "POST",
        "/comments",
        Some(&ds_token),
        Some(json!({ "issue_id": issue_id, "body": "Looking into it" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(&ds_token),
        Some(json!({ "status": "complete" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["issue"]["status"], "complete");
}

#[tokio::test]
async fn test_data_science_reply_promotes_pending_thread() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let ds = seed_user(&state, "data_science", Some(team.id)).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", Some(team.id)).await;
    let business_token = token_for(&business);

    let issue = raise_issue(&app, &business_token, dash.id, "Mine").await;
    let issue_id = issue["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/comments",
        Some(&token_for(&ds)),
        Some(json!({ "issue_id": issue_id, "body": "On it" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["comment"]["user_role"], "data_science");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/issues/{}", issue_id),
        Some(&business_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issue"]["status"], "in_progress");

    // The submitter hears about both the reply and the promotion.
    let (_, body) = send(&app, "GET", "/notifications", Some(&business_token), None).await;
    let kinds: Vec<&str> = body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"reply"));
    assert!(kinds.contains(&"status_change"));
}

#[tokio::test]
async fn test_business_can_only_reply_to_own_threads() {
    let (app, state) = setup().await;
    let owner = seed_user(&state, "business", None).await;
    let stranger = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;

    let issue = raise_issue(&app, &token_for(&owner), dash.id, "Mine").await;

    let (status, body) = send(
        &app,
        "POST",
        "/comments",
        Some(&token_for(&stranger)),
        Some(json!({ "issue_id": issue["id"], "body": "me too" })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only reply to your own threads");
}

#[tokio::test]
async fn test_comment_edit_is_author_only() {
    let (app, state) = setup().await;
    let owner = seed_user(&state, "business", None).await;
    let ds = seed_user(&state, "data_science", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;
    let owner_token = token_for(&owner);

    let issue = raise_issue(&app, &owner_token, dash.id, "Mine").await;
    let (status, body) = send(
        &app,
        "POST",
        "/comments",
        Some(&owner_token),
        Some(json!({ "issue_id": issue["id"], "body": "first draft" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = body["comment"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/comments/{}", comment_id),
        Some(&token_for(&ds)),
        Some(json!({ "body": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only edit your own comments");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/comments/{}", comment_id),
        Some(&owner_token),
        Some(json!({ "body": "second draft" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comment"]["body"], "second draft");
}

#[tokio::test]
async fn test_assign_team_promotes_and_notifies() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let ds = seed_user(&state, "data_science", Some(team.id)).await;
    let admin = seed_user(&state, "admin", None).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;
    let business_token = token_for(&business);

    let issue = raise_issue(&app, &business_token, dash.id, "Mine").await;
    assert_eq!(issue["assigned_team_id"], Value::Null);

    let uri = format!("/admin/issues/{}/assign-team", issue["id"].as_str().unwrap());
    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&token_for(&admin)),
        Some(json!({ "team_id": team.id })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["issue"]["status"], "in_progress");
    assert_eq!(body["issue"]["assigned_team_id"], json!(team.id));
    assert_eq!(body["issue"]["assigned_team_name"], "Analytics");

    let (_, body) = send(&app, "GET", "/notifications", Some(&token_for(&ds)), None).await;
    let messages: Vec<&str> = body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["message"].as_str().unwrap())
        .collect();
    assert!(messages.contains(&"A thread has been assigned to your team"));

    let (_, body) = send(&app, "GET", "/notifications", Some(&business_token), None).await;
    let messages: Vec<&str> = body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["message"].as_str().unwrap())
        .collect();
    assert!(
        messages.contains(&"Your thread has been assigned to a team and is now in progress")
    );
}

#[tokio::test]
async fn test_assign_user_backfills_team_from_assignee() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let ds = seed_user(&state, "data_science", Some(team.id)).await;
    let admin = seed_user(&state, "admin", None).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;

    let issue = raise_issue(&app, &token_for(&business), dash.id, "Mine").await;
    let uri = format!("/admin/issues/{}/assign-user", issue["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(&token_for(&admin)),
        Some(json!({ "user_id": ds.id })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["issue"]["status"], "in_progress");
    assert_eq!(body["issue"]["assigned_user_id"], json!(ds.id));
    assert_eq!(body["issue"]["assigned_team_id"], json!(team.id));

    let (_, body) = send(&app, "GET", "/notifications", Some(&token_for(&ds)), None).await;
    let messages: Vec<&str> = body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["message"].as_str().unwrap())
        .collect();
    assert!(messages.contains(&"You have been assigned a thread"));
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let (app, state) = setup().await;
    let ds = seed_user(&state, "data_science", None).await;

    let (status, body) = send(&app, "GET", "/admin/stats", Some(&token_for(&ds)), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Insufficient permissions");
}

#[tokio::test]
async fn test_delete_own_pending_thread() {
    let (app, state) = setup().await;
    let owner = seed_user(&state, "business", None).await;
    let stranger = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;
    let owner_token = token_for(&owner);

    let issue = raise_issue(&app, &owner_token, dash.id, "Mine").await;
    let uri = format!("/issues/{}", issue["id"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &uri, Some(&token_for(&stranger)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only delete your own threads");

    let (status, body) = send(&app, "DELETE", &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Thread deleted successfully");

    let (status, _) = send(&app, "GET", &uri, Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cannot_delete_in_progress_thread() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let admin = seed_user(&state, "admin", None).await;
    let owner = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;
    let owner_token = token_for(&owner);

    let issue = raise_issue(&app, &owner_token, dash.id, "Mine").await;
    let issue_id = issue["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/issues/{}/assign-team", issue_id),
        Some(&token_for(&admin)),
        Some(json!({ "team_id": team.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/issues/{}", issue_id),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE");
    assert_eq!(body["message"], "Cannot delete thread that is in progress");
}

#[tokio::test]
async fn test_my_threads_covers_created_and_seconded() {
    let (app, state) = setup().await;
    let owner = seed_user(&state, "business", None).await;
    let peer = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;
    let peer_token = token_for(&peer);

    let mine = raise_issue(&app, &peer_token, dash.id, "Raised by me").await;
    let theirs = raise_issue(&app, &token_for(&owner), dash.id, "Raised by them").await;
    let ignored = raise_issue(&app, &token_for(&owner), dash.id, "Not mine").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/issues/{}/second", theirs["id"].as_str().unwrap()),
        Some(&peer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/issues/my-threads", Some(&peer_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&mine["id"].as_str().unwrap()));
    assert!(ids.contains(&theirs["id"].as_str().unwrap()));
    assert!(!ids.contains(&ignored["id"].as_str().unwrap()));
}

#[tokio::test]
async fn test_team_dashboard_summary_ignores_status_filter() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let ds = seed_user(&state, "data_science", Some(team.id)).await;
    let business = seed_user(&state, "business", None).await;
    let peer = seed_user(&state, "business", None).await;
    let admin = seed_user(&state, "admin", None).await;
    let dash = seed_dashboard(&state, "Revenue", Some(team.id)).await;
    let business_token = token_for(&business);

    let first = raise_issue(&app, &business_token, dash.id, "First").await;
    let _second = raise_issue(&app, &business_token, dash.id, "Second").await;

    // Promote one so the summary has both buckets.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/issues/{}/assign-team", first["id"].as_str().unwrap()),
        Some(&token_for(&admin)),
        Some(json!({ "team_id": team.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // One extra seconder is not critical; critical needs more than one.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/issues/{}/second", first["id"].as_str().unwrap()),
        Some(&token_for(&peer)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        "/issues/team/dashboard?team_filter=my_team&status=pending",
        Some(&token_for(&ds)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    // The list honors the status filter; the summary does not.
    assert_eq!(body["issues"].as_array().unwrap().len(), 1);
    assert_eq!(body["summary"]["pending"], 1);
    assert_eq!(body["summary"]["in_progress"], 1);
    assert_eq!(body["summary"]["critical"], 0);
    assert_eq!(body["summary"]["total_dashboards"], 1);

    let (status, body) = send(
        &app,
        "GET",
        "/issues/team/dashboard",
        Some(&business_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Insufficient permissions");
}

#[tokio::test]
async fn test_issue_list_filters_unassigned() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let admin = seed_user(&state, "admin", None).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;
    let business_token = token_for(&business);

    let assigned = raise_issue(&app, &business_token, dash.id, "Assigned").await;
    let orphan = raise_issue(&app, &business_token, dash.id, "Orphan").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!(
            "/admin/issues/{}/assign-team",
            assigned["id"].as_str().unwrap()
        ),
        Some(&token_for(&admin)),
        Some(json!({ "team_id": team.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        "/issues?assigned_team_id=unassigned",
        Some(&business_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let issues = body["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["id"], orphan["id"]);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/issues?assigned_team_id={}", team.id),
        Some(&business_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let issues = body["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["id"], assigned["id"]);
}

#[tokio::test]
async fn test_admin_patch_clears_with_explicit_null() {
    let (app, state) = setup().await;
    let admin = seed_user(&state, "admin", None).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", None).await;
    let admin_token = token_for(&admin);

    let issue = raise_issue(&app, &token_for(&business), dash.id, "Keep me").await;
    let uri = format!("/admin/issues/{}", issue["id"].as_str().unwrap());

    // Omitted fields stay untouched.
    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "description": "rewritten" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["issue"]["description"], "rewritten");
    assert_eq!(body["issue"]["subject"], "Keep me");

    // An explicit null clears the nullable column.
    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&admin_token),
        Some(json!({ "subject": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["issue"]["subject"], Value::Null);
    assert_eq!(body["issue"]["description"], "rewritten");

    let (status, body) = send(&app, "PATCH", &uri, Some(&admin_token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No fields to update");
}

#[tokio::test]
async fn test_admin_stats_counts_the_system() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let admin = seed_user(&state, "admin", None).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", Some(team.id)).await;

    raise_issue(&app, &token_for(&business), dash.id, "One").await;
    raise_issue(&app, &token_for(&business), dash.id, "Two").await;

    let (status, body) = send(&app, "GET", "/admin/stats", Some(&token_for(&admin)), None).await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["stats"]["total_users"], 2);
    assert_eq!(body["stats"]["total_teams"], 1);
    assert_eq!(body["stats"]["total_dashboards"], 1);
    assert_eq!(body["stats"]["total_issues"], 2);
    assert_eq!(body["stats"]["pending_issues"], 2);
    assert_eq!(body["stats"]["complete_issues"], 0);
}

#[tokio::test]
async fn test_delete_team_orphans_members() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let ds = seed_user(&state, "data_science", Some(team.id)).await;
    let admin = seed_user(&state, "admin", None).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/admin/teams/{}", team.id),
        Some(&token_for(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Team deleted successfully");

    let member = state.users.find_by_id(ds.id).await.unwrap().unwrap();
    assert_eq!(member.team_id, None);
}

#[tokio::test]
async fn test_admin_request_lifecycle() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let ds = seed_user(&state, "data_science", Some(team.id)).await;
    let admin = seed_user(&state, "admin", None).await;
    let ds_token = token_for(&ds);
    let admin_token = token_for(&admin);

    let (status, body) = send(
        &app,
        "POST",
        "/admin-requests",
        Some(&ds_token),
        Some(json!({
            "request_type": "new_dashboard",
            "subject": "Churn dashboard",
            "description": "We need churn visibility"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let request_id = body["request"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["request"]["status"], "pending");
    // Team context defaults to the submitter's team.
    assert_eq!(body["request"]["team_id"], json!(team.id));

    // Admins are notified of the new request.
    let (_, body) = send(&app, "GET", "/notifications", Some(&admin_token), None).await;
    let feed = body["notifications"].as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["kind"], "admin_request");

    let status_uri = format!("/admin-requests/{}/status", request_id);
    let (status, body) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(&admin_token),
        Some(json!({ "status": "resolved", "admin_response": "Shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["request"]["status"], "resolved");
    assert_eq!(body["request"]["admin_response"], "Shipped");
    assert_eq!(body["request"]["resolved_by_admin_id"], json!(admin.id));

    // Terminal requests only reopen to in_progress.
    let (status, body) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(&admin_token),
        Some(json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE");
    assert_eq!(
        body["message"],
        "Resolved or rejected requests can only be reopened to in progress"
    );

    let (status, body) = send(
        &app,
        "PATCH",
        &status_uri,
        Some(&admin_token),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "in_progress");
    // The earlier response sticks unless replaced.
    assert_eq!(body["request"]["admin_response"], "Shipped");
}

#[tokio::test]
async fn test_admin_request_visibility_and_delete_rules() {
    let (app, state) = setup().await;
    let ds = seed_user(&state, "data_science", None).await;
    let other_ds = seed_user(&state, "data_science", None).await;
    let business = seed_user(&state, "business", None).await;
    let admin = seed_user(&state, "admin", None).await;
    let ds_token = token_for(&ds);

    let (status, body) = send(
        &app,
        "POST",
        "/admin-requests",
        Some(&ds_token),
        Some(json!({
            "request_type": "add_chart",
            "subject": "Breakdown chart",
            "description": "Split revenue by region"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let request_id = body["request"]["id"].as_str().unwrap().to_string();
    let request_uri = format!("/admin-requests/{}", request_id);

    // Business users have no request surface at all.
    let (status, _) = send(
        &app,
        "GET",
        "/admin-requests",
        Some(&token_for(&business)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Another data-science user cannot read it, and their list is empty.
    let other_token = token_for(&other_ds);
    let (status, body) = send(&app, "GET", &request_uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied");

    let (status, body) = send(&app, "GET", "/admin-requests", Some(&other_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"].as_array().unwrap().len(), 0);

    let (status, body) = send(&app, "DELETE", &request_uri, Some(&other_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only delete your own requests");

    // Once worked, the submitter can no longer delete it; an admin can.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("{}/status", request_uri),
        Some(&token_for(&admin)),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", &request_uri, Some(&ds_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You can only delete pending requests");

    let (status, body) = send(&app, "DELETE", &request_uri, Some(&token_for(&admin)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request deleted successfully");
}

#[tokio::test]
async fn test_notification_feed_read_state() {
    let (app, state) = setup().await;
    let team = seed_team(&state, "Analytics").await;
    let ds = seed_user(&state, "data_science", Some(team.id)).await;
    let business = seed_user(&state, "business", None).await;
    let dash = seed_dashboard(&state, "Revenue", Some(team.id)).await;
    let ds_token = token_for(&ds);

    raise_issue(&app, &token_for(&business), dash.id, "One").await;
    raise_issue(&app, &token_for(&business), dash.id, "Two").await;

    let (status, body) = send(
        &app,
        "GET",
        "/notifications/unread-count",
        Some(&ds_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (_, body) = send(&app, "GET", "/notifications", Some(&ds_token), None).await;
    let first_id = body["notifications"][0]["id"].as_str().unwrap().to_string();

    // Another user cannot mark someone else's notification.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/notifications/{}/read", first_id),
        Some(&token_for(&business)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Notification not found");

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/notifications/{}/read", first_id),
        Some(&ds_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        "GET",
        "/notifications/unread-count",
        Some(&ds_token),
        None,
    )
    .await;
    assert_eq!(body["count"], 1);

    let (_, body) = send(
        &app,
        "GET",
        "/notifications?is_read=false",
        Some(&ds_token),
        None,
    )
    .await;
    assert_eq!(body["notifications"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "PATCH",
        "/notifications/read-all",
        Some(&ds_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        "GET",
        "/notifications/unread-count",
        Some(&ds_token),
        None,
    )
    .await;
    assert_eq!(body["count"], 0);
}

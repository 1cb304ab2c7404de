//! # Server Configuration
//!
//! Application state, router assembly, and the OpenAPI document for the
//! FeedbackHub API.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth;
use crate::config::AppConfig;
use crate::handlers;
use crate::notify::Notifier;
use crate::realtime::Hub;
use crate::repositories::{
    AdminRequestRepository, CommentRepository, IssueRepository, NotificationRepository,
    TeamRepository, UserRepository,
};
use crate::telemetry::{self, TraceContext};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub hub: Hub,
    pub users: UserRepository,
    pub teams: TeamRepository,
    pub issues: IssueRepository,
    pub comments: CommentRepository,
    pub admin_requests: AdminRequestRepository,
    pub notifications: NotificationRepository,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let db = Arc::new(db);
        let hub = Hub::new(config.realtime_channel_capacity);
        let notifier = Notifier::new(hub.clone());
        let users = UserRepository::new(db.clone());
        Self {
            users: users.clone(),
            teams: TeamRepository::new(db.clone()),
            issues: IssueRepository::new(db.clone(), users.clone(), notifier.clone()),
            comments: CommentRepository::new(db.clone(), users.clone(), notifier.clone()),
            admin_requests: AdminRequestRepository::new(db.clone(), users, notifier),
            notifications: NotificationRepository::new(db.clone()),
            hub,
            config: Arc::new(config),
            db,
        }
    }
}

/// Runs every request inside a fresh trace context so error payloads carry a
/// correlation ID.
async fn trace_context_middleware(request: Request, next: Next) -> Response {
    telemetry::with_trace_context(TraceContext::new(), next.run(request)).await
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/issues",
            get(handlers::issues::list_issues).post(handlers::issues::create_issue),
        )
        .route("/issues/my-threads", get(handlers::issues::my_threads))
        .route(
            "/issues/team/dashboard",
            get(handlers::issues::team_dashboard),
        )
        .route(
            "/issues/{id}",
            get(handlers::issues::get_issue).delete(handlers::issues::delete_issue),
        )
        .route("/issues/{id}/second", post(handlers::issues::second_issue))
        .route(
            "/issues/{id}/status",
            patch(handlers::issues::update_issue_status),
        )
        .route("/comments", post(handlers::comments::create_comment))
        .route(
            "/comments/issue/{issue_id}",
            get(handlers::comments::list_comments),
        )
        .route(
            "/comments/{id}",
            put(handlers::comments::update_comment).delete(handlers::comments::delete_comment),
        )
        .route(
            "/admin-requests",
            get(handlers::admin_requests::list_requests)
                .post(handlers::admin_requests::create_request),
        )
        .route(
            "/admin-requests/{id}",
            get(handlers::admin_requests::get_request)
                .delete(handlers::admin_requests::delete_request),
        )
        .route(
            "/admin-requests/{id}/status",
            patch(handlers::admin_requests::update_request_status),
        )
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/notifications/read-all",
            patch(handlers::notifications::mark_all_read),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/notifications/{id}/read",
            patch(handlers::notifications::mark_read),
        )
        .route(
            "/admin/issues/{id}/assign-team",
            post(handlers::admin::assign_team),
        )
        .route(
            "/admin/issues/{id}/assign-user",
            post(handlers::admin::assign_user),
        )
        .route("/admin/issues/{id}", patch(handlers::admin::patch_issue))
        .route("/admin/stats", get(handlers::admin::system_stats))
        .route("/admin/teams/{id}", delete(handlers::admin::delete_team))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/ws", get(handlers::ws::ws_upgrade))
        .merge(protected)
        .layer(middleware::from_fn(trace_context_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let profile = config.profile.clone();
    let state = AppState::new(config, db);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, profile = %profile, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::issues::list_issues,
        crate::handlers::issues::my_threads,
        crate::handlers::issues::team_dashboard,
        crate::handlers::issues::get_issue,
        crate::handlers::issues::create_issue,
        crate::handlers::issues::second_issue,
        crate::handlers::issues::update_issue_status,
        crate::handlers::issues::delete_issue,
        crate::handlers::comments::list_comments,
        crate::handlers::comments::create_comment,
        crate::handlers::comments::update_comment,
        crate::handlers::comments::delete_comment,
        crate::handlers::admin_requests::list_requests,
        crate::handlers::admin_requests::get_request,
        crate::handlers::admin_requests::create_request,
        crate::handlers::admin_requests::update_request_status,
        crate::handlers::admin_requests::delete_request,
        crate::handlers::notifications::list_notifications,
        crate::handlers::notifications::mark_read,
        crate::handlers::notifications::mark_all_read,
        crate::handlers::notifications::unread_count,
        crate::handlers::admin::assign_team,
        crate::handlers::admin::assign_user,
        crate::handlers::admin::patch_issue,
        crate::handlers::admin::system_stats,
        crate::handlers::admin::delete_team,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::repositories::issue::NewIssue,
            crate::repositories::issue::IssueView,
            crate::repositories::issue::TeamDashboard,
            crate::repositories::issue::TeamSummary,
            crate::repositories::comment::NewComment,
            crate::repositories::comment::CommentView,
            crate::repositories::admin_request::NewAdminRequest,
            crate::repositories::admin_request::AdminRequestView,
            crate::repositories::notification::NotificationView,
            crate::repositories::stats::SystemStats,
            crate::handlers::issues::IssueResponse,
            crate::handlers::issues::IssuesResponse,
            crate::handlers::issues::MessageResponse,
            crate::handlers::issues::UpdateStatusRequest,
            crate::handlers::comments::CommentResponse,
            crate::handlers::comments::CommentsResponse,
            crate::handlers::comments::EditCommentRequest,
            crate::handlers::admin_requests::RequestResponse,
            crate::handlers::admin_requests::RequestsResponse,
            crate::handlers::admin_requests::UpdateRequestStatusRequest,
            crate::handlers::notifications::NotificationsResponse,
            crate::handlers::notifications::UnreadCountResponse,
            crate::handlers::admin::AssignTeamRequest,
            crate::handlers::admin::AssignUserRequest,
            crate::handlers::admin::PatchIssueRequest,
            crate::handlers::admin::StatsResponse,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "FeedbackHub API",
        description = "Role-based dashboard feedback workflow API",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use persistence::UnitOfWork;
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{
    admin, auth, cities, health, locations, meetings, projects, ratings, suggestions,
};
use crate::services::UserService;

#[derive(Clone)]
pub struct AppState {
    pub uow: UnitOfWork,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    /// Account service bound to this state's signing key and password rules.
    pub fn users(&self) -> UserService {
        UserService::new(
            self.uow.clone(),
            self.jwt.clone(),
            self.config.identity.clone(),
        )
    }
}

pub fn create_app(config: Config, uow: UnitOfWork) -> Result<Router, JwtError> {
    let config = Arc::new(config);
    let jwt = Arc::new(JwtConfig::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry_secs,
        config.jwt.leeway_secs,
    )?);

    let state = AppState {
        uow,
        config: config.clone(),
        jwt,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let system_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let auth_routes = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let location_routes = Router::new()
        .route("/api/cities", get(cities::list_cities))
        .route(
            "/api/locations",
            get(locations::list_locations).post(locations::add_location),
        )
        .route("/api/locations/:id", get(locations::get_location));

    let suggestion_routes = Router::new()
        .route(
            "/api/suggestions",
            get(suggestions::list_suggestions).post(suggestions::add_suggestion),
        )
        .route("/api/suggestions/options", get(suggestions::form_options))
        .route(
            "/api/suggestions/:id",
            get(suggestions::get_suggestion)
                .put(suggestions::update_suggestion)
                .delete(suggestions::delete_suggestion),
        )
        .route("/api/suggestions/:id/edit", get(suggestions::edit_form))
        .route(
            "/api/suggestions/:id/delete",
            get(suggestions::confirm_delete),
        )
        .route(
            "/api/suggestions/:id/comments",
            post(suggestions::add_comment),
        )
        .route("/api/comments/:id", get(suggestions::get_comment))
        .route("/api/my-suggestions", get(suggestions::my_suggestions));

    let meeting_routes = Router::new()
        .route(
            "/api/meetings",
            get(meetings::list_meetings).post(meetings::create_meeting),
        )
        .route("/api/meetings/attended", get(meetings::attended_meetings))
        .route("/api/meetings/options", get(meetings::form_options))
        .route(
            "/api/meetings/:id",
            get(meetings::get_meeting)
                .put(meetings::update_meeting)
                .delete(meetings::delete_meeting),
        )
        .route("/api/meetings/:id/attend", post(meetings::attend))
        .route("/api/meetings/:id/cancel", post(meetings::cancel_attendance));

    let project_routes = Router::new()
        .route(
            "/api/projects",
            get(projects::list_projects).post(projects::add_project),
        )
        .route("/api/projects/map", get(projects::project_map))
        .route(
            "/api/projects/:id",
            get(projects::get_project).delete(projects::delete_project),
        );

    let rating_routes = Router::new()
        .route(
            "/api/rating/project/:id",
            get(ratings::project_rating)
                .post(ratings::rate_project)
                .delete(ratings::delete_project_rating),
        )
        .route(
            "/api/rating/comment/:id",
            get(ratings::comment_rating)
                .post(ratings::rate_comment)
                .delete(ratings::delete_comment_rating),
        );

    Ok(Router::new()
        .merge(system_routes)
        .merge(auth_routes)
        .merge(location_routes)
        .merge(suggestion_routes)
        .merge(meeting_routes)
        .merge(project_routes)
        .merge(rating_routes)
        .nest("/api/admin", admin::router())
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state))
}

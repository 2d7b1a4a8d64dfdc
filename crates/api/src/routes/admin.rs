//! Administrator route handlers.
//!
//! Every handler takes [`AdminAuth`], which rejects callers without the
//! `Admin` role with 403. Ids are path UUIDs; malformed ones are rejected by
//! the extractor.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use domain::models::location::LocationCascadeReport;
use domain::models::project::UpdateCompletionRequest;
use domain::models::suggestion::{SuggestionDetails, UpdatePriorityRequest, UpdateStatusRequest};
use domain::models::user::RoleRequest;
use domain::models::{
    LocationSummary, MeetingSummary, ProjectDetails, ProjectSummary, SuggestionSummary,
    UserSummary,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminAuth;
use crate::middleware::metrics::record_location_cascade;
use crate::services::locations::LOCATION_NOT_FOUND;
use crate::services::meetings::MEETING_NOT_FOUND;
use crate::services::users::USER_NOT_FOUND;
use crate::services::{LocationService, MeetingService, ProjectService, SuggestionService};

const USER_OR_ROLE_NOT_FOUND: &str = "User or role not found.";

/// Admin area, mounted under `/api/admin`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users_router())
        .nest("/locations", locations_router())
        .nest("/suggestions", suggestions_router())
        .nest("/meetings", meetings_router())
        .nest("/projects", projects_router())
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", delete(delete_user))
        .route("/:id/roles", post(assign_role))
        .route("/:id/roles/:role", delete(remove_role))
}

fn locations_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations))
        .route("/orphaned-suggestions", get(orphaned_suggestions))
        .route("/:id", get(get_location).delete(delete_location))
}

fn suggestions_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suggestions))
        .route("/:id", get(get_suggestion).delete(delete_suggestion))
        .route("/:id/status", put(update_status))
        .route("/:id/priority", put(update_priority))
}

fn meetings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_meetings))
        .route("/:id", delete(delete_meeting))
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects))
        .route("/:id", get(get_project).delete(delete_project))
        .route("/:id/toggle-completion", post(toggle_completion))
        .route("/:id/completion", put(update_completion))
}

/// Result of a completion toggle.
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub id: Uuid,
    pub is_completed: bool,
}

/// Suggestions left without any location link.
#[derive(Debug, Serialize)]
pub struct OrphanedSuggestionsResponse {
    pub suggestion_ids: Vec<Uuid>,
}

// ---- users ----

async fn list_users(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    Ok(Json(state.users().get_all_users().await?))
}

async fn assign_role(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<RoleRequest>,
) -> Result<StatusCode, ApiError> {
    if !state.users().assign_role(id, &request.role).await? {
        return Err(ApiError::NotFound(USER_OR_ROLE_NOT_FOUND.to_string()));
    }
    info!(admin_id = %admin.user_id, user_id = %id, role = %request.role, "Role granted by administrator");
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_role(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Path((id, role)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    if !state.users().remove_role(id, &role).await? {
        return Err(ApiError::NotFound(USER_OR_ROLE_NOT_FOUND.to_string()));
    }
    info!(admin_id = %admin.user_id, user_id = %id, role = %role, "Role revoked by administrator");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_user(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if admin.user_id == id {
        return Err(ApiError::Validation(
            "Administrators cannot delete their own account.".to_string(),
        ));
    }
    if state.users().delete_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(USER_NOT_FOUND.to_string()))
    }
}

// ---- locations ----

async fn list_locations(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Vec<LocationSummary>>, ApiError> {
    Ok(Json(
        LocationService::new(state.uow.clone())
            .get_all_locations()
            .await?,
    ))
}

async fn orphaned_suggestions(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<OrphanedSuggestionsResponse>, ApiError> {
    let suggestion_ids = LocationService::new(state.uow.clone())
        .find_orphaned_suggestions()
        .await?;
    Ok(Json(OrphanedSuggestionsResponse { suggestion_ids }))
}

async fn get_location(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<LocationSummary>, ApiError> {
    LocationService::new(state.uow.clone())
        .get_location(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(LOCATION_NOT_FOUND.to_string()))
}

async fn delete_location(
    State(state): State<AppState>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<LocationCascadeReport>, ApiError> {
    let report = LocationService::new(state.uow.clone())
        .delete_location(id)
        .await?;
    record_location_cascade(report.suggestions_removed, report.meetings_removed);
    info!(admin_id = %admin.user_id, location_id = %id, ?report, "Location deleted by administrator");
    Ok(Json(report))
}

// ---- suggestions ----

async fn list_suggestions(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Vec<SuggestionSummary>>, ApiError> {
    Ok(Json(
        SuggestionService::new(state.uow.clone())
            .get_all_for_admin()
            .await?,
    ))
}

async fn get_suggestion(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<SuggestionDetails>, ApiError> {
    Ok(Json(
        SuggestionService::new(state.uow.clone())
            .get_for_admin(id)
            .await?,
    ))
}

async fn delete_suggestion(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    SuggestionService::new(state.uow.clone())
        .admin_delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_status(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<SuggestionSummary>, ApiError> {
    Ok(Json(
        SuggestionService::new(state.uow.clone())
            .update_status(id, &request.status)
            .await?,
    ))
}

async fn update_priority(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePriorityRequest>,
) -> Result<Json<SuggestionSummary>, ApiError> {
    Ok(Json(
        SuggestionService::new(state.uow.clone())
            .update_priority(id, &request.priority)
            .await?,
    ))
}

// ---- meetings ----

async fn list_meetings(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Vec<MeetingSummary>>, ApiError> {
    Ok(Json(
        MeetingService::new(state.uow.clone())
            .admin_get_all_meetings()
            .await?,
    ))
}

async fn delete_meeting(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if MeetingService::new(state.uow.clone())
        .admin_delete_meeting(id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(MEETING_NOT_FOUND.to_string()))
    }
}

// ---- projects ----

async fn list_projects(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    Ok(Json(
        ProjectService::new(state.uow.clone())
            .get_all_projects()
            .await?,
    ))
}

async fn get_project(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetails>, ApiError> {
    Ok(Json(
        ProjectService::new(state.uow.clone())
            .get_project(&id.to_string())
            .await?,
    ))
}

async fn delete_project(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ProjectService::new(state.uow.clone())
        .delete_project(&id.to_string())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_completion(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let is_completed = ProjectService::new(state.uow.clone())
        .toggle_completion(id)
        .await?;
    Ok(Json(CompletionResponse { id, is_completed }))
}

async fn update_completion(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCompletionRequest>,
) -> Result<Json<ProjectSummary>, ApiError> {
    Ok(Json(
        ProjectService::new(state.uow.clone())
            .update_completion(id, request.is_completed)
            .await?,
    ))
}

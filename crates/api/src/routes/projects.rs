//! Project endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::project::{CreateProjectRequest, ProjectListQuery, ProjectMapMarker};
use domain::models::{ProjectDetails, ProjectSummary};

use super::CreatedResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminAuth;
use crate::services::ProjectService;

/// All projects, or the ongoing ones in `?city=`.
///
/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let service = ProjectService::new(state.uow.clone());
    let projects = match query.city.as_deref().map(str::trim) {
        Some(city) if !city.is_empty() => service.get_ongoing_projects_by_city(city).await?,
        _ => service.get_all_projects().await?,
    };
    Ok(Json(projects))
}

/// GET /api/projects/map
pub async fn project_map(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectMapMarker>>, ApiError> {
    Ok(Json(
        ProjectService::new(state.uow.clone())
            .get_project_map()
            .await?,
    ))
}

/// Administrators only.
///
/// POST /api/projects
pub async fn add_project(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = ProjectService::new(state.uow.clone())
        .add_project(request)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetails>, ApiError> {
    Ok(Json(
        ProjectService::new(state.uow.clone())
            .get_project(&id)
            .await?,
    ))
}

/// Administrators only. Removes the project's ratings with it.
///
/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ProjectService::new(state.uow.clone())
        .delete_project(&id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

//! Rating widget endpoints.
//!
//! Request bodies are bare JSON values: an integer score for projects and a
//! boolean like flag for comments.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::rating::{
    CommentRatingStats, CommentRatingView, ProjectRatingResponse, ProjectRatingView,
};
use shared::validation::parse_id;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{OptionalUserAuth, UserAuth};
use crate::middleware::metrics::record_rating_submitted;
use crate::services::projects::INVALID_PROJECT_ID;
use crate::services::suggestions::INVALID_COMMENT_ID;
use crate::services::RatingService;

/// POST /api/rating/project/:id
pub async fn rate_project(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
    Json(score): Json<i32>,
) -> Result<Json<ProjectRatingResponse>, ApiError> {
    let project_id = parse_id(&id, INVALID_PROJECT_ID)?;
    let average_rating = RatingService::new(state.uow.clone())
        .rate_project(project_id, auth.user_id, score)
        .await?;
    record_rating_submitted("project");
    Ok(Json(ProjectRatingResponse { average_rating }))
}

/// POST /api/rating/comment/:id
pub async fn rate_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
    Json(is_like): Json<bool>,
) -> Result<Json<CommentRatingStats>, ApiError> {
    let comment_id = parse_id(&id, INVALID_COMMENT_ID)?;
    let stats = RatingService::new(state.uow.clone())
        .rate_comment(comment_id, auth.user_id, is_like)
        .await?;
    record_rating_submitted("comment");
    Ok(Json(stats))
}

/// GET /api/rating/project/:id
pub async fn project_rating(
    State(state): State<AppState>,
    auth: OptionalUserAuth,
    Path(id): Path<String>,
) -> Result<Json<ProjectRatingView>, ApiError> {
    let project_id = parse_id(&id, INVALID_PROJECT_ID)?;
    Ok(Json(
        RatingService::new(state.uow.clone())
            .project_rating_view(project_id, auth.user_id())
            .await?,
    ))
}

/// GET /api/rating/comment/:id
pub async fn comment_rating(
    State(state): State<AppState>,
    auth: OptionalUserAuth,
    Path(id): Path<String>,
) -> Result<Json<CommentRatingView>, ApiError> {
    let comment_id = parse_id(&id, INVALID_COMMENT_ID)?;
    Ok(Json(
        RatingService::new(state.uow.clone())
            .comment_rating_view(comment_id, auth.user_id())
            .await?,
    ))
}

/// DELETE /api/rating/project/:id
pub async fn delete_project_rating(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let project_id = parse_id(&id, INVALID_PROJECT_ID)?;
    let deleted = RatingService::new(state.uow.clone())
        .delete_project_rating(project_id, auth.user_id)
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("You have not rated this project.".to_string()))
    }
}

/// DELETE /api/rating/comment/:id
pub async fn delete_comment_rating(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let comment_id = parse_id(&id, INVALID_COMMENT_ID)?;
    let deleted = RatingService::new(state.uow.clone())
        .delete_comment_rating(comment_id, auth.user_id)
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("You have not rated this comment.".to_string()))
    }
}

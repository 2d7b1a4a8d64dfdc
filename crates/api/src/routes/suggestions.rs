//! Suggestion, comment and my-suggestions endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::comment::AddCommentRequest;
use domain::models::suggestion::{
    ConfirmDeleteSuggestion, MySuggestions, SortBy, SuggestionDetails, SuggestionForEdit,
    SuggestionFormRequest,
};
use domain::models::{CityOption, CommentView, SuggestionSummary};
use serde::Deserialize;
use shared::pagination::PaginatedList;

use super::CreatedResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{OptionalUserAuth, UserAuth};
use crate::middleware::metrics::{record_comment_added, record_suggestion_filed};
use crate::services::SuggestionService;

/// Listing query. `sort_by` is `title` or `date`; ascending by default.
#[derive(Debug, Deserialize)]
pub struct SuggestionListQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub ascending: Option<bool>,
    pub page: Option<i64>,
}

/// GET /api/suggestions
pub async fn list_suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionListQuery>,
) -> Result<Json<PaginatedList<SuggestionSummary>>, ApiError> {
    let page = SuggestionService::new(state.uow.clone())
        .get_all_suggestions(
            query.page.unwrap_or(1).max(1),
            state.config.pagination.suggestions_page_size,
            query.search.as_deref(),
            SortBy::parse(query.sort_by.as_deref()),
            query.ascending.unwrap_or(true),
        )
        .await?;
    Ok(Json(page))
}

/// GET /api/suggestions/options
pub async fn form_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<CityOption>>, ApiError> {
    Ok(Json(
        SuggestionService::new(state.uow.clone())
            .get_form_options()
            .await?,
    ))
}

/// POST /api/suggestions
pub async fn add_suggestion(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<SuggestionFormRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = SuggestionService::new(state.uow.clone())
        .add_suggestion(request, &auth.user_id.to_string())
        .await?;
    record_suggestion_filed();
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/suggestions/:id
pub async fn get_suggestion(
    State(state): State<AppState>,
    auth: OptionalUserAuth,
    Path(id): Path<String>,
) -> Result<Json<SuggestionDetails>, ApiError> {
    Ok(Json(
        SuggestionService::new(state.uow.clone())
            .get_suggestion_details(&id, auth.user_id())
            .await?,
    ))
}

/// GET /api/suggestions/:id/edit
pub async fn edit_form(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
) -> Result<Json<SuggestionForEdit>, ApiError> {
    Ok(Json(
        SuggestionService::new(state.uow.clone())
            .get_suggestion_for_edit(&id, auth.user_id)
            .await?,
    ))
}

/// PUT /api/suggestions/:id
pub async fn update_suggestion(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
    Json(request): Json<SuggestionFormRequest>,
) -> Result<StatusCode, ApiError> {
    SuggestionService::new(state.uow.clone())
        .update_suggestion(&id, request, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/suggestions/:id/delete
pub async fn confirm_delete(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
) -> Result<Json<ConfirmDeleteSuggestion>, ApiError> {
    Ok(Json(
        SuggestionService::new(state.uow.clone())
            .get_suggestion_for_delete(&id, auth.user_id)
            .await?,
    ))
}

/// DELETE /api/suggestions/:id
pub async fn delete_suggestion(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    SuggestionService::new(state.uow.clone())
        .delete_suggestion(&id, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/suggestions/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
    Json(request): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<CommentView>), ApiError> {
    let comment = SuggestionService::new(state.uow.clone())
        .add_comment(&id, request, auth.user_id)
        .await?;
    record_comment_added();
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/comments/:id
pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CommentView>, ApiError> {
    SuggestionService::new(state.uow.clone())
        .get_comment(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Comment not found.".to_string()))
}

/// GET /api/my-suggestions
pub async fn my_suggestions(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<MySuggestions>, ApiError> {
    Ok(Json(
        SuggestionService::new(state.uow.clone())
            .get_my_suggestions(auth.user_id)
            .await?,
    ))
}

//! Meeting endpoint handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::meeting::MeetingFormRequest;
use domain::models::{AttendedMeeting, CityOption, MeetingDetails, MeetingSummary};

use super::CreatedResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{OptionalUserAuth, UserAuth};
use crate::services::MeetingService;

/// GET /api/meetings
pub async fn list_meetings(
    State(state): State<AppState>,
    auth: OptionalUserAuth,
) -> Result<Json<Vec<MeetingSummary>>, ApiError> {
    Ok(Json(
        MeetingService::new(state.uow.clone())
            .get_all_meetings(auth.user_id())
            .await?,
    ))
}

/// GET /api/meetings/options
pub async fn form_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<CityOption>>, ApiError> {
    Ok(Json(
        MeetingService::new(state.uow.clone())
            .get_form_options()
            .await?,
    ))
}

/// POST /api/meetings
pub async fn create_meeting(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<MeetingFormRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let id = MeetingService::new(state.uow.clone())
        .create_meeting(request, auth.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/meetings/attended
pub async fn attended_meetings(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<AttendedMeeting>>, ApiError> {
    Ok(Json(
        MeetingService::new(state.uow.clone())
            .get_attended_meetings(auth.user_id)
            .await?,
    ))
}

/// GET /api/meetings/:id
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MeetingDetails>, ApiError> {
    Ok(Json(
        MeetingService::new(state.uow.clone())
            .get_meeting(&id)
            .await?,
    ))
}

/// PUT /api/meetings/:id
pub async fn update_meeting(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
    Json(request): Json<MeetingFormRequest>,
) -> Result<StatusCode, ApiError> {
    MeetingService::new(state.uow.clone())
        .update_meeting(&id, request, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/meetings/:id
pub async fn delete_meeting(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    MeetingService::new(state.uow.clone())
        .delete_meeting(&id, auth.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/meetings/:id/attend
pub async fn attend(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    MeetingService::new(state.uow.clone())
        .attend_meeting(auth.user_id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/meetings/:id/cancel
pub async fn cancel_attendance(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    MeetingService::new(state.uow.clone())
        .cancel_attendance(auth.user_id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

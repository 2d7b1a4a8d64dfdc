//! City options.

use axum::{extract::State, Json};
use domain::models::CityOption;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::CityService;

/// GET /api/cities
pub async fn list_cities(State(state): State<AppState>) -> Result<Json<Vec<CityOption>>, ApiError> {
    Ok(Json(CityService::new(state.uow.clone()).get_cities().await?))
}

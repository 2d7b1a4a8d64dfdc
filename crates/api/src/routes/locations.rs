//! Location endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::location::CreateLocationRequest;
use domain::models::{LocationDetails, LocationSummary};
use shared::pagination::PaginatedList;

use super::PageQuery;
use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminAuth;
use crate::services::LocationService;

/// Locations by city name, `pagination.locations_page_size` per page.
///
/// GET /api/locations?page=
pub async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedList<LocationDetails>>, ApiError> {
    let page = LocationService::new(state.uow.clone())
        .get_all_ordered_by_name(
            query.page_index(),
            state.config.pagination.locations_page_size,
        )
        .await?;
    Ok(Json(page))
}

/// Administrators only.
///
/// POST /api/locations
pub async fn add_location(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Json(request): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<LocationSummary>), ApiError> {
    let location = LocationService::new(state.uow.clone())
        .add_location(request)
        .await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// GET /api/locations/:id
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LocationDetails>, ApiError> {
    Ok(Json(
        LocationService::new(state.uow.clone())
            .get_location_details(&id)
            .await?,
    ))
}

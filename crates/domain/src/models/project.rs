//! Crowdfunded project domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Project row in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub funds_needed: f64,
    pub is_completed: bool,
    pub city_name: String,
}

/// Full project page including its rating aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectDetails {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub funds_needed: f64,
    pub created_on: DateTime<Utc>,
    pub funding_deadline: DateTime<Utc>,
    pub is_completed: bool,
    pub location_id: Uuid,
    pub city_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// Marker for the project map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectMapMarker {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Request payload for adding a project.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(range(
        min = 0.01,
        max = 10_000_000.0,
        message = "Funds needed must be between 0.01 and 10000000"
    ))]
    pub funds_needed: f64,

    #[validate(url(message = "Image must be a valid URL"))]
    #[validate(length(max = 2048, message = "Image URL must be at most 2048 characters"))]
    pub image_url: Option<String>,

    #[validate(length(min = 1, max = 500, message = "Description must be between 1 and 500 characters"))]
    pub description: String,

    pub funding_deadline: DateTime<Utc>,

    pub location_id: Uuid,

    #[validate(custom(function = "crate::models::suggestion::validate_optional_latitude"))]
    pub latitude: Option<f64>,

    #[validate(custom(function = "crate::models::suggestion::validate_optional_longitude"))]
    pub longitude: Option<f64>,
}

/// Admin completion change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCompletionRequest {
    pub is_completed: bool,
}

/// Query for ongoing projects in one city.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectListQuery {
    pub city: Option<String>,
}

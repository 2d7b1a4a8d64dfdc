//! Location (city) domain models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A selectable city: one entry per distinct city name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CityOption {
    pub id: Uuid,
    pub name: String,
}

/// Flat location row for listings and admin screens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocationSummary {
    pub id: Uuid,
    pub city_name: String,
    pub street_name: String,
    pub city_picture: Option<String>,
}

/// Suggestion linked to a location, shown on the location page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LinkedSuggestion {
    pub id: Uuid,
    pub title: String,
}

/// Location with the suggestions filed against it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocationDetails {
    pub id: Uuid,
    pub city_name: String,
    pub street_name: String,
    pub city_picture: Option<String>,
    pub suggestions: Vec<LinkedSuggestion>,
}

/// Counts of rows removed by a location cascade delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LocationCascadeReport {
    pub links_removed: u64,
    pub suggestions_removed: u64,
    pub meetings_removed: u64,
    pub projects_removed: u64,
}

/// Request payload for adding a location.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateLocationRequest {
    #[validate(length(min = 1, max = 30, message = "City name must be between 1 and 30 characters"))]
    pub city_name: String,

    #[validate(length(
        min = 1,
        max = 40,
        message = "Street name must be between 1 and 40 characters"
    ))]
    pub street_name: String,

    #[validate(url(message = "City picture must be a valid URL"))]
    #[validate(length(max = 2048, message = "City picture URL must be at most 2048 characters"))]
    pub city_picture: Option<String>,
}

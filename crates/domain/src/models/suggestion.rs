//! Suggestion domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::comment::CommentView;
use super::location::CityOption;

/// Review state of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SuggestionStatus {
    #[default]
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "In Review")]
    InReview,
    #[serde(rename = "Approved")]
    Approved,
    #[serde(rename = "Rejected")]
    Rejected,
    #[serde(rename = "Completed")]
    Completed,
}

impl SuggestionStatus {
    pub const ALL: [SuggestionStatus; 6] = [
        SuggestionStatus::Open,
        SuggestionStatus::Pending,
        SuggestionStatus::InReview,
        SuggestionStatus::Approved,
        SuggestionStatus::Rejected,
        SuggestionStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionStatus::Open => "Open",
            SuggestionStatus::Pending => "Pending",
            SuggestionStatus::InReview => "In Review",
            SuggestionStatus::Approved => "Approved",
            SuggestionStatus::Rejected => "Rejected",
            SuggestionStatus::Completed => "Completed",
        }
    }
}

impl FromStr for SuggestionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "open" => Ok(SuggestionStatus::Open),
            "pending" => Ok(SuggestionStatus::Pending),
            "inreview" => Ok(SuggestionStatus::InReview),
            "approved" => Ok(SuggestionStatus::Approved),
            "rejected" => Ok(SuggestionStatus::Rejected),
            "completed" => Ok(SuggestionStatus::Completed),
            _ => Err(format!("Invalid suggestion status: {}", s)),
        }
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency assigned to a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SuggestionPriority {
    #[default]
    Low,
    Medium,
    High,
}

impl SuggestionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionPriority::Low => "Low",
            SuggestionPriority::Medium => "Medium",
            SuggestionPriority::High => "High",
        }
    }
}

impl FromStr for SuggestionPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(SuggestionPriority::Low),
            "medium" => Ok(SuggestionPriority::Medium),
            "high" => Ok(SuggestionPriority::High),
            _ => Err(format!("Invalid suggestion priority: {}", s)),
        }
    }
}

impl fmt::Display for SuggestionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort key for the public suggestion listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    Title,
    #[default]
    Date,
}

impl SortBy {
    /// Anything other than `title` falls back to date ordering.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "title" => SortBy::Title,
            _ => SortBy::Date,
        }
    }
}

/// Suggestion row in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SuggestionSummary {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub uploaded_on: DateTime<Utc>,
    pub attachment_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Full suggestion page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SuggestionDetails {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub uploaded_on: DateTime<Utc>,
    pub attachment_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_names: Vec<String>,
    pub author_names: Vec<String>,
    pub comments: Vec<CommentView>,
    pub is_owner: bool,
}

/// Suggestion as loaded into the edit form, plus selectable cities.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SuggestionForEdit {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub attachment_url: Option<String>,
    pub city_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub cities: Vec<CityOption>,
}

/// Summary shown before an owner confirms deletion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ConfirmDeleteSuggestion {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub status: String,
    pub uploaded_on: DateTime<Utc>,
}

/// A suggestion in the author's own list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MySuggestion {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub status: String,
    pub priority: String,
    pub uploaded_on: DateTime<Utc>,
    pub city_name: String,
}

/// Author's suggestions together with the city options for filing new ones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MySuggestions {
    pub suggestions: Vec<MySuggestion>,
    pub cities: Vec<CityOption>,
}

/// Create/update payload for a suggestion.
///
/// Status and priority stay textual here and are parsed by the service so
/// that bad values produce the same message regardless of entry point.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SuggestionFormRequest {
    #[validate(length(min = 5, max = 50, message = "Title must be between 5 and 50 characters"))]
    pub title: String,

    #[validate(length(min = 2, max = 20, message = "Category must be between 2 and 20 characters"))]
    pub category: String,

    #[validate(length(
        min = 10,
        max = 200,
        message = "Description must be between 10 and 200 characters"
    ))]
    pub description: String,

    #[validate(url(message = "Attachment must be a valid URL"))]
    pub attachment_url: Option<String>,

    #[validate(length(min = 1, max = 30, message = "City name must be between 1 and 30 characters"))]
    pub city_name: String,

    pub status: Option<String>,

    pub priority: Option<String>,

    #[validate(custom(function = "crate::models::suggestion::validate_optional_latitude"))]
    pub latitude: Option<f64>,

    #[validate(custom(function = "crate::models::suggestion::validate_optional_longitude"))]
    pub longitude: Option<f64>,
}

pub fn validate_optional_latitude(lat: f64) -> Result<(), validator::ValidationError> {
    shared::validation::validate_latitude(lat)
}

pub fn validate_optional_longitude(lon: f64) -> Result<(), validator::ValidationError> {
    shared::validation::validate_longitude(lon)
}

/// Admin status change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Admin priority change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePriorityRequest {
    pub priority: String,
}

//! Meeting domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Meeting row in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MeetingSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub duration: f64,
    pub city_name: String,
    pub attendee_count: i64,
    pub is_organizer: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Full meeting page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MeetingDetails {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub duration: f64,
    pub location_id: Option<Uuid>,
    pub city_name: String,
    pub organizer_id: Uuid,
    pub organizer_name: String,
    pub attendees: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A meeting the user signed up for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AttendedMeeting {
    pub id: Uuid,
    pub title: String,
    pub scheduled_date: DateTime<Utc>,
    pub duration: f64,
    pub city_name: String,
    pub can_cancel_attendance: bool,
}

/// Create/update payload for a meeting.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct MeetingFormRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,

    pub scheduled_date: DateTime<Utc>,

    /// Hours.
    #[validate(range(min = 0.5, max = 8.0, message = "Duration must be between 0.5 and 8 hours"))]
    pub duration: f64,

    pub location_id: Uuid,

    #[validate(custom(function = "crate::models::suggestion::validate_optional_latitude"))]
    pub latitude: Option<f64>,

    #[validate(custom(function = "crate::models::suggestion::validate_optional_longitude"))]
    pub longitude: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn form(duration: f64) -> MeetingFormRequest {
        MeetingFormRequest {
            title: "Neighbourhood clean-up".to_string(),
            description: "Bring gloves".to_string(),
            scheduled_date: Utc::now() + Duration::days(3),
            duration,
            location_id: Uuid::new_v4(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_duration_bounds() {
        assert!(form(0.5).validate().is_ok());
        assert!(form(8.0).validate().is_ok());
        assert!(form(0.25).validate().is_err());
        assert!(form(9.0).validate().is_err());
    }

    #[test]
    fn test_title_required() {
        let mut req = form(1.0);
        req.title = String::new();
        assert!(req.validate().is_err());
    }
}

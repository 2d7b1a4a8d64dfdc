//! Meeting entity and attendance rows.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entity::Entity;
use crate::value::Value;

/// Database row mapping for the meetings table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MeetingEntity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    /// Hours.
    pub duration: f64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_id: Option<Uuid>,
    pub organizer_id: Uuid,
}

impl Entity for MeetingEntity {
    type Key = Uuid;

    const TABLE: &'static str = "meetings";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn key(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("title", self.title.clone().into()),
            ("description", self.description.clone().into()),
            ("scheduled_date", self.scheduled_date.into()),
            ("duration", self.duration.into()),
            ("latitude", self.latitude.into()),
            ("longitude", self.longitude.into()),
            ("location_id", self.location_id.into()),
            ("organizer_id", self.organizer_id.into()),
        ]
    }
}

/// One user's attendance of one meeting.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct MeetingAttendeeEntity {
    pub meeting_id: Uuid,
    pub user_id: Uuid,
}

impl Entity for MeetingAttendeeEntity {
    type Key = (Uuid, Uuid);

    const TABLE: &'static str = "meeting_attendees";
    const KEY_COLUMNS: &'static [&'static str] = &["meeting_id", "user_id"];

    fn key(&self) -> (Uuid, Uuid) {
        (self.meeting_id, self.user_id)
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("meeting_id", self.meeting_id.into()),
            ("user_id", self.user_id.into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;

    #[test]
    fn test_meeting_without_location_matches_is_null() {
        let meeting = MeetingEntity {
            id: Uuid::new_v4(),
            title: "Town hall".to_string(),
            description: String::new(),
            scheduled_date: Utc::now(),
            duration: 1.5,
            latitude: None,
            longitude: None,
            location_id: None,
            organizer_id: Uuid::new_v4(),
        };
        assert!(Filter::is_null("location_id").matches(&meeting.values()));
        assert!(!Filter::eq("location_id", Uuid::new_v4()).matches(&meeting.values()));
    }
}

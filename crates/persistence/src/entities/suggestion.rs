//! Suggestion entity and its association rows.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entity::Entity;
use crate::value::Value;

/// Database row mapping for the suggestions table.
///
/// `status` and `priority` hold the display names of
/// [`domain::models::SuggestionStatus`] and [`domain::models::SuggestionPriority`].
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SuggestionEntity {
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

impl Entity for SuggestionEntity {
    type Key = Uuid;

    const TABLE: &'static str = "suggestions";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn key(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("title", self.title.clone().into()),
            ("category", self.category.clone().into()),
            ("description", self.description.clone().into()),
            ("status", self.status.clone().into()),
            ("priority", self.priority.clone().into()),
            ("uploaded_on", self.uploaded_on.into()),
            ("attachment_url", self.attachment_url.clone().into()),
            ("latitude", self.latitude.into()),
            ("longitude", self.longitude.into()),
        ]
    }
}

impl From<SuggestionEntity> for domain::models::SuggestionSummary {
    fn from(entity: SuggestionEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            category: entity.category,
            description: entity.description,
            status: entity.status,
            priority: entity.priority,
            uploaded_on: entity.uploaded_on,
            attachment_url: entity.attachment_url,
            latitude: entity.latitude,
            longitude: entity.longitude,
        }
    }
}

/// Link between a suggestion and a location it concerns.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct SuggestionLocationEntity {
    pub suggestion_id: Uuid,
    pub location_id: Uuid,
}

impl Entity for SuggestionLocationEntity {
    type Key = (Uuid, Uuid);

    const TABLE: &'static str = "suggestion_locations";
    const KEY_COLUMNS: &'static [&'static str] = &["suggestion_id", "location_id"];

    fn key(&self) -> (Uuid, Uuid) {
        (self.suggestion_id, self.location_id)
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("suggestion_id", self.suggestion_id.into()),
            ("location_id", self.location_id.into()),
        ]
    }
}

/// Authorship link: the user owns the suggestion.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserSuggestionEntity {
    pub user_id: Uuid,
    pub suggestion_id: Uuid,
}

impl Entity for UserSuggestionEntity {
    type Key = (Uuid, Uuid);

    const TABLE: &'static str = "user_suggestions";
    const KEY_COLUMNS: &'static [&'static str] = &["user_id", "suggestion_id"];

    fn key(&self) -> (Uuid, Uuid) {
        (self.user_id, self.suggestion_id)
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("user_id", self.user_id.into()),
            ("suggestion_id", self.suggestion_id.into()),
        ]
    }
}

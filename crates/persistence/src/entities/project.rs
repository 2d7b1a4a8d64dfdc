//! Project entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entity::Entity;
use crate::value::Value;

/// Database row mapping for the projects table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProjectEntity {
    pub id: Uuid,
    pub name: String,
    pub funds_needed: f64,
    pub image_url: Option<String>,
    pub description: String,
    pub created_on: DateTime<Utc>,
    pub funding_deadline: DateTime<Utc>,
    pub is_completed: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_id: Uuid,
}

impl Entity for ProjectEntity {
    type Key = Uuid;

    const TABLE: &'static str = "projects";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn key(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("name", self.name.clone().into()),
            ("funds_needed", self.funds_needed.into()),
            ("image_url", self.image_url.clone().into()),
            ("description", self.description.clone().into()),
            ("created_on", self.created_on.into()),
            ("funding_deadline", self.funding_deadline.into()),
            ("is_completed", self.is_completed.into()),
            ("latitude", self.latitude.into()),
            ("longitude", self.longitude.into()),
            ("location_id", self.location_id.into()),
        ]
    }
}

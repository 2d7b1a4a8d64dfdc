//! Location entity (database row mapping).

use sqlx::FromRow;
use uuid::Uuid;

use crate::entity::Entity;
use crate::value::Value;

/// Database row mapping for the locations table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LocationEntity {
    pub id: Uuid,
    pub city_name: String,
    pub street_name: String,
    pub city_picture: Option<String>,
}

impl Entity for LocationEntity {
    type Key = Uuid;

    const TABLE: &'static str = "locations";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn key(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("city_name", self.city_name.clone().into()),
            ("street_name", self.street_name.clone().into()),
            ("city_picture", self.city_picture.clone().into()),
        ]
    }
}

impl From<LocationEntity> for domain::models::LocationSummary {
    fn from(entity: LocationEntity) -> Self {
        Self {
            id: entity.id,
            city_name: entity.city_name,
            street_name: entity.street_name,
            city_picture: entity.city_picture,
        }
    }
}

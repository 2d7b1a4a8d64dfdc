//! Comment entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entity::Entity;
use crate::value::Value;

/// Database row mapping for the comments table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CommentEntity {
    pub id: Uuid,
    pub content: String,
    pub added_on: DateTime<Utc>,
    pub user_id: Uuid,
    pub suggestion_id: Uuid,
}

impl Entity for CommentEntity {
    type Key = Uuid;

    const TABLE: &'static str = "comments";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn key(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("content", self.content.clone().into()),
            ("added_on", self.added_on.into()),
            ("user_id", self.user_id.into()),
            ("suggestion_id", self.suggestion_id.into()),
        ]
    }
}

//! Project and comment rating entities.
//!
//! Ratings are soft-deleted: `is_deleted` rows stay in the table and are
//! excluded from every aggregate.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entity::Entity;
use crate::filter::Filter;
use crate::value::Value;

/// Database row mapping for the project_ratings table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProjectRatingEntity {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub score: i32,
    pub rated_on: DateTime<Utc>,
    pub is_deleted: bool,
}

impl ProjectRatingEntity {
    /// Active ratings of one project.
    pub fn active_for(project_id: Uuid) -> Filter {
        Filter::eq("project_id", project_id).and(Filter::eq("is_deleted", false))
    }
}

impl Entity for ProjectRatingEntity {
    type Key = Uuid;

    const TABLE: &'static str = "project_ratings";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn key(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("project_id", self.project_id.into()),
            ("user_id", self.user_id.into()),
            ("score", self.score.into()),
            ("rated_on", self.rated_on.into()),
            ("is_deleted", self.is_deleted.into()),
        ]
    }
}

/// Database row mapping for the comment_ratings table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CommentRatingEntity {
    pub id: Uuid,
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub is_like: bool,
    pub rated_on: DateTime<Utc>,
    pub is_deleted: bool,
}

impl CommentRatingEntity {
    /// Active ratings of one comment.
    pub fn active_for(comment_id: Uuid) -> Filter {
        Filter::eq("comment_id", comment_id).and(Filter::eq("is_deleted", false))
    }
}

impl Entity for CommentRatingEntity {
    type Key = Uuid;

    const TABLE: &'static str = "comment_ratings";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn key(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("comment_id", self.comment_id.into()),
            ("user_id", self.user_id.into()),
            ("is_like", self.is_like.into()),
            ("rated_on", self.rated_on.into()),
            ("is_deleted", self.is_deleted.into()),
        ]
    }
}

//! Comment domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A comment under a suggestion, with its author and reaction counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CommentView {
    pub id: Uuid,
    pub suggestion_id: Uuid,
    pub content: String,
    pub added_on: DateTime<Utc>,
    pub user_id: Uuid,
    pub username: String,
    pub likes: i64,
    pub dislikes: i64,
}

/// Request payload for commenting on a suggestion.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AddCommentRequest {
    #[validate(length(min = 1, max = 1000, message = "Comment must be between 1 and 1000 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub content: String,
}

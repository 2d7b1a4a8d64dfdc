//! Rating domain models.
//!
//! The rating endpoints answer in camelCase to match the widgets that post to
//! them.

use serde::Serialize;
use uuid::Uuid;

/// Lowest accepted project score.
pub const MIN_SCORE: i32 = 1;
/// Highest accepted project score.
pub const MAX_SCORE: i32 = 5;

/// Answer to a project rating submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRatingResponse {
    pub average_rating: f64,
}

/// Like/dislike tally for a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRatingStats {
    pub likes: i64,
    pub dislikes: i64,
}

/// Rating widget state for a project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRatingView {
    pub project_id: Uuid,
    pub average_rating: f64,
    pub total_ratings: i64,
    pub user_rating: Option<i32>,
    pub has_rated: bool,
}

/// Rating widget state for a comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRatingView {
    pub comment_id: Uuid,
    pub likes: i64,
    pub dislikes: i64,
    pub has_rated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_response_is_camel_case() {
        let json = serde_json::to_value(ProjectRatingResponse {
            average_rating: 4.5,
        })
        .unwrap();
        assert_eq!(json["averageRating"], 4.5);
    }

    #[test]
    fn test_comment_stats_is_camel_case() {
        let json = serde_json::to_value(CommentRatingStats {
            likes: 3,
            dislikes: 1,
        })
        .unwrap();
        assert_eq!(json["likes"], 3);
        assert_eq!(json["dislikes"], 1);
    }
}

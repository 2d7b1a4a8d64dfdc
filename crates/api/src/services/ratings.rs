//! Project scores and comment likes.
//!
//! Each (target, user) pair has at most one active rating. Rating again
//! overwrites it; deleting flags it so aggregates skip it.

use chrono::Utc;
use domain::models::rating::{
    CommentRatingStats, CommentRatingView, ProjectRatingView, MAX_SCORE, MIN_SCORE,
};
use domain::services::{average_score, is_valid_score};
use persistence::entities::{CommentEntity, CommentRatingEntity, ProjectEntity, ProjectRatingEntity, UserEntity};
use persistence::{Filter, UnitOfWork};
use tracing::{info, warn};
use uuid::Uuid;

use super::projects::PROJECT_NOT_FOUND;
use super::users::USER_NOT_FOUND;
use super::ServiceError;

pub const COMMENT_NOT_FOUND: &str = "Comment not found.";

pub struct RatingService {
    uow: UnitOfWork,
}

impl RatingService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Records `score` for the pair and returns the new project average.
    pub async fn rate_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        score: i32,
    ) -> Result<f64, ServiceError> {
        if !is_valid_score(score) {
            return Err(ServiceError::validation(format!(
                "Score must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }
        self.ensure_project(project_id).await?;
        self.ensure_user(user_id).await?;

        let ratings = self.uow.repository::<ProjectRatingEntity>();
        match self.active_project_rating(project_id, user_id).await? {
            Some(mut existing) => {
                existing.score = score;
                existing.rated_on = Utc::now();
                ratings.try_update(&existing).await?;
            }
            None => {
                ratings
                    .add(&ProjectRatingEntity {
                        id: Uuid::new_v4(),
                        project_id,
                        user_id,
                        score,
                        rated_on: Utc::now(),
                        is_deleted: false,
                    })
                    .await?;
            }
        }

        info!(project_id = %project_id, user_id = %user_id, score, "Project rated");
        self.project_average(project_id).await
    }

    /// Records a like or dislike and returns the comment's new tally.
    pub async fn rate_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        is_like: bool,
    ) -> Result<CommentRatingStats, ServiceError> {
        self.ensure_comment(comment_id).await?;
        self.ensure_user(user_id).await?;

        let ratings = self.uow.repository::<CommentRatingEntity>();
        match self.active_comment_rating(comment_id, user_id).await? {
            Some(mut existing) => {
                existing.is_like = is_like;
                existing.rated_on = Utc::now();
                ratings.try_update(&existing).await?;
            }
            None => {
                ratings
                    .add(&CommentRatingEntity {
                        id: Uuid::new_v4(),
                        comment_id,
                        user_id,
                        is_like,
                        rated_on: Utc::now(),
                        is_deleted: false,
                    })
                    .await?;
            }
        }

        info!(comment_id = %comment_id, user_id = %user_id, is_like, "Comment rated");
        self.comment_stats(comment_id).await
    }

    pub async fn project_average(&self, project_id: Uuid) -> Result<f64, ServiceError> {
        let scores = self
            .uow
            .repository::<ProjectRatingEntity>()
            .get_all_where(ProjectRatingEntity::active_for(project_id))
            .await?
            .into_iter()
            .map(|r| r.score);
        Ok(average_score(scores))
    }

    pub async fn project_total(&self, project_id: Uuid) -> Result<i64, ServiceError> {
        Ok(self
            .uow
            .repository::<ProjectRatingEntity>()
            .count(ProjectRatingEntity::active_for(project_id))
            .await?)
    }

    pub async fn comment_stats(&self, comment_id: Uuid) -> Result<CommentRatingStats, ServiceError> {
        let ratings = self.uow.repository::<CommentRatingEntity>();
        let likes = ratings
            .count(CommentRatingEntity::active_for(comment_id).and(Filter::eq("is_like", true)))
            .await?;
        let dislikes = ratings
            .count(CommentRatingEntity::active_for(comment_id).and(Filter::eq("is_like", false)))
            .await?;
        Ok(CommentRatingStats { likes, dislikes })
    }

    pub async fn project_rating_view(
        &self,
        project_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<ProjectRatingView, ServiceError> {
        self.ensure_project(project_id).await?;
        let user_rating = match user_id {
            Some(user_id) => self.user_project_rating(project_id, user_id).await?,
            None => None,
        };

        Ok(ProjectRatingView {
            project_id,
            average_rating: self.project_average(project_id).await?,
            total_ratings: self.project_total(project_id).await?,
            has_rated: user_rating.is_some(),
            user_rating,
        })
    }

    pub async fn comment_rating_view(
        &self,
        comment_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<CommentRatingView, ServiceError> {
        self.ensure_comment(comment_id).await?;
        let stats = self.comment_stats(comment_id).await?;
        let has_rated = match user_id {
            Some(user_id) => self.has_user_rated_comment(comment_id, user_id).await?,
            None => false,
        };

        Ok(CommentRatingView {
            comment_id,
            likes: stats.likes,
            dislikes: stats.dislikes,
            has_rated,
        })
    }

    pub async fn has_user_rated_project(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, ServiceError> {
        Ok(self.active_project_rating(project_id, user_id).await?.is_some())
    }

    pub async fn user_project_rating(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<i32>, ServiceError> {
        Ok(self
            .active_project_rating(project_id, user_id)
            .await?
            .map(|r| r.score))
    }

    pub async fn has_user_rated_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, ServiceError> {
        Ok(self.active_comment_rating(comment_id, user_id).await?.is_some())
    }

    /// Flags the user's active project rating as deleted. `false` when there
    /// is none or the update did not go through.
    pub async fn delete_project_rating(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, ServiceError> {
        let Some(mut rating) = self.active_project_rating(project_id, user_id).await? else {
            return Ok(false);
        };
        rating.is_deleted = true;
        let deleted = self.uow.repository::<ProjectRatingEntity>().update(&rating).await;
        if deleted {
            info!(project_id = %project_id, user_id = %user_id, "Project rating removed");
        } else {
            warn!(project_id = %project_id, user_id = %user_id, "Project rating could not be removed");
        }
        Ok(deleted)
    }

    pub async fn delete_comment_rating(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, ServiceError> {
        let Some(mut rating) = self.active_comment_rating(comment_id, user_id).await? else {
            return Ok(false);
        };
        rating.is_deleted = true;
        let deleted = self.uow.repository::<CommentRatingEntity>().update(&rating).await;
        if deleted {
            info!(comment_id = %comment_id, user_id = %user_id, "Comment rating removed");
        } else {
            warn!(comment_id = %comment_id, user_id = %user_id, "Comment rating could not be removed");
        }
        Ok(deleted)
    }

    async fn active_project_rating(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProjectRatingEntity>, ServiceError> {
        Ok(self
            .uow
            .repository::<ProjectRatingEntity>()
            .query()
            .filter(ProjectRatingEntity::active_for(project_id).and(Filter::eq("user_id", user_id)))
            .first()
            .await?)
    }

    async fn active_comment_rating(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<CommentRatingEntity>, ServiceError> {
        Ok(self
            .uow
            .repository::<CommentRatingEntity>()
            .query()
            .filter(CommentRatingEntity::active_for(comment_id).and(Filter::eq("user_id", user_id)))
            .first()
            .await?)
    }

    async fn ensure_project(&self, project_id: Uuid) -> Result<(), ServiceError> {
        match self.uow.repository::<ProjectEntity>().get(&project_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found(PROJECT_NOT_FOUND)),
        }
    }

    async fn ensure_comment(&self, comment_id: Uuid) -> Result<(), ServiceError> {
        match self.uow.repository::<CommentEntity>().get(&comment_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found(COMMENT_NOT_FOUND)),
        }
    }

    async fn ensure_user(&self, user_id: Uuid) -> Result<(), ServiceError> {
        match self.uow.repository::<UserEntity>().get(&user_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::not_found(USER_NOT_FOUND)),
        }
    }
}

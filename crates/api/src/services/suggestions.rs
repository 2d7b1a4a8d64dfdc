//! Suggestions, their comments, and author-only editing.
//!
//! Ownership is data-driven: a user may edit or delete a suggestion when a
//! `user_suggestions` row links them to it. Roles play no part here; the admin
//! operations at the bottom are reached through admin-only routes.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use domain::models::comment::AddCommentRequest;
use domain::models::suggestion::{
    ConfirmDeleteSuggestion, MySuggestion, MySuggestions, SortBy, SuggestionDetails,
    SuggestionForEdit, SuggestionFormRequest,
};
use domain::models::{
    CityOption, CommentView, SuggestionPriority, SuggestionStatus, SuggestionSummary,
};
use persistence::entities::{
    CommentEntity, CommentRatingEntity, LocationEntity, SuggestionEntity,
    SuggestionLocationEntity, UserEntity, UserSuggestionEntity,
};
use persistence::{Filter, UnitOfWork};
use shared::pagination::PaginatedList;
use shared::validation::parse_id;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::cities::CityService;
use super::users::{UNKNOWN_USER, USER_NOT_FOUND};
use super::{in_transaction, ServiceError};

pub const INVALID_SUGGESTION_ID: &str = "Invalid suggestion ID.";
pub const SUGGESTION_NOT_FOUND: &str = "Suggestion not found.";
pub const INVALID_USER_ID: &str = "Invalid user ID.";
pub const INVALID_CITY: &str = "Invalid city selected.";
pub const INVALID_COMMENT_ID: &str = "Invalid comment ID.";
pub const NOT_AUTHORIZED_TO_EDIT: &str = "You are not authorized to edit this suggestion.";
pub const NOT_AUTHORIZED_TO_DELETE: &str = "You are not authorized to delete this suggestion.";
pub const UNKNOWN_CITY: &str = "Unknown";

pub struct SuggestionService {
    uow: UnitOfWork,
}

impl SuggestionService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Searched, sorted, paged listing. The search matches title or
    /// description, ignoring case; the total counts matches only.
    pub async fn get_all_suggestions(
        &self,
        page_index: i64,
        page_size: i64,
        search: Option<&str>,
        sort_by: SortBy,
        ascending: bool,
    ) -> Result<PaginatedList<SuggestionSummary>, ServiceError> {
        let mut query = self.uow.repository::<SuggestionEntity>().query();

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Filter::contains("title", term).or(Filter::contains("description", term)),
            );
        }

        let column = match sort_by {
            SortBy::Title => "title",
            SortBy::Date => "uploaded_on",
        };
        query = if ascending {
            query.order_by(column)
        } else {
            query.order_by_desc(column)
        };

        let page = query.order_by("id").paginate(page_index, page_size).await?;
        Ok(page.map(Into::into))
    }

    pub async fn get_form_options(&self) -> Result<Vec<CityOption>, ServiceError> {
        CityService::new(self.uow.clone()).get_cities().await
    }

    /// Creates a suggestion owned by `user_id` and linked to the chosen city.
    pub async fn add_suggestion(
        &self,
        request: SuggestionFormRequest,
        user_id: &str,
    ) -> Result<Uuid, ServiceError> {
        request.validate()?;
        let status = parse_status(request.status.as_deref())?.unwrap_or_default();
        let priority = parse_priority(request.priority.as_deref())?.unwrap_or_default();
        let user_id = parse_id(user_id, INVALID_USER_ID)?;

        if self.uow.repository::<UserEntity>().get(&user_id).await?.is_none() {
            return Err(ServiceError::not_found(USER_NOT_FOUND));
        }
        let city = self.city_named(&request.city_name).await?;

        let suggestion = SuggestionEntity {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            category: request.category.trim().to_string(),
            description: request.description.trim().to_string(),
            status: status.as_str().to_string(),
            priority: priority.as_str().to_string(),
            uploaded_on: Utc::now(),
            attachment_url: non_blank(request.attachment_url),
            latitude: request.latitude,
            longitude: request.longitude,
        };
        let id = suggestion.id;

        in_transaction(&self.uow, |tx| async move {
            tx.repository::<SuggestionEntity>().add(&suggestion).await?;
            tx.repository::<UserSuggestionEntity>()
                .add(&UserSuggestionEntity {
                    user_id,
                    suggestion_id: suggestion.id,
                })
                .await?;
            tx.repository::<SuggestionLocationEntity>()
                .add(&SuggestionLocationEntity {
                    suggestion_id: suggestion.id,
                    location_id: city.id,
                })
                .await?;
            Ok(())
        })
        .await?;

        info!(suggestion_id = %id, user_id = %user_id, "Suggestion added");
        Ok(id)
    }

    pub async fn get_suggestion_details(
        &self,
        id: &str,
        acting_user: Option<Uuid>,
    ) -> Result<SuggestionDetails, ServiceError> {
        let id = parse_id(id, INVALID_SUGGESTION_ID)?;
        let suggestion = self.load(id).await?;
        self.details(suggestion, acting_user).await
    }

    pub async fn add_comment(
        &self,
        suggestion_id: &str,
        request: AddCommentRequest,
        user_id: Uuid,
    ) -> Result<CommentView, ServiceError> {
        request.validate()?;
        let suggestion_id = parse_id(suggestion_id, INVALID_SUGGESTION_ID)?;
        self.load(suggestion_id).await?;

        let user = self
            .uow
            .repository::<UserEntity>()
            .get(&user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(USER_NOT_FOUND))?;

        let comment = CommentEntity {
            id: Uuid::new_v4(),
            content: request.content.trim().to_string(),
            added_on: Utc::now(),
            user_id,
            suggestion_id,
        };
        self.uow.repository::<CommentEntity>().add(&comment).await?;

        info!(comment_id = %comment.id, suggestion_id = %suggestion_id, "Comment added");
        Ok(CommentView {
            id: comment.id,
            suggestion_id,
            content: comment.content,
            added_on: comment.added_on,
            user_id,
            username: user.username,
            likes: 0,
            dislikes: 0,
        })
    }

    pub async fn get_comment(&self, comment_id: &str) -> Result<Option<CommentView>, ServiceError> {
        let comment_id = parse_id(comment_id, INVALID_COMMENT_ID)?;
        let Some(comment) = self.uow.repository::<CommentEntity>().get(&comment_id).await? else {
            return Ok(None);
        };
        Ok(comment_views(&self.uow, vec![comment]).await?.pop())
    }

    pub async fn get_suggestion_for_edit(
        &self,
        id: &str,
        user_id: Uuid,
    ) -> Result<SuggestionForEdit, ServiceError> {
        let id = parse_id(id, INVALID_SUGGESTION_ID)?;
        let suggestion = self.load(id).await?;
        self.ensure_owner(id, user_id, NOT_AUTHORIZED_TO_EDIT).await?;

        let city_name = self.linked_cities(&[id]).await?.remove(&id);
        let cities = self.get_form_options().await?;

        Ok(SuggestionForEdit {
            id,
            title: suggestion.title,
            category: suggestion.category,
            description: suggestion.description,
            status: suggestion.status,
            priority: suggestion.priority,
            attachment_url: suggestion.attachment_url,
            city_name,
            latitude: suggestion.latitude,
            longitude: suggestion.longitude,
            cities,
        })
    }

    /// Owner edit. Status and priority are kept when omitted; the location
    /// link is replaced when the city changes.
    pub async fn update_suggestion(
        &self,
        id: &str,
        request: SuggestionFormRequest,
        user_id: Uuid,
    ) -> Result<(), ServiceError> {
        request.validate()?;
        let status = parse_status(request.status.as_deref())?;
        let priority = parse_priority(request.priority.as_deref())?;
        let id = parse_id(id, INVALID_SUGGESTION_ID)?;

        let mut suggestion = self.load(id).await?;
        self.ensure_owner(id, user_id, NOT_AUTHORIZED_TO_EDIT).await?;
        let city = self.city_named(&request.city_name).await?;

        suggestion.title = request.title.trim().to_string();
        suggestion.category = request.category.trim().to_string();
        suggestion.description = request.description.trim().to_string();
        suggestion.attachment_url = non_blank(request.attachment_url);
        suggestion.latitude = request.latitude;
        suggestion.longitude = request.longitude;
        if let Some(status) = status {
            suggestion.status = status.as_str().to_string();
        }
        if let Some(priority) = priority {
            suggestion.priority = priority.as_str().to_string();
        }

        in_transaction(&self.uow, |tx| async move {
            if !tx.repository::<SuggestionEntity>().try_update(&suggestion).await? {
                return Err(ServiceError::not_found(SUGGESTION_NOT_FOUND));
            }

            let links = tx.repository::<SuggestionLocationEntity>();
            let current = links
                .get_all_where(Filter::eq("suggestion_id", suggestion.id))
                .await?;
            if !current.iter().any(|l| l.location_id == city.id) {
                links
                    .try_delete_where(Filter::eq("suggestion_id", suggestion.id))
                    .await?;
                links
                    .add(&SuggestionLocationEntity {
                        suggestion_id: suggestion.id,
                        location_id: city.id,
                    })
                    .await?;
            }
            Ok(())
        })
        .await?;

        info!(suggestion_id = %id, user_id = %user_id, "Suggestion updated");
        Ok(())
    }

    pub async fn get_suggestion_for_delete(
        &self,
        id: &str,
        user_id: Uuid,
    ) -> Result<ConfirmDeleteSuggestion, ServiceError> {
        let id = parse_id(id, INVALID_SUGGESTION_ID)?;
        let suggestion = self.load(id).await?;
        self.ensure_owner(id, user_id, NOT_AUTHORIZED_TO_DELETE).await?;

        Ok(ConfirmDeleteSuggestion {
            id,
            title: suggestion.title,
            category: suggestion.category,
            status: suggestion.status,
            uploaded_on: suggestion.uploaded_on,
        })
    }

    pub async fn delete_suggestion(&self, id: &str, user_id: Uuid) -> Result<(), ServiceError> {
        let id = parse_id(id, INVALID_SUGGESTION_ID)?;
        self.load(id).await?;
        self.ensure_owner(id, user_id, NOT_AUTHORIZED_TO_DELETE).await?;

        in_transaction(&self.uow, |tx| async move { remove_suggestion(&tx, id).await }).await?;

        info!(suggestion_id = %id, user_id = %user_id, "Suggestion deleted");
        Ok(())
    }

    /// The user's own suggestions, oldest first, plus the city options.
    pub async fn get_my_suggestions(&self, user_id: Uuid) -> Result<MySuggestions, ServiceError> {
        let owned: Vec<Uuid> = self
            .uow
            .repository::<UserSuggestionEntity>()
            .get_all_where(Filter::eq("user_id", user_id))
            .await?
            .into_iter()
            .map(|link| link.suggestion_id)
            .collect();

        let rows = self
            .uow
            .repository::<SuggestionEntity>()
            .query()
            .filter(Filter::is_in("id", owned))
            .order_by("uploaded_on")
            .fetch_all()
            .await?;

        let ids: Vec<Uuid> = rows.iter().map(|s| s.id).collect();
        let mut cities_by_suggestion = self.linked_cities(&ids).await?;

        let suggestions = rows
            .into_iter()
            .map(|s| MySuggestion {
                city_name: cities_by_suggestion
                    .remove(&s.id)
                    .unwrap_or_else(|| UNKNOWN_CITY.to_string()),
                id: s.id,
                title: s.title,
                category: s.category,
                status: s.status,
                priority: s.priority,
                uploaded_on: s.uploaded_on,
            })
            .collect();

        Ok(MySuggestions {
            suggestions,
            cities: self.get_form_options().await?,
        })
    }

    pub async fn get_all_for_admin(&self) -> Result<Vec<SuggestionSummary>, ServiceError> {
        let rows = self
            .uow
            .repository::<SuggestionEntity>()
            .query()
            .order_by_desc("uploaded_on")
            .fetch_all()
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_for_admin(&self, id: Uuid) -> Result<SuggestionDetails, ServiceError> {
        let suggestion = self.load(id).await?;
        self.details(suggestion, None).await
    }

    pub async fn admin_delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.load(id).await?;
        in_transaction(&self.uow, |tx| async move { remove_suggestion(&tx, id).await }).await?;
        info!(suggestion_id = %id, "Suggestion deleted by administrator");
        Ok(())
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<SuggestionSummary, ServiceError> {
        let status = parse_status(Some(status))?
            .ok_or_else(|| ServiceError::validation("Status is required."))?;
        let mut suggestion = self.load(id).await?;
        suggestion.status = status.as_str().to_string();
        self.store(&suggestion).await?;
        info!(suggestion_id = %id, status = %status, "Suggestion status changed");
        Ok(suggestion.into())
    }

    pub async fn update_priority(
        &self,
        id: Uuid,
        priority: &str,
    ) -> Result<SuggestionSummary, ServiceError> {
        let priority = parse_priority(Some(priority))?
            .ok_or_else(|| ServiceError::validation("Priority is required."))?;
        let mut suggestion = self.load(id).await?;
        suggestion.priority = priority.as_str().to_string();
        self.store(&suggestion).await?;
        info!(suggestion_id = %id, priority = %priority, "Suggestion priority changed");
        Ok(suggestion.into())
    }

    async fn load(&self, id: Uuid) -> Result<SuggestionEntity, ServiceError> {
        self.uow
            .repository::<SuggestionEntity>()
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(SUGGESTION_NOT_FOUND))
    }

    async fn store(&self, suggestion: &SuggestionEntity) -> Result<(), ServiceError> {
        if self.uow.repository::<SuggestionEntity>().update(suggestion).await {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "suggestion {} could not be updated",
                suggestion.id
            )))
        }
    }

    async fn city_named(&self, name: &str) -> Result<CityOption, ServiceError> {
        CityService::new(self.uow.clone())
            .find_city(name)
            .await?
            .ok_or_else(|| ServiceError::validation(INVALID_CITY))
    }

    async fn ensure_owner(
        &self,
        suggestion_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> Result<(), ServiceError> {
        let owns = self
            .uow
            .repository::<UserSuggestionEntity>()
            .get(&(user_id, suggestion_id))
            .await?
            .is_some();
        if owns {
            Ok(())
        } else {
            warn!(suggestion_id = %suggestion_id, user_id = %user_id, "Suggestion access denied");
            Err(ServiceError::Forbidden(message.to_string()))
        }
    }

    /// City of the first linked location, per suggestion.
    async fn linked_cities(
        &self,
        suggestion_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, String>, ServiceError> {
        let links = self
            .uow
            .repository::<SuggestionLocationEntity>()
            .get_all_where(Filter::is_in("suggestion_id", suggestion_ids.iter().copied()))
            .await?;
        let cities: HashMap<Uuid, String> = self
            .uow
            .repository::<LocationEntity>()
            .get_all_where(Filter::is_in("id", links.iter().map(|l| l.location_id)))
            .await?
            .into_iter()
            .map(|l| (l.id, l.city_name))
            .collect();

        let mut result = HashMap::new();
        for link in links {
            if let Some(city) = cities.get(&link.location_id) {
                result
                    .entry(link.suggestion_id)
                    .or_insert_with(|| city.clone());
            }
        }
        Ok(result)
    }

    async fn details(
        &self,
        suggestion: SuggestionEntity,
        acting_user: Option<Uuid>,
    ) -> Result<SuggestionDetails, ServiceError> {
        let id = suggestion.id;

        let location_ids: Vec<Uuid> = self
            .uow
            .repository::<SuggestionLocationEntity>()
            .get_all_where(Filter::eq("suggestion_id", id))
            .await?
            .into_iter()
            .map(|l| l.location_id)
            .collect();
        let location_names = self
            .uow
            .repository::<LocationEntity>()
            .query()
            .filter(Filter::is_in("id", location_ids))
            .order_by("city_name")
            .fetch_all()
            .await?
            .into_iter()
            .map(|l| l.city_name)
            .collect();

        let author_ids: Vec<Uuid> = self
            .uow
            .repository::<UserSuggestionEntity>()
            .get_all_where(Filter::eq("suggestion_id", id))
            .await?
            .into_iter()
            .map(|l| l.user_id)
            .collect();
        let is_owner = acting_user.is_some_and(|user| author_ids.contains(&user));
        let author_names = self
            .uow
            .repository::<UserEntity>()
            .query()
            .filter(Filter::is_in("id", author_ids))
            .order_by("username")
            .fetch_all()
            .await?
            .into_iter()
            .map(|u| u.username)
            .collect();

        let comments = self
            .uow
            .repository::<CommentEntity>()
            .query()
            .filter(Filter::eq("suggestion_id", id))
            .order_by("added_on")
            .fetch_all()
            .await?;
        let comments = comment_views(&self.uow, comments).await?;

        Ok(SuggestionDetails {
            id,
            title: suggestion.title,
            category: suggestion.category,
            description: suggestion.description,
            status: suggestion.status,
            priority: suggestion.priority,
            uploaded_on: suggestion.uploaded_on,
            attachment_url: suggestion.attachment_url,
            latitude: suggestion.latitude,
            longitude: suggestion.longitude,
            location_names,
            author_names,
            comments,
            is_owner,
        })
    }
}

fn parse_status(raw: Option<&str>) -> Result<Option<SuggestionStatus>, ServiceError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<SuggestionStatus>)
        .transpose()
        .map_err(ServiceError::Validation)
}

fn parse_priority(raw: Option<&str>) -> Result<Option<SuggestionPriority>, ServiceError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<SuggestionPriority>)
        .transpose()
        .map_err(ServiceError::Validation)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Comment rows with author names and active like/dislike counts.
pub(crate) async fn comment_views(
    uow: &UnitOfWork,
    comments: Vec<CommentEntity>,
) -> Result<Vec<CommentView>, ServiceError> {
    let usernames: HashMap<Uuid, String> = uow
        .repository::<UserEntity>()
        .get_all_where(Filter::is_in("id", comments.iter().map(|c| c.user_id)))
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();

    let ratings = uow
        .repository::<CommentRatingEntity>()
        .get_all_where(
            Filter::is_in("comment_id", comments.iter().map(|c| c.id))
                .and(Filter::eq("is_deleted", false)),
        )
        .await?;
    let mut counts: HashMap<Uuid, (i64, i64)> = HashMap::new();
    for rating in ratings {
        let entry = counts.entry(rating.comment_id).or_default();
        if rating.is_like {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    Ok(comments
        .into_iter()
        .map(|c| {
            let (likes, dislikes) = counts.get(&c.id).copied().unwrap_or_default();
            CommentView {
                username: usernames
                    .get(&c.user_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_USER.to_string()),
                id: c.id,
                suggestion_id: c.suggestion_id,
                content: c.content,
                added_on: c.added_on,
                user_id: c.user_id,
                likes,
                dislikes,
            }
        })
        .collect())
}

/// Suggestions with no remaining location link, oldest first.
pub(crate) async fn orphaned_suggestion_ids(uow: &UnitOfWork) -> Result<Vec<Uuid>, ServiceError> {
    let linked: HashSet<Uuid> = uow
        .repository::<SuggestionLocationEntity>()
        .get_all()
        .await?
        .into_iter()
        .map(|l| l.suggestion_id)
        .collect();

    Ok(uow
        .repository::<SuggestionEntity>()
        .query()
        .filter(Filter::not_in("id", linked))
        .order_by("uploaded_on")
        .fetch_all()
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect())
}

/// Deletes comments matching `filter` together with their ratings.
pub(crate) async fn remove_comments(uow: &UnitOfWork, filter: Filter) -> Result<u64, ServiceError> {
    let comments = uow.repository::<CommentEntity>();
    let ids: Vec<Uuid> = comments
        .get_all_where(filter)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    if ids.is_empty() {
        return Ok(0);
    }

    uow.repository::<CommentRatingEntity>()
        .try_delete_where(Filter::is_in("comment_id", ids.iter().copied()))
        .await?;
    Ok(comments.try_delete_where(Filter::is_in("id", ids)).await?)
}

/// Deletes a suggestion with its links, comments and comment ratings.
/// Callers run this inside a transaction.
pub(crate) async fn remove_suggestion(uow: &UnitOfWork, id: Uuid) -> Result<(), ServiceError> {
    uow.repository::<SuggestionLocationEntity>()
        .try_delete_where(Filter::eq("suggestion_id", id))
        .await?;
    uow.repository::<UserSuggestionEntity>()
        .try_delete_where(Filter::eq("suggestion_id", id))
        .await?;
    remove_comments(uow, Filter::eq("suggestion_id", id)).await?;
    uow.repository::<SuggestionEntity>().try_delete(&id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{add_comment, add_location, add_suggestion, add_user};

    fn form(title: &str, city: &str) -> SuggestionFormRequest {
        SuggestionFormRequest {
            title: title.to_string(),
            category: "Transport".to_string(),
            description: "More buses during rush hour".to_string(),
            attachment_url: None,
            city_name: city.to_string(),
            status: None,
            priority: Some("high".to_string()),
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn test_add_suggestion_creates_links() {
        let uow = UnitOfWork::in_memory();
        let sofia = add_location(&uow, "Sofia").await;
        let user = add_user(&uow, "maria").await;
        let service = SuggestionService::new(uow.clone());

        let id = service
            .add_suggestion(form("Night buses", "Sofia"), &user.id.to_string())
            .await
            .unwrap();

        let stored = uow.repository::<SuggestionEntity>().get(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, "Open");
        assert_eq!(stored.priority, "High");
        assert!(uow
            .repository::<UserSuggestionEntity>()
            .get(&(user.id, id))
            .await
            .unwrap()
            .is_some());
        assert!(uow
            .repository::<SuggestionLocationEntity>()
            .get(&(id, sofia.id))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_add_suggestion_failures() {
        let uow = UnitOfWork::in_memory();
        add_location(&uow, "Sofia").await;
        let user = add_user(&uow, "maria").await;
        let service = SuggestionService::new(uow.clone());

        match service.add_suggestion(form("Night buses", "Sofia"), "garbage").await {
            Err(ServiceError::Validation(msg)) => assert_eq!(msg, INVALID_USER_ID),
            other => panic!("unexpected {other:?}"),
        }
        match service
            .add_suggestion(form("Night buses", "Sofia"), &Uuid::new_v4().to_string())
            .await
        {
            Err(ServiceError::NotFound(msg)) => assert_eq!(msg, USER_NOT_FOUND),
            other => panic!("unexpected {other:?}"),
        }
        match service
            .add_suggestion(form("Night buses", "Atlantis"), &user.id.to_string())
            .await
        {
            Err(ServiceError::Validation(msg)) => assert_eq!(msg, INVALID_CITY),
            other => panic!("unexpected {other:?}"),
        }

        let mut bad_status = form("Night buses", "Sofia");
        bad_status.status = Some("Someday".to_string());
        assert!(matches!(
            service.add_suggestion(bad_status, "garbage").await,
            Err(ServiceError::Validation(msg)) if msg.contains("status")
        ));

        assert_eq!(
            uow.repository::<SuggestionEntity>().count(Filter::all()).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_search_and_sort() {
        let uow = UnitOfWork::in_memory();
        add_suggestion(&uow, "Parks cleanup", None, None).await;
        add_suggestion(&uow, "Bike lanes", None, None).await;
        add_suggestion(&uow, "Bike racks", None, None).await;
        let service = SuggestionService::new(uow);

        let page = service
            .get_all_suggestions(1, 10, Some("BIKE"), SortBy::Title, true)
            .await
            .unwrap();
        let titles: Vec<_> = page.items.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Bike lanes", "Bike racks"]);
        assert_eq!(page.total_count, 2);

        let page = service
            .get_all_suggestions(1, 2, None, SortBy::Title, false)
            .await
            .unwrap();
        assert_eq!(page.items[0].title, "Parks cleanup");
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_only_owner_may_edit_or_delete() {
        let uow = UnitOfWork::in_memory();
        let sofia = add_location(&uow, "Sofia").await;
        let owner = add_user(&uow, "owner").await;
        let stranger = add_user(&uow, "stranger").await;
        let suggestion =
            add_suggestion(&uow, "Fix potholes", Some(owner.id), Some(sofia.id)).await;
        let service = SuggestionService::new(uow.clone());
        let id = suggestion.id.to_string();

        match service.get_suggestion_for_edit(&id, stranger.id).await {
            Err(ServiceError::Forbidden(msg)) => assert_eq!(msg, NOT_AUTHORIZED_TO_EDIT),
            other => panic!("unexpected {other:?}"),
        }
        match service.delete_suggestion(&id, stranger.id).await {
            Err(ServiceError::Forbidden(msg)) => assert_eq!(msg, NOT_AUTHORIZED_TO_DELETE),
            other => panic!("unexpected {other:?}"),
        }

        let edit = service.get_suggestion_for_edit(&id, owner.id).await.unwrap();
        assert_eq!(edit.city_name.as_deref(), Some("Sofia"));

        service.delete_suggestion(&id, owner.id).await.unwrap();
        assert!(uow
            .repository::<SuggestionEntity>()
            .get(&suggestion.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_location_link() {
        let uow = UnitOfWork::in_memory();
        let sofia = add_location(&uow, "Sofia").await;
        let varna = add_location(&uow, "Varna").await;
        let owner = add_user(&uow, "owner").await;
        let suggestion =
            add_suggestion(&uow, "Fix potholes", Some(owner.id), Some(sofia.id)).await;
        let service = SuggestionService::new(uow.clone());

        let mut request = form("Fix potholes now", "Varna");
        request.status = Some("in review".to_string());
        service
            .update_suggestion(&suggestion.id.to_string(), request, owner.id)
            .await
            .unwrap();

        let links = uow
            .repository::<SuggestionLocationEntity>()
            .get_all()
            .await
            .unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].location_id, varna.id);

        let stored = uow
            .repository::<SuggestionEntity>()
            .get(&suggestion.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Fix potholes now");
        assert_eq!(stored.status, "In Review");
    }

    #[tokio::test]
    async fn test_details_include_comments_and_owner_flag() {
        let uow = UnitOfWork::in_memory();
        let sofia = add_location(&uow, "Sofia").await;
        let owner = add_user(&uow, "owner").await;
        let suggestion =
            add_suggestion(&uow, "Fix potholes", Some(owner.id), Some(sofia.id)).await;
        add_comment(&uow, suggestion.id, owner.id, "First!").await;
        let service = SuggestionService::new(uow);

        let details = service
            .get_suggestion_details(&suggestion.id.to_string(), Some(owner.id))
            .await
            .unwrap();
        assert!(details.is_owner);
        assert_eq!(details.location_names, vec!["Sofia"]);
        assert_eq!(details.author_names, vec!["owner"]);
        assert_eq!(details.comments.len(), 1);
        assert_eq!(details.comments[0].username, "owner");

        let anonymous = service
            .get_suggestion_details(&suggestion.id.to_string(), None)
            .await
            .unwrap();
        assert!(!anonymous.is_owner);
    }

    #[tokio::test]
    async fn test_add_comment_to_missing_suggestion() {
        let uow = UnitOfWork::in_memory();
        let user = add_user(&uow, "maria").await;
        let service = SuggestionService::new(uow);

        let request = AddCommentRequest {
            content: "Great idea".to_string(),
        };
        assert!(matches!(
            service
                .add_comment(&Uuid::new_v4().to_string(), request, user.id)
                .await,
            Err(ServiceError::NotFound(msg)) if msg == SUGGESTION_NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn test_my_suggestions_oldest_first() {
        let uow = UnitOfWork::in_memory();
        let ruse = add_location(&uow, "Ruse").await;
        let user = add_user(&uow, "maria").await;
        let mut older = add_suggestion(&uow, "Older idea", Some(user.id), Some(ruse.id)).await;
        older.uploaded_on = older.uploaded_on - chrono::Duration::days(1);
        uow.repository::<SuggestionEntity>().try_update(&older).await.unwrap();
        let newer = add_suggestion(&uow, "Newer idea", Some(user.id), None).await;
        add_suggestion(&uow, "Someone else", None, Some(ruse.id)).await;

        let mine = SuggestionService::new(uow)
            .get_my_suggestions(user.id)
            .await
            .unwrap();
        let ids: Vec<_> = mine.suggestions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
        assert_eq!(mine.suggestions[0].city_name, "Ruse");
        assert_eq!(mine.suggestions[1].city_name, UNKNOWN_CITY);
        assert_eq!(mine.cities.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_status_and_priority() {
        let uow = UnitOfWork::in_memory();
        let suggestion = add_suggestion(&uow, "Fix potholes", None, None).await;
        let service = SuggestionService::new(uow);

        let updated = service
            .update_status(suggestion.id, "approved")
            .await
            .unwrap();
        assert_eq!(updated.status, "Approved");

        assert!(matches!(
            service.update_priority(suggestion.id, "urgent").await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.update_status(Uuid::new_v4(), "Open").await,
            Err(ServiceError::NotFound(_))
        ));
    }
}

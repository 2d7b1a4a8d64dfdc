//! Location management and the cascading location delete.

use std::collections::HashMap;

use domain::models::location::{CreateLocationRequest, LinkedSuggestion, LocationCascadeReport};
use domain::models::{LocationDetails, LocationSummary};
use persistence::entities::{
    LocationEntity, MeetingEntity, ProjectEntity, SuggestionEntity, SuggestionLocationEntity,
};
use persistence::{Entity, Filter, UnitOfWork};
use shared::pagination::PaginatedList;
use shared::validation::parse_id;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::meetings::remove_meeting;
use super::projects::remove_project;
use super::suggestions::{orphaned_suggestion_ids, remove_suggestion};
use super::{in_transaction, ServiceError};

pub const INVALID_LOCATION_ID: &str = "Invalid location ID.";
pub const LOCATION_NOT_FOUND: &str = "Location not found.";

pub struct LocationService {
    uow: UnitOfWork,
}

impl LocationService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    pub async fn add_location(
        &self,
        request: CreateLocationRequest,
    ) -> Result<LocationSummary, ServiceError> {
        request.validate()?;

        let location = LocationEntity {
            id: Uuid::new_v4(),
            city_name: request.city_name.trim().to_string(),
            street_name: request.street_name.trim().to_string(),
            city_picture: request
                .city_picture
                .filter(|url| !url.trim().is_empty()),
        };
        self.uow.repository::<LocationEntity>().add(&location).await?;

        info!(location_id = %location.id, city = %location.city_name, "Location added");
        Ok(location.into())
    }

    /// One page of locations ordered by city name, each with its suggestions.
    pub async fn get_all_ordered_by_name(
        &self,
        page_index: i64,
        page_size: i64,
    ) -> Result<PaginatedList<LocationDetails>, ServiceError> {
        let page = self
            .uow
            .repository::<LocationEntity>()
            .query()
            .order_by("city_name")
            .order_by("street_name")
            .paginate(page_index, page_size)
            .await?;

        let ids: Vec<Uuid> = page.items.iter().map(|l| l.id).collect();
        let mut linked = self.linked_suggestions(&ids).await?;

        Ok(page.map(|location| LocationDetails {
            suggestions: linked.remove(&location.id).unwrap_or_default(),
            id: location.id,
            city_name: location.city_name,
            street_name: location.street_name,
            city_picture: location.city_picture,
        }))
    }

    pub async fn get_location_details(&self, id: &str) -> Result<LocationDetails, ServiceError> {
        let id = parse_id(id, INVALID_LOCATION_ID)?;
        let location = self
            .uow
            .repository::<LocationEntity>()
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(LOCATION_NOT_FOUND))?;

        let suggestions = self
            .linked_suggestions(&[id])
            .await?
            .remove(&id)
            .unwrap_or_default();

        Ok(LocationDetails {
            id: location.id,
            city_name: location.city_name,
            street_name: location.street_name,
            city_picture: location.city_picture,
            suggestions,
        })
    }

    pub async fn get_all_locations(&self) -> Result<Vec<LocationSummary>, ServiceError> {
        let locations = self
            .uow
            .repository::<LocationEntity>()
            .query()
            .order_by("city_name")
            .order_by("street_name")
            .fetch_all()
            .await?;
        Ok(locations.into_iter().map(Into::into).collect())
    }

    pub async fn get_location(&self, id: Uuid) -> Result<Option<LocationSummary>, ServiceError> {
        let location = self.uow.repository::<LocationEntity>().get(&id).await?;
        Ok(location.map(Into::into))
    }

    pub async fn location_exists(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self
            .uow
            .repository::<LocationEntity>()
            .get(&id)
            .await?
            .is_some())
    }

    /// Ids of suggestions that are no longer linked to any location.
    pub async fn find_orphaned_suggestions(&self) -> Result<Vec<Uuid>, ServiceError> {
        orphaned_suggestion_ids(&self.uow).await
    }

    /// Deletes a location and everything that depends on it.
    ///
    /// Order: suggestion links (one delete per link), suggestions left without
    /// any location, meetings at the location, projects at the location, and
    /// finally the location. Runs in one transaction.
    pub async fn delete_location(&self, id: Uuid) -> Result<LocationCascadeReport, ServiceError> {
        let report = in_transaction(&self.uow, |tx| async move {
            if tx.repository::<LocationEntity>().get(&id).await?.is_none() {
                return Err(ServiceError::not_found(LOCATION_NOT_FOUND));
            }

            let mut report = LocationCascadeReport::default();

            let links = tx.repository::<SuggestionLocationEntity>();
            for link in links.get_all_where(Filter::eq("location_id", id)).await? {
                if links.try_delete(&link.key()).await? {
                    report.links_removed += 1;
                }
            }

            for suggestion_id in orphaned_suggestion_ids(&tx).await? {
                remove_suggestion(&tx, suggestion_id).await?;
                report.suggestions_removed += 1;
            }

            let meetings = tx
                .repository::<MeetingEntity>()
                .get_all_where(Filter::eq("location_id", id))
                .await?;
            for meeting in meetings {
                remove_meeting(&tx, meeting.id).await?;
                report.meetings_removed += 1;
            }

            let projects = tx
                .repository::<ProjectEntity>()
                .get_all_where(Filter::eq("location_id", id))
                .await?;
            for project in projects {
                remove_project(&tx, project.id).await?;
                report.projects_removed += 1;
            }

            tx.repository::<LocationEntity>().try_delete(&id).await?;
            Ok(report)
        })
        .await?;

        info!(
            location_id = %id,
            links = report.links_removed,
            suggestions = report.suggestions_removed,
            meetings = report.meetings_removed,
            projects = report.projects_removed,
            "Location deleted"
        );
        Ok(report)
    }

    async fn linked_suggestions(
        &self,
        location_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<LinkedSuggestion>>, ServiceError> {
        let links = self
            .uow
            .repository::<SuggestionLocationEntity>()
            .get_all_where(Filter::is_in("location_id", location_ids.iter().copied()))
            .await?;

        let titles: HashMap<Uuid, String> = self
            .uow
            .repository::<SuggestionEntity>()
            .get_all_where(Filter::is_in(
                "id",
                links.iter().map(|l| l.suggestion_id),
            ))
            .await?
            .into_iter()
            .map(|s| (s.id, s.title))
            .collect();

        let mut grouped: HashMap<Uuid, Vec<LinkedSuggestion>> = HashMap::new();
        for link in links {
            if let Some(title) = titles.get(&link.suggestion_id) {
                grouped
                    .entry(link.location_id)
                    .or_default()
                    .push(LinkedSuggestion {
                        id: link.suggestion_id,
                        title: title.clone(),
                    });
            }
        }
        for suggestions in grouped.values_mut() {
            suggestions.sort_by(|a, b| a.title.cmp(&b.title));
        }
        Ok(grouped)
    }
}

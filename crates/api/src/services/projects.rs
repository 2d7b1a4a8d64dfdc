//! Crowdfunded projects.

use std::collections::HashMap;

use chrono::Utc;
use domain::models::project::{CreateProjectRequest, ProjectMapMarker};
use domain::models::{ProjectDetails, ProjectSummary};
use persistence::entities::{LocationEntity, ProjectEntity, ProjectRatingEntity};
use persistence::{Filter, UnitOfWork};
use shared::validation::parse_id;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::locations::INVALID_LOCATION_ID;
use super::ratings::RatingService;
use super::suggestions::UNKNOWN_CITY;
use super::{in_transaction, ServiceError};

pub const INVALID_PROJECT_ID: &str = "Invalid project ID.";
pub const PROJECT_NOT_FOUND: &str = "Project not found.";

pub struct ProjectService {
    uow: UnitOfWork,
}

impl ProjectService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// All projects, newest first.
    pub async fn get_all_projects(&self) -> Result<Vec<ProjectSummary>, ServiceError> {
        let projects = self
            .uow
            .repository::<ProjectEntity>()
            .query()
            .order_by_desc("created_on")
            .fetch_all()
            .await?;
        self.summaries(projects).await
    }

    /// Projects still collecting funds in locations of the named city.
    pub async fn get_ongoing_projects_by_city(
        &self,
        city: &str,
    ) -> Result<Vec<ProjectSummary>, ServiceError> {
        let location_ids: Vec<Uuid> = self
            .uow
            .repository::<LocationEntity>()
            .get_all_where(Filter::eq("city_name", city.trim()))
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();

        let projects = self
            .uow
            .repository::<ProjectEntity>()
            .query()
            .filter(
                Filter::is_in("location_id", location_ids)
                    .and(Filter::eq("is_completed", false)),
            )
            .order_by("funding_deadline")
            .fetch_all()
            .await?;
        self.summaries(projects).await
    }

    pub async fn get_project(&self, id: &str) -> Result<ProjectDetails, ServiceError> {
        let id = parse_id(id, INVALID_PROJECT_ID)?;
        let project = self.load(id).await?;

        let city_name = self
            .uow
            .repository::<LocationEntity>()
            .get(&project.location_id)
            .await?
            .map(|l| l.city_name)
            .unwrap_or_else(|| UNKNOWN_CITY.to_string());

        let ratings = RatingService::new(self.uow.clone());
        let average_rating = ratings.project_average(id).await?;
        let total_ratings = ratings.project_total(id).await?;

        Ok(ProjectDetails {
            id,
            name: project.name,
            description: project.description,
            image_url: project.image_url,
            funds_needed: project.funds_needed,
            created_on: project.created_on,
            funding_deadline: project.funding_deadline,
            is_completed: project.is_completed,
            location_id: project.location_id,
            city_name,
            latitude: project.latitude,
            longitude: project.longitude,
            average_rating,
            total_ratings,
        })
    }

    /// Projects that have both coordinates.
    pub async fn get_project_map(&self) -> Result<Vec<ProjectMapMarker>, ServiceError> {
        let projects = self
            .uow
            .repository::<ProjectEntity>()
            .query()
            .filter(
                Filter::is_null("latitude")
                    .not()
                    .and(Filter::is_null("longitude").not()),
            )
            .order_by("name")
            .fetch_all()
            .await?;

        Ok(projects
            .into_iter()
            .filter_map(|p| match (p.latitude, p.longitude) {
                (Some(latitude), Some(longitude)) => Some(ProjectMapMarker {
                    id: p.id,
                    name: p.name,
                    description: p.description,
                    latitude,
                    longitude,
                }),
                _ => None,
            })
            .collect())
    }

    pub async fn add_project(&self, request: CreateProjectRequest) -> Result<Uuid, ServiceError> {
        request.validate()?;
        if request.location_id.is_nil()
            || self
                .uow
                .repository::<LocationEntity>()
                .get(&request.location_id)
                .await?
                .is_none()
        {
            return Err(ServiceError::validation(INVALID_LOCATION_ID));
        }

        let project = ProjectEntity {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            funds_needed: request.funds_needed,
            image_url: request.image_url.filter(|url| !url.trim().is_empty()),
            description: request.description.trim().to_string(),
            created_on: Utc::now(),
            funding_deadline: request.funding_deadline,
            is_completed: false,
            latitude: request.latitude,
            longitude: request.longitude,
            location_id: request.location_id,
        };
        self.uow.repository::<ProjectEntity>().add(&project).await?;

        info!(project_id = %project.id, name = %project.name, "Project added");
        Ok(project.id)
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_id(id, INVALID_PROJECT_ID)?;
        self.load(id).await?;

        in_transaction(&self.uow, |tx| async move { remove_project(&tx, id).await }).await?;
        info!(project_id = %id, "Project deleted");
        Ok(())
    }

    pub async fn update_completion(
        &self,
        id: Uuid,
        is_completed: bool,
    ) -> Result<ProjectSummary, ServiceError> {
        let mut project = self.load(id).await?;
        project.is_completed = is_completed;
        self.store(&project).await?;

        info!(project_id = %id, is_completed, "Project completion changed");
        let mut summaries = self.summaries(vec![project]).await?;
        summaries
            .pop()
            .ok_or_else(|| ServiceError::not_found(PROJECT_NOT_FOUND))
    }

    /// Flips the completion flag and returns the new value.
    pub async fn toggle_completion(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut project = self.load(id).await?;
        project.is_completed = !project.is_completed;
        self.store(&project).await?;

        info!(project_id = %id, is_completed = project.is_completed, "Project completion toggled");
        Ok(project.is_completed)
    }

    async fn load(&self, id: Uuid) -> Result<ProjectEntity, ServiceError> {
        self.uow
            .repository::<ProjectEntity>()
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(PROJECT_NOT_FOUND))
    }

    async fn store(&self, project: &ProjectEntity) -> Result<(), ServiceError> {
        if self.uow.repository::<ProjectEntity>().update(project).await {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "project {} could not be updated",
                project.id
            )))
        }
    }

    async fn summaries(
        &self,
        projects: Vec<ProjectEntity>,
    ) -> Result<Vec<ProjectSummary>, ServiceError> {
        let cities: HashMap<Uuid, String> = self
            .uow
            .repository::<LocationEntity>()
            .get_all_where(Filter::is_in("id", projects.iter().map(|p| p.location_id)))
            .await?
            .into_iter()
            .map(|l| (l.id, l.city_name))
            .collect();

        Ok(projects
            .into_iter()
            .map(|p| ProjectSummary {
                city_name: cities
                    .get(&p.location_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_CITY.to_string()),
                id: p.id,
                name: p.name,
                description: p.description,
                image_url: p.image_url,
                funds_needed: p.funds_needed,
                is_completed: p.is_completed,
            })
            .collect())
    }
}

/// Deletes a project and all of its ratings, soft-deleted ones included.
/// Callers run this inside a transaction.
pub(crate) async fn remove_project(uow: &UnitOfWork, id: Uuid) -> Result<(), ServiceError> {
    uow.repository::<ProjectRatingEntity>()
        .try_delete_where(Filter::eq("project_id", id))
        .await?;
    uow.repository::<ProjectEntity>().try_delete(&id).await?;
    Ok(())
}

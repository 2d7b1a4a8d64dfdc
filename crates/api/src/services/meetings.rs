//! Community meetings and attendance.

use std::collections::HashMap;

use chrono::Utc;
use domain::models::meeting::MeetingFormRequest;
use domain::models::{AttendedMeeting, CityOption, MeetingDetails, MeetingSummary};
use domain::services::can_cancel_attendance;
use persistence::entities::{LocationEntity, MeetingAttendeeEntity, MeetingEntity, UserEntity};
use persistence::{Filter, UnitOfWork};
use shared::validation::parse_id;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::cities::CityService;
use super::locations::INVALID_LOCATION_ID;
use super::suggestions::UNKNOWN_CITY;
use super::users::{UNKNOWN_USER, USER_NOT_FOUND};
use super::{in_transaction, ServiceError};

pub const INVALID_MEETING_ID: &str = "Invalid meeting ID.";
pub const MEETING_NOT_FOUND: &str = "Meeting not found.";
pub const ORGANIZER_NOT_FOUND: &str = "Organizer not found.";
pub const NOT_AUTHORIZED_TO_EDIT: &str = "You are not authorized to edit this meeting.";
pub const NOT_AUTHORIZED_TO_DELETE: &str = "You are not authorized to delete this meeting.";
pub const ALREADY_ATTENDING: &str = "You are already attending this meeting.";
pub const NOT_ATTENDING: &str = "You are not attending this meeting.";

pub struct MeetingService {
    uow: UnitOfWork,
}

impl MeetingService {
    pub fn new(uow: UnitOfWork) -> Self {
        Self { uow }
    }

    /// Every meeting, soonest first.
    pub async fn get_all_meetings(
        &self,
        acting_user: Option<Uuid>,
    ) -> Result<Vec<MeetingSummary>, ServiceError> {
        let meetings = self
            .uow
            .repository::<MeetingEntity>()
            .query()
            .order_by("scheduled_date")
            .fetch_all()
            .await?;
        self.summaries(meetings, acting_user).await
    }

    pub async fn get_meeting(&self, id: &str) -> Result<MeetingDetails, ServiceError> {
        let id = parse_id(id, INVALID_MEETING_ID)?;
        let meeting = self.load(id).await?;

        let city_name = self.city_of(meeting.location_id).await?;
        let organizer_name = self
            .uow
            .repository::<UserEntity>()
            .get(&meeting.organizer_id)
            .await?
            .map(|u| u.username)
            .unwrap_or_else(|| UNKNOWN_USER.to_string());

        let attendee_ids: Vec<Uuid> = self
            .uow
            .repository::<MeetingAttendeeEntity>()
            .get_all_where(Filter::eq("meeting_id", id))
            .await?
            .into_iter()
            .map(|a| a.user_id)
            .collect();
        let attendees = self
            .uow
            .repository::<UserEntity>()
            .query()
            .filter(Filter::is_in("id", attendee_ids))
            .order_by("username")
            .fetch_all()
            .await?
            .into_iter()
            .map(|u| u.username)
            .collect();

        Ok(MeetingDetails {
            id,
            title: meeting.title,
            description: meeting.description,
            scheduled_date: meeting.scheduled_date,
            duration: meeting.duration,
            location_id: meeting.location_id,
            city_name,
            organizer_id: meeting.organizer_id,
            organizer_name,
            attendees,
            latitude: meeting.latitude,
            longitude: meeting.longitude,
        })
    }

    pub async fn get_form_options(&self) -> Result<Vec<CityOption>, ServiceError> {
        CityService::new(self.uow.clone()).get_cities().await
    }

    pub async fn create_meeting(
        &self,
        request: MeetingFormRequest,
        organizer_id: Uuid,
    ) -> Result<Uuid, ServiceError> {
        request.validate()?;
        self.ensure_location(request.location_id).await?;

        if self
            .uow
            .repository::<UserEntity>()
            .get(&organizer_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::not_found(ORGANIZER_NOT_FOUND));
        }

        let meeting = MeetingEntity {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            description: request.description.trim().to_string(),
            scheduled_date: request.scheduled_date,
            duration: request.duration,
            latitude: request.latitude,
            longitude: request.longitude,
            location_id: Some(request.location_id),
            organizer_id,
        };
        self.uow.repository::<MeetingEntity>().add(&meeting).await?;

        info!(meeting_id = %meeting.id, organizer_id = %organizer_id, "Meeting created");
        Ok(meeting.id)
    }

    pub async fn update_meeting(
        &self,
        id: &str,
        request: MeetingFormRequest,
        acting_user: Uuid,
    ) -> Result<(), ServiceError> {
        request.validate()?;
        let id = parse_id(id, INVALID_MEETING_ID)?;
        let mut meeting = self.load(id).await?;
        ensure_organizer(&meeting, acting_user, NOT_AUTHORIZED_TO_EDIT)?;
        self.ensure_location(request.location_id).await?;

        meeting.title = request.title.trim().to_string();
        meeting.description = request.description.trim().to_string();
        meeting.scheduled_date = request.scheduled_date;
        meeting.duration = request.duration;
        meeting.latitude = request.latitude;
        meeting.longitude = request.longitude;
        meeting.location_id = Some(request.location_id);

        if !self.uow.repository::<MeetingEntity>().try_update(&meeting).await? {
            return Err(ServiceError::not_found(MEETING_NOT_FOUND));
        }
        info!(meeting_id = %id, "Meeting updated");
        Ok(())
    }

    pub async fn delete_meeting(&self, id: &str, acting_user: Uuid) -> Result<(), ServiceError> {
        let id = parse_id(id, INVALID_MEETING_ID)?;
        let meeting = self.load(id).await?;
        ensure_organizer(&meeting, acting_user, NOT_AUTHORIZED_TO_DELETE)?;

        in_transaction(&self.uow, |tx| async move { remove_meeting(&tx, id).await }).await?;
        info!(meeting_id = %id, "Meeting deleted");
        Ok(())
    }

    pub async fn attend_meeting(&self, user_id: Uuid, meeting_id: &str) -> Result<(), ServiceError> {
        let meeting_id = parse_id(meeting_id, INVALID_MEETING_ID)?;
        self.load(meeting_id).await?;
        if self.uow.repository::<UserEntity>().get(&user_id).await?.is_none() {
            return Err(ServiceError::not_found(USER_NOT_FOUND));
        }

        let attendees = self.uow.repository::<MeetingAttendeeEntity>();
        if attendees.get(&(meeting_id, user_id)).await?.is_some() {
            return Err(ServiceError::Conflict(ALREADY_ATTENDING.to_string()));
        }
        attendees
            .add(&MeetingAttendeeEntity {
                meeting_id,
                user_id,
            })
            .await?;

        info!(meeting_id = %meeting_id, user_id = %user_id, "Attendance registered");
        Ok(())
    }

    pub async fn cancel_attendance(
        &self,
        user_id: Uuid,
        meeting_id: &str,
    ) -> Result<(), ServiceError> {
        let meeting_id = parse_id(meeting_id, INVALID_MEETING_ID)?;
        self.load(meeting_id).await?;
        if self.uow.repository::<UserEntity>().get(&user_id).await?.is_none() {
            return Err(ServiceError::not_found(USER_NOT_FOUND));
        }

        let removed = self
            .uow
            .repository::<MeetingAttendeeEntity>()
            .try_delete(&(meeting_id, user_id))
            .await?;
        if !removed {
            return Err(ServiceError::Conflict(NOT_ATTENDING.to_string()));
        }

        info!(meeting_id = %meeting_id, user_id = %user_id, "Attendance cancelled");
        Ok(())
    }

    pub async fn get_attended_meetings(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<AttendedMeeting>, ServiceError> {
        let meeting_ids: Vec<Uuid> = self
            .uow
            .repository::<MeetingAttendeeEntity>()
            .get_all_where(Filter::eq("user_id", user_id))
            .await?
            .into_iter()
            .map(|a| a.meeting_id)
            .collect();
        let meetings = self
            .uow
            .repository::<MeetingEntity>()
            .query()
            .filter(Filter::is_in("id", meeting_ids))
            .order_by("scheduled_date")
            .fetch_all()
            .await?;

        let cities = self.cities_by_location(&meetings).await?;
        let now = Utc::now();

        Ok(meetings
            .into_iter()
            .map(|m| AttendedMeeting {
                city_name: city_name(&cities, m.location_id),
                can_cancel_attendance: can_cancel_attendance(m.scheduled_date, now),
                id: m.id,
                title: m.title,
                scheduled_date: m.scheduled_date,
                duration: m.duration,
            })
            .collect())
    }

    /// Every meeting, newest first.
    pub async fn admin_get_all_meetings(&self) -> Result<Vec<MeetingSummary>, ServiceError> {
        let meetings = self
            .uow
            .repository::<MeetingEntity>()
            .query()
            .order_by_desc("scheduled_date")
            .fetch_all()
            .await?;
        self.summaries(meetings, None).await
    }

    pub async fn admin_delete_meeting(&self, id: Uuid) -> Result<bool, ServiceError> {
        if self.uow.repository::<MeetingEntity>().get(&id).await?.is_none() {
            return Ok(false);
        }
        in_transaction(&self.uow, |tx| async move { remove_meeting(&tx, id).await }).await?;
        info!(meeting_id = %id, "Meeting deleted by administrator");
        Ok(true)
    }

    async fn load(&self, id: Uuid) -> Result<MeetingEntity, ServiceError> {
        self.uow
            .repository::<MeetingEntity>()
            .get(&id)
            .await?
            .ok_or_else(|| ServiceError::not_found(MEETING_NOT_FOUND))
    }

    async fn ensure_location(&self, location_id: Uuid) -> Result<(), ServiceError> {
        if location_id.is_nil()
            || self
                .uow
                .repository::<LocationEntity>()
                .get(&location_id)
                .await?
                .is_none()
        {
            return Err(ServiceError::validation(INVALID_LOCATION_ID));
        }
        Ok(())
    }

    async fn city_of(&self, location_id: Option<Uuid>) -> Result<String, ServiceError> {
        let Some(location_id) = location_id else {
            return Ok(UNKNOWN_CITY.to_string());
        };
        Ok(self
            .uow
            .repository::<LocationEntity>()
            .get(&location_id)
            .await?
            .map(|l| l.city_name)
            .unwrap_or_else(|| UNKNOWN_CITY.to_string()))
    }

    async fn cities_by_location(
        &self,
        meetings: &[MeetingEntity],
    ) -> Result<HashMap<Uuid, String>, ServiceError> {
        Ok(self
            .uow
            .repository::<LocationEntity>()
            .get_all_where(Filter::is_in(
                "id",
                meetings.iter().filter_map(|m| m.location_id),
            ))
            .await?
            .into_iter()
            .map(|l| (l.id, l.city_name))
            .collect())
    }

    async fn summaries(
        &self,
        meetings: Vec<MeetingEntity>,
        acting_user: Option<Uuid>,
    ) -> Result<Vec<MeetingSummary>, ServiceError> {
        let cities = self.cities_by_location(&meetings).await?;

        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for attendee in self
            .uow
            .repository::<MeetingAttendeeEntity>()
            .get_all_where(Filter::is_in("meeting_id", meetings.iter().map(|m| m.id)))
            .await?
        {
            *counts.entry(attendee.meeting_id).or_default() += 1;
        }

        Ok(meetings
            .into_iter()
            .map(|m| MeetingSummary {
                city_name: city_name(&cities, m.location_id),
                attendee_count: counts.get(&m.id).copied().unwrap_or_default(),
                is_organizer: acting_user == Some(m.organizer_id),
                id: m.id,
                title: m.title,
                description: m.description,
                scheduled_date: m.scheduled_date,
                duration: m.duration,
                latitude: m.latitude,
                longitude: m.longitude,
            })
            .collect())
    }
}

fn city_name(cities: &HashMap<Uuid, String>, location_id: Option<Uuid>) -> String {
    location_id
        .and_then(|id| cities.get(&id).cloned())
        .unwrap_or_else(|| UNKNOWN_CITY.to_string())
}

fn ensure_organizer(
    meeting: &MeetingEntity,
    acting_user: Uuid,
    message: &str,
) -> Result<(), ServiceError> {
    if meeting.organizer_id == acting_user {
        Ok(())
    } else {
        warn!(meeting_id = %meeting.id, user_id = %acting_user, "Meeting access denied");
        Err(ServiceError::Forbidden(message.to_string()))
    }
}

/// Deletes a meeting and its attendee rows. Callers run this inside a
/// transaction.
pub(crate) async fn remove_meeting(uow: &UnitOfWork, id: Uuid) -> Result<(), ServiceError> {
    uow.repository::<MeetingAttendeeEntity>()
        .try_delete_where(Filter::eq("meeting_id", id))
        .await?;
    uow.repository::<MeetingEntity>().try_delete(&id).await?;
    Ok(())
}

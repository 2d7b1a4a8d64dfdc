//! Fixtures shared by the service tests.

use chrono::{DateTime, Duration, Utc};
use persistence::entities::{
    CommentEntity, LocationEntity, MeetingEntity, ProjectEntity, SuggestionEntity,
    SuggestionLocationEntity, UserEntity, UserSuggestionEntity,
};
use persistence::UnitOfWork;
use uuid::Uuid;

pub async fn add_location(uow: &UnitOfWork, city: &str) -> LocationEntity {
    let location = LocationEntity {
        id: Uuid::new_v4(),
        city_name: city.to_string(),
        street_name: "Main Street".to_string(),
        city_picture: None,
    };
    uow.repository::<LocationEntity>().add(&location).await.unwrap();
    location
}

pub async fn add_user(uow: &UnitOfWork, username: &str) -> UserEntity {
    let user = UserEntity {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{}@example.com", username.to_lowercase()),
        password_hash: "not-a-real-hash".to_string(),
        created_at: Utc::now(),
    };
    uow.repository::<UserEntity>().add(&user).await.unwrap();
    user
}

/// Adds a suggestion owned by `owner` and linked to `location`.
pub async fn add_suggestion(
    uow: &UnitOfWork,
    title: &str,
    owner: Option<Uuid>,
    location: Option<Uuid>,
) -> SuggestionEntity {
    let suggestion = SuggestionEntity {
        id: Uuid::new_v4(),
        title: title.to_string(),
        category: "Transport".to_string(),
        description: format!("{title} for the whole neighbourhood"),
        status: "Open".to_string(),
        priority: "Low".to_string(),
        uploaded_on: Utc::now(),
        attachment_url: None,
        latitude: None,
        longitude: None,
    };
    uow.repository::<SuggestionEntity>().add(&suggestion).await.unwrap();

    if let Some(user_id) = owner {
        uow.repository::<UserSuggestionEntity>()
            .add(&UserSuggestionEntity {
                user_id,
                suggestion_id: suggestion.id,
            })
            .await
            .unwrap();
    }
    if let Some(location_id) = location {
        link(uow, suggestion.id, location_id).await;
    }
    suggestion
}

pub async fn link(uow: &UnitOfWork, suggestion_id: Uuid, location_id: Uuid) {
    uow.repository::<SuggestionLocationEntity>()
        .add(&SuggestionLocationEntity {
            suggestion_id,
            location_id,
        })
        .await
        .unwrap();
}

pub async fn add_comment(
    uow: &UnitOfWork,
    suggestion_id: Uuid,
    user_id: Uuid,
    content: &str,
) -> CommentEntity {
    let comment = CommentEntity {
        id: Uuid::new_v4(),
        content: content.to_string(),
        added_on: Utc::now(),
        user_id,
        suggestion_id,
    };
    uow.repository::<CommentEntity>().add(&comment).await.unwrap();
    comment
}

pub async fn add_meeting(
    uow: &UnitOfWork,
    organizer_id: Uuid,
    location_id: Option<Uuid>,
    scheduled_date: DateTime<Utc>,
) -> MeetingEntity {
    let meeting = MeetingEntity {
        id: Uuid::new_v4(),
        title: "Neighbourhood meeting".to_string(),
        description: "Monthly gathering".to_string(),
        scheduled_date,
        duration: 1.5,
        latitude: None,
        longitude: None,
        location_id,
        organizer_id,
    };
    uow.repository::<MeetingEntity>().add(&meeting).await.unwrap();
    meeting
}

pub async fn add_project(uow: &UnitOfWork, name: &str, location_id: Uuid) -> ProjectEntity {
    let project = ProjectEntity {
        id: Uuid::new_v4(),
        name: name.to_string(),
        funds_needed: 25_000.0,
        image_url: None,
        description: format!("{name} funded by the community"),
        created_on: Utc::now(),
        funding_deadline: Utc::now() + Duration::days(90),
        is_completed: false,
        latitude: Some(42.7),
        longitude: Some(23.3),
        location_id,
    };
    uow.repository::<ProjectEntity>().add(&project).await.unwrap();
    project
}

//! Integration tests for meetings and attendance.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::TestApp;
use serde_json::{json, Value};

fn meeting_form(title: &str, location_id: &str, days_ahead: i64) -> Value {
    json!({
        "title": title,
        "description": "Open discussion with the district council",
        "scheduled_date": Utc::now() + Duration::days(days_ahead),
        "duration": 1.5,
        "location_id": location_id
    })
}

#[tokio::test]
async fn test_create_and_read_meeting() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let organizer = app.register("maria").await;
    let location_id = app.add_location(&admin.access_token, "Plovdiv").await;

    let (status, body) = app
        .post(
            "/api/meetings",
            organizer.token(),
            meeting_form("Park renovation", &location_id, 7),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/api/meetings/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Park renovation");
    assert_eq!(body["city_name"], "Plovdiv");
    assert_eq!(body["organizer_name"], "maria");
    assert_eq!(body["attendees"], json!([]));

    let (_, body) = app.get("/api/meetings", organizer.token()).await;
    assert_eq!(body[0]["is_organizer"], true);
    let (_, body) = app.get("/api/meetings", None).await;
    assert_eq!(body[0]["is_organizer"], false);
}

#[tokio::test]
async fn test_only_organizer_can_change_meeting() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let organizer = app.register("maria").await;
    let stranger = app.register("ivan").await;
    let location_id = app.add_location(&admin.access_token, "Plovdiv").await;
    let (_, body) = app
        .post(
            "/api/meetings",
            organizer.token(),
            meeting_form("Park renovation", &location_id, 7),
        )
        .await;
    let uri = format!("/api/meetings/{}", body["id"].as_str().unwrap());

    let (status, _) = app
        .put(&uri, stranger.token(), meeting_form("Taken over", &location_id, 7))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.delete(&uri, stranger.token()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(&uri, organizer.token(), meeting_form("Park renovation, part two", &location_id, 8))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.get(&uri, None).await;
    assert_eq!(body["title"], "Park renovation, part two");

    let (status, _) = app.delete(&uri, organizer.token()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attendance() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let organizer = app.register("maria").await;
    let neighbour = app.register("ivan").await;
    let location_id = app.add_location(&admin.access_token, "Plovdiv").await;
    let (_, body) = app
        .post(
            "/api/meetings",
            organizer.token(),
            meeting_form("Park renovation", &location_id, 7),
        )
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .post(&format!("/api/meetings/{}/attend", id), neighbour.token(), json!({}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .post(&format!("/api/meetings/{}/attend", id), neighbour.token(), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You are already attending this meeting.");

    let (_, body) = app.get(&format!("/api/meetings/{}", id), None).await;
    assert_eq!(body["attendees"], json!(["ivan"]));

    let (status, body) = app.get("/api/meetings/attended", neighbour.token()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Park renovation");
    assert_eq!(body[0]["can_cancel_attendance"], true);

    let (status, _) = app
        .post(&format!("/api/meetings/{}/cancel", id), neighbour.token(), json!({}))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .post(&format!("/api/meetings/{}/cancel", id), neighbour.token(), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You are not attending this meeting.");

    let (_, body) = app.get("/api/meetings/attended", neighbour.token()).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_meeting_requires_known_location() {
    let app = TestApp::new().await;
    let organizer = app.register("maria").await;

    let (status, body) = app
        .post(
            "/api/meetings",
            organizer.token(),
            meeting_form("Park renovation", &uuid::Uuid::new_v4().to_string(), 7),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid location ID.");
}

//! Integration tests for suggestions, ownership and comments.

mod common;

use axum::http::StatusCode;
use common::{suggestion_form, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_suggestion_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let author = app.register("maria").await;
    app.add_location(&admin.access_token, "Sofia").await;

    let id = app
        .add_suggestion(&author.access_token, "Repair the tram stop", "Sofia")
        .await;

    let (status, body) = app
        .get(&format!("/api/suggestions/{}", id), author.token())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Repair the tram stop");
    assert_eq!(body["status"], "Open");
    assert_eq!(body["priority"], "Low");
    assert_eq!(body["location_names"], json!(["Sofia"]));
    assert_eq!(body["author_names"], json!(["maria"]));
    assert_eq!(body["is_owner"], true);

    let (_, body) = app.get(&format!("/api/suggestions/{}", id), None).await;
    assert_eq!(body["is_owner"], false);

    let (status, body) = app
        .get(&format!("/api/suggestions/{}/delete", id), author.token())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Repair the tram stop");

    let (status, _) = app
        .delete(&format!("/api/suggestions/{}", id), author.token())
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/suggestions/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Suggestion not found.");
}

#[tokio::test]
async fn test_only_owner_can_edit_or_delete() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let author = app.register("maria").await;
    let stranger = app.register("ivan").await;
    app.add_location(&admin.access_token, "Sofia").await;
    let id = app
        .add_suggestion(&author.access_token, "Repair the tram stop", "Sofia")
        .await;

    let (status, body) = app
        .put(
            &format!("/api/suggestions/{}", id),
            stranger.token(),
            suggestion_form("Hijacked title", "Sofia"),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to edit this suggestion.");

    let (status, _) = app
        .get(&format!("/api/suggestions/{}/edit", id), stranger.token())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .delete(&format!("/api/suggestions/{}", id), stranger.token())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to delete this suggestion.");

    let (status, _) = app
        .put(
            &format!("/api/suggestions/{}", id),
            author.token(),
            suggestion_form("Repair both tram stops", "Sofia"),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app
        .get(&format!("/api/suggestions/{}/edit", id), author.token())
        .await;
    assert_eq!(body["title"], "Repair both tram stops");
    assert_eq!(body["city_name"], "Sofia");
}

#[tokio::test]
async fn test_update_moves_suggestion_to_new_city() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let author = app.register("maria").await;
    app.add_location(&admin.access_token, "Sofia").await;
    app.add_location(&admin.access_token, "Varna").await;
    let id = app
        .add_suggestion(&author.access_token, "Repair the tram stop", "Sofia")
        .await;

    let (status, _) = app
        .put(
            &format!("/api/suggestions/{}", id),
            author.token(),
            suggestion_form("Repair the tram stop", "Varna"),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get(&format!("/api/suggestions/{}", id), None).await;
    assert_eq!(body["location_names"], json!(["Varna"]));
}

#[tokio::test]
async fn test_add_suggestion_validation() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let author = app.register("maria").await;
    app.add_location(&admin.access_token, "Sofia").await;

    let (status, body) = app
        .post(
            "/api/suggestions",
            author.token(),
            suggestion_form("Repair the tram stop", "Atlantis"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid city selected.");

    let mut form = suggestion_form("Repair the tram stop", "Sofia");
    form["status"] = json!("Someday");
    let (status, _) = app.post("/api/suggestions", author.token(), form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/api/suggestions", author.token(), suggestion_form("Hi", "Sofia"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "title");

    let (status, _) = app
        .post("/api/suggestions", None, suggestion_form("Repair the tram stop", "Sofia"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/suggestions/not-a-guid", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid suggestion ID.");
}

#[tokio::test]
async fn test_search_sort_and_paginate() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let author = app.register("maria").await;
    app.add_location(&admin.access_token, "Sofia").await;
    for title in ["Bike lanes on Vitosha", "Cleaner parks", "Bike racks downtown"] {
        app.add_suggestion(&author.access_token, title, "Sofia").await;
    }

    let (status, body) = app
        .get("/api/suggestions?search=BIKE&sort_by=title&ascending=false", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 2);
    let titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Bike racks downtown", "Bike lanes on Vitosha"]);

    let (_, body) = app.get("/api/suggestions?page=1", None).await;
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["page_size"], 5);
    assert_eq!(body["has_next_page"], false);
}

#[tokio::test]
async fn test_comments() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let author = app.register("maria").await;
    let neighbour = app.register("ivan").await;
    app.add_location(&admin.access_token, "Sofia").await;
    let id = app
        .add_suggestion(&author.access_token, "Repair the tram stop", "Sofia")
        .await;

    let (status, comment) = app
        .post(
            &format!("/api/suggestions/{}/comments", id),
            neighbour.token(),
            json!({ "content": "  Fully agree  " }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["content"], "Fully agree");
    assert_eq!(comment["username"], "ivan");
    assert_eq!(comment["likes"], 0);

    let comment_id = comment["id"].as_str().unwrap();
    let (status, body) = app.get(&format!("/api/comments/{}", comment_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestion_id"], id.as_str());

    let (_, details) = app.get(&format!("/api/suggestions/{}", id), None).await;
    assert_eq!(details["comments"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .post(
            &format!("/api/suggestions/{}/comments", id),
            neighbour.token(),
            json!({ "content": "   " }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .get(&format!("/api/comments/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Comment not found.");
}

#[tokio::test]
async fn test_my_suggestions() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let author = app.register("maria").await;
    let other = app.register("ivan").await;
    app.add_location(&admin.access_token, "Sofia").await;
    app.add_suggestion(&author.access_token, "Repair the tram stop", "Sofia")
        .await;
    app.add_suggestion(&other.access_token, "Plant more trees", "Sofia")
        .await;

    let (status, body) = app.get("/api/my-suggestions", author.token()).await;

    assert_eq!(status, StatusCode::OK);
    let mine = body["suggestions"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["title"], "Repair the tram stop");
    assert_eq!(mine[0]["city_name"], "Sofia");
    assert_eq!(body["cities"][0]["name"], "Sofia");
}

//! Common test utilities for integration tests.
//!
//! Every test builds its own application over process-local storage, so
//! tests are independent and need no database.

// Not every helper is used by every test binary.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use persistence::UnitOfWork;
use serde_json::{json, Value};
use tower::ServiceExt;
use urban_system_api::app::create_app;
use urban_system_api::config::Config;
use urban_system_api::services::admin_bootstrap::bootstrap_admin;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_EMAIL: &str = "admin@urban.test";
pub const ADMIN_PASSWORD: &str = "Admin123!";
pub const USER_PASSWORD: &str = "Secret123";

/// An application router plus the storage behind it.
pub struct TestApp {
    pub router: Router,
    pub uow: UnitOfWork,
}

impl TestApp {
    /// Fresh application with empty storage and a bootstrapped administrator.
    pub async fn new() -> Self {
        Self::with_overrides(&[]).await
    }

    pub async fn with_overrides(overrides: &[(&str, &str)]) -> Self {
        let mut all = vec![
            ("administrator.username", ADMIN_USERNAME),
            ("administrator.email", ADMIN_EMAIL),
            ("administrator.password", ADMIN_PASSWORD),
        ];
        all.extend_from_slice(overrides);

        let config = Config::load_for_test(&all).expect("Failed to load test config");
        let uow = UnitOfWork::in_memory();
        bootstrap_admin(&uow, &config.administrator)
            .await
            .expect("Failed to bootstrap administrator");
        let router = create_app(config, uow.clone()).expect("Failed to build app");

        Self { router, uow }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Sends a request and returns its status and parsed JSON body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.send(json_request(method, uri, token, body)).await;
        let status = response.status();
        (status, parse_response_body(response).await)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, token, None).await
    }

    /// Registers a user with a random e-mail and returns their session.
    pub async fn register(&self, username: &str) -> AuthenticatedUser {
        let email: String = SafeEmail().fake();
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "username": username,
                    "email": email,
                    "password": USER_PASSWORD
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "Registration failed: {}", body);
        AuthenticatedUser::from_token_response(&body)
    }

    pub async fn login_admin(&self) -> AuthenticatedUser {
        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "Admin login failed: {}", body);
        AuthenticatedUser::from_token_response(&body)
    }

    /// Adds a location through the API and returns its id.
    pub async fn add_location(&self, token: &str, city: &str) -> String {
        let (status, body) = self
            .post(
                "/api/locations",
                Some(token),
                json!({ "city_name": city, "street_name": "Main Street" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "Adding location failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Files a suggestion in `city` and returns its id.
    pub async fn add_suggestion(&self, token: &str, title: &str, city: &str) -> String {
        let (status, body) = self
            .post(
                "/api/suggestions",
                Some(token),
                suggestion_form(title, city),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "Adding suggestion failed: {}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

/// Session returned by register or login.
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub access_token: String,
}

impl AuthenticatedUser {
    fn from_token_response(body: &Value) -> Self {
        Self {
            user_id: body["user_id"]
                .as_str()
                .unwrap_or_else(|| panic!("Missing user_id in response: {}", body))
                .to_string(),
            username: body["username"].as_str().unwrap_or_default().to_string(),
            access_token: body["access_token"]
                .as_str()
                .unwrap_or_else(|| panic!("Missing access_token in response: {}", body))
                .to_string(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        Some(&self.access_token)
    }
}

pub fn suggestion_form(title: &str, city: &str) -> Value {
    json!({
        "title": title,
        "category": "Transport",
        "description": "A longer description of the neighbourhood issue",
        "city_name": city
    })
}

/// Helper to create a JSON request.
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

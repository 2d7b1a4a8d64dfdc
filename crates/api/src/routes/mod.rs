//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod cities;
pub mod health;
pub mod locations;
pub mod meetings;
pub mod projects;
pub mod ratings;
pub mod suggestions;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body returned by create endpoints.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// `?page=` on paginated listings. Pages are 1-based.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

impl PageQuery {
    pub fn page_index(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

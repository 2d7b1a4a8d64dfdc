//! User account and role membership entities.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::entity::Entity;
use crate::value::Value;

/// Database row mapping for the users table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for UserEntity {
    type Key = Uuid;

    const TABLE: &'static str = "users";
    const KEY_COLUMNS: &'static [&'static str] = &["id"];

    fn key(&self) -> Uuid {
        self.id
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", self.id.into()),
            ("username", self.username.clone().into()),
            ("email", self.email.clone().into()),
            ("password_hash", self.password_hash.clone().into()),
            ("created_at", self.created_at.into()),
        ]
    }
}

/// Membership of a user in a named role.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserRoleEntity {
    pub user_id: Uuid,
    pub role: String,
}

impl Entity for UserRoleEntity {
    type Key = (Uuid, String);

    const TABLE: &'static str = "user_roles";
    const KEY_COLUMNS: &'static [&'static str] = &["user_id", "role"];

    fn key(&self) -> (Uuid, String) {
        (self.user_id, self.role.clone())
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("user_id", self.user_id.into()),
            ("role", self.role.clone().into()),
        ]
    }
}

//! User JWT authentication extractors.
//!
//! Validate the Bearer token in the Authorization header against the
//! application's signing key.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::user::ADMIN_ROLE;
use shared::jwt::{extract_user_id, JwtConfig};
use tracing::warn;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::users::roles_of;

/// Authenticated user information from JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    pub username: String,
    /// Roles at the time the token was issued.
    pub roles: Vec<String>,
}

impl UserAuth {
    fn from_token(jwt: &JwtConfig, token: &str) -> Result<Self, ApiError> {
        let claims = jwt
            .validate_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
        let user_id = extract_user_id(&claims)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(Self {
            user_id,
            username: claims.username,
            roles: claims.roles,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key("Authorization") {
            return Err(ApiError::Unauthorized(
                "Missing Authorization header".to_string(),
            ));
        }

        let token = bearer_token(parts).ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        UserAuth::from_token(&state.jwt, token)
    }
}

/// Optional user JWT authentication.
///
/// Anonymous and invalid tokens both yield `None`.
#[derive(Debug, Clone)]
pub struct OptionalUserAuth(pub Option<UserAuth>);

impl OptionalUserAuth {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|auth| auth.user_id)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalUserAuth(
            bearer_token(parts).and_then(|token| UserAuth::from_token(&state.jwt, token).ok()),
        ))
    }
}

/// Authenticated administrator.
///
/// Role membership is read from storage on every request, so revoking the
/// role takes effect before the token expires.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub UserAuth);

#[async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = UserAuth::from_request_parts(parts, state).await?;
        let roles = roles_of(&state.uow, user.user_id).await?;

        if !roles.iter().any(|role| role == ADMIN_ROLE) {
            warn!(user_id = %user.user_id, "Administrator access denied");
            return Err(ApiError::Forbidden(
                "Administrator access required".to_string(),
            ));
        }
        Ok(AdminAuth(user))
    }
}

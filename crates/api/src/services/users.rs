//! Accounts, sign-in and role membership.

use std::sync::Arc;

use chrono::Utc;
use domain::models::user::{LoginRequest, RegisterRequest, TokenResponse};
use domain::models::{Role, UserSummary};
use persistence::entities::{
    CommentRatingEntity, MeetingAttendeeEntity, MeetingEntity, ProjectRatingEntity,
    UserEntity, UserRoleEntity, UserSuggestionEntity,
};
use persistence::{Filter, UnitOfWork};
use shared::jwt::JwtConfig;
use shared::password::{hash_password, verify_password, PasswordPolicy};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::meetings::remove_meeting;
use super::suggestions::{remove_comments, remove_suggestion};
use super::{in_transaction, ServiceError};

pub const USER_NOT_FOUND: &str = "User not found.";
pub const UNKNOWN_USER: &str = "Unknown user";
pub const USERNAME_TAKEN: &str = "Username is already taken.";
pub const EMAIL_TAKEN: &str = "Email is already registered.";
pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";

pub struct UserService {
    uow: UnitOfWork,
    jwt: Arc<JwtConfig>,
    policy: PasswordPolicy,
}

impl UserService {
    pub fn new(uow: UnitOfWork, jwt: Arc<JwtConfig>, policy: PasswordPolicy) -> Self {
        Self { uow, jwt, policy }
    }

    /// Creates a `User`-role account and signs it in.
    pub async fn register(&self, request: RegisterRequest) -> Result<TokenResponse, ServiceError> {
        request.validate()?;
        self.policy
            .check(&request.password)
            .map_err(ServiceError::Validation)?;

        let user = create_user(
            &self.uow,
            request.username.trim(),
            &request.email,
            &request.password,
            Role::User,
        )
        .await?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        self.issue_token(&user).await
    }

    /// Accepts a username or an e-mail address.
    pub async fn login(&self, request: LoginRequest) -> Result<TokenResponse, ServiceError> {
        request.validate()?;
        let login = request.username.trim();

        let users = self.uow.repository::<UserEntity>();
        let user = match users
            .query()
            .filter(Filter::eq("username", login))
            .first()
            .await?
        {
            Some(user) => Some(user),
            None => {
                users
                    .query()
                    .filter(Filter::eq("email", login.to_lowercase()))
                    .first()
                    .await?
            }
        };

        let Some(user) = user else {
            warn!("Login attempt for unknown account");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };
        if !verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        info!(user_id = %user.id, "User logged in");
        self.issue_token(&user).await
    }

    pub async fn get_all_users(&self) -> Result<Vec<UserSummary>, ServiceError> {
        let users = self
            .uow
            .repository::<UserEntity>()
            .query()
            .order_by("username")
            .fetch_all()
            .await?;
        let roles = self.uow.repository::<UserRoleEntity>().get_all().await?;

        Ok(users
            .into_iter()
            .map(|u| {
                let mut user_roles: Vec<String> = roles
                    .iter()
                    .filter(|r| r.user_id == u.id)
                    .map(|r| r.role.clone())
                    .collect();
                user_roles.sort();
                UserSummary {
                    id: u.id,
                    username: u.username,
                    email: u.email,
                    roles: user_roles,
                    created_at: u.created_at,
                }
            })
            .collect())
    }

    pub async fn user_exists(&self, user_id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.uow.repository::<UserEntity>().get(&user_id).await?.is_some())
    }

    pub async fn roles_of(&self, user_id: Uuid) -> Result<Vec<String>, ServiceError> {
        roles_of(&self.uow, user_id).await
    }

    /// `false` for an unknown user or role name. Assigning a held role is a
    /// no-op that still reports `true`.
    pub async fn assign_role(&self, user_id: Uuid, role: &str) -> Result<bool, ServiceError> {
        let Ok(role) = role.parse::<Role>() else {
            return Ok(false);
        };
        if !self.user_exists(user_id).await? {
            return Ok(false);
        }

        let membership = UserRoleEntity {
            user_id,
            role: role.as_str().to_string(),
        };
        let memberships = self.uow.repository::<UserRoleEntity>();
        if memberships.get(&(user_id, membership.role.clone())).await?.is_none() {
            memberships.add(&membership).await?;
            info!(user_id = %user_id, role = %role, "Role assigned");
        }
        Ok(true)
    }

    pub async fn remove_role(&self, user_id: Uuid, role: &str) -> Result<bool, ServiceError> {
        let Ok(role) = role.parse::<Role>() else {
            return Ok(false);
        };
        if !self.user_exists(user_id).await? {
            return Ok(false);
        }

        if self
            .uow
            .repository::<UserRoleEntity>()
            .try_delete(&(user_id, role.as_str().to_string()))
            .await?
        {
            info!(user_id = %user_id, role = %role, "Role removed");
        }
        Ok(true)
    }

    /// Deletes the account and everything it authored, in one transaction.
    /// `false` when the user does not exist.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool, ServiceError> {
        if !self.user_exists(user_id).await? {
            return Ok(false);
        }

        in_transaction(&self.uow, |tx| async move {
            tx.repository::<CommentRatingEntity>()
                .try_delete_where(Filter::eq("user_id", user_id))
                .await?;
            tx.repository::<ProjectRatingEntity>()
                .try_delete_where(Filter::eq("user_id", user_id))
                .await?;
            remove_comments(&tx, Filter::eq("user_id", user_id)).await?;

            let owned = tx
                .repository::<UserSuggestionEntity>()
                .get_all_where(Filter::eq("user_id", user_id))
                .await?;
            for link in owned {
                remove_suggestion(&tx, link.suggestion_id).await?;
            }

            tx.repository::<MeetingAttendeeEntity>()
                .try_delete_where(Filter::eq("user_id", user_id))
                .await?;
            let organized = tx
                .repository::<MeetingEntity>()
                .get_all_where(Filter::eq("organizer_id", user_id))
                .await?;
            for meeting in organized {
                remove_meeting(&tx, meeting.id).await?;
            }

            tx.repository::<UserRoleEntity>()
                .try_delete_where(Filter::eq("user_id", user_id))
                .await?;
            tx.repository::<UserEntity>().try_delete(&user_id).await?;
            Ok(())
        })
        .await?;

        info!(user_id = %user_id, "User deleted");
        Ok(true)
    }

    async fn issue_token(&self, user: &UserEntity) -> Result<TokenResponse, ServiceError> {
        let roles = roles_of(&self.uow, user.id).await?;
        let issued = self
            .jwt
            .generate_access_token(user.id, &user.username, &roles)?;

        Ok(TokenResponse {
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user_id: user.id,
            username: user.username.clone(),
            roles,
        })
    }
}

pub(crate) async fn roles_of(uow: &UnitOfWork, user_id: Uuid) -> Result<Vec<String>, ServiceError> {
    Ok(uow
        .repository::<UserRoleEntity>()
        .query()
        .filter(Filter::eq("user_id", user_id))
        .order_by("role")
        .fetch_all()
        .await?
        .into_iter()
        .map(|r| r.role)
        .collect())
}

/// Stores a new account holding `role`. E-mails are kept lowercased;
/// duplicates of either name are a conflict.
pub(crate) async fn create_user(
    uow: &UnitOfWork,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<UserEntity, ServiceError> {
    let email = email.trim().to_lowercase();
    let users = uow.repository::<UserEntity>();

    if users.exists(Filter::eq("username", username)).await? {
        return Err(ServiceError::Conflict(USERNAME_TAKEN.to_string()));
    }
    if users.exists(Filter::eq("email", email.as_str())).await? {
        return Err(ServiceError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let user = UserEntity {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email,
        password_hash: hash_password(password)?,
        created_at: Utc::now(),
    };
    let membership = UserRoleEntity {
        user_id: user.id,
        role: role.as_str().to_string(),
    };

    let stored = user.clone();
    in_transaction(uow, |tx| async move {
        tx.repository::<UserEntity>().add(&stored).await?;
        tx.repository::<UserRoleEntity>().add(&membership).await?;
        Ok(())
    })
    .await?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{
        add_comment, add_location, add_meeting, add_suggestion, add_user,
    };
    use crate::services::{MeetingService, RatingService};
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;
    use persistence::entities::{CommentEntity, SuggestionEntity};

    fn service(uow: &UnitOfWork) -> UserService {
        let jwt = JwtConfig::new("test-secret-key-with-enough-length-for-hs256", 3600, 0).unwrap();
        UserService::new(uow.clone(), Arc::new(jwt), PasswordPolicy::default())
    }

    fn registration(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "Sofia2024".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let uow = UnitOfWork::in_memory();
        let users = service(&uow);
        let email: String = SafeEmail().fake();

        let token = users.register(registration("ivan", &email)).await.unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.roles, vec!["User"]);

        let by_name = users
            .login(LoginRequest {
                username: "ivan".to_string(),
                password: "Sofia2024".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(by_name.user_id, token.user_id);

        let by_email = users
            .login(LoginRequest {
                username: email.to_uppercase(),
                password: "Sofia2024".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(by_email.user_id, token.user_id);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let uow = UnitOfWork::in_memory();
        let users = service(&uow);
        users
            .register(registration("ivan", "ivan@example.com"))
            .await
            .unwrap();

        for (login, password) in [("ivan", "Wrong2024"), ("nobody", "Sofia2024")] {
            match users
                .login(LoginRequest {
                    username: login.to_string(),
                    password: password.to_string(),
                })
                .await
            {
                Err(ServiceError::Unauthorized(msg)) => assert_eq!(msg, INVALID_CREDENTIALS),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let uow = UnitOfWork::in_memory();
        let users = service(&uow);
        users
            .register(registration("ivan", "ivan@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            users.register(registration("ivan", "other@example.com")).await,
            Err(ServiceError::Conflict(msg)) if msg == USERNAME_TAKEN
        ));
        assert!(matches!(
            users.register(registration("petar", "IVAN@example.com")).await,
            Err(ServiceError::Conflict(msg)) if msg == EMAIL_TAKEN
        ));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let uow = UnitOfWork::in_memory();
        let mut request = registration("ivan", "ivan@example.com");
        request.password = "sofia".to_string();

        assert!(matches!(
            service(&uow).register(request).await,
            Err(ServiceError::Validation(msg)) if msg.contains("digit")
        ));
    }

    #[tokio::test]
    async fn test_role_assignment_is_idempotent() {
        let uow = UnitOfWork::in_memory();
        let user = add_user(&uow, "ivan").await;
        let users = service(&uow);

        assert!(users.assign_role(user.id, "admin").await.unwrap());
        assert!(users.assign_role(user.id, "Admin").await.unwrap());
        assert_eq!(users.roles_of(user.id).await.unwrap(), vec!["Admin"]);

        assert!(!users.assign_role(user.id, "Superuser").await.unwrap());
        assert!(!users.assign_role(Uuid::new_v4(), "Admin").await.unwrap());

        assert!(users.remove_role(user.id, "Admin").await.unwrap());
        assert!(users.remove_role(user.id, "Admin").await.unwrap());
        assert!(users.roles_of(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let uow = UnitOfWork::in_memory();
        let sofia = add_location(&uow, "Sofia").await;
        let doomed = add_user(&uow, "doomed").await;
        let other = add_user(&uow, "other").await;

        let owned = add_suggestion(&uow, "Owned idea", Some(doomed.id), Some(sofia.id)).await;
        let foreign = add_suggestion(&uow, "Foreign idea", Some(other.id), Some(sofia.id)).await;
        add_comment(&uow, foreign.id, doomed.id, "Nice").await;
        let kept = add_comment(&uow, foreign.id, other.id, "Thanks").await;
        RatingService::new(uow.clone())
            .rate_comment(kept.id, doomed.id, true)
            .await
            .unwrap();

        let organized = add_meeting(&uow, doomed.id, None, Utc::now()).await;
        let attended = add_meeting(&uow, other.id, None, Utc::now()).await;
        MeetingService::new(uow.clone())
            .attend_meeting(doomed.id, &attended.id.to_string())
            .await
            .unwrap();

        assert!(service(&uow).delete_user(doomed.id).await.unwrap());
        assert!(!service(&uow).delete_user(doomed.id).await.unwrap());

        let suggestions = uow.repository::<SuggestionEntity>();
        assert!(suggestions.get(&owned.id).await.unwrap().is_none());
        assert!(suggestions.get(&foreign.id).await.unwrap().is_some());

        let comments = uow.repository::<CommentEntity>().get_all().await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, kept.id);
        assert_eq!(
            RatingService::new(uow.clone())
                .comment_stats(kept.id)
                .await
                .unwrap()
                .likes,
            0
        );

        let meetings = uow.repository::<MeetingEntity>();
        assert!(meetings.get(&organized.id).await.unwrap().is_none());
        assert!(meetings.get(&attended.id).await.unwrap().is_some());
        assert_eq!(
            uow.repository::<MeetingAttendeeEntity>()
                .count(Filter::all())
                .await
                .unwrap(),
            0
        );
    }
}

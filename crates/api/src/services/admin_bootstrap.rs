//! Administrator bootstrap.
//!
//! Ensures the configured administrator account exists and holds the `Admin`
//! role. Runs on every startup and does nothing once both are in place.

use domain::models::Role;
use persistence::entities::{UserEntity, UserRoleEntity};
use persistence::{Filter, RepositoryError, UnitOfWork};
use tracing::{info, warn};

use super::users::create_user;
use super::ServiceError;
use crate::config::AdministratorConfig;

/// Error types for admin bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error("Could not create administrator: {0}")]
    Account(#[from] ServiceError),
}

/// What the bootstrap changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BootstrapOutcome {
    pub user_created: bool,
    pub role_granted: bool,
}

/// Creates the administrator when the e-mail is unknown, then grants the
/// `Admin` role if it is missing.
pub async fn bootstrap_admin(
    uow: &UnitOfWork,
    config: &AdministratorConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if !config.is_configured() {
        if !config.email.trim().is_empty() {
            warn!("US__ADMINISTRATOR__EMAIL is set but username or password is empty - skipping bootstrap");
        }
        return Ok(BootstrapOutcome::default());
    }

    let mut outcome = BootstrapOutcome::default();
    let email = config.email.trim().to_lowercase();

    let existing = uow
        .repository::<UserEntity>()
        .query()
        .filter(Filter::eq("email", email.as_str()))
        .first()
        .await?;
    let user = match existing {
        Some(user) => user,
        None => {
            let user = create_user(
                uow,
                config.username.trim(),
                &email,
                &config.password,
                Role::Admin,
            )
            .await?;
            outcome.user_created = true;
            outcome.role_granted = true;
            user
        }
    };

    let memberships = uow.repository::<UserRoleEntity>();
    let admin_role = Role::Admin.as_str().to_string();
    if memberships
        .get(&(user.id, admin_role.clone()))
        .await?
        .is_none()
    {
        memberships
            .add(&UserRoleEntity {
                user_id: user.id,
                role: admin_role,
            })
            .await?;
        outcome.role_granted = true;
    }

    if outcome != BootstrapOutcome::default() {
        info!(
            user_id = %user.id,
            email = %email,
            user_created = outcome.user_created,
            "Administrator bootstrapped"
        );
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::add_user;

    fn config() -> AdministratorConfig {
        AdministratorConfig {
            username: "admin".to_string(),
            email: "Admin@Urban.bg".to_string(),
            password: "Admin123!".to_string(),
        }
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let uow = UnitOfWork::in_memory();

        let first = bootstrap_admin(&uow, &config()).await.unwrap();
        assert!(first.user_created);
        assert!(first.role_granted);

        let second = bootstrap_admin(&uow, &config()).await.unwrap();
        assert_eq!(second, BootstrapOutcome::default());

        let users = uow.repository::<UserEntity>().get_all().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "admin@urban.bg");
        assert_eq!(
            uow.repository::<UserRoleEntity>()
                .count(Filter::eq("user_id", users[0].id))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_existing_account_gets_admin_role() {
        let uow = UnitOfWork::in_memory();
        let existing = add_user(&uow, "admin").await;
        let mut config = config();
        config.email = existing.email.clone();

        let outcome = bootstrap_admin(&uow, &config).await.unwrap();
        assert!(!outcome.user_created);
        assert!(outcome.role_granted);
        assert!(uow
            .repository::<UserRoleEntity>()
            .get(&(existing.id, "Admin".to_string()))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_unconfigured_is_skipped() {
        let uow = UnitOfWork::in_memory();
        let outcome = bootstrap_admin(&uow, &AdministratorConfig::default())
            .await
            .unwrap();
        assert_eq!(outcome, BootstrapOutcome::default());
    }
}

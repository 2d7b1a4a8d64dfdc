//! Domain services.
//!
//! Each service wraps a [`UnitOfWork`] and turns repository rows into the
//! view models in `domain::models`. Multi-step writes go through
//! [`in_transaction`].

pub mod admin_bootstrap;
pub mod cities;
pub mod error;
pub mod locations;
pub mod meetings;
pub mod projects;
pub mod ratings;
pub mod suggestions;
#[cfg(test)]
pub(crate) mod testing;
pub mod users;

use std::future::Future;

use persistence::UnitOfWork;
use tracing::warn;

pub use cities::CityService;
pub use error::ServiceError;
pub use locations::LocationService;
pub use meetings::MeetingService;
pub use projects::ProjectService;
pub use ratings::RatingService;
pub use suggestions::SuggestionService;
pub use users::UserService;

/// Runs `work` inside a transaction begun on `uow`.
///
/// Commits when `work` succeeds and rolls back when it fails. Called on a
/// handle that is already transactional, the work joins that transaction.
pub async fn in_transaction<T, F, Fut>(uow: &UnitOfWork, work: F) -> Result<T, ServiceError>
where
    F: FnOnce(UnitOfWork) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let tx = uow.begin().await?;
    match work(tx.clone()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}

//! Database entity definitions.
//!
//! Each entity is a row of one table and implements [`crate::entity::Entity`]
//! so the generic repository can load, write and filter it.

pub mod comment;
pub mod location;
pub mod meeting;
pub mod project;
pub mod rating;
pub mod suggestion;
pub mod user;

pub use comment::CommentEntity;
pub use location::LocationEntity;
pub use meeting::{MeetingAttendeeEntity, MeetingEntity};
pub use project::ProjectEntity;
pub use rating::{CommentRatingEntity, ProjectRatingEntity};
pub use suggestion::{SuggestionEntity, SuggestionLocationEntity, UserSuggestionEntity};
pub use user::{UserEntity, UserRoleEntity};

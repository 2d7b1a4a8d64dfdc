//! Domain models for the Urban System.

pub mod comment;
pub mod location;
pub mod meeting;
pub mod project;
pub mod rating;
pub mod suggestion;
pub mod user;

pub use comment::CommentView;
pub use location::{CityOption, LocationDetails, LocationSummary};
pub use meeting::{AttendedMeeting, MeetingDetails, MeetingSummary};
pub use project::{ProjectDetails, ProjectSummary};
pub use suggestion::{SuggestionPriority, SuggestionStatus, SuggestionSummary};
pub use user::{Role, UserSummary};

//! Pure domain rules shared by the application services.

pub mod cities;
pub mod meetings;
pub mod ratings;

pub use cities::group_cities;
pub use meetings::can_cancel_attendance;
pub use ratings::{average_score, is_valid_score};

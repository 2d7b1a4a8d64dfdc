//! Meeting attendance rules.

use chrono::{DateTime, Duration, Utc};

/// Attendance can no longer be cancelled this close to the start.
pub const CANCELLATION_WINDOW_HOURS: i64 = 24;

/// Whether an attendee may still cancel at `now`.
pub fn can_cancel_attendance(scheduled_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    scheduled_date > now + Duration::hours(CANCELLATION_WINDOW_HOURS)
}

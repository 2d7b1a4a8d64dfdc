//! Rating arithmetic.

use crate::models::rating::{MAX_SCORE, MIN_SCORE};

pub fn is_valid_score(score: i32) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// Mean of the given scores; 0 when there are none.
pub fn average_score<I>(scores: I) -> f64
where
    I: IntoIterator<Item = i32>,
{
    let (sum, count) = scores
        .into_iter()
        .fold((0i64, 0i64), |(sum, count), s| (sum + s as i64, count + 1));

    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

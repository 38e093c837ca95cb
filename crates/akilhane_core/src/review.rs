//! Spaced-repetition scheduling for flashcards.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Duration, Utc};

/// Confidence assigned to new and reset flashcards.
pub const DEFAULT_CONFIDENCE: u8 = 3;

/// Lowest accepted review confidence.
pub const MIN_CONFIDENCE: u8 = 1;

/// Highest accepted review confidence.
pub const MAX_CONFIDENCE: u8 = 5;

/// Longest review interval in days.
pub const MAX_INTERVAL_DAYS: i64 = 30;

/// Checks that `confidence` is within `1..=5`.
pub fn validate_confidence(confidence: u8) -> CoreResult<u8> {
    if (MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence) {
        Ok(confidence)
    } else {
        Err(CoreError::InvalidConfidence(confidence))
    }
}

/// Returns the number of days until the next review.
///
/// The interval grows geometrically with the number of reviews, faster and
/// with a higher cap for confident answers:
///
/// | confidence | growth | cap |
/// |---|---|---|
/// | 4-5 | 1.5^n | 30 |
/// | 3 | 1.3^n | 14 |
/// | 2 | 1.2^n | 7 |
/// | 1 | - | 1 |
pub fn review_interval_days(confidence: u8, review_count: u32) -> i64 {
    let n = i32::try_from(review_count).unwrap_or(i32::MAX);
    let days = match confidence {
        c if c >= 4 => 1.5_f64.powi(n).min(30.0),
        3 => 1.3_f64.powi(n).min(14.0),
        2 => 1.2_f64.powi(n).min(7.0),
        _ => 1.0,
    };
    // Capped above, so the cast cannot overflow.
    (days.round() as i64).clamp(1, MAX_INTERVAL_DAYS)
}

/// Returns when a card reviewed at `now` is due again.
pub fn next_review(now: DateTime<Utc>, confidence: u8, review_count: u32) -> DateTime<Utc> {
    now + Duration::days(review_interval_days(confidence, review_count))
}

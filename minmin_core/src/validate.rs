//! Input checks applied before any record is built.

use crate::ValidationError;

/// Longest sleep that can be recorded for one day
pub const MAX_SLEEP_HOURS: f64 = 24.0;

/// Accept a finite duration in `(0, 24]`
pub fn sleep_duration(hours: f64) -> Result<f64, ValidationError> {
    if hours.is_finite() && hours > 0.0 && hours <= MAX_SLEEP_HOURS {
        Ok(hours)
    } else {
        Err(ValidationError::InvalidSleepDuration(hours))
    }
}

/// Trim diary text, rejecting it when nothing is left
pub fn diary_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyDiaryText)
    } else {
        Ok(trimmed.to_string())
    }
}

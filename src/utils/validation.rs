//! Input validation utilities
//!
//! Wall-clock times arrive as "HH:MM" strings with no date component;
//! dates as "YYYY-MM-DD". Both are validated here before any lookup.

use chrono::{NaiveDate, NaiveTime};

use crate::utils::error::AppError;

/// Parse a local wall-clock time in "HH:MM" form
pub fn parse_wall_clock(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time '{}', expected HH:MM", value)))
}

/// Parse a calendar date in "YYYY-MM-DD" form
pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", value)))
}

/// Format a wall-clock time back to "HH:MM"
pub fn format_wall_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Validate a weekly schedule entry's window and optional break
pub fn validate_working_window(
    start: NaiveTime,
    end: NaiveTime,
    break_window: Option<(NaiveTime, NaiveTime)>,
) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::validation("Schedule start must precede end"));
    }
    if let Some((break_start, break_end)) = break_window {
        if break_start >= break_end {
            return Err(AppError::validation("Break start must precede break end"));
        }
        if break_start < start || break_end > end {
            return Err(AppError::validation(
                "Break must lie within the working window",
            ));
        }
    }
    Ok(())
}

/// Validate an absence date range (end date is inclusive)
pub fn validate_absence_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), AppError> {
    if start_date > end_date {
        return Err(AppError::validation(
            "Absence start date must not be after end date",
        ));
    }
    Ok(())
}

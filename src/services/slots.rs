//! Slot generation: the candidate grid of bookable start times
//!
//! All intervals are half-open `[start, end)`. A slot ending exactly at the
//! break start, or starting exactly at the break end, is valid.

use chrono::{NaiveTime, Timelike};

use crate::models::WorkingWindow;

/// Candidate start times for a service of `duration_minutes` within
/// `window`, stepping by `step_minutes`.
///
/// When a candidate interval touches the break, the cursor jumps straight to
/// the break end instead of stepping through a dense run of candidates that
/// would all be rejected. That jump also makes the boundary exact: the last
/// slot before the break is the one ending at `break.start`.
pub fn generate(window: &WorkingWindow, step_minutes: u32, duration_minutes: u32) -> Vec<NaiveTime> {
    if step_minutes == 0 || duration_minutes == 0 {
        return Vec::new();
    }

    let window_start = minutes_of(window.start);
    let window_end = minutes_of(window.end);
    let break_span = window
        .break_window
        .as_ref()
        .map(|b| (minutes_of(b.start), minutes_of(b.end)));

    let mut slots = Vec::new();
    let mut cursor = window_start;

    while cursor + duration_minutes <= window_end {
        let candidate_end = cursor + duration_minutes;

        if let Some((break_start, break_end)) = break_span {
            // Half-open overlap: [cursor, candidate_end) vs [break_start, break_end)
            if cursor < break_end && break_start < candidate_end {
                cursor = break_end;
                continue;
            }
        }

        slots.push(time_from(cursor));
        cursor += step_minutes;
    }

    slots
}

fn minutes_of(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

fn time_from(minutes: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(minutes * 60, 0)
        .unwrap_or(NaiveTime::MIN)
}

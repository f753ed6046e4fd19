//! Conflict checking: half-open interval overlap and the lead-time rule

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::db::OccupiedInterval;
use crate::services::timezone;

/// Two half-open intervals `[s1, e1)` and `[s2, e2)` overlap iff
/// `s1 < e2 && s2 < e1`.
pub fn intervals_overlap<T: PartialOrd>(s1: T, e1: T, s2: T, e2: T) -> bool {
    s1 < e2 && s2 < e1
}

/// Whether a candidate UTC interval is free of every occupied interval.
///
/// `exclude` removes a booking's own interval from consideration, so that
/// editing a booking does not conflict with itself.
pub fn is_available(
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
    occupied: &[OccupiedInterval],
    exclude: Option<uuid::Uuid>,
) -> bool {
    occupied
        .iter()
        .filter(|iv| Some(iv.booking_id) != exclude)
        .all(|iv| !intervals_overlap(candidate_start, candidate_end, iv.start_at, iv.end_at))
}

/// Whether a candidate start violates the lead-time buffer.
///
/// Only applies when the requested date is the current local date in the
/// tenant's timezone: bookings may not target the past or the immediate
/// present with insufficient notice. Dates in the local past always violate.
pub fn violates_lead_time(
    date: NaiveDate,
    candidate_start: NaiveTime,
    tz: Tz,
    lead_time_minutes: u32,
    now: DateTime<Utc>,
) -> bool {
    let (today, now_time) = timezone::to_local(now, tz);
    if date < today {
        return true;
    }
    if date > today {
        return false;
    }
    // Minute arithmetic instead of NaiveTime addition: a cutoff past
    // midnight must exclude the whole remaining day, not wrap around.
    let now_minutes = now_time.num_seconds_from_midnight() / 60;
    let candidate_minutes = candidate_start.num_seconds_from_midnight() / 60;
    candidate_minutes < now_minutes + lead_time_minutes
}

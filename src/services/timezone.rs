//! Time arithmetic between UTC instants and named-zone wall-clock time
//!
//! All conversions consult the zone database, so the offset in effect at the
//! specific instant is used. A fixed per-zone offset would drift by an hour
//! over every daylight-saving transition.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Convert a UTC instant to local calendar date and wall-clock time
pub fn to_local(instant: DateTime<Utc>, tz: Tz) -> (NaiveDate, NaiveTime) {
    let local = instant.with_timezone(&tz);
    (local.date_naive(), local.time())
}

/// Convert a local date and wall-clock time to a UTC instant.
///
/// During a daylight-saving gap the wall-clock time does not exist; the
/// conversion resolves to the first valid instant after the gap. Ambiguous
/// times (clocks rolled back) take the earlier offset.
pub fn to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _later) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            // Inside a gap; probe forward to the first representable minute.
            let mut probe = naive;
            loop {
                probe += Duration::minutes(1);
                if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
                    return dt.with_timezone(&Utc);
                }
            }
        }
    }
}

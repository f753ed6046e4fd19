//! Availability query: the optimistic slot view offered to callers
//!
//! This is the read side of the read-then-recheck-then-write discipline.
//! The view may go stale the moment it is returned; booking creation always
//! re-checks under the per-master lock before committing.

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;

use crate::db::BookingRepository;
use crate::models::{Master, Tenant};
use crate::services::{conflicts, slots, timezone, WorkingCalendar};

/// One offered slot or busy range, in the tenant's local wall-clock time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// The availability view for one master and date
#[derive(Debug, Clone)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub slots: Vec<LocalSlot>,
    pub occupied: Vec<LocalSlot>,
}

pub struct AvailabilityService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AvailabilityService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Compute offered slots and busy ranges for a master on a date.
    ///
    /// An inactive master or disabled tenant yields an empty slot list;
    /// that is an expected business state, not an error. `now` is passed in
    /// so the lead-time rule is testable and the query is deterministic.
    pub async fn day_view(
        &self,
        tenant: &Tenant,
        master: &Master,
        date: NaiveDate,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<DayAvailability> {
        let tz = tenant.tz().map_err(|e| anyhow::anyhow!(e.to_string()))?;

        let day_start = timezone::to_utc(date, NaiveTime::MIN, tz);
        let day_end = timezone::to_utc(
            date.succ_opt().unwrap_or(date),
            NaiveTime::MIN,
            tz,
        );

        let occupied = BookingRepository::new(self.pool)
            .occupied_between(tenant.id, master.id, day_start, day_end)
            .await?;

        let occupied_local: Vec<LocalSlot> = occupied
            .iter()
            .map(|iv| LocalSlot {
                start: clamp_to_date(iv.start_at, date, tz, NaiveTime::MIN),
                end: clamp_to_date(
                    iv.end_at,
                    date,
                    tz,
                    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
                ),
            })
            .collect();

        if !tenant.active || !master.active {
            return Ok(DayAvailability {
                date,
                slots: Vec::new(),
                occupied: occupied_local,
            });
        }

        let calendar = WorkingCalendar::new(self.pool);
        let Some(window) = calendar.schedule_for(tenant.id, master.id, date).await? else {
            return Ok(DayAvailability {
                date,
                slots: Vec::new(),
                occupied: occupied_local,
            });
        };

        let candidates = slots::generate(&window, tenant.slot_step_minutes, duration_minutes);

        let mut offered = Vec::with_capacity(candidates.len());
        for start in candidates {
            if conflicts::violates_lead_time(date, start, tz, tenant.lead_time_minutes, now) {
                continue;
            }
            let start_utc = timezone::to_utc(date, start, tz);
            let end_utc = start_utc + Duration::minutes(duration_minutes as i64);
            if conflicts::is_available(start_utc, end_utc, &occupied, None) {
                offered.push(LocalSlot {
                    start,
                    end: start + Duration::minutes(duration_minutes as i64),
                });
            }
        }

        Ok(DayAvailability {
            date,
            slots: offered,
            occupied: occupied_local,
        })
    }
}

/// Find a duration for the availability query: either an explicit duration
/// or the summed durations of a service selection.
pub fn selection_duration(durations: impl IntoIterator<Item = u32>) -> u32 {
    durations.into_iter().sum()
}

fn clamp_to_date(instant: DateTime<Utc>, date: NaiveDate, tz: chrono_tz::Tz, boundary: NaiveTime) -> NaiveTime {
    let (local_date, local_time) = timezone::to_local(instant, tz);
    if local_date == date {
        local_time
    } else {
        boundary
    }
}

//! Working calendar: weekly schedule resolution with absence override

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use futures::try_join;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::ScheduleRepository;
use crate::models::{Absence, WeeklyScheduleEntry, WorkingWindow};

/// Resolves the effective working window for a master on a concrete date.
pub struct WorkingCalendar<'a> {
    pool: &'a SqlitePool,
}

impl<'a> WorkingCalendar<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// The working window for `date`, or None when the master does not work
    /// that day.
    ///
    /// A master with no weekly schedule at all is a normal state (newly
    /// created, not yet configured), never an error. Any absence covering
    /// the date overrides the weekly schedule entirely.
    pub async fn schedule_for(
        &self,
        tenant_id: Uuid,
        master_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<WorkingWindow>> {
        let repo = ScheduleRepository::new(self.pool);
        let weekday = date.weekday().num_days_from_monday() as u8;
        let (entry, absences) = try_join!(
            repo.entry_for_weekday(tenant_id, master_id, weekday),
            repo.absences_covering(tenant_id, master_id, date),
        )?;
        Ok(resolve_window(entry, &absences, date))
    }
}

/// Pure resolution step: weekly entry minus absences
pub fn resolve_window(
    entry: Option<WeeklyScheduleEntry>,
    absences: &[Absence],
    date: NaiveDate,
) -> Option<WorkingWindow> {
    let entry = entry?;
    if absences.iter().any(|a| a.covers(date)) {
        return None;
    }
    Some(entry.working_window())
}

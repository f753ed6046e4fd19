//! Weekly schedules, absences and the service read model

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One weekly recurring working day for a master.
///
/// Times are local wall-clock values in the tenant's timezone, no date
/// component. At most one entry exists per (master, weekday); weekday 0 is
/// Monday, matching `chrono::Weekday::num_days_from_monday`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyScheduleEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub master_id: Uuid,
    pub weekday: u8,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub break_start: Option<NaiveTime>,
    pub break_end: Option<NaiveTime>,
}

impl WeeklyScheduleEntry {
    pub fn working_window(&self) -> WorkingWindow {
        WorkingWindow {
            start: self.start,
            end: self.end,
            break_window: match (self.break_start, self.break_end) {
                (Some(start), Some(end)) => Some(BreakWindow { start, end }),
                _ => None,
            },
        }
    }
}

/// The effective working hours for a master on a concrete date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub break_window: Option<BreakWindow>,
}

/// A break inside a working window, half-open like every interval here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A date-ranged absence overriding the weekly schedule.
///
/// The end date is inclusive. Absences may overlap each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Absence {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub master_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

impl Absence {
    /// Whether this absence covers the given date
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Service read model, owned by the surrounding CRUD layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub duration_minutes: u32,
    pub price_cents: i64,
    pub requires_confirmation: bool,
    pub active: bool,
}

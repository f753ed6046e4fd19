//! Weekly schedule and absence repository

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::parse_db_uuid;
use crate::models::{Absence, WeeklyScheduleEntry};
use crate::utils::validation::{validate_absence_range, validate_working_window};

#[derive(Debug, sqlx::FromRow)]
struct ScheduleRow {
    id: String,
    tenant_id: String,
    master_id: String,
    weekday: i64,
    start_time: String,
    end_time: String,
    break_start: Option<String>,
    break_end: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct AbsenceRow {
    id: String,
    tenant_id: String,
    master_id: String,
    start_date: String,
    end_date: String,
    reason: Option<String>,
}

pub struct ScheduleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ScheduleRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// The weekly entry for a master on a given weekday (0 = Monday)
    pub async fn entry_for_weekday(
        &self,
        tenant_id: Uuid,
        master_id: Uuid,
        weekday: u8,
    ) -> Result<Option<WeeklyScheduleEntry>> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT id, tenant_id, master_id, weekday, start_time, end_time,
                   break_start, break_end
            FROM weekly_schedule
            WHERE tenant_id = ? AND master_id = ? AND weekday = ?
            "#,
        )
        .bind(tenant_id.to_string())
        .bind(master_id.to_string())
        .bind(weekday as i64)
        .fetch_optional(self.pool)
        .await
        .context("Failed to get weekly schedule entry")?;

        row.map(row_to_entry).transpose()
    }

    /// Absences whose inclusive date range contains `date`
    pub async fn absences_covering(
        &self,
        tenant_id: Uuid,
        master_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Absence>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let rows = sqlx::query_as::<_, AbsenceRow>(
            r#"
            SELECT id, tenant_id, master_id, start_date, end_date, reason
            FROM absences
            WHERE tenant_id = ? AND master_id = ? AND start_date <= ? AND end_date >= ?
            ORDER BY start_date
            "#,
        )
        .bind(tenant_id.to_string())
        .bind(master_id.to_string())
        .bind(&date_str)
        .bind(&date_str)
        .fetch_all(self.pool)
        .await
        .context("Failed to list absences")?;

        rows.into_iter().map(row_to_absence).collect()
    }
}

fn parse_time_column(value: &str, column: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .with_context(|| format!("Malformed {} value '{}'", column, value))
}

fn row_to_entry(row: ScheduleRow) -> Result<WeeklyScheduleEntry> {
    let entry = WeeklyScheduleEntry {
        id: parse_db_uuid(&row.id)?,
        tenant_id: parse_db_uuid(&row.tenant_id)?,
        master_id: parse_db_uuid(&row.master_id)?,
        weekday: row.weekday.clamp(0, 6) as u8,
        start: parse_time_column(&row.start_time, "start_time")?,
        end: parse_time_column(&row.end_time, "end_time")?,
        break_start: row
            .break_start
            .as_deref()
            .map(|v| parse_time_column(v, "break_start"))
            .transpose()?,
        break_end: row
            .break_end
            .as_deref()
            .map(|v| parse_time_column(v, "break_end"))
            .transpose()?,
    };

    let break_pair = entry.break_start.zip(entry.break_end);
    validate_working_window(entry.start, entry.end, break_pair)
        .map_err(|e| anyhow::anyhow!("Invalid schedule row {}: {}", row.id, e))?;

    Ok(entry)
}

fn row_to_absence(row: AbsenceRow) -> Result<Absence> {
    let parse_date = |value: &str, column: &str| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .with_context(|| format!("Malformed {} value '{}'", column, value))
    };
    let start_date = parse_date(&row.start_date, "start_date")?;
    let end_date = parse_date(&row.end_date, "end_date")?;
    validate_absence_range(start_date, end_date)
        .map_err(|e| anyhow::anyhow!("Invalid absence row {}: {}", row.id, e))?;

    Ok(Absence {
        id: parse_db_uuid(&row.id)?,
        tenant_id: parse_db_uuid(&row.tenant_id)?,
        master_id: parse_db_uuid(&row.master_id)?,
        start_date,
        end_date,
        reason: row.reason,
    })
}

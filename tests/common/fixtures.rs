//! Seed data helpers for integration tests
//!
//! Inserts tenants, masters, services and schedules directly through the
//! pool so each test starts from a known calendar.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Seed a tenant in Europe/Berlin with a 15-minute grid and 30-minute lead time
pub async fn seed_tenant(pool: &SqlitePool) -> Uuid {
    seed_tenant_with(pool, "Europe/Berlin", 15, 30, false).await
}

/// Seed a tenant with explicit engine settings
pub async fn seed_tenant_with(
    pool: &SqlitePool,
    timezone: &str,
    slot_step_minutes: u32,
    lead_time_minutes: u32,
    allow_overbooking_edits: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO tenants (id, name, timezone, slot_step_minutes, lead_time_minutes, active, allow_overbooking_edits)
         VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id.to_string())
    .bind("Test Salon")
    .bind(timezone)
    .bind(slot_step_minutes)
    .bind(lead_time_minutes)
    .bind(allow_overbooking_edits as i64)
    .execute(pool)
    .await
    .expect("failed to seed tenant");
    id
}

/// Seed an active master for the tenant
pub async fn seed_master(pool: &SqlitePool, tenant_id: Uuid, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO masters (id, tenant_id, name, active) VALUES (?, ?, ?, 1)")
        .bind(id.to_string())
        .bind(tenant_id.to_string())
        .bind(name)
        .execute(pool)
        .await
        .expect("failed to seed master");
    id
}

/// Seed a service with the given duration; price defaults to 35.00
pub async fn seed_service(
    pool: &SqlitePool,
    tenant_id: Uuid,
    name: &str,
    duration_minutes: u32,
    requires_confirmation: bool,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO services (id, tenant_id, name, duration_minutes, price_cents, requires_confirmation, active)
         VALUES (?, ?, ?, ?, 3500, ?, 1)",
    )
    .bind(id.to_string())
    .bind(tenant_id.to_string())
    .bind(name)
    .bind(duration_minutes)
    .bind(requires_confirmation as i64)
    .execute(pool)
    .await
    .expect("failed to seed service");
    id
}

/// Seed a Monday-to-Friday 09:00-18:00 schedule with a 13:00-14:00 break
pub async fn seed_weekday_schedule(pool: &SqlitePool, tenant_id: Uuid, master_id: Uuid) {
    for weekday in 0..5u8 {
        seed_schedule_entry(
            pool,
            tenant_id,
            master_id,
            weekday,
            "09:00",
            "18:00",
            Some(("13:00", "14:00")),
        )
        .await;
    }
}

/// Seed a single weekly schedule entry; weekday 0 is Monday
pub async fn seed_schedule_entry(
    pool: &SqlitePool,
    tenant_id: Uuid,
    master_id: Uuid,
    weekday: u8,
    start_time: &str,
    end_time: &str,
    break_window: Option<(&str, &str)>,
) {
    let (break_start, break_end) = match break_window {
        Some((s, e)) => (Some(s), Some(e)),
        None => (None, None),
    };
    sqlx::query(
        "INSERT INTO weekly_schedule (id, tenant_id, master_id, weekday, start_time, end_time, break_start, break_end)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(tenant_id.to_string())
    .bind(master_id.to_string())
    .bind(weekday)
    .bind(start_time)
    .bind(end_time)
    .bind(break_start)
    .bind(break_end)
    .execute(pool)
    .await
    .expect("failed to seed schedule entry");
}

/// Seed an absence covering the inclusive date range
pub async fn seed_absence(
    pool: &SqlitePool,
    tenant_id: Uuid,
    master_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) {
    sqlx::query(
        "INSERT INTO absences (id, tenant_id, master_id, start_date, end_date, reason)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(tenant_id.to_string())
    .bind(master_id.to_string())
    .bind(start_date.format("%Y-%m-%d").to_string())
    .bind(end_date.format("%Y-%m-%d").to_string())
    .bind("vacation")
    .execute(pool)
    .await
    .expect("failed to seed absence");
}

pub async fn deactivate_tenant(pool: &SqlitePool, tenant_id: Uuid) {
    sqlx::query("UPDATE tenants SET active = 0 WHERE id = ?")
        .bind(tenant_id.to_string())
        .execute(pool)
        .await
        .expect("failed to deactivate tenant");
}

/// The next Monday strictly after today, far enough out to clear lead time
pub fn next_monday() -> NaiveDate {
    let today = Utc::now().date_naive();
    let days_ahead = 7 - today.weekday().num_days_from_monday() as i64;
    today + Duration::days(days_ahead)
}

/// A weekday (Mon-Fri) at least a week out, for tests that need a working day
pub fn future_working_date() -> NaiveDate {
    next_monday() + Duration::days(7)
}

/// Count committed bookings for a master that overlap the given window
pub async fn overlapping_booking_count(
    pool: &SqlitePool,
    master_id: Uuid,
    start_at: &str,
    end_at: &str,
) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings
         WHERE master_id = ? AND status IN ('new', 'confirmed', 'completed')
           AND start_at < ? AND end_at > ?",
    )
    .bind(master_id.to_string())
    .bind(end_at)
    .bind(start_at)
    .fetch_one(pool)
    .await
    .expect("failed to count bookings")
}

//! Database layer
//!
//! SQLite storage for the only records the engine reads and writes:
//! tenants, masters, services, weekly schedule entries, absences, bookings
//! with their line items, rotation counters and the audit log.

pub mod audit_repository;
pub mod booking_repository;
pub mod master_repository;
pub mod rotation_repository;
pub mod schedule_repository;
pub mod service_repository;
pub mod tenant_repository;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

pub use audit_repository::AuditRepository;
pub use booking_repository::{BookingRepository, OccupiedInterval};
pub use master_repository::MasterRepository;
pub use rotation_repository::RotationRepository;
pub use schedule_repository::ScheduleRepository;
pub use service_repository::{SelectionLookup, ServiceRepository};
pub use tenant_repository::TenantRepository;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool
pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Verify database connectivity
pub async fn check_health(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Parse a timestamp column written as RFC 3339 text.
///
/// A row that fails here is corrupt; substituting a guess would feed a
/// fabricated interval into conflict checking, so the error propagates.
pub(crate) fn parse_db_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt.with_timezone(&Utc));
    }
    let dt = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("Malformed timestamp column '{}'", ts))?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc))
}

pub(crate) fn parse_db_uuid(s: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(s).with_context(|| format!("Malformed uuid column '{}'", s))
}

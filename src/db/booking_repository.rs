//! Booking repository
//!
//! Reads run against the pool; the write methods take a transaction-scoped
//! connection so that a booking, its line items and the audit entry commit
//! as a single unit. A booking row without its items must never be
//! observable.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::db::{parse_db_timestamp, parse_db_uuid};
use crate::models::{Booking, BookingItem, BookingStatus};

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: String,
    tenant_id: String,
    master_id: String,
    start_at: String,
    end_at: String,
    status: String,
    total_price_cents: i64,
    client_name: String,
    client_phone: Option<String>,
    client_email: Option<String>,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct BookingItemRow {
    id: String,
    booking_id: String,
    service_id: String,
    service_name: String,
    duration_minutes: i64,
    price_cents: i64,
    position: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct IntervalRow {
    id: String,
    start_at: String,
    end_at: String,
}

/// A committed occupying interval, used by the conflict checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupiedInterval {
    pub booking_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

const OCCUPYING_STATUSES: &str = "'new', 'confirmed', 'completed'";

pub struct BookingRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BookingRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, tenant_id, master_id, start_at, end_at, status,
                   total_price_cents, client_name, client_phone, client_email,
                   notes, created_at, updated_at
            FROM bookings
            WHERE tenant_id = ? AND id = ?
            "#,
        )
        .bind(tenant_id.to_string())
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .context("Failed to get booking")?;

        let Some(row) = row else { return Ok(None) };

        let items = sqlx::query_as::<_, BookingItemRow>(
            r#"
            SELECT id, booking_id, service_id, service_name, duration_minutes,
                   price_cents, position
            FROM booking_items
            WHERE booking_id = ?
            ORDER BY position
            "#,
        )
        .bind(id.to_string())
        .fetch_all(self.pool)
        .await
        .context("Failed to get booking items")?;

        let items = items
            .into_iter()
            .map(row_to_item)
            .collect::<Result<Vec<_>>>()?;
        let booking = row_to_booking(row, items)?;
        Ok(Some(booking))
    }

    pub async fn list_for_master(
        &self,
        tenant_id: Uuid,
        master_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, tenant_id, master_id, start_at, end_at, status,
                   total_price_cents, client_name, client_phone, client_email,
                   notes, created_at, updated_at
            FROM bookings
            WHERE tenant_id = ? AND master_id = ? AND start_at < ? AND end_at > ?
            ORDER BY start_at
            "#,
        )
        .bind(tenant_id.to_string())
        .bind(master_id.to_string())
        .bind(to.to_rfc3339())
        .bind(from.to_rfc3339())
        .fetch_all(self.pool)
        .await
        .context("Failed to list bookings")?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let items = sqlx::query_as::<_, BookingItemRow>(
                r#"
                SELECT id, booking_id, service_id, service_name,
                       duration_minutes, price_cents, position
                FROM booking_items
                WHERE booking_id = ?
                ORDER BY position
                "#,
            )
            .bind(row.id.clone())
            .fetch_all(self.pool)
            .await
            .context("Failed to get booking items")?;
            let items = items
                .into_iter()
                .map(row_to_item)
                .collect::<Result<Vec<_>>>()?;
            bookings.push(row_to_booking(row, items)?);
        }
        Ok(bookings)
    }

    /// Occupying intervals for a master overlapping `[from, to)`.
    ///
    /// This is the optimistic read used by the availability query; the
    /// authoritative pre-commit re-check goes through
    /// [`occupied_between_tx`] instead.
    pub async fn occupied_between(
        &self,
        tenant_id: Uuid,
        master_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OccupiedInterval>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("Failed to acquire connection")?;
        occupied_between_tx(&mut conn, tenant_id, master_id, from, to).await
    }
}

/// Occupying intervals for a master overlapping `[from, to)`.
///
/// Runs on a transaction connection so the authoritative pre-commit
/// re-check sees the same snapshot the write will join.
pub async fn occupied_between_tx(
    conn: &mut SqliteConnection,
    tenant_id: Uuid,
    master_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<OccupiedInterval>> {
    let sql = format!(
        r#"
        SELECT id, start_at, end_at
        FROM bookings
        WHERE tenant_id = ? AND master_id = ?
          AND status IN ({OCCUPYING_STATUSES})
          AND start_at < ? AND end_at > ?
        ORDER BY start_at
        "#
    );
    let rows = sqlx::query_as::<_, IntervalRow>(&sql)
        .bind(tenant_id.to_string())
        .bind(master_id.to_string())
        .bind(to.to_rfc3339())
        .bind(from.to_rfc3339())
        .fetch_all(conn)
        .await
        .context("Failed to query occupied intervals")?;

    let mut intervals = Vec::with_capacity(rows.len());
    for row in rows {
        intervals.push(OccupiedInterval {
            booking_id: parse_db_uuid(&row.id)?,
            start_at: parse_db_timestamp(&row.start_at)?,
            end_at: parse_db_timestamp(&row.end_at)?,
        });
    }
    Ok(intervals)
}

/// Insert a booking together with all of its line items
pub async fn insert_tx(conn: &mut SqliteConnection, booking: &Booking) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO bookings (id, tenant_id, master_id, start_at, end_at,
                              status, total_price_cents, client_name,
                              client_phone, client_email, notes,
                              created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(booking.id.to_string())
    .bind(booking.tenant_id.to_string())
    .bind(booking.master_id.to_string())
    .bind(booking.start_at.to_rfc3339())
    .bind(booking.end_at.to_rfc3339())
    .bind(booking.status.as_str())
    .bind(booking.total_price_cents)
    .bind(&booking.client_name)
    .bind(booking.client_phone.as_deref())
    .bind(booking.client_email.as_deref())
    .bind(booking.notes.as_deref())
    .bind(booking.created_at.to_rfc3339())
    .bind(booking.updated_at.to_rfc3339())
    .execute(&mut *conn)
    .await
    .context("Failed to insert booking")?;

    for item in &booking.items {
        sqlx::query(
            r#"
            INSERT INTO booking_items (id, booking_id, service_id, service_name,
                                       duration_minutes, price_cents, position)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.booking_id.to_string())
        .bind(item.service_id.to_string())
        .bind(&item.service_name)
        .bind(item.duration_minutes as i64)
        .bind(item.price_cents)
        .bind(item.position as i64)
        .execute(&mut *conn)
        .await
        .context("Failed to insert booking item")?;
    }

    Ok(())
}

/// Update the mutable fields of an existing booking row
pub async fn update_fields_tx(conn: &mut SqliteConnection, booking: &Booking) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET master_id = ?, start_at = ?, end_at = ?, total_price_cents = ?,
            notes = ?, updated_at = ?
        WHERE tenant_id = ? AND id = ?
        "#,
    )
    .bind(booking.master_id.to_string())
    .bind(booking.start_at.to_rfc3339())
    .bind(booking.end_at.to_rfc3339())
    .bind(booking.total_price_cents)
    .bind(booking.notes.as_deref())
    .bind(booking.updated_at.to_rfc3339())
    .bind(booking.tenant_id.to_string())
    .bind(booking.id.to_string())
    .execute(conn)
    .await
    .context("Failed to update booking")?;

    anyhow::ensure!(result.rows_affected() == 1, "Booking row vanished mid-update");
    Ok(())
}

/// Persist a status transition
pub async fn update_status_tx(
    conn: &mut SqliteConnection,
    tenant_id: Uuid,
    id: Uuid,
    status: BookingStatus,
    updated_at: DateTime<Utc>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET status = ?, updated_at = ?
        WHERE tenant_id = ? AND id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(updated_at.to_rfc3339())
    .bind(tenant_id.to_string())
    .bind(id.to_string())
    .execute(conn)
    .await
    .context("Failed to update booking status")?;

    anyhow::ensure!(result.rows_affected() == 1, "Booking row vanished mid-update");
    Ok(())
}

fn row_to_booking(row: BookingRow, items: Vec<BookingItem>) -> Result<Booking> {
    let status = BookingStatus::parse(&row.status)
        .with_context(|| format!("Unknown booking status '{}'", row.status))?;
    Ok(Booking {
        id: parse_db_uuid(&row.id)?,
        tenant_id: parse_db_uuid(&row.tenant_id)?,
        master_id: parse_db_uuid(&row.master_id)?,
        start_at: parse_db_timestamp(&row.start_at)?,
        end_at: parse_db_timestamp(&row.end_at)?,
        status,
        total_price_cents: row.total_price_cents,
        client_name: row.client_name,
        client_phone: row.client_phone,
        client_email: row.client_email,
        notes: row.notes,
        items,
        created_at: parse_db_timestamp(&row.created_at)?,
        updated_at: parse_db_timestamp(&row.updated_at)?,
    })
}

fn row_to_item(row: BookingItemRow) -> Result<BookingItem> {
    Ok(BookingItem {
        id: parse_db_uuid(&row.id)?,
        booking_id: parse_db_uuid(&row.booking_id)?,
        service_id: parse_db_uuid(&row.service_id)?,
        service_name: row.service_name,
        duration_minutes: row.duration_minutes.max(0) as u32,
        price_cents: row.price_cents,
        position: row.position.max(0) as u32,
    })
}

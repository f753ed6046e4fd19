//! Booking transactions: authoritative re-check and atomic commit
//!
//! The availability view handed to clients is optimistic. Every create and
//! edit therefore re-runs the conflict check against the current booking set
//! while holding a per-master lock, and writes the booking, its line items
//! and the audit entry inside one database transaction. The response always
//! reflects the transaction's actual outcome.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::{audit_repository, booking_repository, BookingRepository, MasterRepository,
    SelectionLookup, ServiceRepository};
use crate::models::{
    ActorKind, Booking, BookingItem, BookingStatus, CreateBookingRequest, Master, Tenant,
    UpdateBookingRequest, WorkingWindow,
};
use crate::services::{conflicts, timezone, WorkingCalendar};
use crate::utils::validation::{parse_date, parse_wall_clock};
use crate::utils::{AppError, AppResult};

/// Per-master serialization points.
///
/// Two concurrent requests for the same master must not both pass the
/// re-check and both commit; holding this lock from re-check through commit
/// rules that out. Requests for different masters proceed in parallel.
#[derive(Default)]
pub struct MasterLockRegistry {
    locks: StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl MasterLockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, master_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(master_id).or_default().clone()
    }
}

pub struct BookingService<'a> {
    pool: &'a SqlitePool,
    locks: &'a MasterLockRegistry,
}

impl<'a> BookingService<'a> {
    pub fn new(pool: &'a SqlitePool, locks: &'a MasterLockRegistry) -> Self {
        Self { pool, locks }
    }

    /// Create a booking, or fail with a 409 if the interval is taken.
    ///
    /// Status on creation: NEW when any selected service requires
    /// confirmation, CONFIRMED otherwise (auto-accept fast path).
    pub async fn create(
        &self,
        tenant: &Tenant,
        req: &CreateBookingRequest,
        actor_kind: ActorKind,
        actor_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        if !tenant.active {
            return Err(AppError::not_found("Tenant is disabled"));
        }

        let date = parse_date(&req.date)?;
        let start_local = parse_wall_clock(&req.start)?;
        let tz = tenant.tz()?;

        let master = MasterRepository::new(self.pool)
            .get_by_id(tenant.id, req.master_id)
            .await?
            .ok_or_else(|| AppError::not_found("Master not found"))?;
        if !master.active {
            return Err(AppError::not_found("Master is not active"));
        }

        let services = match ServiceRepository::new(self.pool)
            .get_selection(tenant.id, &req.service_ids)
            .await?
        {
            SelectionLookup::Selected(services) => services,
            SelectionLookup::UnknownId(id) => {
                return Err(AppError::not_found(format!("Unknown service {}", id)))
            }
        };
        if services.iter().any(|s| !s.active) {
            return Err(AppError::not_found("Service is not active"));
        }

        let duration_minutes: u32 = services.iter().map(|s| s.duration_minutes).sum();
        if duration_minutes == 0 {
            return Err(AppError::validation("Selected services have no duration"));
        }
        let total_price_cents: i64 = services.iter().map(|s| s.price_cents).sum();
        if total_price_cents < 0 {
            return Err(AppError::validation("Negative total price"));
        }

        if conflicts::violates_lead_time(date, start_local, tz, tenant.lead_time_minutes, now) {
            return Err(AppError::conflict(
                "Requested start is in the past or within the lead-time buffer",
            ));
        }

        let start_at = timezone::to_utc(date, start_local, tz);
        let end_at = start_at + Duration::minutes(duration_minutes as i64);

        let status = if services.iter().any(|s| s.requires_confirmation) {
            BookingStatus::New
        } else {
            BookingStatus::Confirmed
        };

        let booking_id = Uuid::new_v4();
        let items: Vec<BookingItem> = services
            .iter()
            .enumerate()
            .map(|(position, s)| BookingItem {
                id: Uuid::new_v4(),
                booking_id,
                service_id: s.id,
                service_name: s.name.clone(),
                duration_minutes: s.duration_minutes,
                price_cents: s.price_cents,
                position: position as u32,
            })
            .collect();

        let booking = Booking {
            id: booking_id,
            tenant_id: tenant.id,
            master_id: master.id,
            start_at,
            end_at,
            status,
            total_price_cents,
            client_name: req.client.name.clone(),
            client_phone: req.client.phone.clone(),
            client_email: req.client.email.clone(),
            notes: req.notes.clone(),
            items,
            created_at: now,
            updated_at: now,
        };

        // Serialize against every other create/edit for this master from
        // the authoritative re-check through the commit.
        let lock = self.locks.lock_for(master.id);
        let _guard = lock.lock().await;

        self.check_interval(tenant, &master, date, start_local, duration_minutes)
            .await?;

        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let occupied = booking_repository::occupied_between_tx(
            &mut *tx, tenant.id, master.id, start_at, end_at,
        )
        .await?;
        if !conflicts::is_available(start_at, end_at, &occupied, None) {
            return Err(AppError::conflict("The requested slot is no longer available"));
        }

        booking_repository::insert_tx(&mut *tx, &booking).await?;
        audit_repository::insert_tx(
            &mut *tx,
            tenant.id,
            actor_kind,
            actor_id,
            "booking.create",
            "bookings",
            Some(&booking.id.to_string()),
            Some(&serde_json::json!({
                "master_id": master.id,
                "start_at": booking.start_at.to_rfc3339(),
                "end_at": booking.end_at.to_rfc3339(),
                "status": booking.status.as_str(),
                "services": req.service_ids,
            })),
        )
        .await?;

        tx.commit().await.map_err(AppError::from)?;

        tracing::info!(
            booking_id = %booking.id,
            master_id = %master.id,
            status = booking.status.as_str(),
            "Booking created"
        );

        Ok(booking)
    }

    /// Edit start time, master, duration, price or notes of a non-terminal
    /// booking. Interval changes re-run the conflict check excluding the
    /// booking's own prior interval; on conflict the edit is rejected and
    /// the stored state is unchanged, unless the tenant explicitly allows
    /// overbooking edits, in which case the override is audited.
    pub async fn edit(
        &self,
        tenant: &Tenant,
        booking_id: Uuid,
        req: &UpdateBookingRequest,
        actor_kind: ActorKind,
        actor_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        if !tenant.active {
            return Err(AppError::not_found("Tenant is disabled"));
        }
        if req.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }
        if req.date.is_some() != req.start.is_some() {
            return Err(AppError::validation(
                "date and start must be provided together",
            ));
        }

        let existing = BookingRepository::new(self.pool)
            .get_by_id(tenant.id, booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))?;
        if existing.status.is_terminal() {
            return Err(AppError::conflict(format!(
                "Booking in terminal state '{}' cannot be edited",
                existing.status.as_str()
            )));
        }
        if existing.items.is_empty() {
            // The transaction boundary makes this unreachable; seeing it
            // means a partial write got committed somewhere.
            return Err(AppError::ConsistencyFault(format!(
                "Booking {} has no line items",
                booking_id
            )));
        }

        let tz = tenant.tz()?;

        let master = match req.master_id {
            Some(new_master_id) if new_master_id != existing.master_id => {
                let m = MasterRepository::new(self.pool)
                    .get_by_id(tenant.id, new_master_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Master not found"))?;
                if !m.active {
                    return Err(AppError::not_found("Master is not active"));
                }
                m
            }
            _ => MasterRepository::new(self.pool)
                .get_by_id(tenant.id, existing.master_id)
                .await?
                .ok_or_else(|| AppError::not_found("Master not found"))?,
        };

        let old_duration = (existing.end_at - existing.start_at).num_minutes().max(0) as u32;
        let duration_minutes = req.duration_minutes.unwrap_or(old_duration);
        if duration_minutes == 0 {
            return Err(AppError::validation("Duration must be positive"));
        }

        let (date, start_local) = match (&req.date, &req.start) {
            (Some(d), Some(s)) => (parse_date(d)?, parse_wall_clock(s)?),
            _ => timezone::to_local(existing.start_at, tz),
        };
        let start_at = timezone::to_utc(date, start_local, tz);
        let end_at = start_at + Duration::minutes(duration_minutes as i64);

        let mut changed: Vec<&str> = Vec::new();
        if master.id != existing.master_id {
            changed.push("master_id");
        }
        if start_at != existing.start_at {
            changed.push("start_at");
        }
        if duration_minutes != old_duration {
            changed.push("duration");
        }
        if req.total_price_cents.is_some_and(|p| p != existing.total_price_cents) {
            changed.push("total_price_cents");
        }
        if req.notes.is_some() && req.notes != existing.notes {
            changed.push("notes");
        }

        let interval_changed = master.id != existing.master_id
            || start_at != existing.start_at
            || end_at != existing.end_at;

        let updated = Booking {
            master_id: master.id,
            start_at,
            end_at,
            total_price_cents: req.total_price_cents.unwrap_or(existing.total_price_cents),
            notes: req.notes.clone().or(existing.notes.clone()),
            updated_at: now,
            ..existing.clone()
        };

        let lock = self.locks.lock_for(master.id);
        let _guard = lock.lock().await;

        let mut conflict_overridden = false;

        // Lead-time and window checks read through the pool, so they must
        // run before the transaction pins a connection.
        let precheck = if interval_changed {
            let lead_ok = !conflicts::violates_lead_time(
                date,
                start_local,
                tz,
                tenant.lead_time_minutes,
                now,
            );
            let window_fits = self
                .check_interval(tenant, &master, date, start_local, duration_minutes)
                .await;
            Some((lead_ok, window_fits))
        } else {
            None
        };

        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        if let Some((lead_ok, window_fits)) = precheck {
            let occupied = booking_repository::occupied_between_tx(
                &mut *tx, tenant.id, master.id, start_at, end_at,
            )
            .await?;
            let free = conflicts::is_available(start_at, end_at, &occupied, Some(existing.id));

            if !lead_ok || window_fits.is_err() || !free {
                if tenant.allow_overbooking_edits && actor_kind == ActorKind::Staff {
                    conflict_overridden = true;
                } else if !lead_ok {
                    return Err(AppError::conflict(
                        "The new start is in the past or within the lead-time buffer",
                    ));
                } else {
                    return match window_fits {
                        Err(e) => Err(e),
                        Ok(()) => Err(AppError::conflict(
                            "The requested interval overlaps an existing booking",
                        )),
                    };
                }
            }
        }

        booking_repository::update_fields_tx(&mut *tx, &updated).await?;
        audit_repository::insert_tx(
            &mut *tx,
            tenant.id,
            actor_kind,
            actor_id,
            "booking.update",
            "bookings",
            Some(&updated.id.to_string()),
            Some(&serde_json::json!({
                "changed": changed,
                "conflict_overridden": conflict_overridden,
                "start_at": updated.start_at.to_rfc3339(),
                "end_at": updated.end_at.to_rfc3339(),
                "master_id": updated.master_id,
            })),
        )
        .await?;
        tx.commit().await.map_err(AppError::from)?;

        if conflict_overridden {
            tracing::warn!(
                booking_id = %updated.id,
                master_id = %updated.master_id,
                "Overbooking edit committed with override"
            );
        }

        Ok(updated)
    }

    /// Apply a status transition per the booking state machine
    pub async fn change_status(
        &self,
        tenant: &Tenant,
        booking_id: Uuid,
        next: BookingStatus,
        actor_kind: ActorKind,
        actor_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        if !tenant.active {
            return Err(AppError::not_found("Tenant is disabled"));
        }

        let existing = BookingRepository::new(self.pool)
            .get_by_id(tenant.id, booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))?;

        if !existing.status.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Transition {} -> {} is not permitted",
                existing.status.as_str(),
                next.as_str()
            )));
        }
        if next == BookingStatus::NoShow && now < existing.end_at {
            return Err(AppError::conflict(
                "A booking can be marked no-show only after its end time",
            ));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::from)?;
        booking_repository::update_status_tx(&mut *tx, tenant.id, booking_id, next, now).await?;
        audit_repository::insert_tx(
            &mut *tx,
            tenant.id,
            actor_kind,
            actor_id,
            "booking.status",
            "bookings",
            Some(&booking_id.to_string()),
            Some(&serde_json::json!({
                "from": existing.status.as_str(),
                "to": next.as_str(),
            })),
        )
        .await?;
        tx.commit().await.map_err(AppError::from)?;

        Ok(Booking {
            status: next,
            updated_at: now,
            ..existing
        })
    }

    /// Verify the candidate interval lies inside the master's working window
    /// for the date, outside any break, and that no absence covers the date.
    async fn check_interval(
        &self,
        tenant: &Tenant,
        master: &Master,
        date: NaiveDate,
        start_local: NaiveTime,
        duration_minutes: u32,
    ) -> AppResult<()> {
        let calendar = WorkingCalendar::new(self.pool);
        let window = calendar
            .schedule_for(tenant.id, master.id, date)
            .await?
            .ok_or_else(|| {
                AppError::conflict("The master does not work on the requested date")
            })?;

        if !fits_window(&window, start_local, duration_minutes) {
            return Err(AppError::conflict(
                "The requested interval falls outside the working hours",
            ));
        }
        Ok(())
    }
}

/// Whether `[start, start + duration)` lies inside the window and clear of
/// its break, using minute arithmetic so intervals never wrap past midnight.
pub fn fits_window(window: &WorkingWindow, start: NaiveTime, duration_minutes: u32) -> bool {
    use chrono::Timelike;

    let start_min = start.num_seconds_from_midnight() / 60;
    let end_min = start_min + duration_minutes;
    let window_start = window.start.num_seconds_from_midnight() / 60;
    let window_end = window.end.num_seconds_from_midnight() / 60;

    if start_min < window_start || end_min > window_end {
        return false;
    }
    if let Some(b) = &window.break_window {
        let break_start = b.start.num_seconds_from_midnight() / 60;
        let break_end = b.end.num_seconds_from_midnight() / 60;
        if start_min < break_end && break_start < end_min {
            return false;
        }
    }
    true
}

//! Booking models and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Booking lifecycle states.
///
/// Only `New`, `Confirmed` and `Completed` occupy time for conflict
/// purposes; cancelled and no-show bookings free the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    New,
    Confirmed,
    Completed,
    NoShow,
    CancelledByClient,
    CancelledBySalon,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::New => "new",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::NoShow => "no_show",
            BookingStatus::CancelledByClient => "cancelled_by_client",
            BookingStatus::CancelledBySalon => "cancelled_by_salon",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(BookingStatus::New),
            "confirmed" => Some(BookingStatus::Confirmed),
            "completed" => Some(BookingStatus::Completed),
            "no_show" => Some(BookingStatus::NoShow),
            "cancelled_by_client" => Some(BookingStatus::CancelledByClient),
            "cancelled_by_salon" => Some(BookingStatus::CancelledBySalon),
            _ => None,
        }
    }

    /// Whether a booking in this status reserves its time interval
    pub fn is_occupying(&self) -> bool {
        matches!(
            self,
            BookingStatus::New | BookingStatus::Confirmed | BookingStatus::Completed
        )
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed
                | BookingStatus::NoShow
                | BookingStatus::CancelledByClient
                | BookingStatus::CancelledBySalon
        )
    }

    /// Whether the state machine permits moving to `next`.
    ///
    /// `NoShow` additionally requires the appointment's end to have passed,
    /// which is enforced by the booking service, not here.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self, next) {
            (BookingStatus::New, BookingStatus::Confirmed) => true,
            (BookingStatus::Confirmed, BookingStatus::Completed) => true,
            (
                BookingStatus::New | BookingStatus::Confirmed,
                BookingStatus::CancelledByClient
                | BookingStatus::CancelledBySalon
                | BookingStatus::NoShow,
            ) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub master_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: BookingStatus,
    pub total_price_cents: i64,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<BookingItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One service line item inside a booking.
///
/// Name, duration and price are snapshots taken at booking time, so later
/// edits to the service catalogue do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingItem {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    pub duration_minutes: u32,
    pub price_cents: i64,
    pub position: u32,
}

/// Client contact data, passed through unchanged for audit and display
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClientPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub master_id: Uuid,
    #[validate(length(min = 1))]
    pub service_ids: Vec<Uuid>,
    /// Local calendar date, "YYYY-MM-DD"
    pub date: String,
    /// Local wall-clock start, "HH:MM"
    pub start: String,
    #[validate(nested)]
    pub client: ClientPayload,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    /// New local date, "YYYY-MM-DD"; must be set together with `start`
    pub date: Option<String>,
    /// New local wall-clock start, "HH:MM"
    pub start: Option<String>,
    pub master_id: Option<Uuid>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<u32>,
    #[validate(range(min = 0))]
    pub total_price_cents: Option<i64>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl UpdateBookingRequest {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.start.is_none()
            && self.master_id.is_none()
            && self.duration_minutes.is_none()
            && self.total_price_cents.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChangeRequest {
    pub status: BookingStatus,
}

//! Data models
//!
//! All entities are scoped to exactly one tenant; no core operation reads or
//! writes across tenants.

mod audit;
mod booking;
mod master;
mod rotation;
mod schedule;
mod tenant;

pub use audit::{ActorKind, AuditLogEntry};
pub use booking::{
    Booking, BookingItem, BookingStatus, ClientPayload, CreateBookingRequest,
    StatusChangeRequest, UpdateBookingRequest,
};
pub use master::Master;
pub use rotation::RotationCounter;
pub use schedule::{Absence, BreakWindow, Service, WeeklyScheduleEntry, WorkingWindow};
pub use tenant::Tenant;
